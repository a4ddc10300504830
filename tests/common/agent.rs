//! A minimal in-process SNMP agent for end-to-end tests.
//!
//! Serves Get, GetNext and Set from a sorted map over a real UDP socket on
//! the loopback interface. The first N requests can be dropped to exercise
//! client retransmission.

use basic_snmp::ber::{Decoder, tag};
use basic_snmp::{CommunityMessage, ErrorCode, Oid, Pdu, PduType, Value, VarBind, Version};
use bytes::Bytes;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

struct AgentState {
    mib: Mutex<BTreeMap<Oid, Value>>,
    community: Bytes,
    drop_first: usize,
    received: AtomicUsize,
}

/// Handle to a running fake agent. The agent stops when this is dropped.
pub struct FakeAgent {
    addr: SocketAddr,
    state: Arc<AgentState>,
    task: JoinHandle<()>,
}

impl FakeAgent {
    /// Start an agent answering to `community`.
    pub async fn start(mib: BTreeMap<Oid, Value>, community: &[u8]) -> Self {
        Self::start_dropping(mib, community, 0).await
    }

    /// Start an agent that silently ignores its first `drop_first` requests.
    pub async fn start_dropping(
        mib: BTreeMap<Oid, Value>,
        community: &[u8],
        drop_first: usize,
    ) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        let state = Arc::new(AgentState {
            mib: Mutex::new(mib),
            community: Bytes::copy_from_slice(community),
            drop_first,
            received: AtomicUsize::new(0),
        });

        let task = tokio::spawn(serve(socket, state.clone()));
        Self { addr, state, task }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Number of requests seen, dropped ones included.
    pub fn requests_received(&self) -> usize {
        self.state.received.load(Ordering::SeqCst)
    }

    /// Current value of an object.
    pub fn value(&self, oid: &Oid) -> Option<Value> {
        self.state.mib.lock().unwrap().get(oid).cloned()
    }
}

impl Drop for FakeAgent {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(socket: UdpSocket, state: Arc<AgentState>) {
    let mut buf = vec![0u8; 65535];
    loop {
        let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
            return;
        };
        let seen = state.received.fetch_add(1, Ordering::SeqCst);
        if seen < state.drop_first {
            continue;
        }

        let Some((version, community, pdu)) = decode_request(&buf[..len]) else {
            continue;
        };
        if community != state.community {
            continue;
        }

        let response = {
            let mut mib = state.mib.lock().unwrap();
            answer(&mut mib, version, pdu)
        };
        if let Ok(bytes) = CommunityMessage::new(version, community, response).encode() {
            let _ = socket.send_to(&bytes, peer).await;
        }
    }
}

/// Decode any request PDU, GetNext included.
pub fn decode_request(data: &[u8]) -> Option<(Version, Bytes, Pdu)> {
    let mut decoder = Decoder::from_slice(data);
    let mut seq = decoder.read_sequence().ok()?;
    let version = Version::from_i32(seq.read_i32().ok()?)?;
    let community = seq.read_octet_string().ok()?;
    let pdu = Pdu::decode(&mut seq).ok()?;
    pdu.is_request().then_some((version, community, pdu))
}

fn answer(mib: &mut BTreeMap<Oid, Value>, version: Version, request: Pdu) -> Pdu {
    let mut response = Pdu {
        pdu_type: PduType::Response,
        request_id: request.request_id,
        error_status: ErrorCode::NoError,
        error_index: 0,
        varbinds: Vec::with_capacity(request.varbinds.len()),
    };

    for (i, vb) in request.varbinds.iter().enumerate() {
        let found = match request.pdu_type {
            PduType::GetRequest => mib
                .get(&vb.oid)
                .map(|v| VarBind::new(vb.oid.clone(), v.clone()))
                .ok_or(tag::exception::NO_SUCH_INSTANCE),
            PduType::GetNextRequest => mib
                .range((Bound::Excluded(vb.oid.clone()), Bound::Unbounded))
                .next()
                .map(|(oid, v)| VarBind::new(oid.clone(), v.clone()))
                .ok_or(tag::exception::END_OF_MIB_VIEW),
            _ => {
                mib.insert(vb.oid.clone(), vb.value.clone());
                Ok(vb.clone())
            }
        };

        match found {
            Ok(vb) => response.varbinds.push(vb),
            Err(_) if version == Version::V1 => {
                response.error_status = ErrorCode::NoSuchName;
                response.error_index = i as i32 + 1;
                response.varbinds = request.varbinds.clone();
                return response;
            }
            Err(exception) => response.varbinds.push(VarBind::new(
                vb.oid.clone(),
                Value::Unknown {
                    tag: exception,
                    data: Bytes::new(),
                },
            )),
        }
    }
    response
}

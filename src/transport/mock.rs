//! Scripted transport for tests.
//!
//! Answers come from a queue instead of the network, and every datagram
//! sent is recorded for inspection.

use super::{Transport, extract_request_id};
use crate::error::{Error, ErrorCode, Result};
use crate::message::CommunityMessage;
use crate::oid::Oid;
use crate::pdu::{Pdu, PduType};
use crate::value::Value;
use crate::varbind::VarBind;
use crate::version::Version;
use bytes::Bytes;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted answer.
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Answer with this message, request ID rewritten to the awaited one.
    Data(Bytes),
    /// Answer with these bytes untouched.
    RawData(Bytes),
    /// Let the receive time out.
    Timeout,
    /// Fail the receive with an I/O error.
    IoError(String),
}

/// A datagram sent through the mock.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub data: Bytes,
    pub request_id: Option<i32>,
}

struct MockInner {
    target: SocketAddr,
    responses: VecDeque<MockResponse>,
    requests: Vec<RecordedRequest>,
}

/// In-memory [`Transport`] driven by a response queue.
///
/// ```rust
/// use basic_snmp::transport::{MockTransport, ResponseBuilder};
/// use basic_snmp::{Value, oid};
///
/// let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
/// mock.queue_response(
///     ResponseBuilder::new(0)
///         .varbind(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::from("core-1"))
///         .build_v2c(b"public"),
/// );
/// mock.queue_timeout();
/// assert_eq!(mock.queued_response_count(), 2);
/// ```
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<MockInner>>,
}

impl MockTransport {
    pub fn new(target: SocketAddr) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockInner {
                target,
                responses: VecDeque::new(),
                requests: Vec::new(),
            })),
        }
    }

    /// Queue a response whose request ID is patched to match the receive.
    pub fn queue_response(&mut self, data: impl Into<Bytes>) {
        self.push(MockResponse::Data(data.into()));
    }

    /// Queue a response delivered byte for byte.
    pub fn queue_raw_response(&mut self, data: impl Into<Bytes>) {
        self.push(MockResponse::RawData(data.into()));
    }

    pub fn queue_timeout(&mut self) {
        self.push(MockResponse::Timeout);
    }

    pub fn queue_io_error(&mut self, msg: impl Into<String>) {
        self.push(MockResponse::IoError(msg.into()));
    }

    /// All datagrams sent so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    pub fn queued_response_count(&self) -> usize {
        self.lock().responses.len()
    }

    fn push(&mut self, response: MockResponse) {
        self.lock().responses.push_back(response);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn patch_request_id(data: Bytes, request_id: i32) -> Bytes {
    let Ok(mut msg) = CommunityMessage::decode(data.clone()) else {
        return data;
    };
    msg.pdu.request_id = request_id;
    msg.encode().unwrap_or(data)
}

impl Transport for MockTransport {
    async fn send(&self, data: &[u8]) -> Result<()> {
        let data = Bytes::copy_from_slice(data);
        let request_id = extract_request_id(&data);
        self.lock().requests.push(RecordedRequest { data, request_id });
        Ok(())
    }

    async fn recv(&self, request_id: i32, timeout: Duration) -> Result<(Bytes, SocketAddr)> {
        let (response, target) = {
            let mut inner = self.lock();
            (inner.responses.pop_front(), inner.target)
        };

        match response {
            Some(MockResponse::Data(data)) => Ok((patch_request_id(data, request_id), target)),
            Some(MockResponse::RawData(data)) => Ok((data, target)),
            Some(MockResponse::IoError(msg)) => Err(Error::Io {
                target: Some(target),
                source: std::io::Error::other(msg),
            }),
            Some(MockResponse::Timeout) | None => Err(Error::Timeout {
                target: Some(target),
                elapsed: timeout,
                request_id,
                retries: 0,
            }),
        }
    }

    fn peer_addr(&self) -> SocketAddr {
        self.lock().target
    }

    fn local_addr(&self) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 0))
    }
}

/// Builds response datagrams for scripting a [`MockTransport`].
pub struct ResponseBuilder {
    request_id: i32,
    varbinds: Vec<VarBind>,
    error_status: ErrorCode,
    error_index: i32,
}

impl ResponseBuilder {
    pub fn new(request_id: i32) -> Self {
        Self {
            request_id,
            varbinds: Vec::new(),
            error_status: ErrorCode::NoError,
            error_index: 0,
        }
    }

    pub fn varbind(mut self, oid: Oid, value: Value) -> Self {
        self.varbinds.push(VarBind::new(oid, value));
        self
    }

    pub fn error(mut self, status: ErrorCode, index: i32) -> Self {
        self.error_status = status;
        self.error_index = index;
        self
    }

    pub fn build_v1(self, community: &[u8]) -> Bytes {
        self.build(Version::V1, community)
    }

    pub fn build_v2c(self, community: &[u8]) -> Bytes {
        self.build(Version::V2c, community)
    }

    fn build(self, version: Version, community: &[u8]) -> Bytes {
        let pdu = Pdu {
            pdu_type: PduType::Response,
            request_id: self.request_id,
            error_status: self.error_status,
            error_index: self.error_index,
            varbinds: self.varbinds,
        };
        CommunityMessage::new(version, Bytes::copy_from_slice(community), pdu)
            .encode()
            .unwrap_or_default()
    }
}

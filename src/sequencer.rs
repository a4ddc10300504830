//! Request sequencer and table walker.
//!
//! The sequencer owns a FIFO of pending exchanges and keeps only the head on
//! the wire. It performs no I/O: callers hand it datagrams and timer expiries
//! and drain [`SequencerEvent`]s, which include the datagrams to transmit.
//!
//! A table walk repeats GetNext from the last OID received until the agent
//! answers with an OID outside the walked subtree. Each step goes out with
//! the previous step's request ID plus one.
//!
//! ```
//! use basic_snmp::sequencer::{Sequencer, SequencerEvent};
//! use basic_snmp::{Retry, Version, oid};
//!
//! let mut seq = Sequencer::new(Retry::default());
//! seq.discover_table(Version::V2c, oid!(1, 3, 6, 1, 2, 1, 2, 2), "public", 100)
//!     .unwrap();
//!
//! match seq.poll_event() {
//!     Some(SequencerEvent::Transmit { wire_id, .. }) => assert_eq!(wire_id, 100),
//!     other => panic!("expected a datagram, got {:?}", other),
//! }
//! ```

use crate::client::Retry;
use crate::error::{EncodeErrorKind, Error, ErrorCode, Result, WalkFailure};
use crate::message::{CommunityMessage, check_oid};
use crate::oid::Oid;
use crate::pdu::{Pdu, PduType};
use crate::varbind::VarBind;
use crate::version::Version;
use bytes::Bytes;
use std::collections::VecDeque;

/// Whether an entry currently has a datagram on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    InFlight,
}

/// One pending exchange.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    /// Caller-chosen ID naming the whole exchange.
    pub request_id: i32,
    /// Request ID of the datagram currently (or next) on the wire.
    pub wire_id: i32,
    /// OID the next GetNext asks about (table walks), or the first varbind.
    pub target: Oid,
    /// Subtree root of a table walk; `None` for single requests.
    pub initial: Option<Oid>,
    pub pdu_type: PduType,
    pub community: Bytes,
    pub version: Version,
    pub state: RequestState,
    varbinds: Vec<VarBind>,
    retries: u32,
    datagram: Option<Bytes>,
}

impl RequestInfo {
    /// Check if this entry is a table walk.
    pub fn is_table(&self) -> bool {
        self.initial.is_some()
    }

    /// Retransmissions made for the datagram currently on the wire.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    fn message(&self) -> CommunityMessage {
        let pdu = match &self.initial {
            Some(_) => Pdu::get_next_request(self.wire_id, std::slice::from_ref(&self.target)),
            None => Pdu::request(self.pdu_type, self.wire_id, self.varbinds.clone()),
        };
        CommunityMessage::new(self.version, self.community.clone(), pdu)
    }
}

/// Output of the sequencer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequencerEvent {
    /// Send this datagram to the agent.
    Transmit {
        request_id: i32,
        wire_id: i32,
        datagram: Bytes,
    },
    /// A table walk received a cell inside its subtree.
    CellReceived { request_id: i32, varbind: VarBind },
    /// A table walk reached the end of its subtree.
    TableComplete { request_id: i32 },
    /// A single request got its answer.
    Response {
        request_id: i32,
        message: CommunityMessage,
    },
    /// An entry was abandoned.
    WalkFailed {
        request_id: i32,
        reason: WalkFailure,
    },
}

/// Sans-IO request sequencer.
#[derive(Debug, Default)]
pub struct Sequencer {
    queue: VecDeque<RequestInfo>,
    events: VecDeque<SequencerEvent>,
    retry: Retry,
}

impl Sequencer {
    /// Create a sequencer with the given retry budget.
    pub fn new(retry: Retry) -> Self {
        Self {
            queue: VecDeque::new(),
            events: VecDeque::new(),
            retry,
        }
    }

    /// Queue a walk of the table rooted at `base`.
    ///
    /// Fails without queuing anything if `base` cannot be encoded.
    pub fn discover_table(
        &mut self,
        version: Version,
        base: Oid,
        community: impl Into<Bytes>,
        request_id: i32,
    ) -> Result<()> {
        check_oid(&base)?;
        self.push(RequestInfo {
            request_id,
            wire_id: request_id,
            target: base.clone(),
            initial: Some(base),
            pdu_type: PduType::GetNextRequest,
            community: community.into(),
            version,
            state: RequestState::Idle,
            varbinds: Vec::new(),
            retries: 0,
            datagram: None,
        });
        Ok(())
    }

    /// Queue a single Get, GetNext or Set exchange.
    pub fn enqueue_request(
        &mut self,
        version: Version,
        community: impl Into<Bytes>,
        request_id: i32,
        pdu_type: PduType,
        varbinds: Vec<VarBind>,
    ) -> Result<()> {
        let Some(first) = varbinds.first() else {
            return Err(Error::encode(EncodeErrorKind::NoVarbinds));
        };
        for vb in &varbinds {
            check_oid(&vb.oid)?;
        }
        self.push(RequestInfo {
            request_id,
            wire_id: request_id,
            target: first.oid.clone(),
            initial: None,
            pdu_type,
            community: community.into(),
            version,
            state: RequestState::Idle,
            varbinds,
            retries: 0,
            datagram: None,
        });
        Ok(())
    }

    /// Remove the entry for `request_id`.
    ///
    /// If it was on the wire, the next queued entry is dispatched. A late
    /// answer to the removed entry is ignored. Returns `false` if no entry
    /// had that ID.
    pub fn cancel_discover_table(&mut self, request_id: i32) -> bool {
        let Some(pos) = self.queue.iter().position(|r| r.request_id == request_id) else {
            return false;
        };
        self.queue.remove(pos);
        tracing::debug!(target: "basic_snmp::sequencer", { request_id }, "entry cancelled");
        if pos == 0 {
            self.dispatch();
        }
        true
    }

    /// Feed a datagram received from the agent.
    ///
    /// Datagrams that are not a Response, or do not answer the in-flight
    /// request, are ignored. A datagram that fails to decode is reported and
    /// changes nothing.
    pub fn handle_datagram(&mut self, data: Bytes) -> Result<()> {
        let msg = CommunityMessage::decode(data)?;
        let wire_id = msg.pdu.request_id;

        if msg.pdu.pdu_type != PduType::Response {
            tracing::debug!(target: "basic_snmp::sequencer", { wire_id, pdu_type = ?msg.pdu.pdu_type }, "not a response, ignored");
            return Ok(());
        }

        let Some(head) = self
            .queue
            .front()
            .filter(|h| h.state == RequestState::InFlight && h.wire_id == wire_id)
        else {
            tracing::debug!(target: "basic_snmp::sequencer", { wire_id }, "datagram for no active request, ignored");
            return Ok(());
        };

        let request_id = head.request_id;
        match head.initial.clone() {
            None => {
                self.queue.pop_front();
                self.events
                    .push_back(SequencerEvent::Response { request_id, message: msg });
            }
            Some(initial) => self.walk_step(request_id, &initial, msg),
        }

        self.dispatch();
        Ok(())
    }

    /// The in-flight request's timer expired.
    ///
    /// Resends the same datagram while retries remain; afterwards the entry
    /// fails with [`WalkFailure::Timeout`] and the next one is dispatched.
    pub fn on_timeout(&mut self) {
        let Some(head) = self.queue.front_mut() else {
            return;
        };
        if head.state != RequestState::InFlight {
            return;
        }

        if head.retries < self.retry.max_attempts {
            head.retries += 1;
            tracing::debug!(target: "basic_snmp::sequencer", { request_id = head.request_id, wire_id = head.wire_id, retry = head.retries }, "retransmitting");
            if let Some(datagram) = head.datagram.clone() {
                self.events.push_back(SequencerEvent::Transmit {
                    request_id: head.request_id,
                    wire_id: head.wire_id,
                    datagram,
                });
            }
            return;
        }

        let request_id = head.request_id;
        tracing::debug!(target: "basic_snmp::sequencer", { request_id, retries = head.retries }, "retries exhausted");
        self.queue.pop_front();
        self.events.push_back(SequencerEvent::WalkFailed {
            request_id,
            reason: WalkFailure::Timeout,
        });
        self.dispatch();
    }

    /// Next output, if any.
    pub fn poll_event(&mut self) -> Option<SequencerEvent> {
        self.events.pop_front()
    }

    /// The entry currently on the wire.
    pub fn in_flight(&self) -> Option<&RequestInfo> {
        self.queue
            .front()
            .filter(|h| h.state == RequestState::InFlight)
    }

    /// Check if an entry with `request_id` is queued or in flight.
    pub fn is_active(&self, request_id: i32) -> bool {
        self.queue.iter().any(|r| r.request_id == request_id)
    }

    /// Number of queued entries, including the one in flight.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// The retry policy.
    pub fn retry(&self) -> &Retry {
        &self.retry
    }

    fn push(&mut self, info: RequestInfo) {
        tracing::debug!(target: "basic_snmp::sequencer", { request_id = info.request_id, target = %info.target, queued = self.queue.len() }, "entry queued");
        self.queue.push_back(info);
        self.dispatch();
    }

    fn walk_step(&mut self, request_id: i32, initial: &Oid, msg: CommunityMessage) {
        let pdu = msg.into_pdu();
        let next = pdu.varbinds.into_iter().next().filter(|vb| {
            pdu.error_status == ErrorCode::NoError
                && vb.oid.starts_with(initial)
                && !vb.value.is_end_of_mib_view()
        });

        let Some(varbind) = next else {
            tracing::debug!(target: "basic_snmp::sequencer", { request_id, status = %pdu.error_status }, "table complete");
            self.queue.pop_front();
            self.events
                .push_back(SequencerEvent::TableComplete { request_id });
            return;
        };

        let Some(head) = self.queue.front_mut() else {
            return;
        };
        if varbind.oid <= head.target {
            tracing::warn!(target: "basic_snmp::sequencer", { request_id, oid = %varbind.oid, previous = %head.target }, "agent returned non-increasing OID, ending walk");
            self.queue.pop_front();
            self.events
                .push_back(SequencerEvent::TableComplete { request_id });
            return;
        }

        head.target = varbind.oid.clone();
        head.wire_id = head.wire_id.wrapping_add(1);
        head.state = RequestState::Idle;
        head.retries = 0;
        head.datagram = None;
        self.events
            .push_back(SequencerEvent::CellReceived { request_id, varbind });
    }

    fn dispatch(&mut self) {
        while let Some(head) = self.queue.front_mut() {
            if head.state == RequestState::InFlight {
                return;
            }

            match head.message().encode_request() {
                Ok(datagram) => {
                    tracing::trace!(target: "basic_snmp::sequencer", { request_id = head.request_id, wire_id = head.wire_id, target = %head.target }, "dispatching");
                    head.state = RequestState::InFlight;
                    head.datagram = Some(datagram.clone());
                    self.events.push_back(SequencerEvent::Transmit {
                        request_id: head.request_id,
                        wire_id: head.wire_id,
                        datagram,
                    });
                    return;
                }
                Err(e) => {
                    let request_id = head.request_id;
                    tracing::warn!(target: "basic_snmp::sequencer", { request_id, error = %e }, "cannot encode request, dropping entry");
                    self.queue.pop_front();
                    self.events.push_back(SequencerEvent::WalkFailed {
                        request_id,
                        reason: WalkFailure::Encode,
                    });
                }
            }
        }
    }
}

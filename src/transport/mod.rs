//! Transport layer abstraction.
//!
//! Provides the `Transport` trait, a UDP implementation, and a scripted
//! in-memory transport for tests.

mod udp;

#[cfg(any(test, feature = "testing"))]
mod mock;

pub use udp::*;

#[cfg(any(test, feature = "testing"))]
pub use mock::*;

use crate::ber::{Decoder, tag};
use crate::error::Result;
use bytes::Bytes;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

/// Client-side transport abstraction.
///
/// The `Clone` bound lets walk streams own a copy of the client. Implementations
/// keep their state behind an `Arc`, so cloning is cheap.
pub trait Transport: Send + Sync + Clone {
    /// Send one datagram to the peer.
    fn send(&self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Wait for the datagram answering `request_id`.
    ///
    /// Datagrams carrying another request ID are discarded. Fails with
    /// [`Error::Timeout`](crate::Error::Timeout) once `timeout` elapses.
    ///
    /// Returns (response_data, actual_source_address)
    fn recv(
        &self,
        request_id: i32,
        timeout: Duration,
    ) -> impl Future<Output = Result<(Bytes, SocketAddr)>> + Send;

    /// The peer address for this transport.
    fn peer_addr(&self) -> SocketAddr;

    /// Local bind address.
    fn local_addr(&self) -> SocketAddr;
}

/// Pull the request ID out of a community message without decoding the rest.
///
/// Returns `None` for anything that is not shaped like
/// `SEQUENCE { INTEGER, OCTET STRING, PDU { INTEGER ... } }`.
pub(crate) fn extract_request_id(data: &[u8]) -> Option<i32> {
    let mut decoder = Decoder::from_slice(data);
    let mut msg = decoder.read_sequence().ok()?;
    msg.read_integer().ok()?;
    msg.read_octet_string().ok()?;

    let pdu_tag = msg.read_tag().ok()?;
    if pdu_tag & 0xE0 != tag::class::CONTEXT_SPECIFIC | tag::CONSTRUCTED {
        return None;
    }
    let len = msg.read_length().ok()?;
    let mut pdu = msg.sub_decoder(len).ok()?;
    pdu.read_i32().ok()
}

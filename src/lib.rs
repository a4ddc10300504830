//! # basic-snmp
//!
//! SNMP v1/v2c building blocks: a BER codec for community messages, a table
//! model that rebuilds conceptual rows from walked cells, and a sans-IO
//! sequencer that runs GetNext table walks one request at a time.
//!
//! The core never opens a socket. [`sequencer::Sequencer`] takes datagrams
//! in and hands datagrams out; [`Client`] is a thin async driver that pairs
//! it with a [`Transport`].
//!
//! ## Encoding and decoding
//!
//! ```
//! use basic_snmp::message::CommunityMessage;
//! use basic_snmp::{Version, oid};
//!
//! let request = CommunityMessage::setup_get_request(
//!     Version::V2c,
//!     "public",
//!     1,
//!     &[oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)],
//! );
//! let bytes = request.encode_request().unwrap();
//!
//! let decoded = CommunityMessage::decode(bytes).unwrap();
//! assert_eq!(decoded.pdu.request_id, 1);
//! assert_eq!(decoded.community.as_ref(), b"public");
//! ```
//!
//! ## Reading a table
//!
//! ```rust,no_run
//! use basic_snmp::table::TableLayout;
//! use basic_snmp::{Client, oid};
//!
//! # async fn example() -> basic_snmp::Result<()> {
//! let client = Client::v2c("192.0.2.1").connect().await?;
//! let table = client
//!     .discover_table(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1), TableLayout::new(1, 1, 22))
//!     .await?;
//!
//! for row in table.rows() {
//!     println!("{:?}: {:?}", row.keys(), row.cells()[1]);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! Every failure is an [`Error`]. Decode failures carry the byte offset and
//! a flat [`ErrorCode`]; agent error-status values arrive as
//! [`Error::Snmp`] with the same [`ErrorCode`] type.
//!
//! ## Feature flags
//!
//! - `serde`: `Serialize`/`Deserialize` for configuration types
//! - `testing`: exposes [`transport::MockTransport`] outside unit tests
//! - `cli`: the `bsnmp-get` and `bsnmp-table` binaries

// The Error enum carries OIDs inline.
#![allow(clippy::result_large_err)]

pub mod ber;
pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod message;
pub mod oid;
pub mod pdu;
pub mod prelude;
pub mod sequencer;
pub mod table;
pub mod transport;
pub mod value;
pub mod varbind;
pub mod version;

pub(crate) mod util;

#[cfg(feature = "cli")]
pub mod cli;

pub use client::{Backoff, Client, ClientBuilder, ClientConfig, Retry, Walk};
pub use config::AgentConfig;
pub use error::{
    EncodeErrorKind, Error, ErrorCode, LayoutErrorKind, OidErrorKind, Result, WalkFailure,
};
pub use message::CommunityMessage;
pub use oid::Oid;
pub use pdu::{Pdu, PduType};
pub use sequencer::{Sequencer, SequencerEvent};
pub use table::{Table, TableLayout};
pub use transport::{Transport, UdpTransport};
pub use value::Value;
pub use varbind::VarBind;
pub use version::Version;

/// Client over a dedicated UDP socket.
pub type UdpClient = Client<UdpTransport>;

//! Commonly used types in one import.
//!
//! ```rust,no_run
//! use basic_snmp::prelude::*;
//! ```

pub use crate::client::{Client, Retry};
pub use crate::error::{Error, ErrorCode, Result};
pub use crate::message::CommunityMessage;
pub use crate::oid::Oid;
pub use crate::table::{Table, TableLayout};
pub use crate::value::Value;
pub use crate::varbind::VarBind;
pub use crate::version::Version;

#[doc(no_inline)]
pub use crate::oid;

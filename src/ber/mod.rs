//! BER (Basic Encoding Rules) codec for SNMP.
//!
//! This module provides encoding and decoding of the BER subset SNMP v1/v2c uses:
//! integers of every numeric application tag, octet strings, NULL, object
//! identifiers, IPv4 addresses and constructed sequences.

mod decode;
mod encode;
mod length;
pub mod tag;

pub use decode::*;
pub use encode::*;
pub use length::*;
pub use tag::*;

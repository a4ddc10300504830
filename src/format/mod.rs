//! Formatting utilities for SNMP values.
//!
//! The codec exposes typed accessors; these helpers turn values and raw
//! varbind bytes into text for diagnostics and simple front ends.
//!
//! ```
//! use basic_snmp::Value;
//! use basic_snmp::format::{hex_dump, printable_value};
//!
//! assert_eq!(printable_value(&Value::Null), "<null>");
//! assert_eq!(hex_dump(&[0x05, 0x00]), "0000  05 00");
//! ```

pub mod hex;

use crate::value::Value;
use std::fmt::Write;

const DUMP_WIDTH: usize = 16;

/// Render a value for a table cell.
///
/// Numbers print in decimal, `NULL` as `<null>`, strings as text when they
/// are printable and as hex otherwise. Kinds without a textual form print as
/// `<no displayable>`.
pub fn printable_value(value: &Value) -> String {
    match value {
        Value::Null => "<null>".to_string(),
        Value::Integer(v) | Value::Integer64(v) => v.to_string(),
        Value::UnsignedInteger(v)
        | Value::Counter(v)
        | Value::Gauge(v)
        | Value::TimeTicks(v)
        | Value::Counter64(v)
        | Value::Unsigned64(v) => v.to_string(),
        Value::OctetString(data) => printable_string(data),
        Value::ObjectIdentifier(oid) => oid.to_string(),
        Value::IpAddress(addr) => std::net::Ipv4Addr::from(*addr).to_string(),
        _ => "<no displayable>".to_string(),
    }
}

fn printable_string(data: &[u8]) -> String {
    match std::str::from_utf8(data) {
        Ok(s) if s.chars().all(|c| !c.is_control() || c == '\n' || c == '\t') => s.to_string(),
        _ => hex_dump_inline(data),
    }
}

fn hex_dump_inline(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 3);
    for (i, b) in data.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{:02X}", b);
    }
    out
}

/// Hex dump of raw bytes, 16 per line, each line prefixed with its offset.
pub fn hex_dump(data: &[u8]) -> String {
    let mut out = String::new();
    for (line, chunk) in data.chunks(DUMP_WIDTH).enumerate() {
        if line > 0 {
            out.push('\n');
        }
        let _ = write!(out, "{:04x}  ", line * DUMP_WIDTH);
        out.push_str(&hex_dump_inline(chunk));
    }
    out
}

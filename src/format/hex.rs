//! Hexadecimal encoding utilities.

use std::fmt;

/// Encode bytes as lowercase hex string.
///
/// # Examples
///
/// ```
/// use basic_snmp::format::hex::encode;
///
/// assert_eq!(encode(&[0xde, 0xad, 0xbe, 0xef]), "deadbeef");
/// assert_eq!(encode(&[0x00, 0xff]), "00ff");
/// ```
pub fn encode(bytes: &[u8]) -> String {
    Bytes(bytes).to_string()
}

/// Lazy hex formatter for log fields.
///
/// Nothing is formatted unless the event is actually recorded.
///
/// # Examples
///
/// ```
/// use basic_snmp::format::hex::Bytes;
///
/// assert_eq!(format!("{}", Bytes(&[0x30, 0x2c])), "302c");
/// ```
pub struct Bytes<'a>(pub &'a [u8]);

impl fmt::Debug for Bytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Display for Bytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

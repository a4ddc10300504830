//! BER length encoding and decoding.
//!
//! Length encoding follows X.690 Section 8.1.3:
//! - Short form: single byte, values 0-126
//! - Long form: initial byte (bit 8=1, bits 7-1=count), followed by big-endian length bytes
//! - Indefinite form (0x80): rejected
//!
//! The encoder switches to the long form at 127, so a length byte of 0x7F is
//! never produced even though decoders accept it.

use crate::error::internal::DecodeErrorKind;
use crate::error::{Error, Result};

/// Maximum length we'll accept.
///
/// An SNMP datagram cannot exceed 64KB; anything above this is garbage.
pub const MAX_LENGTH: usize = 0x10000;

/// Largest value written in short form.
const SHORT_FORM_MAX: usize = 126;

/// Encode a length value into the buffer (returns bytes in reverse order for prepending)
pub fn encode_length(len: usize) -> ([u8; 5], usize) {
    let mut buf = [0u8; 5];

    if len <= SHORT_FORM_MAX {
        buf[0] = len as u8;
        return (buf, 1);
    }

    let mut count = 0;
    let mut rest = len;
    while rest > 0 && count < 4 {
        buf[count] = rest as u8;
        rest >>= 8;
        count += 1;
    }
    buf[count] = 0x80 | count as u8;
    (buf, count + 1)
}

/// Decode a length from bytes, returning (length, bytes_consumed)
///
/// The `base_offset` parameter is used to report error offsets correctly
/// when this is called from within a decoder.
pub fn decode_length(data: &[u8], base_offset: usize) -> Result<(usize, usize)> {
    let Some(&first) = data.first() else {
        return Err(length_error(
            base_offset,
            DecodeErrorKind::TruncatedLength {
                needed: 1,
                available: 0,
            },
        ));
    };

    if first == 0x80 {
        return Err(length_error(base_offset, DecodeErrorKind::IndefiniteLength));
    }

    if first & 0x80 == 0 {
        return Ok((first as usize, 1));
    }

    let num_octets = (first & 0x7F) as usize;
    if num_octets > 4 {
        return Err(length_error(
            base_offset,
            DecodeErrorKind::LengthTooLong { octets: num_octets },
        ));
    }

    if data.len() < 1 + num_octets {
        return Err(length_error(
            base_offset,
            DecodeErrorKind::TruncatedLength {
                needed: num_octets,
                available: data.len() - 1,
            },
        ));
    }

    let len = data[1..=num_octets]
        .iter()
        .fold(0usize, |acc, &b| (acc << 8) | b as usize);

    if len > MAX_LENGTH {
        return Err(length_error(
            base_offset,
            DecodeErrorKind::LengthTooLong { octets: num_octets },
        ));
    }

    Ok((len, 1 + num_octets))
}

fn length_error(offset: usize, kind: DecodeErrorKind) -> Error {
    tracing::debug!(target: "basic_snmp::ber", { snmp.offset = %offset, kind = %kind }, "bad length");
    Error::decode(offset, kind.code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    /// Helper to put the reversed encoding back in wire order.
    fn encoded(len: usize) -> Vec<u8> {
        let (buf, count) = encode_length(len);
        buf[..count].iter().rev().copied().collect()
    }

    #[test]
    fn test_encode_boundaries() {
        assert_eq!(encoded(0), vec![0x00]);
        assert_eq!(encoded(126), vec![0x7E]);
        assert_eq!(encoded(127), vec![0x81, 0x7F]);
        assert_eq!(encoded(128), vec![0x81, 0x80]);
        assert_eq!(encoded(255), vec![0x81, 0xFF]);
        assert_eq!(encoded(256), vec![0x82, 0x01, 0x00]);
        assert_eq!(encoded(65535), vec![0x82, 0xFF, 0xFF]);
        assert_eq!(encoded(65536), vec![0x83, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn test_short_form() {
        assert_eq!(decode_length(&[0], 0).unwrap(), (0, 1));
        assert_eq!(decode_length(&[127], 0).unwrap(), (127, 1));
        assert_eq!(decode_length(&[1], 0).unwrap(), (1, 1));
    }

    #[test]
    fn test_long_form() {
        assert_eq!(decode_length(&[0x81, 0x7F], 0).unwrap(), (127, 2));
        assert_eq!(decode_length(&[0x81, 128], 0).unwrap(), (128, 2));
        assert_eq!(decode_length(&[0x82, 0x01, 0x2C], 0).unwrap(), (300, 3));
        assert_eq!(decode_length(&[0x82, 0xFF, 0xFF], 0).unwrap(), (65535, 3));
    }

    #[test]
    fn test_truncated_long_form() {
        let err = decode_length(&[0x82, 0x01], 9).unwrap_err();
        match err {
            Error::Decode { offset, code } => {
                assert_eq!(offset, 9);
                assert_eq!(code, ErrorCode::DatagramInterrupted);
            }
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input() {
        let err = decode_length(&[], 3).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::DatagramInterrupted));
    }

    #[test]
    fn test_indefinite_rejected() {
        assert!(decode_length(&[0x80], 0).is_err());
    }

    #[test]
    fn test_oversized_rejected() {
        assert!(decode_length(&[0x84, 0x01, 0x00, 0x00, 0x00], 0).is_err());
        assert!(decode_length(&[0x85, 0, 0, 0, 0, 1], 0).is_err());
    }
}

//! Internal error types for tracing and debugging.
//!
//! These types are not part of the public API. They carry the detail that is
//! logged via tracing, while callers only see the flat [`ErrorCode`].

use super::ErrorCode;

/// BER decode error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DecodeErrorKind {
    /// Buffer ended while reading a tag byte.
    TruncatedTag,
    /// Buffer ended inside a long-form length.
    TruncatedLength { needed: usize, available: usize },
    /// Indefinite length not supported.
    IndefiniteLength,
    /// Length field too long.
    LengthTooLong { octets: usize },
    /// Content extends past end of data.
    InsufficientData { needed: usize, available: usize },
    /// Expected different tag.
    UnexpectedTag { expected: u8, actual: u8 },
    /// Tag is not one of the accepted set.
    TagNotAccepted { actual: u8 },
    /// Zero-length integer.
    ZeroLengthInteger,
    /// Integer wider than the target type.
    IntegerTooLong { length: usize, max: usize },
    /// Unsigned integer with its sign bit set.
    UnsignedSignBit,
    /// NULL with non-zero length.
    InvalidNull,
    /// BOOLEAN content not exactly one byte.
    InvalidBooleanLength { length: usize },
    /// Invalid IP address length.
    InvalidIpAddressLength { length: usize },
    /// OID content ends inside an arc.
    TruncatedOidArc,
    /// OID arc does not fit in 64 bits.
    OidArcOverflow,
    /// Unknown SNMP version.
    UnknownVersion(i64),
    /// PDU tag not accepted by the message decoder.
    UnknownPduType(u8),
}

impl DecodeErrorKind {
    /// Map to the public error code.
    pub(crate) fn code(&self) -> ErrorCode {
        match self {
            Self::TruncatedTag | Self::TruncatedLength { .. } => ErrorCode::DatagramInterrupted,
            Self::InsufficientData { .. } | Self::TruncatedOidArc => ErrorCode::NotEnoughRoom,
            Self::UnexpectedTag { .. } | Self::TagNotAccepted { .. } | Self::UnknownPduType(_) => {
                ErrorCode::WrongType
            }
            Self::IndefiniteLength
            | Self::LengthTooLong { .. }
            | Self::ZeroLengthInteger
            | Self::IntegerTooLong { .. }
            | Self::InvalidNull
            | Self::InvalidBooleanLength { .. }
            | Self::InvalidIpAddressLength { .. } => ErrorCode::WrongLength,
            Self::UnsignedSignBit => ErrorCode::UnsignedMalformed,
            Self::OidArcOverflow => ErrorCode::WrongEncoding,
            Self::UnknownVersion(_) => ErrorCode::BadValue,
        }
    }
}

impl std::fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TruncatedTag => write!(f, "unexpected end of data reading tag"),
            Self::TruncatedLength { needed, available } => {
                write!(
                    f,
                    "length needs {} bytes but only {} remaining",
                    needed, available
                )
            }
            Self::IndefiniteLength => write!(f, "indefinite length encoding not supported"),
            Self::LengthTooLong { octets } => {
                write!(f, "length encoding too long ({} octets)", octets)
            }
            Self::InsufficientData { needed, available } => {
                write!(f, "need {} bytes but only {} remaining", needed, available)
            }
            Self::UnexpectedTag { expected, actual } => {
                write!(f, "expected tag 0x{:02X}, got 0x{:02X}", expected, actual)
            }
            Self::TagNotAccepted { actual } => write!(f, "tag 0x{:02X} not accepted here", actual),
            Self::ZeroLengthInteger => write!(f, "zero-length integer"),
            Self::IntegerTooLong { length, max } => {
                write!(f, "integer of {} bytes exceeds {} bytes", length, max)
            }
            Self::UnsignedSignBit => write!(f, "unsigned integer has sign bit set"),
            Self::InvalidNull => write!(f, "NULL with non-zero length"),
            Self::InvalidBooleanLength { length } => {
                write!(f, "BOOLEAN must be 1 byte, got {}", length)
            }
            Self::InvalidIpAddressLength { length } => {
                write!(f, "IP address must be 4 bytes, got {}", length)
            }
            Self::TruncatedOidArc => write!(f, "OID ends inside an arc"),
            Self::OidArcOverflow => write!(f, "OID arc overflows 64 bits"),
            Self::UnknownVersion(v) => write!(f, "unknown SNMP version: {}", v),
            Self::UnknownPduType(t) => write!(f, "unknown PDU type: 0x{:02X}", t),
        }
    }
}

//! Error types for basic-snmp.
//!
//! All errors are `#[non_exhaustive]` to allow adding new variants without breaking changes.
//!
//! Decode failures and protocol error-status values share one flat [`ErrorCode`]
//! enumeration: the negative range is local (never sent on the wire), the
//! non-negative range is the RFC 3416 error-status carried in responses.

pub(crate) mod internal;

use std::net::SocketAddr;
use std::time::Duration;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Flat SNMP error code.
///
/// Covers both local decode failures and the error-status values an agent
/// reports in a Response PDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    /// The datagram ended while reading a tag or a length.
    DatagramInterrupted,
    /// An unsigned integer arrived with its sign bit set.
    UnsignedMalformed,
    /// A TLV claims more bytes than the buffer holds.
    NotEnoughRoom,
    NoError,
    TooBig,
    NoSuchName,
    BadValue,
    ReadOnly,
    GenericError,
    NoAccess,
    WrongType,
    WrongLength,
    WrongEncoding,
    WrongValue,
    NoCreation,
    InconsistentValue,
    ResourceUnavailable,
    CommitFailed,
    UndoFailed,
    AuthorizationError,
    NotWritable,
    InconsistentName,
    /// Error-status value outside the known range.
    Unknown(i32),
}

impl ErrorCode {
    /// Create from a raw code.
    pub fn from_i32(value: i32) -> Self {
        match value {
            -100 => Self::DatagramInterrupted,
            -99 => Self::UnsignedMalformed,
            -98 => Self::NotEnoughRoom,
            0 => Self::NoError,
            1 => Self::TooBig,
            2 => Self::NoSuchName,
            3 => Self::BadValue,
            4 => Self::ReadOnly,
            5 => Self::GenericError,
            6 => Self::NoAccess,
            7 => Self::WrongType,
            8 => Self::WrongLength,
            9 => Self::WrongEncoding,
            10 => Self::WrongValue,
            11 => Self::NoCreation,
            12 => Self::InconsistentValue,
            13 => Self::ResourceUnavailable,
            14 => Self::CommitFailed,
            15 => Self::UndoFailed,
            16 => Self::AuthorizationError,
            17 => Self::NotWritable,
            18 => Self::InconsistentName,
            other => Self::Unknown(other),
        }
    }

    /// Convert to the raw code.
    pub fn as_i32(&self) -> i32 {
        match self {
            Self::DatagramInterrupted => -100,
            Self::UnsignedMalformed => -99,
            Self::NotEnoughRoom => -98,
            Self::NoError => 0,
            Self::TooBig => 1,
            Self::NoSuchName => 2,
            Self::BadValue => 3,
            Self::ReadOnly => 4,
            Self::GenericError => 5,
            Self::NoAccess => 6,
            Self::WrongType => 7,
            Self::WrongLength => 8,
            Self::WrongEncoding => 9,
            Self::WrongValue => 10,
            Self::NoCreation => 11,
            Self::InconsistentValue => 12,
            Self::ResourceUnavailable => 13,
            Self::CommitFailed => 14,
            Self::UndoFailed => 15,
            Self::AuthorizationError => 16,
            Self::NotWritable => 17,
            Self::InconsistentName => 18,
            Self::Unknown(code) => *code,
        }
    }

    /// True for codes produced by the local decoder.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::DatagramInterrupted | Self::UnsignedMalformed | Self::NotEnoughRoom
        )
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatagramInterrupted => write!(f, "datagram interrupted"),
            Self::UnsignedMalformed => write!(f, "unsigned value malformed"),
            Self::NotEnoughRoom => write!(f, "not enough room"),
            Self::NoError => write!(f, "no error"),
            Self::TooBig => write!(f, "too big"),
            Self::NoSuchName => write!(f, "no such name"),
            Self::BadValue => write!(f, "bad value"),
            Self::ReadOnly => write!(f, "read only"),
            Self::GenericError => write!(f, "generic error"),
            Self::NoAccess => write!(f, "not accessible"),
            Self::WrongType => write!(f, "wrong type"),
            Self::WrongLength => write!(f, "wrong length"),
            Self::WrongEncoding => write!(f, "wrong encoding"),
            Self::WrongValue => write!(f, "wrong value"),
            Self::NoCreation => write!(f, "cannot create"),
            Self::InconsistentValue => {
                write!(f, "value inconsistent with other object values")
            }
            Self::ResourceUnavailable => write!(f, "no resources available"),
            Self::CommitFailed => write!(f, "commit failed; no variables updated"),
            Self::UndoFailed => write!(
                f,
                "some variables were updated because undo was not possible"
            ),
            Self::AuthorizationError => write!(f, "authorization error"),
            Self::NotWritable => write!(f, "cannot modify object"),
            Self::InconsistentName => write!(
                f,
                "cannot create object because its name is inconsistent with other objects"
            ),
            Self::Unknown(code) => write!(f, "unknown error code {}", code),
        }
    }
}

/// OID validation error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OidErrorKind {
    /// Empty OID string.
    Empty,
    /// Invalid arc value.
    InvalidArc,
    /// First arc must be 0, 1, or 2.
    InvalidFirstArc(u64),
    /// Second arc too large for first arc value.
    InvalidSecondArc { first: u64, second: u64 },
    /// OID too short (minimum 2 arcs).
    TooShort,
}

impl std::fmt::Display for OidErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty OID"),
            Self::InvalidArc => write!(f, "invalid arc value"),
            Self::InvalidFirstArc(v) => write!(f, "first arc must be 0, 1, or 2, got {}", v),
            Self::InvalidSecondArc { first, second } => {
                write!(f, "second arc {} too large for first arc {}", second, first)
            }
            Self::TooShort => write!(f, "OID must have at least 2 arcs"),
        }
    }
}

/// Encode error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeErrorKind {
    /// The message carries no variable bindings.
    NoVarbinds,
    /// A varbind OID cannot be BER-encoded.
    InvalidOid(OidErrorKind),
}

impl std::fmt::Display for EncodeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoVarbinds => write!(f, "message has no variable bindings"),
            Self::InvalidOid(kind) => write!(f, "varbind OID not encodable: {}", kind),
        }
    }
}

/// Table layout validation error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutErrorKind {
    /// The last column comes before the first.
    ColumnRange { first: u64, last: u64 },
    /// The column range is wider than the table model accepts.
    TooManyColumns { first: u64, last: u64, max: usize },
    /// The status column lies outside the column range.
    StatusColumnOutside(u64),
}

impl std::fmt::Display for LayoutErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ColumnRange { first, last } => {
                write!(f, "last column {} is before first column {}", last, first)
            }
            Self::TooManyColumns { first, last, max } => {
                write!(f, "columns {}..={} exceed the limit of {}", first, last, max)
            }
            Self::StatusColumnOutside(column) => {
                write!(f, "status column {} is outside the column range", column)
            }
        }
    }
}

/// Why a table walk ended without reaching the end of the subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkFailure {
    /// Retries were exhausted without an answer.
    Timeout,
    /// The walk was cancelled by its owner.
    Cancelled,
    /// The next request could not be encoded.
    Encode,
}

impl std::fmt::Display for WalkFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "timed out"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Encode => write!(f, "failed to encode next request"),
        }
    }
}

/// Library error type.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error during communication.
    #[error("I/O error{}: {source}", target.map(|t| format!(" communicating with {}", t)).unwrap_or_default())]
    Io {
        target: Option<SocketAddr>,
        #[source]
        source: std::io::Error,
    },

    /// Request timed out (after retries if configured).
    #[error("timeout after {elapsed:?}{} (request_id={request_id}, retries={retries})", target.map(|t| format!(" waiting for {}", t)).unwrap_or_default())]
    Timeout {
        target: Option<SocketAddr>,
        elapsed: Duration,
        request_id: i32,
        retries: u32,
    },

    /// SNMP protocol error returned by agent.
    #[error("SNMP error{}: {status} at index {index}", target.map(|t| format!(" from {}", t)).unwrap_or_default())]
    Snmp {
        target: Option<SocketAddr>,
        status: ErrorCode,
        index: u32,
        oid: Option<crate::oid::Oid>,
    },

    /// Invalid OID format.
    #[error("invalid OID: {kind}")]
    InvalidOid {
        kind: OidErrorKind,
        input: Option<Box<str>>, // Only allocated when parsing string input
    },

    /// BER decoding error.
    #[error("decode error at offset {offset}: {code}")]
    Decode { offset: usize, code: ErrorCode },

    /// Encoding error.
    #[error("encode error: {kind}")]
    Encode { kind: EncodeErrorKind },

    /// Table layout that cannot hold a table.
    #[error("invalid table layout: {kind}")]
    InvalidLayout { kind: LayoutErrorKind },

    /// Response request ID doesn't match.
    #[error("request ID mismatch: expected {expected}, got {actual}")]
    RequestIdMismatch { expected: i32, actual: i32 },

    /// A table walk ended abnormally.
    #[error("table walk {request_id} {reason}")]
    WalkFailed {
        request_id: i32,
        reason: WalkFailure,
    },

    /// A walk step returned an OID not after the previous one.
    #[error("non-increasing OID in walk: {current} after {previous}")]
    NonIncreasingOid {
        previous: crate::oid::Oid,
        current: crate::oid::Oid,
    },

    /// Empty response where at least one varbind was required.
    #[error("empty response{}", target.map(|t| format!(" from {}", t)).unwrap_or_default())]
    EmptyResponse { target: Option<SocketAddr> },
}

impl Error {
    /// Create a decode error.
    pub fn decode(offset: usize, code: ErrorCode) -> Self {
        Self::Decode { offset, code }
    }

    /// Create an encode error.
    pub fn encode(kind: EncodeErrorKind) -> Self {
        Self::Encode { kind }
    }

    /// Create an invalid layout error.
    pub fn invalid_layout(kind: LayoutErrorKind) -> Self {
        Self::InvalidLayout { kind }
    }

    /// Create an invalid OID error from a kind (no input string).
    pub fn invalid_oid(kind: OidErrorKind) -> Self {
        Self::InvalidOid { kind, input: None }
    }

    /// Create an invalid OID error with the input string that failed.
    pub fn invalid_oid_with_input(kind: OidErrorKind, input: impl Into<Box<str>>) -> Self {
        Self::InvalidOid {
            kind,
            input: Some(input.into()),
        }
    }

    /// The flat error code for errors that carry one.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Decode { code, .. } => Some(*code),
            Self::Snmp { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get the target address if this error has one.
    pub fn target(&self) -> Option<SocketAddr> {
        match self {
            Self::Io { target, .. } => *target,
            Self::Timeout { target, .. } => *target,
            Self::Snmp { target, .. } => *target,
            Self::EmptyResponse { target } => *target,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_roundtrip() {
        for raw in [-100, -99, -98, 0, 1, 5, 13, 18] {
            assert_eq!(ErrorCode::from_i32(raw).as_i32(), raw);
        }
        assert_eq!(ErrorCode::from_i32(42), ErrorCode::Unknown(42));
        assert_eq!(ErrorCode::from_i32(-100), ErrorCode::DatagramInterrupted);
        assert_eq!(ErrorCode::from_i32(5), ErrorCode::GenericError);
    }

    #[test]
    fn test_local_codes() {
        assert!(ErrorCode::NotEnoughRoom.is_local());
        assert!(ErrorCode::UnsignedMalformed.is_local());
        assert!(!ErrorCode::NoError.is_local());
        assert!(!ErrorCode::WrongLength.is_local());
    }

    #[test]
    fn test_decode_error_display() {
        let err = Error::decode(17, ErrorCode::NotEnoughRoom);
        assert_eq!(err.to_string(), "decode error at offset 17: not enough room");
        assert_eq!(err.code(), Some(ErrorCode::NotEnoughRoom));
    }
}

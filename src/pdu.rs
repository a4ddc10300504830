//! SNMP Protocol Data Units (PDUs).
//!
//! PDUs represent the different SNMP operations.

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::internal::DecodeErrorKind;
use crate::error::{Error, ErrorCode, Result};
use crate::oid::Oid;
use crate::varbind::{VarBind, decode_varbind_list_with_raw, encode_varbind_list};

/// PDU type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PduType {
    GetRequest = tag::pdu::GET_REQUEST,
    GetNextRequest = tag::pdu::GET_NEXT_REQUEST,
    Response = tag::pdu::RESPONSE,
    SetRequest = tag::pdu::SET_REQUEST,
    Trap = tag::pdu::TRAP,
}

impl PduType {
    /// Create from tag byte.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            tag::pdu::GET_REQUEST => Some(Self::GetRequest),
            tag::pdu::GET_NEXT_REQUEST => Some(Self::GetNextRequest),
            tag::pdu::RESPONSE => Some(Self::Response),
            tag::pdu::SET_REQUEST => Some(Self::SetRequest),
            tag::pdu::TRAP => Some(Self::Trap),
            _ => None,
        }
    }

    /// Get the tag byte.
    pub fn tag(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for PduType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GetRequest => write!(f, "GetRequest"),
            Self::GetNextRequest => write!(f, "GetNextRequest"),
            Self::Response => write!(f, "Response"),
            Self::SetRequest => write!(f, "SetRequest"),
            Self::Trap => write!(f, "Trap"),
        }
    }
}

/// Generic PDU structure for request/response operations.
///
/// `error_status` and `error_index` only carry meaning on responses; requests
/// always encode them as zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pdu {
    /// PDU type
    pub pdu_type: PduType,
    /// Request ID for correlating requests and responses
    pub request_id: i32,
    /// Error status (NoError for requests)
    pub error_status: ErrorCode,
    /// Error index (1-based index of the offending varbind, 0 for none)
    pub error_index: i32,
    /// Variable bindings
    pub varbinds: Vec<VarBind>,
}

impl Pdu {
    /// Create a request PDU of any type with the given varbinds.
    pub fn request(pdu_type: PduType, request_id: i32, varbinds: Vec<VarBind>) -> Self {
        Self {
            pdu_type,
            request_id,
            error_status: ErrorCode::NoError,
            error_index: 0,
            varbinds,
        }
    }

    /// Create a new GET request PDU.
    pub fn get_request(request_id: i32, oids: &[Oid]) -> Self {
        Self::request(
            PduType::GetRequest,
            request_id,
            oids.iter().map(|oid| VarBind::null(oid.clone())).collect(),
        )
    }

    /// Create a new GETNEXT request PDU.
    pub fn get_next_request(request_id: i32, oids: &[Oid]) -> Self {
        Self::request(
            PduType::GetNextRequest,
            request_id,
            oids.iter().map(|oid| VarBind::null(oid.clone())).collect(),
        )
    }

    /// Create a new SET request PDU.
    pub fn set_request(request_id: i32, varbinds: Vec<VarBind>) -> Self {
        Self::request(PduType::SetRequest, request_id, varbinds)
    }

    /// Check if this is a request (error fields forced to zero on the wire).
    pub fn is_request(&self) -> bool {
        matches!(
            self.pdu_type,
            PduType::GetRequest | PduType::GetNextRequest | PduType::SetRequest
        )
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        let (error_status, error_index) = if self.is_request() {
            (0, 0)
        } else {
            (self.error_status.as_i32(), self.error_index)
        };

        buf.push_constructed(self.pdu_type.tag(), |buf| {
            encode_varbind_list(buf, &self.varbinds);
            buf.push_integer(error_index as i64);
            buf.push_integer(error_status as i64);
            buf.push_integer(self.request_id as i64);
        });
    }

    /// Decode from BER.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        Self::decode_with_raw(decoder, false)
    }

    /// Decode from BER, optionally keeping each varbind's encoded bytes.
    ///
    /// A v1 Trap carries a different body and fails here with `WrongType`;
    /// it is recognized by tag only.
    pub fn decode_with_raw(decoder: &mut Decoder, include_raw: bool) -> Result<Self> {
        let start = decoder.offset();
        let tag = decoder.read_tag()?;
        let pdu_type = PduType::from_tag(tag).ok_or_else(|| {
            let kind = DecodeErrorKind::UnknownPduType(tag);
            tracing::debug!(target: "basic_snmp::ber", { snmp.offset = %start, kind = %kind }, "decode error");
            Error::decode(start, kind.code())
        })?;

        let len = decoder.read_length()?;
        let mut pdu_decoder = decoder.sub_decoder(len)?;

        let request_id = pdu_decoder.read_i32()?;
        let error_status = ErrorCode::from_i32(pdu_decoder.read_i32()?);
        let error_index = pdu_decoder.read_i32()?;
        let varbinds = decode_varbind_list_with_raw(&mut pdu_decoder, include_raw)?;
        decoder.absorb(pdu_decoder);

        Ok(Pdu {
            pdu_type,
            request_id,
            error_status,
            error_index,
            varbinds,
        })
    }

    /// Check if this is an error response.
    pub fn is_error(&self) -> bool {
        self.error_status != ErrorCode::NoError
    }

    /// The varbind named by `error_index`, if any.
    pub fn error_varbind(&self) -> Option<&VarBind> {
        usize::try_from(self.error_index)
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| self.varbinds.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;
    use crate::value::Value;

    fn encode(pdu: &Pdu) -> Vec<u8> {
        let mut buf = EncodeBuf::new();
        pdu.encode(&mut buf);
        buf.finish_vec()
    }

    #[test]
    fn test_get_request_roundtrip() {
        let pdu = Pdu::get_request(12345, &[oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)]);
        let mut decoder = Decoder::from_slice(&encode(&pdu));
        let decoded = Pdu::decode(&mut decoder).unwrap();

        assert_eq!(decoded, pdu);
        assert_eq!(decoded.varbinds[0].value, Value::Null);
    }

    #[test]
    fn test_request_error_fields_encode_as_zero() {
        let mut pdu = Pdu::set_request(1, vec![VarBind::new(oid!(1, 3), Value::Integer(5))]);
        pdu.error_status = ErrorCode::GenericError;
        pdu.error_index = 1;

        let bytes = encode(&pdu);
        // A3 len | 02 01 01 | 02 01 00 | 02 01 00
        assert_eq!(&bytes[2..11], &[0x02, 0x01, 0x01, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00]);
    }

    #[test]
    fn test_response_keeps_error_fields() {
        let pdu = Pdu {
            pdu_type: PduType::Response,
            request_id: 9,
            error_status: ErrorCode::NoSuchName,
            error_index: 2,
            varbinds: vec![
                VarBind::null(oid!(1, 3, 6, 1)),
                VarBind::null(oid!(1, 3, 6, 2)),
            ],
        };
        let mut decoder = Decoder::from_slice(&encode(&pdu));
        let decoded = Pdu::decode(&mut decoder).unwrap();
        assert_eq!(decoded.error_status, ErrorCode::NoSuchName);
        assert!(decoded.is_error());
        assert_eq!(decoded.error_varbind().map(|vb| &vb.oid), Some(&oid!(1, 3, 6, 2)));
    }

    #[test]
    fn test_unknown_error_status_preserved() {
        let pdu = Pdu {
            pdu_type: PduType::Response,
            request_id: 1,
            error_status: ErrorCode::Unknown(77),
            error_index: 0,
            varbinds: vec![],
        };
        let mut decoder = Decoder::from_slice(&encode(&pdu));
        assert_eq!(
            Pdu::decode(&mut decoder).unwrap().error_status,
            ErrorCode::Unknown(77)
        );
    }

    #[test]
    fn test_unknown_pdu_tag() {
        let mut decoder = Decoder::from_slice(&[0xA5, 0x00]);
        assert_eq!(
            Pdu::decode(&mut decoder).unwrap_err().code(),
            Some(ErrorCode::WrongType)
        );
    }

    #[test]
    fn test_pdu_type_tags() {
        for t in 0xA0..=0xA4u8 {
            assert_eq!(PduType::from_tag(t).map(PduType::tag), Some(t));
        }
        assert_eq!(PduType::from_tag(0xA8), None);
    }
}

//! Community-based SNMP message format (v1/v2c).
//!
//! V1 and V2c messages share the same structure:
//! `SEQUENCE { version INTEGER, community OCTET STRING, pdu PDU }`
//!
//! The only difference is the version number (0 for v1, 1 for v2c).

use crate::ber::{DecodeWarning, Decoder, EncodeBuf, tag};
use crate::error::internal::DecodeErrorKind;
use crate::error::{EncodeErrorKind, Error, ErrorCode, Result};
use crate::oid::Oid;
use crate::pdu::{Pdu, PduType};
use crate::value::Value;
use crate::varbind::VarBind;
use crate::version::Version;
use bytes::Bytes;

/// Community-based SNMP message (v1/v2c).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityMessage {
    /// SNMP version (V1 or V2c)
    pub version: Version,
    /// Community string for authentication
    pub community: Bytes,
    /// Protocol data unit
    pub pdu: Pdu,
    /// Non-fatal anomalies found by [`decode_all`](Self::decode_all).
    ///
    /// Always empty for messages built locally.
    pub warnings: Vec<DecodeWarning>,
}

impl CommunityMessage {
    /// Create a new community message.
    pub fn new(version: Version, community: impl Into<Bytes>, pdu: Pdu) -> Self {
        Self {
            version,
            community: community.into(),
            pdu,
            warnings: Vec::new(),
        }
    }

    /// Build a GetRequest with one NULL-valued varbind per OID.
    ///
    /// # Examples
    ///
    /// ```
    /// use basic_snmp::{CommunityMessage, Version, oid};
    ///
    /// let msg = CommunityMessage::setup_get_request(
    ///     Version::V1,
    ///     "private",
    ///     1,
    ///     &[oid!(1, 3, 6, 1, 4, 1, 2680, 1, 2, 7, 3, 2, 0)],
    /// );
    /// let bytes = msg.encode_request().unwrap();
    /// assert_eq!(&bytes[..4], &[0x30, 0x2C, 0x02, 0x01]);
    /// ```
    pub fn setup_get_request(
        version: Version,
        community: impl Into<Bytes>,
        request_id: i32,
        oids: &[Oid],
    ) -> Self {
        Self::new(version, community, Pdu::get_request(request_id, oids))
    }

    /// Build a GetNextRequest with one NULL-valued varbind per OID.
    pub fn setup_get_next_request(
        version: Version,
        community: impl Into<Bytes>,
        request_id: i32,
        oids: &[Oid],
    ) -> Self {
        Self::new(version, community, Pdu::get_next_request(request_id, oids))
    }

    /// Build a SetRequest carrying the given varbinds.
    pub fn setup_set_request(
        version: Version,
        community: impl Into<Bytes>,
        request_id: i32,
        varbinds: Vec<VarBind>,
    ) -> Self {
        Self::new(version, community, Pdu::set_request(request_id, varbinds))
    }

    /// Append a varbind addressing a table cell: `base ⧺ [column] ⧺ keys`.
    pub fn add_cell_varbind(&mut self, base: &Oid, keys: &[u64], column: u64, value: Value) {
        let mut oid = base.child(column);
        oid.extend_from_slice(keys);
        self.pdu.varbinds.push(VarBind::new(oid, value));
    }

    /// Encode to BER.
    ///
    /// Every varbind name, and every OID value, must be encodable (at least
    /// two arcs, valid leading arcs).
    pub fn encode(&self) -> Result<Bytes> {
        for vb in &self.pdu.varbinds {
            check_oid(&vb.oid)?;
            if let Value::ObjectIdentifier(oid) = &vb.value {
                check_oid(oid)?;
            }
        }

        let mut buf = EncodeBuf::new();
        buf.push_sequence(|buf| {
            self.pdu.encode(buf);
            buf.push_octet_string(&self.community);
            buf.push_integer(self.version.as_i32() as i64);
        });

        Ok(buf.finish())
    }

    /// Encode a request for the wire.
    ///
    /// Like [`encode`](Self::encode), and additionally refuses a request
    /// without variable bindings.
    pub fn encode_request(&self) -> Result<Bytes> {
        if self.pdu.varbinds.is_empty() {
            return Err(Error::encode(EncodeErrorKind::NoVarbinds));
        }
        self.encode()
    }

    /// Decode a full datagram.
    ///
    /// Only GetRequest, Response and SetRequest PDUs are accepted. Any
    /// structural failure aborts the whole decode and reports the first error
    /// with its byte offset. With `include_raw` each varbind keeps its
    /// encoded bytes.
    pub fn decode_all(data: Bytes, include_raw: bool) -> Result<Self> {
        let mut decoder = Decoder::new(data);
        let mut seq = decoder.read_sequence()?;

        let version_offset = seq.offset();
        let version_num = seq.read_integer()?;
        let version = i32::try_from(version_num)
            .ok()
            .and_then(Version::from_i32)
            .ok_or_else(|| {
                decode_error(version_offset, DecodeErrorKind::UnknownVersion(version_num))
            })?;

        let community = seq.read_octet_string()?;

        let pdu_offset = seq.offset();
        match seq.peek_tag() {
            Some(tag::pdu::GET_REQUEST | tag::pdu::RESPONSE | tag::pdu::SET_REQUEST) => {}
            Some(other) => {
                return Err(decode_error(
                    pdu_offset,
                    DecodeErrorKind::UnknownPduType(other),
                ));
            }
            // Let the PDU decoder report the truncation
            None => {}
        }
        let pdu = Pdu::decode_with_raw(&mut seq, include_raw)?;

        decoder.absorb(seq);
        Ok(CommunityMessage {
            version,
            community,
            pdu,
            warnings: decoder.take_warnings(),
        })
    }

    /// Decode a full datagram without keeping raw varbind bytes.
    pub fn decode(data: Bytes) -> Result<Self> {
        Self::decode_all(data, false)
    }

    /// The PDU's error status rendered for people, naming the offending
    /// object when the agent gave one.
    ///
    /// # Examples
    ///
    /// ```
    /// use basic_snmp::{CommunityMessage, ErrorCode, Version};
    ///
    /// let mut msg = CommunityMessage::setup_get_request(Version::V2c, "public", 1, &[]);
    /// msg.pdu.error_status = ErrorCode::NoSuchName;
    /// msg.pdu.error_index = 2;
    /// assert_eq!(msg.error_description(), "no such name in object 2");
    /// ```
    pub fn error_description(&self) -> String {
        if self.pdu.error_index != 0 {
            format!("{} in object {}", self.pdu.error_status, self.pdu.error_index)
        } else {
            self.pdu.error_status.to_string()
        }
    }

    /// The first non-fatal decode anomaly, if any.
    pub fn first_warning(&self) -> Option<ErrorCode> {
        self.warnings.first().map(|w| w.code)
    }

    /// Check if this message carries a response.
    pub fn is_response(&self) -> bool {
        self.pdu.pdu_type == PduType::Response
    }

    /// Consume and return the PDU.
    pub fn into_pdu(self) -> Pdu {
        self.pdu
    }
}

pub(crate) fn check_oid(oid: &Oid) -> Result<()> {
    oid.validate().map_err(|e| match e {
        Error::InvalidOid { kind, .. } => Error::encode(EncodeErrorKind::InvalidOid(kind)),
        other => other,
    })
}

fn decode_error(offset: usize, kind: DecodeErrorKind) -> Error {
    tracing::debug!(target: "basic_snmp::ber", { snmp.offset = %offset, kind = %kind }, "decode error");
    Error::decode(offset, kind.code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OidErrorKind;
    use crate::oid;

    const FULL_GET: [u8; 46] = [
        0x30, 0x2C, 0x02, 0x01, 0x00, 0x04, 0x07, 0x70, 0x72, 0x69, 0x76, 0x61, 0x74, 0x65,
        0xA0, 0x1E, 0x02, 0x01, 0x01, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00, 0x30, 0x13, 0x30,
        0x11, 0x06, 0x0D, 0x2B, 0x06, 0x01, 0x04, 0x01, 0x94, 0x78, 0x01, 0x02, 0x07, 0x03,
        0x02, 0x00, 0x05, 0x00,
    ];

    fn enterprise_oid() -> Oid {
        oid!(1, 3, 6, 1, 4, 1, 2680, 1, 2, 7, 3, 2, 0)
    }

    #[test]
    fn test_full_get_request_bytes() {
        let msg =
            CommunityMessage::setup_get_request(Version::V1, "private", 1, &[enterprise_oid()]);
        assert_eq!(&msg.encode_request().unwrap()[..], &FULL_GET[..]);
    }

    #[test]
    fn test_full_get_request_decodes() {
        let msg = CommunityMessage::decode_all(Bytes::from_static(&FULL_GET), false).unwrap();
        assert_eq!(msg.version, Version::V1);
        assert_eq!(&msg.community[..], b"private");
        assert_eq!(msg.pdu.pdu_type, PduType::GetRequest);
        assert_eq!(msg.pdu.request_id, 1);
        assert_eq!(msg.pdu.varbinds, vec![VarBind::null(enterprise_oid())]);
        assert!(msg.warnings.is_empty());
    }

    #[test]
    fn test_every_truncation_fails_cleanly() {
        for cut in 0..FULL_GET.len() {
            let err = CommunityMessage::decode_all(Bytes::copy_from_slice(&FULL_GET[..cut]), false)
                .unwrap_err();
            let code = err.code();
            assert!(
                code == Some(ErrorCode::NotEnoughRoom)
                    || code == Some(ErrorCode::DatagramInterrupted),
                "cut at {} gave {:?}",
                cut,
                err
            );
        }
    }

    #[test]
    fn test_oid_cut_mid_arc_with_consistent_lengths() {
        // Keep the message up to the 0x94 of arc 2680 and shrink every
        // enclosing length so only the OID itself is short
        let mut data = FULL_GET[..37].to_vec();
        data[1] -= 9;
        data[15] -= 9;
        data[26] -= 9;
        data[28] -= 9;
        data[30] -= 7;
        assert_eq!(data[1] as usize, data.len() - 2);

        let err = CommunityMessage::decode_all(Bytes::from(data), false).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NotEnoughRoom));
    }

    #[test]
    fn test_response_roundtrip_with_raw() {
        let pdu = Pdu {
            pdu_type: PduType::Response,
            request_id: 77,
            error_status: ErrorCode::NoError,
            error_index: 0,
            varbinds: vec![VarBind::new(enterprise_oid(), Value::Gauge(12))],
        };
        let bytes = CommunityMessage::new(Version::V2c, "public", pdu.clone())
            .encode()
            .unwrap();

        let decoded = CommunityMessage::decode_all(bytes.clone(), true).unwrap();
        assert_eq!(decoded.version, Version::V2c);
        assert_eq!(decoded.pdu.request_id, 77);
        let raw = decoded.pdu.varbinds[0].raw.clone().unwrap();
        assert!(bytes.ends_with(&raw));
        assert_eq!(raw[0], 0x30);
    }

    #[test]
    fn test_get_next_rejected_on_decode() {
        let msg =
            CommunityMessage::setup_get_next_request(Version::V2c, "public", 5, &[oid!(1, 3, 6)]);
        let bytes = msg.encode_request().unwrap();
        match CommunityMessage::decode(bytes).unwrap_err() {
            Error::Decode { offset, code } => {
                assert_eq!(code, ErrorCode::WrongType);
                // 30 len 02 01 01 04 06 "public" -> PDU at 13
                assert_eq!(offset, 13);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_unknown_version_is_bad_value() {
        let mut data = FULL_GET;
        data[4] = 0x03;
        assert_eq!(
            CommunityMessage::decode(Bytes::copy_from_slice(&data))
                .unwrap_err()
                .code(),
            Some(ErrorCode::BadValue)
        );
    }

    #[test]
    fn test_unsigned_malformed_is_soft() {
        let pdu = Pdu {
            pdu_type: PduType::Response,
            request_id: 3,
            error_status: ErrorCode::NoError,
            error_index: 0,
            varbinds: vec![VarBind::new(oid!(1, 3, 6, 1), Value::Counter(1))],
        };
        let mut bytes = CommunityMessage::new(Version::V2c, "public", pdu)
            .encode()
            .unwrap()
            .to_vec();
        // Flip the counter's only content byte to have its sign bit set
        let last = bytes.len() - 1;
        bytes[last] = 0x81;

        let msg = CommunityMessage::decode(Bytes::from(bytes)).unwrap();
        assert_eq!(msg.pdu.varbinds[0].value, Value::Counter(0x81));
        assert_eq!(msg.first_warning(), Some(ErrorCode::UnsignedMalformed));
        assert_eq!(msg.warnings[0].offset, last);
    }

    #[test]
    fn test_add_cell_varbind() {
        let base = oid!(1, 3, 6, 1, 4, 1, 2680, 1, 2, 7, 3, 2);
        let mut msg = CommunityMessage::setup_set_request(Version::V2c, "private", 9, vec![]);
        msg.add_cell_varbind(&base, &[5, 1], 3, Value::Integer(4));
        assert_eq!(
            msg.pdu.varbinds[0].oid,
            oid!(1, 3, 6, 1, 4, 1, 2680, 1, 2, 7, 3, 2, 3, 5, 1)
        );
        assert_eq!(msg.pdu.varbinds[0].value, Value::Integer(4));
    }

    #[test]
    fn test_encode_rejects_bad_oids() {
        let msg = CommunityMessage::setup_get_request(Version::V2c, "public", 1, &[oid!(1)]);
        match msg.encode_request().unwrap_err() {
            Error::Encode { kind } => {
                assert_eq!(kind, EncodeErrorKind::InvalidOid(OidErrorKind::TooShort))
            }
            other => panic!("unexpected error {:?}", other),
        }

        let msg = CommunityMessage::setup_set_request(
            Version::V2c,
            "public",
            1,
            vec![VarBind::new(oid!(1, 3), Value::ObjectIdentifier(oid!(7, 1)))],
        );
        assert!(matches!(
            msg.encode_request(),
            Err(Error::Encode {
                kind: EncodeErrorKind::InvalidOid(OidErrorKind::InvalidFirstArc(7))
            })
        ));

        let empty = CommunityMessage::setup_get_request(Version::V2c, "public", 1, &[]);
        assert!(matches!(
            empty.encode_request(),
            Err(Error::Encode {
                kind: EncodeErrorKind::NoVarbinds
            })
        ));
    }

    #[test]
    fn test_error_description() {
        let mut msg = CommunityMessage::setup_get_request(Version::V2c, "public", 1, &[]);
        assert_eq!(msg.error_description(), "no error");
        msg.pdu.error_status = ErrorCode::ResourceUnavailable;
        assert_eq!(msg.error_description(), "no resources available");
        msg.pdu.error_index = 3;
        assert_eq!(
            msg.error_description(),
            "no resources available in object 3"
        );
    }
}

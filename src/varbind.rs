//! Variable binding (VarBind) type.
//!
//! A VarBind pairs an OID with a value. Decoded varbinds may also keep the
//! exact bytes they arrived as, for hex dumps.

use crate::ber::{Decoder, EncodeBuf};
use crate::error::Result;
use crate::oid::Oid;
use crate::value::Value;
use bytes::Bytes;

/// Variable binding - an OID-value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarBind {
    /// The object identifier.
    pub oid: Oid,
    /// The value.
    pub value: Value,
    /// The complete encoded varbind (SEQUENCE TLV) as received.
    ///
    /// Only filled when decoding with raw bytes requested. Never used when
    /// encoding.
    pub raw: Option<Bytes>,
}

impl VarBind {
    /// Create a new VarBind.
    pub fn new(oid: Oid, value: Value) -> Self {
        Self {
            oid,
            value,
            raw: None,
        }
    }

    /// Create a VarBind with a NULL value (for GET requests).
    pub fn null(oid: Oid) -> Self {
        Self::new(oid, Value::Null)
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_sequence(|buf| {
            self.value.encode(buf);
            buf.push_oid(&self.oid);
        });
    }

    /// Returns the exact encoded size of this VarBind in bytes.
    pub fn encoded_size(&self) -> usize {
        let mut buf = EncodeBuf::new();
        self.encode(&mut buf);
        buf.len()
    }

    /// Decode from BER.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        Self::decode_with_raw(decoder, false)
    }

    /// Decode from BER, optionally keeping the encoded bytes in [`VarBind::raw`].
    pub fn decode_with_raw(decoder: &mut Decoder, include_raw: bool) -> Result<Self> {
        let start = decoder.offset();
        let mut seq = decoder.read_sequence()?;
        let oid = seq.read_oid()?;
        let value = Value::decode(&mut seq)?;
        decoder.absorb(seq);

        let raw = include_raw.then(|| decoder.consumed_since(start));
        Ok(VarBind { oid, value, raw })
    }
}

impl std::fmt::Display for VarBind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.oid, self.value)
    }
}

/// Encode a list of VarBinds.
pub fn encode_varbind_list(buf: &mut EncodeBuf, varbinds: &[VarBind]) {
    buf.push_sequence(|buf| {
        // Encode in reverse order since we're using reverse buffer
        for vb in varbinds.iter().rev() {
            vb.encode(buf);
        }
    });
}

/// Decode a list of VarBinds.
pub fn decode_varbind_list(decoder: &mut Decoder) -> Result<Vec<VarBind>> {
    decode_varbind_list_with_raw(decoder, false)
}

/// Decode a list of VarBinds until the list's declared length is consumed.
pub fn decode_varbind_list_with_raw(
    decoder: &mut Decoder,
    include_raw: bool,
) -> Result<Vec<VarBind>> {
    let mut seq = decoder.read_sequence()?;
    let mut varbinds = Vec::new();

    while !seq.is_empty() {
        varbinds.push(VarBind::decode_with_raw(&mut seq, include_raw)?);
    }

    decoder.absorb(seq);
    Ok(varbinds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::oid;

    fn encode_list(varbinds: &[VarBind]) -> Bytes {
        let mut buf = EncodeBuf::new();
        encode_varbind_list(&mut buf, varbinds);
        buf.finish()
    }

    #[test]
    fn test_encoded_size_matches_output() {
        let vb = VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::from("core-1"));
        let mut buf = EncodeBuf::new();
        vb.encode(&mut buf);
        let bytes = buf.finish();
        assert_eq!(vb.encoded_size(), bytes.len());
        assert_eq!(VarBind::decode(&mut Decoder::new(bytes)).unwrap(), vb);
    }

    #[test]
    fn test_null_varbind_wire_format() {
        let vb = VarBind::null(oid!(1, 3, 6, 1, 4, 1, 2680, 1, 2, 7, 3, 2, 0));
        let mut buf = EncodeBuf::new();
        vb.encode(&mut buf);
        assert_eq!(
            buf.finish_vec(),
            vec![
                0x30, 0x11, 0x06, 0x0D, 0x2B, 0x06, 0x01, 0x04, 0x01, 0x94, 0x78, 0x01, 0x02,
                0x07, 0x03, 0x02, 0x00, 0x05, 0x00
            ]
        );
    }

    #[test]
    fn test_raw_bytes_kept_on_request() {
        let varbinds = vec![
            VarBind::new(oid!(1, 3, 6, 1), Value::Integer(1)),
            VarBind::new(oid!(1, 3, 6, 2), Value::from("x")),
        ];
        let bytes = encode_list(&varbinds);

        let mut decoder = Decoder::new(bytes.clone());
        let decoded = decode_varbind_list_with_raw(&mut decoder, true).unwrap();
        // 30 <len> | 30 08 06 03 2B 06 01 02 01 01
        assert_eq!(
            decoded[0].raw.as_deref(),
            Some(&[0x30, 0x08, 0x06, 0x03, 0x2B, 0x06, 0x01, 0x02, 0x01, 0x01][..])
        );
        assert_eq!(decoded[1].raw.as_deref(), Some(&bytes[12..]));

        let mut decoder = Decoder::new(bytes);
        let decoded = decode_varbind_list(&mut decoder).unwrap();
        assert!(decoded.iter().all(|vb| vb.raw.is_none()));
        assert_eq!(decoded, varbinds);
    }

    #[test]
    fn test_varbind_list_empty() {
        let bytes = encode_list(&[]);
        assert_eq!(&bytes[..], &[0x30, 0x00]);
        let mut decoder = Decoder::new(bytes);
        assert!(decode_varbind_list(&mut decoder).unwrap().is_empty());
    }

    #[test]
    fn test_row_of_cells_survives_list_codec() {
        let entry = oid!(1, 3, 6, 1, 4, 1, 2680, 1, 2, 7, 3, 2);
        let varbinds: Vec<VarBind> = [
            Value::Integer(-7),
            Value::from("eth0"),
            Value::IpAddress([10, 0, 0, 1]),
            Value::Gauge(4_000_000_000),
            Value::ObjectIdentifier(entry.clone()),
            Value::Counter64(1 << 40),
        ]
        .into_iter()
        .zip(1u64..)
        .map(|(value, column)| VarBind::new(entry.child(column).child(12), value))
        .collect();

        let mut decoder = Decoder::new(encode_list(&varbinds));
        assert_eq!(decode_varbind_list(&mut decoder).unwrap(), varbinds);
        assert!(decoder.warnings().is_empty());
    }

    #[test]
    fn test_list_collects_nested_warnings() {
        // SEQUENCE { SEQUENCE { OID 1.3, Gauge 0xFF } }
        let data = [0x30, 0x08, 0x30, 0x06, 0x06, 0x01, 0x2B, 0x42, 0x01, 0xFF, 0x00];
        let mut decoder = Decoder::from_slice(&data);
        // Trailing byte sits outside the list and is left alone
        let decoded = decode_varbind_list(&mut decoder).unwrap();
        assert_eq!(decoded[0].value, Value::Gauge(0xFF));
        assert_eq!(decoder.warnings().len(), 1);
        assert_eq!(decoder.warnings()[0].code, ErrorCode::UnsignedMalformed);
        assert_eq!(decoder.warnings()[0].offset, 9);
        assert_eq!(decoder.remaining(), 1);
    }

    #[test]
    fn test_varbind_display() {
        let vb = VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::Integer(42));
        assert_eq!(vb.to_string(), "1.3.6.1.2.1.1.1.0 = 42");
    }
}

//! Property-based tests for the BER codec and message layer.

mod common;

use basic_snmp::ber::{Decoder, EncodeBuf};
use basic_snmp::oid::Oid;
use basic_snmp::pdu::{Pdu, PduType};
use basic_snmp::value::Value;
use basic_snmp::varbind::VarBind;
use basic_snmp::{CommunityMessage, Error, ErrorCode, Version};
use bytes::Bytes;
use common::FULL_GET;
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// OIDs that can round-trip through BER: two or more arcs, valid leading arcs.
fn arb_oid() -> impl Strategy<Value = Oid> {
    (0u64..=2, any::<u64>(), prop::collection::vec(any::<u64>(), 0..=16)).prop_map(
        |(first, second, rest)| {
            let second = if first < 2 {
                second % 40
            } else {
                second % (u64::MAX - 80)
            };
            let mut arcs = vec![first, second];
            arcs.extend(rest);
            Oid::from_slice(&arcs)
        },
    )
}

fn arb_bytes() -> impl Strategy<Value = Bytes> {
    prop::collection::vec(any::<u8>(), 0..=300).prop_map(Bytes::from)
}

/// Values that decode back to the same variant.
fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<i64>().prop_map(Value::Integer),
        arb_bytes().prop_map(Value::OctetString),
        arb_oid().prop_map(Value::ObjectIdentifier),
        any::<[u8; 4]>().prop_map(Value::IpAddress),
        any::<u32>().prop_map(|v| Value::Counter(v as u64)),
        any::<u32>().prop_map(|v| Value::Gauge(v as u64)),
        any::<u32>().prop_map(|v| Value::TimeTicks(v as u64)),
        any::<u64>().prop_map(Value::Counter64),
    ]
}

fn arb_varbind() -> impl Strategy<Value = VarBind> {
    (arb_oid(), arb_value()).prop_map(|(oid, value)| VarBind::new(oid, value))
}

fn minimal_signed_len(value: i64) -> usize {
    (1..=8)
        .find(|&n| {
            let shift = 64 - 8 * n;
            (value << shift) >> shift == value
        })
        .unwrap_or(8)
}

// =============================================================================
// Primitive round-trips
// =============================================================================

proptest! {
    #[test]
    fn integer_roundtrip_is_minimal(value in any::<i64>()) {
        let mut buf = EncodeBuf::new();
        buf.push_integer(value);
        let bytes = buf.finish();

        prop_assert_eq!(bytes[1] as usize, minimal_signed_len(value));

        let mut decoder = Decoder::new(bytes);
        prop_assert_eq!(decoder.read_integer().unwrap(), value);
        prop_assert!(decoder.is_empty());
    }

    #[test]
    fn octet_string_roundtrip(data in arb_bytes()) {
        let mut buf = EncodeBuf::new();
        buf.push_octet_string(&data);
        let mut decoder = Decoder::new(buf.finish());
        prop_assert_eq!(decoder.read_octet_string().unwrap(), data);
    }

    #[test]
    fn oid_roundtrip(oid in arb_oid()) {
        prop_assert!(oid.validate().is_ok());
        prop_assert_eq!(Oid::from_ber(&oid.to_ber()).unwrap(), oid.clone());

        let dotted = oid.to_string();
        prop_assert_eq!(Oid::parse(&dotted).unwrap(), oid);
    }

    #[test]
    fn value_roundtrip(value in arb_value()) {
        let mut buf = EncodeBuf::new();
        value.encode(&mut buf);
        let mut decoder = Decoder::new(buf.finish());
        prop_assert_eq!(Value::decode(&mut decoder).unwrap(), value);
        prop_assert!(decoder.warnings().is_empty());
    }
}

// =============================================================================
// Messages
// =============================================================================

proptest! {
    #[test]
    fn response_roundtrip(
        v1 in any::<bool>(),
        community in prop::collection::vec(any::<u8>(), 0..=32),
        request_id in any::<i32>(),
        varbinds in prop::collection::vec(arb_varbind(), 0..=8),
    ) {
        let version = if v1 { Version::V1 } else { Version::V2c };
        let msg = CommunityMessage::new(
            version,
            community,
            Pdu {
                pdu_type: PduType::Response,
                request_id,
                error_status: ErrorCode::NoError,
                error_index: 0,
                varbinds,
            },
        );
        let decoded = CommunityMessage::decode(msg.encode().unwrap()).unwrap();
        prop_assert_eq!(decoded, msg);
    }

    #[test]
    fn raw_varbind_bytes_are_in_the_datagram(varbinds in prop::collection::vec(arb_varbind(), 1..=4)) {
        let msg = CommunityMessage::new(
            Version::V2c,
            "public",
            Pdu::request(PduType::SetRequest, 1, varbinds),
        );
        let bytes = msg.encode_request().unwrap();
        let decoded = CommunityMessage::decode_all(bytes.clone(), true).unwrap();
        for vb in &decoded.pdu.varbinds {
            let raw = vb.raw.as_ref().unwrap();
            prop_assert!(bytes.windows(raw.len()).any(|w| w == &raw[..]));
        }
    }

    #[test]
    fn arbitrary_bytes_never_panic(data in prop::collection::vec(any::<u8>(), 0..=128)) {
        let _ = CommunityMessage::decode_all(Bytes::from(data), true);
    }

    #[test]
    fn truncated_request_reports_offset_inside_datagram(cut in 0usize..FULL_GET.len()) {
        let err = CommunityMessage::decode(Bytes::copy_from_slice(&FULL_GET[..cut])).unwrap_err();
        match err {
            Error::Decode { offset, .. } => prop_assert!(offset <= cut),
            other => prop_assert!(false, "expected decode error, got {:?}", other),
        }
    }
}

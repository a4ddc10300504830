//! BER tag definitions for SNMP.
//!
//! Tag encoding follows X.690 Section 8.1.2:
//! - Bits 7-6: Class (00=Universal, 01=Application, 10=Context-specific, 11=Private)
//! - Bit 5: Primitive (0) or Constructed (1)
//! - Bits 4-0: Tag number (0-30, or 31 for long form)

use std::borrow::Cow;

/// Tag class bits (bits 7-6)
pub mod class {
    pub const UNIVERSAL: u8 = 0x00;
    pub const APPLICATION: u8 = 0x40;
    pub const CONTEXT_SPECIFIC: u8 = 0x80;
    pub const PRIVATE: u8 = 0xC0;
}

/// Constructed bit (bit 5)
pub const CONSTRUCTED: u8 = 0x20;

/// Universal tags (class bits 00)
pub mod universal {
    pub const BOOLEAN: u8 = 0x01;
    pub const INTEGER: u8 = 0x02;
    pub const BIT_STRING: u8 = 0x03;
    pub const OCTET_STRING: u8 = 0x04;
    pub const NULL: u8 = 0x05;
    pub const OBJECT_IDENTIFIER: u8 = 0x06;
    pub const ENUMERATED: u8 = 0x0A;
    pub const SEQUENCE: u8 = 0x30; // Constructed
    pub const NUMERIC_STRING: u8 = 0x12;
    pub const PRINTABLE_STRING: u8 = 0x13;
    pub const TELETEX_STRING: u8 = 0x14;
    pub const VIDEOTEX_STRING: u8 = 0x15;
    pub const IA5_STRING: u8 = 0x16;
    pub const UTC_TIME: u8 = 0x17;
    pub const GENERALIZED_TIME: u8 = 0x18;
    pub const GRAPHIC_STRING: u8 = 0x19;
    pub const VISIBLE_STRING: u8 = 0x1A;
    pub const GENERAL_STRING: u8 = 0x1B;
    pub const CHARACTER_STRING: u8 = 0x1C;
}

/// Application tags (class bits 01) - SNMP-specific types
pub mod application {
    pub const IP_ADDRESS: u8 = 0x40;
    pub const COUNTER32: u8 = 0x41;
    pub const GAUGE32: u8 = 0x42; // Also Unsigned32
    pub const TIMETICKS: u8 = 0x43;
    pub const OPAQUE: u8 = 0x44;
    pub const NSAP_ADDRESS: u8 = 0x45;
    pub const COUNTER64: u8 = 0x46;
    pub const FLOAT: u8 = 0x48;
    pub const DOUBLE: u8 = 0x49;
    pub const INTEGER64: u8 = 0x50;
    pub const UNSIGNED64: u8 = 0x51;
}

/// PDU tags (context-specific, constructed)
pub mod pdu {
    use super::CONSTRUCTED;
    use super::class::CONTEXT_SPECIFIC;

    pub const GET_REQUEST: u8 = CONTEXT_SPECIFIC | CONSTRUCTED; // 0xA0
    pub const GET_NEXT_REQUEST: u8 = CONTEXT_SPECIFIC | CONSTRUCTED | 0x01; // 0xA1
    pub const RESPONSE: u8 = CONTEXT_SPECIFIC | CONSTRUCTED | 0x02; // 0xA2
    pub const SET_REQUEST: u8 = CONTEXT_SPECIFIC | CONSTRUCTED | 0x03; // 0xA3
    pub const TRAP: u8 = CONTEXT_SPECIFIC | CONSTRUCTED | 0x04; // 0xA4
}

/// SNMPv2 exception values (context-specific, primitive, zero length)
pub mod exception {
    pub const NO_SUCH_OBJECT: u8 = 0x80;
    pub const NO_SUCH_INSTANCE: u8 = 0x81;
    pub const END_OF_MIB_VIEW: u8 = 0x82;
}

/// Tags accepted wherever "any integer-like field" is decoded.
pub const NUMERIC_TAGS: [u8; 7] = [
    universal::INTEGER,
    application::COUNTER32,
    application::COUNTER64,
    application::INTEGER64,
    application::GAUGE32,
    application::TIMETICKS,
    application::UNSIGNED64,
];

/// Check if a tag indicates a constructed type
#[inline]
pub const fn is_constructed(tag: u8) -> bool {
    tag & CONSTRUCTED != 0
}

/// Get the class of a tag
#[inline]
pub const fn tag_class(tag: u8) -> u8 {
    tag & 0xC0
}

/// Get the tag number (bits 4-0)
#[inline]
pub const fn tag_number(tag: u8) -> u8 {
    tag & 0x1F
}

/// Legacy character-string tags that decode as OCTET STRING.
#[inline]
pub const fn is_string_tag(tag: u8) -> bool {
    tag == universal::OCTET_STRING
        || (tag >= universal::NUMERIC_STRING && tag <= universal::IA5_STRING)
}

/// Tag accepted as the opening of a sequence-like constructed value.
#[inline]
pub const fn is_sequence_tag(tag: u8) -> bool {
    tag == universal::SEQUENCE || tag_class(tag) & class::CONTEXT_SPECIFIC != 0
}

const TAG_NAMES: &[(u8, &str)] = &[
    (universal::BOOLEAN, "BOOLEAN"),
    (universal::INTEGER, "INTEGER"),
    (universal::BIT_STRING, "BIT STRING"),
    (universal::OCTET_STRING, "OCTET STRING"),
    (universal::NULL, "NULL"),
    (universal::OBJECT_IDENTIFIER, "OBJECT IDENTIFIER"),
    (universal::ENUMERATED, "ENUMERATED"),
    (universal::SEQUENCE, "SEQUENCE"),
    (universal::NUMERIC_STRING, "NumericString"),
    (universal::PRINTABLE_STRING, "PrintableString"),
    (universal::TELETEX_STRING, "TeletexString"),
    (universal::VIDEOTEX_STRING, "VideotexString"),
    (universal::IA5_STRING, "IA5String"),
    (universal::UTC_TIME, "UTCTime"),
    (universal::GENERALIZED_TIME, "GeneralizedTime"),
    (universal::GRAPHIC_STRING, "GraphicString"),
    (universal::VISIBLE_STRING, "VisibleString"),
    (universal::GENERAL_STRING, "GeneralString"),
    (universal::CHARACTER_STRING, "CharacterString"),
    (application::IP_ADDRESS, "IpAddress"),
    (application::COUNTER32, "Counter"),
    (application::GAUGE32, "Gauge"),
    (application::TIMETICKS, "TimeTicks"),
    (application::OPAQUE, "Opaque"),
    (application::NSAP_ADDRESS, "NsapAddress"),
    (application::COUNTER64, "Counter64"),
    (application::FLOAT, "Float"),
    (application::DOUBLE, "Double"),
    (application::INTEGER64, "Integer64"),
    (application::UNSIGNED64, "Unsigned64"),
    (exception::NO_SUCH_OBJECT, "noSuchObject"),
    (exception::NO_SUCH_INSTANCE, "noSuchInstance"),
    (exception::END_OF_MIB_VIEW, "endOfMibView"),
    (pdu::GET_REQUEST, "GetRequest-PDU"),
    (pdu::GET_NEXT_REQUEST, "GetNextRequest-PDU"),
    (pdu::RESPONSE, "Response-PDU"),
    (pdu::SET_REQUEST, "SetRequest-PDU"),
    (pdu::TRAP, "Trap-PDU"),
];

/// Human-readable name for a tag byte.
///
/// Unlisted tags render as `UnknownASN1Type_XX`.
pub fn tag_name(tag: u8) -> Cow<'static, str> {
    TAG_NAMES
        .iter()
        .find(|(t, _)| *t == tag)
        .map(|(_, name)| Cow::Borrowed(*name))
        .unwrap_or_else(|| Cow::Owned(format!("UnknownASN1Type_{:02x}", tag)))
}

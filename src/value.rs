//! SNMP value types.
//!
//! The `Value` enum holds exactly one decoded (or to-be-encoded) SNMP value.
//! The active variant decides both the wire tag and which accessor answers.

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::Result;
use crate::format::hex;
use crate::oid::Oid;
use bytes::Bytes;

/// SNMP value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum Value {
    /// NULL (the value slot of every Get/GetNext varbind)
    #[default]
    Null,

    /// BOOLEAN
    Boolean(bool),

    /// INTEGER (signed, up to 64 bits)
    Integer(i64),

    /// Unsigned value carried under the INTEGER tag.
    ///
    /// Encoded with a leading 0x00 when its top bit is set. An agent's reply
    /// decodes back as [`Value::Integer`] unless the value needs all 64 bits.
    UnsignedInteger(u64),

    /// OCTET STRING (arbitrary bytes, also produced for the legacy
    /// NumericString..IA5String tags)
    OctetString(Bytes),

    /// OBJECT IDENTIFIER
    ObjectIdentifier(Oid),

    /// IpAddress (4 bytes, big-endian)
    IpAddress([u8; 4]),

    /// Counter (unsigned, wrapping)
    Counter(u64),

    /// Gauge / Unsigned32 (unsigned, non-wrapping)
    Gauge(u64),

    /// TimeTicks (hundredths of seconds)
    TimeTicks(u64),

    /// Counter64 (unsigned 64-bit, wrapping)
    Counter64(u64),

    /// Unsigned64 (opaque-wrapped extension type)
    Unsigned64(u64),

    /// Integer64 (opaque-wrapped extension type)
    Integer64(i64),

    /// Unknown/unrecognized value type, kept verbatim with its original tag
    Unknown { tag: u8, data: Bytes },
}

impl Value {
    /// The BER tag this value encodes with.
    pub fn tag(&self) -> u8 {
        match self {
            Value::Null => tag::universal::NULL,
            Value::Boolean(_) => tag::universal::BOOLEAN,
            Value::Integer(_) | Value::UnsignedInteger(_) => tag::universal::INTEGER,
            Value::OctetString(_) => tag::universal::OCTET_STRING,
            Value::ObjectIdentifier(_) => tag::universal::OBJECT_IDENTIFIER,
            Value::IpAddress(_) => tag::application::IP_ADDRESS,
            Value::Counter(_) => tag::application::COUNTER32,
            Value::Gauge(_) => tag::application::GAUGE32,
            Value::TimeTicks(_) => tag::application::TIMETICKS,
            Value::Counter64(_) => tag::application::COUNTER64,
            Value::Unsigned64(_) => tag::application::UNSIGNED64,
            Value::Integer64(_) => tag::application::INTEGER64,
            Value::Unknown { tag, .. } => *tag,
        }
    }

    /// Try to get as a signed integer.
    ///
    /// Answers for [`Value::Integer`] and [`Value::Integer64`], and for the
    /// unsigned kinds when the value fits in an `i64`.
    ///
    /// # Examples
    ///
    /// ```
    /// use basic_snmp::Value;
    ///
    /// assert_eq!(Value::Integer(-5).as_i64(), Some(-5));
    /// assert_eq!(Value::Gauge(7).as_i64(), Some(7));
    /// assert_eq!(Value::Counter64(u64::MAX).as_i64(), None);
    /// assert_eq!(Value::Null.as_i64(), None);
    /// ```
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) | Value::Integer64(v) => Some(*v),
            _ => self.as_u64().and_then(|v| i64::try_from(v).ok()),
        }
    }

    /// Try to get as an unsigned integer.
    ///
    /// Answers for every unsigned kind, and for non-negative signed values.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UnsignedInteger(v)
            | Value::Counter(v)
            | Value::Gauge(v)
            | Value::TimeTicks(v)
            | Value::Counter64(v)
            | Value::Unsigned64(v) => Some(*v),
            Value::Integer(v) | Value::Integer64(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Try to get as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as raw bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::OctetString(data) => Some(data),
            _ => None,
        }
    }

    /// Try to get as a UTF-8 string.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Try to get as an OID.
    pub fn as_oid(&self) -> Option<&Oid> {
        match self {
            Value::ObjectIdentifier(oid) => Some(oid),
            _ => None,
        }
    }

    /// Try to get as an IPv4 address.
    pub fn as_ip(&self) -> Option<std::net::Ipv4Addr> {
        match self {
            Value::IpAddress(addr) => Some(std::net::Ipv4Addr::from(*addr)),
            _ => None,
        }
    }

    /// Check if this is an SNMPv2 exception (noSuchObject, noSuchInstance,
    /// endOfMibView), which decode as [`Value::Unknown`].
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            Value::Unknown {
                tag: tag::exception::NO_SUCH_OBJECT
                    | tag::exception::NO_SUCH_INSTANCE
                    | tag::exception::END_OF_MIB_VIEW,
                ..
            }
        )
    }

    /// Check if this is the endOfMibView exception.
    pub fn is_end_of_mib_view(&self) -> bool {
        matches!(
            self,
            Value::Unknown {
                tag: tag::exception::END_OF_MIB_VIEW,
                ..
            }
        )
    }

    /// Check if the value carries one of the integer-like tags.
    pub fn is_numeric(&self) -> bool {
        tag::NUMERIC_TAGS.contains(&self.tag())
    }

    /// Replace with NULL.
    pub fn set_null(&mut self) {
        *self = Value::Null;
    }

    /// Replace with a signed INTEGER.
    pub fn set_integer(&mut self, v: i64) {
        *self = Value::Integer(v);
    }

    /// Replace with an unsigned value under the INTEGER tag.
    pub fn set_unsigned(&mut self, v: u64) {
        *self = Value::UnsignedInteger(v);
    }

    /// Replace with an OCTET STRING.
    pub fn set_octet_string(&mut self, data: impl Into<Bytes>) {
        *self = Value::OctetString(data.into());
    }

    /// Replace with an OBJECT IDENTIFIER.
    pub fn set_oid(&mut self, oid: Oid) {
        *self = Value::ObjectIdentifier(oid);
    }

    /// Replace with an IpAddress.
    pub fn set_ip_address(&mut self, addr: [u8; 4]) {
        *self = Value::IpAddress(addr);
    }

    /// Replace with a numeric value under an explicit numeric tag.
    ///
    /// Tags outside the integer-like set leave the value unchanged and
    /// return `false`.
    pub fn set_numeric(&mut self, numeric_tag: u8, v: u64) -> bool {
        *self = match numeric_tag {
            tag::universal::INTEGER => Value::UnsignedInteger(v),
            tag::application::COUNTER32 => Value::Counter(v),
            tag::application::GAUGE32 => Value::Gauge(v),
            tag::application::TIMETICKS => Value::TimeTicks(v),
            tag::application::COUNTER64 => Value::Counter64(v),
            tag::application::UNSIGNED64 => Value::Unsigned64(v),
            tag::application::INTEGER64 => Value::Integer64(v as i64),
            _ => return false,
        };
        true
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        match self {
            Value::Null => buf.push_null(),
            Value::Boolean(v) => buf.push_boolean(*v),
            Value::Integer(v) => buf.push_integer(*v),
            Value::Integer64(v) => buf.push_signed(tag::application::INTEGER64, *v),
            Value::UnsignedInteger(v)
            | Value::Counter(v)
            | Value::Gauge(v)
            | Value::TimeTicks(v)
            | Value::Counter64(v)
            | Value::Unsigned64(v) => buf.push_unsigned(self.tag(), *v),
            Value::OctetString(data) => buf.push_octet_string(data),
            Value::ObjectIdentifier(oid) => buf.push_oid(oid),
            Value::IpAddress(addr) => buf.push_ip_address(*addr),
            Value::Unknown { tag: t, data } => buf.push_tlv(*t, data),
        }
    }

    /// Decode from BER, dispatching on the tag.
    ///
    /// Unrecognized tags are preserved as [`Value::Unknown`].
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let tag = decoder.read_tag()?;
        let len = decoder.read_length()?;

        match tag {
            tag::universal::NULL => {
                decoder.read_null_value(len)?;
                Ok(Value::Null)
            }
            tag::universal::BOOLEAN => Ok(Value::Boolean(decoder.read_boolean_value(len)?)),
            tag::universal::INTEGER => {
                // A 9-byte INTEGER can only be a zero-padded 64-bit unsigned
                if len == 9 {
                    let value = decoder.read_unsigned_value(len)?;
                    Ok(Value::UnsignedInteger(value))
                } else {
                    let value = decoder.read_integer_value(len)?;
                    Ok(Value::Integer(value))
                }
            }
            tag::universal::OCTET_STRING
            | tag::universal::NUMERIC_STRING..=tag::universal::IA5_STRING => {
                let data = decoder.read_bytes(len)?;
                Ok(Value::OctetString(data))
            }
            tag::universal::OBJECT_IDENTIFIER => {
                let oid = decoder.read_oid_value(len)?;
                Ok(Value::ObjectIdentifier(oid))
            }
            tag::application::IP_ADDRESS => {
                let addr = decoder.read_ip_address_value(len)?;
                Ok(Value::IpAddress(addr))
            }
            tag::application::COUNTER32 => Ok(Value::Counter(decoder.read_unsigned_value(len)?)),
            tag::application::GAUGE32 => Ok(Value::Gauge(decoder.read_unsigned_value(len)?)),
            tag::application::TIMETICKS => {
                Ok(Value::TimeTicks(decoder.read_unsigned_value(len)?))
            }
            tag::application::COUNTER64 => {
                Ok(Value::Counter64(decoder.read_unsigned_value(len)?))
            }
            tag::application::UNSIGNED64 => {
                Ok(Value::Unsigned64(decoder.read_unsigned_value(len)?))
            }
            tag::application::INTEGER64 => {
                Ok(Value::Integer64(decoder.read_integer_value(len)?))
            }
            _ => {
                let data = decoder.read_bytes(len)?;
                Ok(Value::Unknown { tag, data })
            }
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Integer(v) | Value::Integer64(v) => write!(f, "{}", v),
            Value::UnsignedInteger(v)
            | Value::Counter(v)
            | Value::Gauge(v)
            | Value::Counter64(v)
            | Value::Unsigned64(v) => write!(f, "{}", v),
            Value::TimeTicks(v) => {
                let secs = v / 100;
                let days = secs / 86400;
                let hours = (secs % 86400) / 3600;
                let mins = (secs % 3600) / 60;
                let s = secs % 60;
                write!(f, "{}d {}h {}m {}s", days, hours, mins, s)
            }
            Value::OctetString(data) => {
                if let Ok(s) = std::str::from_utf8(data) {
                    write!(f, "{}", s)
                } else {
                    write!(f, "0x{}", hex::encode(data))
                }
            }
            Value::ObjectIdentifier(oid) => write!(f, "{}", oid),
            Value::IpAddress(addr) => {
                write!(f, "{}.{}.{}.{}", addr[0], addr[1], addr[2], addr[3])
            }
            Value::Unknown { tag, data } if data.is_empty() => {
                write!(f, "{}", tag::tag_name(*tag))
            }
            Value::Unknown { tag, data } => {
                write!(f, "{}(0x{})", tag::tag_name(*tag), hex::encode(data))
            }
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::OctetString(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::OctetString(Bytes::from(s))
    }
}

impl From<&[u8]> for Value {
    fn from(data: &[u8]) -> Self {
        Value::OctetString(Bytes::copy_from_slice(data))
    }
}

impl From<Bytes> for Value {
    fn from(data: Bytes) -> Self {
        Value::OctetString(data)
    }
}

impl From<Oid> for Value {
    fn from(oid: Oid) -> Self {
        Value::ObjectIdentifier(oid)
    }
}

impl From<std::net::Ipv4Addr> for Value {
    fn from(addr: std::net::Ipv4Addr) -> Self {
        Value::IpAddress(addr.octets())
    }
}

impl From<[u8; 4]> for Value {
    fn from(addr: [u8; 4]) -> Self {
        Value::IpAddress(addr)
    }
}

//! BER decoding.
//!
//! Zero-copy decoding using `Bytes` to avoid allocations. Every failure
//! carries the absolute byte offset into the original datagram, including
//! failures inside nested sub-decoders.

use super::length::decode_length;
use super::tag;
use crate::error::internal::DecodeErrorKind;
use crate::error::{Error, ErrorCode, Result};
use crate::oid::Oid;
use bytes::Bytes;

/// A non-fatal anomaly found while decoding.
///
/// The decoder substitutes a best-effort value and keeps going; the caller
/// decides whether the anomaly matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeWarning {
    /// Absolute offset of the offending content.
    pub offset: usize,
    /// What went wrong.
    pub code: ErrorCode,
}

/// BER decoder that reads from a byte buffer.
#[derive(Debug)]
pub struct Decoder {
    data: Bytes,
    offset: usize,
    /// Absolute offset of `data[0]` within the outermost buffer.
    base: usize,
    warnings: Vec<DecodeWarning>,
}

impl Decoder {
    /// Create a new decoder from bytes.
    pub fn new(data: Bytes) -> Self {
        Self {
            data,
            offset: 0,
            base: 0,
            warnings: Vec::new(),
        }
    }

    /// Create a decoder from a byte slice (copies the data).
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }

    /// Get the current absolute offset.
    pub fn offset(&self) -> usize {
        self.base + self.offset
    }

    /// Get remaining bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Check if we've reached the end.
    pub fn is_empty(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Peek at the next tag without consuming it.
    pub fn peek_tag(&self) -> Option<u8> {
        self.data.get(self.offset).copied()
    }

    /// Warnings recorded so far, including those merged from sub-decoders.
    pub fn warnings(&self) -> &[DecodeWarning] {
        &self.warnings
    }

    /// Take the recorded warnings, leaving none behind.
    pub fn take_warnings(&mut self) -> Vec<DecodeWarning> {
        std::mem::take(&mut self.warnings)
    }

    /// Merge the warnings of a finished sub-decoder into this one.
    pub fn absorb(&mut self, child: Decoder) {
        self.warnings.extend(child.warnings);
    }

    fn fail(&self, offset: usize, kind: DecodeErrorKind) -> Error {
        tracing::debug!(target: "basic_snmp::ber", { snmp.offset = %offset, kind = %kind }, "decode error");
        Error::decode(offset, kind.code())
    }

    fn warn(&mut self, offset: usize, kind: DecodeErrorKind) {
        tracing::debug!(target: "basic_snmp::ber", { snmp.offset = %offset, kind = %kind }, "decode warning");
        self.warnings.push(DecodeWarning {
            offset,
            code: kind.code(),
        });
    }

    /// Read a tag byte.
    pub fn read_tag(&mut self) -> Result<u8> {
        match self.data.get(self.offset) {
            Some(&byte) => {
                self.offset += 1;
                Ok(byte)
            }
            None => Err(self.fail(self.offset(), DecodeErrorKind::TruncatedTag)),
        }
    }

    /// Read a length.
    pub fn read_length(&mut self) -> Result<usize> {
        let (len, consumed) = decode_length(&self.data[self.offset..], self.offset())?;
        self.offset += consumed;
        Ok(len)
    }

    /// Read raw bytes without copying.
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        // Use saturating_add to prevent overflow from bypassing bounds check
        if self.offset.saturating_add(len) > self.data.len() {
            return Err(self.fail(
                self.offset(),
                DecodeErrorKind::InsufficientData {
                    needed: len,
                    available: self.remaining(),
                },
            ));
        }
        let bytes = self.data.slice(self.offset..self.offset + len);
        self.offset += len;
        Ok(bytes)
    }

    /// Read and expect a specific tag, returning the content length.
    pub fn expect_tag(&mut self, expected: u8) -> Result<usize> {
        let tag = self.read_tag()?;
        if tag != expected {
            return Err(self.fail(
                self.offset() - 1,
                DecodeErrorKind::UnexpectedTag {
                    expected,
                    actual: tag,
                },
            ));
        }
        self.read_length()
    }

    /// Read a tag that must satisfy `accept`, returning (tag, content length).
    pub fn expect_tag_in(&mut self, accept: impl Fn(u8) -> bool) -> Result<(u8, usize)> {
        let tag = self.read_tag()?;
        if !accept(tag) {
            return Err(self.fail(
                self.offset() - 1,
                DecodeErrorKind::TagNotAccepted { actual: tag },
            ));
        }
        let len = self.read_length()?;
        Ok((tag, len))
    }

    /// Read a BER integer (signed).
    pub fn read_integer(&mut self) -> Result<i64> {
        let len = self.expect_tag(tag::universal::INTEGER)?;
        self.read_integer_value(len)
    }

    /// Read a BER integer that must fit in 32 bits (request IDs, error fields).
    pub fn read_i32(&mut self) -> Result<i32> {
        let len = self.expect_tag(tag::universal::INTEGER)?;
        let start = self.offset();
        let value = self.read_integer_value(len)?;
        i32::try_from(value).map_err(|_| {
            self.fail(start, DecodeErrorKind::IntegerTooLong { length: len, max: 4 })
        })
    }

    /// Read signed integer value given the length.
    ///
    /// The accumulator starts sign-extended when the first content bit is set.
    pub fn read_integer_value(&mut self, len: usize) -> Result<i64> {
        if len == 0 {
            return Err(self.fail(self.offset(), DecodeErrorKind::ZeroLengthInteger));
        }
        if len > 8 {
            return Err(self.fail(
                self.offset(),
                DecodeErrorKind::IntegerTooLong { length: len, max: 8 },
            ));
        }

        let bytes = self.read_bytes(len)?;

        let mut value: i64 = if bytes[0] & 0x80 != 0 { -1 } else { 0 };
        for &byte in bytes.iter() {
            value = (value << 8) | byte as i64;
        }

        Ok(value)
    }

    /// Read unsigned integer value given the length.
    ///
    /// A set sign bit is recorded as [`ErrorCode::UnsignedMalformed`]; the
    /// content still decodes into a zeroed accumulator, so the value is the
    /// zero-extended reading of the bytes.
    pub fn read_unsigned_value(&mut self, len: usize) -> Result<u64> {
        if len == 0 {
            return Err(self.fail(self.offset(), DecodeErrorKind::ZeroLengthInteger));
        }
        let start = self.offset();
        let bytes = self.read_bytes(len)?;

        // 9 bytes max: 1 leading zero + 8 bytes for u64
        if len > 9 || (len == 9 && bytes[0] != 0) {
            return Err(self.fail(
                start,
                DecodeErrorKind::IntegerTooLong { length: len, max: 9 },
            ));
        }

        if bytes[0] & 0x80 != 0 {
            self.warn(start, DecodeErrorKind::UnsignedSignBit);
        }

        let value = bytes
            .iter()
            .fold(0u64, |acc, &byte| (acc << 8) | byte as u64);
        Ok(value)
    }

    /// Read an unsigned integer with a specific tag.
    pub fn read_unsigned(&mut self, expected_tag: u8) -> Result<u64> {
        let len = self.expect_tag(expected_tag)?;
        self.read_unsigned_value(len)
    }

    /// Read an OCTET STRING.
    ///
    /// The legacy character-string tags (NumericString through IA5String)
    /// are accepted as well.
    pub fn read_octet_string(&mut self) -> Result<Bytes> {
        let (_, len) = self.expect_tag_in(tag::is_string_tag)?;
        self.read_bytes(len)
    }

    /// Read a NULL.
    pub fn read_null(&mut self) -> Result<()> {
        let len = self.expect_tag(tag::universal::NULL)?;
        self.read_null_value(len)
    }

    /// Validate NULL content given the length.
    pub fn read_null_value(&mut self, len: usize) -> Result<()> {
        if len != 0 {
            return Err(self.fail(self.offset(), DecodeErrorKind::InvalidNull));
        }
        Ok(())
    }

    /// Read BOOLEAN content given the length.
    pub fn read_boolean_value(&mut self, len: usize) -> Result<bool> {
        if len != 1 {
            return Err(self.fail(
                self.offset(),
                DecodeErrorKind::InvalidBooleanLength { length: len },
            ));
        }
        let bytes = self.read_bytes(1)?;
        Ok(bytes[0] != 0)
    }

    /// Read an OBJECT IDENTIFIER.
    pub fn read_oid(&mut self) -> Result<Oid> {
        let len = self.expect_tag(tag::universal::OBJECT_IDENTIFIER)?;
        self.read_oid_value(len)
    }

    /// Read an OID given a pre-read length.
    pub fn read_oid_value(&mut self, len: usize) -> Result<Oid> {
        let start = self.offset();
        let bytes = self.read_bytes(len)?;
        Oid::from_ber_at(&bytes, start)
    }

    /// Read an IP address.
    pub fn read_ip_address(&mut self) -> Result<[u8; 4]> {
        let len = self.expect_tag(tag::application::IP_ADDRESS)?;
        self.read_ip_address_value(len)
    }

    /// Read IP address content given a pre-read length.
    pub fn read_ip_address_value(&mut self, len: usize) -> Result<[u8; 4]> {
        if len != 4 {
            return Err(self.fail(
                self.offset(),
                DecodeErrorKind::InvalidIpAddressLength { length: len },
            ));
        }
        let bytes = self.read_bytes(4)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Read a SEQUENCE, returning a decoder for its contents.
    ///
    /// Any context-specific or private tag is accepted in place of the
    /// universal SEQUENCE tag. Children are not interpreted.
    pub fn read_sequence(&mut self) -> Result<Decoder> {
        let (_, len) = self.expect_tag_in(tag::is_sequence_tag)?;
        self.sub_decoder(len)
    }

    /// Read a constructed type with a specific tag, returning a decoder for its contents.
    pub fn read_constructed(&mut self, expected_tag: u8) -> Result<Decoder> {
        let len = self.expect_tag(expected_tag)?;
        self.sub_decoder(len)
    }

    /// Skip a TLV (tag-length-value) without parsing.
    pub fn skip_tlv(&mut self) -> Result<()> {
        let _tag = self.read_tag()?;
        let len = self.read_length()?;
        self.read_bytes(len).map(|_| ())
    }

    /// Create a sub-decoder for a portion of the remaining data.
    pub fn sub_decoder(&mut self, len: usize) -> Result<Decoder> {
        let base = self.offset();
        let content = self.read_bytes(len)?;
        Ok(Decoder {
            data: content,
            offset: 0,
            base,
            warnings: Vec::new(),
        })
    }

    /// Bytes consumed between `start` (a value of [`Self::offset`]) and now.
    pub fn consumed_since(&self, start: usize) -> Bytes {
        let from = start.saturating_sub(self.base).min(self.offset);
        self.data.slice(from..self.offset)
    }
}

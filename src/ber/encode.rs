//! BER encoding.
//!
//! Uses a reverse buffer approach: writes from end backwards to avoid
//! needing to pre-calculate lengths.

use super::length::encode_length;
use super::tag;
use bytes::Bytes;

/// Buffer for BER encoding that writes backwards.
///
/// This approach avoids needing to pre-calculate content lengths:
/// we write the content first, then prepend the length and tag.
pub struct EncodeBuf {
    buf: Vec<u8>,
}

impl EncodeBuf {
    /// Create a new encode buffer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(512)
    }

    /// Create a new encode buffer with specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Push multiple bytes (prepends to front, reversed).
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend(bytes.iter().rev());
    }

    /// Push a BER length encoding.
    pub fn push_length(&mut self, len: usize) {
        let (bytes, count) = encode_length(len);
        // encode_length already returns bytes in prepend order
        self.buf.extend_from_slice(&bytes[..count]);
    }

    /// Push a BER tag.
    pub fn push_tag(&mut self, tag: u8) {
        self.buf.push(tag);
    }

    /// Get the current length of encoded data.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Encode a primitive TLV with arbitrary tag and content.
    pub fn push_tlv(&mut self, tag: u8, content: &[u8]) {
        self.push_bytes(content);
        self.push_length(content.len());
        self.push_tag(tag);
    }

    /// Encode a constructed type (SEQUENCE, PDU, etc).
    ///
    /// Calls the closure to encode contents, then wraps with length and tag.
    pub fn push_constructed<F>(&mut self, tag: u8, f: F)
    where
        F: FnOnce(&mut Self),
    {
        let start_len = self.len();
        f(self);
        let content_len = self.len() - start_len;
        self.push_length(content_len);
        self.push_tag(tag);
    }

    /// Encode a SEQUENCE.
    pub fn push_sequence<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Self),
    {
        self.push_constructed(tag::universal::SEQUENCE, f);
    }

    /// Encode an INTEGER.
    pub fn push_integer(&mut self, value: i64) {
        self.push_signed(tag::universal::INTEGER, value);
    }

    /// Encode a signed integer in minimal two's complement with a specific tag.
    pub fn push_signed(&mut self, tag: u8, value: i64) {
        let (arr, len) = encode_signed_stack(value);
        // Valid bytes are at the end of the array
        self.push_tlv(tag, &arr[8 - len..]);
    }

    /// Encode an unsigned integer with a specific tag.
    ///
    /// A leading 0x00 is added when the top bit of the first content byte is set.
    pub fn push_unsigned(&mut self, tag: u8, value: u64) {
        let (arr, len) = encode_unsigned_stack(value);
        self.push_tlv(tag, &arr[9 - len..]);
    }

    /// Encode a BOOLEAN.
    pub fn push_boolean(&mut self, value: bool) {
        self.push_tlv(tag::universal::BOOLEAN, &[if value { 0xFF } else { 0x00 }]);
    }

    /// Encode an OCTET STRING.
    pub fn push_octet_string(&mut self, data: &[u8]) {
        self.push_tlv(tag::universal::OCTET_STRING, data);
    }

    /// Encode a NULL.
    pub fn push_null(&mut self) {
        self.push_length(0);
        self.push_tag(tag::universal::NULL);
    }

    /// Encode an OBJECT IDENTIFIER.
    ///
    /// The OID must have been validated; see [`crate::oid::Oid::validate`].
    pub fn push_oid(&mut self, oid: &crate::oid::Oid) {
        let ber = oid.to_ber_smallvec();
        self.push_tlv(tag::universal::OBJECT_IDENTIFIER, &ber);
    }

    /// Encode an IP address.
    pub fn push_ip_address(&mut self, addr: [u8; 4]) {
        self.push_tlv(tag::application::IP_ADDRESS, &addr);
    }

    /// Finalize and return the encoded bytes.
    ///
    /// The buffer is reversed to produce the correct order.
    pub fn finish(mut self) -> Bytes {
        self.buf.reverse();
        Bytes::from(self.buf)
    }

    /// Finalize and return as `Vec<u8>`.
    pub fn finish_vec(mut self) -> Vec<u8> {
        self.buf.reverse();
        self.buf
    }
}

impl Default for EncodeBuf {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode a signed 64-bit integer in minimal BER form.
///
/// A leading byte is dropped while it and the top bit of the next byte
/// (9 bits in all) are uniformly 0 or uniformly 1.
///
/// Returns a stack-allocated array and the number of valid bytes.
/// The valid bytes are at the END of the array (for reverse-buffer compatibility).
#[inline]
fn encode_signed_stack(value: i64) -> ([u8; 8], usize) {
    let bytes = value.to_be_bytes();

    if (-64..=63).contains(&value) {
        return (bytes, 1);
    }

    let mut start = 0;
    while start < 7 {
        let redundant = (bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0)
            || (bytes[start] == 0xFF && bytes[start + 1] & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }

    (bytes, 8 - start)
}

/// Encode an unsigned 64-bit integer.
///
/// Returns a stack-allocated array and the number of valid bytes.
/// The valid bytes are at the END of the array (for reverse-buffer compatibility).
#[inline]
fn encode_unsigned_stack(value: u64) -> ([u8; 9], usize) {
    let mut result = [0u8; 9];
    result[1..].copy_from_slice(&value.to_be_bytes());

    if value < 0x80 {
        return (result, 1);
    }

    // Skip leading zeros of the 8 value bytes
    let mut start = 1;
    while start < 8 && result[start] == 0 {
        start += 1;
    }

    if result[start] & 0x80 != 0 {
        // Keep the 0x00 in front so the value is not read back as negative
        (result, 10 - start)
    } else {
        (result, 9 - start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper to extract the valid bytes from stack-based integer encoding
    fn encode_signed(value: i64) -> Vec<u8> {
        let (arr, len) = encode_signed_stack(value);
        arr[8 - len..].to_vec()
    }

    /// Helper to extract the valid bytes from stack-based unsigned encoding
    fn encode_unsigned(value: u64) -> Vec<u8> {
        let (arr, len) = encode_unsigned_stack(value);
        arr[9 - len..].to_vec()
    }

    #[test]
    fn test_encode_signed() {
        assert_eq!(encode_signed(0), vec![0]);
        assert_eq!(encode_signed(1), vec![1]);
        assert_eq!(encode_signed(127), vec![127]);
        assert_eq!(encode_signed(128), vec![0, 128]);
        assert_eq!(encode_signed(-1), vec![0xFF]);
        assert_eq!(encode_signed(-128), vec![0x80]);
        assert_eq!(encode_signed(-129), vec![0xFF, 0x7F]);
        assert_eq!(encode_signed(-255), vec![0xFF, 0x01]);
        assert_eq!(encode_signed(256), vec![0x01, 0x00]);
        assert_eq!(
            encode_signed(i64::MIN),
            vec![0x80, 0, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(
            encode_signed(i64::MAX),
            vec![0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_encode_unsigned() {
        assert_eq!(encode_unsigned(0), vec![0]);
        assert_eq!(encode_unsigned(127), vec![127]);
        assert_eq!(encode_unsigned(128), vec![0, 128]);
        assert_eq!(encode_unsigned(255), vec![0, 255]);
        assert_eq!(encode_unsigned(256), vec![1, 0]);
        assert_eq!(encode_unsigned(0xFFFF), vec![0, 0xFF, 0xFF]);
        assert_eq!(encode_unsigned(0xFFFF_FFFF), vec![0, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(
            encode_unsigned(u64::MAX),
            vec![0, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_encode_null() {
        let mut buf = EncodeBuf::new();
        buf.push_null();
        let bytes = buf.finish();
        assert_eq!(&bytes[..], &[0x05, 0x00]);
    }

    #[test]
    fn test_encode_integer_value() {
        let mut buf = EncodeBuf::new();
        buf.push_integer(42);
        let bytes = buf.finish();
        assert_eq!(&bytes[..], &[0x02, 0x01, 0x2A]);
    }

    #[test]
    fn test_encode_unsigned_with_integer_tag() {
        let mut buf = EncodeBuf::new();
        buf.push_unsigned(tag::universal::INTEGER, 0xFFFF);
        assert_eq!(&buf.finish()[..], &[0x02, 0x03, 0x00, 0xFF, 0xFF]);
    }

    #[test]
    fn test_encode_sign_extended_minus_one() {
        // 0xFFFFFFFF reinterpreted as i32 is -1
        let mut buf = EncodeBuf::new();
        buf.push_integer(0xFFFF_FFFFu32 as i32 as i64);
        assert_eq!(&buf.finish()[..], &[0x02, 0x01, 0xFF]);
    }

    #[test]
    fn test_encode_long_octet_string() {
        let data = vec![b'x'; 300];
        let mut buf = EncodeBuf::new();
        buf.push_octet_string(&data);
        let bytes = buf.finish();
        assert_eq!(&bytes[..4], &[0x04, 0x82, 0x01, 0x2C]);
        assert_eq!(bytes.len(), 304);
    }

    #[test]
    fn test_encode_sequence() {
        let mut buf = EncodeBuf::new();
        buf.push_sequence(|buf| {
            // Reverse buffer: push in reverse order for forward output
            buf.push_integer(2);
            buf.push_integer(1);
        });
        let bytes = buf.finish();
        // SEQUENCE { INTEGER 1, INTEGER 2 }
        assert_eq!(
            &bytes[..],
            &[0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02]
        );
    }
}

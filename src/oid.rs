//! Object Identifier (OID) type.
//!
//! OIDs are stored as `SmallVec<[u64; 16]>` to avoid heap allocation for common OIDs.
//! Arcs are full 64-bit values so enterprise numbers and table keys never truncate.

use crate::error::internal::DecodeErrorKind;
use crate::error::{Error, OidErrorKind, Result};
use smallvec::SmallVec;
use std::fmt;

/// Object Identifier.
///
/// Stored as a sequence of arc values (u64). Uses SmallVec to avoid
/// heap allocation for OIDs with 16 or fewer arcs.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Oid {
    arcs: SmallVec<[u64; 16]>,
}

impl Oid {
    /// Create an empty OID.
    pub fn empty() -> Self {
        Self {
            arcs: SmallVec::new(),
        }
    }

    /// Create an OID from arc values.
    ///
    /// # Examples
    ///
    /// ```
    /// use basic_snmp::oid::Oid;
    ///
    /// let oid = Oid::new([1, 3, 6, 1]);
    /// assert_eq!(oid.len(), 4);
    /// ```
    pub fn new(arcs: impl IntoIterator<Item = u64>) -> Self {
        Self {
            arcs: arcs.into_iter().collect(),
        }
    }

    /// Create an OID from a slice of arcs.
    pub fn from_slice(arcs: &[u64]) -> Self {
        Self {
            arcs: SmallVec::from_slice(arcs),
        }
    }

    /// Parse an OID from dotted string notation (e.g., "1.3.6.1.2.1.1.1.0").
    ///
    /// A leading dot is accepted. Arc constraints are not checked here; call
    /// [`validate()`](Self::validate) before encoding.
    ///
    /// # Examples
    ///
    /// ```
    /// use basic_snmp::oid::Oid;
    ///
    /// let oid = Oid::parse(".1.3.6.1.4.1.2680").unwrap();
    /// assert_eq!(oid.arcs(), &[1, 3, 6, 1, 4, 1, 2680]);
    /// assert!(Oid::parse("1.3.x").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self::empty());
        }

        let mut arcs = SmallVec::new();

        for part in trimmed.strip_prefix('.').unwrap_or(trimmed).split('.') {
            let arc: u64 = part.parse().map_err(|_| {
                Error::invalid_oid_with_input(OidErrorKind::InvalidArc, s.to_string())
            })?;
            arcs.push(arc);
        }

        Ok(Self { arcs })
    }

    /// Get the arc values.
    pub fn arcs(&self) -> &[u64] {
        &self.arcs
    }

    /// Get the arc at `index`.
    pub fn get(&self, index: usize) -> Option<u64> {
        self.arcs.get(index).copied()
    }

    /// Get the number of arcs.
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// Check if the OID is empty.
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Check if this OID starts with another OID.
    ///
    /// Any OID starts with the empty OID.
    ///
    /// # Examples
    ///
    /// ```
    /// use basic_snmp::oid::Oid;
    ///
    /// let sys_descr = Oid::parse("1.3.6.1.2.1.1.1.0").unwrap();
    /// let system = Oid::parse("1.3.6.1.2.1.1").unwrap();
    /// assert!(sys_descr.starts_with(&system));
    /// assert!(!system.starts_with(&sys_descr));
    /// assert!(sys_descr.starts_with(&Oid::empty()));
    /// ```
    pub fn starts_with(&self, prefix: &Oid) -> bool {
        self.arcs.starts_with(&prefix.arcs)
    }

    /// Check if this OID ends with another OID.
    ///
    /// Any OID ends with the empty OID.
    pub fn ends_with(&self, suffix: &Oid) -> bool {
        self.arcs.ends_with(&suffix.arcs)
    }

    /// The arcs that follow `prefix`, if this OID starts with it.
    pub fn strip_prefix(&self, prefix: &Oid) -> Option<&[u64]> {
        self.arcs.strip_prefix(&prefix.arcs[..])
    }

    /// Append an arc in place.
    pub fn push(&mut self, arc: u64) {
        self.arcs.push(arc);
    }

    /// Append several arcs in place.
    pub fn extend_from_slice(&mut self, arcs: &[u64]) {
        self.arcs.extend_from_slice(arcs);
    }

    /// Create a child OID by appending an arc.
    ///
    /// # Examples
    ///
    /// ```
    /// use basic_snmp::oid::Oid;
    ///
    /// let system = Oid::parse("1.3.6.1.2.1.1").unwrap();
    /// assert_eq!(system.child(1).child(0).to_string(), "1.3.6.1.2.1.1.1.0");
    /// ```
    pub fn child(&self, arc: u64) -> Oid {
        let mut arcs = self.arcs.clone();
        arcs.push(arc);
        Oid { arcs }
    }

    /// Get the parent OID (all arcs except the last).
    ///
    /// Returns `None` if the OID is empty.
    pub fn parent(&self) -> Option<Oid> {
        self.arcs.split_last().map(|(_, rest)| Oid::from_slice(rest))
    }

    /// Check that the OID can be BER-encoded.
    ///
    /// - at least 2 arcs
    /// - arc1 must be 0, 1, or 2
    /// - arc2 must be <= 39 when arc1 is 0 or 1
    pub fn validate(&self) -> Result<()> {
        let (first, second) = match self.arcs.as_slice() {
            [first, second, ..] => (*first, *second),
            _ => return Err(Error::invalid_oid(OidErrorKind::TooShort)),
        };

        if first > 2 {
            return Err(Error::invalid_oid(OidErrorKind::InvalidFirstArc(first)));
        }

        if (first < 2 && second >= 40) || second > u64::MAX - 80 {
            return Err(Error::invalid_oid(OidErrorKind::InvalidSecondArc {
                first,
                second,
            }));
        }

        Ok(())
    }

    /// Encode to BER content bytes (no tag or length).
    ///
    /// OID encoding (X.690 Section 8.19):
    /// - First two arcs encoded as (arc1 * 40) + arc2 using base-128
    /// - Remaining arcs encoded as base-128 with the continuation bit on all
    ///   but the last byte of each arc
    ///
    /// Callers must [`validate()`](Self::validate) first; an OID with fewer
    /// than 2 arcs encodes as its first arc times 40.
    pub fn to_ber_smallvec(&self) -> SmallVec<[u8; 64]> {
        let mut bytes = SmallVec::new();

        match self.arcs.as_slice() {
            [] => {}
            [first] => encode_subidentifier(&mut bytes, first.saturating_mul(40)),
            [first, second, rest @ ..] => {
                encode_subidentifier(
                    &mut bytes,
                    first.saturating_mul(40).saturating_add(*second),
                );
                for &arc in rest {
                    encode_subidentifier(&mut bytes, arc);
                }
            }
        }

        bytes
    }

    /// Encode to BER content bytes.
    pub fn to_ber(&self) -> Vec<u8> {
        self.to_ber_smallvec().to_vec()
    }

    /// Decode from BER content bytes.
    pub fn from_ber(data: &[u8]) -> Result<Self> {
        Self::from_ber_at(data, 0)
    }

    /// Decode from BER content bytes located at `base_offset` in a datagram.
    ///
    /// Fails with `NotEnoughRoom` if the content ends inside an arc.
    pub fn from_ber_at(data: &[u8], base_offset: usize) -> Result<Self> {
        if data.is_empty() {
            return Ok(Self::empty());
        }

        let mut arcs = SmallVec::new();

        // First subidentifier encodes arc1*40 + arc2 and may span several bytes
        let (first_subid, consumed) = decode_subidentifier(data, base_offset)?;
        match first_subid {
            0..40 => {
                arcs.push(0);
                arcs.push(first_subid);
            }
            40..80 => {
                arcs.push(1);
                arcs.push(first_subid - 40);
            }
            _ => {
                arcs.push(2);
                arcs.push(first_subid - 80);
            }
        }

        let mut i = consumed;
        while i < data.len() {
            let (arc, used) = decode_subidentifier(&data[i..], base_offset + i)?;
            arcs.push(arc);
            i += used;
        }

        Ok(Self { arcs })
    }
}

/// Encode a subidentifier in base-128 variable length into a SmallVec.
#[inline]
fn encode_subidentifier(bytes: &mut SmallVec<[u8; 64]>, value: u64) {
    // Count how many 7-bit groups we need (at least one, for zero)
    let mut count = 1;
    let mut temp = value >> 7;
    while temp > 0 {
        count += 1;
        temp >>= 7;
    }

    // Encode from MSB to LSB
    for i in (0..count).rev() {
        let mut byte = ((value >> (i * 7)) & 0x7F) as u8;
        if i > 0 {
            byte |= 0x80; // Continuation bit
        }
        bytes.push(byte);
    }
}

/// Decode a subidentifier, returning (value, bytes_consumed).
fn decode_subidentifier(data: &[u8], base_offset: usize) -> Result<(u64, usize)> {
    let mut value: u64 = 0;

    for (i, &byte) in data.iter().enumerate() {
        if value > (u64::MAX >> 7) {
            return Err(oid_error(base_offset + i, DecodeErrorKind::OidArcOverflow));
        }

        value = (value << 7) | (byte & 0x7F) as u64;

        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }

    Err(oid_error(
        base_offset + data.len(),
        DecodeErrorKind::TruncatedOidArc,
    ))
}

fn oid_error(offset: usize, kind: DecodeErrorKind) -> Error {
    tracing::debug!(target: "basic_snmp::ber", { snmp.offset = %offset, kind = %kind }, "OID decode error");
    Error::decode(offset, kind.code())
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for arc in &self.arcs {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}", arc)?;
            first = false;
        }
        Ok(())
    }
}

impl std::str::FromStr for Oid {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<&[u64]> for Oid {
    fn from(arcs: &[u64]) -> Self {
        Self::from_slice(arcs)
    }
}

impl<const N: usize> From<[u64; N]> for Oid {
    fn from(arcs: [u64; N]) -> Self {
        Self::new(arcs)
    }
}

impl std::ops::Index<usize> for Oid {
    type Output = u64;

    fn index(&self, index: usize) -> &u64 {
        &self.arcs[index]
    }
}

impl PartialOrd for Oid {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Oid {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.arcs.cmp(&other.arcs)
    }
}

/// Macro to create an OID from literal arcs.
///
/// # Examples
///
/// ```
/// use basic_snmp::oid;
///
/// let sys_descr = oid!(1, 3, 6, 1, 2, 1, 1, 1, 0);
/// assert_eq!(sys_descr.to_string(), "1.3.6.1.2.1.1.1.0");
/// assert!(sys_descr.starts_with(&oid!(1, 3, 6, 1, 2, 1, 1)));
/// ```
#[macro_export]
macro_rules! oid {
    ($($arc:expr),* $(,)?) => {
        $crate::oid::Oid::from_slice(&[$($arc as u64),*])
    };
}

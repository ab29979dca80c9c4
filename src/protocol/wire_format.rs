//! Wire format primitives: tags, wire types, varints.
//!
//! Every entry in an encoded message starts with a tag:
//! ```text
//! ┌──────────────────────────────┬───────────┬─────────────────┐
//! │ field number                 │ wire type │ payload         │
//! │ upper bits                   │ low 3 bits│ per wire type   │
//! └──────────────────────────────┴───────────┴─────────────────┘
//!   \___ varint(field_number << 3 | wire_type) ___/
//! ```
//!
//! Varints are base-128, least significant group first, high bit set on
//! every byte except the last.

use crate::error::{Malformed, Result, WireError};

/// Maximum encoded size of a 64-bit varint.
pub const MAX_VARINT_LEN: usize = 10;

/// Largest legal field number (29 bits).
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Maximum group nesting accepted while skipping unknown groups.
pub const MAX_GROUP_DEPTH: usize = 64;

/// Default maximum size of a single delimited message (64 MiB).
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

/// Wire type carried in the low three bits of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    /// Base-128 varint.
    Varint = 0,
    /// 8 fixed bytes.
    I64 = 1,
    /// Varint length followed by that many bytes.
    Len = 2,
    /// Start of a (deprecated) group.
    StartGroup = 3,
    /// End of a (deprecated) group.
    EndGroup = 4,
    /// 4 fixed bytes.
    I32 = 5,
}

impl WireType {
    /// Parse the low three bits of a tag.
    ///
    /// Returns `None` for 6 and 7, which no encoder produces.
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(WireType::Varint),
            1 => Some(WireType::I64),
            2 => Some(WireType::Len),
            3 => Some(WireType::StartGroup),
            4 => Some(WireType::EndGroup),
            5 => Some(WireType::I32),
            _ => None,
        }
    }

    /// Payload size for fixed-width types.
    #[inline]
    pub fn fixed_size(self) -> Option<usize> {
        match self {
            WireType::I64 => Some(8),
            WireType::I32 => Some(4),
            _ => None,
        }
    }
}

/// Decoded tag: field number plus wire type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag {
    /// Field number (1..=`MAX_FIELD_NUMBER`).
    pub field_number: u32,
    /// Wire type of the payload that follows.
    pub wire_type: WireType,
}

impl Tag {
    /// Create a new tag.
    ///
    /// `field_number` must be in `1..=MAX_FIELD_NUMBER`; this is only
    /// checked in debug builds. Use [`Tag::from_raw`] for untrusted input.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `field_number` is out of range.
    pub fn new(field_number: u32, wire_type: WireType) -> Self {
        debug_assert!((1..=MAX_FIELD_NUMBER).contains(&field_number));
        Self {
            field_number,
            wire_type,
        }
    }

    /// Raw varint value of this tag.
    ///
    /// # Example
    ///
    /// ```
    /// use msgwire::protocol::{Tag, WireType};
    ///
    /// // field 1, length-delimited
    /// assert_eq!(Tag::new(1, WireType::Len).to_raw(), 0x0A);
    /// ```
    #[inline]
    pub fn to_raw(&self) -> u32 {
        (self.field_number << 3) | self.wire_type as u32
    }

    /// Validate and split a raw tag value read at `offset`.
    pub fn from_raw(raw: u64, offset: usize) -> Result<Self> {
        let field_number = raw >> 3;
        if field_number == 0 || field_number > MAX_FIELD_NUMBER as u64 {
            return Err(WireError::malformed(
                offset,
                Malformed::InvalidFieldNumber(field_number),
            ));
        }

        let bits = (raw & 0b111) as u8;
        let wire_type = WireType::from_bits(bits)
            .ok_or_else(|| WireError::malformed(offset, Malformed::InvalidWireType(bits)))?;

        Ok(Self {
            field_number: field_number as u32,
            wire_type,
        })
    }

    /// Encoded size of this tag in bytes.
    #[inline]
    pub fn encoded_len(&self) -> usize {
        varint_len(self.to_raw() as u64)
    }
}

/// Number of bytes `value` occupies as a varint.
///
/// # Example
///
/// ```
/// use msgwire::protocol::varint_len;
///
/// assert_eq!(varint_len(0), 1);
/// assert_eq!(varint_len(127), 1);
/// assert_eq!(varint_len(128), 2);
/// assert_eq!(varint_len(u64::MAX), 10);
/// ```
#[inline]
pub fn varint_len(value: u64) -> usize {
    // 7 payload bits per byte; zero still takes one byte
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

/// Encode `value` as a varint into `buf`, returning the bytes written.
///
/// # Panics
///
/// Panics if `buf` is shorter than `varint_len(value)`.
pub fn encode_varint_into(mut value: u64, buf: &mut [u8]) -> usize {
    let mut i = 0;
    while value >= 0x80 {
        buf[i] = (value as u8) | 0x80;
        value >>= 7;
        i += 1;
    }
    buf[i] = value as u8;
    i + 1
}

/// Decode a varint from the front of `buf`.
///
/// Returns the value and the number of bytes consumed. `offset` is only used
/// to position errors within a larger input.
pub fn decode_varint(buf: &[u8], offset: usize) -> Result<(u64, usize)> {
    let mut value: u64 = 0;

    for (i, &byte) in buf.iter().take(MAX_VARINT_LEN).enumerate() {
        // 10th byte may only contribute the single remaining bit
        if i == MAX_VARINT_LEN - 1 && byte > 0x01 {
            return Err(WireError::malformed(offset, Malformed::VarintOverflow));
        }

        value |= ((byte & 0x7F) as u64) << (7 * i);

        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }

    if buf.len() >= MAX_VARINT_LEN {
        Err(WireError::malformed(offset, Malformed::VarintOverflow))
    } else {
        Err(WireError::malformed(offset, Malformed::TruncatedVarint))
    }
}

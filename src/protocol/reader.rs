//! Cursor over an encoded byte slice.
//!
//! Every read either advances past a complete item or fails with
//! `MalformedInput` positioned at the start of the offending item.
//! Nothing is copied: text and bytes are borrowed from the input.

use super::wire_format::{decode_varint, Tag, WireType, MAX_GROUP_DEPTH};
use crate::error::{Malformed, Result, WireError};

/// Zero-copy reader for tag-delimited entries.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buffer: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    /// Create a reader positioned at the start of `buffer`.
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, pos: 0 }
    }

    /// Current read position.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.pos
    }

    /// Check if the input is exhausted.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.buffer.len()
    }

    /// Read a varint.
    pub fn read_varint(&mut self) -> Result<u64> {
        let (value, used) = decode_varint(&self.buffer[self.pos..], self.pos)?;
        self.pos += used;
        Ok(value)
    }

    /// Read the next tag.
    ///
    /// Returns `Ok(None)` at a clean end of input.
    pub fn read_tag(&mut self) -> Result<Option<Tag>> {
        if self.is_empty() {
            return Ok(None);
        }

        let start = self.pos;
        let raw = self.read_varint()?;
        Tag::from_raw(raw, start).map(Some)
    }

    /// Read a varint length followed by that many bytes.
    pub fn read_length_delimited(&mut self) -> Result<&'a [u8]> {
        let start = self.pos;
        let declared = self.read_varint()?;
        let remaining = self.remaining();

        if declared > remaining as u64 {
            return Err(WireError::malformed(
                start,
                Malformed::LengthOverrun {
                    declared,
                    remaining,
                },
            ));
        }

        self.take(declared as usize)
    }

    /// Read a length-delimited payload as UTF-8 text.
    pub fn read_string(&mut self) -> Result<&'a str> {
        let start = self.pos;
        let bytes = self.read_length_delimited()?;
        std::str::from_utf8(bytes).map_err(|_| WireError::malformed(start, Malformed::InvalidUtf8))
    }

    /// Skip the payload that follows `tag`.
    ///
    /// Groups are skipped entry by entry up to the matching end-group marker.
    /// A bare end-group tag has no payload to skip and is rejected here;
    /// callers that track groups handle it before calling.
    pub fn skip_field(&mut self, tag: Tag) -> Result<()> {
        self.skip_field_at_depth(tag, 0)
    }

    fn skip_field_at_depth(&mut self, tag: Tag, depth: usize) -> Result<()> {
        match tag.wire_type {
            WireType::Varint => {
                self.read_varint()?;
            }
            WireType::I64 | WireType::I32 => {
                let size = tag.wire_type.fixed_size().unwrap_or_default();
                self.take(size)?;
            }
            WireType::Len => {
                self.read_length_delimited()?;
            }
            WireType::StartGroup => self.skip_group(tag.field_number, depth + 1)?,
            WireType::EndGroup => {
                return Err(WireError::malformed(
                    self.pos,
                    Malformed::UnexpectedEndGroup,
                ));
            }
        }
        Ok(())
    }

    fn skip_group(&mut self, field_number: u32, depth: usize) -> Result<()> {
        if depth > MAX_GROUP_DEPTH {
            return Err(WireError::malformed(self.pos, Malformed::GroupTooDeep));
        }

        loop {
            let start = self.pos;
            let tag = self
                .read_tag()?
                .ok_or_else(|| WireError::malformed(start, Malformed::UnterminatedGroup))?;

            if tag.wire_type == WireType::EndGroup {
                if tag.field_number != field_number {
                    return Err(WireError::malformed(
                        start,
                        Malformed::MismatchedEndGroup {
                            expected: field_number,
                            found: tag.field_number,
                        },
                    ));
                }
                return Ok(());
            }

            self.skip_field_at_depth(tag, depth)?;
        }
    }

    /// Borrow the next `len` bytes and advance past them.
    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(WireError::malformed(
                self.pos,
                Malformed::LengthOverrun {
                    declared: len as u64,
                    remaining,
                },
            ));
        }

        let bytes = &self.buffer[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }
}

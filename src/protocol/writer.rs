//! Buffered writer for tag-delimited entries.
//!
//! Uses `bytes::BytesMut` so the finished buffer can be frozen into a
//! shareable `Bytes` without copying.

use bytes::{BufMut, Bytes, BytesMut};

use super::wire_format::{encode_varint_into, Tag, WireType, MAX_VARINT_LEN};

/// Appends wire-format entries to a growable buffer.
#[derive(Debug, Default)]
pub struct WireWriter {
    buffer: BytesMut,
}

impl WireWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::new(),
        }
    }

    /// Create a writer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Write a raw varint.
    #[inline]
    pub fn write_varint(&mut self, value: u64) {
        put_varint(&mut self.buffer, value);
    }

    /// Write a tag (field number + wire type).
    ///
    /// `field_number` must be in `1..=MAX_FIELD_NUMBER`. This is only
    /// checked in debug builds; release builds write whatever tag the
    /// number produces.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `field_number` is out of range.
    #[inline]
    pub fn write_tag(&mut self, field_number: u32, wire_type: WireType) {
        self.write_varint(Tag::new(field_number, wire_type).to_raw() as u64);
    }

    /// Write a length-delimited bytes entry.
    pub fn write_bytes_field(&mut self, field_number: u32, value: &[u8]) {
        self.write_tag(field_number, WireType::Len);
        self.write_varint(value.len() as u64);
        self.buffer.put_slice(value);
    }

    /// Write a length-delimited UTF-8 text entry.
    #[inline]
    pub fn write_string_field(&mut self, field_number: u32, value: &str) {
        self.write_bytes_field(field_number, value.as_bytes());
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Freeze the written bytes.
    pub fn finish(self) -> Bytes {
        self.buffer.freeze()
    }

    /// Give back the underlying mutable buffer.
    pub fn into_inner(self) -> BytesMut {
        self.buffer
    }
}

impl From<BytesMut> for WireWriter {
    /// Continue writing at the end of an existing buffer.
    fn from(buffer: BytesMut) -> Self {
        Self { buffer }
    }
}

/// Append a varint to any `BufMut`.
#[inline]
pub fn put_varint<B: BufMut>(buf: &mut B, value: u64) {
    let mut scratch = [0u8; MAX_VARINT_LEN];
    let n = encode_varint_into(value, &mut scratch);
    buf.put_slice(&scratch[..n]);
}

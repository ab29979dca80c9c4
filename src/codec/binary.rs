//! Binary codec for [`Message`].
//!
//! Each non-empty field is written as one length-delimited entry, in
//! ascending tag order:
//! ```text
//! ┌──────────────┬───────────────┬──────────────┐
//! │ tag          │ length        │ UTF-8 bytes  │
//! │ (n << 3) | 2 │ varint        │ length bytes │
//! └──────────────┴───────────────┴──────────────┘
//! ```
//!
//! Empty fields produce no bytes, so an empty message encodes to nothing.
//! Decoding accepts entries in any order, keeps the last value seen for a
//! repeated tag, and skips entries it does not recognize.

use bytes::{Bytes, BytesMut};

use crate::error::Result;
use crate::message::{Field, Message};
use crate::protocol::{varint_len, Tag, WireReader, WireType, WireWriter};

/// Binary wire format codec for messages.
pub struct BinaryCodec;

impl BinaryCodec {
    /// Encode a message.
    ///
    /// Output depends only on the field values, never on the order they
    /// were set.
    pub fn encode(message: &Message) -> Bytes {
        let mut writer = WireWriter::with_capacity(Self::encoded_len(message));
        Self::write_fields(message, &mut writer);
        writer.finish()
    }

    /// Append the encoding of `message` to `buf`.
    pub fn encode_to(message: &Message, buf: &mut BytesMut) {
        buf.reserve(Self::encoded_len(message));
        let mut writer = WireWriter::from(std::mem::take(buf));
        Self::write_fields(message, &mut writer);
        *buf = writer.into_inner();
    }

    /// Exact number of bytes [`BinaryCodec::encode`] produces.
    pub fn encoded_len(message: &Message) -> usize {
        message
            .set_fields()
            .map(|(field, value)| {
                Tag::new(field.tag(), WireType::Len).encoded_len()
                    + varint_len(value.len() as u64)
                    + value.len()
            })
            .sum()
    }

    fn write_fields(message: &Message, writer: &mut WireWriter) {
        for (field, value) in message.set_fields() {
            writer.write_string_field(field.tag(), value);
        }
    }

    /// Decode a message.
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` if the input is truncated, carries an invalid
    /// tag or varint, or a length runs past the end of the input. No partially
    /// decoded message is ever returned.
    ///
    /// A known field whose payload is not valid UTF-8 also fails, with
    /// [`Malformed::InvalidUtf8`](crate::error::Malformed::InvalidUtf8).
    /// This goes beyond the truncation and varint failures above: field
    /// values are Rust `String`s, so bytes that are not text cannot be
    /// stored. Unknown fields are skipped without inspection.
    ///
    /// An end-group marker at the top level ends decoding; the fields read
    /// before it are returned and any bytes after it are ignored.
    pub fn decode(bytes: &[u8]) -> Result<Message> {
        let mut reader = WireReader::new(bytes);
        let mut message = Message::new();

        loop {
            let start = reader.position();
            let Some(tag) = reader.read_tag()? else {
                break;
            };
            if tag.wire_type == WireType::EndGroup {
                tracing::trace!("End-group marker at byte {}, stopping", start);
                break;
            }

            match (Field::from_tag(tag.field_number), tag.wire_type) {
                (Some(field), WireType::Len) => {
                    let value = reader.read_string()?;
                    message.set(field, value);
                }
                _ => {
                    tracing::trace!(
                        "Skipping unknown field {} ({:?}) at byte {}",
                        tag.field_number,
                        tag.wire_type,
                        start
                    );
                    reader.skip_field(tag)?;
                }
            }
        }

        Ok(message)
    }
}

//! Length-delimited message sequences.
//!
//! A delimited message is its binary encoding prefixed by the encoding's
//! byte length as a varint:
//! ```text
//! ┌──────────────┬──────────────────────────┐
//! │ length       │ encoded message          │
//! │ varint       │ length bytes             │
//! └──────────────┴──────────────────────────┘
//! ```
//!
//! [`DelimitedBuffer`] accumulates arbitrary chunks (partial reads from a
//! pipe or file) and hands back every message that is complete:
//! - `WaitingForLength`: need the full varint prefix
//! - `WaitingForBody`: prefix parsed, need N more body bytes
//!
//! # Example
//!
//! ```
//! use msgwire::protocol::{encode_delimited, DelimitedBuffer};
//! use msgwire::Message;
//!
//! let mut msg = Message::new();
//! msg.set_id("m1");
//! let bytes = encode_delimited(&msg);
//!
//! let mut buffer = DelimitedBuffer::new();
//! assert!(buffer.push(&bytes[..2]).unwrap().is_empty());
//! let messages = buffer.push(&bytes[2..]).unwrap();
//! assert_eq!(messages, vec![msg]);
//! ```

use bytes::{Bytes, BytesMut};

use super::wire_format::{decode_varint, varint_len, DEFAULT_MAX_MESSAGE_SIZE};
use super::writer::put_varint;
use crate::codec::BinaryCodec;
use crate::error::{Malformed, Result, WireError};
use crate::message::Message;

/// Encode `message` with a varint length prefix.
pub fn encode_delimited(message: &Message) -> Bytes {
    let len = message.encoded_len();
    let mut buf = BytesMut::with_capacity(varint_len(len as u64) + len);
    put_varint(&mut buf, len as u64);
    message.encode_to(&mut buf);
    buf.freeze()
}

/// Decode one delimited message from the front of `bytes`.
///
/// Returns the message and the number of bytes consumed (prefix + body).
///
/// # Errors
///
/// Returns `MalformedInput` if the prefix or body is truncated or the body
/// is not a valid encoding. Offsets count from the start of `bytes`, prefix
/// included.
pub fn decode_delimited(bytes: &[u8]) -> Result<(Message, usize)> {
    let (len, prefix_len) = decode_varint(bytes, 0)?;
    let remaining = bytes.len() - prefix_len;

    if len > remaining as u64 {
        return Err(WireError::malformed(
            0,
            Malformed::LengthOverrun {
                declared: len,
                remaining,
            },
        ));
    }

    let end = prefix_len + len as usize;
    let message =
        BinaryCodec::decode(&bytes[prefix_len..end]).map_err(|e| e.offset_by(prefix_len))?;
    Ok((message, end))
}

/// State machine for delimited parsing.
#[derive(Debug, Clone, Copy)]
enum State {
    /// Waiting for a complete varint length prefix.
    WaitingForLength,
    /// Prefix parsed, waiting for the message body.
    WaitingForBody { remaining: usize },
}

/// Buffer for accumulating incoming bytes and extracting complete messages.
///
/// Error offsets count from the first byte pushed since creation or the
/// last [`clear`](DelimitedBuffer::clear).
pub struct DelimitedBuffer {
    /// Accumulated bytes not yet consumed.
    buffer: BytesMut,
    /// Current parsing state.
    state: State,
    /// Maximum allowed body size.
    max_message_size: usize,
    /// Stream position of `buffer[0]`.
    offset: usize,
    /// Error hit after messages were already decoded in the same push.
    deferred: Option<WireError>,
}

impl DelimitedBuffer {
    /// Create a new buffer with default settings.
    ///
    /// Default capacity: 64KB, max message: 64MB.
    pub fn new() -> Self {
        Self::with_capacity_and_max_message_size(64 * 1024, DEFAULT_MAX_MESSAGE_SIZE)
    }

    /// Create a new buffer with a custom max message size.
    pub fn with_max_message_size(max_message_size: usize) -> Self {
        Self::with_capacity_and_max_message_size(64 * 1024, max_message_size)
    }

    /// Create a new buffer with custom capacity and max message size.
    pub fn with_capacity_and_max_message_size(capacity: usize, max_message_size: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
            state: State::WaitingForLength,
            max_message_size,
            offset: 0,
            deferred: None,
        }
    }

    /// Push data into the buffer and decode all complete messages.
    ///
    /// Partial data is kept for the next push.
    ///
    /// # Errors
    ///
    /// Returns `MessageTooLarge` if a prefix declares more than the maximum,
    /// or `MalformedInput` if a prefix or body is corrupt. The buffer should
    /// be cleared or discarded after an error.
    ///
    /// Messages decoded before the failing one are still returned; the error
    /// is then held and returned by the next `push` (or [`take_error`]).
    ///
    /// [`take_error`]: DelimitedBuffer::take_error
    pub fn push(&mut self, data: &[u8]) -> Result<Vec<Message>> {
        if let Some(err) = self.deferred.take() {
            return Err(err);
        }

        self.buffer.extend_from_slice(data);

        let mut messages = Vec::new();
        loop {
            match self.try_extract_one() {
                Ok(Some(message)) => messages.push(message),
                Ok(None) => break,
                Err(e) if messages.is_empty() => return Err(e),
                Err(e) => {
                    tracing::debug!(
                        "Holding error after {} message(s): {}",
                        messages.len(),
                        e
                    );
                    self.deferred = Some(e);
                    break;
                }
            }
        }

        Ok(messages)
    }

    /// Take the error held back by the last [`push`](DelimitedBuffer::push).
    pub fn take_error(&mut self) -> Option<WireError> {
        self.deferred.take()
    }

    /// Try to decode a single message from the buffer.
    ///
    /// Returns:
    /// - `Ok(Some(message))` if a complete message was decoded
    /// - `Ok(None)` if more data is needed
    /// - `Err(...)` on an oversized or malformed message
    fn try_extract_one(&mut self) -> Result<Option<Message>> {
        match self.state {
            State::WaitingForLength => {
                let (len, prefix_len) = match decode_varint(&self.buffer, self.offset) {
                    Ok(parsed) => parsed,
                    Err(e) if e.malformed_kind() == Some(Malformed::TruncatedVarint) => {
                        return Ok(None);
                    }
                    Err(e) => return Err(e),
                };

                if len > self.max_message_size as u64 {
                    return Err(WireError::MessageTooLarge {
                        size: len,
                        max: self.max_message_size,
                    });
                }

                let _ = self.buffer.split_to(prefix_len);
                self.offset += prefix_len;
                self.state = State::WaitingForBody {
                    remaining: len as usize,
                };

                // Zero-length body is already complete
                self.try_extract_one()
            }

            State::WaitingForBody { remaining } => {
                if self.buffer.len() < remaining {
                    return Ok(None);
                }

                let body = self.buffer.split_to(remaining).freeze();
                let body_start = self.offset;
                self.offset += remaining;
                self.state = State::WaitingForLength;

                BinaryCodec::decode(&body)
                    .map(Some)
                    .map_err(|e| e.offset_by(body_start))
            }
        }
    }

    /// Get the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Check if a message has been started but not completed.
    pub fn has_partial(&self) -> bool {
        matches!(self.state, State::WaitingForBody { .. }) || !self.buffer.is_empty()
    }

    /// Clear the buffer and reset state, including any held error.
    ///
    /// Error offsets start again from zero.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.state = State::WaitingForLength;
        self.offset = 0;
        self.deferred = None;
    }

    #[cfg(test)]
    fn state_name(&self) -> &'static str {
        match self.state {
            State::WaitingForLength => "WaitingForLength",
            State::WaitingForBody { .. } => "WaitingForBody",
        }
    }
}

impl Default for DelimitedBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: &str, body: &str) -> Message {
        let mut m = Message::new();
        m.set_id(id);
        m.set_message(body);
        m
    }

    #[test]
    fn test_encode_delimited_layout() {
        let m = msg("m1", "");
        let bytes = encode_delimited(&m);
        assert_eq!(&bytes[..], &[0x04, 0x0A, 0x02, b'm', b'1']);
    }

    #[test]
    fn test_decode_delimited_reports_consumed() {
        let mut bytes = encode_delimited(&msg("a", "b")).to_vec();
        let first_len = bytes.len();
        bytes.extend_from_slice(&encode_delimited(&msg("c", "d")));

        let (first, used) = decode_delimited(&bytes).unwrap();
        assert_eq!(first, msg("a", "b"));
        assert_eq!(used, first_len);

        let (second, _) = decode_delimited(&bytes[used..]).unwrap();
        assert_eq!(second, msg("c", "d"));
    }

    #[test]
    fn test_decode_delimited_offset_includes_prefix() {
        // body: field 1 len 5 with only 1 byte; the overrun starts at byte 2
        let err = decode_delimited(&[0x03, 0x0A, 0x05, b'a']).unwrap_err();
        assert!(matches!(
            err,
            WireError::MalformedInput {
                offset: 2,
                kind: Malformed::LengthOverrun { declared: 5, .. }
            }
        ));
    }

    #[test]
    fn test_decode_delimited_truncated_body() {
        let bytes = encode_delimited(&msg("m1", "hello"));
        let err = decode_delimited(&bytes[..bytes.len() - 2]).unwrap_err();
        assert!(matches!(
            err.malformed_kind(),
            Some(Malformed::LengthOverrun { .. })
        ));
    }

    #[test]
    fn test_single_complete_message() {
        let mut buffer = DelimitedBuffer::new();
        let messages = buffer.push(&encode_delimited(&msg("m1", "hello"))).unwrap();

        assert_eq!(messages, vec![msg("m1", "hello")]);
        assert!(buffer.is_empty());
        assert!(!buffer.has_partial());
    }

    #[test]
    fn test_multiple_messages_in_one_push() {
        let mut buffer = DelimitedBuffer::new();
        let mut combined = Vec::new();
        for i in 0..3 {
            combined.extend_from_slice(&encode_delimited(&msg(&format!("m{}", i), "x")));
        }

        let messages = buffer.push(&combined).unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].id(), "m2");
    }

    #[test]
    fn test_empty_message_frame() {
        let mut buffer = DelimitedBuffer::new();
        let messages = buffer.push(&[0x00, 0x00]).unwrap();

        assert_eq!(messages, vec![Message::new(), Message::new()]);
        assert_eq!(buffer.state_name(), "WaitingForLength");
    }

    #[test]
    fn test_fragmented_length_prefix() {
        let body = "y".repeat(200);
        let bytes = encode_delimited(&msg("m1", &body));
        // Prefix is two bytes for a body over 127 bytes
        assert!(bytes[0] & 0x80 != 0);

        let mut buffer = DelimitedBuffer::new();
        assert!(buffer.push(&bytes[..1]).unwrap().is_empty());
        assert_eq!(buffer.state_name(), "WaitingForLength");

        assert!(buffer.push(&bytes[1..10]).unwrap().is_empty());
        assert_eq!(buffer.state_name(), "WaitingForBody");

        let messages = buffer.push(&bytes[10..]).unwrap();
        assert_eq!(messages[0].message(), body);
    }

    #[test]
    fn test_byte_at_a_time() {
        let bytes = encode_delimited(&msg("m1", "hi"));
        let mut buffer = DelimitedBuffer::new();

        let mut all = Vec::new();
        for byte in bytes.iter() {
            all.extend(buffer.push(&[*byte]).unwrap());
        }

        assert_eq!(all, vec![msg("m1", "hi")]);
    }

    #[test]
    fn test_max_message_size() {
        let mut buffer = DelimitedBuffer::with_max_message_size(4);
        let result = buffer.push(&encode_delimited(&msg("m1", "too long")));

        let err = result.unwrap_err();
        assert!(matches!(err, WireError::MessageTooLarge { max: 4, .. }));
    }

    #[test]
    fn test_malformed_body() {
        let mut buffer = DelimitedBuffer::new();
        // body: field 1 len 5 with only 1 byte
        let err = buffer.push(&[0x03, 0x0A, 0x05, b'a']).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_messages_before_malformed_body_are_kept() {
        let good = encode_delimited(&msg("m1", "hello"));
        let mut bytes = good.to_vec();
        bytes.extend_from_slice(&[0x03, 0x0A, 0x05, b'a']);

        let mut buffer = DelimitedBuffer::new();
        let messages = buffer.push(&bytes).unwrap();
        assert_eq!(messages, vec![msg("m1", "hello")]);

        let err = buffer.push(&[]).unwrap_err();
        assert!(err.is_malformed());
        assert!(buffer.take_error().is_none());
    }

    #[test]
    fn test_error_offset_is_stream_relative() {
        let good = encode_delimited(&msg("m1", "hello"));
        let mut buffer = DelimitedBuffer::new();
        buffer.push(&good).unwrap();

        let err = buffer.push(&[0x03, 0x0A, 0x05, b'a']).unwrap_err();
        // second prefix is one byte, then the length varint inside the body
        let expected = good.len() + 2;
        assert!(matches!(
            err,
            WireError::MalformedInput { offset, .. } if offset == expected
        ));
    }

    #[test]
    fn test_take_error_after_good_message() {
        let mut bytes = encode_delimited(&msg("m1", "")).to_vec();
        bytes.extend_from_slice(&[0xFF; 11]);

        let mut buffer = DelimitedBuffer::new();
        assert_eq!(buffer.push(&bytes).unwrap().len(), 1);

        let err = buffer.take_error().unwrap();
        assert_eq!(err.malformed_kind(), Some(Malformed::VarintOverflow));
        assert!(buffer.take_error().is_none());
    }

    #[test]
    fn test_overlong_prefix_rejected() {
        let mut buffer = DelimitedBuffer::new();
        let err = buffer.push(&[0xFF; 11]).unwrap_err();
        assert_eq!(err.malformed_kind(), Some(Malformed::VarintOverflow));
    }

    #[test]
    fn test_clear_resets_state() {
        let bytes = encode_delimited(&msg("m1", "hello"));
        let mut buffer = DelimitedBuffer::new();
        buffer.push(&bytes[..3]).unwrap();
        assert_eq!(buffer.state_name(), "WaitingForBody");
        assert!(buffer.has_partial());

        buffer.clear();
        assert_eq!(buffer.state_name(), "WaitingForLength");
        assert!(buffer.is_empty());

        let messages = buffer.push(&bytes).unwrap();
        assert_eq!(messages, vec![msg("m1", "hello")]);
    }
}

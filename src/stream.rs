//! Async reading and writing of delimited message streams.
//!
//! Works over any `tokio::io::AsyncRead` / `AsyncWrite`: pipes, sockets,
//! files. Each message on the stream is varint length-prefixed (see
//! [`protocol::encode_delimited`](crate::protocol::encode_delimited)).
//!
//! # Example
//!
//! ```
//! use msgwire::stream::{write_message, MessageReader};
//! use msgwire::Message;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> msgwire::Result<()> {
//! let (mut tx, rx) = tokio::io::duplex(1024);
//!
//! let mut msg = Message::new();
//! msg.set_subject("Hi");
//! write_message(&mut tx, &msg).await?;
//! drop(tx);
//!
//! let mut reader = MessageReader::new(rx);
//! assert_eq!(reader.next_message().await?, Some(msg));
//! assert_eq!(reader.next_message().await?, None);
//! # Ok(())
//! # }
//! ```

use std::collections::VecDeque;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Malformed, Result, WireError};
use crate::message::Message;
use crate::protocol::{put_varint, varint_len, DelimitedBuffer, DEFAULT_MAX_MESSAGE_SIZE};

/// Default read buffer size.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 64 * 1024;

/// Configuration for [`MessageReader`].
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Bytes requested per read call.
    pub read_buffer_size: usize,
    /// Largest message body accepted.
    pub max_message_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

/// Reads delimited messages from an async byte stream.
pub struct MessageReader<R> {
    reader: R,
    buffer: DelimitedBuffer,
    /// Decoded messages not yet handed out.
    pending: VecDeque<Message>,
    read_buf: Vec<u8>,
    /// Total bytes read from `reader`.
    bytes_read: usize,
}

impl<R: AsyncRead + Unpin> MessageReader<R> {
    /// Create a reader with default configuration.
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, ReaderConfig::default())
    }

    /// Create a reader with custom configuration.
    pub fn with_config(reader: R, config: ReaderConfig) -> Self {
        Self {
            reader,
            buffer: DelimitedBuffer::with_max_message_size(config.max_message_size),
            pending: VecDeque::new(),
            read_buf: vec![0u8; config.read_buffer_size.max(1)],
            bytes_read: 0,
        }
    }

    /// Read the next message.
    ///
    /// Returns `Ok(None)` when the stream closes at a message boundary.
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` if the stream closes inside a message or a
    /// message is corrupt, `MessageTooLarge` for oversized messages, and
    /// `Io` for read failures.
    pub async fn next_message(&mut self) -> Result<Option<Message>> {
        loop {
            if let Some(message) = self.pending.pop_front() {
                return Ok(Some(message));
            }
            if let Some(err) = self.buffer.take_error() {
                return Err(err);
            }

            let n = self.reader.read(&mut self.read_buf).await?;
            if n == 0 {
                if self.buffer.has_partial() {
                    return Err(WireError::malformed(
                        self.bytes_read,
                        Malformed::UnexpectedEof,
                    ));
                }
                tracing::debug!("Message stream closed after {} bytes", self.bytes_read);
                return Ok(None);
            }

            self.bytes_read += n;
            let messages = self.buffer.push(&self.read_buf[..n])?;
            self.pending.extend(messages);
        }
    }

    /// Read messages until the stream closes.
    pub async fn read_all(&mut self) -> Result<Vec<Message>> {
        let mut messages = Vec::new();
        while let Some(message) = self.next_message().await? {
            messages.push(message);
        }
        Ok(messages)
    }

    /// Total bytes consumed from the underlying reader.
    pub fn bytes_read(&self) -> usize {
        self.bytes_read
    }

    /// Give back the underlying reader. Buffered data is dropped.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Write one delimited message and flush.
pub async fn write_message<W>(writer: &mut W, message: &Message) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    write_messages(writer, std::iter::once(message)).await
}

/// Write several delimited messages in a single write, then flush.
pub async fn write_messages<'a, W, I>(writer: &mut W, messages: I) -> Result<()>
where
    W: AsyncWrite + Unpin,
    I: IntoIterator<Item = &'a Message>,
{
    let mut buf = BytesMut::new();
    let mut count = 0usize;

    for message in messages {
        let len = message.encoded_len();
        buf.reserve(varint_len(len as u64) + len);
        put_varint(&mut buf, len as u64);
        message.encode_to(&mut buf);
        count += 1;
    }

    writer.write_all(&buf).await?;
    writer.flush().await?;

    tracing::debug!("Wrote {} message(s), {} bytes", count, buf.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::encode_delimited;

    fn msg(id: &str) -> Message {
        let mut m = Message::new();
        m.set_id(id);
        m.set_subject("subject");
        m
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let (mut tx, rx) = tokio::io::duplex(4096);

        let sent = vec![msg("a"), msg("b"), Message::new(), msg("c")];
        write_messages(&mut tx, &sent).await.unwrap();
        drop(tx);

        let mut reader = MessageReader::new(rx);
        let received = reader.read_all().await.unwrap();
        assert_eq!(received, sent);
    }

    #[tokio::test]
    async fn test_small_read_buffer() {
        let (mut tx, rx) = tokio::io::duplex(4096);
        write_message(&mut tx, &msg("tiny-reads")).await.unwrap();
        drop(tx);

        let config = ReaderConfig {
            read_buffer_size: 1,
            ..ReaderConfig::default()
        };
        let mut reader = MessageReader::with_config(rx, config);

        assert_eq!(reader.next_message().await.unwrap(), Some(msg("tiny-reads")));
        assert_eq!(reader.next_message().await.unwrap(), None);
        assert_eq!(reader.bytes_read(), encode_delimited(&msg("tiny-reads")).len());
    }

    #[tokio::test]
    async fn test_eof_inside_message() {
        let bytes = encode_delimited(&msg("cut"));
        let truncated = &bytes[..bytes.len() - 1];

        let mut reader = MessageReader::new(truncated);
        let err = reader.next_message().await.unwrap_err();
        assert_eq!(err.malformed_kind(), Some(Malformed::UnexpectedEof));
    }

    #[tokio::test]
    async fn test_good_message_before_corrupt_one() {
        let mut bytes = encode_delimited(&msg("good")).to_vec();
        bytes.extend_from_slice(&[0x03, 0x0A, 0x05, b'a']);

        let mut reader = MessageReader::new(&bytes[..]);
        assert_eq!(reader.next_message().await.unwrap(), Some(msg("good")));

        let err = reader.next_message().await.unwrap_err();
        assert!(err.is_malformed());
    }

    #[tokio::test]
    async fn test_empty_stream() {
        let empty: &[u8] = &[];
        let mut reader = MessageReader::new(empty);
        assert_eq!(reader.next_message().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_oversized_message_rejected() {
        let bytes = encode_delimited(&msg("big"));
        let config = ReaderConfig {
            max_message_size: 2,
            ..ReaderConfig::default()
        };

        let mut reader = MessageReader::with_config(&bytes[..], config);
        let err = reader.next_message().await.unwrap_err();
        assert!(matches!(err, WireError::MessageTooLarge { .. }));
    }
}

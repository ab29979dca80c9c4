//! # msgwire
//!
//! Binary codec for the notification message record.
//!
//! A [`Message`] holds eight text fields (identifiers, contact details,
//! subject, body, parent reference). It encodes to a compact tag-delimited
//! binary format compatible with protobuf `string` fields, and decodes back
//! with forward-compatible skipping of fields it does not know.
//!
//! ## Layers
//!
//! - **Message** ([`message`]): the record and its accessors
//! - **Codecs** ([`codec`]): binary wire format and JSON object view
//! - **Protocol** ([`protocol`]): varint/tag primitives and delimited framing
//! - **Stream** ([`stream`]): async read/write of delimited message streams
//!
//! ## Example
//!
//! ```
//! use msgwire::{decode, encode, Message};
//!
//! let mut msg = Message::new();
//! msg.set_id("m1");
//! msg.set_user_id("u1");
//! msg.set_subject("Hi");
//! msg.set_message("Hello world");
//!
//! let bytes = encode(&msg);
//! let decoded = decode(&bytes).unwrap();
//! assert_eq!(decoded, msg);
//! assert_eq!(decoded.parent_id(), "");
//! ```

pub mod codec;
pub mod error;
pub mod message;
pub mod protocol;
pub mod stream;

use bytes::Bytes;

pub use codec::{BinaryCodec, JsonCodec};
pub use error::{Malformed, Result, WireError};
pub use message::{Field, Message};

/// Encode a message to the binary wire format.
#[inline]
pub fn encode(message: &Message) -> Bytes {
    BinaryCodec::encode(message)
}

/// Decode a message from the binary wire format.
///
/// # Errors
///
/// Returns [`WireError::MalformedInput`] on truncated or corrupt input.
#[inline]
pub fn decode(bytes: &[u8]) -> Result<Message> {
    BinaryCodec::decode(bytes)
}

//! Codec module - encoding/decoding for [`Message`](crate::Message).
//!
//! - [`BinaryCodec`] - Compact tag-delimited binary format (the wire format)
//! - [`JsonCodec`] - Plain-object view as JSON, keyed by field name
//!
//! # Design
//!
//! Codecs are marker structs with static methods rather than trait objects.
//! The binary codec is built on the varint and tag primitives in
//! [`protocol`](crate::protocol).
//!
//! # Example
//!
//! ```
//! use msgwire::codec::BinaryCodec;
//! use msgwire::Message;
//!
//! let mut msg = Message::new();
//! msg.set_subject("Hi");
//!
//! let bytes = BinaryCodec::encode(&msg);
//! assert_eq!(&bytes[..], &[0x32, 0x02, b'H', b'i']);
//! assert_eq!(BinaryCodec::decode(&bytes).unwrap(), msg);
//! ```

mod binary;
mod json;

pub use binary::BinaryCodec;
pub use json::JsonCodec;

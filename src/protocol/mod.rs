//! Protocol module - varints, tags, and message framing.
//!
//! This module implements the low-level wire format the codecs build on:
//! - Tag and wire type encoding/decoding
//! - Zero-copy reader and buffered writer for tag-delimited entries
//! - Length-delimited framing for message sequences

mod delimited;
mod reader;
mod wire_format;
mod writer;

pub use delimited::{decode_delimited, encode_delimited, DelimitedBuffer};
pub use reader::WireReader;
pub use wire_format::{
    decode_varint, encode_varint_into, varint_len, Tag, WireType, DEFAULT_MAX_MESSAGE_SIZE,
    MAX_FIELD_NUMBER, MAX_GROUP_DEPTH, MAX_VARINT_LEN,
};
pub use writer::{put_varint, WireWriter};

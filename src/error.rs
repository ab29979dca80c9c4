//! Error types for msgwire.

use thiserror::Error;

/// Main error type for all msgwire operations.
#[derive(Debug, Error)]
pub enum WireError {
    /// The byte stream is not a valid encoding.
    ///
    /// `offset` is the position in the input where decoding stopped.
    #[error("Malformed input at byte {offset}: {kind}")]
    MalformedInput { offset: usize, kind: Malformed },

    /// Delimited message declares a size above the configured maximum.
    #[error("Message size {size} exceeds maximum {max}")]
    MessageTooLarge { size: u64, max: usize },

    /// I/O error while reading or writing a message stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error (object view only).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WireError {
    /// Shorthand for building a [`WireError::MalformedInput`].
    #[inline]
    pub fn malformed(offset: usize, kind: Malformed) -> Self {
        WireError::MalformedInput { offset, kind }
    }

    /// Check if this error came from corrupt or truncated input.
    pub fn is_malformed(&self) -> bool {
        matches!(self, WireError::MalformedInput { .. })
    }

    /// Move a [`WireError::MalformedInput`] offset forward by `base` bytes.
    ///
    /// Used when the failing bytes were decoded out of a larger input. Other
    /// variants are returned unchanged.
    pub fn offset_by(self, base: usize) -> Self {
        match self {
            WireError::MalformedInput { offset, kind } => WireError::MalformedInput {
                offset: offset + base,
                kind,
            },
            other => other,
        }
    }

    /// The malformation kind, if this is a [`WireError::MalformedInput`].
    pub fn malformed_kind(&self) -> Option<Malformed> {
        match self {
            WireError::MalformedInput { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// What exactly was wrong with a malformed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Malformed {
    /// Input ended inside a varint.
    #[error("truncated varint")]
    TruncatedVarint,

    /// Varint longer than 10 bytes or overflowing 64 bits.
    #[error("varint overflows 64 bits")]
    VarintOverflow,

    /// Declared payload length runs past the end of the input.
    #[error("declared length {declared} exceeds remaining {remaining} bytes")]
    LengthOverrun { declared: u64, remaining: usize },

    /// Field number 0 or above the 29-bit limit.
    #[error("invalid field number {0}")]
    InvalidFieldNumber(u64),

    /// Wire type 6 or 7.
    #[error("invalid wire type {0}")]
    InvalidWireType(u8),

    /// End-group marker with no open group.
    #[error("unexpected end-group marker")]
    UnexpectedEndGroup,

    /// End-group marker closing a different field number.
    #[error("end-group for field {found} does not match open group {expected}")]
    MismatchedEndGroup { expected: u32, found: u32 },

    /// Input ended inside a group.
    #[error("unterminated group")]
    UnterminatedGroup,

    /// Groups nested deeper than the reader allows.
    #[error("group nesting too deep")]
    GroupTooDeep,

    /// Stream ended in the middle of a delimited message.
    #[error("unexpected end of stream inside a message")]
    UnexpectedEof,

    /// Text field payload is not valid UTF-8.
    #[error("invalid UTF-8 in text field")]
    InvalidUtf8,
}

/// Result type alias using WireError.
pub type Result<T> = std::result::Result<T, WireError>;

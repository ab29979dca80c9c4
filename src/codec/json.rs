//! JSON object view of a [`Message`] using `serde_json`.
//!
//! Keys follow the lowercase object naming (`userid`, `notificationid`,
//! `parentid`). Missing keys decode to the empty default, so partial objects
//! are accepted.
//!
//! # Example
//!
//! ```
//! use msgwire::codec::JsonCodec;
//! use msgwire::Message;
//!
//! let mut msg = Message::new();
//! msg.set_user_id("u1");
//!
//! let json = JsonCodec::encode(&msg).unwrap();
//! assert!(json.contains("\"userid\":\"u1\""));
//! assert_eq!(JsonCodec::decode(&json).unwrap(), msg);
//! ```

use serde_json::{Map, Value};

use crate::error::Result;
use crate::message::{Field, Message};

/// JSON codec for the plain-object view.
pub struct JsonCodec;

impl JsonCodec {
    /// Encode a message as a JSON object string.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    #[inline]
    pub fn encode(message: &Message) -> Result<String> {
        Ok(serde_json::to_string(message)?)
    }

    /// Decode a message from a JSON object string.
    ///
    /// # Errors
    ///
    /// Returns error on invalid JSON or non-string field values.
    #[inline]
    pub fn decode(json: &str) -> Result<Message> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the object view as a `serde_json::Value`.
    pub fn to_value(message: &Message) -> Value {
        let map: Map<String, Value> = Field::ALL
            .into_iter()
            .map(|field| {
                (
                    field.name().to_string(),
                    Value::String(message.get(field).to_string()),
                )
            })
            .collect();
        Value::Object(map)
    }

    /// Read a message back from an object view.
    ///
    /// # Errors
    ///
    /// Returns error if `value` is not an object of strings.
    #[inline]
    pub fn from_value(value: Value) -> Result<Message> {
        Ok(serde_json::from_value(value)?)
    }
}

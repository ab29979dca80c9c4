//! The message record: eight text fields, empty by default.
//!
//! # Example
//!
//! ```
//! use msgwire::Message;
//!
//! let mut msg = Message::new();
//! msg.set_id("m1");
//! msg.set_subject("Hi");
//!
//! let bytes = msg.encode();
//! let decoded = Message::decode(&bytes).unwrap();
//! assert_eq!(decoded.subject(), "Hi");
//! assert_eq!(decoded.email(), "");
//! ```

use std::fmt;

use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::codec::{BinaryCodec, JsonCodec};
use crate::error::Result;

/// Field identifiers, in ascending wire tag order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum Field {
    /// Record identifier.
    Id = 1,
    /// Owning user identifier.
    UserId = 2,
    /// Associated notification identifier.
    NotificationId = 3,
    /// Contact email.
    Email = 4,
    /// Contact phone.
    Phone = 5,
    /// Short title or summary.
    Subject = 6,
    /// Body text.
    Message = 7,
    /// Parent record, for threading.
    ParentId = 8,
}

impl Field {
    /// All fields, sorted by tag.
    pub const ALL: [Field; 8] = [
        Field::Id,
        Field::UserId,
        Field::NotificationId,
        Field::Email,
        Field::Phone,
        Field::Subject,
        Field::Message,
        Field::ParentId,
    ];

    /// Wire tag (field number).
    #[inline]
    pub fn tag(self) -> u32 {
        self as u32
    }

    /// Look up a field by wire tag.
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            1 => Some(Field::Id),
            2 => Some(Field::UserId),
            3 => Some(Field::NotificationId),
            4 => Some(Field::Email),
            5 => Some(Field::Phone),
            6 => Some(Field::Subject),
            7 => Some(Field::Message),
            8 => Some(Field::ParentId),
            _ => None,
        }
    }

    /// Key used in the object view.
    pub fn name(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::UserId => "userid",
            Field::NotificationId => "notificationid",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Subject => "subject",
            Field::Message => "message",
            Field::ParentId => "parentid",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A notification message record.
///
/// Every field is plain text; the empty string means "unset" and is never
/// written to the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    id: String,
    #[serde(rename = "userid")]
    user_id: String,
    #[serde(rename = "notificationid")]
    notification_id: String,
    email: String,
    phone: String,
    subject: String,
    message: String,
    #[serde(rename = "parentid")]
    parent_id: String,
}

impl Message {
    /// Create a message with every field empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record identifier.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Set the record identifier.
    #[inline]
    pub fn set_id(&mut self, value: impl Into<String>) {
        self.id = value.into();
    }

    /// Owning user identifier.
    #[inline]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Set the owning user identifier.
    #[inline]
    pub fn set_user_id(&mut self, value: impl Into<String>) {
        self.user_id = value.into();
    }

    /// Associated notification identifier.
    #[inline]
    pub fn notification_id(&self) -> &str {
        &self.notification_id
    }

    /// Set the associated notification identifier.
    #[inline]
    pub fn set_notification_id(&mut self, value: impl Into<String>) {
        self.notification_id = value.into();
    }

    /// Contact email.
    #[inline]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Set the contact email.
    #[inline]
    pub fn set_email(&mut self, value: impl Into<String>) {
        self.email = value.into();
    }

    /// Contact phone.
    #[inline]
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Set the contact phone.
    #[inline]
    pub fn set_phone(&mut self, value: impl Into<String>) {
        self.phone = value.into();
    }

    /// Short title.
    #[inline]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Set the short title.
    #[inline]
    pub fn set_subject(&mut self, value: impl Into<String>) {
        self.subject = value.into();
    }

    /// Body text.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Set the body text.
    #[inline]
    pub fn set_message(&mut self, value: impl Into<String>) {
        self.message = value.into();
    }

    /// Parent record identifier, for threading.
    #[inline]
    pub fn parent_id(&self) -> &str {
        &self.parent_id
    }

    /// Set the parent record identifier.
    #[inline]
    pub fn set_parent_id(&mut self, value: impl Into<String>) {
        self.parent_id = value.into();
    }

    /// Read a field by identifier.
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Id => &self.id,
            Field::UserId => &self.user_id,
            Field::NotificationId => &self.notification_id,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
            Field::Subject => &self.subject,
            Field::Message => &self.message,
            Field::ParentId => &self.parent_id,
        }
    }

    /// Overwrite a field by identifier.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.slot_mut(field) = value.into();
    }

    /// Reset a field to empty.
    pub fn clear(&mut self, field: Field) {
        self.slot_mut(field).clear();
    }

    fn slot_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Id => &mut self.id,
            Field::UserId => &mut self.user_id,
            Field::NotificationId => &mut self.notification_id,
            Field::Email => &mut self.email,
            Field::Phone => &mut self.phone,
            Field::Subject => &mut self.subject,
            Field::Message => &mut self.message,
            Field::ParentId => &mut self.parent_id,
        }
    }

    /// Fields holding a non-empty value, in tag order.
    pub fn set_fields(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        Field::ALL
            .into_iter()
            .map(move |field| (field, self.get(field)))
            .filter(|(_, value)| !value.is_empty())
    }

    /// Check if every field is at its default.
    pub fn is_empty(&self) -> bool {
        self.set_fields().next().is_none()
    }

    /// Encode to the binary wire format.
    #[inline]
    pub fn encode(&self) -> Bytes {
        BinaryCodec::encode(self)
    }

    /// Append the binary encoding to `buf`.
    #[inline]
    pub fn encode_to(&self, buf: &mut BytesMut) {
        BinaryCodec::encode_to(self, buf)
    }

    /// Exact size of [`Message::encode`]'s output.
    #[inline]
    pub fn encoded_len(&self) -> usize {
        BinaryCodec::encoded_len(self)
    }

    /// Decode from the binary wire format.
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` on truncated or corrupt input.
    #[inline]
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        BinaryCodec::decode(bytes)
    }

    /// Plain-object view: every field keyed by name, defaults included.
    pub fn to_object(&self) -> serde_json::Value {
        JsonCodec::to_value(self)
    }
}

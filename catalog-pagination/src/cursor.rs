//! Opaque cursors.
//!
//! A cursor carries the ordering-key tuple of one record. It is a
//! base64 (URL-safe, unpadded) encoding of a small JSON envelope:
//!
//! ```text
//! {"v":1,"k":[{"text":"Podcast A"},{"uuid":"67e55044-10b1-426f-9247-bb680e5fe0c8"}]}
//! ```
//!
//! Each value keeps its type tag, so a decoded key compares exactly like the
//! record it was taken from.

use std::fmt;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PaginationError, PaginationResult};

const CURSOR_VERSION: u8 = 1;

/// A typed value of one ordering field.
///
/// Values of different kinds order by kind first (in declaration order), so
/// a field always compares with the semantics of its own type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

/// The type of a non-null [`KeyValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Bool,
    Int,
    Text,
    Uuid,
    Timestamp,
}

impl KeyValue {
    /// The kind of this value, `None` for [`KeyValue::Null`].
    pub fn kind(&self) -> Option<KeyKind> {
        match self {
            KeyValue::Null => None,
            KeyValue::Bool(_) => Some(KeyKind::Bool),
            KeyValue::Int(_) => Some(KeyKind::Int),
            KeyValue::Text(_) => Some(KeyKind::Text),
            KeyValue::Uuid(_) => Some(KeyKind::Uuid),
            KeyValue::Timestamp(_) => Some(KeyKind::Timestamp),
        }
    }
}

impl From<bool> for KeyValue {
    fn from(value: bool) -> Self {
        KeyValue::Bool(value)
    }
}

impl From<i32> for KeyValue {
    fn from(value: i32) -> Self {
        KeyValue::Int(value.into())
    }
}

impl From<i64> for KeyValue {
    fn from(value: i64) -> Self {
        KeyValue::Int(value)
    }
}

impl From<&str> for KeyValue {
    fn from(value: &str) -> Self {
        KeyValue::Text(value.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(value: String) -> Self {
        KeyValue::Text(value)
    }
}

impl From<Uuid> for KeyValue {
    fn from(value: Uuid) -> Self {
        KeyValue::Uuid(value)
    }
}

impl From<DateTime<Utc>> for KeyValue {
    fn from(value: DateTime<Utc>) -> Self {
        KeyValue::Timestamp(value)
    }
}

impl<T: Into<KeyValue>> From<Option<T>> for KeyValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(KeyValue::Null, Into::into)
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    v: u8,
    k: &'a [KeyValue],
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Envelope {
    v: u8,
    k: Vec<KeyValue>,
}

/// Opaque pagination cursor.
///
/// Safe to put in a response body and to accept back as a request argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Encode an ordering-key tuple.
    pub fn encode(key: &[KeyValue]) -> Self {
        let json = serde_json::to_vec(&EnvelopeRef {
            v: CURSOR_VERSION,
            k: key,
        })
        .unwrap_or_default();

        Self(URL_SAFE_NO_PAD.encode(json))
    }

    /// Decode the ordering-key tuple carried by this cursor.
    pub fn decode(&self) -> PaginationResult<Vec<KeyValue>> {
        let bytes = URL_SAFE_NO_PAD
            .decode(&self.0)
            .map_err(|_| PaginationError::MalformedCursor(self.0.clone()))?;

        let envelope: Envelope = serde_json::from_slice(&bytes)
            .map_err(|_| PaginationError::MalformedCursor(self.0.clone()))?;

        if envelope.v != CURSOR_VERSION {
            return Err(PaginationError::MalformedCursor(format!(
                "{} (unsupported version {})",
                self.0, envelope.v
            )));
        }

        Ok(envelope.k)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Cursor {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Cursor {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for Cursor {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

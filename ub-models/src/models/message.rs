//! Chat message entity as stored in the `messages` document collection.

use std::cmp::Ordering;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use ub_core::constants::wire;

/// Content kind of a message. The wire values are the backend's.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageType {
    #[default]
    Text,
    Image,
    /// Any other value; rendered as text.
    Other(String),
}

impl MessageType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => wire::TYPE_TEXT,
            Self::Image => wire::TYPE_IMAGE,
            Self::Other(raw) => raw,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image)
    }
}

impl From<String> for MessageType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            wire::TYPE_TEXT => Self::Text,
            wire::TYPE_IMAGE => Self::Image,
            _ => Self::Other(raw),
        }
    }
}

impl From<MessageType> for String {
    fn from(t: MessageType) -> Self {
        t.as_str().to_string()
    }
}

/// Which side of the conversation a message is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessagePosition {
    Left,
    #[default]
    Right,
}

impl From<String> for MessagePosition {
    fn from(raw: String) -> Self {
        if raw.eq_ignore_ascii_case(wire::POSITION_LEFT) {
            Self::Left
        } else {
            Self::Right
        }
    }
}

impl From<MessagePosition> for String {
    fn from(p: MessagePosition) -> Self {
        match p {
            MessagePosition::Left => wire::POSITION_LEFT.to_string(),
            MessagePosition::Right => wire::POSITION_RIGHT.to_string(),
        }
    }
}

/// Message timestamp in any of the shapes the document store and REST
/// backend produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageTimestamp {
    /// Epoch milliseconds.
    Millis(i64),
    /// Document-store timestamp object.
    Seconds {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(default, alias = "_nanoseconds", alias = "nanoseconds")]
        nanos: i64,
    },
    /// RFC 3339 or any other textual representation.
    Text(String),
}

impl Default for MessageTimestamp {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl MessageTimestamp {
    /// Current time as epoch milliseconds.
    pub fn now() -> Self {
        Self::Millis(Utc::now().timestamp_millis())
    }

    /// Parsed instant, if the value is understandable.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Millis(ms) => Utc.timestamp_millis_opt(*ms).single(),
            Self::Seconds { seconds, nanos } => {
                let nanos = u32::try_from(*nanos).unwrap_or(0);
                Utc.timestamp_opt(*seconds, nanos).single()
            }
            Self::Text(raw) => DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }

    fn raw(&self) -> String {
        match self {
            Self::Text(raw) => raw.clone(),
            Self::Millis(ms) => ms.to_string(),
            Self::Seconds { seconds, nanos } => format!("{seconds}.{nanos:09}"),
        }
    }

    /// Ascending order by instant; values that cannot be parsed fall back to
    /// their raw text and sort after parsed ones.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self.instant(), other.instant()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.raw().cmp(&other.raw()),
        }
    }
}

impl std::fmt::Display for MessageTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.instant() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            None => write!(f, "{}", self.raw()),
        }
    }
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Message {
    /// Document id; assigned from the document, not its body.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub sender: String,
    /// Text body, or the image URL for image messages.
    #[serde(default)]
    pub data: String,
    #[serde(default, rename = "chatId")]
    pub chat_id: String,
    #[serde(default)]
    pub timestamp: MessageTimestamp,
    #[serde(default, rename = "type")]
    pub message_type: MessageType,
    #[serde(default)]
    pub position: MessagePosition,
}

impl Message {
    /// Decode a document body and attach its id.
    pub fn from_document(id: &str, fields: &serde_json::Value) -> Result<Self, serde_json::Error> {
        let mut message: Message = serde_json::from_value(fields.clone())?;
        message.id = id.to_string();
        Ok(message)
    }

    pub fn is_from(&self, identity: &str) -> bool {
        self.sender == identity
    }
}

/// Sort messages ascending by timestamp, stable for equal instants.
pub fn sort_by_timestamp(messages: &mut [Message]) {
    messages.sort_by(|a, b| a.timestamp.compare(&b.timestamp));
}

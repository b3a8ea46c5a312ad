//! Snapshot types delivered by live queries.

use serde::{Deserialize, Serialize};

use ub_core::constants::wire;
use ub_core::error::UbResult;
use ub_models::MessageTimestamp;

/// One document of the remote collection: its id and raw field map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: serde_json::Value,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// The `chatId` field, if it is a string.
    pub fn chat_id(&self) -> Option<&str> {
        self.fields.get("chatId").and_then(|v| v.as_str())
    }

    /// The `timestamp` field; unreadable values sort last.
    pub fn timestamp(&self) -> MessageTimestamp {
        self.fields
            .get("timestamp")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }
}

/// Every notification is either the full result set or a terminal error.
pub type Snapshot = UbResult<Vec<Document>>;

/// The one query shape the app issues: messages of a chat, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageQuery {
    pub collection: String,
    pub chat_id: String,
    pub order_by: String,
}

impl MessageQuery {
    pub fn for_chat(chat_id: impl Into<String>) -> Self {
        Self {
            collection: wire::MESSAGES_COLLECTION.to_string(),
            chat_id: chat_id.into(),
            order_by: "timestamp".to_string(),
        }
    }

    /// Whether a document belongs to the result set.
    pub fn matches(&self, doc: &Document) -> bool {
        doc.chat_id() == Some(self.chat_id.as_str())
    }

    /// Filter and order documents the way the live query does.
    pub fn apply<'a>(&self, docs: impl IntoIterator<Item = &'a Document>) -> Vec<Document> {
        let mut out: Vec<Document> = docs
            .into_iter()
            .filter(|d| self.matches(d))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.timestamp().compare(&b.timestamp()));
        out
    }
}

/// Lifecycle of a message subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubscriptionState {
    /// No chat opened yet.
    #[default]
    Idle,
    /// Listener registered, first snapshot pending.
    Loading,
    /// Receiving snapshots.
    Live,
    /// The source reported an error; no further snapshots arrive.
    Failed,
    /// Released by the owner.
    Closed,
}

impl std::fmt::Display for SubscriptionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading => write!(f, "loading"),
            Self::Live => write!(f, "live"),
            Self::Failed => write!(f, "failed"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_filters_and_orders() {
        let docs = vec![
            Document::new("m3", json!({"chatId": "c1", "timestamp": "2024-05-01T10:02:00Z"})),
            Document::new("x1", json!({"chatId": "c2", "timestamp": "2024-05-01T10:00:00Z"})),
            Document::new("m1", json!({"chatId": "c1", "timestamp": "2024-05-01T10:00:00Z"})),
            Document::new("m2", json!({"chatId": "c1", "timestamp": 1_714_557_660_000i64})),
            Document::new("nochat", json!({"timestamp": "2024-05-01T09:00:00Z"})),
        ];
        let result = MessageQuery::for_chat("c1").apply(&docs);
        let ids: Vec<_> = result.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["m1", "m2", "m3"]);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(SubscriptionState::Live.to_string(), "live");
        assert_eq!(SubscriptionState::default(), SubscriptionState::Idle);
    }
}

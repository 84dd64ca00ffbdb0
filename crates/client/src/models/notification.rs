use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::null_default;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    Comment,
    Assignment,
    #[serde(rename = "Deadline Reminder")]
    DeadlineReminder,
    Update,
    /// Any type this client does not know yet.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: uuid::Uuid,
    pub recipient: i64,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    #[serde(default, deserialize_with = "null_default")]
    pub message: String,
    /// Free-form bag; ids arrive as strings or numbers depending on the sender.
    #[serde(default)]
    pub meta: Value,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Reads an id-like entry of `meta` as text.
    pub fn meta_id(&self, key: &str) -> Option<String> {
        match self.meta.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

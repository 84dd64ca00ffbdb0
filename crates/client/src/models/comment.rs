use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::user::UserCompact;

/// The parent of a reply, embedded one level deep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentPreview {
    pub id: Uuid,
    pub text: String,
    pub created_by: UserCompact,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub edited_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub task: Uuid,
    #[serde(default)]
    pub parent: Option<ParentPreview>,
    pub text: String,
    pub created_by: UserCompact,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub edited_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_deleted: bool,
    /// Set by the backend when the requesting user wrote the comment.
    #[serde(default, rename = "self")]
    pub own: bool,
    #[serde(default)]
    pub meta: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewComment {
    pub task: Uuid,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Uuid>,
}

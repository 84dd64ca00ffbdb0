use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Backend returned {status}: {}", summarize(.status, .body))]
    Api { status: StatusCode, body: Value },
    #[error("Session expired, please sign in again")]
    SessionExpired,
    #[error("{0}")]
    Validation(String),
    #[error("Session storage error: {0}")]
    Storage(#[from] sqlx::Error),
    #[error("Session storage migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid access token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// Builds an API error from a raw response body. Non-JSON bodies are kept as a string.
    pub fn api(status: StatusCode, text: &str) -> Self {
        let body = serde_json::from_str(text).unwrap_or_else(|_| {
            if text.trim().is_empty() {
                Value::Null
            } else {
                Value::String(text.trim().to_string())
            }
        });
        Self::Api { status, body }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::SessionExpired) || self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Api { body, .. } => Some(body),
            _ => None,
        }
    }

    /// First message found under any of `keys`, in order. Field errors arrive either as a
    /// string or as a list of strings.
    pub fn field_message(&self, keys: &[&str]) -> Option<String> {
        let body = self.body()?;
        keys.iter().find_map(|key| value_message(body.get(*key)?))
    }

    /// Human readable message for a notice.
    pub fn message(&self) -> String {
        match self {
            Self::Api { status, body } => summarize(status, body),
            other => other.to_string(),
        }
    }
}

fn value_message(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(value_message),
        _ => None,
    }
}

fn summarize(status: &StatusCode, body: &Value) -> String {
    let from_body = match body {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(map) => ["detail", "message", "error", "non_field_errors"]
            .iter()
            .find_map(|key| map.get(*key).and_then(value_message))
            .or_else(|| {
                map.iter()
                    .find_map(|(field, v)| value_message(v).map(|m| format!("{field}: {m}")))
            }),
        _ => None,
    };

    from_body.unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    })
}

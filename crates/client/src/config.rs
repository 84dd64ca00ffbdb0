use std::{env, time::Duration};

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: String,
    pub session_db_url: String,
    pub comment_poll_interval: Duration,
    pub notification_poll_interval: Duration,
    pub search_debounce: Duration,
    pub http_timeout: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            api_url: env::var("TASKDESK_API_URL")
                .unwrap_or_else(|_| "http://localhost:8000/api".to_string()),
            session_db_url: env::var("TASKDESK_SESSION_DB")
                .unwrap_or_else(|_| "sqlite:./data/session.db?mode=rwc".to_string()),
            comment_poll_interval: Duration::from_secs(env_u64("TASKDESK_COMMENT_POLL_SECS", 8)),
            notification_poll_interval: Duration::from_secs(env_u64(
                "TASKDESK_NOTIFICATION_POLL_SECS",
                10,
            )),
            search_debounce: Duration::from_millis(env_u64("TASKDESK_SEARCH_DEBOUNCE_MS", 300)),
            http_timeout: Duration::from_secs(env_u64("TASKDESK_HTTP_TIMEOUT_SECS", 30)),
        }
    }

    /// Same defaults as `from_env`, pointed at `api_url` with an in-memory session.
    pub fn for_api(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            session_db_url: "sqlite::memory:".to_string(),
            comment_poll_interval: Duration::from_secs(8),
            notification_poll_interval: Duration::from_secs(10),
            search_debounce: Duration::from_millis(300),
            http_timeout: Duration::from_secs(30),
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

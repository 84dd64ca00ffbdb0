use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use futures::FutureExt;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{lock, Busy, Notices};
use crate::{
    error::{ClientError, Result},
    models::{Comment, NewComment},
    polling::PollHandle,
    services::CommentService,
};

/// Distance from the bottom, in rows, that still counts as "at the bottom".
pub const AT_BOTTOM_THRESHOLD: u32 = 48;

#[derive(Debug)]
struct ThreadState {
    text: String,
    reply_to: Option<Uuid>,
    at_bottom: bool,
    force_scroll: bool,
}

/// The comment popup for one task.
pub struct CommentThread {
    service: CommentService,
    task_id: Uuid,
    comments: RwLock<Vec<Comment>>,
    state: Mutex<ThreadState>,
    posting: Busy,
    pub notices: Notices,
}

impl CommentThread {
    pub fn new(service: CommentService, task_id: Uuid) -> Arc<Self> {
        Arc::new(Self {
            service,
            task_id,
            comments: RwLock::new(Vec::new()),
            state: Mutex::new(ThreadState {
                text: String::new(),
                reply_to: None,
                at_bottom: true,
                force_scroll: false,
            }),
            posting: Busy::default(),
            notices: Notices::default(),
        })
    }

    pub fn task_id(&self) -> Uuid {
        self.task_id
    }

    /// Loads the thread and keeps it fresh every `period` until the handle is dropped.
    pub async fn mount(self: &Arc<Self>, period: Duration) -> PollHandle {
        if let Err(e) = self.load().await {
            tracing::warn!(task_id = %self.task_id, "Failed to load comments: {}", e);
        }
        let thread = Arc::clone(self);
        PollHandle::spawn("comments", period, move || {
            let thread = thread.clone();
            async move { thread.load().await }.boxed()
        })
    }

    /// Replaces the list with the backend's copy.
    pub async fn load(&self) -> Result<()> {
        let fetched = self.service.list(self.task_id).await?;
        *self.comments.write().await = fetched;
        Ok(())
    }

    pub async fn comments(&self) -> Vec<Comment> {
        self.comments.read().await.clone()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        lock(&self.state).text = text.into();
    }

    pub fn text(&self) -> String {
        lock(&self.state).text.clone()
    }

    pub fn reply_to(&self, parent: Uuid) {
        lock(&self.state).reply_to = Some(parent);
    }

    pub fn cancel_reply(&self) {
        lock(&self.state).reply_to = None;
    }

    pub fn replying_to(&self) -> Option<Uuid> {
        lock(&self.state).reply_to
    }

    /// Records the viewport position after a scroll.
    pub fn on_scroll(&self, scroll_height: u32, scroll_top: u32, client_height: u32) {
        let remaining = scroll_height.saturating_sub(scroll_top.saturating_add(client_height));
        lock(&self.state).at_bottom = remaining <= AT_BOTTOM_THRESHOLD;
    }

    pub fn is_at_bottom(&self) -> bool {
        lock(&self.state).at_bottom
    }

    /// Whether the view should jump to the newest comment after the list changed: the
    /// viewer was already at the bottom, or just posted or deleted. Consumes the latter.
    pub fn take_scroll_request(&self) -> bool {
        let mut state = lock(&self.state);
        let scroll = state.at_bottom || state.force_scroll;
        state.force_scroll = false;
        scroll
    }

    /// Posts the typed text, as a reply when a target is set. On success the input and
    /// reply target are cleared unless the user kept typing meanwhile; on failure the text
    /// stays as typed.
    pub async fn post(&self) -> Result<()> {
        let (typed, parent) = {
            let state = lock(&self.state);
            (state.text.clone(), state.reply_to)
        };
        let text = typed.trim().to_string();
        if text.is_empty() {
            self.notices.error("Comment cannot be empty");
            return Err(ClientError::Validation("Comment cannot be empty".to_string()));
        }
        let _busy = self.posting.acquire("Posting")?;

        let comment = NewComment {
            task: self.task_id,
            text,
            parent,
        };
        if let Err(e) = self.service.post(&comment).await {
            self.notices.error(
                e.field_message(&["detail", "message"])
                    .unwrap_or_else(|| "Failed to post comment".to_string()),
            );
            return Err(e);
        }

        lock(&self.state).force_scroll = true;
        if let Err(e) = self.load().await {
            tracing::warn!(task_id = %self.task_id, "Reload after post failed: {}", e);
        }
        {
            let mut state = lock(&self.state);
            if state.text == typed {
                state.text.clear();
            }
            if state.reply_to == parent {
                state.reply_to = None;
            }
        }
        self.notices.success("Comment posted");
        Ok(())
    }

    /// Rewrites one of the user's own comments, then refreshes the thread.
    pub async fn edit(&self, id: Uuid, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            self.notices.error("Comment cannot be empty");
            return Err(ClientError::Validation("Comment cannot be empty".to_string()));
        }
        if let Err(e) = self.service.edit(id, text).await {
            self.notices.error(
                e.field_message(&["detail", "text"])
                    .unwrap_or_else(|| "Failed to edit comment".to_string()),
            );
            return Err(e);
        }
        if let Err(e) = self.load().await {
            tracing::warn!(task_id = %self.task_id, "Reload after edit failed: {}", e);
        }
        self.notices.success("Comment updated");
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if let Err(e) = self.service.delete(id).await {
            self.notices.error("Failed to delete comment");
            return Err(e);
        }
        lock(&self.state).force_scroll = true;
        if let Err(e) = self.load().await {
            tracing::warn!(task_id = %self.task_id, "Reload after delete failed: {}", e);
        }
        self.notices.success("Comment deleted");
        Ok(())
    }

    pub fn is_posting(&self) -> bool {
        self.posting.is_busy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ClientConfig,
        http::ApiClient,
        session::{MemoryStorage, SessionContext},
    };

    async fn thread() -> Arc<CommentThread> {
        let session = SessionContext::load(Arc::new(MemoryStorage::new()))
            .await
            .unwrap();
        let config = ClientConfig::for_api("http://127.0.0.1:9/api/");
        let api = ApiClient::new(&config, session).unwrap();
        CommentThread::new(CommentService::new(api), Uuid::nil())
    }

    #[tokio::test]
    async fn scroll_extremes_do_not_overflow() {
        let thread = thread().await;
        thread.on_scroll(u32::MAX, u32::MAX, u32::MAX);
        assert!(thread.is_at_bottom());
        thread.on_scroll(u32::MAX, 0, 10);
        assert!(!thread.is_at_bottom());
    }
}

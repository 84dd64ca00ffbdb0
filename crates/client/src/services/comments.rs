use serde_json::json;
use uuid::Uuid;

use super::decode_list;
use crate::{
    error::Result,
    http::ApiClient,
    models::{Comment, NewComment},
};

#[derive(Clone)]
pub struct CommentService {
    api: ApiClient,
}

impl CommentService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, task_id: Uuid) -> Result<Vec<Comment>> {
        let value = self
            .api
            .get_query("/comments/", &[("task_id", task_id.to_string())])
            .await?;
        decode_list(value)
    }

    pub async fn post(&self, comment: &NewComment) -> Result<Comment> {
        self.api.post("/comments/", comment).await
    }

    pub async fn edit(&self, id: Uuid, text: &str) -> Result<Comment> {
        self.api
            .patch(&format!("/comments/{id}/"), &json!({ "text": text }))
            .await
    }

    /// Soft delete; the backend keeps the row with `is_deleted` set.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.api.delete(&format!("/comments/{id}/")).await?;
        Ok(())
    }
}

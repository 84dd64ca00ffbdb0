use uuid::Uuid;

use super::decode_list;
use crate::{error::Result, http::ApiClient, models::Notification};

#[derive(Clone)]
pub struct NotificationService {
    api: ApiClient,
}

impl NotificationService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<Notification>> {
        decode_list(self.api.get("/tasks/notifications/").await?)
    }

    pub async fn mark_read(&self, id: Uuid) -> Result<()> {
        let _: serde_json::Value = self
            .api
            .post_empty(&format!("/tasks/notifications/{id}/mark-read/"))
            .await?;
        Ok(())
    }

    pub async fn mark_all_read(&self) -> Result<()> {
        let _: serde_json::Value = self
            .api
            .post_empty("/tasks/notifications/mark-all-read/")
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.api
            .delete(&format!("/tasks/notifications/{id}/"))
            .await?;
        Ok(())
    }
}

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use super::decode_list;
use crate::{
    error::{ClientError, Result},
    http::{ApiClient, Attachment, FormData},
    models::{Priority, Task, TaskStatus, UserCompact},
};

/// Body for task create and full update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPayload {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: TaskStatus,
    pub due_date: DateTime<Utc>,
    /// Only sent on update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    pub assignees: Vec<i64>,
}

impl TaskPayload {
    /// Multipart variant used when files ride along. Each assignee is its own field so the
    /// backend can read them as a list.
    pub fn to_form(&self, files: &[Attachment]) -> FormData {
        let mut form = FormData::new()
            .text("title", self.title.clone())
            .text("description", self.description.clone())
            .text("priority", self.priority.as_str())
            .text("status", self.status.as_str())
            .text(
                "due_date",
                self.due_date.to_rfc3339_opts(SecondsFormat::Millis, true),
            );
        if let Some(progress) = self.progress {
            form = form.text("progress", progress.to_string());
        }
        for id in &self.assignees {
            form = form.text("assignees", id.to_string());
        }
        for file in files {
            form = form.file("files", file.clone());
        }
        form
    }
}

#[derive(Clone)]
pub struct TaskService {
    api: ApiClient,
}

impl TaskService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<Task>> {
        decode_list(self.api.get("/tasks/").await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Task> {
        self.api.get(&format!("/tasks/{id}/")).await
    }

    pub async fn create(&self, payload: &TaskPayload, files: &[Attachment]) -> Result<Value> {
        if files.is_empty() {
            self.api.post("/tasks/", payload).await
        } else {
            self.api.post_form("/tasks/", payload.to_form(files)).await
        }
    }

    pub async fn update(
        &self,
        id: Uuid,
        payload: &TaskPayload,
        files: &[Attachment],
    ) -> Result<Task> {
        let path = format!("/tasks/{id}/");
        if files.is_empty() {
            self.api.put(&path, payload).await
        } else {
            self.api.put_form(&path, payload.to_form(files)).await
        }
    }

    /// Partial update with whatever fields `changes` carries.
    pub async fn patch(&self, id: Uuid, changes: &Value) -> Result<Task> {
        self.api.patch(&format!("/tasks/{id}/"), changes).await
    }

    pub async fn mark_complete(&self, id: Uuid) -> Result<Task> {
        self.patch(
            id,
            &json!({"progress": 100, "status": TaskStatus::Completed}),
        )
        .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.api.delete(&format!("/tasks/{id}/")).await?;
        Ok(())
    }

    /// Replaces the assignee set with exactly `assignees`.
    pub async fn assign(&self, id: Uuid, assignees: &[i64]) -> Result<Value> {
        self.api
            .post(
                &format!("/tasks/{id}/assign/"),
                &json!({ "assignees": assignees }),
            )
            .await
    }

    pub async fn update_progress(&self, id: Uuid, progress: u8) -> Result<Task> {
        if progress > 100 {
            return Err(ClientError::Validation(
                "Progress must be between 0 and 100".to_string(),
            ));
        }
        self.api
            .patch(
                &format!("/tasks/{id}/update-progress/"),
                &json!({ "progress": progress }),
            )
            .await
    }

    pub async fn upload_files(&self, id: Uuid, files: &[Attachment]) -> Result<Value> {
        if files.is_empty() {
            return Err(ClientError::Validation("No files provided.".to_string()));
        }
        let form = files
            .iter()
            .fold(FormData::new(), |form, f| form.file("files", f.clone()));
        self.api
            .post_form(&format!("/tasks/{id}/upload-files/"), form)
            .await
    }

    pub async fn remove_file(&self, file_id: Uuid) -> Result<()> {
        self.api
            .delete(&format!("/tasks/remove-file/{file_id}/"))
            .await?;
        Ok(())
    }

    pub async fn my_tasks(&self) -> Result<Vec<Task>> {
        decode_list(self.api.get("/tasks/my-tasks/").await?)
    }

    /// Members a manager can assign work to.
    pub async fn list_members(&self) -> Result<Vec<UserCompact>> {
        decode_list(self.api.get("/tasks/list-members/").await?)
    }
}

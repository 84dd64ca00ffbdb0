use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::Busy;
use crate::{
    error::{ClientError, Result},
    http::Attachment,
    models::{Priority, Task, TaskStatus, UserCompact},
    services::{TaskPayload, TaskService},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(Uuid),
}

pub type FieldErrors = BTreeMap<&'static str, String>;

/// The create/edit task modal.
#[derive(Debug)]
pub struct TaskForm {
    pub mode: FormMode,
    pub title: String,
    pub description: String,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<DateTime<Utc>>,
    /// Only editable, and only sent, when editing.
    pub progress: i64,
    pub assignees: Vec<i64>,
    pub files: Vec<Attachment>,
    pub members: Vec<UserCompact>,
    busy: Busy,
}

impl TaskForm {
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            title: String::new(),
            description: String::new(),
            priority: Some(Priority::Medium),
            status: Some(TaskStatus::Pending),
            due_date: None,
            progress: 0,
            assignees: Vec::new(),
            files: Vec::new(),
            members: Vec::new(),
            busy: Busy::default(),
        }
    }

    pub fn edit(task: &Task) -> Self {
        Self {
            mode: FormMode::Edit(task.id),
            title: task.title.clone(),
            description: task.description.clone(),
            priority: Some(task.priority),
            status: Some(task.status),
            due_date: task.due_date,
            progress: i64::from(task.progress),
            assignees: task.assignee_ids(),
            ..Self::create()
        }
    }

    /// Fills the assignee picker. A failure leaves it empty.
    pub async fn load_members(&mut self, tasks: &TaskService) {
        match tasks.list_members().await {
            Ok(members) => self.members = members,
            Err(e) => tracing::warn!("Failed to load members: {}", e),
        }
    }

    pub fn toggle_assignee(&mut self, id: i64) {
        match self.assignees.iter().position(|a| *a == id) {
            Some(idx) => {
                self.assignees.remove(idx);
            }
            None => self.assignees.push(id),
        }
    }

    pub fn validate(&self) -> std::result::Result<TaskPayload, FieldErrors> {
        let mut errors = FieldErrors::new();
        let title = self.title.trim();
        if title.is_empty() {
            errors.insert("title", "Title is required".to_string());
        }
        if self.due_date.is_none() {
            errors.insert("due_date", "Due date is required".to_string());
        }
        if self.priority.is_none() {
            errors.insert("priority", "Priority is required".to_string());
        }
        if self.status.is_none() {
            errors.insert("status", "Status is required".to_string());
        }
        let editing = matches!(self.mode, FormMode::Edit(_));
        if editing && !(0..=100).contains(&self.progress) {
            errors.insert("progress", "Progress must be between 0 and 100".to_string());
        }

        match (self.priority, self.status, self.due_date) {
            (Some(priority), Some(status), Some(due_date)) if errors.is_empty() => {
                Ok(TaskPayload {
                    title: title.to_string(),
                    description: self.description.clone(),
                    priority,
                    status,
                    due_date,
                    progress: editing.then_some(self.progress as u8),
                    assignees: self.assignees.clone(),
                })
            }
            _ => Err(errors),
        }
    }

    /// Validates and sends the form. Multipart is used only when files are attached.
    pub async fn submit(&self, tasks: &TaskService) -> Result<()> {
        let payload = self.validate().map_err(|errors| {
            ClientError::Validation(
                errors
                    .values()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })?;
        let _busy = self.busy.acquire("Save")?;

        match self.mode {
            FormMode::Create => {
                tasks.create(&payload, &self.files).await?;
                tracing::info!(title = %payload.title, "Task created");
            }
            FormMode::Edit(id) => {
                tasks.update(id, &payload, &self.files).await?;
                tracing::info!(%id, "Task updated");
            }
        }
        Ok(())
    }

    pub fn is_submitting(&self) -> bool {
        self.busy.is_busy()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn new_form_defaults() {
        let form = TaskForm::create();
        assert_eq!(form.priority, Some(Priority::Medium));
        assert_eq!(form.status, Some(TaskStatus::Pending));
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors.keys().copied().collect::<Vec<_>>(),
            vec!["due_date", "title"]
        );
    }

    #[test]
    fn create_never_carries_progress() {
        let mut form = TaskForm::create();
        form.title = "  Plan sprint ".into();
        form.due_date = Some(Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap());
        form.progress = 55;
        let payload = form.validate().unwrap();
        assert_eq!(payload.title, "Plan sprint");
        assert_eq!(payload.progress, None);
    }

    #[test]
    fn edit_checks_progress_range() {
        let mut form = TaskForm::create();
        form.mode = FormMode::Edit(Uuid::new_v4());
        form.title = "x".into();
        form.due_date = Some(Utc::now());
        form.progress = 120;
        assert!(form.validate().unwrap_err().contains_key("progress"));
        form.progress = 100;
        assert_eq!(form.validate().unwrap().progress, Some(100));
    }

    #[test]
    fn toggling_assignees() {
        let mut form = TaskForm::create();
        form.toggle_assignee(3);
        form.toggle_assignee(5);
        form.toggle_assignee(3);
        assert_eq!(form.assignees, vec![5]);
    }
}

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AssignmentEditor, Notices, TaskForm};
use crate::{
    error::{ClientError, Result},
    http::Attachment,
    models::{Task, TaskStatus},
    optimistic::{commit_or_revert, OptimisticList, Settled},
    search::{counts_line, paginate, Page, TaskQuery},
    services::TaskService,
};

/// Headline numbers for the manager dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardSummary {
    pub total: usize,
    pub by_status: Vec<(TaskStatus, usize)>,
    pub overdue: usize,
}

/// The manager's task workspace.
pub struct TaskBoard {
    tasks: TaskService,
    list: RwLock<OptimisticList<Task>>,
    pub notices: Notices,
}

impl TaskBoard {
    pub fn new(tasks: TaskService) -> Self {
        Self {
            tasks,
            list: RwLock::new(OptimisticList::default()),
            notices: Notices::default(),
        }
    }

    pub async fn load(&self) -> Result<()> {
        match self.tasks.list().await {
            Ok(fetched) => {
                self.list.write().await.replace_all(fetched);
                Ok(())
            }
            Err(e) => {
                self.notices.error(format!("Failed to load tasks: {}", e.message()));
                Err(e)
            }
        }
    }

    pub async fn task(&self, id: Uuid) -> Option<Task> {
        self.list.read().await.get(&id).cloned()
    }

    /// One page of the filtered board plus the "X of Y" counts line.
    pub async fn view(&self, query: &TaskQuery, page: usize, size: usize) -> (Page<Task>, String) {
        let list = self.list.read().await;
        let filtered: Vec<Task> = query.apply(list.items()).into_iter().cloned().collect();
        let counts = counts_line(filtered.len(), list.items().len());
        (paginate(&filtered, page, size), counts)
    }

    pub async fn summary(&self, now: DateTime<Utc>) -> BoardSummary {
        let list = self.list.read().await;
        let items = list.items();
        BoardSummary {
            total: items.len(),
            by_status: TaskStatus::ALL
                .into_iter()
                .map(|status| (status, items.iter().filter(|t| t.status == status).count()))
                .collect(),
            overdue: items.iter().filter(|t| t.is_overdue(now)).count(),
        }
    }

    pub fn create_form(&self) -> TaskForm {
        TaskForm::create()
    }

    pub async fn edit_form(&self, id: Uuid) -> Result<TaskForm> {
        let task = self.require(id).await?;
        Ok(TaskForm::edit(&task))
    }

    /// Submits a create or edit form and reloads the board.
    pub async fn save(&self, form: &TaskForm) -> Result<()> {
        match form.submit(&self.tasks).await {
            Ok(()) => {
                self.notices.success("Task saved successfully");
                self.load().await
            }
            Err(e) => {
                self.notices.error(format!("Operation failed: {}", e.message()));
                Err(e)
            }
        }
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        match self.tasks.delete(id).await {
            Ok(()) => {
                self.list.write().await.remove(&id);
                self.notices.success("Task deleted");
                Ok(())
            }
            Err(e) => {
                self.notices.error(format!("Delete failed: {}", e.message()));
                Err(e)
            }
        }
    }

    pub async fn assignment_editor(&self, id: Uuid) -> Result<AssignmentEditor> {
        let task = self.require(id).await?;
        Ok(AssignmentEditor::new(self.tasks.clone(), &task))
    }

    pub async fn upload(&self, id: Uuid, files: &[Attachment]) -> Result<()> {
        if files.is_empty() {
            return Ok(());
        }
        match self.tasks.upload_files(id, files).await {
            Ok(_) => self.load().await,
            Err(e) => {
                self.notices.error(format!("Upload failed: {}", e.message()));
                Err(e)
            }
        }
    }

    pub async fn remove_file(&self, file_id: Uuid) -> Result<()> {
        match self.tasks.remove_file(file_id).await {
            Ok(()) => self.load().await,
            Err(e) => {
                self.notices.error(format!("Removing file failed: {}", e.message()));
                Err(e)
            }
        }
    }

    /// Optimistic progress edit; the backend's copy replaces the draft on success.
    pub async fn set_progress(&self, id: Uuid, progress: u8) -> Result<Settled> {
        let tasks = self.tasks.clone();
        let outcome = commit_or_revert(
            &self.list,
            &id,
            |task| task.apply_progress(progress),
            |_| async move { tasks.update_progress(id, progress).await.map(Some) },
        )
        .await;
        if let Err(e) = &outcome {
            self.notices
                .error(format!("Progress update failed: {}", e.message()));
        }
        outcome
    }

    async fn require(&self, id: Uuid) -> Result<Task> {
        self.task(id)
            .await
            .ok_or_else(|| ClientError::Validation(format!("Task {id} is not on the board")))
    }
}

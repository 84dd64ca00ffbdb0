use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::Notices;
use crate::{
    error::Result,
    models::Task,
    optimistic::{commit_or_revert, OptimisticList, Settled},
    search::MemberFilter,
    services::TaskService,
};

/// A member's own assignments with optimistic progress edits.
pub struct MyTasks {
    tasks: TaskService,
    list: Arc<RwLock<OptimisticList<Task>>>,
    pub notices: Notices,
}

impl MyTasks {
    pub fn new(tasks: TaskService) -> Self {
        Self {
            tasks,
            list: Arc::new(RwLock::new(OptimisticList::default())),
            notices: Notices::default(),
        }
    }

    pub async fn load(&self) -> Result<()> {
        match self.tasks.my_tasks().await {
            Ok(fetched) => {
                self.list.write().await.replace_all(fetched);
                Ok(())
            }
            Err(e) => {
                self.notices.error("Failed to load tasks");
                Err(e)
            }
        }
    }

    pub async fn tasks(&self) -> Vec<Task> {
        self.list.read().await.items().to_vec()
    }

    pub async fn task(&self, id: Uuid) -> Option<Task> {
        self.list.read().await.get(&id).cloned()
    }

    /// Tasks passing `filter` and the "Showing X of Y tasks" line.
    pub async fn view(&self, filter: MemberFilter) -> (Vec<Task>, String) {
        let list = self.list.read().await;
        let shown: Vec<Task> = filter.apply(list.items()).into_iter().cloned().collect();
        let line = format!("Showing {} of {} tasks", shown.len(), list.items().len());
        (shown, line)
    }

    /// Shows the new progress at once; 100 also shows the task completed. A success
    /// refetches the list, a failure puts the last confirmed state back.
    pub async fn set_progress(&self, id: Uuid, progress: u8) -> Result<Settled> {
        let tasks = self.tasks.clone();
        let outcome = commit_or_revert(
            &self.list,
            &id,
            |task| task.apply_progress(progress),
            |_| async move { tasks.update_progress(id, progress).await.map(Some) },
        )
        .await;

        match outcome {
            Ok(Settled::Applied) => {
                self.notices.success("Progress updated");
                if let Err(e) = self.load().await {
                    tracing::warn!("Reload after progress update failed: {}", e);
                }
                Ok(Settled::Applied)
            }
            Ok(settled) => Ok(settled),
            Err(e) => {
                self.notices.error(
                    e.field_message(&["detail"])
                        .unwrap_or_else(|| "Failed to update progress".to_string()),
                );
                Err(e)
            }
        }
    }

    pub async fn mark_complete(&self, id: Uuid) -> Result<Settled> {
        let tasks = self.tasks.clone();
        let outcome = commit_or_revert(
            &self.list,
            &id,
            Task::mark_complete,
            |_| async move { tasks.mark_complete(id).await.map(Some) },
        )
        .await;

        match &outcome {
            Ok(Settled::Applied) => self.notices.success("Task marked complete"),
            Ok(_) => {}
            Err(_) => self.notices.error("Failed to mark complete"),
        }
        outcome
    }
}

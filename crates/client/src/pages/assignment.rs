use uuid::Uuid;

use super::{Busy, Notices};
use crate::{
    error::Result,
    models::{Task, UserCompact},
    services::TaskService,
};

/// Local assignee set for one task. Nothing reaches the backend until [`save`], which
/// sends the complete set.
///
/// [`save`]: AssignmentEditor::save
pub struct AssignmentEditor {
    tasks: TaskService,
    task_id: Uuid,
    current: Vec<UserCompact>,
    selected: Vec<i64>,
    members: Vec<UserCompact>,
    busy: Busy,
    pub notices: Notices,
}

impl AssignmentEditor {
    pub fn new(tasks: TaskService, task: &Task) -> Self {
        Self {
            tasks,
            task_id: task.id,
            current: task
                .assigned_users
                .iter()
                .map(|a| a.assignee.clone())
                .collect(),
            selected: task.assignee_ids(),
            members: Vec::new(),
            busy: Busy::default(),
            notices: Notices::default(),
        }
    }

    pub async fn load_members(&mut self) -> Result<()> {
        match self.tasks.list_members().await {
            Ok(members) => {
                self.members = members;
                Ok(())
            }
            Err(e) => {
                self.notices.error("Failed to load members.");
                Err(e)
            }
        }
    }

    pub fn set_members(&mut self, members: Vec<UserCompact>) {
        self.members = members;
    }

    pub fn selected_ids(&self) -> &[i64] {
        &self.selected
    }

    pub fn is_selected(&self, id: i64) -> bool {
        self.selected.contains(&id)
    }

    pub fn add(&mut self, id: i64) {
        if !self.is_selected(id) {
            self.selected.push(id);
        }
    }

    pub fn remove(&mut self, id: i64) {
        self.selected.retain(|s| *s != id);
    }

    pub fn toggle(&mut self, id: i64) {
        if self.is_selected(id) {
            self.remove(id);
        } else {
            self.add(id);
        }
    }

    /// Selected users, resolved from the task's assignees first and the member list second.
    pub fn selected_users(&self) -> Vec<(i64, Option<&UserCompact>)> {
        self.selected
            .iter()
            .map(|id| {
                let user = self
                    .current
                    .iter()
                    .chain(self.members.iter())
                    .find(|u| u.id == *id);
                (*id, user)
            })
            .collect()
    }

    /// Members not yet selected whose name, username or email contains `query`.
    pub fn candidates(&self, query: &str) -> Vec<&UserCompact> {
        let needle = query.trim().to_lowercase();
        self.members
            .iter()
            .filter(|m| !self.is_selected(m.id))
            .filter(|m| m.matches(&needle))
            .collect()
    }

    pub async fn save(&self) -> Result<()> {
        let _busy = self.busy.acquire("Save")?;
        match self.tasks.assign(self.task_id, &self.selected).await {
            Ok(_) => {
                tracing::info!(task_id = %self.task_id, count = self.selected.len(), "Assignments saved");
                self.notices.success("Assignments updated.");
                Ok(())
            }
            Err(e) => {
                self.notices.error("Failed to update assignments.");
                Err(e)
            }
        }
    }

    pub fn is_saving(&self) -> bool {
        self.busy.is_busy()
    }
}

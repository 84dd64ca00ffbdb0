//! Pure filters over already-fetched lists, pagination, and a debouncer for text input.

use std::{future::Future, str::FromStr, sync::Arc, time::Duration};

use tokio::{sync::watch, task::JoinHandle};

use crate::models::{AdminUserRow, Priority, Role, Task, TaskStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub text: String,
}

impl TaskQuery {
    pub fn matches(&self, task: &Task) -> bool {
        if self.status.is_some_and(|s| s != task.status) {
            return false;
        }
        if self.priority.is_some_and(|p| p != task.priority) {
            return false;
        }
        let needle = self.text.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        task.title.to_lowercase().contains(&needle)
            || task.description.to_lowercase().contains(&needle)
            || task.assigned_users.iter().any(|a| {
                a.assignee.matches(&needle)
                    || a.assignee.display_name().to_lowercase().contains(&needle)
            })
    }

    /// Keeps the input order.
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|t| self.matches(t)).collect()
    }
}

/// The member task list's tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MemberFilter {
    #[default]
    All,
    Completed,
    InProgress,
}

impl MemberFilter {
    pub fn matches(self, task: &Task) -> bool {
        let status = task.status.as_str().to_lowercase();
        match self {
            MemberFilter::All => true,
            MemberFilter::Completed => status == "completed",
            MemberFilter::InProgress => status.contains("progress"),
        }
    }

    pub fn apply(self, tasks: &[Task]) -> Vec<&Task> {
        tasks.iter().filter(|t| self.matches(t)).collect()
    }
}

impl FromStr for MemberFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "all" => Ok(MemberFilter::All),
            "completed" => Ok(MemberFilter::Completed),
            "in_progress" | "progress" => Ok(MemberFilter::InProgress),
            other => Err(format!("unknown filter: {other}")),
        }
    }
}

/// Role filter plus free text over username, full name and email.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    pub role: Option<Role>,
    pub text: String,
}

impl UserQuery {
    pub fn matches(&self, row: &AdminUserRow) -> bool {
        if self.role.is_some_and(|r| r != row.role) {
            return false;
        }
        let needle = self.text.trim().to_lowercase();
        needle.is_empty()
            || row.username.to_lowercase().contains(&needle)
            || row.full_name().to_lowercase().contains(&needle)
            || row.email.to_lowercase().contains(&needle)
    }

    pub fn apply<'a>(&self, rows: &'a [AdminUserRow]) -> Vec<&'a AdminUserRow> {
        rows.iter().filter(|r| self.matches(r)).collect()
    }
}

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based.
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
}

/// Slices one page out of `items`. There is always at least one page, and `page` is
/// clamped into range.
pub fn paginate<T: Clone>(items: &[T], page: usize, size: usize) -> Page<T> {
    let size = size.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(size).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * size;
    let end = (start + size).min(total);

    Page {
        items: items[start.min(total)..end].to_vec(),
        page,
        total_pages,
        total,
    }
}

pub fn counts_line(shown: usize, total: usize) -> String {
    format!("{shown} of {total}")
}

/// Runs only the last scheduled job, once `delay` has passed without another call.
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn schedule<F>(&mut self, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            job.await;
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// A search box. `value` trails the keystrokes and only moves once typing pauses.
pub struct SearchInput {
    settled: Arc<watch::Sender<String>>,
    debouncer: Debouncer,
}

impl SearchInput {
    pub fn new(delay: Duration) -> Self {
        let (settled, _) = watch::channel(String::new());
        Self {
            settled: Arc::new(settled),
            debouncer: Debouncer::new(delay),
        }
    }

    pub fn input(&mut self, text: impl Into<String>) {
        let settled = self.settled.clone();
        let text = text.into();
        self.debouncer.schedule(async move {
            settled.send_if_modified(|current| {
                if *current == text {
                    return false;
                }
                *current = text;
                true
            });
        });
    }

    /// Drops a pending keystroke and settles on `text` at once.
    pub fn set_now(&mut self, text: impl Into<String>) {
        self.debouncer.cancel();
        self.settled.send_replace(text.into());
    }

    pub fn value(&self) -> String {
        self.settled.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.settled.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;

    fn task(title: &str, status: &str, priority: &str, assignee: &str) -> Task {
        serde_json::from_value(json!({
            "id": uuid::Uuid::new_v4(),
            "title": title,
            "description": format!("{title} details"),
            "priority": priority,
            "status": status,
            "assigned_users": [{
                "assignee": {"id": 1, "first_name": assignee, "username": assignee.to_lowercase(), "role": "Member"}
            }]
        }))
        .unwrap()
    }

    fn board() -> Vec<Task> {
        vec![
            task("Draft budget", "PENDING", "High", "Omar"),
            task("Review budget", "IN_PROGRESS", "Medium", "Lina"),
            task("Ship release", "COMPLETED", "High", "Omar"),
            task("Plan offsite", "IN_PROGRESS", "Low", "Sami"),
            task("Fix login", "CANCELLED", "High", "Lina"),
        ]
    }

    #[test]
    fn text_and_status_combine() {
        let tasks = board();
        let query = TaskQuery {
            status: Some(TaskStatus::InProgress),
            text: String::new(),
            ..Default::default()
        };
        let shown = query.apply(&tasks);
        assert_eq!(counts_line(shown.len(), tasks.len()), "2 of 5");

        let query = TaskQuery {
            text: "omar".into(),
            priority: Some(Priority::High),
            ..Default::default()
        };
        let titles: Vec<_> = query.apply(&tasks).iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Draft budget", "Ship release"]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let tasks = board();
        let query = TaskQuery {
            text: "budget".into(),
            ..Default::default()
        };
        let once: Vec<Task> = query.apply(&tasks).into_iter().cloned().collect();
        let twice: Vec<Task> = query.apply(&once).into_iter().cloned().collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn member_tabs() {
        let tasks = board();
        assert_eq!(MemberFilter::All.apply(&tasks).len(), 5);
        assert_eq!(MemberFilter::Completed.apply(&tasks).len(), 1);
        assert_eq!(MemberFilter::InProgress.apply(&tasks).len(), 2);
        assert_eq!("in-progress".parse::<MemberFilter>(), Ok(MemberFilter::InProgress));
    }

    #[test]
    fn pagination_bounds() {
        let items: Vec<u32> = (1..=23).collect();
        let last = paginate(&items, 9, DEFAULT_PAGE_SIZE);
        assert_eq!(last.page, 3);
        assert_eq!(last.total_pages, 3);
        assert_eq!(last.items, vec![21, 22, 23]);

        let empty = paginate::<u32>(&[], 1, DEFAULT_PAGE_SIZE);
        assert_eq!(empty.total_pages, 1);
        assert!(empty.items.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn debouncer_runs_only_the_last_job() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        for text in ["b", "bu", "bud"] {
            let seen = seen.clone();
            debouncer.schedule(async move { seen.lock().unwrap().push(text) });
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(*seen.lock().unwrap(), vec!["bud"]);
    }

    #[tokio::test(start_paused = true)]
    async fn search_input_settles_after_typing_pauses() {
        let mut search = SearchInput::new(Duration::from_millis(300));
        let mut changes = search.subscribe();

        search.input("al");
        tokio::time::sleep(Duration::from_millis(100)).await;
        search.input("alpha");
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(search.value(), "");

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(search.value(), "alpha");
        assert!(changes.has_changed().unwrap());

        search.input("beta");
        search.set_now("");
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(search.value(), "");
    }
}

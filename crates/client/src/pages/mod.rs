//! Headless view-models, one per screen. Each owns its fetched data and transient view
//! state; the CLI renders them as text.

pub mod admin_dashboard;
pub mod assignment;
pub mod comments;
pub mod member_dashboard;
pub mod my_tasks;
pub mod notifications;
pub mod profile;
pub mod registration;
pub mod statistics;
pub mod task_board;
pub mod task_form;
pub mod user_management;

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, MutexGuard,
    },
};

pub use admin_dashboard::AdminDashboardView;
pub use assignment::AssignmentEditor;
pub use comments::CommentThread;
pub use member_dashboard::MemberDashboardView;
pub use my_tasks::MyTasks;
pub use notifications::NotificationCenter;
pub use profile::ProfileView;
pub use registration::RegistrationForm;
pub use statistics::StatisticsView;
pub use task_board::{BoardSummary, TaskBoard};
pub use task_form::{FormMode, TaskForm};
pub use user_management::UserManagementView;

use crate::error::{ClientError, Result};

const MAX_NOTICES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient message for the user, the terminal stand-in for a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct Notices {
    queue: Mutex<VecDeque<Notice>>,
}

impl Notices {
    pub fn success(&self, message: impl Into<String>) {
        self.push(NoticeLevel::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(NoticeLevel::Error, message.into());
    }

    pub fn drain(&self) -> Vec<Notice> {
        self.lock().drain(..).collect()
    }

    pub fn last(&self) -> Option<Notice> {
        self.lock().back().cloned()
    }

    fn push(&self, level: NoticeLevel, message: String) {
        let mut queue = self.lock();
        if queue.len() == MAX_NOTICES {
            queue.pop_front();
        }
        queue.push_back(Notice { level, message });
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Notice>> {
        self.queue.lock().unwrap_or_else(|err| err.into_inner())
    }
}

/// Busy flag for save/submit buttons. A second caller is turned away while the first is
/// in flight.
#[derive(Debug, Default)]
pub(crate) struct Busy(AtomicBool);

pub(crate) struct BusyGuard<'a>(&'a AtomicBool);

impl Busy {
    pub(crate) fn acquire(&self, what: &str) -> Result<BusyGuard<'_>> {
        if self.0.swap(true, Ordering::AcqRel) {
            return Err(ClientError::Validation(format!("{what} already in progress")));
        }
        Ok(BusyGuard(&self.0))
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Poison-tolerant lock for small bits of view state.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|err| err.into_inner())
}

pub mod comment;
pub mod dashboard;
pub mod notification;
pub mod task;
pub mod user;

use serde::{Deserialize, Deserializer};

pub use comment::{Comment, NewComment, ParentPreview};
pub use dashboard::{
    AdminDashboard, AdminStats, AdminUserRow, Decision, Granularity, MemberDashboard,
    PendingUser, SeriesPoint, TaskStatistics, UserCounts, UserRequests,
};
pub use notification::{Notification, NotificationKind};
pub use task::{Assignment, AttachedFile, Priority, Task, TaskStatus};
pub use user::{Profile, Role, UserCompact};

/// Treats an explicit `null` like a missing field.
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{null_default, task::TaskStatus, user::Role, user::UserCompact};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdminStats {
    pub total_users: u64,
    pub managers: u64,
    pub members: u64,
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub performance_pct: u64,
    pub active_projects: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminUserRow {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub picture: Option<String>,
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub last_active: Option<String>,
}

impl AdminUserRow {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdminDashboard {
    pub stats: Option<AdminStats>,
    pub users: Vec<AdminUserRow>,
}

impl AdminDashboard {
    /// The admin endpoint has shipped several field spellings, sometimes nested under
    /// `data`. Every known alias is accepted; missing numbers count as zero.
    pub fn from_value(value: &Value) -> Self {
        let stats = value
            .get("stats")
            .or_else(|| value.pointer("/data/stats"))
            .filter(|v| v.is_object())
            .map(|s| AdminStats {
                total_users: first_u64(s, &["total_users", "totalUsers"]),
                managers: first_u64(s, &["managers"]),
                members: first_u64(s, &["members"]),
                total_tasks: first_u64(s, &["total_tasks", "totalTasks"]),
                completed_tasks: first_u64(
                    s,
                    &["completed_count", "completed_tasks", "completedCount"],
                ),
                performance_pct: first_number(s, &["performance", "performance_pct"])
                    .map(|p| p.round().max(0.0) as u64)
                    .unwrap_or(0),
                active_projects: first_number(s, &["active_projects", "active"])
                    .map(|n| n as u64),
            });

        let users = value
            .get("users")
            .or_else(|| value.pointer("/data/users"))
            .and_then(Value::as_array)
            .map(|rows| rows.iter().map(normalize_user_row).collect())
            .unwrap_or_default();

        Self { stats, users }
    }
}

fn normalize_user_row(u: &Value) -> AdminUserRow {
    let username = first_str(u, &["username"]).unwrap_or_default();
    let id = u
        .get("id")
        .or_else(|| u.get("pk"))
        .and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| username.clone());

    AdminUserRow {
        id,
        first_name: first_str(u, &["first_name", "firstName"]).unwrap_or_default(),
        last_name: first_str(u, &["last_name", "lastName"]).unwrap_or_default(),
        email: first_str(u, &["email"]).unwrap_or_default(),
        role: first_str(u, &["role"])
            .and_then(|r| r.parse().ok())
            .unwrap_or(Role::Member),
        is_active: u.get("is_active").and_then(Value::as_bool).unwrap_or(false),
        picture: first_str(u, &["picture"]),
        total_tasks: first_u64(
            u,
            &[
                "total_tasks_assigned",
                "total_tasks",
                "totalTasksAssigned",
                "totalTasks",
            ],
        ),
        completed_tasks: first_u64(
            u,
            &[
                "completed_tasks_assigned",
                "completed_tasks",
                "completedAssigned",
                "completedTasks",
            ],
        ),
        last_active: first_str(u, &["last_active", "date_joined"]),
        username,
    }
}

fn first_str(v: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| v.get(*k).and_then(Value::as_str))
        .map(str::to_string)
}

fn first_number(v: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| match v.get(*k)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    })
}

fn first_u64(v: &Value, keys: &[&str]) -> u64 {
    first_number(v, keys)
        .map(|n| n.max(0.0) as u64)
        .unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberTaskSummary {
    pub id: uuid::Uuid,
    pub title: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub over_due: bool,
    #[serde(default)]
    pub dead_line: bool,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assigned_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberCounts {
    pub total: u64,
    pub in_progress: u64,
    pub completed: u64,
    pub overdue: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberPerformance {
    pub average_progress: f64,
    pub on_time_completion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDashboard {
    pub user: UserCompact,
    #[serde(default)]
    pub counts: MemberCounts,
    #[serde(default)]
    pub performance: MemberPerformance,
    #[serde(default, deserialize_with = "null_default")]
    pub top_tasks: Vec<MemberTaskSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hour,
    #[default]
    Day,
    Week,
    Month,
}

impl Granularity {
    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Hour => "hour",
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
        }
    }
}

impl std::str::FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hour" => Ok(Granularity::Hour),
            "day" => Ok(Granularity::Day),
            "week" => Ok(Granularity::Week),
            "month" => Ok(Granularity::Month),
            other => Err(format!("unknown granularity: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsMeta {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub granularity: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsTotals {
    #[serde(default)]
    pub total_tasks: u64,
    #[serde(default)]
    pub completed: u64,
    #[serde(default)]
    pub overdue: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub avg_progress: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsBreakdowns {
    #[serde(default)]
    pub by_status: BTreeMap<String, u64>,
    #[serde(default)]
    pub by_priority: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub tasks_created: u64,
    #[serde(default)]
    pub tasks_completed: u64,
    #[serde(default)]
    pub avg_progress: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskStatistics {
    #[serde(default)]
    pub meta: StatisticsMeta,
    #[serde(default)]
    pub stats: StatisticsTotals,
    #[serde(default)]
    pub breakdowns: StatisticsBreakdowns,
    #[serde(default, deserialize_with = "null_default")]
    pub series: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingUser {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub employee_number: Option<String>,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserCounts {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub pending: u64,
    #[serde(default)]
    pub active: u64,
    #[serde(default)]
    pub rejected: u64,
    #[serde(default)]
    pub manager: u64,
    #[serde(default)]
    pub member: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRequests {
    #[serde(default, deserialize_with = "null_default")]
    pub pending: Vec<PendingUser>,
    #[serde(default, deserialize_with = "null_default")]
    pub active: Vec<PendingUser>,
    #[serde(default, deserialize_with = "null_default")]
    pub rejected: Vec<PendingUser>,
    #[serde(default)]
    pub count: UserCounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

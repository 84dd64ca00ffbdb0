//! One thin wrapper per backend resource group.

pub mod auth;
pub mod comments;
pub mod notifications;
pub mod profile;
pub mod reports;
pub mod tasks;
pub mod users;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{error::Result, http::ApiClient};

pub use auth::{AuthService, Credentials, LoginResponse, Registration};
pub use comments::CommentService;
pub use notifications::NotificationService;
pub use profile::{PasswordChange, ProfileService, ProfileUpdate};
pub use reports::{ReportService, StatisticsQuery};
pub use tasks::{TaskPayload, TaskService};
pub use users::UserService;

#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub tasks: TaskService,
    pub comments: CommentService,
    pub notifications: NotificationService,
    pub profile: ProfileService,
    pub reports: ReportService,
    pub users: UserService,
}

impl Services {
    pub fn new(api: ApiClient) -> Self {
        Self {
            auth: AuthService::new(api.clone()),
            tasks: TaskService::new(api.clone()),
            comments: CommentService::new(api.clone()),
            notifications: NotificationService::new(api.clone()),
            profile: ProfileService::new(api.clone()),
            reports: ReportService::new(api.clone()),
            users: UserService::new(api),
        }
    }
}

/// List endpoints reply with a bare array; anything else counts as an empty list.
pub(crate) fn decode_list<T: DeserializeOwned>(value: Value) -> Result<Vec<T>> {
    match value {
        Value::Array(_) => Ok(serde_json::from_value(value)?),
        _ => Ok(Vec::new()),
    }
}

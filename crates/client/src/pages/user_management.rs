use tokio::sync::RwLock;

use super::{Busy, Notices};
use crate::{
    error::Result,
    models::{Decision, UserRequests},
    services::UserService,
};

/// Admin approval queue with pending, active and rejected tabs.
pub struct UserManagementView {
    users: UserService,
    data: RwLock<UserRequests>,
    sending: Busy,
    pub notices: Notices,
}

impl UserManagementView {
    pub fn new(users: UserService) -> Self {
        Self {
            users,
            data: RwLock::new(UserRequests::default()),
            sending: Busy::default(),
            notices: Notices::default(),
        }
    }

    pub async fn load(&self) -> Result<()> {
        let requests = self.users.requests().await?;
        *self.data.write().await = requests;
        Ok(())
    }

    pub async fn requests(&self) -> UserRequests {
        self.data.read().await.clone()
    }

    pub async fn decide(&self, user_id: i64, decision: Decision) -> Result<()> {
        let _busy = self.sending.acquire("Decision")?;
        self.users.decide(user_id, decision).await?;

        let verb = match decision {
            Decision::Approve => "Approved",
            Decision::Reject => "Rejected",
        };
        tracing::info!(user_id, ?decision, "Account request decided");
        self.notices.success(format!("Request {verb} Successfully"));
        self.load().await
    }
}

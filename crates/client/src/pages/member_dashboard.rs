use tokio::sync::RwLock;

use super::Notices;
use crate::{
    error::{ClientError, Result},
    models::MemberDashboard,
    services::ReportService,
    session::SessionContext,
};

pub struct MemberDashboardView {
    reports: ReportService,
    session: SessionContext,
    data: RwLock<Option<MemberDashboard>>,
    pub notices: Notices,
}

impl MemberDashboardView {
    pub fn new(reports: ReportService, session: SessionContext) -> Self {
        Self {
            reports,
            session,
            data: RwLock::new(None),
            notices: Notices::default(),
        }
    }

    /// Loads the dashboard for `user_id`, or for the signed-in user.
    pub async fn load(&self, user_id: Option<i64>) -> Result<()> {
        let user_id = match user_id.or_else(|| self.session.user().map(|u| u.id)) {
            Some(id) => id,
            None => return Err(ClientError::SessionExpired),
        };
        match self.reports.member_dashboard(user_id).await {
            Ok(dash) => {
                *self.data.write().await = Some(dash);
                Ok(())
            }
            Err(e) => {
                self.notices.error("Failed to load dashboard");
                Err(e)
            }
        }
    }

    pub async fn data(&self) -> Option<MemberDashboard> {
        self.data.read().await.clone()
    }
}

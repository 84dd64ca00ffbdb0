use tokio::sync::RwLock;

use super::Notices;
use crate::{
    error::Result,
    models::{AdminDashboard, AdminStats, AdminUserRow},
    search::{paginate, Page, UserQuery},
    services::ReportService,
};

pub struct AdminDashboardView {
    reports: ReportService,
    data: RwLock<AdminDashboard>,
    pub notices: Notices,
}

impl AdminDashboardView {
    pub fn new(reports: ReportService) -> Self {
        Self {
            reports,
            data: RwLock::new(AdminDashboard::default()),
            notices: Notices::default(),
        }
    }

    pub async fn load(&self) -> Result<()> {
        match self.reports.admin_dashboard().await {
            Ok(dash) => {
                *self.data.write().await = dash;
                Ok(())
            }
            Err(e) => {
                self.notices.error("Failed to load admin dashboard");
                Err(e)
            }
        }
    }

    pub async fn stats(&self) -> Option<AdminStats> {
        self.data.read().await.stats.clone()
    }

    /// Users matching `query`, one page at a time.
    pub async fn users(&self, query: &UserQuery, page: usize, size: usize) -> Page<AdminUserRow> {
        let data = self.data.read().await;
        let filtered: Vec<AdminUserRow> = query.apply(&data.users).into_iter().cloned().collect();
        paginate(&filtered, page, size)
    }
}

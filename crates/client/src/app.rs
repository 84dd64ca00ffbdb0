use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    config::ClientConfig,
    db::Database,
    error::Result,
    guard::Guard,
    http::ApiClient,
    pages::{
        AdminDashboardView, CommentThread, MemberDashboardView, MyTasks, NotificationCenter,
        ProfileView, RegistrationForm, StatisticsView, TaskBoard, UserManagementView,
    },
    search::SearchInput,
    services::Services,
    session::{MemoryStorage, SessionContext, SessionStorage, SqliteStorage},
};

/// Everything a front end needs, wired once at startup.
#[derive(Clone)]
pub struct Taskdesk {
    pub config: ClientConfig,
    pub session: SessionContext,
    pub api: ApiClient,
    pub services: Services,
    pub guard: Guard,
}

impl Taskdesk {
    /// Opens the persistent session store and restores the saved session from it.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let db = Database::connect(&config.session_db_url).await?;
        db.run_migrations().await?;
        Self::with_storage(config, Arc::new(SqliteStorage::new(db))).await
    }

    /// Session kept in memory only; nothing survives the process.
    pub async fn ephemeral(config: ClientConfig) -> Result<Self> {
        Self::with_storage(config, Arc::new(MemoryStorage::new())).await
    }

    pub async fn with_storage(
        config: ClientConfig,
        storage: Arc<dyn SessionStorage>,
    ) -> Result<Self> {
        let session = SessionContext::load(storage).await?;
        let api = ApiClient::new(&config, session.clone())?;
        let services = Services::new(api.clone());
        let guard = Guard::new(session.clone());

        match session.user() {
            Some(user) => tracing::info!(username = %user.username, "Restored session"),
            None => tracing::debug!("No saved session"),
        }

        Ok(Self {
            config,
            session,
            api,
            services,
            guard,
        })
    }

    pub fn search_input(&self) -> SearchInput {
        SearchInput::new(self.config.search_debounce)
    }

    pub fn task_board(&self) -> TaskBoard {
        TaskBoard::new(self.services.tasks.clone())
    }

    pub fn my_tasks(&self) -> MyTasks {
        MyTasks::new(self.services.tasks.clone())
    }

    pub fn comment_thread(&self, task_id: Uuid) -> Arc<CommentThread> {
        CommentThread::new(self.services.comments.clone(), task_id)
    }

    pub fn notification_center(&self) -> Arc<NotificationCenter> {
        NotificationCenter::new(self.services.notifications.clone())
    }

    pub fn registration(&self) -> RegistrationForm {
        RegistrationForm::new(self.services.auth.clone())
    }

    pub fn profile(&self) -> ProfileView {
        ProfileView::new(self.services.profile.clone(), self.session.clone())
    }

    pub fn admin_dashboard(&self) -> AdminDashboardView {
        AdminDashboardView::new(self.services.reports.clone())
    }

    pub fn member_dashboard(&self) -> MemberDashboardView {
        MemberDashboardView::new(self.services.reports.clone(), self.session.clone())
    }

    pub fn statistics(&self) -> StatisticsView {
        StatisticsView::new(self.services.reports.clone(), Utc::now().date_naive())
    }

    pub fn user_management(&self) -> UserManagementView {
        UserManagementView::new(self.services.users.clone())
    }
}

//! The signed-in session: tokens plus the cached user-info, held in one place.
//!
//! Every reader goes through [`SessionContext`]; changes are broadcast on a watch channel
//! so views can react to sign-in, token refresh and sign-out.

pub mod claims;
pub mod storage;

use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    error::Result,
    models::{Role, UserCompact},
};

pub use claims::{peek_claims, AccessClaims};
pub use storage::{MemoryStorage, SessionStorage, SqliteStorage};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USER_INFO_KEY: &str = "user_info";

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user: UserCompact,
}

#[derive(Clone)]
pub struct SessionContext {
    storage: Arc<dyn SessionStorage>,
    state: Arc<watch::Sender<Option<Session>>>,
}

impl SessionContext {
    /// Restores whatever session the storage holds. A missing token or a user-info blob
    /// that does not parse leaves the context signed out.
    pub async fn load(storage: Arc<dyn SessionStorage>) -> Result<Self> {
        let access_token = storage.get(ACCESS_TOKEN_KEY).await?;
        let refresh_token = storage.get(REFRESH_TOKEN_KEY).await?;
        let user_info = storage.get(USER_INFO_KEY).await?;

        let user = user_info.and_then(|raw| match serde_json::from_str::<UserCompact>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!("Ignoring unreadable stored user info: {}", e);
                None
            }
        });

        let session = match (access_token, user) {
            (Some(access_token), Some(user)) if !access_token.is_empty() => Some(Session {
                access_token,
                refresh_token,
                user,
            }),
            _ => None,
        };

        let (state, _) = watch::channel(session);
        Ok(Self {
            storage,
            state: Arc::new(state),
        })
    }

    pub async fn in_memory() -> Result<Self> {
        Self::load(Arc::new(MemoryStorage::new())).await
    }

    pub fn current(&self) -> Option<Session> {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_some()
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.borrow().as_ref().map(|s| s.access_token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.state
            .borrow()
            .as_ref()
            .and_then(|s| s.refresh_token.clone())
    }

    pub fn user(&self) -> Option<UserCompact> {
        self.state.borrow().as_ref().map(|s| s.user.clone())
    }

    pub fn role(&self) -> Option<Role> {
        self.state.borrow().as_ref().map(|s| s.user.role)
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.state.subscribe()
    }

    pub async fn establish(
        &self,
        access_token: String,
        refresh_token: Option<String>,
        user: UserCompact,
    ) -> Result<()> {
        let user_info = serde_json::to_string(&user)?;
        self.storage.set(ACCESS_TOKEN_KEY, &access_token).await?;
        match &refresh_token {
            Some(refresh) => self.storage.set(REFRESH_TOKEN_KEY, refresh).await?,
            None => self.storage.remove(REFRESH_TOKEN_KEY).await?,
        }
        self.storage.set(USER_INFO_KEY, &user_info).await?;

        tracing::info!(user_id = user.id, role = %user.role, "Session established");
        self.state.send_replace(Some(Session {
            access_token,
            refresh_token,
            user,
        }));
        Ok(())
    }

    pub async fn set_access_token(&self, access_token: String) -> Result<()> {
        self.storage.set(ACCESS_TOKEN_KEY, &access_token).await?;
        self.state.send_modify(|state| {
            if let Some(session) = state {
                session.access_token = access_token;
            }
        });
        Ok(())
    }

    /// Replaces the cached user-info, e.g. after a profile edit.
    pub async fn set_user(&self, user: UserCompact) -> Result<()> {
        if !self.is_authenticated() {
            return Ok(());
        }
        self.storage
            .set(USER_INFO_KEY, &serde_json::to_string(&user)?)
            .await?;
        self.state.send_modify(|state| {
            if let Some(session) = state {
                session.user = user;
            }
        });
        Ok(())
    }

    /// Removes all three session keys.
    pub async fn clear(&self) -> Result<()> {
        self.storage.remove(ACCESS_TOKEN_KEY).await?;
        self.storage.remove(REFRESH_TOKEN_KEY).await?;
        self.storage.remove(USER_INFO_KEY).await?;
        if self.state.send_replace(None).is_some() {
            tracing::info!("Session cleared");
        }
        Ok(())
    }
}

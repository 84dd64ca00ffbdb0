use tokio::sync::RwLock;

use super::{Busy, Notices};
use crate::{
    error::{ClientError, Result},
    http::Attachment,
    models::{Profile, UserCompact},
    services::{PasswordChange, ProfileService, ProfileUpdate},
    session::SessionContext,
};

pub const MIN_PASSWORD_LEN: usize = 8;

pub struct ProfileView {
    service: ProfileService,
    session: SessionContext,
    profile: RwLock<Option<Profile>>,
    saving: Busy,
    pub notices: Notices,
}

impl ProfileView {
    pub fn new(service: ProfileService, session: SessionContext) -> Self {
        Self {
            service,
            session,
            profile: RwLock::new(None),
            saving: Busy::default(),
            notices: Notices::default(),
        }
    }

    pub async fn load(&self) -> Result<()> {
        match self.service.fetch().await {
            Ok(profile) => {
                *self.profile.write().await = Some(profile);
                Ok(())
            }
            Err(e) => {
                self.notices.error("Failed to load profile");
                Err(e)
            }
        }
    }

    pub async fn profile(&self) -> Option<Profile> {
        self.profile.read().await.clone()
    }

    /// Saves the names, and the picture when one is given. A plain JSON save also refreshes
    /// the cached user-info.
    pub async fn save(
        &self,
        first_name: &str,
        last_name: &str,
        picture: Option<Attachment>,
    ) -> Result<()> {
        if first_name.trim().is_empty() || last_name.trim().is_empty() {
            let msg = "First and last name cannot be empty";
            self.notices.error(msg);
            return Err(ClientError::Validation(msg.to_string()));
        }
        let _busy = self.saving.acquire("Save")?;

        let update = ProfileUpdate {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        };
        let with_picture = picture.is_some();
        let reply = match self.service.update(&update, picture).await {
            Ok(reply) => reply,
            Err(e) => {
                self.notices.error(
                    e.field_message(&["detail"])
                        .or_else(|| first_field_message(&e))
                        .unwrap_or_else(|| "Failed to update profile".to_string()),
                );
                return Err(e);
            }
        };
        self.notices.success("Profile updated");

        if !with_picture {
            if let Ok(user) = serde_json::from_value::<UserCompact>(reply.clone()) {
                self.session.set_user(user).await?;
            }
        }
        match serde_json::from_value::<Profile>(reply) {
            Ok(profile) => *self.profile.write().await = Some(profile),
            Err(_) => self.load().await?,
        }
        Ok(())
    }

    pub async fn change_password(&self, old: &str, new: &str, confirm: &str) -> Result<()> {
        let problem = if new.is_empty() || confirm.is_empty() {
            Some("Provide and confirm the new password.")
        } else if new != confirm {
            Some("New passwords do not match.")
        } else if new.chars().count() < MIN_PASSWORD_LEN {
            Some("New password must be at least 8 characters.")
        } else {
            None
        };
        if let Some(msg) = problem {
            self.notices.error(msg);
            return Err(ClientError::Validation(msg.to_string()));
        }

        let change = PasswordChange {
            old_password: old.to_string(),
            new_password: new.to_string(),
        };
        match self.service.change_password(&change).await {
            Ok(_) => {
                self.notices.success("Password updated");
                Ok(())
            }
            Err(e) => {
                self.notices.error(
                    e.field_message(&["new_password", "old_password", "detail"])
                        .unwrap_or_else(|| "Failed to change password".to_string()),
                );
                Err(e)
            }
        }
    }
}

fn first_field_message(e: &ClientError) -> Option<String> {
    let object = e.body()?.as_object()?;
    let keys: Vec<&str> = object.keys().map(String::as_str).collect();
    e.field_message(&keys)
}

use serde::Serialize;
use serde_json::Value;

use crate::{
    error::Result,
    http::{ApiClient, Attachment, FormData},
    models::Profile,
};

#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Clone)]
pub struct ProfileService {
    api: ApiClient,
}

impl ProfileService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn fetch(&self) -> Result<Profile> {
        self.api.get("/auth/profile/").await
    }

    /// JSON patch, or multipart when a new picture is attached.
    pub async fn update(&self, update: &ProfileUpdate, picture: Option<Attachment>) -> Result<Value> {
        match picture {
            Some(picture) => {
                let form = FormData::new()
                    .text("first_name", update.first_name.clone())
                    .text("last_name", update.last_name.clone())
                    .file("picture", picture);
                self.api.patch_form("/auth/profile/", form).await
            }
            None => self.api.patch("/auth/profile/", update).await,
        }
    }

    pub async fn change_password(&self, change: &PasswordChange) -> Result<Value> {
        self.api.post("/auth/change-password/", change).await
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::Result,
    http::{ApiClient, Attachment, FormData},
    models::UserCompact,
};

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
    pub user_info: UserCompact,
}

/// Sign-up form. `designation` is sent to the backend as `role`.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub designation: String,
    pub employee_number: String,
    pub department: String,
    pub phone: Option<String>,
    pub picture: Option<Attachment>,
}

impl Registration {
    /// Multipart body with blank fields left out.
    pub fn to_form(&self) -> FormData {
        let mut form = FormData::new();
        for (name, value) in [
            ("first_name", self.first_name.as_str()),
            ("last_name", self.last_name.as_str()),
            ("username", self.username.as_str()),
            ("email", self.email.as_str()),
            ("password", self.password.as_str()),
            ("confirm_password", self.confirm_password.as_str()),
            ("role", self.designation.as_str()),
            ("employee_number", self.employee_number.as_str()),
            ("department", self.department.as_str()),
        ] {
            if !value.is_empty() {
                form = form.text(name, value);
            }
        }
        if let Some(phone) = self.phone.as_deref().filter(|p| !p.is_empty()) {
            form = form.text("phone", phone);
        }
        if let Some(picture) = &self.picture {
            form = form.file("picture", picture.clone());
        }
        form
    }
}

#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Signs in and stores the tokens and user-info in the session.
    pub async fn login(&self, credentials: &Credentials) -> Result<UserCompact> {
        let resp: LoginResponse = self.api.post("/auth/login/", credentials).await?;
        self.api
            .session()
            .establish(resp.access, resp.refresh, resp.user_info.clone())
            .await?;
        Ok(resp.user_info)
    }

    /// New accounts wait for admin approval, so this never signs in.
    pub async fn register(&self, registration: &Registration) -> Result<Value> {
        self.api
            .post_form("/auth/register/", registration.to_form())
            .await
    }

    pub async fn refresh_token(&self) -> Result<String> {
        self.api.refresh().await
    }

    pub async fn logout(&self) -> Result<()> {
        self.api.session().clear().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_maps_designation_and_skips_blanks() {
        let reg = Registration {
            first_name: "Huda".into(),
            username: "huda".into(),
            password: "longenough".into(),
            confirm_password: "longenough".into(),
            designation: "Member".into(),
            phone: Some(String::new()),
            ..Default::default()
        };
        let form = reg.to_form();
        assert_eq!(form.texts("role"), vec!["Member"]);
        assert!(form.texts("designation").is_empty());
        assert!(form.texts("last_name").is_empty());
        assert!(form.texts("phone").is_empty());
        assert!(form.files("picture").is_empty());
    }
}

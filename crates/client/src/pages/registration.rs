use super::{profile::MIN_PASSWORD_LEN, Busy, Notices};
use crate::{
    error::{ClientError, Result},
    services::{AuthService, Registration},
};

/// Fields checked, in order, for the message shown when the backend rejects a sign-up.
const ERROR_FIELDS: [&str; 7] = [
    "non_field_errors",
    "detail",
    "email",
    "username",
    "employee_number",
    "role",
    "message",
];

pub struct RegistrationForm {
    auth: AuthService,
    pub form: Registration,
    submitting: Busy,
    pub notices: Notices,
}

impl RegistrationForm {
    pub fn new(auth: AuthService) -> Self {
        Self {
            auth,
            form: Registration::default(),
            submitting: Busy::default(),
            notices: Notices::default(),
        }
    }

    /// Live check shown under the confirmation field.
    pub fn password_error(&self) -> Option<&'static str> {
        let form = &self.form;
        if !form.confirm_password.is_empty() && form.password != form.confirm_password {
            Some("Passwords do not match")
        } else {
            None
        }
    }

    pub fn validate(&self) -> std::result::Result<(), &'static str> {
        if self.form.password != self.form.confirm_password {
            return Err("Passwords do not match");
        }
        if self.form.password.chars().count() < MIN_PASSWORD_LEN {
            return Err("Password must be at least 8 characters");
        }
        Ok(())
    }

    /// Sends the sign-up. The account then waits for admin approval; nobody is signed in.
    pub async fn submit(&self) -> Result<()> {
        if let Err(msg) = self.validate() {
            self.notices.error(msg);
            return Err(ClientError::Validation(msg.to_string()));
        }
        let _busy = self.submitting.acquire("Registration")?;

        match self.auth.register(&self.form).await {
            Ok(_) => {
                tracing::info!(username = %self.form.username, "Registration submitted");
                self.notices
                    .success("Registration submitted. Please wait for admin approval.");
                Ok(())
            }
            Err(e) => {
                self.notices.error(registration_error(&e));
                Err(e)
            }
        }
    }
}

pub fn registration_error(e: &ClientError) -> String {
    match e {
        ClientError::Api { .. } => e
            .field_message(&ERROR_FIELDS)
            .unwrap_or_else(|| "Registration failed".to_string()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    #[test]
    fn error_precedence() {
        let err = ClientError::api(
            StatusCode::BAD_REQUEST,
            r#"{"role": ["Invalid"], "username": ["Taken"], "email": ["Exists"]}"#,
        );
        assert_eq!(registration_error(&err), "Exists");

        let err = ClientError::api(
            StatusCode::BAD_REQUEST,
            r#"{"detail": "Closed", "non_field_errors": ["Bad combo"]}"#,
        );
        assert_eq!(registration_error(&err), "Bad combo");

        let err = ClientError::api(StatusCode::BAD_REQUEST, r#"{"phone": ["?"]}"#);
        assert_eq!(registration_error(&err), "Registration failed");
    }
}

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Claims carried by the backend's access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    #[serde(default)]
    pub user_id: Option<i64>,
    pub exp: i64,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl AccessClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Reads the claims without checking the signature or expiry. The signing key lives on the
/// backend, so the result is only good for display.
pub fn peek_claims(token: &str) -> Result<AccessClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<AccessClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims)
}

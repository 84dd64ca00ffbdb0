use serde::Serialize;
use serde_json::Value;

use crate::{
    error::Result,
    http::ApiClient,
    models::{Decision, UserRequests},
};

#[derive(Debug, Serialize)]
struct DecisionRequest {
    user_id: i64,
    action: Decision,
}

/// Account approval queue, admin only.
#[derive(Clone)]
pub struct UserService {
    api: ApiClient,
}

impl UserService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn requests(&self) -> Result<UserRequests> {
        self.api.get("/auth/user-requests/").await
    }

    pub async fn decide(&self, user_id: i64, action: Decision) -> Result<Value> {
        self.api
            .post("/auth/user-requests/", &DecisionRequest { user_id, action })
            .await
    }
}

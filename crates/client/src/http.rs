use std::path::Path;

use reqwest::{multipart, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::{
    config::ClientConfig,
    error::{ClientError, Result},
    session::SessionContext,
};

/// A file picked for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, bytes))
    }

    fn to_part(&self) -> Result<multipart::Part> {
        let part = multipart::Part::bytes(self.bytes.clone()).file_name(self.file_name.clone());
        Ok(match &self.content_type {
            Some(ct) => part.mime_str(ct)?,
            None => part,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
enum FormPart {
    Text(String),
    File(Attachment),
}

/// Multipart fields kept in a replayable form. `reqwest`'s form is consumed on send, so a
/// fresh one is built for every attempt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    parts: Vec<(String, FormPart)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push((name.into(), FormPart::Text(value.into())));
        self
    }

    /// Adds the field unless the value is blank.
    pub fn text_if_present(self, name: &str, value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => self.text(name, v),
            _ => self,
        }
    }

    pub fn file(mut self, name: impl Into<String>, file: Attachment) -> Self {
        self.parts.push((name.into(), FormPart::File(file)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Text values for `name`, in insertion order.
    pub fn texts(&self, name: &str) -> Vec<&str> {
        self.parts
            .iter()
            .filter(|(n, _)| n == name)
            .filter_map(|(_, p)| match p {
                FormPart::Text(t) => Some(t.as_str()),
                FormPart::File(_) => None,
            })
            .collect()
    }

    pub fn files(&self, name: &str) -> Vec<&Attachment> {
        self.parts
            .iter()
            .filter(|(n, _)| n == name)
            .filter_map(|(_, p)| match p {
                FormPart::File(f) => Some(f),
                FormPart::Text(_) => None,
            })
            .collect()
    }

    fn to_multipart(&self) -> Result<multipart::Form> {
        let mut form = multipart::Form::new();
        for (name, part) in &self.parts {
            form = match part {
                FormPart::Text(value) => form.text(name.clone(), value.clone()),
                FormPart::File(file) => form.part(name.clone(), file.to_part()?),
            };
        }
        Ok(form)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Json(Value),
    Form(FormData),
}

impl Body {
    pub fn json<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Body::Json(serde_json::to_value(value)?))
    }
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
}

/// Base URL plus bearer auth in front of `reqwest`, with one token refresh per 401.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionContext,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: SessionContext) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(Method::GET, path, &[], Body::Empty).await
    }

    pub async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        self.send(Method::GET, path, query, Body::Empty).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        self.send(Method::POST, path, &[], Body::json(body)?).await
    }

    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(Method::POST, path, &[], Body::Empty).await
    }

    pub async fn post_form<T: DeserializeOwned>(&self, path: &str, form: FormData) -> Result<T> {
        self.send(Method::POST, path, &[], Body::Form(form)).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        self.send(Method::PUT, path, &[], Body::json(body)?).await
    }

    pub async fn put_form<T: DeserializeOwned>(&self, path: &str, form: FormData) -> Result<T> {
        self.send(Method::PUT, path, &[], Body::Form(form)).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        self.send(Method::PATCH, path, &[], Body::json(body)?).await
    }

    pub async fn patch_form<T: DeserializeOwned>(&self, path: &str, form: FormData) -> Result<T> {
        self.send(Method::PATCH, path, &[], Body::Form(form)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.send(Method::DELETE, path, &[], Body::Empty).await
    }

    /// Sends a request and decodes the JSON reply. An empty reply decodes from `null`.
    ///
    /// A 401 on an authenticated request triggers a single refresh; the request is then
    /// replayed once with the new token. A failed refresh clears the session.
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Body,
    ) -> Result<T> {
        let token = self.session.access_token();
        let (status, text) = self.attempt(&method, path, query, &body, token.as_deref()).await?;

        let (status, text) = if status == StatusCode::UNAUTHORIZED && token.is_some() {
            tracing::debug!(%method, path, "Access token rejected, refreshing");
            let fresh = self.refresh().await?;
            self.attempt(&method, path, query, &body, Some(&fresh)).await?
        } else {
            (status, text)
        };

        if !status.is_success() {
            tracing::debug!(%method, path, %status, "Request failed");
            return Err(ClientError::api(status, &text));
        }

        decode(&text)
    }

    async fn attempt(
        &self,
        method: &Method,
        path: &str,
        query: &[(&str, String)],
        body: &Body,
        token: Option<&str>,
    ) -> Result<(StatusCode, String)> {
        let url = self.url(path);
        tracing::debug!(%method, %url, "Sending request");

        let mut rb: RequestBuilder = self.http.request(method.clone(), &url);
        if !query.is_empty() {
            rb = rb.query(query);
        }
        if let Some(token) = token {
            rb = rb.bearer_auth(token);
        }
        rb = match body {
            Body::Empty => rb,
            Body::Json(value) => rb.json(value),
            Body::Form(form) => rb.multipart(form.to_multipart()?),
        };

        let resp = rb.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        Ok((status, text))
    }

    /// Trades the refresh token for a new access token. Any failure signs the user out.
    pub async fn refresh(&self) -> Result<String> {
        let Some(refresh) = self.session.refresh_token() else {
            tracing::warn!("No refresh token available, signing out");
            self.session.clear().await?;
            return Err(ClientError::SessionExpired);
        };

        let outcome = self
            .http
            .post(self.url("/auth/token/refresh/"))
            .json(&RefreshRequest { refresh: &refresh })
            .send()
            .await;

        let access = match outcome {
            Ok(resp) if resp.status().is_success() => resp
                .json::<RefreshResponse>()
                .await
                .ok()
                .map(|r| r.access),
            Ok(resp) => {
                tracing::warn!(status = %resp.status(), "Token refresh rejected");
                None
            }
            Err(e) => {
                tracing::warn!("Token refresh failed: {}", e);
                None
            }
        };

        match access {
            Some(access) => {
                self.session.set_access_token(access.clone()).await?;
                Ok(access)
            }
            None => {
                self.session.clear().await?;
                Err(ClientError::SessionExpired)
            }
        }
    }
}

fn decode<T: DeserializeOwned>(text: &str) -> Result<T> {
    if text.trim().is_empty() {
        return Ok(serde_json::from_value(Value::Null)?);
    }
    Ok(serde_json::from_str(text)?)
}

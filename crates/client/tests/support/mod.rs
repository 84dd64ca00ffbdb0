//! In-process stand-in for the REST backend, served by axum on an ephemeral port.

#![allow(dead_code)]

use std::{
    collections::{HashSet, VecDeque},
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Value};
use uuid::Uuid;

use taskdesk_client::{
    services::Credentials,
    session::{MemoryStorage, SessionStorage},
    ClientConfig, Taskdesk,
};

pub const PASSWORD: &str = "secret-pass";
pub const REFRESH_TOKEN: &str = "refresh-1";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub auth: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

impl Recorded {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

pub struct StubState {
    pub requests: Vec<Recorded>,
    pub valid_token: String,
    pub refresh_ok: bool,
    pub role: &'static str,
    pub tasks: Vec<Value>,
    pub members: Vec<Value>,
    pub comments: Vec<Value>,
    pub notifications: Vec<Value>,
    /// Endpoint groups that answer with an error: "progress", "comment", "mark-all-read",
    /// "register".
    pub failing: HashSet<&'static str>,
    /// Delays applied to progress updates, in arrival order.
    pub progress_delays: VecDeque<Duration>,
    /// Delay applied to every comment post.
    pub comment_delay: Option<Duration>,
    pub profile: Value,
    /// Body of a 400 reply to password changes; `Null` accepts the change.
    pub password_errors: Value,
    pub user_requests: Value,
    pub statistics: Value,
}

#[derive(Clone)]
pub struct Backend {
    state: Arc<Mutex<StubState>>,
    pub url: String,
}

impl Backend {
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(StubState {
            requests: Vec::new(),
            valid_token: "access-1".to_string(),
            refresh_ok: true,
            role: "Manager",
            tasks: Vec::new(),
            members: vec![
                user(3, "sara", "Member"),
                user(5, "omar", "Member"),
                user(7, "lina", "Member"),
            ],
            comments: Vec::new(),
            notifications: Vec::new(),
            failing: HashSet::new(),
            progress_delays: VecDeque::new(),
            comment_delay: None,
            profile: json!({
                "id": 1,
                "first_name": "tester",
                "last_name": "Tester",
                "username": "tester",
                "email": "tester@example.com",
                "role": "Member",
                "department": "Design"
            }),
            password_errors: Value::Null,
            user_requests: json!({
                "pending": [user(9, "hana", "Member")],
                "active": [],
                "rejected": [],
                "count": {"pending": 1, "active": 0, "rejected": 0}
            }),
            statistics: json!({"series": []}),
        }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().fallback(handle).with_state(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            state,
            url: format!("http://{addr}"),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap()
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::for_api(format!("{}/api/", self.url))
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state().requests.clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.state()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn last(&self, method: Method, path: &str) -> Option<Recorded> {
        self.state()
            .requests
            .iter()
            .rev()
            .find(|r| r.method == method && r.path == path)
            .cloned()
    }

    /// Makes every issued access token stale; the next refresh mints a new one.
    pub fn expire_tokens(&self) {
        self.state().valid_token = "not-issued-yet".to_string();
    }

    pub fn fail(&self, group: &'static str) {
        self.state().failing.insert(group);
    }

    /// A client with an empty in-memory session.
    pub async fn client(&self) -> (Taskdesk, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let shared: Arc<dyn SessionStorage> = storage.clone();
        let app = Taskdesk::with_storage(self.config(), shared).await.unwrap();
        (app, storage)
    }

    /// A client signed in with the given role.
    pub async fn signed_in(&self, role: &'static str) -> (Taskdesk, Arc<MemoryStorage>) {
        self.state().role = role;
        let (app, storage) = self.client().await;
        app.services
            .auth
            .login(&Credentials {
                username: "tester".to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .unwrap();
        (app, storage)
    }
}

pub fn user(id: i64, username: &str, role: &str) -> Value {
    json!({
        "id": id,
        "first_name": username,
        "last_name": "Tester",
        "username": username,
        "email": format!("{username}@example.com"),
        "role": role,
        "is_active": true,
        "is_approved": true
    })
}

pub fn task(id: Uuid, title: &str, status: &str, progress: u8, assignees: &[i64]) -> Value {
    let assigned: Vec<Value> = assignees
        .iter()
        .map(|id| json!({"assignee": user(*id, &format!("user{id}"), "Member")}))
        .collect();
    json!({
        "id": id,
        "title": title,
        "description": "",
        "priority": "High",
        "status": status,
        "progress": progress,
        "due_date": "2030-01-01T00:00:00Z",
        "assigned_users": assigned,
        "attached_files": []
    })
}

pub fn notification(id: Uuid, read: bool) -> Value {
    json!({
        "id": id,
        "recipient": 1,
        "type": "Assignment",
        "title": "New task",
        "message": "You were assigned a task",
        "meta": {},
        "read": read,
        "created_at": "2025-11-20T08:00:00Z"
    })
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

async fn handle(
    State(state): State<Arc<Mutex<StubState>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().trim_start_matches("/api").to_string();
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let recorded = Recorded {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        auth: header_str(header::AUTHORIZATION),
        content_type: header_str(header::CONTENT_TYPE),
        body: String::from_utf8_lossy(&body).into_owned(),
    };

    let delay = {
        let mut s = state.lock().unwrap();
        s.requests.push(recorded.clone());
        if path.ends_with("/update-progress/") {
            s.progress_delays.pop_front()
        } else if method == Method::POST && path == "/comments/" {
            s.comment_delay
        } else {
            None
        }
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let mut s = state.lock().unwrap();
    route(&mut s, &recorded)
}

fn route(s: &mut StubState, req: &Recorded) -> Response {
    let segments: Vec<&str> = req.path.trim_matches('/').split('/').collect();
    let body = req.json();

    match (req.method.as_str(), segments.as_slice()) {
        ("POST", ["auth", "login"]) => {
            if body["password"] != PASSWORD {
                return reply(
                    StatusCode::UNAUTHORIZED,
                    json!({"detail": "No active account found with the given credentials"}),
                );
            }
            let username = body["username"].as_str().unwrap_or("tester");
            reply(
                StatusCode::OK,
                json!({
                    "access": s.valid_token,
                    "refresh": REFRESH_TOKEN,
                    "user_info": user(1, username, s.role)
                }),
            )
        }
        ("POST", ["auth", "token", "refresh"]) => {
            if s.refresh_ok && body["refresh"] == REFRESH_TOKEN {
                s.valid_token = "access-2".to_string();
                reply(StatusCode::OK, json!({"access": s.valid_token}))
            } else {
                reply(
                    StatusCode::UNAUTHORIZED,
                    json!({"detail": "Token is invalid or expired"}),
                )
            }
        }
        ("POST", ["auth", "register"]) => {
            if s.failing.contains("register") {
                reply(
                    StatusCode::BAD_REQUEST,
                    json!({
                        "username": ["A user with that username already exists."],
                        "email": ["user with this email already exists."]
                    }),
                )
            } else {
                reply(StatusCode::CREATED, json!({"message": "Registration submitted"}))
            }
        }
        _ if req.auth.as_deref() != Some(format!("Bearer {}", s.valid_token).as_str()) => reply(
            StatusCode::UNAUTHORIZED,
            json!({"detail": "Given token not valid for any token type"}),
        ),
        ("GET", ["auth", "profile"]) => reply(StatusCode::OK, s.profile.clone()),
        ("PATCH", ["auth", "profile"]) => {
            if let (Some(profile), Some(changes)) = (s.profile.as_object_mut(), body.as_object()) {
                for (k, v) in changes {
                    profile.insert(k.clone(), v.clone());
                }
            }
            if is_multipart(req) {
                s.profile["profile_picture"] = json!("/media/profile/tester.png");
                return reply(StatusCode::OK, json!({"status": "picture saved"}));
            }
            reply(StatusCode::OK, s.profile.clone())
        }
        ("POST", ["auth", "change-password"]) => {
            if s.password_errors.is_null() {
                reply(StatusCode::OK, json!({"detail": "Password updated"}))
            } else {
                reply(StatusCode::BAD_REQUEST, s.password_errors.clone())
            }
        }
        ("GET", ["auth", "user-requests"]) => reply(StatusCode::OK, s.user_requests.clone()),
        ("POST", ["auth", "user-requests"]) => {
            let id = body["user_id"].clone();
            let target = if body["action"] == "approve" { "active" } else { "rejected" };
            let pending = s.user_requests["pending"].as_array().cloned().unwrap_or_default();
            let (moved, kept): (Vec<Value>, Vec<Value>) =
                pending.into_iter().partition(|u| u["id"] == id);
            s.user_requests["pending"] = Value::Array(kept);
            if let Some(list) = s.user_requests[target].as_array_mut() {
                list.extend(moved);
            }
            reply(StatusCode::OK, json!({"status": "ok"}))
        }
        ("GET", ["tasks", "statistics"]) => reply(StatusCode::OK, s.statistics.clone()),
        ("POST", ["tasks"]) => {
            if is_multipart(req) {
                return reply(StatusCode::CREATED, json!({"status": "created"}));
            }
            let mut created = body.clone();
            created["id"] = json!(Uuid::new_v4());
            created["assigned_users"] = json!([]);
            created["attached_files"] = json!([]);
            s.tasks.push(created.clone());
            reply(StatusCode::CREATED, created)
        }
        ("PUT", ["tasks", id]) => match find(&mut s.tasks, id) {
            Some(task) => {
                if let (Some(task), Some(changes)) = (task.as_object_mut(), body.as_object()) {
                    for (k, v) in changes {
                        if k != "assignees" {
                            task.insert(k.clone(), v.clone());
                        }
                    }
                }
                reply(StatusCode::OK, task.clone())
            }
            None => reply(StatusCode::NOT_FOUND, json!({"detail": "Not found."})),
        },
        ("GET", ["tasks"]) | ("GET", ["tasks", "my-tasks"]) => {
            reply(StatusCode::OK, Value::Array(s.tasks.clone()))
        }
        ("GET", ["tasks", "list-members"]) => reply(StatusCode::OK, Value::Array(s.members.clone())),
        ("PATCH", ["tasks", id, "update-progress"]) => {
            if s.failing.contains("progress") {
                return reply(StatusCode::BAD_REQUEST, json!({"detail": "Progress locked"}));
            }
            let progress = body["progress"].clone();
            match find(&mut s.tasks, id) {
                Some(task) => {
                    if progress == 100 {
                        task["status"] = json!("COMPLETED");
                    }
                    task["progress"] = progress;
                    reply(StatusCode::OK, task.clone())
                }
                None => reply(StatusCode::NOT_FOUND, json!({"detail": "Not found."})),
            }
        }
        ("PATCH", ["tasks", id]) => match find(&mut s.tasks, id) {
            Some(task) => {
                if let (Some(task), Some(changes)) = (task.as_object_mut(), body.as_object()) {
                    for (k, v) in changes {
                        task.insert(k.clone(), v.clone());
                    }
                }
                reply(StatusCode::OK, task.clone())
            }
            None => reply(StatusCode::NOT_FOUND, json!({"detail": "Not found."})),
        },
        ("POST", ["tasks", _, "assign"]) => reply(StatusCode::OK, json!({"status": "assigned"})),
        ("GET", ["comments"]) => reply(StatusCode::OK, Value::Array(s.comments.clone())),
        ("POST", ["comments"]) => {
            if s.failing.contains("comment") {
                return reply(StatusCode::BAD_REQUEST, json!({"detail": "Comments are closed"}));
            }
            let comment = json!({
                "id": Uuid::new_v4(),
                "task": body["task"],
                "text": body["text"],
                "created_by": user(1, "tester", s.role),
                "created_at": chrono::Utc::now().to_rfc3339(),
                "self": true
            });
            s.comments.push(comment.clone());
            reply(StatusCode::CREATED, comment)
        }
        ("PATCH", ["comments", id]) => match find(&mut s.comments, id) {
            Some(comment) => {
                comment["text"] = body["text"].clone();
                comment["edited_at"] = json!(chrono::Utc::now().to_rfc3339());
                reply(StatusCode::OK, comment.clone())
            }
            None => reply(StatusCode::NOT_FOUND, json!({"detail": "Not found."})),
        },
        ("DELETE", ["comments", id]) => match find(&mut s.comments, id) {
            Some(comment) => {
                comment["is_deleted"] = json!(true);
                StatusCode::NO_CONTENT.into_response()
            }
            None => reply(StatusCode::NOT_FOUND, json!({"detail": "Not found."})),
        },
        ("DELETE", ["tasks", "notifications", id]) => {
            let before = s.notifications.len();
            s.notifications.retain(|n| n["id"] != *id);
            if s.notifications.len() == before {
                return reply(StatusCode::NOT_FOUND, json!({"detail": "Not found."}));
            }
            StatusCode::NO_CONTENT.into_response()
        }
        ("GET", ["tasks", "notifications"]) => {
            reply(StatusCode::OK, Value::Array(s.notifications.clone()))
        }
        ("POST", ["tasks", "notifications", "mark-all-read"]) => {
            if s.failing.contains("mark-all-read") {
                return reply(StatusCode::INTERNAL_SERVER_ERROR, json!({}));
            }
            for n in &mut s.notifications {
                n["read"] = json!(true);
            }
            reply(StatusCode::OK, json!({"status": "ok"}))
        }
        ("POST", ["tasks", "notifications", id, "mark-read"]) => {
            match find(&mut s.notifications, id) {
                Some(n) => {
                    n["read"] = json!(true);
                    reply(StatusCode::OK, json!({"status": "ok"}))
                }
                None => reply(StatusCode::NOT_FOUND, json!({"detail": "Not found."})),
            }
        }
        _ => reply(StatusCode::NOT_FOUND, json!({"detail": "Not found."})),
    }
}

fn is_multipart(req: &Recorded) -> bool {
    req.content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

fn find<'a>(items: &'a mut [Value], id: &str) -> Option<&'a mut Value> {
    items.iter_mut().find(|item| item["id"] == id)
}

//! Headless client for the taskdesk backend: session handling, a role-aware route guard,
//! typed REST services and one view-model per screen.

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod guard;
pub mod http;
pub mod models;
pub mod optimistic;
pub mod pages;
pub mod polling;
pub mod search;
pub mod services;
pub mod session;

pub use app::Taskdesk;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use guard::{Guard, Navigation, Route};
pub use session::SessionContext;

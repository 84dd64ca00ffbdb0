use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Manager,
    Member,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Manager, Role::Member];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Manager => "Manager",
            Role::Member => "Member",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "member" => Ok(Role::Member),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// The user shape embedded everywhere: task creators, assignees, comment authors and the
/// cached `user_info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCompact {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub employee_number: Option<String>,
    #[serde(default, alias = "picture")]
    pub profile_picture: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default = "default_true")]
    pub is_approved: bool,
}

fn default_true() -> bool {
    true
}

impl UserCompact {
    /// "First Last", or the username when both names are blank.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }

    /// Case-insensitive match against the identity fields shown in pickers and tables.
    pub fn matches(&self, needle_lower: &str) -> bool {
        needle_lower.is_empty()
            || self.first_name.to_lowercase().contains(needle_lower)
            || self.last_name.to_lowercase().contains(needle_lower)
            || self.username.to_lowercase().contains(needle_lower)
            || self.email.to_lowercase().contains(needle_lower)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(flatten)]
    pub user: UserCompact,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,
}

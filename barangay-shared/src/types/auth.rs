use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Resident,
    Admin,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Resident => write!(f, "resident"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "resident" => Ok(UserRole::Resident),
            "admin" => Ok(UserRole::Admin),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

/// The authenticated caller. At most one is active, persisted as the
/// current session pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(rename = "admin", default)]
    pub is_admin: bool,
}

impl Identity {
    pub fn admin(name: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            username: username.into(),
            role: UserRole::Admin,
            is_admin: true,
        }
    }

    pub fn resident(name: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            username: username.into(),
            role: UserRole::Resident,
            is_admin: false,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }
}

/// Require an administrator identity.
pub fn require_admin<'a>(identity: Option<&'a Identity>, action: &str) -> AppResult<&'a Identity> {
    match identity {
        Some(id) if id.is_admin() => Ok(id),
        _ => Err(AppError::forbidden(format!("only admin can {action}"))),
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Community,
    Worker,
    Admin,
}

impl UserRole {
    /// Roles that may be granted through role assignment
    pub fn is_assignable(self) -> bool {
        matches!(self, UserRole::Worker | UserRole::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Community => write!(f, "community"),
            UserRole::Worker => write!(f, "worker"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "community" => Ok(UserRole::Community),
            "worker" => Ok(UserRole::Worker),
            "admin" => Ok(UserRole::Admin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// Stored user profile
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct UserProfile {
    pub uid: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    /// Only meaningful for workers
    pub is_available: bool,
    pub team_id: Option<String>,
    /// Push delivery token registered by the user's device
    pub fcm_token: Option<String>,
    pub last_active: Option<DateTime<Utc>>,
}

impl UserProfile {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_available_worker(&self) -> bool {
        self.role == UserRole::Worker && self.is_available
    }
}

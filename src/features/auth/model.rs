use serde::{Deserialize, Serialize};

use crate::core::error::{AppError, Result};
use utoipa::ToSchema;

/// Caller identity taken from a verified ID token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// `role` custom claim as issued. Informational only: authorization reads the
    /// stored profile role.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claims_role: Option<String>,
}

impl AuthenticatedUser {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            claims_role: None,
        }
    }
}

/// Caller uid of an optional identity, as consumed by services
pub fn caller_uid(user: &Option<AuthenticatedUser>) -> Option<&str> {
    user.as_ref().map(|u| u.uid.as_str())
}

/// Uid of an authenticated caller, or `Unauthorized` carrying `message`
pub fn require_uid<'a>(caller: Option<&'a str>, message: &str) -> Result<&'a str> {
    caller.ok_or_else(|| AppError::Unauthorized(message.to_string()))
}

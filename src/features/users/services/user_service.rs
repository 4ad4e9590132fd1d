use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::require_uid;
use crate::features::users::models::UserRole;
use crate::features::users::UserDirectory;
use crate::shared::clock::Clock;
use crate::shared::constants::{AUTHENTICATION_REQUIRED, LOGIN_REQUIRED};
use crate::shared::validation::non_blank;

/// Role assignment and self-service profile updates
pub struct UserService {
    directory: Arc<dyn UserDirectory>,
    clock: Arc<dyn Clock>,
}

impl UserService {
    pub fn new(directory: Arc<dyn UserDirectory>, clock: Arc<dyn Clock>) -> Self {
        Self { directory, clock }
    }

    /// Grant `worker` or `admin` to `target_uid`. The caller's stored role must be admin.
    pub async fn assign_role(
        &self,
        caller: Option<&str>,
        target_uid: Option<&str>,
        role: Option<&str>,
    ) -> Result<UserRole> {
        let admin_uid = require_uid(caller, LOGIN_REQUIRED)?;

        let target_uid = non_blank(target_uid).ok_or_else(|| missing_field("target_uid"))?;
        let role = non_blank(role).ok_or_else(|| missing_field("role"))?;

        let caller_profile = self.directory.get_profile(admin_uid).await.map_err(|e| {
            tracing::error!("Error verifying admin role for {}: {}", admin_uid, e);
            AppError::Internal("Could not verify user permissions.".to_string())
        })?;
        if !caller_profile.is_some_and(|p| p.is_admin()) {
            return Err(AppError::Forbidden(
                "Only Admin users can assign roles.".to_string(),
            ));
        }

        let role = role
            .parse::<UserRole>()
            .ok()
            .filter(|r| r.is_assignable())
            .ok_or_else(|| {
                tracing::error!("Invalid role attempted: {} for {}", role, target_uid);
                AppError::Validation(
                    "Can only assign \"worker\" or \"admin\" roles via this function.".to_string(),
                )
            })?;

        self.directory.set_role(target_uid, role).await.map_err(|e| {
            tracing::error!("Failed to set role for {}: {}", target_uid, e);
            AppError::Internal("Failed to update user role due to a server error.".to_string())
        })?;

        tracing::info!("{} assigned role {} to {}", admin_uid, role, target_uid);
        Ok(role)
    }

    pub async fn register_push_token(&self, caller: Option<&str>, token: &str) -> Result<()> {
        let uid = require_uid(caller, AUTHENTICATION_REQUIRED)?;
        let token = non_blank(Some(token))
            .ok_or_else(|| AppError::Validation("Push token must not be empty".to_string()))?;

        self.directory
            .set_push_token(uid, token, self.clock.now())
            .await?;

        tracing::info!("Registered push token for {}", uid);
        Ok(())
    }

    /// Only workers have an availability flag
    pub async fn set_availability(&self, caller: Option<&str>, available: bool) -> Result<()> {
        let uid = require_uid(caller, AUTHENTICATION_REQUIRED)?;

        let is_worker = self
            .directory
            .get_profile(uid)
            .await?
            .is_some_and(|p| p.role == UserRole::Worker);
        if !is_worker {
            return Err(AppError::Forbidden(
                "Only workers can change availability.".to_string(),
            ));
        }

        if !self.directory.set_availability(uid, available).await? {
            return Err(AppError::NotFound("User profile not found.".to_string()));
        }

        tracing::info!("Worker {} availability set to {}", uid, available);
        Ok(())
    }
}

fn missing_field(field: &str) -> AppError {
    AppError::Validation(format!("Missing required field: {}", field))
}

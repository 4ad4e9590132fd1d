use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::users::models::{UserProfile, UserRole};

const PROFILE_COLUMNS: &str =
    "uid, name, email, role, is_available, team_id, fcm_token, last_active";

/// Read/write access to stored user profiles
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>>;

    /// Workers with `role = worker` and `is_available = true`
    async fn available_workers(&self) -> Result<Vec<UserProfile>>;

    async fn push_token(&self, uid: &str) -> Result<Option<String>>;

    /// Merge-write of role (creates the profile if missing). Workers become available.
    async fn set_role(&self, uid: &str, role: UserRole) -> Result<()>;

    async fn set_push_token(&self, uid: &str, token: &str, now: DateTime<Utc>) -> Result<()>;

    /// Returns false when the profile does not exist
    async fn set_availability(&self, uid: &str, available: bool) -> Result<bool>;
}

/// Postgres-backed user directory
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>> {
        let sql = format!("SELECT {} FROM user_profiles WHERE uid = $1", PROFILE_COLUMNS);
        sqlx::query_as::<_, UserProfile>(&sql)
            .bind(uid)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get user profile {}: {:?}", uid, e);
                AppError::Database(e)
            })
    }

    async fn available_workers(&self) -> Result<Vec<UserProfile>> {
        let sql = format!(
            "SELECT {} FROM user_profiles WHERE role = 'worker' AND is_available ORDER BY uid",
            PROFILE_COLUMNS
        );
        sqlx::query_as::<_, UserProfile>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list available workers: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn push_token(&self, uid: &str) -> Result<Option<String>> {
        let token = sqlx::query_scalar::<_, Option<String>>(
            "SELECT fcm_token FROM user_profiles WHERE uid = $1",
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up push token for {}: {:?}", uid, e);
            AppError::Database(e)
        })?;

        Ok(token.flatten().filter(|t| !t.is_empty()))
    }

    async fn set_role(&self, uid: &str, role: UserRole) -> Result<()> {
        let is_available = role == UserRole::Worker;
        sqlx::query(
            r#"
            INSERT INTO user_profiles (uid, role, is_available)
            VALUES ($1, $2, $3)
            ON CONFLICT (uid) DO UPDATE
            SET role = EXCLUDED.role, is_available = EXCLUDED.is_available
            "#,
        )
        .bind(uid)
        .bind(role)
        .bind(is_available)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to set role for {}: {:?}", uid, e);
            AppError::Database(e)
        })?;

        Ok(())
    }

    async fn set_push_token(&self, uid: &str, token: &str, now: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_profiles (uid, fcm_token, last_active)
            VALUES ($1, $2, $3)
            ON CONFLICT (uid) DO UPDATE
            SET fcm_token = EXCLUDED.fcm_token, last_active = EXCLUDED.last_active
            "#,
        )
        .bind(uid)
        .bind(token)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to store push token for {}: {:?}", uid, e);
            AppError::Database(e)
        })?;

        Ok(())
    }

    async fn set_availability(&self, uid: &str, available: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE user_profiles SET is_available = $2 WHERE uid = $1")
            .bind(uid)
            .bind(available)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to set availability for {}: {:?}", uid, e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}

/// Load the caller's stored profile and require `role = admin`
pub async fn require_admin(
    directory: &dyn UserDirectory,
    uid: &str,
    action: &str,
) -> Result<UserProfile> {
    match directory.get_profile(uid).await? {
        Some(profile) if profile.is_admin() => Ok(profile),
        _ => {
            tracing::warn!("User {} attempted to {} without admin role", uid, action);
            Err(AppError::Forbidden(format!("Only Admin users can {}.", action)))
        }
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::notifications::models::TransitionKind;

/// Record of (report, transition) pairs whose notifications were dispatched
#[async_trait]
pub trait DeliveryLedger: Send + Sync {
    /// Returns true when this call created the entry, false when it already existed
    async fn claim(&self, report_id: Uuid, kind: TransitionKind, now: DateTime<Utc>)
        -> Result<bool>;
}

pub struct PgDeliveryLedger {
    pool: PgPool,
}

impl PgDeliveryLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeliveryLedger for PgDeliveryLedger {
    async fn claim(
        &self,
        report_id: Uuid,
        kind: TransitionKind,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO notification_ledger (report_id, transition_kind, delivered_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (report_id, transition_kind) DO NOTHING
            "#,
        )
        .bind(report_id)
        .bind(kind.as_str())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(
                "Failed to claim ledger entry ({}, {}): {:?}",
                report_id,
                kind,
                e
            );
            AppError::Database(e)
        })?;

        Ok(result.rows_affected() == 1)
    }
}

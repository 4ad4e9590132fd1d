use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::ReportStore;
use crate::core::error::{AppError, Result};
use crate::features::reports::models::{
    Report, ReportChange, ReportGuard, ReportPatch, ReportStatus, UpdateOutcome,
};

const REPORT_COLUMNS: &str = r#"
    id, user_id, latitude, longitude, description, image_url,
    status, priority, category,
    assigned_to_id, resolved_at, worker_notes,
    created_at, updated_at
"#;

/// Postgres-backed report store
pub struct PgReportStore {
    pool: PgPool,
}

impl PgReportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn list_where(&self, clause: &str, bind: Option<&str>) -> Result<Vec<Report>> {
        let sql = format!(
            "SELECT {} FROM reports {} ORDER BY created_at DESC",
            REPORT_COLUMNS, clause
        );
        let mut query = sqlx::query_as::<_, Report>(&sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }

        query.fetch_all(&self.pool).await.map_err(|e| {
            tracing::error!("Failed to list reports: {:?}", e);
            AppError::Database(e)
        })
    }
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn insert(&self, report: &Report) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reports (
                id, user_id, latitude, longitude, description, image_url,
                status, priority, category,
                assigned_to_id, resolved_at, worker_notes,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(report.id)
        .bind(&report.user_id)
        .bind(report.latitude)
        .bind(report.longitude)
        .bind(&report.description)
        .bind(&report.image_url)
        .bind(report.status)
        .bind(report.priority.value() as i16)
        .bind(report.category)
        .bind(&report.assigned_to_id)
        .bind(report.resolved_at)
        .bind(&report.worker_notes)
        .bind(report.created_at)
        .bind(report.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert report: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Report>> {
        let sql = format!("SELECT {} FROM reports WHERE id = $1", REPORT_COLUMNS);
        sqlx::query_as::<_, Report>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get report: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn update_if(
        &self,
        id: Uuid,
        guard: &ReportGuard,
        patch: &ReportPatch,
        now: DateTime<Utc>,
    ) -> Result<UpdateOutcome> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin report transaction: {:?}", e);
            AppError::Database(e)
        })?;

        // Row lock: concurrent guarded updates on the same report queue here
        let sql = format!(
            "SELECT {} FROM reports WHERE id = $1 FOR UPDATE",
            REPORT_COLUMNS
        );
        let current = sqlx::query_as::<_, Report>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to lock report {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        let Some(current) = current else {
            return Ok(UpdateOutcome::NotFound);
        };

        if let Err(violation) = guard.check(&current, patch) {
            return Ok(UpdateOutcome::Rejected { violation, current });
        }

        let next = patch.apply(&current, now);

        sqlx::query(
            r#"
            UPDATE reports
            SET status = $2, assigned_to_id = $3, resolved_at = $4,
                worker_notes = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(next.status)
        .bind(&next.assigned_to_id)
        .bind(next.resolved_at)
        .bind(&next.worker_notes)
        .bind(next.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update report {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit report {} update: {:?}", id, e);
            AppError::Database(e)
        })?;

        Ok(UpdateOutcome::Applied(ReportChange {
            before: current,
            after: next,
        }))
    }

    async fn count(&self, status: Option<ReportStatus>) -> Result<i64> {
        let query = match status {
            Some(status) => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reports WHERE status = $1")
                    .bind(status)
            }
            None => sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reports"),
        };

        query.fetch_one(&self.pool).await.map_err(|e| {
            tracing::error!("Failed to count reports: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn list_all(&self) -> Result<Vec<Report>> {
        self.list_where("", None).await
    }

    async fn list_by_submitter(&self, user_id: &str) -> Result<Vec<Report>> {
        self.list_where("WHERE user_id = $1", Some(user_id)).await
    }

    async fn list_by_assignee(&self, worker_uid: &str) -> Result<Vec<Report>> {
        self.list_where("WHERE assigned_to_id = $1", Some(worker_uid))
            .await
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::analytics::models::{KpiSummary, MonthlyReport};
use crate::shared::constants::KPI_SUMMARY_ID;

/// Storage for derived KPI documents
#[async_trait]
pub trait KpiStore: Send + Sync {
    /// Merge-write of the recomputed counters into the summary record.
    /// Fields not passed here keep their stored values.
    async fn upsert_summary(
        &self,
        total: i64,
        resolved: i64,
        rate: Decimal,
        now: DateTime<Utc>,
    ) -> Result<()>;

    async fn get_summary(&self) -> Result<Option<KpiSummary>>;

    async fn upsert_monthly(&self, report: &MonthlyReport) -> Result<()>;

    async fn get_monthly(&self, period: i32) -> Result<Option<MonthlyReport>>;
}

pub struct PgKpiStore {
    pool: PgPool,
}

impl PgKpiStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KpiStore for PgKpiStore {
    async fn upsert_summary(
        &self,
        total: i64,
        resolved: i64,
        rate: Decimal,
        now: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kpi_summaries (id, total_reports, total_resolved, resolution_rate, last_updated)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET total_reports = EXCLUDED.total_reports,
                total_resolved = EXCLUDED.total_resolved,
                resolution_rate = EXCLUDED.resolution_rate,
                last_updated = EXCLUDED.last_updated
            "#,
        )
        .bind(KPI_SUMMARY_ID)
        .bind(total)
        .bind(resolved)
        .bind(rate)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to write KPI summary: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(())
    }

    async fn get_summary(&self) -> Result<Option<KpiSummary>> {
        sqlx::query_as::<_, KpiSummary>(
            r#"
            SELECT id, total_reports, total_resolved, resolution_rate,
                   avg_cycle_time_hours, active_worker_count, last_updated
            FROM kpi_summaries
            WHERE id = $1
            "#,
        )
        .bind(KPI_SUMMARY_ID)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn upsert_monthly(&self, report: &MonthlyReport) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kpi_monthly_reports
                (id, period, reports_submitted, reports_resolved, category_counts, avg_priority, last_updated)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE
            SET reports_submitted = EXCLUDED.reports_submitted,
                reports_resolved = EXCLUDED.reports_resolved,
                category_counts = EXCLUDED.category_counts,
                avg_priority = EXCLUDED.avg_priority,
                last_updated = EXCLUDED.last_updated
            "#,
        )
        .bind(&report.id)
        .bind(report.period)
        .bind(report.reports_submitted)
        .bind(report.reports_resolved)
        .bind(&report.category_counts)
        .bind(report.avg_priority)
        .bind(report.last_updated)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to write monthly report {}: {:?}", report.id, e);
            AppError::Database(e)
        })?;

        Ok(())
    }

    async fn get_monthly(&self, period: i32) -> Result<Option<MonthlyReport>> {
        sqlx::query_as::<_, MonthlyReport>(
            r#"
            SELECT id, period, reports_submitted, reports_resolved,
                   category_counts, avg_priority, last_updated
            FROM kpi_monthly_reports
            WHERE period = $1
            "#,
        )
        .bind(period)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)
    }
}

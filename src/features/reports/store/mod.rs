//! Report persistence seam.
//!
//! The lifecycle only needs create/read, guarded single-row updates and the
//! scans used by the aggregator. Every write is atomic per report; no
//! operation spans more than one report.

mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::reports::models::{
    Report, ReportGuard, ReportPatch, ReportStatus, UpdateOutcome,
};

pub use postgres::PgReportStore;

#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn insert(&self, report: &Report) -> Result<()>;

    async fn get(&self, id: Uuid) -> Result<Option<Report>>;

    /// Evaluate `guard` against the current row and apply `patch` in the same
    /// atomic step. Concurrent writers to the same report are serialized.
    async fn update_if(
        &self,
        id: Uuid,
        guard: &ReportGuard,
        patch: &ReportPatch,
        now: DateTime<Utc>,
    ) -> Result<UpdateOutcome>;

    /// Number of reports, optionally restricted to one status
    async fn count(&self, status: Option<ReportStatus>) -> Result<i64>;

    async fn list_all(&self) -> Result<Vec<Report>>;

    async fn list_by_submitter(&self, user_id: &str) -> Result<Vec<Report>>;

    async fn list_by_assignee(&self, worker_uid: &str) -> Result<Vec<Report>>;
}

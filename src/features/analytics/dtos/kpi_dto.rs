use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::analytics::models::{KpiSummary, MonthlyReport};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KpiSummaryDto {
    pub total_reports: i64,
    pub total_resolved: i64,
    /// Percentage with two decimals
    pub resolution_rate: f64,
    pub avg_cycle_time_hours: Option<f64>,
    pub active_worker_count: Option<i64>,
    pub last_updated: DateTime<Utc>,
}

impl From<KpiSummary> for KpiSummaryDto {
    fn from(summary: KpiSummary) -> Self {
        Self {
            total_reports: summary.total_reports,
            total_resolved: summary.total_resolved,
            resolution_rate: summary.resolution_rate.to_f64().unwrap_or_default(),
            avg_cycle_time_hours: summary.avg_cycle_time_hours.and_then(|d| d.to_f64()),
            active_worker_count: summary.active_worker_count,
            last_updated: summary.last_updated,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MonthlyReportDto {
    pub id: String,
    /// `YYYYMM`
    pub period: i32,
    pub reports_submitted: i64,
    pub reports_resolved: i64,
    /// Submitted reports per category label
    pub category_counts: BTreeMap<String, i64>,
    pub avg_priority: f64,
    pub last_updated: DateTime<Utc>,
}

impl From<MonthlyReport> for MonthlyReportDto {
    fn from(report: MonthlyReport) -> Self {
        Self {
            id: report.id,
            period: report.period,
            reports_submitted: report.reports_submitted,
            reports_resolved: report.reports_resolved,
            category_counts: report.category_counts.0,
            avg_priority: report.avg_priority.to_f64().unwrap_or_default(),
            last_updated: report.last_updated,
        }
    }
}

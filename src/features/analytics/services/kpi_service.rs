use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::analytics::models::{monthly_reports, resolution_rate, KpiSummary, MonthlyReport};
use crate::features::analytics::store::KpiStore;
use crate::features::reports::models::ReportStatus;
use crate::features::reports::store::ReportStore;
use crate::shared::clock::Clock;

/// Full recomputation of KPI documents from the current report set
pub struct KpiService {
    reports: Arc<dyn ReportStore>,
    kpis: Arc<dyn KpiStore>,
    clock: Arc<dyn Clock>,
}

impl KpiService {
    pub fn new(reports: Arc<dyn ReportStore>, kpis: Arc<dyn KpiStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            reports,
            kpis,
            clock,
        }
    }

    pub async fn recompute_summary(&self) -> Result<()> {
        let resolved = self.reports.count(Some(ReportStatus::Resolved)).await?;
        let total = self.reports.count(None).await?;
        let rate = resolution_rate(total, resolved);

        self.kpis
            .upsert_summary(total, resolved, rate, self.clock.now())
            .await?;

        tracing::info!(
            "KPI summary updated: total={}, resolved={}, rate={}%",
            total,
            resolved,
            rate
        );
        Ok(())
    }

    /// Returns the number of periods written
    pub async fn recompute_monthly(&self) -> Result<usize> {
        let reports = self.reports.list_all().await?;
        let monthly = monthly_reports(&reports, self.clock.now());

        for report in &monthly {
            self.kpis.upsert_monthly(report).await?;
        }

        tracing::info!("Monthly KPI reports updated for {} period(s)", monthly.len());
        Ok(monthly.len())
    }

    pub async fn get_summary(&self) -> Result<KpiSummary> {
        self.kpis
            .get_summary()
            .await?
            .ok_or_else(|| AppError::NotFound("KPI summary has not been computed yet".to_string()))
    }

    pub async fn get_monthly(&self, period: i32) -> Result<MonthlyReport> {
        let month = period % 100;
        if !(190001..=999912).contains(&period) || !(1..=12).contains(&month) {
            return Err(AppError::Validation(
                "Period must be formatted as YYYYMM".to_string(),
            ));
        }

        self.kpis
            .get_monthly(period)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No monthly report for {}", period)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{
        fixed_now, sample_report, FixedClock, MemoryKpiStore, MemoryReportStore,
    };
    use rust_decimal::Decimal;

    fn service(store: Arc<MemoryReportStore>, kpis: Arc<MemoryKpiStore>) -> KpiService {
        KpiService::new(store, kpis, Arc::new(FixedClock(fixed_now())))
    }

    fn seed(store: &MemoryReportStore, total: usize, resolved: usize) {
        for i in 0..total {
            let mut report = sample_report("citizen-1");
            if i < resolved {
                report.status = ReportStatus::Resolved;
                report.assigned_to_id = Some("worker-1".into());
                report.resolved_at = Some(fixed_now());
            }
            store.put(report);
        }
    }

    #[tokio::test]
    async fn test_summary_for_ten_reports_four_resolved() {
        let store = Arc::new(MemoryReportStore::default());
        let kpis = Arc::new(MemoryKpiStore::default());
        seed(&store, 10, 4);

        let service = service(store, kpis);
        service.recompute_summary().await.unwrap();

        let summary = service.get_summary().await.unwrap();
        assert_eq!(summary.total_reports, 10);
        assert_eq!(summary.total_resolved, 4);
        assert_eq!(summary.resolution_rate, Decimal::new(4000, 2));
        assert_eq!(summary.last_updated, fixed_now());
    }

    #[tokio::test]
    async fn test_summary_for_empty_store() {
        let service = service(
            Arc::new(MemoryReportStore::default()),
            Arc::new(MemoryKpiStore::default()),
        );
        service.recompute_summary().await.unwrap();

        let summary = service.get_summary().await.unwrap();
        assert_eq!(summary.total_reports, 0);
        assert_eq!(summary.resolution_rate, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_recompute_preserves_untouched_fields() {
        let store = Arc::new(MemoryReportStore::default());
        let kpis = Arc::new(MemoryKpiStore::default());
        kpis.set_extra_fields(Some(Decimal::new(125, 1)), Some(7));
        seed(&store, 2, 1);

        let service = service(store, kpis);
        service.recompute_summary().await.unwrap();

        let summary = service.get_summary().await.unwrap();
        assert_eq!(summary.avg_cycle_time_hours, Some(Decimal::new(125, 1)));
        assert_eq!(summary.active_worker_count, Some(7));
        assert_eq!(summary.resolution_rate, Decimal::new(5000, 2));
    }

    #[tokio::test]
    async fn test_recompute_monthly_upserts_each_period() {
        let store = Arc::new(MemoryReportStore::default());
        let kpis = Arc::new(MemoryKpiStore::default());
        seed(&store, 3, 1);

        let service = service(store, kpis);
        assert_eq!(service.recompute_monthly().await.unwrap(), 1);

        let march = service.get_monthly(202503).await.unwrap();
        assert_eq!(march.id, "monthly_report_202503");
        assert_eq!(march.reports_submitted, 3);
        assert_eq!(march.reports_resolved, 1);
    }

    #[tokio::test]
    async fn test_get_before_compute_and_bad_period() {
        let service = service(
            Arc::new(MemoryReportStore::default()),
            Arc::new(MemoryKpiStore::default()),
        );

        assert!(matches!(service.get_summary().await, Err(AppError::NotFound(_))));
        assert!(matches!(service.get_monthly(202502).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.get_monthly(202513).await, Err(AppError::Validation(_))));
        assert!(matches!(service.get_monthly(25).await, Err(AppError::Validation(_))));
    }
}

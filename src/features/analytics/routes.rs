use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::analytics::handlers;
use crate::features::analytics::services::KpiService;

pub fn routes(service: Arc<KpiService>) -> Router {
    Router::new()
        .route("/api/kpi/summary", get(handlers::get_summary))
        .route("/api/kpi/monthly/{period}", get(handlers::get_monthly))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::Value;

    use crate::features::reports::models::ReportStatus;
    use crate::shared::test_helpers::{
        fixed_now, sample_report, FixedClock, MemoryKpiStore, MemoryReportStore,
    };

    #[tokio::test]
    async fn test_summary_endpoint_after_recompute() {
        let store = Arc::new(MemoryReportStore::default());
        for i in 0..10 {
            let mut report = sample_report("citizen-1");
            if i < 4 {
                report.status = ReportStatus::Resolved;
                report.assigned_to_id = Some("worker-1".into());
                report.resolved_at = Some(fixed_now());
            }
            store.put(report);
        }
        let service = Arc::new(KpiService::new(
            store,
            Arc::new(MemoryKpiStore::default()),
            Arc::new(FixedClock(fixed_now())),
        ));
        service.recompute_summary().await.unwrap();
        let server = TestServer::new(routes(service)).unwrap();

        let response = server.get("/api/kpi/summary").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["total_reports"], 10);
        assert_eq!(body["data"]["total_resolved"], 4);
        assert_eq!(body["data"]["resolution_rate"], 40.0);
    }

    #[tokio::test]
    async fn test_monthly_endpoint_errors() {
        let service = Arc::new(KpiService::new(
            Arc::new(MemoryReportStore::default()),
            Arc::new(MemoryKpiStore::default()),
            Arc::new(FixedClock(fixed_now())),
        ));
        let server = TestServer::new(routes(service)).unwrap();

        server
            .get("/api/kpi/monthly/202503")
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .get("/api/kpi/monthly/202599")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}

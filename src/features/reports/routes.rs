use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::reports::handlers;
use crate::features::reports::services::ReportService;

/// Create routes for the reports feature.
///
/// Authentication is resolved per handler; the optional auth middleware is
/// applied by the caller.
pub fn routes(service: Arc<ReportService>) -> Router {
    Router::new()
        .route(
            "/api/reports",
            post(handlers::submit_report).get(handlers::list_my_reports),
        )
        .route("/api/reports/{id}", get(handlers::get_report))
        .route("/api/tasks", get(handlers::list_tasks))
        .route(
            "/api/tasks/{task_id}/status",
            post(handlers::update_task_status),
        )
        .route(
            "/api/admin/reports/{id}/assign",
            post(handlers::assign_report),
        )
        .route(
            "/api/admin/reports/{id}/reject",
            post(handlers::reject_report),
        )
        .with_state(service)
}

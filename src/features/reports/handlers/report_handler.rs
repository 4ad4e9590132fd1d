use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::{AppJson, DeferredJson};
use crate::features::auth::model::{caller_uid, require_uid, AuthenticatedUser};
use crate::features::reports::dtos::{
    AssignReportDto, ReportResponseDto, SubmitReportDto, SubmitReportResponseDto,
    UpdateTaskStatusDto,
};
use crate::features::reports::services::ReportService;
use crate::shared::constants::{LOGIN_REQUIRED, SUBMIT_LOGIN_REQUIRED, WORKER_LOGIN_REQUIRED};
use crate::shared::types::{ApiResponse, Meta, StatusResponse};
use crate::shared::validation::validate_dto;

/// Submit a new sanitation report
#[utoipa::path(
    post,
    path = "/api/reports",
    request_body = SubmitReportDto,
    responses(
        (status = 200, description = "Report submitted and prioritized", body = ApiResponse<SubmitReportResponseDto>),
        (status = 400, description = "Missing description or image URL"),
        (status = 401, description = "Unauthenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn submit_report(
    user: Option<AuthenticatedUser>,
    State(service): State<Arc<ReportService>>,
    body: DeferredJson<SubmitReportDto>,
) -> Result<Json<ApiResponse<SubmitReportResponseDto>>> {
    let caller = require_uid(caller_uid(&user), SUBMIT_LOGIN_REQUIRED)?;
    let AppJson(dto) = body?;
    validate_dto(&dto)?;

    let report = service.submit_report(Some(caller), dto.into()).await?;

    Ok(Json(ApiResponse::success(
        Some(SubmitReportResponseDto {
            report_id: report.id,
        }),
        Some("Report submitted and prioritized successfully.".to_string()),
        None,
    )))
}

/// List reports submitted by the caller
#[utoipa::path(
    get,
    path = "/api/reports",
    responses(
        (status = 200, description = "Caller's reports, newest first", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 401, description = "Unauthenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn list_my_reports(
    user: Option<AuthenticatedUser>,
    State(service): State<Arc<ReportService>>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let reports = service.list_mine(caller_uid(&user)).await?;
    let total = reports.len() as i64;
    let dtos: Vec<ReportResponseDto> = reports.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, Some(Meta { total }))))
}

/// Get a report visible to the caller
#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    params(
        ("id" = String, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report found", body = ApiResponse<ReportResponseDto>),
        (status = 401, description = "Unauthenticated"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn get_report(
    user: Option<AuthenticatedUser>,
    State(service): State<Arc<ReportService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = service.get_report(caller_uid(&user), &id).await?;
    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}

/// Move an assigned task to `in-progress` or `resolved`
#[utoipa::path(
    post,
    path = "/api/tasks/{task_id}/status",
    params(
        ("task_id" = String, Path, description = "Report ID of the task")
    ),
    request_body = UpdateTaskStatusDto,
    responses(
        (status = 200, description = "Task updated", body = StatusResponse),
        (status = 400, description = "Invalid task ID or status"),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Caller is not the assigned worker"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "tasks"
)]
pub async fn update_task_status(
    user: Option<AuthenticatedUser>,
    State(service): State<Arc<ReportService>>,
    Path(task_id): Path<String>,
    body: DeferredJson<UpdateTaskStatusDto>,
) -> Result<Json<StatusResponse>> {
    let caller = require_uid(caller_uid(&user), WORKER_LOGIN_REQUIRED)?;
    let AppJson(dto) = body?;
    validate_dto(&dto)?;

    let report = service
        .update_task_status(Some(caller), &task_id, dto.new_status, dto.worker_notes)
        .await?;

    Ok(Json(StatusResponse::success(format!(
        "Task {} successfully.",
        report.status
    ))))
}

/// List tasks assigned to the calling worker
#[utoipa::path(
    get,
    path = "/api/tasks",
    responses(
        (status = 200, description = "Assigned tasks", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 401, description = "Unauthenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "tasks"
)]
pub async fn list_tasks(
    user: Option<AuthenticatedUser>,
    State(service): State<Arc<ReportService>>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let reports = service.list_tasks(caller_uid(&user)).await?;
    let total = reports.len() as i64;
    let dtos: Vec<ReportResponseDto> = reports.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, Some(Meta { total }))))
}

/// Assign a pending report to a worker (admin only)
#[utoipa::path(
    post,
    path = "/api/admin/reports/{id}/assign",
    params(
        ("id" = String, Path, description = "Report ID")
    ),
    request_body = AssignReportDto,
    responses(
        (status = 200, description = "Report assigned", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Target is not a worker or report already assigned"),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn assign_report(
    user: Option<AuthenticatedUser>,
    State(service): State<Arc<ReportService>>,
    Path(id): Path<String>,
    body: DeferredJson<AssignReportDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let caller = require_uid(caller_uid(&user), LOGIN_REQUIRED)?;
    let AppJson(dto) = body?;
    validate_dto(&dto)?;

    let report = service
        .assign_report(Some(caller), &id, &dto.worker_uid)
        .await?;

    Ok(Json(ApiResponse::success(
        Some(report.into()),
        Some("Report assigned successfully.".to_string()),
        None,
    )))
}

/// Reject a report that has not reached a terminal state (admin only)
#[utoipa::path(
    post,
    path = "/api/admin/reports/{id}/reject",
    params(
        ("id" = String, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report rejected", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Report already resolved or rejected"),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn reject_report(
    user: Option<AuthenticatedUser>,
    State(service): State<Arc<ReportService>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = service.reject_report(caller_uid(&user), &id).await?;

    Ok(Json(ApiResponse::success(
        Some(report.into()),
        Some("Report rejected.".to_string()),
        None,
    )))
}

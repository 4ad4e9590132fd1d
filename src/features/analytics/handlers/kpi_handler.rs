use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::core::error::Result;
use crate::features::analytics::dtos::{KpiSummaryDto, MonthlyReportDto};
use crate::features::analytics::services::KpiService;
use crate::shared::types::ApiResponse;

/// Latest overall KPI summary
#[utoipa::path(
    get,
    path = "/api/kpi/summary",
    responses(
        (status = 200, description = "KPI summary", body = ApiResponse<KpiSummaryDto>),
        (status = 404, description = "Not computed yet")
    ),
    tag = "kpi"
)]
pub async fn get_summary(
    State(service): State<Arc<KpiService>>,
) -> Result<Json<ApiResponse<KpiSummaryDto>>> {
    let summary = service.get_summary().await?;
    Ok(Json(ApiResponse::success(Some(summary.into()), None, None)))
}

/// Monthly KPI report for a `YYYYMM` period
#[utoipa::path(
    get,
    path = "/api/kpi/monthly/{period}",
    params(
        ("period" = i32, Path, description = "Period as YYYYMM")
    ),
    responses(
        (status = 200, description = "Monthly report", body = ApiResponse<MonthlyReportDto>),
        (status = 400, description = "Malformed period"),
        (status = 404, description = "No report for this period")
    ),
    tag = "kpi"
)]
pub async fn get_monthly(
    State(service): State<Arc<KpiService>>,
    Path(period): Path<i32>,
) -> Result<Json<ApiResponse<MonthlyReportDto>>> {
    let report = service.get_monthly(period).await?;
    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}

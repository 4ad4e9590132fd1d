use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::analytics::{dtos as analytics_dtos, handlers as analytics_handlers};
use crate::features::reports::{
    dtos as reports_dtos, handlers as reports_handlers, models as reports_models,
};
use crate::features::users::{
    dtos as users_dtos, handlers as users_handlers, models as users_models,
};
use crate::shared::types::{ApiResponse, Meta, StatusResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Reports
        reports_handlers::submit_report,
        reports_handlers::list_my_reports,
        reports_handlers::get_report,
        // Worker tasks
        reports_handlers::list_tasks,
        reports_handlers::update_task_status,
        // Admin
        reports_handlers::assign_report,
        reports_handlers::reject_report,
        users_handlers::assign_role,
        // Users
        users_handlers::register_push_token,
        users_handlers::set_availability,
        // KPI (public)
        analytics_handlers::get_summary,
        analytics_handlers::get_monthly,
    ),
    components(
        schemas(
            // Shared
            Meta,
            StatusResponse,
            // Reports
            reports_models::ReportStatus,
            reports_models::ReportCategory,
            reports_models::Priority,
            reports_dtos::SubmitReportDto,
            reports_dtos::SubmitReportResponseDto,
            reports_dtos::UpdateTaskStatusDto,
            reports_dtos::AssignReportDto,
            reports_dtos::ReportResponseDto,
            ApiResponse<reports_dtos::SubmitReportResponseDto>,
            ApiResponse<reports_dtos::ReportResponseDto>,
            ApiResponse<Vec<reports_dtos::ReportResponseDto>>,
            // Users
            users_models::UserRole,
            users_dtos::AssignRoleDto,
            users_dtos::RegisterPushTokenDto,
            users_dtos::SetAvailabilityDto,
            // KPI
            analytics_dtos::KpiSummaryDto,
            analytics_dtos::MonthlyReportDto,
            ApiResponse<analytics_dtos::KpiSummaryDto>,
            ApiResponse<analytics_dtos::MonthlyReportDto>,
        )
    ),
    tags(
        (name = "reports", description = "Citizen report intake"),
        (name = "tasks", description = "Worker task list and status updates"),
        (name = "admin", description = "Assignment and rejection (stored admin role only)"),
        (name = "users", description = "Roles, push tokens and worker availability"),
        (name = "kpi", description = "Aggregated KPI documents (public)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Sanitation Dispatch API",
        version = "0.1.0",
        description = "Report lifecycle, dispatch notifications and KPIs",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

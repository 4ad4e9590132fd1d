use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::core::extractor::{AppJson, DeferredJson};
use crate::features::auth::model::{caller_uid, require_uid, AuthenticatedUser};
use crate::features::users::dtos::{AssignRoleDto, RegisterPushTokenDto, SetAvailabilityDto};
use crate::features::users::services::UserService;
use crate::shared::constants::{AUTHENTICATION_REQUIRED, LOGIN_REQUIRED};
use crate::shared::types::{ApiResponse, StatusResponse};
use crate::shared::validation::validate_dto;

/// Grant the `worker` or `admin` role to a user
#[utoipa::path(
    post,
    path = "/api/admin/roles",
    request_body = AssignRoleDto,
    responses(
        (status = 200, description = "Role assigned", body = StatusResponse),
        (status = 400, description = "Missing field or unsupported role"),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn assign_role(
    user: Option<AuthenticatedUser>,
    State(service): State<Arc<UserService>>,
    body: DeferredJson<AssignRoleDto>,
) -> Result<Json<StatusResponse>> {
    let caller = require_uid(caller_uid(&user), LOGIN_REQUIRED)?;
    let AppJson(dto) = body?;
    validate_dto(&dto)?;

    let role = service
        .assign_role(
            Some(caller),
            dto.target_uid.as_deref(),
            dto.role.as_deref(),
        )
        .await?;

    Ok(Json(StatusResponse::success(format!(
        "Role successfully set to {}.",
        role
    ))))
}

/// Register the caller's device token for push notifications
#[utoipa::path(
    put,
    path = "/api/users/me/push-token",
    request_body = RegisterPushTokenDto,
    responses(
        (status = 200, description = "Token stored"),
        (status = 401, description = "Unauthenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn register_push_token(
    user: Option<AuthenticatedUser>,
    State(service): State<Arc<UserService>>,
    body: DeferredJson<RegisterPushTokenDto>,
) -> Result<Json<ApiResponse<()>>> {
    let caller = require_uid(caller_uid(&user), AUTHENTICATION_REQUIRED)?;
    let AppJson(dto) = body?;
    validate_dto(&dto)?;

    service.register_push_token(Some(caller), &dto.fcm_token).await?;

    Ok(Json(ApiResponse::success(
        None,
        Some("Push token registered".to_string()),
        None,
    )))
}

/// Toggle whether the calling worker receives new-task alerts
#[utoipa::path(
    put,
    path = "/api/users/me/availability",
    request_body = SetAvailabilityDto,
    responses(
        (status = 200, description = "Availability updated"),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Caller is not a worker")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn set_availability(
    user: Option<AuthenticatedUser>,
    State(service): State<Arc<UserService>>,
    body: DeferredJson<SetAvailabilityDto>,
) -> Result<Json<ApiResponse<()>>> {
    let caller = require_uid(caller_uid(&user), AUTHENTICATION_REQUIRED)?;
    let AppJson(dto) = body?;

    service.set_availability(Some(caller), dto.is_available).await?;

    Ok(Json(ApiResponse::success(
        None,
        Some("Availability updated".to_string()),
        None,
    )))
}

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request DTO for role assignment.
///
/// Both fields are optional in JSON so a missing one surfaces as
/// "Missing required field" rather than a body parse error.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AssignRoleDto {
    #[validate(regex(
        path = "*crate::shared::validation::UID_REGEX",
        message = "Target uid is not a valid user id"
    ))]
    pub target_uid: Option<String>,

    /// `worker` or `admin`
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterPushTokenDto {
    #[validate(length(min = 1, max = 4096, message = "Push token must be 1-4096 characters"))]
    pub fcm_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SetAvailabilityDto {
    pub is_available: bool,
}

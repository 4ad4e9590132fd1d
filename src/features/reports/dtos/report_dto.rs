use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::reports::models::{Report, ReportCategory, ReportStatus};
use crate::features::reports::services::ReportSubmission;

/// Request DTO for submitting a report.
///
/// `description` and `image_url` are optional at the JSON level so that a
/// missing field is reported as an invalid argument by the service.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SubmitReportDto {
    #[validate(length(max = 5000, message = "Description must not exceed 5000 characters"))]
    pub description: Option<String>,

    #[validate(length(max = 2048, message = "Image URL must not exceed 2048 characters"))]
    pub image_url: Option<String>,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: f64,
}

impl From<SubmitReportDto> for ReportSubmission {
    fn from(dto: SubmitReportDto) -> Self {
        Self {
            description: dto.description,
            image_url: dto.image_url,
            latitude: dto.latitude,
            longitude: dto.longitude,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitReportResponseDto {
    pub report_id: Uuid,
}

/// Request DTO for a worker status update
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateTaskStatusDto {
    /// `in-progress` or `resolved`
    pub new_status: ReportStatus,

    #[validate(length(max = 2000, message = "Worker notes must not exceed 2000 characters"))]
    pub worker_notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AssignReportDto {
    #[validate(regex(
        path = "*crate::shared::validation::UID_REGEX",
        message = "Worker uid is not a valid user id"
    ))]
    pub worker_uid: String,
}

/// Response DTO for report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportResponseDto {
    pub id: Uuid,
    pub user_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
    pub image_url: String,
    pub status: ReportStatus,
    /// 1 (low) to 5 (critical)
    pub priority: u8,
    pub category: ReportCategory,
    pub assigned_to_id: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub worker_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Report> for ReportResponseDto {
    fn from(r: Report) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            latitude: r.latitude,
            longitude: r.longitude,
            description: r.description,
            image_url: r.image_url,
            status: r.status,
            priority: r.priority.value(),
            category: r.category,
            assigned_to_id: r.assigned_to_id,
            resolved_at: r.resolved_at,
            worker_notes: r.worker_notes,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_dto_rejects_out_of_range_coordinates() {
        let dto = SubmitReportDto {
            description: Some("Overflowing bins".to_string()),
            image_url: Some("https://cdn.example.com/a.jpg".to_string()),
            latitude: 91.0,
            longitude: 0.0,
        };
        assert!(dto.validate().is_err());

        let dto = SubmitReportDto {
            latitude: -33.86,
            longitude: 151.2,
            ..dto
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_assign_dto_rejects_malformed_uid() {
        let dto = AssignReportDto {
            worker_uid: "worker 1".to_string(),
        };
        assert!(dto.validate().is_err());
    }
}

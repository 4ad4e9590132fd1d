use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::shared::constants::HIGH_PRIORITY_THRESHOLD;

/// Report status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "report_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ReportStatus {
    Pending,
    Assigned,
    InProgress,
    Resolved,
    Rejected,
}

impl ReportStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ReportStatus::Resolved | ReportStatus::Rejected)
    }

    /// Allowed lifecycle edges. A repeated `in-progress` is accepted so a worker
    /// can re-send it, e.g. to update notes.
    pub fn can_transition_to(self, target: ReportStatus) -> bool {
        use ReportStatus::*;
        matches!(
            (self, target),
            (Pending, Assigned)
                | (Pending, Rejected)
                | (Assigned, InProgress)
                | (Assigned, Resolved)
                | (Assigned, Rejected)
                | (InProgress, InProgress)
                | (InProgress, Resolved)
                | (InProgress, Rejected)
        )
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportStatus::Pending => write!(f, "pending"),
            ReportStatus::Assigned => write!(f, "assigned"),
            ReportStatus::InProgress => write!(f, "in-progress"),
            ReportStatus::Resolved => write!(f, "resolved"),
            ReportStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Fixed category vocabulary assigned by the classifier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema, JsonSchema,
)]
#[sqlx(type_name = "report_category")]
pub enum ReportCategory {
    #[serde(rename = "Waste Collection")]
    #[sqlx(rename = "Waste Collection")]
    WasteCollection,
    #[serde(rename = "Illegal Dumping")]
    #[sqlx(rename = "Illegal Dumping")]
    IllegalDumping,
    #[serde(rename = "Broken Infrastructure")]
    #[sqlx(rename = "Broken Infrastructure")]
    BrokenInfrastructure,
    #[serde(rename = "Emergency Cleanup")]
    #[sqlx(rename = "Emergency Cleanup")]
    EmergencyCleanup,
    #[serde(rename = "Other")]
    #[sqlx(rename = "Other")]
    Other,
}

impl ReportCategory {
    pub const ALL: [ReportCategory; 5] = [
        ReportCategory::WasteCollection,
        ReportCategory::IllegalDumping,
        ReportCategory::BrokenInfrastructure,
        ReportCategory::EmergencyCleanup,
        ReportCategory::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ReportCategory::WasteCollection => "Waste Collection",
            ReportCategory::IllegalDumping => "Illegal Dumping",
            ReportCategory::BrokenInfrastructure => "Broken Infrastructure",
            ReportCategory::EmergencyCleanup => "Emergency Cleanup",
            ReportCategory::Other => "Other",
        }
    }

    /// Exact (case-sensitive) match against the vocabulary
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl std::fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Priority score, always within 1 (low) ..= 5 (critical)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(try_from = "i64", into = "i64")]
pub struct Priority(u8);

impl Priority {
    pub const MIN: Priority = Priority(1);
    pub const MAX: Priority = Priority(5);

    pub fn new(value: i64) -> Option<Self> {
        (1..=5).contains(&value).then_some(Priority(value as u8))
    }

    /// Round to the nearest integer, then clamp into range
    pub fn from_score(score: f64) -> Self {
        if score.is_nan() {
            return Self::MIN;
        }
        let rounded = score.round().clamp(1.0, 5.0);
        Priority(rounded as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// High-priority reports alert every available worker on creation
    pub fn is_high(self) -> bool {
        self.0 >= HIGH_PRIORITY_THRESHOLD
    }
}

impl TryFrom<i64> for Priority {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Priority::new(value).ok_or_else(|| format!("priority {} is outside 1..=5", value))
    }
}

impl TryFrom<i16> for Priority {
    type Error = String;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Priority::try_from(value as i64)
    }
}

impl From<Priority> for i64 {
    fn from(p: Priority) -> Self {
        p.0 as i64
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database model for report
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Report {
    pub id: Uuid,
    /// Submitter uid
    pub user_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
    pub image_url: String,
    pub status: ReportStatus,
    #[sqlx(try_from = "i16")]
    pub priority: Priority,
    pub category: ReportCategory,
    pub assigned_to_id: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub worker_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated intake data, classified before the report is built
#[derive(Debug, Clone)]
pub struct CreateReport {
    pub user_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
    pub image_url: String,
    pub priority: Priority,
    pub category: ReportCategory,
}

impl Report {
    /// Build a new `pending` report
    pub fn new_pending(data: CreateReport, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id: data.user_id,
            latitude: data.latitude,
            longitude: data.longitude,
            description: data.description,
            image_url: data.image_url,
            status: ReportStatus::Pending,
            priority: data.priority,
            category: data.category,
            assigned_to_id: None,
            resolved_at: None,
            worker_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_assigned_to(&self, uid: &str) -> bool {
        self.assigned_to_id.as_deref() == Some(uid)
    }
}

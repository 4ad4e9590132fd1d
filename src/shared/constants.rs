/// Reports at or above this priority fan out to every available worker
pub const HIGH_PRIORITY_THRESHOLD: u8 = 4;

/// Characters of the description quoted in worker alerts
pub const ALERT_DESCRIPTION_PREVIEW_CHARS: usize = 50;

// =============================================================================
// UNAUTHENTICATED MESSAGES
// =============================================================================

pub const LOGIN_REQUIRED: &str = "The user must be logged in.";
pub const SUBMIT_LOGIN_REQUIRED: &str = "The user must be logged in to submit a report.";
pub const WORKER_LOGIN_REQUIRED: &str = "Worker must be logged in.";
pub const AUTHENTICATION_REQUIRED: &str = "Authentication required";

// =============================================================================
// KPI DOCUMENTS
// =============================================================================

/// Well-known id of the overall summary record
pub const KPI_SUMMARY_ID: &str = "overall_summary";

/// Prefix of monthly report ids (`monthly_report_<YYYYMM>`)
pub const MONTHLY_REPORT_PREFIX: &str = "monthly_report_";

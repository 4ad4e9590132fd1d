mod report;
mod report_change;

pub use report::{CreateReport, Priority, Report, ReportCategory, ReportStatus};
pub use report_change::{GuardViolation, ReportChange, ReportGuard, ReportPatch, UpdateOutcome};

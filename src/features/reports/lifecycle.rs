//! Side-effect intents derived from report writes.
//!
//! Pure functions of the written rows: dispatch happens in the reactor.

use crate::features::notifications::models::{PushMessage, TransitionKind};
use crate::features::reports::models::{Report, ReportChange};
use crate::shared::constants::ALERT_DESCRIPTION_PREVIEW_CHARS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationTarget {
    /// Every worker with `is_available = true` at dispatch time
    AvailableWorkers,
    User(String),
}

/// A notification that a transition calls for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intent {
    pub kind: TransitionKind,
    pub target: NotificationTarget,
    pub message: PushMessage,
}

pub fn on_created(report: &Report) -> Vec<Intent> {
    if !report.priority.is_high() {
        return Vec::new();
    }

    vec![Intent {
        kind: TransitionKind::HighPriorityAlert,
        target: NotificationTarget::AvailableWorkers,
        message: high_priority_alert(report),
    }]
}

pub fn on_updated(change: &ReportChange) -> Vec<Intent> {
    let mut intents = Vec::new();
    let report = &change.after;

    if change.became_resolved() {
        intents.push(Intent {
            kind: TransitionKind::Resolved,
            target: NotificationTarget::User(report.user_id.clone()),
            message: PushMessage::new(
                format!("✅ Report Resolved: {}", report.category),
                "Your sanitation issue has been successfully resolved by our team!",
            )
            .with_data("type", "report_resolved")
            .with_data("report_id", report.id.to_string()),
        });
    }

    if change.became_assigned() {
        intents.push(Intent {
            kind: TransitionKind::Assigned,
            target: NotificationTarget::User(report.user_id.clone()),
            message: PushMessage::new(
                "🛠️ Your Report is in Progress!",
                "A worker has been assigned and is heading to the location.",
            )
            .with_data("type", "report_assigned")
            .with_data("report_id", report.id.to_string()),
        });
    }

    intents
}

fn high_priority_alert(report: &Report) -> PushMessage {
    let preview: String = report
        .description
        .chars()
        .take(ALERT_DESCRIPTION_PREVIEW_CHARS)
        .collect();

    PushMessage::new(
        format!("🚨 NEW CRITICAL TASK ({})", report.category),
        format!(
            "Location: {:.2}, {:.2}. Description: {}...",
            report.latitude, report.longitude, preview
        ),
    )
    .with_data("type", "new_task")
    .with_data("priority", "high")
    .with_data("report_id", report.id.to_string())
}

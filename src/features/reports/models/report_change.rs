use chrono::{DateTime, Utc};

use super::{Report, ReportStatus};

/// Before/after pair of a single report write
#[derive(Debug, Clone, PartialEq)]
pub struct ReportChange {
    pub before: Report,
    pub after: Report,
}

impl ReportChange {
    pub fn became_resolved(&self) -> bool {
        self.before.status != ReportStatus::Resolved && self.after.status == ReportStatus::Resolved
    }

    pub fn became_assigned(&self) -> bool {
        self.before.assigned_to_id.is_none() && self.after.assigned_to_id.is_some()
    }
}

/// Who must hold the report for a guarded update to apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssigneeCondition {
    Any,
    Unassigned,
    Is(String),
}

/// Precondition checked against the current row inside the write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportGuard {
    pub assignee: AssigneeCondition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardViolation {
    NotAssignee,
    AlreadyAssigned,
    InvalidTransition {
        from: ReportStatus,
        to: ReportStatus,
    },
}

impl ReportGuard {
    pub fn any() -> Self {
        Self {
            assignee: AssigneeCondition::Any,
        }
    }

    pub fn unassigned() -> Self {
        Self {
            assignee: AssigneeCondition::Unassigned,
        }
    }

    pub fn assigned_to(uid: impl Into<String>) -> Self {
        Self {
            assignee: AssigneeCondition::Is(uid.into()),
        }
    }

    /// Assignee is checked before the transition edge
    pub fn check(&self, current: &Report, patch: &ReportPatch) -> Result<(), GuardViolation> {
        match &self.assignee {
            AssigneeCondition::Any => {}
            AssigneeCondition::Unassigned => {
                if current.assigned_to_id.is_some() {
                    return Err(GuardViolation::AlreadyAssigned);
                }
            }
            AssigneeCondition::Is(uid) => {
                if !current.is_assigned_to(uid) {
                    return Err(GuardViolation::NotAssignee);
                }
            }
        }

        if !current.status.can_transition_to(patch.status) {
            return Err(GuardViolation::InvalidTransition {
                from: current.status,
                to: patch.status,
            });
        }

        Ok(())
    }
}

/// Fields a lifecycle transition may write
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPatch {
    pub status: ReportStatus,
    pub assign_to: Option<String>,
    pub worker_notes: Option<String>,
}

impl ReportPatch {
    pub fn status(status: ReportStatus) -> Self {
        Self {
            status,
            assign_to: None,
            worker_notes: None,
        }
    }

    pub fn assign(worker_uid: impl Into<String>) -> Self {
        Self {
            status: ReportStatus::Assigned,
            assign_to: Some(worker_uid.into()),
            worker_notes: None,
        }
    }

    pub fn with_worker_notes(mut self, notes: Option<String>) -> Self {
        self.worker_notes = notes;
        self
    }

    /// Produce the post-write row. `resolved_at` is set iff the new status is resolved.
    pub fn apply(&self, current: &Report, now: DateTime<Utc>) -> Report {
        let mut next = current.clone();
        next.status = self.status;
        if let Some(uid) = &self.assign_to {
            next.assigned_to_id = Some(uid.clone());
        }
        next.resolved_at = if self.status == ReportStatus::Resolved {
            Some(current.resolved_at.unwrap_or(now))
        } else {
            None
        };
        if let Some(notes) = &self.worker_notes {
            next.worker_notes = Some(notes.clone());
        }
        next.updated_at = now;
        next
    }
}

/// Result of `ReportStore::update_if`
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    NotFound,
    Rejected {
        violation: GuardViolation,
        current: Report,
    },
    Applied(ReportChange),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{fixed_now, sample_report};

    #[test]
    fn test_resolution_sets_timestamp() {
        let mut report = sample_report("citizen-1");
        report.status = ReportStatus::InProgress;
        report.assigned_to_id = Some("worker-1".into());

        let after = ReportPatch::status(ReportStatus::Resolved).apply(&report, fixed_now());
        assert_eq!(after.status, ReportStatus::Resolved);
        assert_eq!(after.resolved_at, Some(fixed_now()));
        assert_eq!(after.updated_at, fixed_now());
    }

    #[test]
    fn test_other_transitions_never_set_resolution_timestamp() {
        let mut report = sample_report("citizen-1");
        report.status = ReportStatus::Assigned;
        report.assigned_to_id = Some("worker-1".into());

        for status in [
            ReportStatus::InProgress,
            ReportStatus::Rejected,
            ReportStatus::Assigned,
        ] {
            let after = ReportPatch::status(status).apply(&report, fixed_now());
            assert!(after.resolved_at.is_none(), "{} set resolved_at", status);
        }
    }

    #[test]
    fn test_assign_patch_sets_worker_and_status() {
        let report = sample_report("citizen-1");
        let after = ReportPatch::assign("worker-9").apply(&report, fixed_now());
        assert_eq!(after.assigned_to_id.as_deref(), Some("worker-9"));
        assert_eq!(after.status, ReportStatus::Assigned);
    }

    #[test]
    fn test_guard_checks_assignee_before_transition() {
        let report = sample_report("citizen-1"); // pending, unassigned
        let guard = ReportGuard::assigned_to("worker-1");
        let patch = ReportPatch::status(ReportStatus::Resolved);
        assert_eq!(
            guard.check(&report, &patch),
            Err(GuardViolation::NotAssignee)
        );
    }

    #[test]
    fn test_guard_rejects_invalid_edge() {
        let mut report = sample_report("citizen-1");
        report.status = ReportStatus::Resolved;
        report.assigned_to_id = Some("worker-1".into());
        report.resolved_at = Some(fixed_now());

        let guard = ReportGuard::assigned_to("worker-1");
        let patch = ReportPatch::status(ReportStatus::InProgress);
        assert_eq!(
            guard.check(&report, &patch),
            Err(GuardViolation::InvalidTransition {
                from: ReportStatus::Resolved,
                to: ReportStatus::InProgress,
            })
        );
    }

    #[test]
    fn test_unassigned_guard_blocks_double_claim() {
        let mut report = sample_report("citizen-1");
        report.assigned_to_id = Some("worker-1".into());
        report.status = ReportStatus::Assigned;

        let patch = ReportPatch::assign("worker-2");
        assert_eq!(
            ReportGuard::unassigned().check(&report, &patch),
            Err(GuardViolation::AlreadyAssigned)
        );
    }

    #[test]
    fn test_change_detection() {
        let before = sample_report("citizen-1");
        let assigned = ReportPatch::assign("worker-1").apply(&before, fixed_now());
        let change = ReportChange {
            before: before.clone(),
            after: assigned.clone(),
        };
        assert!(change.became_assigned());
        assert!(!change.became_resolved());

        let resolved = ReportPatch::status(ReportStatus::Resolved).apply(&assigned, fixed_now());
        let change = ReportChange {
            before: assigned,
            after: resolved,
        };
        assert!(change.became_resolved());
        assert!(!change.became_assigned());
    }
}

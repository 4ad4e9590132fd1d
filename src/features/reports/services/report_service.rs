use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::require_uid;
use crate::features::classification::Classifier;
use crate::features::reports::events::{ReportEvent, ReportEventBus};
use crate::features::reports::models::{
    CreateReport, GuardViolation, Report, ReportGuard, ReportPatch, ReportStatus, UpdateOutcome,
};
use crate::features::reports::store::ReportStore;
use crate::features::users::models::UserRole;
use crate::features::users::{require_admin, UserDirectory};
use crate::shared::clock::Clock;
use crate::shared::constants::{
    AUTHENTICATION_REQUIRED, LOGIN_REQUIRED, SUBMIT_LOGIN_REQUIRED, WORKER_LOGIN_REQUIRED,
};
use crate::shared::validation::non_blank;

/// Intake fields as received from the client
#[derive(Debug, Clone)]
pub struct ReportSubmission {
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// Report intake, worker/admin transitions and report reads.
///
/// Every successful write is published on the event bus after commit.
pub struct ReportService {
    store: Arc<dyn ReportStore>,
    directory: Arc<dyn UserDirectory>,
    classifier: Arc<Classifier>,
    events: ReportEventBus,
    clock: Arc<dyn Clock>,
}

impl ReportService {
    pub fn new(
        store: Arc<dyn ReportStore>,
        directory: Arc<dyn UserDirectory>,
        classifier: Arc<Classifier>,
        events: ReportEventBus,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            directory,
            classifier,
            events,
            clock,
        }
    }

    /// Classify and persist a new `pending` report
    pub async fn submit_report(
        &self,
        caller: Option<&str>,
        submission: ReportSubmission,
    ) -> Result<Report> {
        let user_id = require_uid(caller, SUBMIT_LOGIN_REQUIRED)?;

        let (description, image_url) = match (
            non_blank(submission.description.as_deref()),
            non_blank(submission.image_url.as_deref()),
        ) {
            (Some(d), Some(i)) => (d.to_string(), i.to_string()),
            _ => {
                return Err(AppError::Validation(
                    "Missing description or image URL.".to_string(),
                ))
            }
        };

        // On the intake path: the report is not written until classification returns
        let classification = self.classifier.classify(&description).await;
        tracing::info!(
            "Report priority: {}, category: {}{}",
            classification.priority,
            classification.category,
            if classification.is_fallback() { " (fallback)" } else { "" }
        );

        let report = Report::new_pending(
            CreateReport {
                user_id: user_id.to_string(),
                latitude: submission.latitude,
                longitude: submission.longitude,
                description,
                image_url,
                priority: classification.priority,
                category: classification.category,
            },
            self.clock.now(),
        );

        self.store.insert(&report).await?;
        tracing::info!("Created report {} for user {}", report.id, user_id);

        self.events.publish(ReportEvent::Created(report.clone()));
        Ok(report)
    }

    /// Worker moves an assigned task to `in-progress` or `resolved`
    pub async fn update_task_status(
        &self,
        caller: Option<&str>,
        task_id: &str,
        new_status: ReportStatus,
        worker_notes: Option<String>,
    ) -> Result<Report> {
        let worker_uid = require_uid(caller, WORKER_LOGIN_REQUIRED)?;

        if !matches!(new_status, ReportStatus::InProgress | ReportStatus::Resolved) {
            return Err(AppError::Validation("Invalid task ID or status.".to_string()));
        }
        let id = parse_report_id(task_id)?;

        let patch = ReportPatch::status(new_status)
            .with_worker_notes(non_blank(worker_notes.as_deref()).map(str::to_string));

        let outcome = self
            .store
            .update_if(id, &ReportGuard::assigned_to(worker_uid), &patch, self.clock.now())
            .await?;

        let report = self.publish_applied(id, outcome)?;
        tracing::info!("Task {} set to {} by worker {}", id, new_status, worker_uid);
        Ok(report)
    }

    /// Admin assigns a pending, unassigned report to a worker
    pub async fn assign_report(
        &self,
        caller: Option<&str>,
        report_id: &str,
        worker_uid: &str,
    ) -> Result<Report> {
        let admin_uid = require_uid(caller, LOGIN_REQUIRED)?;
        require_admin(self.directory.as_ref(), admin_uid, "assign reports").await?;

        let id = parse_report_id(report_id)?;

        let worker = self.directory.get_profile(worker_uid).await?;
        if !worker.is_some_and(|w| w.role == UserRole::Worker) {
            return Err(AppError::Validation(format!(
                "User {} is not a worker.",
                worker_uid
            )));
        }

        let outcome = self
            .store
            .update_if(
                id,
                &ReportGuard::unassigned(),
                &ReportPatch::assign(worker_uid),
                self.clock.now(),
            )
            .await?;

        let report = self.publish_applied(id, outcome)?;
        tracing::info!("Report {} assigned to {} by {}", id, worker_uid, admin_uid);
        Ok(report)
    }

    /// Admin moderation: any non-terminal report may be rejected
    pub async fn reject_report(&self, caller: Option<&str>, report_id: &str) -> Result<Report> {
        let admin_uid = require_uid(caller, LOGIN_REQUIRED)?;
        require_admin(self.directory.as_ref(), admin_uid, "reject reports").await?;

        let id = parse_report_id(report_id)?;

        let outcome = self
            .store
            .update_if(
                id,
                &ReportGuard::any(),
                &ReportPatch::status(ReportStatus::Rejected),
                self.clock.now(),
            )
            .await?;

        let report = self.publish_applied(id, outcome)?;
        tracing::info!("Report {} rejected by {}", id, admin_uid);
        Ok(report)
    }

    /// Visible to the submitter, the assigned worker and admins; not-found otherwise
    pub async fn get_report(&self, caller: Option<&str>, report_id: &str) -> Result<Report> {
        let uid = require_uid(caller, AUTHENTICATION_REQUIRED)?;
        let id = parse_report_id(report_id)?;

        let report = self.store.get(id).await?.ok_or_else(report_not_found)?;

        if report.user_id == uid || report.is_assigned_to(uid) {
            return Ok(report);
        }

        let is_admin = self
            .directory
            .get_profile(uid)
            .await?
            .is_some_and(|p| p.is_admin());
        if is_admin {
            Ok(report)
        } else {
            Err(report_not_found())
        }
    }

    /// Reports submitted by the caller, newest first
    pub async fn list_mine(&self, caller: Option<&str>) -> Result<Vec<Report>> {
        let uid = require_uid(caller, AUTHENTICATION_REQUIRED)?;
        self.store.list_by_submitter(uid).await
    }

    /// Reports assigned to the calling worker
    pub async fn list_tasks(&self, caller: Option<&str>) -> Result<Vec<Report>> {
        let uid = require_uid(caller, WORKER_LOGIN_REQUIRED)?;
        self.store.list_by_assignee(uid).await
    }

    fn publish_applied(&self, id: Uuid, outcome: UpdateOutcome) -> Result<Report> {
        match outcome {
            UpdateOutcome::Applied(change) => {
                let report = change.after.clone();
                self.events.publish(ReportEvent::Updated(change));
                Ok(report)
            }
            UpdateOutcome::NotFound => Err(report_not_found()),
            UpdateOutcome::Rejected { violation, current } => {
                tracing::info!(
                    "Update of report {} (status {}) rejected: {:?}",
                    id,
                    current.status,
                    violation
                );
                Err(violation_error(violation))
            }
        }
    }
}

fn report_not_found() -> AppError {
    AppError::NotFound("Report not found.".to_string())
}

/// Ids that are not UUIDs cannot name an existing report
fn parse_report_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| report_not_found())
}

fn violation_error(violation: GuardViolation) -> AppError {
    match violation {
        GuardViolation::NotAssignee => {
            AppError::Forbidden("You are not assigned to this task.".to_string())
        }
        GuardViolation::AlreadyAssigned => {
            AppError::Validation("Report is already assigned.".to_string())
        }
        GuardViolation::InvalidTransition { from, to } => AppError::Validation(format!(
            "Cannot change report status from {} to {}.",
            from, to
        )),
    }
}

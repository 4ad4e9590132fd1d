//! In-memory collaborators for unit and HTTP tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::analytics::models::{KpiSummary, MonthlyReport};
use crate::features::analytics::store::KpiStore;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::classification::clients::{ClassifierBackend, ClassifierBackendError};
use crate::features::notifications::clients::{PushError, PushGateway};
use crate::features::notifications::models::{PushMessage, TransitionKind};
use crate::features::notifications::DeliveryLedger;
use crate::features::reports::models::{
    Priority, Report, ReportCategory, ReportChange, ReportGuard, ReportPatch, ReportStatus,
    UpdateOutcome,
};
use crate::features::reports::store::ReportStore;
use crate::features::users::models::{UserProfile, UserRole};
use crate::features::users::UserDirectory;
use crate::shared::clock::Clock;
use crate::shared::constants::KPI_SUMMARY_ID;

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
}

/// Pending, unassigned, lowest priority
pub fn sample_report(user_id: &str) -> Report {
    Report {
        id: Uuid::now_v7(),
        user_id: user_id.to_string(),
        latitude: 40.7128,
        longitude: -74.006,
        description: "Overflowing bins behind the market".to_string(),
        image_url: "https://cdn.example.com/img/sample.jpg".to_string(),
        status: ReportStatus::Pending,
        priority: Priority::MIN,
        category: ReportCategory::Other,
        assigned_to_id: None,
        resolved_at: None,
        worker_notes: None,
        created_at: fixed_now(),
        updated_at: fixed_now(),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

// =============================================================================
// REPORTS
// =============================================================================

#[derive(Default)]
pub struct MemoryReportStore {
    reports: Mutex<HashMap<Uuid, Report>>,
}

impl MemoryReportStore {
    pub fn put(&self, report: Report) {
        self.reports.lock().unwrap().insert(report.id, report);
    }

    pub fn all(&self) -> Vec<Report> {
        self.reports.lock().unwrap().values().cloned().collect()
    }

    fn newest_first(&self, keep: impl Fn(&Report) -> bool) -> Vec<Report> {
        let mut reports: Vec<Report> = self
            .reports
            .lock()
            .unwrap()
            .values()
            .filter(|r| keep(r))
            .cloned()
            .collect();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        reports
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn insert(&self, report: &Report) -> Result<()> {
        self.put(report.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Report>> {
        Ok(self.reports.lock().unwrap().get(&id).cloned())
    }

    async fn update_if(
        &self,
        id: Uuid,
        guard: &ReportGuard,
        patch: &ReportPatch,
        now: DateTime<Utc>,
    ) -> Result<UpdateOutcome> {
        let mut reports = self.reports.lock().unwrap();
        let Some(current) = reports.get(&id).cloned() else {
            return Ok(UpdateOutcome::NotFound);
        };

        if let Err(violation) = guard.check(&current, patch) {
            return Ok(UpdateOutcome::Rejected { violation, current });
        }

        let after = patch.apply(&current, now);
        reports.insert(id, after.clone());
        Ok(UpdateOutcome::Applied(ReportChange {
            before: current,
            after,
        }))
    }

    async fn count(&self, status: Option<ReportStatus>) -> Result<i64> {
        let reports = self.reports.lock().unwrap();
        Ok(reports
            .values()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .count() as i64)
    }

    async fn list_all(&self) -> Result<Vec<Report>> {
        Ok(self.newest_first(|_| true))
    }

    async fn list_by_submitter(&self, user_id: &str) -> Result<Vec<Report>> {
        Ok(self.newest_first(|r| r.user_id == user_id))
    }

    async fn list_by_assignee(&self, worker_uid: &str) -> Result<Vec<Report>> {
        Ok(self.newest_first(|r| r.is_assigned_to(worker_uid)))
    }
}

// =============================================================================
// USERS
// =============================================================================

#[derive(Default)]
pub struct FakeUserDirectory {
    profiles: Mutex<HashMap<String, UserProfile>>,
    failing: AtomicBool,
}

impl FakeUserDirectory {
    pub fn add_user(&self, uid: &str, role: UserRole, available: bool, token: Option<&str>) {
        let profile = UserProfile {
            uid: uid.to_string(),
            name: format!("User {}", uid),
            email: format!("{}@example.com", uid),
            role,
            is_available: available,
            team_id: None,
            fcm_token: token.map(str::to_string),
            last_active: None,
        };
        self.profiles.lock().unwrap().insert(uid.to_string(), profile);
    }

    pub fn profile(&self, uid: &str) -> Option<UserProfile> {
        self.profiles.lock().unwrap().get(uid).cloned()
    }

    /// Every write fails from now on
    pub fn fail_writes(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Internal("directory unavailable".to_string()));
        }
        Ok(())
    }

    fn upsert(&self, uid: &str, update: impl FnOnce(&mut UserProfile)) {
        let mut profiles = self.profiles.lock().unwrap();
        let profile = profiles.entry(uid.to_string()).or_insert_with(|| UserProfile {
            uid: uid.to_string(),
            name: String::new(),
            email: String::new(),
            role: UserRole::Community,
            is_available: false,
            team_id: None,
            fcm_token: None,
            last_active: None,
        });
        update(profile);
    }
}

#[async_trait]
impl UserDirectory for FakeUserDirectory {
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>> {
        Ok(self.profile(uid))
    }

    async fn available_workers(&self) -> Result<Vec<UserProfile>> {
        let mut workers: Vec<UserProfile> = self
            .profiles
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.is_available_worker())
            .cloned()
            .collect();
        workers.sort_by(|a, b| a.uid.cmp(&b.uid));
        Ok(workers)
    }

    async fn push_token(&self, uid: &str) -> Result<Option<String>> {
        Ok(self
            .profile(uid)
            .and_then(|p| p.fcm_token)
            .filter(|t| !t.is_empty()))
    }

    async fn set_role(&self, uid: &str, role: UserRole) -> Result<()> {
        self.check_writable()?;
        self.upsert(uid, |p| {
            p.role = role;
            p.is_available = role == UserRole::Worker;
        });
        Ok(())
    }

    async fn set_push_token(&self, uid: &str, token: &str, now: DateTime<Utc>) -> Result<()> {
        self.check_writable()?;
        self.upsert(uid, |p| {
            p.fcm_token = Some(token.to_string());
            p.last_active = Some(now);
        });
        Ok(())
    }

    async fn set_availability(&self, uid: &str, available: bool) -> Result<bool> {
        self.check_writable()?;
        let mut profiles = self.profiles.lock().unwrap();
        Ok(match profiles.get_mut(uid) {
            Some(profile) => {
                profile.is_available = available;
                true
            }
            None => false,
        })
    }
}

// =============================================================================
// NOTIFICATIONS
// =============================================================================

#[derive(Default)]
pub struct MemoryLedger {
    claimed: Mutex<HashSet<(Uuid, TransitionKind)>>,
    failing: AtomicBool,
}

impl MemoryLedger {
    pub fn fail_claims(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl DeliveryLedger for MemoryLedger {
    async fn claim(
        &self,
        report_id: Uuid,
        kind: TransitionKind,
        _now: DateTime<Utc>,
    ) -> Result<bool> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Internal("ledger unavailable".to_string()));
        }
        Ok(self.claimed.lock().unwrap().insert((report_id, kind)))
    }
}

/// Records every send; tokens listed in `failing_for` are rejected
#[derive(Default)]
pub struct RecordingPushGateway {
    sent: Mutex<Vec<(String, PushMessage)>>,
    failing_tokens: HashSet<String>,
    next_id: AtomicUsize,
}

impl RecordingPushGateway {
    pub fn failing_for(tokens: &[&str]) -> Self {
        Self {
            failing_tokens: tokens.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, PushMessage)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushGateway for RecordingPushGateway {
    async fn send(&self, token: &str, message: &PushMessage) -> std::result::Result<String, PushError> {
        if self.failing_tokens.contains(token) {
            return Err(PushError::Rejected {
                status: 404,
                body: "UNREGISTERED".to_string(),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((token.to_string(), message.clone()));
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("msg-{}", id))
    }
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Backend that replies with a fixed text, or fails as unreachable
pub struct ScriptedBackend {
    reply: Option<String>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl ScriptedBackend {
    pub fn text(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reply: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClassifierBackend for ScriptedBackend {
    async fn generate(
        &self,
        prompt: &str,
        schema: &Value,
    ) -> std::result::Result<String, ClassifierBackendError> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), schema.clone()));
        self.reply
            .clone()
            .ok_or_else(|| ClassifierBackendError::Transport("connection refused".to_string()))
    }
}

// =============================================================================
// ANALYTICS
// =============================================================================

#[derive(Default)]
pub struct MemoryKpiStore {
    summary: Mutex<Option<KpiSummary>>,
    monthly: Mutex<HashMap<i32, MonthlyReport>>,
}

impl MemoryKpiStore {
    /// Seed the summary fields the daily recomputation never writes
    pub fn set_extra_fields(&self, avg_cycle_time_hours: Option<Decimal>, active_workers: Option<i64>) {
        let mut summary = self.summary.lock().unwrap();
        let entry = summary.get_or_insert_with(|| KpiSummary {
            id: KPI_SUMMARY_ID.to_string(),
            total_reports: 0,
            total_resolved: 0,
            resolution_rate: Decimal::ZERO,
            avg_cycle_time_hours: None,
            active_worker_count: None,
            last_updated: fixed_now(),
        });
        entry.avg_cycle_time_hours = avg_cycle_time_hours;
        entry.active_worker_count = active_workers;
    }
}

#[async_trait]
impl KpiStore for MemoryKpiStore {
    async fn upsert_summary(
        &self,
        total: i64,
        resolved: i64,
        rate: Decimal,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut summary = self.summary.lock().unwrap();
        let entry = summary.get_or_insert_with(|| KpiSummary {
            id: KPI_SUMMARY_ID.to_string(),
            total_reports: 0,
            total_resolved: 0,
            resolution_rate: Decimal::ZERO,
            avg_cycle_time_hours: None,
            active_worker_count: None,
            last_updated: now,
        });
        entry.total_reports = total;
        entry.total_resolved = resolved;
        entry.resolution_rate = rate;
        entry.last_updated = now;
        Ok(())
    }

    async fn get_summary(&self) -> Result<Option<KpiSummary>> {
        Ok(self.summary.lock().unwrap().clone())
    }

    async fn upsert_monthly(&self, report: &MonthlyReport) -> Result<()> {
        self.monthly
            .lock()
            .unwrap()
            .insert(report.period, report.clone());
        Ok(())
    }

    async fn get_monthly(&self, period: i32) -> Result<Option<MonthlyReport>> {
        Ok(self.monthly.lock().unwrap().get(&period).cloned())
    }
}

// =============================================================================
// HTTP
// =============================================================================

/// Attach `uid` as the authenticated caller of every request
pub fn with_caller(router: Router, uid: &str) -> Router {
    let uid = uid.to_string();
    router.layer(middleware::from_fn(move |mut req: Request, next: Next| {
        let uid = uid.clone();
        async move {
            req.extensions_mut().insert(AuthenticatedUser::new(uid));
            next.run(req).await
        }
    }))
}

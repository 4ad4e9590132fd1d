use std::sync::Arc;

use crate::features::notifications::{
    DeliveryLedger, DispatchSummary, Notifier, TransitionKind,
};
use crate::features::reports::events::{ReportEvent, ReportEventReceiver};
use crate::features::reports::lifecycle::{self, Intent, NotificationTarget};
use crate::features::users::UserDirectory;
use crate::shared::clock::Clock;

/// What the reactor did with one intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Delivered {
        kind: TransitionKind,
        summary: DispatchSummary,
    },
    /// The ledger already held this (report, transition)
    Duplicate { kind: TransitionKind },
}

/// Background worker turning report write events into notifications.
///
/// Errors never travel back to the write that produced the event.
pub struct ReportReactor {
    notifier: Arc<Notifier>,
    directory: Arc<dyn UserDirectory>,
    ledger: Arc<dyn DeliveryLedger>,
    clock: Arc<dyn Clock>,
}

impl ReportReactor {
    pub fn new(
        notifier: Arc<Notifier>,
        directory: Arc<dyn UserDirectory>,
        ledger: Arc<dyn DeliveryLedger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            notifier,
            directory,
            ledger,
            clock,
        }
    }

    /// Consume events until every publisher is dropped. Each event is handled
    /// on its own task.
    pub async fn run(self: Arc<Self>, mut events: ReportEventReceiver) {
        tracing::info!("Starting report reactor worker");

        while let Some(event) = events.recv().await {
            let reactor = self.clone();
            tokio::spawn(async move {
                reactor.handle(&event).await;
            });
        }

        tracing::info!("Report reactor stopped: event bus closed");
    }

    pub async fn handle(&self, event: &ReportEvent) -> Vec<Dispatch> {
        let intents = match event {
            ReportEvent::Created(report) => lifecycle::on_created(report),
            ReportEvent::Updated(change) => lifecycle::on_updated(change),
        };
        let report_id = event.report().id;

        if intents.is_empty() {
            if let ReportEvent::Created(report) = event {
                tracing::info!(
                    "Report {} is low priority ({}). Skipping immediate notification.",
                    report_id,
                    report.priority
                );
            }
            return Vec::new();
        }

        let mut dispatches = Vec::with_capacity(intents.len());
        for intent in intents {
            dispatches.push(self.dispatch(report_id, intent).await);
        }
        dispatches
    }

    async fn dispatch(&self, report_id: uuid::Uuid, intent: Intent) -> Dispatch {
        let kind = intent.kind;

        match self.ledger.claim(report_id, kind, self.clock.now()).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!(
                    "Notification {} for report {} already dispatched, skipping",
                    kind,
                    report_id
                );
                return Dispatch::Duplicate { kind };
            }
            Err(e) => {
                // A duplicate is preferred over a lost notification
                tracing::error!(
                    "Ledger unavailable for {} on report {}, sending anyway: {}",
                    kind,
                    report_id,
                    e
                );
            }
        }

        let recipients = self.recipients(report_id, &intent.target).await;
        if recipients.is_empty() {
            return Dispatch::Delivered {
                kind,
                summary: DispatchSummary::default(),
            };
        }

        let summary = self.notifier.notify_all(&recipients, &intent.message).await;
        tracing::info!(
            "Notification {} for report {}: {} sent, {} without channel, {} failed",
            kind,
            report_id,
            summary.sent,
            summary.no_channel,
            summary.failed
        );

        Dispatch::Delivered { kind, summary }
    }

    async fn recipients(&self, report_id: uuid::Uuid, target: &NotificationTarget) -> Vec<String> {
        match target {
            NotificationTarget::User(uid) => vec![uid.clone()],
            NotificationTarget::AvailableWorkers => match self.directory.available_workers().await {
                Ok(workers) if workers.is_empty() => {
                    tracing::warn!("No available workers found to notify for report {}", report_id);
                    Vec::new()
                }
                Ok(workers) => workers.into_iter().map(|w| w.uid).collect(),
                Err(e) => {
                    tracing::error!(
                        "Failed to list available workers for report {}: {}",
                        report_id,
                        e
                    );
                    Vec::new()
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reports::models::{Priority, ReportChange, ReportPatch, ReportStatus};
    use crate::features::users::models::UserRole;
    use crate::shared::test_helpers::{
        fixed_now, sample_report, FakeUserDirectory, FixedClock, MemoryLedger,
        RecordingPushGateway,
    };

    struct Harness {
        reactor: ReportReactor,
        directory: Arc<FakeUserDirectory>,
        gateway: Arc<RecordingPushGateway>,
        ledger: Arc<MemoryLedger>,
    }

    fn harness() -> Harness {
        let directory = Arc::new(FakeUserDirectory::default());
        let gateway = Arc::new(RecordingPushGateway::default());
        let ledger = Arc::new(MemoryLedger::default());
        let notifier = Arc::new(Notifier::new(directory.clone(), gateway.clone()));
        let reactor = ReportReactor::new(
            notifier,
            directory.clone(),
            ledger.clone(),
            Arc::new(FixedClock(fixed_now())),
        );

        Harness {
            reactor,
            directory,
            gateway,
            ledger,
        }
    }

    fn report_with_priority(p: i64) -> crate::features::reports::models::Report {
        let mut report = sample_report("citizen-1");
        report.priority = Priority::new(p).unwrap();
        report
    }

    #[tokio::test]
    async fn test_low_priority_report_sends_nothing() {
        let h = harness();
        h.directory.add_user("w1", UserRole::Worker, true, Some("tok-w1"));

        for p in 1..=3 {
            let dispatches = h
                .reactor
                .handle(&ReportEvent::Created(report_with_priority(p)))
                .await;
            assert!(dispatches.is_empty());
        }
        assert!(h.gateway.sent().is_empty());
    }

    #[tokio::test]
    async fn test_high_priority_report_alerts_each_available_worker() {
        let h = harness();
        h.directory.add_user("w1", UserRole::Worker, true, Some("tok-w1"));
        h.directory.add_user("w2", UserRole::Worker, true, Some("tok-w2"));
        h.directory.add_user("w3", UserRole::Worker, false, Some("tok-w3"));
        h.directory.add_user("admin", UserRole::Admin, true, Some("tok-admin"));

        let dispatches = h
            .reactor
            .handle(&ReportEvent::Created(report_with_priority(5)))
            .await;

        assert_eq!(
            dispatches,
            vec![Dispatch::Delivered {
                kind: TransitionKind::HighPriorityAlert,
                summary: DispatchSummary {
                    sent: 2,
                    no_channel: 0,
                    failed: 0
                }
            }]
        );
        let mut tokens: Vec<String> = h.gateway.sent().into_iter().map(|(t, _)| t).collect();
        tokens.sort();
        assert_eq!(tokens, vec!["tok-w1", "tok-w2"]);
    }

    #[tokio::test]
    async fn test_no_available_workers_is_not_an_error() {
        let h = harness();

        let dispatches = h
            .reactor
            .handle(&ReportEvent::Created(report_with_priority(4)))
            .await;

        assert_eq!(
            dispatches,
            vec![Dispatch::Delivered {
                kind: TransitionKind::HighPriorityAlert,
                summary: DispatchSummary::default()
            }]
        );
        assert!(h.gateway.sent().is_empty());
    }

    #[tokio::test]
    async fn test_redelivered_resolution_is_sent_once() {
        let h = harness();
        h.directory.add_user("citizen-1", UserRole::Community, false, Some("tok-c1"));

        let mut before = sample_report("citizen-1");
        before.status = ReportStatus::InProgress;
        before.assigned_to_id = Some("w1".into());
        let after = ReportPatch::status(ReportStatus::Resolved).apply(&before, fixed_now());
        let event = ReportEvent::Updated(ReportChange { before, after });

        let first = h.reactor.handle(&event).await;
        let second = h.reactor.handle(&event).await;

        assert!(matches!(first[0], Dispatch::Delivered { .. }));
        assert_eq!(
            second,
            vec![Dispatch::Duplicate {
                kind: TransitionKind::Resolved
            }]
        );
        assert_eq!(h.gateway.sent().len(), 1);
        assert_eq!(h.gateway.sent()[0].0, "tok-c1");
    }

    #[tokio::test]
    async fn test_ledger_failure_still_sends() {
        let h = harness();
        h.ledger.fail_claims();
        h.directory.add_user("citizen-1", UserRole::Community, false, Some("tok-c1"));

        let before = sample_report("citizen-1");
        let after = ReportPatch::assign("w1").apply(&before, fixed_now());
        h.reactor
            .handle(&ReportEvent::Updated(ReportChange { before, after }))
            .await;

        assert_eq!(h.gateway.sent().len(), 1);
        assert_eq!(h.gateway.sent()[0].1.data["type"], "report_assigned");
    }

    #[tokio::test]
    async fn test_failed_delivery_is_absorbed() {
        let directory = Arc::new(FakeUserDirectory::default());
        directory.add_user("citizen-1", UserRole::Community, false, Some("tok-c1"));
        let gateway = Arc::new(RecordingPushGateway::failing_for(&["tok-c1"]));
        let notifier = Arc::new(Notifier::new(directory.clone(), gateway));
        let reactor = ReportReactor::new(
            notifier,
            directory,
            Arc::new(MemoryLedger::default()),
            Arc::new(FixedClock(fixed_now())),
        );

        let before = sample_report("citizen-1");
        let after = ReportPatch::assign("w1").apply(&before, fixed_now());
        let dispatches = reactor
            .handle(&ReportEvent::Updated(ReportChange { before, after }))
            .await;

        assert_eq!(
            dispatches,
            vec![Dispatch::Delivered {
                kind: TransitionKind::Assigned,
                summary: DispatchSummary {
                    sent: 0,
                    no_channel: 0,
                    failed: 1
                }
            }]
        );
    }

    #[tokio::test]
    async fn test_run_drains_bus_until_closed() {
        let h = harness();
        h.directory.add_user("w1", UserRole::Worker, true, Some("tok-w1"));
        let (bus, rx) = crate::features::reports::events::ReportEventBus::channel();
        let reactor = Arc::new(h.reactor);

        bus.publish(ReportEvent::Created(report_with_priority(5)));
        drop(bus);
        reactor.run(rx).await;

        // Spawned handlers finish shortly after the loop exits
        for _ in 0..50 {
            if !h.gateway.sent().is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(h.gateway.sent().len(), 1);
    }
}

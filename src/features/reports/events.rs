use tokio::sync::mpsc;

use crate::features::reports::models::{Report, ReportChange};

/// Committed report write, observed by the reactor
#[derive(Debug, Clone, PartialEq)]
pub enum ReportEvent {
    Created(Report),
    Updated(ReportChange),
}

impl ReportEvent {
    pub fn report(&self) -> &Report {
        match self {
            ReportEvent::Created(report) => report,
            ReportEvent::Updated(change) => &change.after,
        }
    }
}

pub type ReportEventReceiver = mpsc::UnboundedReceiver<ReportEvent>;

/// In-process publisher of report write events
#[derive(Clone)]
pub struct ReportEventBus {
    tx: mpsc::UnboundedSender<ReportEvent>,
}

impl ReportEventBus {
    pub fn channel() -> (Self, ReportEventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Never fails the caller: the write has already been committed
    pub fn publish(&self, event: ReportEvent) {
        let report_id = event.report().id;
        if self.tx.send(event).is_err() {
            tracing::error!(
                "Report event for {} dropped: reactor is not running",
                report_id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::sample_report;

    #[tokio::test]
    async fn test_published_events_are_received_in_order() {
        let (bus, mut rx) = ReportEventBus::channel();
        let first = sample_report("citizen-1");
        let second = sample_report("citizen-2");

        bus.publish(ReportEvent::Created(first.clone()));
        bus.publish(ReportEvent::Created(second.clone()));

        assert_eq!(rx.recv().await, Some(ReportEvent::Created(first)));
        assert_eq!(rx.recv().await, Some(ReportEvent::Created(second)));
    }

    #[test]
    fn test_publish_without_receiver_does_not_panic() {
        let (bus, rx) = ReportEventBus::channel();
        drop(rx);
        bus.publish(ReportEvent::Created(sample_report("citizen-1")));
    }
}

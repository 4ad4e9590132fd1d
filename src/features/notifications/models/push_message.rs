use std::collections::BTreeMap;

/// Lifecycle transition a notification belongs to; one ledger entry per (report, kind)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    HighPriorityAlert,
    Assigned,
    Resolved,
}

impl TransitionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransitionKind::HighPriorityAlert => "high_priority_alert",
            TransitionKind::Assigned => "assigned",
            TransitionKind::Resolved => "resolved",
        }
    }
}

impl std::fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Titled push message with a string-only data payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub data: BTreeMap<String, String>,
}

impl PushMessage {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            data: BTreeMap::new(),
        }
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

/// Result of a single `Notifier::notify`. Never an error for the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent { message_id: String },
    NoChannel,
    DeliveryFailed { reason: String },
}

/// Totals of a fan-out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub sent: usize,
    pub no_channel: usize,
    pub failed: usize,
}

impl DispatchSummary {
    pub fn record(&mut self, outcome: &NotifyOutcome) {
        match outcome {
            NotifyOutcome::Sent { .. } => self.sent += 1,
            NotifyOutcome::NoChannel => self.no_channel += 1,
            NotifyOutcome::DeliveryFailed { .. } => self.failed += 1,
        }
    }

    pub fn attempted(&self) -> usize {
        self.sent + self.no_channel + self.failed
    }
}

impl<'a> FromIterator<&'a NotifyOutcome> for DispatchSummary {
    fn from_iter<I: IntoIterator<Item = &'a NotifyOutcome>>(iter: I) -> Self {
        let mut summary = DispatchSummary::default();
        for outcome in iter {
            summary.record(outcome);
        }
        summary
    }
}

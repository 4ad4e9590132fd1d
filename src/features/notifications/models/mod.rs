mod push_message;

pub use push_message::{DispatchSummary, NotifyOutcome, PushMessage, TransitionKind};

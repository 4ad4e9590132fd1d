pub mod clients;
pub mod ledger;
pub mod models;
pub mod services;

pub use clients::{DisabledPushGateway, FcmGateway, PushGateway};
pub use ledger::{DeliveryLedger, PgDeliveryLedger};
pub use models::{DispatchSummary, TransitionKind};
pub use services::Notifier;

use futures::future::join_all;
use std::sync::Arc;

use crate::features::notifications::clients::PushGateway;
use crate::features::notifications::models::{DispatchSummary, NotifyOutcome, PushMessage};
use crate::features::users::UserDirectory;

/// Delivers push messages to users by uid.
///
/// Never returns an error: every failure is logged and reported through
/// [`NotifyOutcome`].
pub struct Notifier {
    directory: Arc<dyn UserDirectory>,
    gateway: Arc<dyn PushGateway>,
}

impl Notifier {
    pub fn new(directory: Arc<dyn UserDirectory>, gateway: Arc<dyn PushGateway>) -> Self {
        Self { directory, gateway }
    }

    pub async fn notify(&self, user_id: &str, message: &PushMessage) -> NotifyOutcome {
        let token = match self.directory.push_token(user_id).await {
            Ok(Some(token)) => token,
            Ok(None) => {
                tracing::warn!("No push token registered for user {}", user_id);
                return NotifyOutcome::NoChannel;
            }
            Err(e) => {
                tracing::error!("Push token lookup failed for user {}: {}", user_id, e);
                return NotifyOutcome::DeliveryFailed {
                    reason: format!("token lookup failed: {}", e),
                };
            }
        };

        match self.gateway.send(&token, message).await {
            Ok(message_id) => {
                tracing::info!("Sent push to {}: {}", user_id, message_id);
                NotifyOutcome::Sent { message_id }
            }
            Err(e) => {
                tracing::error!("Push delivery to {} failed: {}", user_id, e);
                NotifyOutcome::DeliveryFailed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Concurrent, independent sends to each user
    pub async fn notify_all(&self, user_ids: &[String], message: &PushMessage) -> DispatchSummary {
        let outcomes = join_all(user_ids.iter().map(|uid| self.notify(uid, message))).await;
        outcomes.iter().collect()
    }
}

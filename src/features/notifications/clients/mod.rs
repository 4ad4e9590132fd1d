mod fcm_client;
mod token_manager;

pub use fcm_client::FcmGateway;
pub use token_manager::FcmTokenManager;
use token_manager::TokenError;

use async_trait::async_trait;

use crate::features::notifications::models::PushMessage;

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("Push delivery disabled")]
    Disabled,

    #[error("Failed to obtain push access token: {0}")]
    Token(#[from] TokenError),

    #[error("Push request failed: {0}")]
    Transport(String),

    #[error("Push rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Delivery channel for a single device token
#[async_trait]
pub trait PushGateway: Send + Sync {
    /// Returns the provider's message id
    async fn send(&self, token: &str, message: &PushMessage) -> Result<String, PushError>;
}

/// Gateway used when no push credentials are configured
#[derive(Debug, Default)]
pub struct DisabledPushGateway;

#[async_trait]
impl PushGateway for DisabledPushGateway {
    async fn send(&self, _token: &str, _message: &PushMessage) -> Result<String, PushError> {
        Err(PushError::Disabled)
    }
}

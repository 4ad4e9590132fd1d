mod gemini_client;

pub use gemini_client::GeminiBackend;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum ClassifierBackendError {
    #[error("Classifier request timed out")]
    Timeout,

    #[error("Classifier request failed: {0}")]
    Transport(String),

    #[error("Classifier returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode classifier response: {0}")]
    Decode(String),
}

/// External text-generation call constrained to a JSON response shape
#[async_trait]
pub trait ClassifierBackend: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        schema: &serde_json::Value,
    ) -> Result<String, ClassifierBackendError>;
}

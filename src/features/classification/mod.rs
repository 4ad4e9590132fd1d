pub mod clients;
pub mod models;
pub mod services;

pub use clients::GeminiBackend;
pub use services::Classifier;

pub mod analytics;
pub mod auth;
pub mod classification;
pub mod notifications;
pub mod reports;
pub mod users;

//! KPI aggregation.
//!
//! A daily worker recomputes the overall summary and the monthly partitions
//! from the full report set. Both are pure functions of that set; nothing
//! here reacts to individual report writes.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod workers;

pub use services::KpiService;
pub use store::PgKpiStore;
pub use workers::KpiScheduler;

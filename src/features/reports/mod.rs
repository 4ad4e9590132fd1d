pub mod dtos;
pub mod events;
pub mod handlers;
pub mod lifecycle;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod workers;

pub use events::ReportEventBus;
pub use services::ReportService;
pub use store::PgReportStore;
pub use workers::ReportReactor;

mod kpi_handler;

pub use kpi_handler::*;

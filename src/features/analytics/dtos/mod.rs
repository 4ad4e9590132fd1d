mod kpi_dto;

pub use kpi_dto::*;

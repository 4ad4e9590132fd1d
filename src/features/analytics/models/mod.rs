mod kpi;

pub use kpi::{monthly_reports, resolution_rate, KpiSummary, MonthlyReport};

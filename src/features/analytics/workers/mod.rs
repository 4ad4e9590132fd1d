mod kpi_scheduler;

pub use kpi_scheduler::KpiScheduler;

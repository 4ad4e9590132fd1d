mod report_reactor;

pub use report_reactor::ReportReactor;

mod report_dto;

pub use report_dto::{
    AssignReportDto, ReportResponseDto, SubmitReportDto, SubmitReportResponseDto,
    UpdateTaskStatusDto,
};

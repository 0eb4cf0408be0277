//! Domain models for the repair report service.

pub mod form;
pub mod repair_report;
pub mod submission;

pub use form::{FormFields, SubmissionForm, UploadedFile};
pub use repair_report::{
    NotificationStatus, RepairJobResponse, ReportDetailResponse, SubmitReportResponse,
};
pub use submission::{JobInput, ReportInput, Submission};

//! Domain models and wire DTOs shared by the three services.

pub mod file;
pub mod report;
pub mod submission;

// Re-export commonly used types
pub use file::{DuplicateFilesResponse, FileMetadata, UploadResponse, WorkFilesResponse};
pub use report::{
    AnalyzeRequest, ListReportsQuery, Report, ReportListResponse, ReportStatus, SimilarWork,
    UpdateReportStatusRequest, WorkReportsResponse,
};
pub use submission::{GatewayHealthResponse, WorkSubmissionResponse};

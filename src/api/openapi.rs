//! OpenAPI documentation, one document per service.

use utoipa::OpenApi;

use crate::{api, error, models};

/// Storage engine OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storage Engine",
        version = "0.1.0",
        description = "Content-addressed storage for submitted student works"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        api::health::health,
        api::health::ready,
        api::storage::upload_file,
        api::storage::download_file,
        api::storage::get_file_metadata,
        api::storage::check_file_exists,
        api::storage::delete_file,
        api::storage::list_work_files,
        api::storage::get_file_content,
    ),
    components(
        schemas(
            error::ErrorResponse,
            api::health::HealthResponse,
            api::health::ReadyResponse,
            models::UploadResponse,
            models::FileMetadata,
            models::DuplicateFilesResponse,
            models::WorkFilesResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Files", description = "File upload, download and duplicate lookup"),
        (name = "Works", description = "Works grouping files per student and assignment"),
        (name = "Internal", description = "Service-to-service endpoints")
    )
)]
pub struct StorageApiDoc;

/// Analysis engine OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Analysis Engine",
        version = "0.1.0",
        description = "Plagiarism analysis and report storage"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        api::health::health,
        api::health::ready,
        api::analysis::analyze_file,
        api::analysis::get_report,
        api::analysis::get_work_reports,
        api::analysis::list_reports,
        api::analysis::update_report_status,
        api::analysis::delete_report,
    ),
    components(
        schemas(
            error::ErrorResponse,
            api::health::HealthResponse,
            api::health::ReadyResponse,
            models::ReportStatus,
            models::SimilarWork,
            models::Report,
            models::AnalyzeRequest,
            models::ListReportsQuery,
            models::ReportListResponse,
            models::WorkReportsResponse,
            models::UpdateReportStatusRequest,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Analysis", description = "Run plagiarism analysis on a stored file"),
        (name = "Reports", description = "Report retrieval and management")
    )
)]
pub struct AnalysisApiDoc;

/// Gateway OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Submission Gateway",
        version = "0.1.0",
        description = "Public entry point for work submission and report retrieval"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        api::gateway::submit_work,
        api::gateway::get_report,
        api::gateway::get_work_reports,
        api::gateway::download_file,
        api::gateway::health,
    ),
    components(
        schemas(
            error::ErrorResponse,
            models::WorkSubmissionResponse,
            models::GatewayHealthResponse,
            models::ReportStatus,
            models::SimilarWork,
            models::Report,
            models::WorkReportsResponse,
        )
    ),
    tags(
        (name = "Health", description = "Aggregated health of all services"),
        (name = "Submissions", description = "Work submission"),
        (name = "Reports", description = "Report retrieval"),
        (name = "Files", description = "File download")
    )
)]
pub struct GatewayApiDoc;

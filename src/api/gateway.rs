//! Gateway API handlers.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};

use crate::api::transfer::{attachment_response, read_submission};
use crate::config::StorageSettings;
use crate::error::AppResult;
use crate::models::{GatewayHealthResponse, Report, WorkReportsResponse, WorkSubmissionResponse};
use crate::services::SubmissionService;

/// Submit a student's work.
///
/// Succeeds once the file is stored, whether or not analysis succeeds.
#[utoipa::path(
    post,
    path = "/submit",
    tag = "Submissions",
    request_body(content_type = "multipart/form-data", description = "student_id, assignment_id and file parts"),
    responses(
        (status = 200, description = "Work stored", body = WorkSubmissionResponse),
        (status = 400, description = "Missing field", body = crate::error::ErrorResponse),
        (status = 413, description = "File too large", body = crate::error::ErrorResponse),
        (status = 503, description = "Storage engine unavailable", body = crate::error::ErrorResponse),
    )
)]
pub async fn submit_work(
    service: web::Data<SubmissionService>,
    limits: web::Data<StorageSettings>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let upload = read_submission(payload, limits.max_upload_size).await?;
    let response = service.submit_work(upload).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Get one report.
#[utoipa::path(
    get,
    path = "/reports/{report_id}",
    tag = "Reports",
    params(("report_id" = String, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Report", body = Report),
        (status = 404, description = "Unknown report", body = crate::error::ErrorResponse),
        (status = 503, description = "Analysis engine unavailable", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_report(
    service: web::Data<SubmissionService>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let report = service.report(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// List the reports of a work.
#[utoipa::path(
    get,
    path = "/reports/work/{work_id}",
    tag = "Reports",
    params(("work_id" = String, Path, description = "Work ID")),
    responses(
        (status = 200, description = "Reports of the work", body = WorkReportsResponse),
        (status = 503, description = "Analysis engine unavailable", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_work_reports(
    service: web::Data<SubmissionService>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let reports = service.reports_for_work(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(reports))
}

/// Download a stored file through the gateway.
#[utoipa::path(
    get,
    path = "/files/{file_id}",
    tag = "Files",
    params(("file_id" = String, Path, description = "File ID")),
    responses(
        (status = 200, description = "File bytes (application/octet-stream or the stored content type)"),
        (status = 404, description = "Unknown file", body = crate::error::ErrorResponse),
        (status = 503, description = "Storage engine unavailable", body = crate::error::ErrorResponse),
    )
)]
pub async fn download_file(
    service: web::Data<SubmissionService>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let (metadata, data) = service.download_file(&path.into_inner()).await?;
    Ok(attachment_response(&metadata, data))
}

/// Aggregated health of the gateway and both engines. Always 200.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Per-service health", body = GatewayHealthResponse)
    )
)]
pub async fn health(service: web::Data<SubmissionService>) -> HttpResponse {
    HttpResponse::Ok().json(service.health().await)
}

/// Configure gateway routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/submit").route(web::post().to(submit_work)))
        .service(web::resource("/reports/work/{work_id}").route(web::get().to(get_work_reports)))
        .service(web::resource("/reports/{report_id}").route(web::get().to(get_report)))
        .service(web::resource("/files/{file_id}").route(web::get().to(download_file)))
        .service(web::resource("/health").route(web::get().to(health)));
}

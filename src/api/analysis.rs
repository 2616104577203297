//! Analysis engine API handlers.

use actix_web::{HttpResponse, web};

use crate::error::{AppError, AppResult};
use crate::models::{
    AnalyzeRequest, ListReportsQuery, Report, ReportListResponse, UpdateReportStatusRequest,
    WorkReportsResponse,
};
use crate::services::AnalysisEngine;

/// Analyse a stored file.
///
/// A failed analysis is still persisted; the error body's `details` carries
/// its report id.
#[utoipa::path(
    post,
    path = "/analyze",
    tag = "Analysis",
    request_body = AnalyzeRequest,
    responses(
        (status = 201, description = "Report created", body = Report),
        (status = 400, description = "Missing work_id or file_id", body = crate::error::ErrorResponse),
        (status = 500, description = "Analysis failed; failed report persisted", body = crate::error::ErrorResponse),
    )
)]
pub async fn analyze_file(
    engine: web::Data<AnalysisEngine>,
    body: web::Json<AnalyzeRequest>,
) -> AppResult<HttpResponse> {
    let report = engine
        .analyze_file(&body.into_inner())
        .await
        .map_err(AppError::from)?;

    Ok(HttpResponse::Created().json(report))
}

/// Get a report with its similar works.
#[utoipa::path(
    get,
    path = "/reports/{report_id}",
    tag = "Reports",
    params(("report_id" = String, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Report", body = Report),
        (status = 404, description = "Unknown report", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_report(
    engine: web::Data<AnalysisEngine>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let report = engine.get_report(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// List all reports of a work, newest first.
#[utoipa::path(
    get,
    path = "/reports/work/{work_id}",
    tag = "Reports",
    params(("work_id" = String, Path, description = "Work ID")),
    responses(
        (status = 200, description = "Reports of the work", body = WorkReportsResponse),
    )
)]
pub async fn get_work_reports(
    engine: web::Data<AnalysisEngine>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let reports = engine.reports_for_work(&path.into_inner()).await?;
    let count = reports.len();
    Ok(HttpResponse::Ok().json(WorkReportsResponse { reports, count }))
}

/// List reports with filtering and pagination.
#[utoipa::path(
    get,
    path = "/reports",
    tag = "Reports",
    params(ListReportsQuery),
    responses(
        (status = 200, description = "Page of reports", body = ReportListResponse),
    )
)]
pub async fn list_reports(
    engine: web::Data<AnalysisEngine>,
    query: web::Query<ListReportsQuery>,
) -> AppResult<HttpResponse> {
    let page = engine.list_reports(&query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Change a report's status.
#[utoipa::path(
    patch,
    path = "/reports/{report_id}/status",
    tag = "Reports",
    params(("report_id" = String, Path, description = "Report ID")),
    request_body = UpdateReportStatusRequest,
    responses(
        (status = 200, description = "Updated report", body = Report),
        (status = 400, description = "Failed status without error message", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown report", body = crate::error::ErrorResponse),
    )
)]
pub async fn update_report_status(
    engine: web::Data<AnalysisEngine>,
    path: web::Path<String>,
    body: web::Json<UpdateReportStatusRequest>,
) -> AppResult<HttpResponse> {
    let report = engine
        .update_report_status(&path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(report))
}

/// Delete a report and its similar works.
#[utoipa::path(
    delete,
    path = "/reports/{report_id}",
    tag = "Reports",
    params(("report_id" = String, Path, description = "Report ID")),
    responses(
        (status = 204, description = "Report deleted"),
        (status = 404, description = "Unknown report", body = crate::error::ErrorResponse),
    )
)]
pub async fn delete_report(
    engine: web::Data<AnalysisEngine>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    engine.delete_report(&path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Configure analysis engine routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/analyze").route(web::post().to(analyze_file)))
        .service(web::resource("/reports").route(web::get().to(list_reports)))
        .service(web::resource("/reports/work/{work_id}").route(web::get().to(get_work_reports)))
        .service(
            web::resource("/reports/{report_id}")
                .route(web::get().to(get_report))
                .route(web::delete().to(delete_report)),
        )
        .service(
            web::resource("/reports/{report_id}/status")
                .route(web::patch().to(update_report_status)),
        );
}

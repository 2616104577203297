//! Storage engine API handlers.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use tracing::debug;

use crate::api::transfer::{attachment_response, read_submission};
use crate::error::AppResult;
use crate::models::{DuplicateFilesResponse, FileMetadata, UploadResponse, WorkFilesResponse};
use crate::services::StorageEngine;

/// Upload a file for a student's assignment.
///
/// Multipart fields: `student_id`, `assignment_id`, `file`.
#[utoipa::path(
    post,
    path = "/files",
    tag = "Files",
    request_body(content_type = "multipart/form-data", description = "student_id, assignment_id and file parts"),
    responses(
        (status = 201, description = "File stored", body = UploadResponse),
        (status = 400, description = "Missing field or empty file", body = crate::error::ErrorResponse),
        (status = 413, description = "File too large", body = crate::error::ErrorResponse),
        (status = 500, description = "Disk or database failure", body = crate::error::ErrorResponse),
    )
)]
pub async fn upload_file(
    engine: web::Data<StorageEngine>,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let upload = read_submission(payload, engine.max_upload_size()).await?;
    let (file, _work) = engine.upload(upload).await?;

    Ok(HttpResponse::Created().json(UploadResponse::from(&file)))
}

/// Download a stored file as an attachment.
#[utoipa::path(
    get,
    path = "/files/{file_id}",
    tag = "Files",
    params(("file_id" = String, Path, description = "File ID")),
    responses(
        (status = 200, description = "File bytes (application/octet-stream or the stored content type)"),
        (status = 404, description = "Unknown file", body = crate::error::ErrorResponse),
        (status = 500, description = "Bytes missing from disk", body = crate::error::ErrorResponse),
    )
)]
pub async fn download_file(
    engine: web::Data<StorageEngine>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let file_id = path.into_inner();
    let content = engine.get_file_content(&file_id).await?;

    debug!(file_id = %file_id, size = content.data.len(), "Serving file");
    Ok(attachment_response(&content.metadata, content.data))
}

/// Get file metadata including checksums.
#[utoipa::path(
    get,
    path = "/files/{file_id}/metadata",
    tag = "Files",
    params(("file_id" = String, Path, description = "File ID")),
    responses(
        (status = 200, description = "File metadata", body = FileMetadata),
        (status = 404, description = "Unknown file", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_file_metadata(
    engine: web::Data<StorageEngine>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let metadata = engine.get_file_metadata(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(metadata))
}

/// List other files sharing this file's checksum.
#[utoipa::path(
    get,
    path = "/files/{file_id}/exists",
    tag = "Files",
    params(("file_id" = String, Path, description = "File ID")),
    responses(
        (status = 200, description = "Duplicate file IDs (at most one)", body = DuplicateFilesResponse),
        (status = 404, description = "Unknown file", body = crate::error::ErrorResponse),
    )
)]
pub async fn check_file_exists(
    engine: web::Data<StorageEngine>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let files = engine.check_file_exists(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(DuplicateFilesResponse { files }))
}

/// Delete a file and its bytes.
#[utoipa::path(
    delete,
    path = "/files/{file_id}",
    tag = "Files",
    params(("file_id" = String, Path, description = "File ID")),
    responses(
        (status = 204, description = "File deleted"),
        (status = 404, description = "Unknown file", body = crate::error::ErrorResponse),
    )
)]
pub async fn delete_file(
    engine: web::Data<StorageEngine>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    engine.delete_file(&path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// List the files of a work.
#[utoipa::path(
    get,
    path = "/works/{work_id}/files",
    tag = "Works",
    params(("work_id" = String, Path, description = "Work ID")),
    responses(
        (status = 200, description = "Files of the work, oldest first", body = WorkFilesResponse),
        (status = 404, description = "Unknown work", body = crate::error::ErrorResponse),
    )
)]
pub async fn list_work_files(
    engine: web::Data<StorageEngine>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let files = engine.list_work_files(&path.into_inner()).await?;
    let count = files.len();
    Ok(HttpResponse::Ok().json(WorkFilesResponse { files, count }))
}

/// Raw file bytes for sibling services.
#[utoipa::path(
    get,
    path = "/internal/files/{file_id}/content",
    tag = "Internal",
    params(("file_id" = String, Path, description = "File ID")),
    responses(
        (status = 200, description = "Raw file bytes"),
        (status = 404, description = "Unknown file", body = crate::error::ErrorResponse),
        (status = 500, description = "Bytes missing from disk", body = crate::error::ErrorResponse),
    )
)]
pub async fn get_file_content(
    engine: web::Data<StorageEngine>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let content = engine.get_file_content(&path.into_inner()).await?;
    Ok(HttpResponse::Ok()
        .content_type("application/octet-stream")
        .body(content.data))
}

/// Configure storage engine routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/files").route(web::post().to(upload_file)))
        .service(
            web::resource("/files/{file_id}")
                .route(web::get().to(download_file))
                .route(web::delete().to(delete_file)),
        )
        .service(web::resource("/files/{file_id}/metadata").route(web::get().to(get_file_metadata)))
        .service(web::resource("/files/{file_id}/exists").route(web::get().to(check_file_exists)))
        .service(web::resource("/works/{work_id}/files").route(web::get().to(list_work_files)))
        .service(
            web::resource("/internal/files/{file_id}/content")
                .route(web::get().to(get_file_content)),
        );
}

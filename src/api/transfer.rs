//! Multipart intake and file download responses shared by the storage
//! engine and the gateway.

use actix_multipart::Multipart;
use actix_web::HttpResponse;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use futures_util::StreamExt;

use crate::error::{AppError, AppResult};
use crate::models::FileMetadata;
use crate::services::FileStore;
use crate::services::storage_engine::NewUpload;

/// Upper bound for a plain text form field.
const MAX_TEXT_FIELD: usize = 1024;

/// Read `student_id`, `assignment_id` and `file` from a multipart body.
///
/// The file is buffered in memory and rejected as soon as it passes
/// `max_file_size`. Unknown fields are drained and ignored.
pub async fn read_submission(mut payload: Multipart, max_file_size: usize) -> AppResult<NewUpload> {
    let mut student_id: Option<String> = None;
    let mut assignment_id: Option<String> = None;
    let mut file: Option<(String, Option<String>, Vec<u8>)> = None;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::InvalidInput(format!("Multipart error: {}", e)))?;

        let content_disposition = field
            .content_disposition()
            .ok_or_else(|| AppError::InvalidInput("Missing content disposition".to_string()))?;
        let name = content_disposition.get_name().unwrap_or_default().to_string();
        let filename = content_disposition.get_filename().map(str::to_string);
        let content_type = field.content_type().map(|m| m.to_string());

        let limit = if name == "file" { max_file_size } else { MAX_TEXT_FIELD };
        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
            if data.len() + chunk.len() > limit {
                return Err(if name == "file" {
                    AppError::PayloadTooLarge(format!("file exceeds {} bytes", max_file_size))
                } else {
                    AppError::InvalidInput(format!("field '{}' is too long", name))
                });
            }
            data.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "student_id" => student_id = Some(text_field(&name, data)?),
            "assignment_id" => assignment_id = Some(text_field(&name, data)?),
            "file" => {
                let filename = filename
                    .filter(|f| !f.trim().is_empty())
                    .unwrap_or_else(|| "upload".to_string());
                file = Some((filename, content_type, data));
            }
            _ => {}
        }
    }

    let mut missing = Vec::new();
    if student_id.as_deref().is_none_or(|s| s.is_empty()) {
        missing.push("student_id");
    }
    if assignment_id.as_deref().is_none_or(|s| s.is_empty()) {
        missing.push("assignment_id");
    }
    if file.is_none() {
        missing.push("file");
    }
    if !missing.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "missing required fields: {}",
            missing.join(", ")
        )));
    }

    let (original_filename, content_type, data) = file.unwrap_or_default();
    if data.is_empty() {
        return Err(AppError::InvalidInput("file is empty".to_string()));
    }

    Ok(NewUpload {
        student_id: student_id.unwrap_or_default(),
        assignment_id: assignment_id.unwrap_or_default(),
        original_filename,
        content_type,
        data,
    })
}

fn text_field(name: &str, data: Vec<u8>) -> AppResult<String> {
    String::from_utf8(data)
        .map(|s| s.trim().to_string())
        .map_err(|_| AppError::InvalidInput(format!("field '{}' must be UTF-8 text", name)))
}

/// Serve file bytes as an attachment named after the original upload.
pub fn attachment_response(metadata: &FileMetadata, data: Vec<u8>) -> HttpResponse {
    let content_type = metadata
        .content_type
        .clone()
        .filter(|ct| !ct.is_empty())
        .unwrap_or_else(|| FileStore::content_type_for_filename(&metadata.original_filename).to_string());

    HttpResponse::Ok()
        .content_type(content_type)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(metadata.original_filename.clone())],
        })
        .body(data)
}

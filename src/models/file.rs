//! Storage engine DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::{file, work};

/// Response after a file has been stored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub file_id: String,
    pub work_id: String,
    /// Original filename as supplied by the client.
    pub filename: String,
    pub size_bytes: i64,
    pub uploaded_at: DateTime<Utc>,
    pub storage_path: String,
}

impl From<&file::Model> for UploadResponse {
    fn from(f: &file::Model) -> Self {
        Self {
            file_id: f.file_id.clone(),
            work_id: f.work_id.clone(),
            filename: f.original_filename.clone(),
            size_bytes: f.size_bytes,
            uploaded_at: f.uploaded_at,
            storage_path: f.storage_path.clone(),
        }
    }
}

/// File metadata joined with its owning work.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileMetadata {
    pub file_id: String,
    pub work_id: String,
    pub student_id: String,
    pub assignment_id: String,
    pub filename: String,
    pub original_filename: String,
    #[serde(default)]
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub storage_path: String,
    /// MD5 checksum (hex).
    #[serde(default)]
    pub checksum: Option<String>,
    #[serde(default)]
    pub checksum_sha256: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl FileMetadata {
    pub fn from_models(f: file::Model, w: &work::Model) -> Self {
        Self {
            file_id: f.file_id,
            work_id: f.work_id,
            student_id: w.student_id.clone(),
            assignment_id: w.assignment_id.clone(),
            filename: f.filename,
            original_filename: f.original_filename,
            content_type: f.content_type,
            size_bytes: f.size_bytes,
            storage_path: f.storage_path,
            checksum: f.checksum_md5,
            checksum_sha256: f.checksum_sha256,
            uploaded_at: f.uploaded_at,
        }
    }
}

/// Other files sharing the target's checksum.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DuplicateFilesResponse {
    pub files: Vec<String>,
}

/// Files belonging to one work.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkFilesResponse {
    pub files: Vec<FileMetadata>,
    pub count: usize,
}

//! Storage engine: content-addressed upload, duplicate lookup and retrieval.

use std::path::Path;

use chrono::Utc;
use tracing::{info, warn};

use crate::db::DbPool;
use crate::entity::{file, work};
use crate::error::{AppError, AppResult};
use crate::models::FileMetadata;
use crate::services::file_store::{Checksums, FileStore, new_file_id};

/// An upload as received from the transport layer.
#[derive(Debug, Clone)]
pub struct NewUpload {
    pub student_id: String,
    pub assignment_id: String,
    pub original_filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// File bytes together with the metadata needed to serve them.
#[derive(Debug, Clone)]
pub struct FileContent {
    pub metadata: FileMetadata,
    pub data: Vec<u8>,
}

/// Owns works and files.
#[derive(Clone)]
pub struct StorageEngine {
    db: DbPool,
    store: FileStore,
    max_upload_size: usize,
}

impl StorageEngine {
    pub fn new(db: DbPool, store: FileStore, max_upload_size: usize) -> Self {
        Self {
            db,
            store,
            max_upload_size,
        }
    }

    pub fn max_upload_size(&self) -> usize {
        self.max_upload_size
    }

    /// Persist an upload under its (student, assignment) work.
    ///
    /// Bytes are written before the row is recorded; if recording fails the
    /// bytes are removed again, so no row ever points at missing bytes.
    pub async fn upload(&self, upload: NewUpload) -> AppResult<(file::Model, work::Model)> {
        let student_id = upload.student_id.trim();
        let assignment_id = upload.assignment_id.trim();
        if student_id.is_empty() || assignment_id.is_empty() {
            return Err(AppError::InvalidInput(
                "student_id and assignment_id are required".to_string(),
            ));
        }
        if upload.data.is_empty() {
            return Err(AppError::InvalidInput("file is empty".to_string()));
        }
        if upload.data.len() > self.max_upload_size {
            return Err(AppError::PayloadTooLarge(format!(
                "file is {} bytes, limit is {}",
                upload.data.len(),
                self.max_upload_size
            )));
        }

        let work = self.db.get_or_create_work(student_id, assignment_id).await?;

        let file_id = new_file_id();
        let checksums = Checksums::compute(&upload.data);
        let path = self.store.path_for(&file_id);

        self.store.write(&path, &upload.data).await?;

        let row = file::Model {
            file_id: file_id.clone(),
            work_id: work.work_id.clone(),
            filename: file_id.clone(),
            original_filename: upload.original_filename,
            content_type: upload.content_type,
            size_bytes: upload.data.len() as i64,
            storage_path: path.to_string_lossy().into_owned(),
            checksum_md5: Some(checksums.md5),
            checksum_sha256: Some(checksums.sha256),
            uploaded_at: Utc::now(),
        };

        let stored = match self.db.insert_file(row).await {
            Ok(stored) => stored,
            Err(e) => {
                if let Err(cleanup) = self.store.remove(&path).await {
                    warn!(file_id = %file_id, error = %cleanup, "Failed to remove bytes after insert failure");
                }
                return Err(e);
            }
        };

        info!(
            file_id = %stored.file_id,
            work_id = %stored.work_id,
            size_bytes = stored.size_bytes,
            "File stored"
        );

        Ok((stored, work))
    }

    /// Other files sharing the target's MD5, at most one.
    ///
    /// Advisory: a missing checksum or a failed lookup yields an empty list.
    pub async fn check_file_exists(&self, file_id: &str) -> AppResult<Vec<String>> {
        let target = self
            .db
            .get_file_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("File {}", file_id)))?;

        let Some(checksum) = target.checksum_md5.as_deref() else {
            return Ok(Vec::new());
        };

        match self.db.find_duplicate_by_md5(checksum, file_id).await {
            Ok(found) => Ok(found.into_iter().map(|f| f.file_id).collect()),
            Err(e) => {
                warn!(file_id = %file_id, error = %e, "Duplicate lookup failed");
                Ok(Vec::new())
            }
        }
    }

    /// File metadata joined with its work.
    pub async fn get_file_metadata(&self, file_id: &str) -> AppResult<FileMetadata> {
        self.db
            .get_file_metadata(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("File {}", file_id)))
    }

    /// Metadata plus bytes. Bytes missing behind an existing row is reported
    /// as `NotFoundOnDisk`, not `NotFound`.
    pub async fn get_file_content(&self, file_id: &str) -> AppResult<FileContent> {
        let metadata = self.get_file_metadata(file_id).await?;
        let path = Path::new(&metadata.storage_path);

        if !self.store.exists(path).await {
            warn!(file_id = %file_id, storage_path = %metadata.storage_path, "File row exists but bytes are missing");
            return Err(AppError::NotFoundOnDisk(file_id.to_string()));
        }

        let data = self.store.read(path).await?;
        Ok(FileContent { metadata, data })
    }

    /// All files of a work, oldest first.
    pub async fn list_work_files(&self, work_id: &str) -> AppResult<Vec<FileMetadata>> {
        let work = self
            .db
            .get_work_by_id(work_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Work {}", work_id)))?;

        let files = self.db.list_files_by_work(work_id).await?;
        Ok(files
            .into_iter()
            .map(|f| FileMetadata::from_models(f, &work))
            .collect())
    }

    /// Remove the row, then the bytes. Missing bytes are ignored.
    pub async fn delete_file(&self, file_id: &str) -> AppResult<()> {
        let target = self
            .db
            .get_file_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("File {}", file_id)))?;

        self.db.delete_file(file_id).await?;
        self.store.remove(Path::new(&target.storage_path)).await?;

        info!(file_id = %file_id, work_id = %target.work_id, "File deleted");
        Ok(())
    }
}

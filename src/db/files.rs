//! Database queries for stored files.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entity::file::{self, ActiveModel, Entity as File};
use crate::entity::work::Entity as Work;
use crate::error::{AppError, AppResult};
use crate::models::FileMetadata;

use super::DbPool;

impl DbPool {
    /// Insert a file row.
    pub async fn insert_file(&self, row: file::Model) -> AppResult<file::Model> {
        let model = ActiveModel {
            file_id: Set(row.file_id),
            work_id: Set(row.work_id),
            filename: Set(row.filename),
            original_filename: Set(row.original_filename),
            content_type: Set(row.content_type),
            size_bytes: Set(row.size_bytes),
            storage_path: Set(row.storage_path),
            checksum_md5: Set(row.checksum_md5),
            checksum_sha256: Set(row.checksum_sha256),
            uploaded_at: Set(row.uploaded_at),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert file: {}", e)))?;

        Ok(result)
    }

    /// Get a file row by ID.
    pub async fn get_file_by_id(&self, file_id: &str) -> AppResult<Option<file::Model>> {
        let result = File::find_by_id(file_id.to_string())
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get file: {}", e)))?;

        Ok(result)
    }

    /// Get a file joined with its owning work.
    pub async fn get_file_metadata(&self, file_id: &str) -> AppResult<Option<FileMetadata>> {
        let result = File::find_by_id(file_id.to_string())
            .find_also_related(Work)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get file metadata: {}", e)))?;

        match result {
            Some((f, Some(w))) => Ok(Some(FileMetadata::from_models(f, &w))),
            Some((f, None)) => Err(AppError::Database(format!(
                "File {} references missing work {}",
                f.file_id, f.work_id
            ))),
            None => Ok(None),
        }
    }

    /// List files of a work, oldest first.
    pub async fn list_files_by_work(&self, work_id: &str) -> AppResult<Vec<file::Model>> {
        let result = File::find()
            .filter(file::Column::WorkId.eq(work_id))
            .order_by_asc(file::Column::UploadedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list files: {}", e)))?;

        Ok(result)
    }

    /// Find the earliest other file with the given MD5 checksum.
    pub async fn find_duplicate_by_md5(
        &self,
        checksum_md5: &str,
        exclude_file_id: &str,
    ) -> AppResult<Option<file::Model>> {
        let result = File::find()
            .filter(file::Column::ChecksumMd5.eq(checksum_md5))
            .filter(file::Column::FileId.ne(exclude_file_id))
            .order_by_asc(file::Column::UploadedAt)
            .limit(1)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to look up checksum: {}", e)))?;

        Ok(result)
    }

    /// Delete a file row. Returns whether a row existed.
    pub async fn delete_file(&self, file_id: &str) -> AppResult<bool> {
        let result = File::delete_by_id(file_id.to_string())
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete file: {}", e)))?;

        Ok(result.rows_affected > 0)
    }
}

//! Sharded on-disk blob store for uploaded files.
//!
//! Layout: `{root}/{first two chars of file_id}/{file_id}`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Hex digests of a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checksums {
    pub md5: String,
    pub sha256: String,
}

impl Checksums {
    pub fn compute(data: &[u8]) -> Self {
        Self {
            md5: format!("{:x}", md5::compute(data)),
            sha256: hex::encode(Sha256::digest(data)),
        }
    }
}

/// Mint a new file id: 8 random hex chars then 16 hex chars of the
/// nanosecond clock. The random prefix spreads files evenly over shards.
pub fn new_file_id() -> String {
    let salt = hex::encode(&Uuid::new_v4().as_bytes()[..4]);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    format!("{}{:016x}", salt, nanos)
}

/// Filesystem blob store rooted at one directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Physical location for a file id.
    pub fn path_for(&self, file_id: &str) -> PathBuf {
        let shard: String = file_id.chars().take(2).collect();
        self.root.join(shard).join(file_id)
    }

    /// Create the root directory and check that it is writable.
    pub async fn validate(&self) -> AppResult<()> {
        fs::create_dir_all(&self.root).await.map_err(|e| {
            AppError::Storage(format!("create_dir_all({}): {}", self.root.display(), e))
        })?;

        let probe = self.root.join(".write-check");
        fs::write(&probe, b"ok")
            .await
            .map_err(|e| AppError::Storage(format!("write({}): {}", probe.display(), e)))?;
        let _ = fs::remove_file(&probe).await;

        Ok(())
    }

    /// Write bytes to `path`, creating the shard directory first.
    ///
    /// Writes to a temporary sibling and renames, so readers never see a
    /// partially written file.
    pub async fn write(&self, path: &Path, data: &[u8]) -> AppResult<()> {
        debug!(full_path = %path.display(), size = data.len(), "file_store: write");

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                warn!(parent = %parent.display(), error = %e, "file_store: create_dir_all failed");
                AppError::Storage(format!("Failed to create directory: {}", e))
            })?;
        }

        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await.map_err(|e| {
            warn!(temp_path = %temp_path.display(), error = %e, "file_store: create failed");
            AppError::Storage(format!("Failed to create file: {}", e))
        })?;
        file.write_all(data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write file: {}", e)))?;
        file.sync_all()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to sync file: {}", e)))?;
        drop(file);

        if let Err(e) = fs::rename(&temp_path, path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(AppError::Storage(format!("Failed to move file into place: {}", e)));
        }

        Ok(())
    }

    /// Read the bytes at `path`.
    pub async fn read(&self, path: &Path) -> AppResult<Vec<u8>> {
        fs::read(path).await.map_err(|e| {
            AppError::Storage(format!("Failed to read {}: {}", path.display(), e))
        })
    }

    /// Remove the bytes at `path`. A missing file is not an error.
    pub async fn remove(&self, path: &Path) -> AppResult<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(full_path = %path.display(), "file_store: already absent");
                Ok(())
            }
            Err(e) => Err(AppError::Storage(format!(
                "Failed to delete {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Whether bytes exist at `path`.
    pub async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    /// Get the content type for a file based on its extension.
    pub fn content_type_for_extension(ext: &str) -> &'static str {
        match ext.to_lowercase().as_str() {
            "txt" | "text" | "md" => "text/plain",
            "html" | "htm" => "text/html",
            "csv" => "text/csv",
            "json" => "application/json",
            "xml" => "application/xml",
            "pdf" => "application/pdf",
            "doc" => "application/msword",
            "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            "odt" => "application/vnd.oasis.opendocument.text",
            "rtf" => "application/rtf",
            "zip" => "application/zip",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            _ => "application/octet-stream",
        }
    }

    /// Content type guessed from a filename.
    pub fn content_type_for_filename(filename: &str) -> &'static str {
        Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(Self::content_type_for_extension)
            .unwrap_or("application/octet-stream")
    }
}

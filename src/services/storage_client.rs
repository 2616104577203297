//! HTTP client for the storage engine.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::{DuplicateFilesResponse, FileMetadata, UploadResponse};
use crate::services::storage_engine::NewUpload;
use crate::services::upstream::{Deadline, decode_json, endpoint, error_from_response};

const SERVICE: &str = "storage-engine";

/// Storage operations the gateway performs on behalf of clients.
#[async_trait]
pub trait FileStorageApi: Send + Sync {
    async fn upload(&self, upload: &NewUpload, deadline: Deadline) -> AppResult<UploadResponse>;
    async fn metadata(&self, file_id: &str, deadline: Deadline) -> AppResult<FileMetadata>;
    async fn download(&self, file_id: &str, deadline: Deadline) -> AppResult<Vec<u8>>;
    async fn health(&self, deadline: Deadline) -> AppResult<()>;
}

/// Storage reads the analysis engine depends on.
#[async_trait]
pub trait FileContentSource: Send + Sync {
    async fn file_content(&self, file_id: &str, deadline: Deadline) -> AppResult<Vec<u8>>;
    async fn file_metadata(&self, file_id: &str, deadline: Deadline) -> AppResult<FileMetadata>;
    async fn duplicate_files(&self, file_id: &str, deadline: Deadline) -> AppResult<Vec<String>>;
}

/// reqwest-backed storage engine client.
#[derive(Clone)]
pub struct StorageClient {
    http: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
}

impl StorageClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, request_timeout: Duration) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            request_timeout,
        }
    }

    async fn get_bytes(&self, url: String, deadline: Deadline) -> AppResult<Vec<u8>> {
        let response = self
            .http
            .get(&url)
            .timeout(deadline.call_timeout(self.request_timeout)?)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(SERVICE, response).await);
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl FileStorageApi for StorageClient {
    async fn upload(&self, upload: &NewUpload, deadline: Deadline) -> AppResult<UploadResponse> {
        let mut part = Part::bytes(upload.data.clone()).file_name(upload.original_filename.clone());
        if let Some(ref content_type) = upload.content_type {
            part = part.mime_str(content_type).map_err(|e| {
                AppError::InvalidInput(format!("Invalid content type '{}': {}", content_type, e))
            })?;
        }

        let form = Form::new()
            .text("student_id", upload.student_id.clone())
            .text("assignment_id", upload.assignment_id.clone())
            .part("file", part);

        debug!(size = upload.data.len(), "Forwarding upload to storage engine");

        let response = self
            .http
            .post(endpoint(&self.base_url, &["files"]))
            .timeout(deadline.call_timeout(self.request_timeout)?)
            .multipart(form)
            .send()
            .await?;

        decode_json(SERVICE, response).await
    }

    async fn metadata(&self, file_id: &str, deadline: Deadline) -> AppResult<FileMetadata> {
        let response = self
            .http
            .get(endpoint(&self.base_url, &["files", file_id, "metadata"]))
            .timeout(deadline.call_timeout(self.request_timeout)?)
            .send()
            .await?;

        decode_json(SERVICE, response).await
    }

    async fn download(&self, file_id: &str, deadline: Deadline) -> AppResult<Vec<u8>> {
        self.get_bytes(endpoint(&self.base_url, &["files", file_id]), deadline)
            .await
    }

    async fn health(&self, deadline: Deadline) -> AppResult<()> {
        let response = self
            .http
            .get(endpoint(&self.base_url, &["health"]))
            .timeout(deadline.call_timeout(self.request_timeout)?)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(SERVICE, response).await)
        }
    }
}

#[async_trait]
impl FileContentSource for StorageClient {
    async fn file_content(&self, file_id: &str, deadline: Deadline) -> AppResult<Vec<u8>> {
        self.get_bytes(
            endpoint(&self.base_url, &["internal", "files", file_id, "content"]),
            deadline,
        )
        .await
    }

    async fn file_metadata(&self, file_id: &str, deadline: Deadline) -> AppResult<FileMetadata> {
        FileStorageApi::metadata(self, file_id, deadline).await
    }

    async fn duplicate_files(&self, file_id: &str, deadline: Deadline) -> AppResult<Vec<String>> {
        let response = self
            .http
            .get(endpoint(&self.base_url, &["files", file_id, "exists"]))
            .timeout(deadline.call_timeout(self.request_timeout)?)
            .send()
            .await?;

        let body: DuplicateFilesResponse = decode_json(SERVICE, response).await?;
        Ok(body.files)
    }
}

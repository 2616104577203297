//! Gateway submission workflow.
//!
//! Upload is the only step whose failure reaches the client. Analysis runs
//! after a successful upload and its failures are logged, never returned.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{
    AnalyzeRequest, FileMetadata, GatewayHealthResponse, Report, WorkReportsResponse,
    WorkSubmissionResponse,
};
use crate::services::analysis_client::FileAnalysisApi;
use crate::services::storage_client::FileStorageApi;
use crate::services::storage_engine::NewUpload;
use crate::services::upstream::Deadline;

const HEALTHY: &str = "healthy";
const UNHEALTHY: &str = "unhealthy";

/// Coordinates the storage and analysis engines for client requests.
#[derive(Clone)]
pub struct SubmissionService {
    storage: Arc<dyn FileStorageApi>,
    analysis: Arc<dyn FileAnalysisApi>,
    budget: Duration,
}

impl SubmissionService {
    pub fn new(
        storage: Arc<dyn FileStorageApi>,
        analysis: Arc<dyn FileAnalysisApi>,
        budget: Duration,
    ) -> Self {
        Self {
            storage,
            analysis,
            budget,
        }
    }

    /// Store a submission, then try to analyse it.
    ///
    /// The response is the same whether analysis succeeded or not.
    pub async fn submit_work(&self, upload: NewUpload) -> AppResult<WorkSubmissionResponse> {
        if upload.student_id.trim().is_empty() || upload.assignment_id.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "student_id and assignment_id are required".to_string(),
            ));
        }
        if upload.data.is_empty() {
            return Err(AppError::InvalidInput("file is required".to_string()));
        }

        let deadline = Deadline::after(self.budget);

        let uploaded = self
            .storage
            .upload(&upload, deadline)
            .await
            .map_err(|e| match e {
                AppError::InvalidInput(_) | AppError::ServiceUnavailable(_) => e,
                other => AppError::ServiceUnavailable(format!("file upload failed: {}", other)),
            })?;

        info!(
            target: "saga",
            work_id = %uploaded.work_id,
            file_id = %uploaded.file_id,
            size_bytes = uploaded.size_bytes,
            "Upload stored"
        );

        let request = AnalyzeRequest {
            work_id: uploaded.work_id.clone(),
            file_id: uploaded.file_id.clone(),
            student_id: Some(upload.student_id.trim().to_string()),
            assignment_id: Some(upload.assignment_id.trim().to_string()),
        };

        match self.analysis.analyze(&request, deadline).await {
            Ok(report) => info!(
                target: "saga",
                work_id = %uploaded.work_id,
                file_id = %uploaded.file_id,
                report_id = %report.report_id,
                is_plagiarism = report.is_plagiarism,
                "Analysis completed"
            ),
            Err(e) => warn!(
                target: "saga",
                work_id = %uploaded.work_id,
                file_id = %uploaded.file_id,
                error = %e,
                "Analysis failed after upload; submission still accepted"
            ),
        }

        Ok(WorkSubmissionResponse {
            work_id: uploaded.work_id,
            file_id: uploaded.file_id,
            submitted_at: uploaded.uploaded_at,
        })
    }

    /// Metadata and bytes of a stored file.
    pub async fn download_file(&self, file_id: &str) -> AppResult<(FileMetadata, Vec<u8>)> {
        let deadline = Deadline::after(self.budget);
        let metadata = self.storage.metadata(file_id, deadline).await?;
        let data = self.storage.download(file_id, deadline).await?;
        Ok((metadata, data))
    }

    pub async fn report(&self, report_id: &str) -> AppResult<Report> {
        self.analysis
            .report(report_id, Deadline::after(self.budget))
            .await
    }

    pub async fn reports_for_work(&self, work_id: &str) -> AppResult<WorkReportsResponse> {
        self.analysis
            .reports_for_work(work_id, Deadline::after(self.budget))
            .await
    }

    /// Probe both engines. Never fails.
    pub async fn health(&self) -> GatewayHealthResponse {
        let deadline = Deadline::after(self.budget);
        let (storage, analysis) = tokio::join!(
            self.storage.health(deadline),
            self.analysis.health(deadline)
        );

        let describe = |result: AppResult<()>, service: &str| match result {
            Ok(()) => HEALTHY.to_string(),
            Err(e) => {
                warn!(service = %service, error = %e, "Downstream health check failed");
                UNHEALTHY.to_string()
            }
        };

        GatewayHealthResponse {
            status: "OK".to_string(),
            gateway: HEALTHY.to_string(),
            file_storage: describe(storage, "storage-engine"),
            file_analysis: describe(analysis, "analysis-engine"),
        }
    }
}

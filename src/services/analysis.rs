//! Analysis engine: scores a stored file, records the verdict and links
//! checksum duplicates.

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entity::report;
use crate::error::{AppError, AppResult};
use crate::models::{
    AnalyzeRequest, ListReportsQuery, Report, ReportListResponse, ReportStatus, SimilarWork,
    UpdateReportStatusRequest,
};
use crate::services::report_cache::ReportCache;
use crate::services::scoring::{self, PlagiarismScorer};
use crate::services::storage_client::FileContentSource;
use crate::services::upstream::Deadline;

/// Scores above this trigger duplicate linking.
const SIMILARITY_LINK_THRESHOLD: f32 = 50.0;

/// Checksum matches are exact copies.
const EXACT_MATCH_PERCENTAGE: f32 = 100.0;

/// Why `analyze_file` did not produce a completed report.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// A failed report was built and persisted.
    #[error("analysis failed: {reason}")]
    Failed { report: Box<Report>, reason: String },

    /// The request was rejected or the report could not be stored.
    #[error(transparent)]
    App(#[from] AppError),
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Failed { report, reason } => AppError::AnalysisFailed {
                report_id: report.report_id,
                reason,
            },
            AnalysisError::App(e) => e,
        }
    }
}

/// Mint a report id from the file id, the clock and a random salt.
pub fn new_report_id(file_id: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let digest = Sha256::digest(format!("{}-{}-{}", file_id, nanos, Uuid::new_v4()).as_bytes());
    format!("report-{}", &hex::encode(digest)[..16])
}

/// Owns reports and similar works.
#[derive(Clone)]
pub struct AnalysisEngine {
    db: DbPool,
    source: Arc<dyn FileContentSource>,
    scorer: Arc<dyn PlagiarismScorer>,
    cache: Option<ReportCache>,
    threshold: f32,
    max_content_size: usize,
    analysis_timeout: Duration,
}

impl AnalysisEngine {
    pub fn new(
        db: DbPool,
        source: Arc<dyn FileContentSource>,
        scorer: Arc<dyn PlagiarismScorer>,
        cache: Option<ReportCache>,
        threshold: f32,
        max_content_size: usize,
        analysis_timeout: Duration,
    ) -> Self {
        Self {
            db,
            source,
            scorer,
            cache,
            threshold,
            max_content_size,
            analysis_timeout,
        }
    }

    /// Analyse one stored file and persist the outcome.
    ///
    /// Content that cannot be fetched or is too large still produces a
    /// persisted report in status `failed`, returned inside
    /// [`AnalysisError::Failed`]. Storage calls share one deadline of
    /// `analysis_timeout`.
    pub async fn analyze_file(&self, request: &AnalyzeRequest) -> Result<Report, AnalysisError> {
        let work_id = request.work_id.trim();
        let file_id = request.file_id.trim();
        if work_id.is_empty() || file_id.is_empty() {
            return Err(AppError::InvalidInput("work_id and file_id are required".to_string()).into());
        }

        let started = Instant::now();
        let deadline = Deadline::after(self.analysis_timeout);
        let (student_id, assignment_id) = self.resolve_owner(request, file_id, deadline).await;

        let mut row = report::Model {
            report_id: new_report_id(file_id),
            work_id: work_id.to_string(),
            file_id: file_id.to_string(),
            student_id,
            assignment_id,
            plagiarism_score: 0.0,
            is_plagiarism: false,
            word_count: 0,
            analysis_duration_ms: 0,
            status: ReportStatus::Completed.as_str().to_string(),
            error_message: None,
            created_at: Utc::now(),
        };

        let content = match self.source.file_content(file_id, deadline).await {
            Ok(content) => content,
            Err(e) => {
                let reason = format!("failed to fetch file content: {}", e);
                return Err(self.persist_failure(row, started, reason).await);
            }
        };

        if content.len() > self.max_content_size {
            let reason = format!(
                "file is {} bytes, limit is {}",
                content.len(),
                self.max_content_size
            );
            return Err(self.persist_failure(row, started, reason).await);
        }

        let text = String::from_utf8_lossy(&content);
        let score = scoring::normalize_score(self.scorer.score(&text));

        row.word_count = i32::try_from(scoring::count_words(&text)).unwrap_or(i32::MAX);
        row.plagiarism_score = score;
        row.is_plagiarism = scoring::is_plagiarism(score, self.threshold);

        let duplicates = if score > SIMILARITY_LINK_THRESHOLD {
            self.find_duplicates(&row.report_id, file_id, deadline).await
        } else {
            Vec::new()
        };

        row.analysis_duration_ms = started.elapsed().as_millis() as i64;
        let stored = self.db.insert_report(row).await?;
        let similar_works = self.link_duplicates(&stored, &duplicates).await;

        info!(
            report_id = %stored.report_id,
            file_id = %stored.file_id,
            score = stored.plagiarism_score,
            is_plagiarism = stored.is_plagiarism,
            similar = similar_works.len(),
            duration_ms = stored.analysis_duration_ms,
            "Analysis completed"
        );

        let report = Report::from_model(stored, similar_works);
        if let Some(ref cache) = self.cache {
            cache.insert(report.clone()).await;
        }

        Ok(report)
    }

    /// Fetch one report with its similar works. Read-through cache.
    pub async fn get_report(&self, report_id: &str) -> AppResult<Report> {
        if let Some(ref cache) = self.cache
            && let Some(hit) = cache.get(report_id).await
        {
            debug!(report_id = %report_id, "Report cache hit");
            return Ok(hit);
        }

        let row = self
            .db
            .get_report_by_id(report_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {}", report_id)))?;

        let report = self.with_similar_works(row).await?;
        if let Some(ref cache) = self.cache {
            cache.insert(report.clone()).await;
        }

        Ok(report)
    }

    /// All reports for a work, newest first.
    pub async fn reports_for_work(&self, work_id: &str) -> AppResult<Vec<Report>> {
        let rows = self.db.list_reports_by_work(work_id).await?;
        let mut reports = Vec::with_capacity(rows.len());
        for row in rows {
            reports.push(self.with_similar_works(row).await?);
        }
        Ok(reports)
    }

    /// Filtered, paginated listing.
    pub async fn list_reports(&self, query: &ListReportsQuery) -> AppResult<ReportListResponse> {
        let (rows, total) = self.db.list_reports(query).await?;
        let mut reports = Vec::with_capacity(rows.len());
        for row in rows {
            reports.push(self.with_similar_works(row).await?);
        }

        Ok(ReportListResponse {
            reports,
            total,
            limit: query.effective_limit(),
            offset: query.effective_offset(),
        })
    }

    pub async fn update_report_status(
        &self,
        report_id: &str,
        update: UpdateReportStatusRequest,
    ) -> AppResult<Report> {
        if update.status == ReportStatus::Failed
            && update.error_message.as_deref().is_none_or(|m| m.trim().is_empty())
        {
            return Err(AppError::InvalidInput(
                "error_message is required when status is failed".to_string(),
            ));
        }

        let row = self
            .db
            .update_report_status(report_id, update.status, update.error_message)
            .await?;

        if let Some(ref cache) = self.cache {
            cache.invalidate(report_id).await;
        }

        self.with_similar_works(row).await
    }

    pub async fn delete_report(&self, report_id: &str) -> AppResult<()> {
        self.db.delete_similar_works(report_id).await?;
        if !self.db.delete_report(report_id).await? {
            return Err(AppError::NotFound(format!("Report {}", report_id)));
        }

        if let Some(ref cache) = self.cache {
            cache.invalidate(report_id).await;
        }

        info!(report_id = %report_id, "Report deleted");
        Ok(())
    }

    async fn with_similar_works(&self, row: report::Model) -> AppResult<Report> {
        let similar = self
            .db
            .get_similar_works(&row.report_id)
            .await?
            .into_iter()
            .map(SimilarWork::from)
            .collect();
        Ok(Report::from_model(row, similar))
    }

    /// Student and assignment from the request, else from storage metadata.
    async fn resolve_owner(
        &self,
        request: &AnalyzeRequest,
        file_id: &str,
        deadline: Deadline,
    ) -> (String, String) {
        let given = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };
        let student_id = given(&request.student_id);
        let assignment_id = given(&request.assignment_id);

        if let (Some(s), Some(a)) = (&student_id, &assignment_id) {
            return (s.clone(), a.clone());
        }

        match self.source.file_metadata(file_id, deadline).await {
            Ok(meta) => (
                student_id.unwrap_or(meta.student_id),
                assignment_id.unwrap_or(meta.assignment_id),
            ),
            Err(e) => {
                debug!(file_id = %file_id, error = %e, "Owner lookup failed");
                (student_id.unwrap_or_default(), assignment_id.unwrap_or_default())
            }
        }
    }

    async fn find_duplicates(&self, report_id: &str, file_id: &str, deadline: Deadline) -> Vec<String> {
        match self.source.duplicate_files(file_id, deadline).await {
            Ok(files) => files,
            Err(e) => {
                warn!(
                    target: "enrichment",
                    report_id = %report_id,
                    file_id = %file_id,
                    error = %e,
                    "Duplicate lookup failed; report will have no similar works"
                );
                Vec::new()
            }
        }
    }

    async fn link_duplicates(&self, stored: &report::Model, duplicates: &[String]) -> Vec<SimilarWork> {
        let mut linked = Vec::with_capacity(duplicates.len());
        for duplicate in duplicates {
            match self
                .db
                .insert_similar_work(&stored.report_id, &stored.file_id, duplicate, EXACT_MATCH_PERCENTAGE)
                .await
            {
                Ok(row) => linked.push(SimilarWork::from(row)),
                Err(e) => warn!(
                    target: "enrichment",
                    report_id = %stored.report_id,
                    similar_file_id = %duplicate,
                    error = %e,
                    "Failed to record similar work"
                ),
            }
        }
        linked
    }

    async fn persist_failure(
        &self,
        mut row: report::Model,
        started: Instant,
        reason: String,
    ) -> AnalysisError {
        row.status = ReportStatus::Failed.as_str().to_string();
        row.error_message = Some(reason.clone());
        row.plagiarism_score = 0.0;
        row.is_plagiarism = false;
        row.word_count = 0;
        row.analysis_duration_ms = started.elapsed().as_millis() as i64;

        warn!(report_id = %row.report_id, file_id = %row.file_id, reason = %reason, "Analysis failed");

        let report_id = row.report_id.clone();
        let report = match self.db.insert_report(row).await {
            Ok(stored) => Report::from_model(stored, Vec::new()),
            Err(e) => {
                warn!(report_id = %report_id, error = %e, "Failed to persist failed report");
                return AnalysisError::App(e);
            }
        };

        if let Some(ref cache) = self.cache {
            cache.insert(report.clone()).await;
        }

        AnalysisError::Failed {
            report: Box::new(report),
            reason,
        }
    }
}

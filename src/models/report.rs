//! Report domain models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::{IntoParams, ToSchema};

use crate::entity::{report, similar_work};

/// Report status enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Completed,
    Failed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A checksum match recorded against a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SimilarWork {
    pub similar_id: String,
    pub report_id: String,
    pub original_work_id: String,
    pub similar_work_id: String,
    pub similarity_percentage: f32,
}

impl From<similar_work::Model> for SimilarWork {
    fn from(m: similar_work::Model) -> Self {
        Self {
            similar_id: m.similar_id,
            report_id: m.report_id,
            original_work_id: m.original_work_id,
            similar_work_id: m.similar_work_id,
            similarity_percentage: m.similarity_percentage,
        }
    }
}

/// Result of one analysis attempt against one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Report {
    pub report_id: String,
    pub work_id: String,
    pub file_id: String,
    pub student_id: String,
    pub assignment_id: String,
    pub plagiarism_score: f32,
    pub is_plagiarism: bool,
    pub word_count: i32,
    pub analysis_duration_ms: i64,
    pub status: ReportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub similar_works: Vec<SimilarWork>,
}

impl Report {
    /// Build from a stored row. Unknown status strings read as failed.
    pub fn from_model(m: report::Model, similar_works: Vec<SimilarWork>) -> Self {
        let status = match ReportStatus::parse(&m.status) {
            Some(status) => status,
            None => {
                warn!(report_id = %m.report_id, status = %m.status, "Unknown report status; reading as failed");
                ReportStatus::Failed
            }
        };

        Self {
            status,
            report_id: m.report_id,
            work_id: m.work_id,
            file_id: m.file_id,
            student_id: m.student_id,
            assignment_id: m.assignment_id,
            plagiarism_score: m.plagiarism_score,
            is_plagiarism: m.is_plagiarism,
            word_count: m.word_count,
            analysis_duration_ms: m.analysis_duration_ms,
            error_message: m.error_message,
            created_at: m.created_at,
            similar_works,
        }
    }
}

/// Request body for `POST /analyze`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub work_id: String,
    #[serde(default)]
    pub file_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment_id: Option<String>,
}

/// Query parameters for listing reports.
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct ListReportsQuery {
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub assignment_id: Option<String>,
    #[serde(default)]
    pub work_id: Option<String>,
    #[serde(default)]
    pub file_id: Option<String>,
    /// Maximum results to return (1-100, default 10).
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Offset for pagination.
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    10
}

impl Default for ListReportsQuery {
    fn default() -> Self {
        Self {
            student_id: None,
            assignment_id: None,
            work_id: None,
            file_id: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl ListReportsQuery {
    pub fn effective_limit(&self) -> u64 {
        self.limit.clamp(1, 100) as u64
    }

    pub fn effective_offset(&self) -> u64 {
        self.offset.max(0) as u64
    }
}

/// Paginated report listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportListResponse {
    pub reports: Vec<Report>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

/// All reports for one work.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkReportsResponse {
    pub reports: Vec<Report>,
    pub count: usize,
}

/// Request body for `PATCH /reports/{id}/status`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateReportStatusRequest {
    pub status: ReportStatus,
    #[serde(default)]
    pub error_message: Option<String>,
}

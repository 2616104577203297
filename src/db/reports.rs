//! Database queries for reports.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entity::report::{self, ActiveModel, Entity as Report};
use crate::error::{AppError, AppResult};
use crate::models::{ListReportsQuery, ReportStatus};

use super::DbPool;

impl DbPool {
    /// Insert a new report.
    pub async fn insert_report(&self, row: report::Model) -> AppResult<report::Model> {
        let model = ActiveModel {
            report_id: Set(row.report_id),
            work_id: Set(row.work_id),
            file_id: Set(row.file_id),
            student_id: Set(row.student_id),
            assignment_id: Set(row.assignment_id),
            plagiarism_score: Set(row.plagiarism_score),
            is_plagiarism: Set(row.is_plagiarism),
            word_count: Set(row.word_count),
            analysis_duration_ms: Set(row.analysis_duration_ms),
            status: Set(row.status),
            error_message: Set(row.error_message),
            created_at: Set(row.created_at),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert report: {}", e)))?;

        Ok(result)
    }

    /// Get a report by ID.
    pub async fn get_report_by_id(&self, report_id: &str) -> AppResult<Option<report::Model>> {
        let result = Report::find_by_id(report_id.to_string())
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get report: {}", e)))?;

        Ok(result)
    }

    /// List all reports for a work, newest first.
    pub async fn list_reports_by_work(&self, work_id: &str) -> AppResult<Vec<report::Model>> {
        let result = Report::find()
            .filter(report::Column::WorkId.eq(work_id))
            .order_by_desc(report::Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list reports: {}", e)))?;

        Ok(result)
    }

    /// Update report status. Completing a report clears its error message.
    pub async fn update_report_status(
        &self,
        report_id: &str,
        status: ReportStatus,
        error_message: Option<String>,
    ) -> AppResult<report::Model> {
        let report = self
            .get_report_by_id(report_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {}", report_id)))?;

        let mut active: ActiveModel = report.into();
        active.status = Set(status.as_str().to_string());
        active.error_message = Set(match status {
            ReportStatus::Completed => None,
            ReportStatus::Failed => error_message,
        });

        let result = active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update report status: {}", e)))?;

        Ok(result)
    }

    /// Delete a report. Similar work rows cascade. Returns whether a row existed.
    pub async fn delete_report(&self, report_id: &str) -> AppResult<bool> {
        let result = Report::delete_by_id(report_id.to_string())
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete report: {}", e)))?;

        Ok(result.rows_affected > 0)
    }

    /// List reports with optional filtering.
    pub async fn list_reports(
        &self,
        query: &ListReportsQuery,
    ) -> AppResult<(Vec<report::Model>, u64)> {
        let mut select = Report::find();

        // Apply filters
        if let Some(ref student_id) = query.student_id {
            select = select.filter(report::Column::StudentId.eq(student_id.as_str()));
        }

        if let Some(ref assignment_id) = query.assignment_id {
            select = select.filter(report::Column::AssignmentId.eq(assignment_id.as_str()));
        }

        if let Some(ref work_id) = query.work_id {
            select = select.filter(report::Column::WorkId.eq(work_id.as_str()));
        }

        if let Some(ref file_id) = query.file_id {
            select = select.filter(report::Column::FileId.eq(file_id.as_str()));
        }

        // Count total before pagination
        let total = select
            .clone()
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count reports: {}", e)))?;

        let reports = select
            .order_by_desc(report::Column::CreatedAt)
            .offset(query.effective_offset())
            .limit(query.effective_limit())
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list reports: {}", e)))?;

        Ok((reports, total))
    }
}

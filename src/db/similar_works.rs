//! Database queries for similar works.

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::entity::similar_work::{self, ActiveModel, Entity as SimilarWork};
use crate::error::{AppError, AppResult};

use super::DbPool;

impl DbPool {
    /// Record that `similar_file_id` matched the file analysed by `report_id`.
    pub async fn insert_similar_work(
        &self,
        report_id: &str,
        original_file_id: &str,
        similar_file_id: &str,
        similarity_percentage: f32,
    ) -> AppResult<similar_work::Model> {
        let model = ActiveModel {
            similar_id: Set(Uuid::now_v7().to_string()),
            report_id: Set(report_id.to_string()),
            original_work_id: Set(original_file_id.to_string()),
            similar_work_id: Set(similar_file_id.to_string()),
            similarity_percentage: Set(similarity_percentage),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert similar work: {}", e)))?;

        Ok(result)
    }

    /// Similar works for a report, most similar first.
    pub async fn get_similar_works(&self, report_id: &str) -> AppResult<Vec<similar_work::Model>> {
        let result = SimilarWork::find()
            .filter(similar_work::Column::ReportId.eq(report_id))
            .order_by_desc(similar_work::Column::SimilarityPercentage)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get similar works: {}", e)))?;

        Ok(result)
    }

    /// Remove all similar works of a report.
    pub async fn delete_similar_works(&self, report_id: &str) -> AppResult<u64> {
        let result = SimilarWork::delete_many()
            .filter(similar_work::Column::ReportId.eq(report_id))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete similar works: {}", e)))?;

        Ok(result.rows_affected)
    }
}

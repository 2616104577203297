//! Database queries for works.

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DbErr, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entity::work::{self, ActiveModel, Entity as Work};
use crate::error::{AppError, AppResult};

use super::DbPool;

/// Mint a new opaque work identifier.
pub fn new_work_id() -> String {
    format!("work-{}", Uuid::now_v7().simple())
}

impl DbPool {
    /// Resolve the work for a (student, assignment) pair, creating it on first use.
    ///
    /// Insert-on-conflict-do-nothing against the unique pair index, then
    /// re-select, so concurrent first uploads converge on one row.
    pub async fn get_or_create_work(
        &self,
        student_id: &str,
        assignment_id: &str,
    ) -> AppResult<work::Model> {
        if let Some(existing) = self.find_work(student_id, assignment_id).await? {
            return Ok(existing);
        }

        let now = Utc::now();
        let model = ActiveModel {
            work_id: Set(new_work_id()),
            student_id: Set(student_id.to_string()),
            assignment_id: Set(assignment_id.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = Work::insert(model)
            .on_conflict(
                OnConflict::columns([work::Column::StudentId, work::Column::AssignmentId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.connection())
            .await;

        match inserted {
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => {
                return Err(AppError::Database(format!("Failed to insert work: {}", e)));
            }
        }

        self.find_work(student_id, assignment_id)
            .await?
            .ok_or_else(|| {
                AppError::Database(format!(
                    "Work for student {} assignment {} vanished after insert",
                    student_id, assignment_id
                ))
            })
    }

    /// Find the work for a (student, assignment) pair.
    pub async fn find_work(
        &self,
        student_id: &str,
        assignment_id: &str,
    ) -> AppResult<Option<work::Model>> {
        let result = Work::find()
            .filter(work::Column::StudentId.eq(student_id))
            .filter(work::Column::AssignmentId.eq(assignment_id))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get work: {}", e)))?;

        Ok(result)
    }

    /// Get a work by ID.
    pub async fn get_work_by_id(&self, work_id: &str) -> AppResult<Option<work::Model>> {
        let result = Work::find_by_id(work_id.to_string())
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get work: {}", e)))?;

        Ok(result)
    }
}

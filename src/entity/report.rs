//! Report entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "reports")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub report_id: String,
    pub work_id: String,
    pub file_id: String,
    pub student_id: String,
    pub assignment_id: String,
    pub plagiarism_score: f32,
    pub is_plagiarism: bool,
    pub word_count: i32,
    pub analysis_duration_ms: i64,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::similar_work::Entity")]
    SimilarWorks,
}

impl Related<super::similar_work::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SimilarWorks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

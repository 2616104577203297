//! Similar work entity: a checksum match recorded against a report.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "similar_works")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub similar_id: String,
    pub report_id: String,
    /// File id of the analysed upload.
    pub original_work_id: String,
    /// File id of the upload sharing its checksum.
    pub similar_work_id: String,
    pub similarity_percentage: f32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::report::Entity",
        from = "Column::ReportId",
        to = "super::report::Column::ReportId",
        on_delete = "Cascade"
    )]
    Report,
}

impl Related<super::report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Report.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

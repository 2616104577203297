//! Migration: Create reports and similar_works tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reports::ReportId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reports::WorkId).string().not_null())
                    .col(ColumnDef::new(Reports::FileId).string().not_null())
                    .col(ColumnDef::new(Reports::StudentId).string().not_null())
                    .col(ColumnDef::new(Reports::AssignmentId).string().not_null())
                    .col(
                        ColumnDef::new(Reports::PlagiarismScore)
                            .float()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Reports::IsPlagiarism)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Reports::WordCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Reports::AnalysisDurationMs)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Reports::Status).string_len(20).not_null())
                    .col(ColumnDef::new(Reports::ErrorMessage).text().null())
                    .col(
                        ColumnDef::new(Reports::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_reports_work_id", Reports::WorkId),
            ("idx_reports_file_id", Reports::FileId),
            ("idx_reports_created_at", Reports::CreatedAt),
        ] {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(name)
                        .table(Reports::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(SimilarWorks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SimilarWorks::SimilarId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SimilarWorks::ReportId).string().not_null())
                    .col(
                        ColumnDef::new(SimilarWorks::OriginalWorkId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SimilarWorks::SimilarWorkId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SimilarWorks::SimilarityPercentage)
                            .float()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_similar_works_report_id")
                            .from(SimilarWorks::Table, SimilarWorks::ReportId)
                            .to(Reports::Table, Reports::ReportId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_similar_works_report_id")
                    .table(SimilarWorks::Table)
                    .col(SimilarWorks::ReportId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SimilarWorks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Reports::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden, Clone, Copy)]
enum Reports {
    Table,
    ReportId,
    WorkId,
    FileId,
    StudentId,
    AssignmentId,
    PlagiarismScore,
    IsPlagiarism,
    WordCount,
    AnalysisDurationMs,
    Status,
    ErrorMessage,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SimilarWorks {
    Table,
    SimilarId,
    ReportId,
    OriginalWorkId,
    SimilarWorkId,
    SimilarityPercentage,
}

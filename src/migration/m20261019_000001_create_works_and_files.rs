//! Migration: Create works and files tables.
//!
//! A work is unique per (student_id, assignment_id); files are looked up by
//! MD5 checksum for duplicate detection.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Works::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Works::WorkId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Works::StudentId).string().not_null())
                    .col(ColumnDef::new(Works::AssignmentId).string().not_null())
                    .col(
                        ColumnDef::new(Works::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Works::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Backs the conflict-aware get-or-create
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_works_student_assignment")
                    .table(Works::Table)
                    .col(Works::StudentId)
                    .col(Works::AssignmentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Files::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Files::FileId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Files::WorkId).string().not_null())
                    .col(ColumnDef::new(Files::Filename).string().not_null())
                    .col(ColumnDef::new(Files::OriginalFilename).string().not_null())
                    .col(ColumnDef::new(Files::ContentType).string().null())
                    .col(ColumnDef::new(Files::SizeBytes).big_integer().not_null())
                    .col(ColumnDef::new(Files::StoragePath).string().not_null())
                    .col(ColumnDef::new(Files::ChecksumMd5).string().null())
                    .col(ColumnDef::new(Files::ChecksumSha256).string().null())
                    .col(
                        ColumnDef::new(Files::UploadedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_files_work_id")
                            .from(Files::Table, Files::WorkId)
                            .to(Works::Table, Works::WorkId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_files_work_id")
                    .table(Files::Table)
                    .col(Files::WorkId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_files_checksum_md5")
                    .table(Files::Table)
                    .col(Files::ChecksumMd5)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Files::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Works::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Works {
    Table,
    WorkId,
    StudentId,
    AssignmentId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Files {
    Table,
    FileId,
    WorkId,
    Filename,
    OriginalFilename,
    ContentType,
    SizeBytes,
    StoragePath,
    ChecksumMd5,
    ChecksumSha256,
    UploadedAt,
}

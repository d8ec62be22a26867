//! # Media Files Table Migration
//!
//! One row per committed capture. A row is only written after the payload is
//! already in the object store, so every row points at an existing object
//! unless a delete was interrupted half-way (see `RepairLedger`).
//!
//! ## Key Columns
//! - `user_id`: owner identity as issued by the session provider (opaque text).
//! - `file_path`: object key `{user_id}/{token}.{ext}`, unique across the bucket.
//! - `file_type`: `image` or `video`, derived from the uploaded content type.
//! - `size`: byte length of the stored object.
//! - `drive_file_id`: id of the mirrored copy in the document service, if any.
//!
//! ## Indexes
//! - `idx_media_files_user_created`: gallery listing, newest first per owner.
//! - unique `file_path`: one row per stored object.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MediaFiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MediaFiles::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .default(Expr::cust("gen_random_uuid()")),
                    )
                    .col(ColumnDef::new(MediaFiles::UserId).text().not_null())
                    .col(ColumnDef::new(MediaFiles::Filename).string_len(255).not_null())
                    .col(
                        ColumnDef::new(MediaFiles::FilePath)
                            .string_len(1024)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(MediaFiles::FileType)
                            .string_len(16)
                            .not_null()
                            .check(Expr::col(MediaFiles::FileType).is_in(["image", "video"])),
                    )
                    .col(ColumnDef::new(MediaFiles::Size).big_integer().not_null())
                    .col(ColumnDef::new(MediaFiles::DriveFileId).string_len(255))
                    .col(
                        ColumnDef::new(MediaFiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(MediaFiles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Gallery listing: all rows of one owner, newest first
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE INDEX IF NOT EXISTS idx_media_files_user_created
                ON media_files (user_id, created_at DESC);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DROP INDEX IF EXISTS idx_media_files_user_created;
                "#,
            )
            .await?;

        manager
            .drop_table(Table::drop().table(MediaFiles::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum MediaFiles {
    Table,
    Id,
    UserId,
    Filename,
    FilePath,
    FileType,
    Size,
    DriveFileId,
    CreatedAt,
    UpdatedAt,
}

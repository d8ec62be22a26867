use async_trait::async_trait;
use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, FromQueryResult, Statement};
use std::sync::Arc;
use uuid::Uuid;

use super::sea_orm_entity::media_files::Model as MediaFileModel;
use crate::{
    identity::application::domain::entities::OwnerId,
    multimedia::application::{
        domain::entities::{MediaRecord, NewMediaRecord},
        ports::outgoing::db::{MediaStore, MediaStoreError},
    },
};

#[derive(Debug, Clone)]
pub struct MediaStorePostgres {
    db: Arc<DatabaseConnection>,
}

impl MediaStorePostgres {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn map_db_err(e: DbErr) -> MediaStoreError {
        MediaStoreError::DatabaseError(e.to_string())
    }

    fn to_record(model: MediaFileModel) -> Result<MediaRecord, MediaStoreError> {
        model.to_domain().map_err(|reason| {
            tracing::error!("Corrupt media_files row: {}", reason);
            MediaStoreError::DatabaseError(format!("corrupt row: {}", reason))
        })
    }
}

#[async_trait]
impl MediaStore for MediaStorePostgres {
    async fn insert(&self, record: NewMediaRecord) -> Result<MediaRecord, MediaStoreError> {
        let size = i64::try_from(record.size_bytes).map_err(|_| {
            MediaStoreError::DatabaseError(format!("size {} out of range", record.size_bytes))
        })?;

        let model = MediaFileModel::find_by_statement(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            r#"
            INSERT INTO media_files (id, user_id, filename, file_path, file_type, size, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
            RETURNING *
            "#,
            vec![
                Uuid::new_v4().into(),
                record.owner_id.as_str().into(),
                record.filename.clone().into(),
                record.storage_path.as_str().into(),
                record.media_type.as_str().into(),
                size.into(),
            ],
        ))
        .one(&*self.db)
        .await
        .map_err(Self::map_db_err)?
        .ok_or_else(|| MediaStoreError::DatabaseError("insert returned no row".to_string()))?;

        Self::to_record(model)
    }

    async fn select_by_owner(&self, owner: &OwnerId) -> Result<Vec<MediaRecord>, MediaStoreError> {
        let models = MediaFileModel::find_by_statement(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            r#"SELECT * FROM media_files WHERE user_id = $1 ORDER BY created_at DESC"#,
            [owner.as_str().into()],
        ))
        .all(&*self.db)
        .await
        .map_err(Self::map_db_err)?;

        models.into_iter().map(Self::to_record).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<MediaRecord, MediaStoreError> {
        let model = MediaFileModel::find_by_statement(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            r#"SELECT * FROM media_files WHERE id = $1"#,
            [id.into()],
        ))
        .one(&*self.db)
        .await
        .map_err(Self::map_db_err)?
        .ok_or(MediaStoreError::NotFound)?;

        Self::to_record(model)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), MediaStoreError> {
        #[derive(FromQueryResult)]
        struct IdResult {
            #[allow(dead_code)]
            id: Uuid,
        }

        let deleted = IdResult::find_by_statement(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            r#"DELETE FROM media_files WHERE id = $1 RETURNING id"#,
            [id.into()],
        ))
        .one(&*self.db)
        .await
        .map_err(Self::map_db_err)?;

        match deleted {
            Some(_) => Ok(()),
            None => Err(MediaStoreError::NotFound),
        }
    }

    async fn set_drive_file_id(
        &self,
        id: Uuid,
        drive_file_id: &str,
    ) -> Result<MediaRecord, MediaStoreError> {
        let model = MediaFileModel::find_by_statement(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            r#"UPDATE media_files SET drive_file_id = $2, updated_at = NOW() WHERE id = $1 RETURNING *"#,
            [id.into(), drive_file_id.into()],
        ))
        .one(&*self.db)
        .await
        .map_err(Self::map_db_err)?
        .ok_or(MediaStoreError::NotFound)?;

        Self::to_record(model)
    }
}

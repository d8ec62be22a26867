use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    identity::application::domain::entities::OwnerId,
    multimedia::application::domain::entities::{MediaRecord, NewMediaRecord},
};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum MediaStoreError {
    #[error("Media record not found")]
    NotFound,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Metadata store for committed media, keyed by `id`.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Inserts the row; the store assigns `id`, `created_at` and `updated_at`.
    async fn insert(&self, record: NewMediaRecord) -> Result<MediaRecord, MediaStoreError>;

    /// All rows of `owner`, newest first by `created_at`.
    async fn select_by_owner(&self, owner: &OwnerId) -> Result<Vec<MediaRecord>, MediaStoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<MediaRecord, MediaStoreError>;

    async fn delete_by_id(&self, id: Uuid) -> Result<(), MediaStoreError>;

    async fn set_drive_file_id(
        &self,
        id: Uuid,
        drive_file_id: &str,
    ) -> Result<MediaRecord, MediaStoreError>;
}

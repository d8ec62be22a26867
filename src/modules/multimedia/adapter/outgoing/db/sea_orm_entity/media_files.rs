use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{
    identity::application::domain::entities::OwnerId,
    multimedia::application::domain::entities::{MediaKind, MediaRecord, StoragePath},
};

// One row per committed capture, see the media_files migration
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "media_files")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub user_id: String,
    pub filename: String,
    #[sea_orm(unique)]
    pub file_path: String,
    pub file_type: String,
    pub size: i64,
    pub drive_file_id: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Rows that no longer satisfy the domain invariants are reported
    /// instead of being silently patched up.
    pub fn to_domain(&self) -> Result<MediaRecord, String> {
        let owner_id = OwnerId::try_new(self.user_id.clone())
            .map_err(|e| format!("row {}: {}", self.id, e))?;
        let media_type = MediaKind::parse(&self.file_type)
            .ok_or_else(|| format!("row {}: unknown file_type {}", self.id, self.file_type))?;
        let size_bytes = u64::try_from(self.size)
            .map_err(|_| format!("row {}: negative size {}", self.id, self.size))?;

        Ok(MediaRecord {
            id: self.id,
            owner_id,
            filename: self.filename.clone(),
            storage_path: StoragePath::from_stored(self.file_path.clone()),
            media_type,
            size_bytes,
            drive_file_id: self.drive_file_id.clone(),
            created_at: self.created_at.with_timezone(&chrono::Utc),
            updated_at: self.updated_at.with_timezone(&chrono::Utc),
        })
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

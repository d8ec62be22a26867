use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::multimedia::application::domain::entities::{MediaKind, MediaRecord};

/// A gallery entry as returned to clients, with its public URL.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItemResponse {
    pub id: Uuid,
    pub filename: String,
    pub storage_path: String,
    pub media_type: MediaKind,
    pub size_bytes: u64,
    pub drive_file_id: Option<String>,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaItemResponse {
    pub fn from_record(record: MediaRecord, url: String) -> Self {
        Self {
            id: record.id,
            filename: record.filename,
            storage_path: record.storage_path.as_str().to_string(),
            media_type: record.media_type,
            size_bytes: record.size_bytes,
            drive_file_id: record.drive_file_id,
            url,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

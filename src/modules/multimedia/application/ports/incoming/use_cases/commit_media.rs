use async_trait::async_trait;

use crate::{
    identity::application::domain::entities::OwnerId,
    multimedia::application::domain::entities::{BlobError, MediaBlob, MediaRecord, StoragePath},
};

/// What happened to the object written before a failed row insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrphanHandling {
    /// Compensating delete removed the object.
    Removed,
    /// Compensating delete failed; the object is queued for reconciliation.
    Retained(StoragePath),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommitMediaError {
    #[error("Invalid media: {0}")]
    InvalidBlob(#[from] BlobError),

    #[error("Payload of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: u64, limit: u64 },

    #[error("Object store write failed: {0}")]
    StorageWriteFailed(String),

    #[error("Metadata write failed: {reason}")]
    MetadataWriteFailed {
        reason: String,
        orphan: OrphanHandling,
    },
}

impl CommitMediaError {
    pub fn code(&self) -> &'static str {
        match self {
            CommitMediaError::InvalidBlob(_) => "INVALID_MEDIA",
            CommitMediaError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            CommitMediaError::StorageWriteFailed(_) => "STORAGE_WRITE_FAILED",
            CommitMediaError::MetadataWriteFailed { .. } => "METADATA_WRITE_FAILED",
        }
    }

    /// User-facing message, distinct per failure kind.
    pub fn notification(&self) -> &'static str {
        match self {
            CommitMediaError::InvalidBlob(_) => "This capture can't be saved. Please take it again.",
            CommitMediaError::PayloadTooLarge { .. } => "This capture is too large to upload.",
            CommitMediaError::StorageWriteFailed(_) => {
                "Upload failed before anything was saved. Please try again."
            }
            CommitMediaError::MetadataWriteFailed { .. } => {
                "Your file was uploaded but couldn't be added to your gallery. Please try again."
            }
        }
    }
}

#[async_trait]
pub trait CommitMediaUseCase: Send + Sync {
    async fn execute(&self, blob: MediaBlob, owner: &OwnerId)
        -> Result<MediaRecord, CommitMediaError>;
}

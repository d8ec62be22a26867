use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    identity::application::domain::entities::{DelegatedToken, OwnerId},
    multimedia::application::domain::entities::MediaRecord,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GalleryError {
    #[error("Media record not found")]
    RecordNotFound,

    #[error("Gallery is unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Delete failed, record kept: {0}")]
    DeleteFailed(String),

    #[error("Object removed but row {id} remains: {reason}")]
    PartialDelete { id: Uuid, reason: String },

    #[error("No delegated token for the document service")]
    MissingDelegatedToken,

    #[error("Could not read the stored object: {0}")]
    MirrorFetchFailed(String),

    #[error("Mirror upload failed: {reason}")]
    MirrorUploadFailed { status: Option<u16>, reason: String },

    #[error("Mirrored as {drive_file_id} but the link was not saved: {reason}")]
    LinkageWriteFailed {
        drive_file_id: String,
        reason: String,
    },
}

impl GalleryError {
    pub fn code(&self) -> &'static str {
        match self {
            GalleryError::RecordNotFound => "MEDIA_NOT_FOUND",
            GalleryError::StoreUnavailable(_) => "GALLERY_UNAVAILABLE",
            GalleryError::DeleteFailed(_) => "DELETE_FAILED",
            GalleryError::PartialDelete { .. } => "PARTIAL_DELETE",
            GalleryError::MissingDelegatedToken => "MISSING_DELEGATED_TOKEN",
            GalleryError::MirrorFetchFailed(_) => "MIRROR_FETCH_FAILED",
            GalleryError::MirrorUploadFailed { .. } => "MIRROR_UPLOAD_FAILED",
            GalleryError::LinkageWriteFailed { .. } => "LINKAGE_WRITE_FAILED",
        }
    }

    /// User-facing message, distinct per failure kind.
    pub fn notification(&self) -> &'static str {
        match self {
            GalleryError::RecordNotFound => "This item no longer exists.",
            GalleryError::StoreUnavailable(_) => "Your gallery couldn't be loaded right now.",
            GalleryError::DeleteFailed(_) => "Delete failed. The item is still in your gallery.",
            GalleryError::PartialDelete { .. } => {
                "The file was deleted but the gallery entry is still being cleaned up."
            }
            GalleryError::MissingDelegatedToken => {
                "Please sign in again to connect your Drive account."
            }
            GalleryError::MirrorFetchFailed(_) => "The stored file couldn't be read for backup.",
            GalleryError::MirrorUploadFailed { .. } => "Backup to Drive failed. Please try again.",
            GalleryError::LinkageWriteFailed { .. } => {
                "Backed up to Drive, but the link will be saved later."
            }
        }
    }
}

#[async_trait]
pub trait GallerySyncUseCase: Send + Sync {
    /// Records of `owner`, newest first. Pending repairs of the owner are
    /// retried first.
    async fn list(&self, owner: &OwnerId) -> Result<Vec<MediaRecord>, GalleryError>;

    /// A record of `owner`; records of other owners are not found.
    async fn find(&self, owner: &OwnerId, id: Uuid) -> Result<MediaRecord, GalleryError>;

    async fn delete(&self, record: &MediaRecord) -> Result<(), GalleryError>;

    /// Copies the stored object to the document service and links it back.
    /// Returns the record with `drive_file_id` set.
    async fn mirror(
        &self,
        record: &MediaRecord,
        token: Option<&DelegatedToken>,
    ) -> Result<MediaRecord, GalleryError>;

    fn public_url(&self, record: &MediaRecord) -> String;
}

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::identity::application::domain::entities::DelegatedToken;

/// File created in the secondary document service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
}

/// Metadata part of a mirror upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveUpload {
    pub name: String,
    pub parent_folder: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DocumentServiceError {
    #[error("Delegated token was rejected")]
    Unauthorized,

    #[error("Upload rejected with status {status}")]
    Rejected { status: u16 },

    #[error("Network problem occurred: {0}")]
    Network(String),

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

impl DocumentServiceError {
    pub fn status(&self) -> Option<u16> {
        match self {
            DocumentServiceError::Unauthorized => Some(401),
            DocumentServiceError::Rejected { status } => Some(*status),
            DocumentServiceError::Network(_) | DocumentServiceError::InvalidResponse(_) => None,
        }
    }
}

/// Secondary document service that receives mirrored copies.
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// Multipart upload (JSON metadata + binary) authorized by `token`.
    async fn upload(
        &self,
        token: &DelegatedToken,
        upload: DriveUpload,
    ) -> Result<DriveFile, DocumentServiceError>;
}

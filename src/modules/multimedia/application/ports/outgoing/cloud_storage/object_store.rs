use async_trait::async_trait;
use bytes::Bytes;

use crate::multimedia::application::domain::entities::StoragePath;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur when talking to the object store.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ObjectStoreError {
    #[error("Object not found")]
    NotFound,

    #[error("Access denied")]
    AccessDenied,

    #[error("Network problem occurred: {0}")]
    Network(String),

    #[error("Object store failure: {0}")]
    Infrastructure(String),
}

// ============================================================================
// Port Interface
// ============================================================================

/// Port for the primary object store holding committed payloads.
///
/// Keys follow `{owner}/{token}.{ext}`; the store never invents keys itself.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Writes the payload at `path`, returning the path on success.
    async fn put(
        &self,
        path: &StoragePath,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<StoragePath, ObjectStoreError>;

    /// Reads the whole payload stored at `path`.
    async fn get(&self, path: &StoragePath) -> Result<Bytes, ObjectStoreError>;

    async fn remove(&self, path: &StoragePath) -> Result<(), ObjectStoreError>;

    /// Public URL of the object. No I/O.
    fn public_url(&self, path: &StoragePath) -> String;
}

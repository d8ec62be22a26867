use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::identity::application::domain::entities::OwnerId;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// `image/*` is an image, anything else is treated as video.
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.starts_with("image/") {
            MediaKind::Image
        } else {
            MediaKind::Video
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "image" => Some(MediaKind::Image),
            "video" => Some(MediaKind::Video),
            _ => None,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlobError {
    #[error("payload is empty")]
    EmptyPayload,
    #[error("content type '{0}' is not a valid media type")]
    InvalidContentType(String),
    #[error("filename '{0}' is not a plain file name")]
    InvalidFilename(String),
}

const MAX_FILENAME_LEN: usize = 255;

/// In-memory capture payload awaiting commit. Never persisted as such.
#[derive(Clone, PartialEq, Eq)]
pub struct MediaBlob {
    filename: String,
    content_type: String,
    bytes: Bytes,
}

impl MediaBlob {
    pub fn try_new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Result<Self, BlobError> {
        let filename = filename.into().trim().to_string();
        let content_type = content_type.into().trim().to_ascii_lowercase();
        let bytes = bytes.into();

        if bytes.is_empty() {
            return Err(BlobError::EmptyPayload);
        }

        let essence = content_type.split(';').next().unwrap_or("").trim();
        match essence.split_once('/') {
            Some((top, sub)) if !top.is_empty() && !sub.is_empty() => {}
            _ => return Err(BlobError::InvalidContentType(content_type)),
        }

        if filename.is_empty()
            || filename.len() > MAX_FILENAME_LEN
            || filename.contains('/')
            || filename.contains('\\')
            || filename == "."
            || filename == ".."
        {
            return Err(BlobError::InvalidFilename(filename));
        }

        Ok(Self {
            filename,
            content_type,
            bytes,
        })
    }

    /// Payload produced by the capture session: `capture-{unix_millis}.{jpg|webm}`.
    pub fn captured(kind: MediaKind, bytes: Bytes, at: DateTime<Utc>) -> Result<Self, BlobError> {
        let (ext, content_type) = match kind {
            MediaKind::Image => ("jpg", "image/jpeg"),
            MediaKind::Video => ("webm", "video/webm"),
        };
        Self::try_new(
            format!("capture-{}.{}", at.timestamp_millis(), ext),
            content_type,
            bytes,
        )
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn kind(&self) -> MediaKind {
        MediaKind::from_content_type(&self.content_type)
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Storage extension: the filename's own extension when it is short and
    /// alphanumeric, otherwise one derived from the content type.
    pub fn extension(&self) -> String {
        let from_name = self
            .filename
            .rsplit_once('.')
            .map(|(stem, ext)| (stem, ext.to_ascii_lowercase()))
            .filter(|(stem, ext)| {
                !stem.is_empty()
                    && (1..=8).contains(&ext.len())
                    && ext.chars().all(|c| c.is_ascii_alphanumeric())
            })
            .map(|(_, ext)| ext);

        if let Some(ext) = from_name {
            return ext;
        }

        let essence = self.content_type.split(';').next().unwrap_or("").trim();
        extension_for_content_type(essence)
            .unwrap_or("bin")
            .to_string()
    }
}

impl fmt::Debug for MediaBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaBlob")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        "video/webm" => Some("webm"),
        "video/mp4" => Some("mp4"),
        "video/quicktime" => Some("mov"),
        _ => None,
    }
}

/// Content type used when a stored object is copied elsewhere.
pub fn content_type_for_extension(ext: &str, kind: MediaKind) -> &'static str {
    match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "webm" => "video/webm",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        _ => match kind {
            MediaKind::Image => "image/jpeg",
            MediaKind::Video => "video/webm",
        },
    }
}

/// Object store key, always `{owner}/{token}.{ext}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoragePath(String);

impl StoragePath {
    /// The token is a v4 UUID (122 random bits) rendered without dashes.
    pub fn generate(owner: &OwnerId, extension: &str) -> Self {
        Self(format!(
            "{}/{}.{}",
            owner,
            Uuid::new_v4().simple(),
            extension
        ))
    }

    /// Wrap a key read back from the metadata store.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn extension(&self) -> Option<&str> {
        let file = self.0.rsplit('/').next()?;
        file.rsplit_once('.').map(|(_, ext)| ext)
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    pub id: Uuid,
    pub owner_id: OwnerId,
    pub filename: String,
    pub storage_path: StoragePath,
    pub media_type: MediaKind,
    pub size_bytes: u64,
    pub drive_file_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaRecord {
    pub fn mime_type(&self) -> &'static str {
        let ext = self
            .storage_path
            .extension()
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        content_type_for_extension(&ext, self.media_type)
    }
}

/// Metadata row before the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMediaRecord {
    pub owner_id: OwnerId,
    pub filename: String,
    pub storage_path: StoragePath,
    pub media_type: MediaKind,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Pending,
    Committed,
    Failed,
}

/// Correlates one blob with its object write and row insert for the
/// duration of a single commit call.
#[derive(Debug, Clone)]
pub struct UploadTask {
    pub id: Uuid,
    pub owner_id: OwnerId,
    pub filename: String,
    pub storage_path: StoragePath,
    pub media_type: MediaKind,
    pub size_bytes: u64,
    status: UploadStatus,
}

impl UploadTask {
    pub fn new(blob: &MediaBlob, owner: &OwnerId) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id: owner.clone(),
            filename: blob.filename().to_string(),
            storage_path: StoragePath::generate(owner, &blob.extension()),
            media_type: blob.kind(),
            size_bytes: blob.len(),
            status: UploadStatus::Pending,
        }
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    pub fn mark_committed(&mut self) {
        self.status = UploadStatus::Committed;
    }

    pub fn mark_failed(&mut self) {
        self.status = UploadStatus::Failed;
    }

    pub fn new_record(&self) -> NewMediaRecord {
        NewMediaRecord {
            owner_id: self.owner_id.clone(),
            filename: self.filename.clone(),
            storage_path: self.storage_path.clone(),
            media_type: self.media_type,
            size_bytes: self.size_bytes,
        }
    }
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::identity::application::domain::entities::{DelegatedToken, OwnerId};
use crate::multimedia::application::domain::entities::{MediaRecord, NewMediaRecord, StoragePath};
use crate::multimedia::application::ports::outgoing::{
    cloud_storage::{ObjectStore, ObjectStoreError},
    db::{MediaStore, MediaStoreError},
    drive::{DocumentService, DocumentServiceError, DriveFile, DriveUpload},
};

// ============================================================================
// Object store
// ============================================================================

#[derive(Default)]
struct ObjectState {
    objects: HashMap<String, Bytes>,
    put_error: Option<ObjectStoreError>,
    get_error: Option<ObjectStoreError>,
    remove_error: Option<ObjectStoreError>,
    get_calls: usize,
}

/// Object store kept in a map. Scripted failures are permanent.
#[derive(Clone, Default)]
pub struct InMemoryObjectStore {
    state: Arc<Mutex<ObjectState>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_object(&self, path: &StoragePath, bytes: Bytes) {
        self.state
            .lock()
            .unwrap()
            .objects
            .insert(path.as_str().to_string(), bytes);
    }

    pub fn remove_object(&self, path: &StoragePath) {
        self.state.lock().unwrap().objects.remove(path.as_str());
    }

    pub fn contains(&self, path: &StoragePath) -> bool {
        self.state
            .lock()
            .unwrap()
            .objects
            .contains_key(path.as_str())
    }

    pub fn object(&self, path: &StoragePath) -> Option<Bytes> {
        self.state.lock().unwrap().objects.get(path.as_str()).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.state.lock().unwrap().objects.len()
    }

    pub fn fail_put(&self, err: ObjectStoreError) {
        self.state.lock().unwrap().put_error = Some(err);
    }

    pub fn fail_get(&self, err: ObjectStoreError) {
        self.state.lock().unwrap().get_error = Some(err);
    }

    pub fn fail_remove(&self, err: ObjectStoreError) {
        self.state.lock().unwrap().remove_error = Some(err);
    }

    pub fn get_calls(&self) -> usize {
        self.state.lock().unwrap().get_calls
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(
        &self,
        path: &StoragePath,
        _content_type: &str,
        bytes: Bytes,
    ) -> Result<StoragePath, ObjectStoreError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.put_error.clone() {
            return Err(err);
        }
        state.objects.insert(path.as_str().to_string(), bytes);
        Ok(path.clone())
    }

    async fn get(&self, path: &StoragePath) -> Result<Bytes, ObjectStoreError> {
        let mut state = self.state.lock().unwrap();
        state.get_calls += 1;
        if let Some(err) = state.get_error.clone() {
            return Err(err);
        }
        state
            .objects
            .get(path.as_str())
            .cloned()
            .ok_or(ObjectStoreError::NotFound)
    }

    async fn remove(&self, path: &StoragePath) -> Result<(), ObjectStoreError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.remove_error.clone() {
            return Err(err);
        }
        state
            .objects
            .remove(path.as_str())
            .map(|_| ())
            .ok_or(ObjectStoreError::NotFound)
    }

    fn public_url(&self, path: &StoragePath) -> String {
        format!("memory://{}", path)
    }
}

// ============================================================================
// Metadata store
// ============================================================================

#[derive(Default)]
struct RecordState {
    rows: HashMap<Uuid, MediaRecord>,
    last_created: Option<DateTime<Utc>>,
    insert_error: Option<MediaStoreError>,
    select_error: Option<MediaStoreError>,
    delete_error: Option<MediaStoreError>,
    link_error: Option<MediaStoreError>,
    delete_delay: Option<std::time::Duration>,
    find_calls: usize,
    delete_calls: usize,
    link_calls: usize,
}

/// Metadata store kept in a map. `created_at` strictly increases per insert.
/// Scripted failures stay until `heal()`.
#[derive(Clone, Default)]
pub struct InMemoryMediaStore {
    state: Arc<Mutex<RecordState>>,
}

impl InMemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.state.lock().unwrap().rows.contains_key(&id)
    }

    pub fn row_count(&self) -> usize {
        self.state.lock().unwrap().rows.len()
    }

    pub fn set_created_at(&self, id: Uuid, at: DateTime<Utc>) {
        if let Some(row) = self.state.lock().unwrap().rows.get_mut(&id) {
            row.created_at = at;
        }
    }

    pub fn fail_insert(&self, err: MediaStoreError) {
        self.state.lock().unwrap().insert_error = Some(err);
    }

    pub fn fail_select(&self, err: MediaStoreError) {
        self.state.lock().unwrap().select_error = Some(err);
    }

    pub fn fail_delete(&self, err: MediaStoreError) {
        self.state.lock().unwrap().delete_error = Some(err);
    }

    pub fn fail_link(&self, err: MediaStoreError) {
        self.state.lock().unwrap().link_error = Some(err);
    }

    /// Every later `delete_by_id` waits this long before answering.
    pub fn delay_delete(&self, delay: std::time::Duration) {
        self.state.lock().unwrap().delete_delay = Some(delay);
    }

    pub fn heal(&self) {
        let mut state = self.state.lock().unwrap();
        state.insert_error = None;
        state.select_error = None;
        state.delete_error = None;
        state.link_error = None;
    }

    pub fn find_calls(&self) -> usize {
        self.state.lock().unwrap().find_calls
    }

    pub fn delete_calls(&self) -> usize {
        self.state.lock().unwrap().delete_calls
    }

    pub fn link_calls(&self) -> usize {
        self.state.lock().unwrap().link_calls
    }
}

#[async_trait]
impl MediaStore for InMemoryMediaStore {
    async fn insert(&self, record: NewMediaRecord) -> Result<MediaRecord, MediaStoreError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.insert_error.clone() {
            return Err(err);
        }

        let now = Utc::now();
        let created_at = match state.last_created {
            Some(last) if last >= now => last + Duration::milliseconds(1),
            _ => now,
        };
        state.last_created = Some(created_at);

        let row = MediaRecord {
            id: Uuid::new_v4(),
            owner_id: record.owner_id,
            filename: record.filename,
            storage_path: record.storage_path,
            media_type: record.media_type,
            size_bytes: record.size_bytes,
            drive_file_id: None,
            created_at,
            updated_at: created_at,
        };
        state.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn select_by_owner(&self, owner: &OwnerId) -> Result<Vec<MediaRecord>, MediaStoreError> {
        let state = self.state.lock().unwrap();
        if let Some(err) = state.select_error.clone() {
            return Err(err);
        }
        let mut rows: Vec<MediaRecord> = state
            .rows
            .values()
            .filter(|r| &r.owner_id == owner)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<MediaRecord, MediaStoreError> {
        let mut state = self.state.lock().unwrap();
        state.find_calls += 1;
        state.rows.get(&id).cloned().ok_or(MediaStoreError::NotFound)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), MediaStoreError> {
        let delay = self.state.lock().unwrap().delete_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().unwrap();
        state.delete_calls += 1;
        if let Some(err) = state.delete_error.clone() {
            return Err(err);
        }
        state
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(MediaStoreError::NotFound)
    }

    async fn set_drive_file_id(
        &self,
        id: Uuid,
        drive_file_id: &str,
    ) -> Result<MediaRecord, MediaStoreError> {
        let mut state = self.state.lock().unwrap();
        state.link_calls += 1;
        if let Some(err) = state.link_error.clone() {
            return Err(err);
        }
        let row = state.rows.get_mut(&id).ok_or(MediaStoreError::NotFound)?;
        row.drive_file_id = Some(drive_file_id.to_string());
        row.updated_at = Utc::now();
        Ok(row.clone())
    }
}

// ============================================================================
// Document service
// ============================================================================

#[derive(Default)]
struct DocumentState {
    uploads: Vec<(String, DriveUpload)>,
    error: Option<DocumentServiceError>,
}

/// Captures every upload; answers with `drive-{n}` ids unless told to fail.
#[derive(Clone, Default)]
pub struct RecordingDocumentService {
    state: Arc<Mutex<DocumentState>>,
}

impl RecordingDocumentService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(&self, err: DocumentServiceError) {
        self.state.lock().unwrap().error = Some(err);
    }

    pub fn upload_calls(&self) -> usize {
        self.state.lock().unwrap().uploads.len()
    }

    pub fn uploads(&self) -> Vec<(String, DriveUpload)> {
        self.state.lock().unwrap().uploads.clone()
    }
}

#[async_trait]
impl DocumentService for RecordingDocumentService {
    async fn upload(
        &self,
        token: &DelegatedToken,
        upload: DriveUpload,
    ) -> Result<DriveFile, DocumentServiceError> {
        let mut state = self.state.lock().unwrap();
        state
            .uploads
            .push((token.expose().to_string(), upload.clone()));
        if let Some(err) = state.error.clone() {
            return Err(err);
        }
        Ok(DriveFile {
            id: format!("drive-{}", state.uploads.len()),
            name: upload.name,
            mime_type: upload.mime_type,
        })
    }
}

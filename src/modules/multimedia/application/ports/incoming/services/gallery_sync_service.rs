use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    identity::application::domain::entities::{DelegatedToken, OwnerId},
    multimedia::application::{
        domain::{entities::MediaRecord, policies::MediaPolicy},
        ports::{
            incoming::use_cases::{GalleryError, GallerySyncUseCase},
            outgoing::{
                cloud_storage::{ObjectStore, ObjectStoreError},
                db::{MediaStore, MediaStoreError},
                drive::{DocumentService, DriveUpload},
            },
        },
        repair_ledger::{PendingRepair, RepairLedger},
    },
};

pub struct GallerySyncService<S, M, D>
where
    S: ObjectStore,
    M: MediaStore,
    D: DocumentService,
{
    objects: S,
    records: M,
    documents: D,
    ledger: Arc<RepairLedger>,
    policy: MediaPolicy,
}

impl<S, M, D> GallerySyncService<S, M, D>
where
    S: ObjectStore,
    M: MediaStore,
    D: DocumentService,
{
    pub fn new(
        objects: S,
        records: M,
        documents: D,
        ledger: Arc<RepairLedger>,
        policy: MediaPolicy,
    ) -> Self {
        Self {
            objects,
            records,
            documents,
            ledger,
            policy,
        }
    }

    /// Retries every pending repair of `owner`. Entries stay in the ledger
    /// until their retry settles, so concurrent reads keep hiding them.
    async fn reconcile(&self, owner: &OwnerId) {
        for repair in self.ledger.pending_for_owner(owner) {
            let settled = match &repair {
                PendingRepair::OrphanObject { path, .. } => matches!(
                    self.objects.remove(path).await,
                    Ok(()) | Err(ObjectStoreError::NotFound)
                ),
                PendingRepair::DanglingRow { id, .. } => matches!(
                    self.records.delete_by_id(*id).await,
                    Ok(()) | Err(MediaStoreError::NotFound)
                ),
                PendingRepair::DriveLinkage {
                    id, drive_file_id, ..
                } => matches!(
                    self.records.set_drive_file_id(*id, drive_file_id).await,
                    Ok(_) | Err(MediaStoreError::NotFound)
                ),
            };

            if settled {
                tracing::info!("Reconciled pending repair {:?}", repair);
                self.ledger.resolve(&repair);
            } else {
                tracing::warn!("Pending repair still failing, kept: {:?}", repair);
            }
        }
    }
}

#[async_trait]
impl<S, M, D> GallerySyncUseCase for GallerySyncService<S, M, D>
where
    S: ObjectStore,
    M: MediaStore,
    D: DocumentService,
{
    async fn list(&self, owner: &OwnerId) -> Result<Vec<MediaRecord>, GalleryError> {
        self.reconcile(owner).await;

        let mut records = self.records.select_by_owner(owner).await.map_err(|e| {
            tracing::error!("Listing media of {} failed: {}", owner, e);
            GalleryError::StoreUnavailable(e.to_string())
        })?;

        let hidden = self.ledger.dangling_row_ids(owner);
        records.retain(|record| !hidden.contains(&record.id));
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(records)
    }

    async fn find(&self, owner: &OwnerId, id: Uuid) -> Result<MediaRecord, GalleryError> {
        let record = self.records.find_by_id(id).await.map_err(|e| match e {
            MediaStoreError::NotFound => GalleryError::RecordNotFound,
            other => GalleryError::StoreUnavailable(other.to_string()),
        })?;

        // Dangling rows stay addressable so a delete can be retried
        if &record.owner_id != owner {
            return Err(GalleryError::RecordNotFound);
        }

        Ok(record)
    }

    async fn delete(&self, record: &MediaRecord) -> Result<(), GalleryError> {
        match self.objects.remove(&record.storage_path).await {
            Ok(()) => {}
            Err(ObjectStoreError::NotFound) => {
                tracing::debug!("Object {} was already gone", record.storage_path);
            }
            Err(e) => {
                tracing::error!("Removing object {} failed: {}", record.storage_path, e);
                return Err(GalleryError::DeleteFailed(e.to_string()));
            }
        }

        match self.records.delete_by_id(record.id).await {
            Ok(()) | Err(MediaStoreError::NotFound) => {
                tracing::info!("Deleted media {} ({})", record.id, record.storage_path);
                self.ledger.resolve(&PendingRepair::DanglingRow {
                    owner: record.owner_id.clone(),
                    id: record.id,
                    path: record.storage_path.clone(),
                });
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    "Object {} removed but row {} remains: {}",
                    record.storage_path,
                    record.id,
                    e
                );
                self.ledger.record(PendingRepair::DanglingRow {
                    owner: record.owner_id.clone(),
                    id: record.id,
                    path: record.storage_path.clone(),
                });
                Err(GalleryError::PartialDelete {
                    id: record.id,
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn mirror(
        &self,
        record: &MediaRecord,
        token: Option<&DelegatedToken>,
    ) -> Result<MediaRecord, GalleryError> {
        let token = token.ok_or(GalleryError::MissingDelegatedToken)?;

        let bytes = self
            .objects
            .get(&record.storage_path)
            .await
            .map_err(|e| match e {
                ObjectStoreError::NotFound => GalleryError::RecordNotFound,
                other => {
                    tracing::error!("Reading {} for mirror failed: {}", record.storage_path, other);
                    GalleryError::MirrorFetchFailed(other.to_string())
                }
            })?;

        let upload = DriveUpload {
            name: record.filename.clone(),
            parent_folder: self.policy.drive_parent_folder.clone(),
            mime_type: record.mime_type().to_string(),
            bytes,
        };

        let file = self.documents.upload(token, upload).await.map_err(|e| {
            tracing::error!("Mirror upload of {} failed: {}", record.id, e);
            GalleryError::MirrorUploadFailed {
                status: e.status(),
                reason: e.to_string(),
            }
        })?;

        match self.records.set_drive_file_id(record.id, &file.id).await {
            Ok(updated) => {
                tracing::info!("Mirrored media {} as drive file {}", record.id, file.id);
                Ok(updated)
            }
            Err(e) => {
                tracing::warn!(
                    "Mirrored media {} as {} but linkage write failed: {}",
                    record.id,
                    file.id,
                    e
                );
                self.ledger.record(PendingRepair::DriveLinkage {
                    owner: record.owner_id.clone(),
                    id: record.id,
                    drive_file_id: file.id.clone(),
                });
                Err(GalleryError::LinkageWriteFailed {
                    drive_file_id: file.id,
                    reason: e.to_string(),
                })
            }
        }
    }

    fn public_url(&self, record: &MediaRecord) -> String {
        self.objects.public_url(&record.storage_path)
    }
}

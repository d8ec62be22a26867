use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    identity::application::domain::entities::OwnerId,
    multimedia::application::{
        domain::{
            entities::{MediaBlob, MediaRecord, UploadTask},
            policies::MediaPolicy,
        },
        ports::{
            incoming::use_cases::{CommitMediaError, CommitMediaUseCase, OrphanHandling},
            outgoing::{
                cloud_storage::{ObjectStore, ObjectStoreError},
                db::MediaStore,
            },
        },
        repair_ledger::{PendingRepair, RepairLedger},
    },
};

/// Two-phase commit of a capture: payload to the object store, then the
/// metadata row. A row is never written for a payload that is not stored.
pub struct CommitMediaService<S, M>
where
    S: ObjectStore,
    M: MediaStore,
{
    objects: S,
    records: M,
    ledger: Arc<RepairLedger>,
    policy: MediaPolicy,
}

impl<S, M> CommitMediaService<S, M>
where
    S: ObjectStore,
    M: MediaStore,
{
    pub fn new(objects: S, records: M, ledger: Arc<RepairLedger>, policy: MediaPolicy) -> Self {
        Self {
            objects,
            records,
            ledger,
            policy,
        }
    }

    /// Compensating delete of an object whose row could not be written.
    async fn discard_orphan(&self, task: &UploadTask) -> OrphanHandling {
        match self.objects.remove(&task.storage_path).await {
            Ok(()) | Err(ObjectStoreError::NotFound) => {
                tracing::warn!(
                    "Removed orphaned object {} after metadata write failure",
                    task.storage_path
                );
                OrphanHandling::Removed
            }
            Err(e) => {
                tracing::warn!(
                    "Compensating delete of {} failed ({}); queued for reconciliation",
                    task.storage_path,
                    e
                );
                self.ledger.record(PendingRepair::OrphanObject {
                    owner: task.owner_id.clone(),
                    path: task.storage_path.clone(),
                });
                OrphanHandling::Retained(task.storage_path.clone())
            }
        }
    }
}

#[async_trait]
impl<S, M> CommitMediaUseCase for CommitMediaService<S, M>
where
    S: ObjectStore,
    M: MediaStore,
{
    async fn execute(
        &self,
        blob: MediaBlob,
        owner: &OwnerId,
    ) -> Result<MediaRecord, CommitMediaError> {
        if blob.len() > self.policy.max_upload_bytes {
            return Err(CommitMediaError::PayloadTooLarge {
                size: blob.len(),
                limit: self.policy.max_upload_bytes,
            });
        }

        let mut task = UploadTask::new(&blob, owner);

        if let Err(e) = self
            .objects
            .put(&task.storage_path, blob.content_type(), blob.bytes().clone())
            .await
        {
            task.mark_failed();
            tracing::error!("Object write to {} failed: {}", task.storage_path, e);
            return Err(CommitMediaError::StorageWriteFailed(e.to_string()));
        }

        let record = match self.records.insert(task.new_record()).await {
            Ok(record) => record,
            Err(e) => {
                task.mark_failed();
                tracing::error!("Metadata insert for {} failed: {}", task.storage_path, e);
                let orphan = self.discard_orphan(&task).await;
                return Err(CommitMediaError::MetadataWriteFailed {
                    reason: e.to_string(),
                    orphan,
                });
            }
        };

        task.mark_committed();
        tracing::info!(
            "Committed {} ({} bytes) for owner {} as {}",
            record.storage_path,
            record.size_bytes,
            owner,
            record.id
        );

        Ok(record)
    }
}

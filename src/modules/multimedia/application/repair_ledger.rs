use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::{
    identity::application::domain::entities::OwnerId,
    multimedia::application::domain::entities::StoragePath,
};

/// Inconsistency left behind by a partially failed write, retried on the
/// owner's next gallery listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingRepair {
    /// Object written by a commit whose row insert failed and whose
    /// compensating delete failed too.
    OrphanObject { owner: OwnerId, path: StoragePath },
    /// Row whose object is already gone.
    DanglingRow {
        owner: OwnerId,
        id: Uuid,
        path: StoragePath,
    },
    /// Mirror that succeeded but whose file id was never written back.
    DriveLinkage {
        owner: OwnerId,
        id: Uuid,
        drive_file_id: String,
    },
}

impl PendingRepair {
    pub fn owner(&self) -> &OwnerId {
        match self {
            PendingRepair::OrphanObject { owner, .. }
            | PendingRepair::DanglingRow { owner, .. }
            | PendingRepair::DriveLinkage { owner, .. } => owner,
        }
    }

    fn same_target(&self, other: &PendingRepair) -> bool {
        match (self, other) {
            (
                PendingRepair::OrphanObject { path: a, .. },
                PendingRepair::OrphanObject { path: b, .. },
            ) => a == b,
            (PendingRepair::DanglingRow { id: a, .. }, PendingRepair::DanglingRow { id: b, .. }) => {
                a == b
            }
            (
                PendingRepair::DriveLinkage { id: a, .. },
                PendingRepair::DriveLinkage { id: b, .. },
            ) => a == b,
            _ => false,
        }
    }
}

/// Process-local list of pending repairs shared by the commit and gallery
/// services. The lock is never held across an `.await`.
#[derive(Debug, Default)]
pub struct RepairLedger {
    entries: Mutex<Vec<PendingRepair>>,
}

impl RepairLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, Vec<PendingRepair>> {
        // A panic while holding the lock cannot leave the Vec half-written
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Records a repair, replacing an older entry for the same target.
    pub fn record(&self, repair: PendingRepair) {
        let mut entries = self.entries();
        entries.retain(|existing| !existing.same_target(&repair));
        entries.push(repair);
    }

    /// Drops `repair` once it has been carried out. An entry that was
    /// replaced in the meantime is left alone.
    pub fn resolve(&self, repair: &PendingRepair) {
        self.entries().retain(|existing| existing != repair);
    }

    pub fn pending_for_owner(&self, owner: &OwnerId) -> Vec<PendingRepair> {
        self.entries()
            .iter()
            .filter(|repair| repair.owner() == owner)
            .cloned()
            .collect()
    }

    /// Ids of rows that must not be listed because their object is gone.
    pub fn dangling_row_ids(&self, owner: &OwnerId) -> HashSet<Uuid> {
        self.entries()
            .iter()
            .filter_map(|repair| match repair {
                PendingRepair::DanglingRow { owner: o, id, .. } if o == owner => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

use actix_web::web;
use std::sync::Arc;

use crate::multimedia::application::{
    domain::policies::MediaPolicy,
    media_use_cases::MultimediaUseCases,
    ports::incoming::{
        services::{CommitMediaService, GallerySyncService},
        use_cases::{CommitMediaUseCase, GallerySyncUseCase},
    },
    repair_ledger::RepairLedger,
};
use crate::tests::support::stubs::{
    InMemoryMediaStore, InMemoryObjectStore, RecordingDocumentService,
};
use crate::AppState;

/// Builds an `AppState` wired to in-memory adapters. The adapters are shared
/// handles, so tests keep a clone to script failures and inspect state.
pub struct TestAppStateBuilder {
    pub objects: InMemoryObjectStore,
    pub records: InMemoryMediaStore,
    pub documents: RecordingDocumentService,
    pub ledger: Arc<RepairLedger>,
    policy: MediaPolicy,
    commit_media: Option<Arc<dyn CommitMediaUseCase>>,
    gallery: Option<Arc<dyn GallerySyncUseCase>>,
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self {
            objects: InMemoryObjectStore::new(),
            records: InMemoryMediaStore::new(),
            documents: RecordingDocumentService::new(),
            ledger: Arc::new(RepairLedger::new()),
            policy: MediaPolicy::new("test-bucket"),
            commit_media: None,
            gallery: None,
        }
    }
}

impl TestAppStateBuilder {
    pub fn with_policy(mut self, policy: MediaPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_commit_media(mut self, uc: Arc<dyn CommitMediaUseCase>) -> Self {
        self.commit_media = Some(uc);
        self
    }

    pub fn with_gallery(mut self, uc: Arc<dyn GallerySyncUseCase>) -> Self {
        self.gallery = Some(uc);
        self
    }

    pub fn build(self) -> web::Data<AppState> {
        let commit_media = self.commit_media.unwrap_or_else(|| {
            Arc::new(CommitMediaService::new(
                self.objects.clone(),
                self.records.clone(),
                self.ledger.clone(),
                self.policy.clone(),
            ))
        });

        let gallery = self.gallery.unwrap_or_else(|| {
            Arc::new(GallerySyncService::new(
                self.objects.clone(),
                self.records.clone(),
                self.documents.clone(),
                self.ledger.clone(),
                self.policy.clone(),
            ))
        });

        web::Data::new(AppState {
            multimedia: MultimediaUseCases {
                commit_media,
                gallery,
            },
        })
    }
}

mod commit_media;
mod gallery_sync;

pub use commit_media::{CommitMediaError, CommitMediaUseCase, OrphanHandling};
pub use gallery_sync::{GalleryError, GallerySyncUseCase};

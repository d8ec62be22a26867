mod commit_media_service;
mod gallery_sync_service;

pub use commit_media_service::CommitMediaService;
pub use gallery_sync_service::GallerySyncService;

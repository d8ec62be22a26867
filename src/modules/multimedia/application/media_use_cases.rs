use std::sync::Arc;

use crate::multimedia::application::ports::incoming::use_cases::{
    CommitMediaUseCase, GallerySyncUseCase,
};

#[derive(Clone)]
pub struct MultimediaUseCases {
    pub commit_media: Arc<dyn CommitMediaUseCase>,
    pub gallery: Arc<dyn GallerySyncUseCase>,
}

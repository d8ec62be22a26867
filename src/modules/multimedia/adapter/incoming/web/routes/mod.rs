mod delete_media;
mod list_media;
mod media_item;
mod mirror_media;
mod upload_media;

pub use delete_media::delete_media_handler;
pub use list_media::list_media_handler;
pub use media_item::MediaItemResponse;
pub use mirror_media::{mirror_media_handler, MirrorMediaResponse};
pub use upload_media::upload_media_handler;

use actix_web::{http::StatusCode, HttpResponse};

use crate::{
    multimedia::application::ports::incoming::use_cases::{CommitMediaError, GalleryError},
    shared::api::ApiResponse,
};

pub(crate) fn commit_error_response(err: &CommitMediaError) -> HttpResponse {
    let status = match err {
        CommitMediaError::InvalidBlob(_) => StatusCode::BAD_REQUEST,
        CommitMediaError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        CommitMediaError::StorageWriteFailed(_) => StatusCode::BAD_GATEWAY,
        CommitMediaError::MetadataWriteFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    ApiResponse::error(status, err.code(), err.notification())
}

pub(crate) fn gallery_error_response(err: &GalleryError) -> HttpResponse {
    let status = match err {
        GalleryError::RecordNotFound => StatusCode::NOT_FOUND,
        GalleryError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        GalleryError::MissingDelegatedToken => StatusCode::UNAUTHORIZED,
        GalleryError::DeleteFailed(_)
        | GalleryError::MirrorFetchFailed(_)
        | GalleryError::MirrorUploadFailed { .. } => StatusCode::BAD_GATEWAY,
        GalleryError::PartialDelete { .. } | GalleryError::LinkageWriteFailed { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    ApiResponse::error(status, err.code(), err.notification())
}

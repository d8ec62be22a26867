use actix_web::{post, web, Responder};
use serde::Serialize;
use uuid::Uuid;

use super::gallery_error_response;
use crate::{
    identity::adapter::incoming::web::extractors::SignedInUser,
    multimedia::application::ports::incoming::use_cases::GalleryError, shared::api::ApiResponse,
    AppState,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorMediaResponse {
    pub drive_file_id: String,
    /// False when the copy exists but the link on the record is still pending.
    pub linkage_persisted: bool,
}

/// Copies a stored capture into the caller's Drive. The delegated token is
/// read from the `X-Provider-Token` header.
#[post("/api/media/{id}/mirror")]
pub async fn mirror_media_handler(
    user: SignedInUser,
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
) -> impl Responder {
    let gallery = &data.multimedia.gallery;
    let identity = user.identity();

    let Some(token) = identity.delegated_token.as_ref() else {
        return gallery_error_response(&GalleryError::MissingDelegatedToken);
    };

    let record = match gallery.find(&identity.owner_id, path.into_inner()).await {
        Ok(record) => record,
        Err(err) => return gallery_error_response(&err),
    };

    match gallery.mirror(&record, Some(token)).await {
        Ok(linked) => match linked.drive_file_id {
            Some(drive_file_id) => ApiResponse::success(MirrorMediaResponse {
                drive_file_id,
                linkage_persisted: true,
            }),
            None => {
                tracing::error!("Mirror of {} returned a record without a Drive id", record.id);
                ApiResponse::internal_error()
            }
        },
        Err(GalleryError::LinkageWriteFailed { drive_file_id, .. }) => {
            ApiResponse::success(MirrorMediaResponse {
                drive_file_id,
                linkage_persisted: false,
            })
        }
        Err(err) => {
            tracing::error!("Mirror of {} failed: {}", record.id, err);
            gallery_error_response(&err)
        }
    }
}

use actix_web::{delete, web, Responder};
use uuid::Uuid;

use super::gallery_error_response;
use crate::{
    identity::adapter::incoming::web::extractors::SignedInUser, shared::api::ApiResponse,
    AppState,
};

#[delete("/api/media/{id}")]
pub async fn delete_media_handler(
    user: SignedInUser,
    path: web::Path<Uuid>,
    data: web::Data<AppState>,
) -> impl Responder {
    let gallery = &data.multimedia.gallery;
    let owner = &user.identity().owner_id;

    let record = match gallery.find(owner, path.into_inner()).await {
        Ok(record) => record,
        Err(err) => return gallery_error_response(&err),
    };

    match gallery.delete(&record).await {
        Ok(()) => ApiResponse::no_content(),
        Err(err) => {
            tracing::error!("Deleting media {} for {} failed: {}", record.id, owner, err);
            gallery_error_response(&err)
        }
    }
}

use actix_web::{get, web, Responder};
use serde::Serialize;

use super::{gallery_error_response, MediaItemResponse};
use crate::{
    identity::adapter::incoming::web::extractors::SignedInUser, shared::api::ApiResponse,
    AppState,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub struct ListMediaResponse {
    rows: Vec<MediaItemResponse>,
}

#[get("/api/media")]
pub async fn list_media_handler(user: SignedInUser, data: web::Data<AppState>) -> impl Responder {
    let gallery = &data.multimedia.gallery;

    match gallery.list(&user.identity().owner_id).await {
        Ok(records) => {
            let rows = records
                .into_iter()
                .map(|record| {
                    let url = gallery.public_url(&record);
                    MediaItemResponse::from_record(record, url)
                })
                .collect();
            ApiResponse::success(ListMediaResponse { rows })
        }
        Err(err) => {
            tracing::error!("Listing media for {} failed: {}", user.identity().owner_id, err);
            gallery_error_response(&err)
        }
    }
}

use actix_web::{http::header, post, web, HttpRequest, Responder};
use chrono::Utc;
use serde::Deserialize;

use super::{commit_error_response, MediaItemResponse};
use crate::{
    identity::adapter::incoming::web::extractors::SignedInUser,
    multimedia::application::{
        domain::entities::MediaBlob, ports::incoming::use_cases::CommitMediaError,
    },
    shared::api::ApiResponse,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct UploadMediaQuery {
    #[serde(default)]
    filename: Option<String>,
}

/// Commits one capture. Raw payload in the body, media type in
/// `Content-Type`, display name in `?filename=`.
#[post("/api/media")]
pub async fn upload_media_handler(
    user: SignedInUser,
    query: web::Query<UploadMediaQuery>,
    req: HttpRequest,
    body: web::Bytes,
    data: web::Data<AppState>,
) -> impl Responder {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let filename = query
        .into_inner()
        .filename
        .unwrap_or_else(|| format!("upload-{}", Utc::now().timestamp_millis()));

    let blob = match MediaBlob::try_new(filename, content_type, body) {
        Ok(blob) => blob,
        Err(e) => return commit_error_response(&CommitMediaError::InvalidBlob(e)),
    };

    let owner = &user.identity().owner_id;

    match data.multimedia.commit_media.execute(blob, owner).await {
        Ok(record) => {
            let url = data.multimedia.gallery.public_url(&record);
            ApiResponse::created(MediaItemResponse::from_record(record, url))
        }
        Err(e) => {
            tracing::error!("Upload for {} failed: {}", owner, e);
            commit_error_response(&e)
        }
    }
}

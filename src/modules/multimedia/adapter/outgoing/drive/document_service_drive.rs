use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    identity::application::domain::entities::DelegatedToken,
    multimedia::application::{
        domain::policies::MediaPolicy,
        ports::outgoing::drive::{DocumentService, DocumentServiceError, DriveFile, DriveUpload},
    },
};

/// Raw outcome of one multipart POST. Transport failures are the `Err` side.
#[derive(Debug, Clone)]
struct HttpReply {
    status: u16,
    body: String,
}

/// Internal seam so the status/body handling can be tested without a server.
#[async_trait]
trait DriveHttp: Send + Sync {
    async fn post_multipart(
        &self,
        url: &str,
        bearer: &str,
        metadata_json: String,
        mime_type: &str,
        bytes: Bytes,
    ) -> Result<HttpReply, String>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFileResponse {
    id: String,
    name: Option<String>,
    mime_type: Option<String>,
}

/// Production adapter: mirrors stored media into the caller's Drive
/// app-data folder using the caller's delegated token.
#[derive(Clone)]
pub struct GoogleDriveDocumentService {
    http: Arc<dyn DriveHttp>,
    upload_url: String,
}

impl GoogleDriveDocumentService {
    pub fn new(policy: &MediaPolicy) -> Self {
        Self {
            http: Arc::new(ReqwestDriveHttp {
                client: reqwest::Client::new(),
            }),
            upload_url: policy.drive_upload_url.clone(),
        }
    }

    #[cfg(test)]
    fn with_http(http: Arc<dyn DriveHttp>, policy: &MediaPolicy) -> Self {
        Self {
            http,
            upload_url: policy.drive_upload_url.clone(),
        }
    }

    fn metadata_json(upload: &DriveUpload) -> String {
        serde_json::json!({
            "name": upload.name,
            "parents": [upload.parent_folder],
        })
        .to_string()
    }
}

#[async_trait]
impl DocumentService for GoogleDriveDocumentService {
    async fn upload(
        &self,
        token: &DelegatedToken,
        upload: DriveUpload,
    ) -> Result<DriveFile, DocumentServiceError> {
        let metadata = Self::metadata_json(&upload);

        let reply = self
            .http
            .post_multipart(
                &self.upload_url,
                token.expose(),
                metadata,
                &upload.mime_type,
                upload.bytes.clone(),
            )
            .await
            .map_err(|e| {
                tracing::error!("Drive upload of {} failed to send: {}", upload.name, e);
                DocumentServiceError::Network(e)
            })?;

        match reply.status {
            200..=299 => {}
            401 => {
                tracing::warn!("Drive rejected the delegated token for {}", upload.name);
                return Err(DocumentServiceError::Unauthorized);
            }
            status => {
                tracing::warn!(
                    "Drive upload of {} rejected with status {}: {}",
                    upload.name,
                    status,
                    reply.body
                );
                return Err(DocumentServiceError::Rejected { status });
            }
        }

        let parsed: DriveFileResponse = serde_json::from_str(&reply.body)
            .map_err(|e| DocumentServiceError::InvalidResponse(e.to_string()))?;

        if parsed.id.trim().is_empty() {
            return Err(DocumentServiceError::InvalidResponse(
                "empty file id".to_string(),
            ));
        }

        Ok(DriveFile {
            id: parsed.id,
            name: parsed.name.unwrap_or(upload.name),
            mime_type: parsed.mime_type.unwrap_or(upload.mime_type),
        })
    }
}

// ============================================================================
// Real HTTP client (reqwest multipart)
// ============================================================================

struct ReqwestDriveHttp {
    client: reqwest::Client,
}

#[async_trait]
impl DriveHttp for ReqwestDriveHttp {
    async fn post_multipart(
        &self,
        url: &str,
        bearer: &str,
        metadata_json: String,
        mime_type: &str,
        bytes: Bytes,
    ) -> Result<HttpReply, String> {
        let metadata = reqwest::multipart::Part::text(metadata_json)
            .mime_str("application/json")
            .map_err(|e| e.to_string())?;
        let file = reqwest::multipart::Part::bytes(bytes.to_vec())
            .mime_str(mime_type)
            .map_err(|e| e.to_string())?;

        let form = reqwest::multipart::Form::new()
            .part("metadata", metadata)
            .part("file", file);

        let response = self
            .client
            .post(url)
            .bearer_auth(bearer)
            .multipart(form)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| e.to_string())?;

        Ok(HttpReply { status, body })
    }
}

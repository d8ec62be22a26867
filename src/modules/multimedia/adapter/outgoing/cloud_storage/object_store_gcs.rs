use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::multimedia::application::{
    domain::{entities::StoragePath, policies::MediaPolicy},
    ports::outgoing::cloud_storage::{ObjectStore, ObjectStoreError},
};

/// google-cloud-storage uses a bucket resource name format:
/// `projects/_/buckets/{bucket}`
fn bucket_resource(bucket: &str) -> String {
    format!("projects/_/buckets/{}", bucket)
}

fn map_storage_error(msg: &str) -> ObjectStoreError {
    let m = msg.to_lowercase();

    if m.contains("404") || m.contains("not found") || m.contains("no such object") {
        ObjectStoreError::NotFound
    } else if m.contains("403")
        || m.contains("permission")
        || m.contains("forbidden")
        || m.contains("denied")
    {
        ObjectStoreError::AccessDenied
    } else if m.contains("timeout")
        || m.contains("dns")
        || m.contains("connection")
        || m.contains("network")
        || m.contains("tcp")
    {
        ObjectStoreError::Network(msg.to_string())
    } else {
        ObjectStoreError::Infrastructure(msg.to_string())
    }
}

/// Internal seam to make the adapter testable without mocking google-cloud-storage types/streams.
#[async_trait]
trait GcsClient: Send + Sync {
    async fn upload_object(
        &self,
        bucket_resource: &str,
        object_name: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<(), String>;

    async fn download_object_bytes(
        &self,
        bucket_resource: &str,
        object_name: &str,
    ) -> Result<Vec<u8>, String>;

    async fn delete_object(&self, bucket_resource: &str, object_name: &str)
        -> Result<(), String>;
}

#[cfg(test)]
struct ArcGcsClient(Arc<dyn GcsClient>);

#[cfg(test)]
#[async_trait]
impl GcsClient for ArcGcsClient {
    async fn upload_object(
        &self,
        bucket_resource: &str,
        object_name: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<(), String> {
        self.0
            .upload_object(bucket_resource, object_name, content_type, bytes)
            .await
    }

    async fn download_object_bytes(
        &self,
        bucket_resource: &str,
        object_name: &str,
    ) -> Result<Vec<u8>, String> {
        self.0
            .download_object_bytes(bucket_resource, object_name)
            .await
    }

    async fn delete_object(
        &self,
        bucket_resource: &str,
        object_name: &str,
    ) -> Result<(), String> {
        self.0.delete_object(bucket_resource, object_name).await
    }
}

/// Production adapter: implements the ObjectStore port on a GCS bucket.
#[derive(Clone)]
pub struct GcsObjectStore {
    client: Arc<OnceCell<Box<dyn GcsClient>>>,
    bucket_name: String,
    public_base_url: String,
}

impl GcsObjectStore {
    /// Synchronous constructor - client is initialized lazily on first use.
    pub fn new(policy: &MediaPolicy) -> Self {
        Self {
            client: Arc::new(OnceCell::new()),
            bucket_name: policy.bucket_name.clone(),
            public_base_url: policy.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_client(&self) -> Result<&dyn GcsClient, ObjectStoreError> {
        self.client
            .get_or_try_init(|| async {
                let real_client = RealGcsClient::new().await?;
                Ok::<_, Box<dyn std::error::Error + Send + Sync>>(
                    Box::new(real_client) as Box<dyn GcsClient>
                )
            })
            .await
            .map(|boxed| &**boxed)
            .map_err(|e| ObjectStoreError::Infrastructure(e.to_string()))
    }

    /// Test-friendly constructor with pre-initialized client.
    #[cfg(test)]
    fn with_client(client: Arc<dyn GcsClient>, policy: &MediaPolicy) -> Self {
        let once = OnceCell::new();
        let _ = once.set(Box::new(ArcGcsClient(client)) as Box<dyn GcsClient>);

        Self {
            client: Arc::new(once),
            ..Self::new(policy)
        }
    }
}

#[async_trait]
impl ObjectStore for GcsObjectStore {
    async fn put(
        &self,
        path: &StoragePath,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<StoragePath, ObjectStoreError> {
        let client = self.get_client().await?;
        let bucket = bucket_resource(&self.bucket_name);

        client
            .upload_object(&bucket, path.as_str(), content_type, bytes)
            .await
            .map_err(|e| {
                tracing::error!("GCS upload of {} failed: {}", path, e);
                map_storage_error(&e)
            })?;

        Ok(path.clone())
    }

    async fn get(&self, path: &StoragePath) -> Result<Bytes, ObjectStoreError> {
        let client = self.get_client().await?;
        let bucket = bucket_resource(&self.bucket_name);

        let bytes = client
            .download_object_bytes(&bucket, path.as_str())
            .await
            .map_err(|e| map_storage_error(&e))?;

        Ok(Bytes::from(bytes))
    }

    async fn remove(&self, path: &StoragePath) -> Result<(), ObjectStoreError> {
        let client = self.get_client().await?;
        let bucket = bucket_resource(&self.bucket_name);

        client
            .delete_object(&bucket, path.as_str())
            .await
            .map_err(|e| map_storage_error(&e))
    }

    fn public_url(&self, path: &StoragePath) -> String {
        format!("{}/{}/{}", self.public_base_url, self.bucket_name, path)
    }
}

// ============================================================================
// Real Google Cloud Storage client (google-cloud-storage)
// ============================================================================

struct RealGcsClient {
    storage: google_cloud_storage::client::Storage,
    control: google_cloud_storage::client::StorageControl,
}

impl RealGcsClient {
    async fn new() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!("Initializing GCS client...");

        let storage = google_cloud_storage::client::Storage::builder()
            .build()
            .await
            .map_err(|e| {
                tracing::error!("Failed to build GCS storage client: {:?}", e);
                e
            })?;

        let control = google_cloud_storage::client::StorageControl::builder()
            .build()
            .await
            .map_err(|e| {
                tracing::error!("Failed to build GCS control client: {:?}", e);
                e
            })?;

        tracing::info!("GCS clients created");

        Ok(Self { storage, control })
    }
}

#[async_trait]
impl GcsClient for RealGcsClient {
    async fn upload_object(
        &self,
        bucket_resource: &str,
        object_name: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<(), String> {
        self.storage
            .write_object(bucket_resource.to_string(), object_name.to_string(), bytes)
            .set_content_type(content_type.to_string())
            .send_buffered()
            .await
            .map_err(|e| e.to_string())?;

        Ok(())
    }

    async fn download_object_bytes(
        &self,
        bucket_resource: &str,
        object_name: &str,
    ) -> Result<Vec<u8>, String> {
        let mut stream = self
            .storage
            .read_object(bucket_resource.to_string(), object_name.to_string())
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let mut out: Vec<u8> = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| e.to_string())?;
            out.extend_from_slice(&chunk);
        }

        Ok(out)
    }

    async fn delete_object(
        &self,
        bucket_resource: &str,
        object_name: &str,
    ) -> Result<(), String> {
        self.control
            .delete_object()
            .set_bucket(bucket_resource.to_string())
            .set_object(object_name.to_string())
            .send()
            .await
            .map_err(|e| e.to_string())
    }
}

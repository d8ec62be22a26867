#[derive(Debug, Clone)]
pub struct MediaPolicy {
    pub bucket_name: String,
    pub public_base_url: String,
    pub max_upload_bytes: u64,
    pub drive_parent_folder: String,
    pub drive_upload_url: String,
}

impl MediaPolicy {
    pub const DEFAULT_BUCKET_NAME: &'static str = "media";
    pub const DEFAULT_PUBLIC_BASE_URL: &'static str = "https://storage.googleapis.com";
    pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024; // 100MB
    pub const DEFAULT_DRIVE_PARENT_FOLDER: &'static str = "appDataFolder";
    pub const DEFAULT_DRIVE_UPLOAD_URL: &'static str =
        "https://www.googleapis.com/upload/drive/v3/files?uploadType=multipart&fields=id,name,mimeType";

    /// Load policy from env vars, falling back to the defaults above.
    ///
    /// `MEDIA_BUCKET`, `MEDIA_PUBLIC_BASE_URL`, `MEDIA_MAX_UPLOAD_BYTES`,
    /// `DRIVE_PARENT_FOLDER`, `DRIVE_UPLOAD_URL`
    pub fn from_env() -> Self {
        let max_upload_bytes = std::env::var("MEDIA_MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(Self::DEFAULT_MAX_UPLOAD_BYTES);

        Self {
            bucket_name: env_or("MEDIA_BUCKET", Self::DEFAULT_BUCKET_NAME),
            public_base_url: env_or("MEDIA_PUBLIC_BASE_URL", Self::DEFAULT_PUBLIC_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            max_upload_bytes,
            drive_parent_folder: env_or("DRIVE_PARENT_FOLDER", Self::DEFAULT_DRIVE_PARENT_FOLDER),
            drive_upload_url: env_or("DRIVE_UPLOAD_URL", Self::DEFAULT_DRIVE_UPLOAD_URL),
        }
    }

    /// Handy for unit tests or custom wiring (no env reads).
    pub fn new(bucket_name: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            public_base_url: Self::DEFAULT_PUBLIC_BASE_URL.to_string(),
            max_upload_bytes: Self::DEFAULT_MAX_UPLOAD_BYTES,
            drive_parent_folder: Self::DEFAULT_DRIVE_PARENT_FOLDER.to_string(),
            drive_upload_url: Self::DEFAULT_DRIVE_UPLOAD_URL.to_string(),
        }
    }

    pub fn with_max_upload_bytes(mut self, max: u64) -> Self {
        self.max_upload_bytes = max;
        self
    }
}

impl Default for MediaPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BUCKET_NAME)
    }
}

fn env_or(key: &str, fallback: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

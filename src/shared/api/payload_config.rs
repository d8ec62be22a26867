use actix_web::web::PayloadConfig;

/// Raw body limit for media uploads, sized from the upload policy.
/// Bodies over the limit are refused with 413 before a handler runs.
pub fn media_payload_config(max_upload_bytes: u64) -> PayloadConfig {
    let limit = usize::try_from(max_upload_bytes).unwrap_or(usize::MAX);
    PayloadConfig::new(limit)
}

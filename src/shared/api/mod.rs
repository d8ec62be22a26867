mod payload_config;
mod response;

pub use payload_config::media_payload_config;
pub use response::{ApiError, ApiResponse};

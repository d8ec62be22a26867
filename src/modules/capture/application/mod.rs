pub mod capture_session;
pub mod domain;
pub mod ports;
pub mod recording;
pub mod still_encoder;

pub use capture_session::{CaptureError, CaptureSession};

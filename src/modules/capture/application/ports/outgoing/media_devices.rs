use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use crate::capture::application::domain::entities::{Facing, VideoFrame};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DeviceError {
    #[error("Camera or microphone permission was denied")]
    PermissionDenied,

    #[error("No camera found for facing mode {0}")]
    NotFound(Facing),

    #[error("Device is in use")]
    Busy,

    #[error("Device stream was stopped")]
    Disconnected,

    #[error("No frame available: {0}")]
    FrameUnavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    pub facing: Facing,
    pub audio: bool,
}

/// Source of camera/microphone streams.
#[async_trait]
pub trait MediaDevices: Send + Sync {
    async fn acquire(
        &self,
        constraints: StreamConstraints,
    ) -> Result<Box<dyn DeviceStream>, DeviceError>;
}

/// An acquired set of camera/microphone tracks.
#[async_trait]
pub trait DeviceStream: Send + Sync {
    fn facing(&self) -> Facing;

    /// Tracks not yet stopped.
    fn live_track_count(&self) -> usize;

    async fn grab_frame(&self) -> Result<VideoFrame, DeviceError>;

    /// Starts the recorder. Encoded chunks arrive on the returned channel,
    /// which closes once the recorder has flushed its last chunk.
    fn start_recording(&mut self) -> Result<mpsc::UnboundedReceiver<Bytes>, DeviceError>;

    fn stop_recording(&mut self);

    /// Stops every track. Idempotent.
    fn stop(&mut self);
}

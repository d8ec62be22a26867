use bytes::{Bytes, BytesMut};
use tokio::sync::{mpsc, oneshot};

/// Why a recording produced no usable payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordingError {
    #[error("no data was recorded")]
    NoData,

    #[error("recording buffer was lost before it finished")]
    BufferLost,
}

/// An in-progress recording. Chunks are buffered by a background task and
/// concatenated once the device closes the chunk channel; the result is
/// delivered exactly once through [`Recording::finish`].
#[derive(Debug)]
pub struct Recording {
    completion: oneshot::Receiver<Bytes>,
}

impl Recording {
    pub fn start(mut chunks: mpsc::UnboundedReceiver<Bytes>) -> Self {
        let (done, completion) = oneshot::channel();

        tokio::spawn(async move {
            let mut buffer = BytesMut::new();
            let mut count = 0usize;
            while let Some(chunk) = chunks.recv().await {
                buffer.extend_from_slice(&chunk);
                count += 1;
            }
            tracing::debug!("Recording finalized: {} chunks, {} bytes", count, buffer.len());
            // Receiver is gone when the session was stopped mid-recording
            let _ = done.send(buffer.freeze());
        });

        Self { completion }
    }

    /// Waits for the buffer task to finalize the payload.
    pub async fn finish(self) -> Result<Bytes, RecordingError> {
        match self.completion.await {
            Ok(bytes) if bytes.is_empty() => Err(RecordingError::NoData),
            Ok(bytes) => Ok(bytes),
            Err(_) => Err(RecordingError::BufferLost),
        }
    }
}

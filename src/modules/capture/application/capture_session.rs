use chrono::Utc;
use std::mem;
use std::sync::Arc;

use crate::{
    capture::application::{
        domain::entities::{CaptureState, Facing},
        ports::outgoing::{DeviceError, DeviceStream, MediaDevices, StreamConstraints},
        recording::{Recording, RecordingError},
        still_encoder::encode_jpeg,
    },
    identity::application::domain::entities::OwnerId,
    multimedia::application::{
        domain::entities::{MediaBlob, MediaKind, MediaRecord},
        ports::incoming::use_cases::{CommitMediaError, CommitMediaUseCase},
    },
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    #[error("Device access failed: {0}")]
    DeviceAccess(#[from] DeviceError),

    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: CaptureState,
    },

    #[error("Snapshot failed: {0}")]
    SnapshotFailed(String),

    #[error("Recording failed: {0}")]
    RecordingFailed(String),

    #[error(transparent)]
    Commit(#[from] CommitMediaError),
}

impl CaptureError {
    pub fn code(&self) -> &'static str {
        match self {
            CaptureError::DeviceAccess(_) => "DEVICE_ACCESS_ERROR",
            CaptureError::InvalidTransition { .. } => "INVALID_CAPTURE_TRANSITION",
            CaptureError::SnapshotFailed(_) => "SNAPSHOT_FAILED",
            CaptureError::RecordingFailed(_) => "RECORDING_FAILED",
            CaptureError::Commit(e) => e.code(),
        }
    }

    pub fn notification(&self) -> &'static str {
        match self {
            CaptureError::DeviceAccess(DeviceError::PermissionDenied) => {
                "Camera access was denied. Please allow camera and microphone access."
            }
            CaptureError::DeviceAccess(_) => "Unable to access the camera.",
            CaptureError::InvalidTransition { .. } => "That action isn't available right now.",
            CaptureError::SnapshotFailed(_) => "The photo couldn't be taken. Please try again.",
            CaptureError::RecordingFailed(_) => "The recording couldn't be saved.",
            CaptureError::Commit(e) => e.notification(),
        }
    }
}

/// Device handle owned by the session. Dropping it stops every track.
struct ActiveStream(Box<dyn DeviceStream>);

impl ActiveStream {
    fn get(&self) -> &dyn DeviceStream {
        self.0.as_ref()
    }

    fn get_mut(&mut self) -> &mut dyn DeviceStream {
        self.0.as_mut()
    }
}

impl Drop for ActiveStream {
    fn drop(&mut self) {
        self.0.stop();
    }
}

enum Phase {
    Idle,
    Streaming(ActiveStream),
    Recording {
        stream: ActiveStream,
        recording: Recording,
    },
    Reviewing(MediaBlob),
    Committing(MediaBlob),
}

/// Holds the session in Committing for the duration of an upload. Puts the
/// capture back into Reviewing if the upload future is dropped or fails.
struct CommitInFlight<'a> {
    phase: &'a mut Phase,
    blob: Option<MediaBlob>,
}

impl<'a> CommitInFlight<'a> {
    fn begin(phase: &'a mut Phase, blob: MediaBlob) -> Self {
        *phase = Phase::Committing(blob.clone());
        Self {
            phase,
            blob: Some(blob),
        }
    }

    fn complete(mut self) {
        self.blob = None;
        *self.phase = Phase::Idle;
    }
}

impl Drop for CommitInFlight<'_> {
    fn drop(&mut self) {
        if let Some(blob) = self.blob.take() {
            *self.phase = Phase::Reviewing(blob);
        }
    }
}

impl Phase {
    fn state(&self) -> CaptureState {
        match self {
            Phase::Idle => CaptureState::Idle,
            Phase::Streaming(_) => CaptureState::Streaming,
            Phase::Recording { .. } => CaptureState::Recording,
            Phase::Reviewing(_) => CaptureState::Reviewing,
            Phase::Committing(_) => CaptureState::Committing,
        }
    }
}

/// Camera capture state machine.
///
/// The session owns at most one device stream. Every transition out of
/// `Streaming` or `Recording` releases it before returning, on success and
/// on failure alike.
pub struct CaptureSession {
    devices: Arc<dyn MediaDevices>,
    facing: Facing,
    phase: Phase,
}

impl CaptureSession {
    pub fn new(devices: Arc<dyn MediaDevices>, facing: Facing) -> Self {
        Self {
            devices,
            facing,
            phase: Phase::Idle,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.phase.state()
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// The capture awaiting retake or commit.
    pub fn pending_blob(&self) -> Option<&MediaBlob> {
        match &self.phase {
            Phase::Reviewing(blob) | Phase::Committing(blob) => Some(blob),
            _ => None,
        }
    }

    pub fn has_live_stream(&self) -> bool {
        matches!(self.phase, Phase::Streaming(_) | Phase::Recording { .. })
    }

    async fn acquire(&self) -> Result<ActiveStream, DeviceError> {
        let stream = self
            .devices
            .acquire(StreamConstraints {
                facing: self.facing,
                audio: true,
            })
            .await?;
        tracing::debug!(
            "Acquired {} camera with {} tracks",
            stream.facing(),
            stream.live_track_count()
        );
        Ok(ActiveStream(stream))
    }

    fn invalid(&mut self, previous: Phase, action: &'static str) -> CaptureError {
        let state = previous.state();
        self.phase = previous;
        CaptureError::InvalidTransition { action, state }
    }

    /// Idle -> Streaming.
    pub async fn start(&mut self) -> Result<(), CaptureError> {
        if !matches!(self.phase, Phase::Idle) {
            return Err(CaptureError::InvalidTransition {
                action: "start",
                state: self.state(),
            });
        }

        match self.acquire().await {
            Ok(stream) => {
                self.phase = Phase::Streaming(stream);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Camera start ({}) failed: {}", self.facing, e);
                Err(CaptureError::DeviceAccess(e))
            }
        }
    }

    /// Streaming -> Reviewing with a JPEG still. A failed snapshot keeps
    /// the session streaming.
    pub async fn capture_still(&mut self) -> Result<MediaBlob, CaptureError> {
        let stream = match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Streaming(stream) => stream,
            other => return Err(self.invalid(other, "capture a still")),
        };

        let still = match stream.get().grab_frame().await {
            Ok(frame) => encode_jpeg(&frame).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        let blob = still.and_then(|jpeg| {
            MediaBlob::captured(MediaKind::Image, jpeg, Utc::now()).map_err(|e| e.to_string())
        });

        match blob {
            Ok(blob) => {
                drop(stream);
                self.phase = Phase::Reviewing(blob.clone());
                Ok(blob)
            }
            Err(reason) => {
                tracing::warn!("Snapshot failed: {}", reason);
                self.phase = Phase::Streaming(stream);
                Err(CaptureError::SnapshotFailed(reason))
            }
        }
    }

    /// Streaming -> Recording.
    pub fn begin_recording(&mut self) -> Result<(), CaptureError> {
        let mut stream = match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Streaming(stream) => stream,
            other => return Err(self.invalid(other, "start recording")),
        };

        match stream.get_mut().start_recording() {
            Ok(chunks) => {
                self.phase = Phase::Recording {
                    stream,
                    recording: Recording::start(chunks),
                };
                Ok(())
            }
            Err(e) => {
                self.phase = Phase::Streaming(stream);
                Err(CaptureError::RecordingFailed(e.to_string()))
            }
        }
    }

    /// Recording -> Reviewing with the concatenated video. The stream is
    /// released before the buffered chunks are awaited; an empty or lost
    /// recording leaves the session idle.
    pub async fn end_recording(&mut self) -> Result<MediaBlob, CaptureError> {
        let (mut stream, recording) = match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Recording { stream, recording } => (stream, recording),
            other => return Err(self.invalid(other, "stop recording")),
        };

        stream.get_mut().stop_recording();
        drop(stream);

        let bytes = recording.finish().await.map_err(|e: RecordingError| {
            tracing::warn!("Recording discarded: {}", e);
            CaptureError::RecordingFailed(e.to_string())
        })?;

        let blob = MediaBlob::captured(MediaKind::Video, bytes, Utc::now())
            .map_err(|e| CaptureError::RecordingFailed(e.to_string()))?;

        self.phase = Phase::Reviewing(blob.clone());
        Ok(blob)
    }

    /// Reviewing -> Streaming, discarding the pending capture.
    pub async fn retake(&mut self) -> Result<(), CaptureError> {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Reviewing(_) => {}
            other => return Err(self.invalid(other, "retake")),
        }

        let stream = self.acquire().await.map_err(|e| {
            tracing::warn!("Camera restart for retake failed: {}", e);
            CaptureError::DeviceAccess(e)
        })?;
        self.phase = Phase::Streaming(stream);
        Ok(())
    }

    /// Reviewing -> Committing -> Idle. On failure, or when the returned
    /// future is dropped mid-upload, the session returns to Reviewing with the
    /// capture kept for another attempt.
    pub async fn commit(
        &mut self,
        uploader: &dyn CommitMediaUseCase,
        owner: &OwnerId,
    ) -> Result<MediaRecord, CaptureError> {
        let blob = match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Reviewing(blob) => blob,
            other => return Err(self.invalid(other, "commit")),
        };

        let upload = uploader.execute(blob.clone(), owner);
        let in_flight = CommitInFlight::begin(&mut self.phase, blob);

        match upload.await {
            Ok(record) => {
                in_flight.complete();
                Ok(record)
            }
            Err(e) => {
                drop(in_flight);
                Err(CaptureError::Commit(e))
            }
        }
    }

    /// Tears down the current stream and re-acquires with the opposite
    /// facing. While idle only the preference changes. A failed acquisition
    /// leaves the session idle with the new facing.
    pub async fn switch_facing(&mut self) -> Result<(), CaptureError> {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => {
                self.facing = self.facing.opposite();
                return Ok(());
            }
            Phase::Streaming(stream) => drop(stream),
            other => return Err(self.invalid(other, "switch camera")),
        }

        self.facing = self.facing.opposite();

        let stream = self.acquire().await.map_err(|e| {
            tracing::warn!("Switching to {} camera failed: {}", self.facing, e);
            CaptureError::DeviceAccess(e)
        })?;
        self.phase = Phase::Streaming(stream);
        Ok(())
    }

    /// Releases any stream and discards any pending capture. Not allowed
    /// while a commit is in flight.
    pub fn stop(&mut self) -> Result<(), CaptureError> {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Committing(blob) => Err(self.invalid(Phase::Committing(blob), "stop")),
            Phase::Recording {
                mut stream,
                recording,
            } => {
                stream.get_mut().stop_recording();
                drop(stream);
                drop(recording);
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::capture::adapter::outgoing::SyntheticCamera;
    use crate::multimedia::application::domain::entities::StoragePath;

    struct RecordingUploader {
        fail: bool,
        seen: Mutex<Vec<(String, u64)>>,
    }

    impl RecordingUploader {
        fn ok() -> Self {
            Self {
                fail: false,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CommitMediaUseCase for RecordingUploader {
        async fn execute(
            &self,
            blob: MediaBlob,
            owner: &OwnerId,
        ) -> Result<MediaRecord, CommitMediaError> {
            self.seen
                .lock()
                .unwrap()
                .push((blob.content_type().to_string(), blob.len()));
            if self.fail {
                return Err(CommitMediaError::StorageWriteFailed("offline".to_string()));
            }
            let now = Utc::now();
            Ok(MediaRecord {
                id: uuid::Uuid::new_v4(),
                owner_id: owner.clone(),
                filename: blob.filename().to_string(),
                storage_path: StoragePath::generate(owner, &blob.extension()),
                media_type: blob.kind(),
                size_bytes: blob.len(),
                drive_file_id: None,
                created_at: now,
                updated_at: now,
            })
        }
    }

    struct StalledUploader;

    #[async_trait]
    impl CommitMediaUseCase for StalledUploader {
        async fn execute(
            &self,
            _blob: MediaBlob,
            _owner: &OwnerId,
        ) -> Result<MediaRecord, CommitMediaError> {
            std::future::pending().await
        }
    }

    fn session(camera: &Arc<SyntheticCamera>) -> CaptureSession {
        CaptureSession::new(camera.clone(), Facing::Rear)
    }

    fn owner() -> OwnerId {
        OwnerId::try_new("u1").unwrap()
    }

    #[tokio::test]
    async fn test_start_acquires_one_stream_with_audio() {
        let camera = Arc::new(SyntheticCamera::new());
        let mut s = session(&camera);

        s.start().await.unwrap();

        assert_eq!(s.state(), CaptureState::Streaming);
        assert_eq!(camera.inventory().live_streams(), 1);
        assert_eq!(camera.inventory().live_tracks(), 2);
    }

    #[tokio::test]
    async fn test_start_failure_stays_idle() {
        let camera = Arc::new(SyntheticCamera::new());
        camera.fail_next_acquire(DeviceError::PermissionDenied);
        let mut s = session(&camera);

        let err = s.start().await.unwrap_err();

        assert_eq!(err, CaptureError::DeviceAccess(DeviceError::PermissionDenied));
        assert_eq!(err.code(), "DEVICE_ACCESS_ERROR");
        assert_eq!(s.state(), CaptureState::Idle);
        assert_eq!(camera.inventory().live_streams(), 0);
    }

    #[tokio::test]
    async fn test_capture_still_releases_stream_and_reviews_jpeg() {
        let camera = Arc::new(SyntheticCamera::new());
        let mut s = session(&camera);
        s.start().await.unwrap();

        let blob = s.capture_still().await.unwrap();
        assert_eq!(blob.kind(), MediaKind::Image);
        assert_eq!(blob.content_type(), "image/jpeg");
        assert!(blob.filename().starts_with("capture-"));
        assert!(blob.filename().ends_with(".jpg"));

        assert_eq!(s.state(), CaptureState::Reviewing);
        assert_eq!(camera.inventory().live_streams(), 0);
        assert_eq!(camera.inventory().live_tracks(), 0);
    }

    #[tokio::test]
    async fn test_failed_snapshot_keeps_streaming() {
        let camera = Arc::new(SyntheticCamera::new());
        let mut s = session(&camera);
        s.start().await.unwrap();
        camera.fail_frames(true);

        let err = s.capture_still().await.unwrap_err();

        assert!(matches!(err, CaptureError::SnapshotFailed(_)));
        assert_eq!(s.state(), CaptureState::Streaming);
        assert_eq!(camera.inventory().live_streams(), 1);
    }

    #[tokio::test]
    async fn test_recording_produces_webm_and_releases_stream() {
        let camera = Arc::new(SyntheticCamera::new());
        let mut s = session(&camera);
        s.start().await.unwrap();

        s.begin_recording().unwrap();
        assert_eq!(s.state(), CaptureState::Recording);
        tokio::time::sleep(std::time::Duration::from_millis(30)).await;

        let blob = s.end_recording().await.unwrap();
        assert_eq!(blob.kind(), MediaKind::Video);
        assert_eq!(blob.content_type(), "video/webm");
        assert_eq!(&blob.bytes()[..4], &[0x1A, 0x45, 0xDF, 0xA3]);

        assert_eq!(s.state(), CaptureState::Reviewing);
        assert_eq!(camera.inventory().live_streams(), 0);
        assert_eq!(camera.inventory().live_tracks(), 0);
    }

    #[tokio::test]
    async fn test_empty_recording_returns_to_idle() {
        let camera = Arc::new(SyntheticCamera::new().with_silent_recorder());
        let mut s = session(&camera);
        s.start().await.unwrap();
        s.begin_recording().unwrap();

        let err = s.end_recording().await.unwrap_err();

        assert!(matches!(err, CaptureError::RecordingFailed(_)));
        assert_eq!(s.state(), CaptureState::Idle);
        assert!(s.pending_blob().is_none());
        assert_eq!(camera.inventory().live_streams(), 0);
    }

    #[tokio::test]
    async fn test_retake_discards_capture_and_streams_again() {
        let camera = Arc::new(SyntheticCamera::new());
        let mut s = session(&camera);
        s.start().await.unwrap();
        s.capture_still().await.unwrap();

        s.retake().await.unwrap();

        assert_eq!(s.state(), CaptureState::Streaming);
        assert!(s.pending_blob().is_none());
        assert_eq!(camera.inventory().live_streams(), 1);
        assert_eq!(camera.inventory().acquisitions(), 2);
    }

    #[tokio::test]
    async fn test_commit_success_clears_pending_blob() {
        let camera = Arc::new(SyntheticCamera::new());
        let mut s = session(&camera);
        s.start().await.unwrap();
        let size = s.capture_still().await.unwrap().len();

        let uploader = RecordingUploader::ok();
        let record = s.commit(&uploader, &owner()).await.unwrap();

        assert_eq!(record.size_bytes, size);
        assert_eq!(record.media_type, MediaKind::Image);
        assert_eq!(s.state(), CaptureState::Idle);
        assert!(s.pending_blob().is_none());
        assert_eq!(uploader.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_commit_failure_returns_to_reviewing_with_blob() {
        let camera = Arc::new(SyntheticCamera::new());
        let mut s = session(&camera);
        s.start().await.unwrap();
        s.capture_still().await.unwrap();

        let err = s
            .commit(&RecordingUploader::failing(), &owner())
            .await
            .unwrap_err();

        assert_eq!(err.code(), "STORAGE_WRITE_FAILED");
        assert_eq!(s.state(), CaptureState::Reviewing);
        assert!(s.pending_blob().is_some());

        // the kept capture can be committed again
        let record = s.commit(&RecordingUploader::ok(), &owner()).await.unwrap();
        assert_eq!(record.media_type, MediaKind::Image);
    }

    #[tokio::test]
    async fn test_abandoned_commit_returns_to_reviewing() {
        let camera = Arc::new(SyntheticCamera::new());
        let mut s = session(&camera);
        s.start().await.unwrap();
        let size = s.capture_still().await.unwrap().len();

        let outcome = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            s.commit(&StalledUploader, &owner()),
        )
        .await;
        assert!(outcome.is_err());

        assert_eq!(s.state(), CaptureState::Reviewing);
        assert_eq!(s.pending_blob().map(|b| b.len()), Some(size));

        s.retake().await.unwrap();
        assert_eq!(s.state(), CaptureState::Streaming);
        s.stop().unwrap();
        assert_eq!(s.state(), CaptureState::Idle);
        assert_eq!(camera.inventory().live_streams(), 0);
    }

    #[tokio::test]
    async fn test_switching_facing_twice_leaves_one_stream() {
        let camera = Arc::new(SyntheticCamera::new());
        let mut s = session(&camera);
        s.start().await.unwrap();

        s.switch_facing().await.unwrap();
        assert_eq!(s.facing(), Facing::Front);
        assert_eq!(camera.inventory().live_streams(), 1);

        s.switch_facing().await.unwrap();
        assert_eq!(s.facing(), Facing::Rear);
        assert_eq!(camera.inventory().live_streams(), 1);
        assert_eq!(camera.inventory().live_tracks(), 2);
        assert_eq!(camera.inventory().peak_streams(), 1);

        drop(s);
        assert_eq!(camera.inventory().live_streams(), 0);
        assert_eq!(camera.inventory().live_tracks(), 0);
    }

    #[tokio::test]
    async fn test_switch_failure_leaves_idle_with_new_facing() {
        let camera = Arc::new(SyntheticCamera::new());
        let mut s = session(&camera);
        s.start().await.unwrap();
        camera.fail_next_acquire(DeviceError::NotFound(Facing::Front));

        let err = s.switch_facing().await.unwrap_err();

        assert!(matches!(err, CaptureError::DeviceAccess(_)));
        assert_eq!(s.state(), CaptureState::Idle);
        assert_eq!(s.facing(), Facing::Front);
        assert_eq!(camera.inventory().live_streams(), 0);
    }

    #[tokio::test]
    async fn test_invalid_transitions_keep_state() {
        let camera = Arc::new(SyntheticCamera::new());
        let mut s = session(&camera);

        let err = s.capture_still().await.unwrap_err();
        assert_eq!(
            err,
            CaptureError::InvalidTransition {
                action: "capture a still",
                state: CaptureState::Idle,
            }
        );
        assert!(s.end_recording().await.is_err());
        assert!(s.commit(&RecordingUploader::ok(), &owner()).await.is_err());
        assert_eq!(s.state(), CaptureState::Idle);

        s.start().await.unwrap();
        assert!(matches!(
            s.start().await,
            Err(CaptureError::InvalidTransition { .. })
        ));
        assert_eq!(camera.inventory().live_streams(), 1);
    }

    #[tokio::test]
    async fn test_stop_while_recording_releases_everything() {
        let camera = Arc::new(SyntheticCamera::new());
        let mut s = session(&camera);
        s.start().await.unwrap();
        s.begin_recording().unwrap();

        s.stop().unwrap();

        assert_eq!(s.state(), CaptureState::Idle);
        assert!(!s.has_live_stream());
        assert_eq!(camera.inventory().live_streams(), 0);
        assert_eq!(camera.inventory().live_tracks(), 0);
    }
}

use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

use crate::capture::application::{
    domain::entities::{Facing, VideoFrame},
    ports::outgoing::{DeviceError, DeviceStream, MediaDevices, StreamConstraints},
};

/// EBML magic that opens every WebM file.
const WEBM_MAGIC: [u8; 4] = [0x1A, 0x45, 0xDF, 0xA3];
const DEFAULT_CHUNK_INTERVAL: Duration = Duration::from_millis(10);

/// Counters of what a [`SyntheticCamera`] has handed out and not yet had back.
#[derive(Debug, Default)]
pub struct DeviceInventory {
    live_streams: AtomicUsize,
    live_tracks: AtomicUsize,
    peak_streams: AtomicUsize,
    acquisitions: AtomicUsize,
}

impl DeviceInventory {
    pub fn live_streams(&self) -> usize {
        self.live_streams.load(Ordering::SeqCst)
    }

    pub fn live_tracks(&self) -> usize {
        self.live_tracks.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously live streams observed.
    pub fn peak_streams(&self) -> usize {
        self.peak_streams.load(Ordering::SeqCst)
    }

    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    fn open(&self, tracks: usize) {
        let live = self.live_streams.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_streams.fetch_max(live, Ordering::SeqCst);
        self.live_tracks.fetch_add(tracks, Ordering::SeqCst);
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
    }

    fn close(&self, tracks: usize) {
        self.live_streams.fetch_sub(1, Ordering::SeqCst);
        self.live_tracks.fetch_sub(tracks, Ordering::SeqCst);
    }
}

/// In-process camera producing a test pattern and a WebM-framed byte
/// stream. Failures can be scripted per acquisition.
pub struct SyntheticCamera {
    inventory: Arc<DeviceInventory>,
    scripted_failures: Mutex<VecDeque<DeviceError>>,
    frames_fail: Arc<AtomicBool>,
    frame_size: (u32, u32),
    chunk_interval: Duration,
    silent_recorder: bool,
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticCamera {
    pub fn new() -> Self {
        Self {
            inventory: Arc::new(DeviceInventory::default()),
            scripted_failures: Mutex::new(VecDeque::new()),
            frames_fail: Arc::new(AtomicBool::new(false)),
            frame_size: (64, 48),
            chunk_interval: DEFAULT_CHUNK_INTERVAL,
            silent_recorder: false,
        }
    }

    pub fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.frame_size = (width, height);
        self
    }

    /// Recorder that never emits a chunk.
    pub fn with_silent_recorder(mut self) -> Self {
        self.silent_recorder = true;
        self
    }

    pub fn inventory(&self) -> Arc<DeviceInventory> {
        self.inventory.clone()
    }

    /// The next `acquire` fails with `err`. Calls queue up.
    pub fn fail_next_acquire(&self, err: DeviceError) {
        self.scripted_failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(err);
    }

    /// Makes `grab_frame` fail on every stream until turned off.
    pub fn fail_frames(&self, fail: bool) {
        self.frames_fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl MediaDevices for SyntheticCamera {
    async fn acquire(
        &self,
        constraints: StreamConstraints,
    ) -> Result<Box<dyn DeviceStream>, DeviceError> {
        let scripted = self
            .scripted_failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        if let Some(err) = scripted {
            return Err(err);
        }

        let tracks = if constraints.audio { 2 } else { 1 };
        self.inventory.open(tracks);

        Ok(Box::new(SyntheticStream {
            facing: constraints.facing,
            tracks,
            inventory: self.inventory.clone(),
            frames_fail: self.frames_fail.clone(),
            frame_size: self.frame_size,
            chunk_interval: self.chunk_interval,
            silent_recorder: self.silent_recorder,
            recorder: None,
            stopped: false,
        }))
    }
}

struct SyntheticStream {
    facing: Facing,
    tracks: usize,
    inventory: Arc<DeviceInventory>,
    frames_fail: Arc<AtomicBool>,
    frame_size: (u32, u32),
    chunk_interval: Duration,
    silent_recorder: bool,
    recorder: Option<oneshot::Sender<()>>,
    stopped: bool,
}

impl SyntheticStream {
    fn test_pattern(&self) -> Option<VideoFrame> {
        let (width, height) = self.frame_size;
        let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
        for y in 0..height {
            for x in 0..width {
                rgb.push((x * 255 / width.max(1)) as u8);
                rgb.push((y * 255 / height.max(1)) as u8);
                rgb.push(match self.facing {
                    Facing::Front => 200,
                    Facing::Rear => 40,
                });
            }
        }
        VideoFrame::new(width, height, rgb)
    }
}

fn chunk(seq: u32) -> Bytes {
    let mut buf = BytesMut::with_capacity(64);
    if seq == 0 {
        buf.put_slice(&WEBM_MAGIC);
    }
    buf.put_u32(seq);
    buf.put_bytes(0xAB, 56);
    buf.freeze()
}

async fn produce_chunks(
    chunks: mpsc::UnboundedSender<Bytes>,
    mut stop: oneshot::Receiver<()>,
    interval: Duration,
    silent: bool,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await;
    let mut seq = 0u32;

    loop {
        tokio::select! {
            _ = &mut stop => {
                // final flush, as a recorder emits its last buffered data on stop
                if !silent {
                    let _ = chunks.send(chunk(seq));
                }
                break;
            }
            _ = ticker.tick() => {
                if silent {
                    continue;
                }
                if chunks.send(chunk(seq)).is_err() {
                    break;
                }
                seq += 1;
            }
        }
    }
}

#[async_trait]
impl DeviceStream for SyntheticStream {
    fn facing(&self) -> Facing {
        self.facing
    }

    fn live_track_count(&self) -> usize {
        if self.stopped {
            0
        } else {
            self.tracks
        }
    }

    async fn grab_frame(&self) -> Result<VideoFrame, DeviceError> {
        if self.stopped {
            return Err(DeviceError::Disconnected);
        }
        if self.frames_fail.load(Ordering::SeqCst) {
            return Err(DeviceError::FrameUnavailable(
                "video track produced no frame".to_string(),
            ));
        }
        self.test_pattern()
            .ok_or_else(|| DeviceError::FrameUnavailable("invalid frame size".to_string()))
    }

    fn start_recording(&mut self) -> Result<mpsc::UnboundedReceiver<Bytes>, DeviceError> {
        if self.stopped {
            return Err(DeviceError::Disconnected);
        }
        if self.recorder.is_some() {
            return Err(DeviceError::Busy);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = oneshot::channel();
        tokio::spawn(produce_chunks(
            tx,
            stop_rx,
            self.chunk_interval,
            self.silent_recorder,
        ));
        self.recorder = Some(stop_tx);
        Ok(rx)
    }

    fn stop_recording(&mut self) {
        if let Some(stop) = self.recorder.take() {
            let _ = stop.send(());
        }
    }

    fn stop(&mut self) {
        self.stop_recording();
        if !self.stopped {
            self.stopped = true;
            self.inventory.close(self.tracks);
        }
    }
}

impl Drop for SyntheticStream {
    fn drop(&mut self) {
        self.stop();
    }
}

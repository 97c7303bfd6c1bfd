//! Media capture — screen frames and microphone recordings.
//!
//! DESIGN
//! ======
//! Devices hand out streams; a [`CaptureSession`] owns each stream and stops
//! its tracks exactly once, whether the capture finished, failed, timed out,
//! or the future was dropped mid-await. Grabbing a frame is bounded by
//! [`FRAME_TIMEOUT`]. Recording runs until the caller's stop token fires.
//!
//! [`FileDevices`] backs both device kinds with files so the terminal front
//! end exercises the same protocol as a real capture backend.

use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::until_cancelled;
use crate::error::{ErrorCode, ErrorKind};
use crate::model::MediaPayload;

/// Longest wait for the first display frame.
pub const FRAME_TIMEOUT: Duration = Duration::from_secs(4);

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("permission denied: {0}")]
    PermissionDenied(&'static str),
    #[error("capture not supported: {0}")]
    Unsupported(String),
    #[error("timed out waiting for a frame")]
    FrameTimeout,
    #[error("capture cancelled")]
    Cancelled,
    #[error("capture io failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ErrorCode for CaptureError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::PermissionDenied(_) => "E_CAPTURE_DENIED",
            Self::Unsupported(_) => "E_CAPTURE_UNSUPPORTED",
            Self::FrameTimeout => "E_CAPTURE_TIMEOUT",
            Self::Cancelled => "E_CAPTURE_CANCELLED",
            Self::Io(_) => "E_CAPTURE_IO",
        }
    }

    fn kind(&self) -> ErrorKind {
        match self {
            Self::PermissionDenied(_) | Self::Unsupported(_) => ErrorKind::CapabilityDenied,
            Self::FrameTimeout | Self::Io(_) => ErrorKind::ServiceUnavailable,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::FrameTimeout)
    }
}

// =============================================================================
// STREAM TRAITS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Display,
    Microphone,
}

/// A live capture holding device tracks open.
pub trait MediaStream: Send {
    fn kind(&self) -> TrackKind;

    /// Release every track. Called once per stream by [`CaptureSession`].
    fn stop_all_tracks(&mut self);
}

#[async_trait::async_trait]
pub trait FrameSource: MediaStream {
    /// Wait for the next rendered frame, as an encoded still image.
    async fn next_frame(&mut self) -> Result<MediaPayload, CaptureError>;
}

#[async_trait::async_trait]
pub trait AudioRecorder: MediaStream {
    /// Record until `stop` fires, then return the encoded clip.
    async fn record(&mut self, stop: &CancellationToken) -> Result<MediaPayload, CaptureError>;
}

#[async_trait::async_trait]
pub trait MediaDevices: Send + Sync {
    type Display: FrameSource;
    type Microphone: AudioRecorder;

    /// Ask for a display stream. Refusal is [`CaptureError::PermissionDenied`].
    async fn display(&self) -> Result<Self::Display, CaptureError>;

    /// Ask for a microphone stream. Refusal is [`CaptureError::PermissionDenied`].
    async fn microphone(&self) -> Result<Self::Microphone, CaptureError>;
}

// =============================================================================
// SESSION GUARD
// =============================================================================

/// Owns a stream and releases it exactly once.
pub struct CaptureSession<S: MediaStream> {
    stream: S,
    released: bool,
}

impl<S: MediaStream> CaptureSession<S> {
    #[must_use]
    pub fn new(stream: S) -> Self {
        debug!(kind = ?stream.kind(), "capture: stream acquired");
        Self { stream, released: false }
    }

    pub fn stream_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.stream.stop_all_tracks();
            debug!(kind = ?self.stream.kind(), "capture: tracks stopped");
        }
    }

    /// Release now rather than at drop.
    pub fn finish(mut self) {
        self.release();
    }
}

impl<S: MediaStream> Drop for CaptureSession<S> {
    fn drop(&mut self) {
        self.release();
    }
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Capture a single screen frame.
///
/// # Errors
///
/// Permission refusal, a missing frame within [`FRAME_TIMEOUT`], or
/// cancellation. The display stream is released on every path.
pub async fn grab_frame<D: MediaDevices>(devices: &D, cancel: &CancellationToken) -> Result<MediaPayload, CaptureError> {
    grab_frame_within(devices, FRAME_TIMEOUT, cancel).await
}

/// [`grab_frame`] with an explicit timeout.
///
/// # Errors
///
/// See [`grab_frame`].
pub async fn grab_frame_within<D: MediaDevices>(
    devices: &D,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<MediaPayload, CaptureError> {
    let stream = until_cancelled(cancel, devices.display())
        .await
        .ok_or(CaptureError::Cancelled)??;
    let mut session = CaptureSession::new(stream);

    let frame = until_cancelled(cancel, tokio::time::timeout(timeout, session.stream_mut().next_frame()))
        .await
        .ok_or(CaptureError::Cancelled)
        .and_then(|waited| waited.unwrap_or(Err(CaptureError::FrameTimeout)));
    session.finish();

    match &frame {
        Ok(payload) => info!(mime = %payload.mime_type, bytes = payload.data.len(), "capture: frame grabbed"),
        Err(e) => warn!(error = %e, "capture: frame grab failed"),
    }
    frame
}

/// Record a voice note until `stop` fires.
///
/// # Errors
///
/// Permission refusal, recorder failure, or cancellation. The microphone
/// stream is released on every path.
pub async fn record_voice<D: MediaDevices>(
    devices: &D,
    stop: &CancellationToken,
    cancel: &CancellationToken,
) -> Result<MediaPayload, CaptureError> {
    let stream = until_cancelled(cancel, devices.microphone())
        .await
        .ok_or(CaptureError::Cancelled)??;
    let mut session = CaptureSession::new(stream);

    let clip = until_cancelled(cancel, session.stream_mut().record(stop))
        .await
        .ok_or(CaptureError::Cancelled)
        .and_then(|recorded| recorded);
    session.finish();

    if let Err(e) = &clip {
        warn!(error = %e, "capture: recording failed");
    }
    clip
}

// =============================================================================
// FILE-BACKED DEVICES
// =============================================================================

/// Guess a MIME type from a file extension.
#[must_use]
pub fn mime_from_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        _ => return None,
    };
    Some(mime)
}

/// Read a file into an inline payload.
///
/// # Errors
///
/// Unknown extension or a read failure.
pub async fn load_media(path: &Path) -> Result<MediaPayload, CaptureError> {
    let mime = mime_from_path(path)
        .ok_or_else(|| CaptureError::Unsupported(format!("unknown media type: {}", path.display())))?;
    let bytes = tokio::fs::read(path).await?;
    Ok(MediaPayload::new(STANDARD.encode(bytes), mime))
}

/// Devices that serve pre-recorded files. A missing file path means the
/// device is not available.
#[derive(Debug, Clone, Default)]
pub struct FileDevices {
    pub screenshot: Option<PathBuf>,
    pub voice: Option<PathBuf>,
}

pub struct FileStream {
    kind: TrackKind,
    path: PathBuf,
}

impl MediaStream for FileStream {
    fn kind(&self) -> TrackKind {
        self.kind
    }

    // A file holds no device open.
    fn stop_all_tracks(&mut self) {}
}

#[async_trait::async_trait]
impl FrameSource for FileStream {
    async fn next_frame(&mut self) -> Result<MediaPayload, CaptureError> {
        load_media(&self.path).await
    }
}

#[async_trait::async_trait]
impl AudioRecorder for FileStream {
    async fn record(&mut self, _stop: &CancellationToken) -> Result<MediaPayload, CaptureError> {
        load_media(&self.path).await
    }
}

#[async_trait::async_trait]
impl MediaDevices for FileDevices {
    type Display = FileStream;
    type Microphone = FileStream;

    async fn display(&self) -> Result<FileStream, CaptureError> {
        let path = self
            .screenshot
            .clone()
            .ok_or_else(|| CaptureError::Unsupported("no screenshot source".into()))?;
        Ok(FileStream { kind: TrackKind::Display, path })
    }

    async fn microphone(&self) -> Result<FileStream, CaptureError> {
        let path = self
            .voice
            .clone()
            .ok_or_else(|| CaptureError::Unsupported("no voice source".into()))?;
        Ok(FileStream { kind: TrackKind::Microphone, path })
    }
}

#[cfg(test)]
#[path = "capture_test.rs"]
mod tests;

use super::*;
use crate::llm::test_helpers::sample_frame;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

// =============================================================================
// FakeDevices
// =============================================================================

#[derive(Clone, Copy)]
enum Behavior {
    Ready,
    Fail,
    Hang,
}

struct FakeStream {
    kind: TrackKind,
    stops: Arc<AtomicUsize>,
    behavior: Behavior,
}

impl MediaStream for FakeStream {
    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn stop_all_tracks(&mut self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl FrameSource for FakeStream {
    async fn next_frame(&mut self) -> Result<MediaPayload, CaptureError> {
        match self.behavior {
            Behavior::Ready => Ok(sample_frame()),
            Behavior::Fail => Err(CaptureError::Io(std::io::Error::other("track ended"))),
            Behavior::Hang => std::future::pending().await,
        }
    }
}

#[async_trait::async_trait]
impl AudioRecorder for FakeStream {
    async fn record(&mut self, stop: &CancellationToken) -> Result<MediaPayload, CaptureError> {
        match self.behavior {
            Behavior::Ready => {
                stop.cancelled().await;
                Ok(MediaPayload::new("AAAA", "audio/webm"))
            }
            Behavior::Fail => Err(CaptureError::Io(std::io::Error::other("mic unplugged"))),
            Behavior::Hang => std::future::pending().await,
        }
    }
}

struct FakeDevices {
    deny: bool,
    behavior: Behavior,
    stops: Arc<AtomicUsize>,
}

impl FakeDevices {
    fn new(behavior: Behavior) -> Self {
        Self { deny: false, behavior, stops: Arc::new(AtomicUsize::new(0)) }
    }

    fn denied() -> Self {
        Self { deny: true, ..Self::new(Behavior::Ready) }
    }

    fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    fn stream(&self, kind: TrackKind) -> FakeStream {
        FakeStream { kind, stops: Arc::clone(&self.stops), behavior: self.behavior }
    }
}

#[async_trait::async_trait]
impl MediaDevices for FakeDevices {
    type Display = FakeStream;
    type Microphone = FakeStream;

    async fn display(&self) -> Result<FakeStream, CaptureError> {
        if self.deny {
            return Err(CaptureError::PermissionDenied("display"));
        }
        Ok(self.stream(TrackKind::Display))
    }

    async fn microphone(&self) -> Result<FakeStream, CaptureError> {
        if self.deny {
            return Err(CaptureError::PermissionDenied("microphone"));
        }
        Ok(self.stream(TrackKind::Microphone))
    }
}

// =============================================================================
// CaptureSession
// =============================================================================

#[test]
fn session_releases_once_on_finish() {
    let devices = FakeDevices::new(Behavior::Ready);
    let session = CaptureSession::new(devices.stream(TrackKind::Display));
    session.finish();
    assert_eq!(devices.stops(), 1);
}

#[test]
fn session_releases_on_drop() {
    let devices = FakeDevices::new(Behavior::Ready);
    {
        let mut session = CaptureSession::new(devices.stream(TrackKind::Microphone));
        assert_eq!(session.stream_mut().kind(), TrackKind::Microphone);
    }
    assert_eq!(devices.stops(), 1);
}

// =============================================================================
// grab_frame
// =============================================================================

#[tokio::test]
async fn grab_frame_returns_frame_and_releases() {
    let devices = FakeDevices::new(Behavior::Ready);
    let frame = grab_frame(&devices, &CancellationToken::new()).await.unwrap();
    assert_eq!(frame, sample_frame());
    assert_eq!(devices.stops(), 1);
}

#[tokio::test]
async fn grab_frame_error_still_releases() {
    let devices = FakeDevices::new(Behavior::Fail);
    let err = grab_frame(&devices, &CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, CaptureError::Io(_)));
    assert_eq!(devices.stops(), 1);
}

#[tokio::test]
async fn grab_frame_times_out_and_releases() {
    let devices = FakeDevices::new(Behavior::Hang);
    let err = grab_frame_within(&devices, Duration::from_millis(20), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CaptureError::FrameTimeout));
    assert!(err.retryable());
    assert_eq!(devices.stops(), 1);
}

#[tokio::test]
async fn grab_frame_cancelled_mid_wait_releases() {
    let devices = FakeDevices::new(Behavior::Hang);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        trigger.cancel();
    });

    let err = grab_frame_within(&devices, Duration::from_secs(30), &cancel).await.unwrap_err();
    assert!(matches!(err, CaptureError::Cancelled));
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(devices.stops(), 1);
}

#[tokio::test]
async fn denied_display_is_capability_denied() {
    let devices = FakeDevices::denied();
    let err = grab_frame(&devices, &CancellationToken::new()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CapabilityDenied);
    assert_eq!(err.error_code(), "E_CAPTURE_DENIED");
    assert_eq!(devices.stops(), 0);
}

// =============================================================================
// record_voice
// =============================================================================

#[tokio::test]
async fn record_voice_stops_on_signal_and_releases() {
    let devices = FakeDevices::new(Behavior::Ready);
    let stop = CancellationToken::new();
    stop.cancel();

    let clip = record_voice(&devices, &stop, &CancellationToken::new()).await.unwrap();
    assert_eq!(clip.mime_type, "audio/webm");
    assert_eq!(devices.stops(), 1);
}

#[tokio::test]
async fn record_voice_failure_releases() {
    let devices = FakeDevices::new(Behavior::Fail);
    let err = record_voice(&devices, &CancellationToken::new(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CaptureError::Io(_)));
    assert_eq!(devices.stops(), 1);
}

#[tokio::test]
async fn record_voice_denied() {
    let devices = FakeDevices::denied();
    let err = record_voice(&devices, &CancellationToken::new(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CaptureError::PermissionDenied("microphone")));
}

// =============================================================================
// files
// =============================================================================

#[test]
fn mime_from_extension() {
    assert_eq!(mime_from_path(Path::new("shot.JPG")), Some("image/jpeg"));
    assert_eq!(mime_from_path(Path::new("clip.mp4")), Some("video/mp4"));
    assert_eq!(mime_from_path(Path::new("note.ogg")), Some("audio/ogg"));
    assert_eq!(mime_from_path(Path::new("notes.txt")), None);
    assert_eq!(mime_from_path(Path::new("noext")), None);
}

#[tokio::test]
async fn load_media_encodes_base64() {
    let path = std::env::temp_dir().join(format!("satyam-capture-{}.png", uuid::Uuid::new_v4()));
    std::fs::write(&path, b"abc").unwrap();

    let payload = load_media(&path).await.unwrap();
    assert_eq!(payload, MediaPayload::new("YWJj", "image/png"));
    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn load_media_rejects_unknown_type() {
    let err = load_media(Path::new("/tmp/whatever.xyz")).await.unwrap_err();
    assert!(matches!(err, CaptureError::Unsupported(_)));
}

#[tokio::test]
async fn file_devices_without_source_are_unsupported() {
    let devices = FileDevices::default();
    let err = grab_frame(&devices, &CancellationToken::new()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CapabilityDenied);
}

#[tokio::test]
async fn file_devices_serve_voice_file() {
    let path = std::env::temp_dir().join(format!("satyam-voice-{}.wav", uuid::Uuid::new_v4()));
    std::fs::write(&path, b"RIFF").unwrap();
    let devices = FileDevices { screenshot: None, voice: Some(path.clone()) };

    let clip = record_voice(&devices, &CancellationToken::new(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(clip.mime_type, "audio/wav");
    std::fs::remove_file(&path).unwrap();
}

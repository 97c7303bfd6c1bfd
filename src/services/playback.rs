//! Playback — the "listen to proof" toggle.
//!
//! DESIGN
//! ======
//! The controller owns at most one active [`PlaybackHandle`]. Toggling while
//! playing stops it; toggling while idle synthesizes fresh speech and starts
//! it. Nothing is cached, so every start costs one synthesis call. Output
//! devices sit behind [`AudioOutput`] so tests count starts and stops.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::audio::{AudioBuffer, AudioError};
use crate::error::{ErrorCode, ErrorKind};
use crate::i18n::Language;
use crate::llm::types::AiBoundary;

#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("audio encode failed: {0}")]
    Audio(#[from] AudioError),
    #[error("audio output failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ErrorCode for PlaybackError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Audio(_) => "E_PLAYBACK_ENCODE",
            Self::Io(_) => "E_PLAYBACK_IO",
        }
    }

    fn kind(&self) -> ErrorKind {
        ErrorKind::ServiceUnavailable
    }
}

/// A started sound. Stopping is idempotent.
pub trait PlaybackHandle: Send {
    fn stop(&mut self);

    /// False once playback ended on its own or was stopped.
    fn is_active(&self) -> bool;
}

#[async_trait::async_trait]
pub trait AudioOutput: Send {
    type Handle: PlaybackHandle;

    /// Begin playing `buffer`.
    ///
    /// # Errors
    ///
    /// The device refused or failed to play.
    async fn start(&mut self, buffer: AudioBuffer) -> Result<Self::Handle, PlaybackError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Started,
    Stopped,
    /// Synthesis or the output device failed. Nothing is playing.
    Unavailable,
}

pub struct PlaybackController<O: AudioOutput> {
    output: O,
    active: Option<O::Handle>,
}

impl<O: AudioOutput> PlaybackController<O> {
    #[must_use]
    pub fn new(output: O) -> Self {
        Self { output, active: None }
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.active.as_ref().is_some_and(|h| h.is_active())
    }

    pub fn stop(&mut self) {
        if let Some(mut handle) = self.active.take() {
            handle.stop();
        }
    }

    /// Stop if playing, otherwise synthesize `text` and start it.
    pub async fn toggle(&mut self, boundary: &dyn AiBoundary, text: &str, language: Language) -> ToggleOutcome {
        if self.is_playing() {
            self.stop();
            info!("playback: stopped");
            return ToggleOutcome::Stopped;
        }

        let buffer = match boundary.synthesize_speech(text, language).await {
            Ok(buffer) => buffer,
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "playback: synthesis failed");
                return ToggleOutcome::Unavailable;
            }
        };

        // A source that finished on its own is still held; release it first.
        self.stop();
        match self.output.start(buffer).await {
            Ok(handle) => {
                self.active = Some(handle);
                info!("playback: started");
                ToggleOutcome::Started
            }
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "playback: output failed");
                ToggleOutcome::Unavailable
            }
        }
    }
}

// =============================================================================
// WAV FILE OUTPUT
// =============================================================================

/// Writes each started buffer to a WAV file. Used by the terminal front end.
pub struct WavFileOutput {
    path: PathBuf,
}

impl WavFileOutput {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

pub struct WavFileHandle {
    path: PathBuf,
    active: bool,
}

impl WavFileHandle {
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl PlaybackHandle for WavFileHandle {
    fn stop(&mut self) {
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[async_trait::async_trait]
impl AudioOutput for WavFileOutput {
    type Handle = WavFileHandle;

    async fn start(&mut self, buffer: AudioBuffer) -> Result<Self::Handle, PlaybackError> {
        let bytes = buffer.to_wav_bytes()?;
        tokio::fs::write(&self.path, bytes).await?;
        info!(path = %self.path.display(), secs = buffer.duration_secs(), "playback: wrote wav");
        Ok(WavFileHandle { path: self.path.clone(), active: true })
    }
}

#[cfg(test)]
#[path = "playback_test.rs"]
mod tests;

//! Application shell — tabs, direct checks, and capture orchestration.
//!
//! DESIGN
//! ======
//! `AppShell` wires user actions to the services. Direct checks (typed text
//! or an uploaded file) go straight to the boundary and land in the report
//! view. A screen scan grabs one frame, switches to the chat tab, and hands
//! the frame to the conversation manager, which owns everything after that.
//!
//! ERRORS
//! ======
//! Every failure is scoped to the action that caused it. The shell records a
//! localized [`Alert`] for the user and returns the typed error to the caller
//! for logging; raw error text never reaches an alert.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{ErrorCode, ErrorKind};
use crate::i18n::{Language, UiStrings, strings};
use crate::llm::types::{AiBoundary, LlmError};
use crate::model::{AnalysisInput, AnalysisMode, AnalysisResult, MediaPayload, Verdict};
use crate::services::capture::{self, CaptureError, MediaDevices, TrackKind};
use crate::services::conversation::{ConversationManager, ScanContext, ScanOutcome, SendOutcome};
use crate::services::playback::{AudioOutput, PlaybackController, ToggleOutcome};
use crate::services::report::{RenderedReport, ReportView};
use crate::services::until_cancelled;

/// Holding the bubble longer than this starts a screen scan.
pub const LONG_PRESS: Duration = Duration::from_millis(450);
pub const STARTING_SAFETY_POINTS: u32 = 1250;
/// Points awarded when a direct check confirms content is real.
pub const REAL_VERDICT_POINTS: u32 = 50;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Home,
    Chat,
    Guard,
    Community,
    Profile,
}

impl Tab {
    #[must_use]
    pub fn label(self, s: &UiStrings) -> &'static str {
        match self {
            Self::Home => s.tabs.home,
            Self::Chat => s.tabs.sahayak,
            Self::Guard => s.tabs.guard,
            Self::Community => s.tabs.community,
            Self::Profile => s.tabs.profile,
        }
    }
}

/// One-line, localized notice for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alert {
    pub message: &'static str,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("analysis failed: {0}")]
    Llm(#[from] LlmError),
    #[error("capture failed: {0}")]
    Capture(#[from] CaptureError),
}

impl ErrorCode for ShellError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Llm(e) => e.error_code(),
            Self::Capture(e) => e.error_code(),
        }
    }

    fn kind(&self) -> ErrorKind {
        match self {
            Self::Llm(e) => e.kind(),
            Self::Capture(e) => e.kind(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Llm(e) => e.retryable(),
            Self::Capture(e) => e.retryable(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BubbleAction {
    /// Short press: back to the home tab with the result cleared.
    WentHome,
    Scanned(ScanOutcome),
}

// =============================================================================
// SHELL
// =============================================================================

pub struct AppShell {
    boundary: Arc<dyn AiBoundary>,
    language: Language,
    tab: Tab,
    input: String,
    result: Option<AnalysisResult>,
    safety_points: u32,
    alert: Option<Alert>,
    conversation: ConversationManager,
}

impl AppShell {
    #[must_use]
    pub fn new(boundary: Arc<dyn AiBoundary>, language: Language) -> Self {
        let conversation = ConversationManager::new(Arc::clone(&boundary), language);
        Self {
            boundary,
            language,
            tab: Tab::Home,
            input: String::new(),
            result: None,
            safety_points: STARTING_SAFETY_POINTS,
            alert: None,
            conversation,
        }
    }

    // -- accessors --------------------------------------------------------

    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    #[must_use]
    pub fn strings(&self) -> &'static UiStrings {
        strings(self.language)
    }

    #[must_use]
    pub fn tab(&self) -> Tab {
        self.tab
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    #[must_use]
    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    /// The current result as the report view renders it.
    #[must_use]
    pub fn report(&self) -> Option<RenderedReport> {
        self.result.as_ref().map(|r| ReportView::new(r, self.language).render())
    }

    #[must_use]
    pub fn safety_points(&self) -> u32 {
        self.safety_points
    }

    #[must_use]
    pub fn conversation(&self) -> &ConversationManager {
        &self.conversation
    }

    /// Pending alert, cleared on read.
    pub fn take_alert(&mut self) -> Option<Alert> {
        self.alert.take()
    }

    // -- navigation -------------------------------------------------------

    /// Switch language. The chat session is rebuilt for the new language.
    pub fn set_language(&mut self, language: Language) {
        if language == self.language {
            return;
        }
        info!(from = %self.language, to = %language, "shell: language changed");
        self.language = language;
        self.conversation.reset_session(language);
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    fn raise(&mut self, message: &'static str) {
        self.alert = Some(Alert { message });
    }

    // -- direct checks ----------------------------------------------------

    /// Check the typed input. Blank input does nothing and returns `Ok(None)`.
    ///
    /// # Errors
    ///
    /// The analysis failed or was cancelled. A failure raises the
    /// verification-failed alert.
    pub async fn check_text(
        &mut self,
        mode: AnalysisMode,
        cancel: &CancellationToken,
    ) -> Result<Option<AnalysisResult>, ShellError> {
        let text = self.input.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let input = AnalysisInput::Text(text.to_string());
        self.analyze(input, mode, cancel).await.map(Some)
    }

    /// Check an uploaded image, video, or audio file.
    ///
    /// # Errors
    ///
    /// See [`AppShell::check_text`].
    pub async fn check_media(
        &mut self,
        media: MediaPayload,
        mode: AnalysisMode,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, ShellError> {
        self.analyze(AnalysisInput::Media(media), mode, cancel).await
    }

    async fn analyze(
        &mut self,
        input: AnalysisInput,
        mode: AnalysisMode,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, ShellError> {
        let analysis = until_cancelled(cancel, self.boundary.analyze(&input, self.language, mode))
            .await
            .unwrap_or(Err(LlmError::Cancelled));

        match analysis {
            Ok(result) => {
                if result.verdict == Verdict::Real {
                    self.safety_points += REAL_VERDICT_POINTS;
                }
                info!(verdict = %result.verdict, %mode, points = self.safety_points, "shell: check done");
                self.result = Some(result.clone());
                Ok(result)
            }
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "shell: check failed");
                if !matches!(e, LlmError::Cancelled) {
                    self.raise(self.strings().verification_failed);
                }
                Err(e.into())
            }
        }
    }

    // -- listen -----------------------------------------------------------

    /// The report's listen toggle. Reads the current explanation aloud in
    /// the active language, or stops it if it is already playing. Returns
    /// `None` when there is no result to read.
    pub async fn listen<O: AudioOutput>(&mut self, player: &mut PlaybackController<O>) -> Option<ToggleOutcome> {
        let explanation = self.result.as_ref()?.explanation.clone();
        let outcome = player.toggle(self.boundary.as_ref(), &explanation, self.language).await;
        if outcome == ToggleOutcome::Unavailable {
            self.raise(self.strings().playback_unavailable);
        }
        Some(outcome)
    }

    /// Label for the listen toggle in its current state.
    #[must_use]
    pub fn listen_label<O: AudioOutput>(&self, player: &PlaybackController<O>) -> &'static str {
        if player.is_playing() { self.strings().stop_listening } else { self.strings().listen }
    }

    // -- capture ----------------------------------------------------------

    fn raise_capture(&mut self, err: &CaptureError, track: TrackKind) {
        let s = self.strings();
        let message = match (err, track) {
            (CaptureError::Cancelled, _) => return,
            (CaptureError::PermissionDenied(_), TrackKind::Display) => s.scan_denied,
            (CaptureError::Unsupported(_), TrackKind::Display) => s.scan_unsupported,
            (CaptureError::PermissionDenied(_) | CaptureError::Unsupported(_), TrackKind::Microphone) => s.mic_denied,
            (CaptureError::FrameTimeout | CaptureError::Io(_), TrackKind::Display) => s.scan_failed,
            (CaptureError::FrameTimeout | CaptureError::Io(_), TrackKind::Microphone) => s.service_busy,
        };
        self.raise(message);
    }

    /// Grab the screen and hand it to the conversation manager.
    ///
    /// # Errors
    ///
    /// Capture failed. Analysis failures are reported in the chat
    /// transcript instead and come back as `Ok(ScanOutcome::Failed)`.
    pub async fn screen_scan<D: MediaDevices>(
        &mut self,
        devices: &D,
        cancel: &CancellationToken,
    ) -> Result<ScanOutcome, ShellError> {
        let frame = match capture::grab_frame(devices, cancel).await {
            Ok(frame) => frame,
            Err(e) => {
                self.raise_capture(&e, TrackKind::Display);
                return Err(e.into());
            }
        };

        self.tab = Tab::Chat;
        Ok(self.conversation.handle_scan(ScanContext { image: frame }, cancel).await)
    }

    /// Record a spoken question and send it to the chat.
    ///
    /// # Errors
    ///
    /// Recording failed.
    pub async fn voice_question<D: MediaDevices>(
        &mut self,
        devices: &D,
        stop: &CancellationToken,
        cancel: &CancellationToken,
    ) -> Result<SendOutcome, ShellError> {
        let clip = match capture::record_voice(devices, stop, cancel).await {
            Ok(clip) => clip,
            Err(e) => {
                self.raise_capture(&e, TrackKind::Microphone);
                return Err(e.into());
            }
        };

        self.tab = Tab::Chat;
        Ok(self.conversation.send_voice(&clip, cancel).await)
    }

    /// Send a typed chat question.
    pub async fn ask(&mut self, text: &str, cancel: &CancellationToken) -> SendOutcome {
        self.tab = Tab::Chat;
        self.conversation.send_text(text, cancel).await
    }

    /// The floating bubble: a long press scans, a short press goes home.
    ///
    /// # Errors
    ///
    /// See [`AppShell::screen_scan`].
    pub async fn bubble_press<D: MediaDevices>(
        &mut self,
        held: Duration,
        devices: &D,
        cancel: &CancellationToken,
    ) -> Result<BubbleAction, ShellError> {
        if held > LONG_PRESS {
            return self.screen_scan(devices, cancel).await.map(BubbleAction::Scanned);
        }
        self.tab = Tab::Home;
        self.result = None;
        Ok(BubbleAction::WentHome)
    }
}

#[cfg(test)]
#[path = "shell_test.rs"]
mod tests;

//! Conversation manager — the Sahayak chat transcript and its session.
//!
//! DESIGN
//! ======
//! The manager is the only owner of the chat session, so nothing else can
//! interleave turns. Every operation takes `&mut self`, which serializes
//! sends without a lock. A screen scan runs a one-shot analysis, swaps the
//! scanning placeholder for a report message, then quietly tells the session
//! what was found so follow-up questions have context.
//!
//! TRADE-OFFS
//! ==========
//! A failed hidden context update is logged and otherwise ignored. The user
//! still has the report; follow-ups just lack that context.

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::until_cancelled;
use crate::error::{ErrorCode, ErrorKind};
use crate::i18n::{Language, UiStrings, strings};
use crate::llm::prompts;
use crate::llm::types::{AiBoundary, ChatSession};
use crate::model::{
    AnalysisInput, AnalysisMode, AnalysisResult, Citation, MediaPayload, format_citation_list, parse_markdown_links,
};

// =============================================================================
// MESSAGES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

/// What a transcript entry is. A message is at most one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageKind {
    #[default]
    Plain,
    /// Transient placeholder shown while a scan is analyzed.
    Scanning,
    /// The structured result of a screen scan.
    Report,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversationMessage {
    pub id: Uuid,
    pub role: Role,
    pub text: String,
    /// Data-URI snapshot of the scanned screen.
    pub image: Option<String>,
    pub citations: Vec<Citation>,
    pub kind: MessageKind,
    /// Localized heading for the citation list.
    pub sources_label: &'static str,
}

impl ConversationMessage {
    fn new(role: Role, text: impl Into<String>, strings: &UiStrings) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
            image: None,
            citations: Vec::new(),
            kind: MessageKind::Plain,
            sources_label: strings.report.sources,
        }
    }

    fn with_kind(mut self, kind: MessageKind) -> Self {
        self.kind = kind;
        self
    }

    fn with_image(mut self, image: String) -> Self {
        self.image = Some(image);
        self
    }

    fn with_citations(mut self, citations: Vec<Citation>) -> Self {
        self.citations = citations;
        self
    }

    /// Markdown links the model wrote into the message body.
    #[must_use]
    pub fn inline_links(&self) -> Vec<Citation> {
        parse_markdown_links(&self.text)
    }
}

impl fmt::Display for ConversationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)?;
        let list = format_citation_list(self.sources_label, &self.citations);
        if !list.is_empty() {
            write!(f, "\n\n{list}")?;
        }
        Ok(())
    }
}

// =============================================================================
// OUTCOMES
// =============================================================================

/// A captured screen waiting to be analyzed. Consumed by [`ConversationManager::handle_scan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanContext {
    pub image: MediaPayload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Reported(AnalysisResult),
    Failed(ErrorKind),
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Replied,
    /// Nothing to send: blank text or an empty transcription.
    Skipped,
    Failed(ErrorKind),
    Cancelled,
}

// =============================================================================
// MANAGER
// =============================================================================

pub struct ConversationManager {
    boundary: Arc<dyn AiBoundary>,
    session: Box<dyn ChatSession>,
    messages: Vec<ConversationMessage>,
}

impl ConversationManager {
    /// Open a session in `language` and greet the user.
    #[must_use]
    pub fn new(boundary: Arc<dyn AiBoundary>, language: Language) -> Self {
        let session = boundary.open_chat(language);
        let mut manager = Self { boundary, session, messages: Vec::new() };
        manager.greet();
        manager
    }

    /// Replace the session with a fresh one for `language`. The transcript
    /// restarts from the greeting.
    pub fn reset_session(&mut self, language: Language) {
        info!(from = %self.language(), to = %language, "conversation: reset session");
        self.session = self.boundary.open_chat(language);
        self.messages.clear();
        self.greet();
    }

    /// Language of the open session.
    #[must_use]
    pub fn language(&self) -> Language {
        self.session.language()
    }

    #[must_use]
    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    fn strings(&self) -> &'static UiStrings {
        strings(self.language())
    }

    fn greet(&mut self) {
        let s = self.strings();
        self.messages.push(ConversationMessage::new(Role::Model, s.greeting, s));
    }

    fn push_model(&mut self, text: impl Into<String>) {
        let s = self.strings();
        self.messages.push(ConversationMessage::new(Role::Model, text, s));
    }

    /// Analyze a captured screen and post the report into the transcript.
    pub async fn handle_scan(&mut self, context: ScanContext, cancel: &CancellationToken) -> ScanOutcome {
        let s = self.strings();
        let image_uri = context.image.to_data_uri();
        let placeholder = ConversationMessage::new(Role::Model, s.scanning, s)
            .with_kind(MessageKind::Scanning)
            .with_image(image_uri.clone());
        let placeholder_id = placeholder.id;
        self.messages.push(placeholder);

        let input = AnalysisInput::Media(context.image);
        let analysis = until_cancelled(cancel, self.boundary.analyze(&input, self.language(), AnalysisMode::News)).await;
        self.messages.retain(|m| m.id != placeholder_id);

        let result = match analysis {
            Some(Ok(result)) => result,
            Some(Err(e)) => {
                warn!(error = %e, code = e.error_code(), "conversation: scan analysis failed");
                self.push_model(s.scan_failed);
                return ScanOutcome::Failed(e.kind());
            }
            None => {
                info!("conversation: scan cancelled");
                self.push_model(s.scan_failed);
                return ScanOutcome::Cancelled;
            }
        };

        info!(verdict = %result.verdict, risk = ?result.risk_score, "conversation: scan reported");
        let report = ConversationMessage::new(Role::Model, scan_report_text(&result, s), s)
            .with_kind(MessageKind::Report)
            .with_image(image_uri)
            .with_citations(result.citations().cloned().collect());
        self.messages.push(report);

        let update = prompts::context_update_message(&result);
        match until_cancelled(cancel, self.session.send(&update)).await {
            Some(Ok(_)) => debug!("conversation: session context updated"),
            Some(Err(e)) => warn!(error = %e, "conversation: context update failed"),
            None => warn!("conversation: context update cancelled"),
        }

        ScanOutcome::Reported(result)
    }

    /// Send a typed question. The user's message stays in the transcript
    /// whatever happens to the reply.
    pub async fn send_text(&mut self, text: &str, cancel: &CancellationToken) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Skipped;
        }

        let s = self.strings();
        self.messages.push(ConversationMessage::new(Role::User, text, s));

        match until_cancelled(cancel, self.session.send(text)).await {
            Some(Ok(reply)) => {
                debug!(chars = reply.text.len(), citations = reply.citations.len(), "conversation: reply");
                self.messages
                    .push(ConversationMessage::new(Role::Model, reply.text, s).with_citations(reply.citations));
                SendOutcome::Replied
            }
            Some(Err(e)) => {
                warn!(error = %e, code = e.error_code(), "conversation: send failed");
                self.push_model(s.service_busy);
                SendOutcome::Failed(e.kind())
            }
            None => {
                info!("conversation: send cancelled");
                SendOutcome::Cancelled
            }
        }
    }

    /// Transcribe a voice note, then send it as text. Silence sends nothing.
    pub async fn send_voice(&mut self, audio: &MediaPayload, cancel: &CancellationToken) -> SendOutcome {
        let transcript = match until_cancelled(cancel, self.boundary.transcribe(audio, self.language())).await {
            Some(Ok(text)) => text,
            Some(Err(e)) => {
                warn!(error = %e, code = e.error_code(), "conversation: transcription failed");
                let s = self.strings();
                self.push_model(s.service_busy);
                return SendOutcome::Failed(e.kind());
            }
            None => return SendOutcome::Cancelled,
        };

        if transcript.trim().is_empty() {
            debug!("conversation: empty transcript");
            return SendOutcome::Skipped;
        }
        self.send_text(&transcript, cancel).await
    }
}

/// Body of a scan report message. Citations are carried separately.
#[must_use]
pub fn scan_report_text(result: &AnalysisResult, s: &UiStrings) -> String {
    let risk = result.risk_score.map_or_else(|| "N/A".to_string(), |r| format!("{r:.0}%"));
    let r = &s.report;
    format!(
        "📊 **{}**\n\n**{}:** {} {}\n**{}:** {risk}\n\n**{}:** {}\n\n*{}*",
        r.title,
        r.verdict,
        result.verdict.symbol(),
        s.verdict_label(result.verdict),
        r.risk_level,
        r.summary,
        result.explanation,
        r.follow_up,
    )
}

#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;

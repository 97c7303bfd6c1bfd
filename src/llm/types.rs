//! LLM types — boundary traits, replies, and errors.
//!
//! The rest of the crate only talks to the model through [`AiBoundary`] and
//! [`ChatSession`], so tests substitute scripted fakes for the HTTP client.

use crate::audio::AudioBuffer;
use crate::error::{ErrorCode, ErrorKind};
use crate::i18n::Language;
use crate::model::{AnalysisInput, AnalysisMode, AnalysisResult, Citation, MediaPayload};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by AI boundary operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The required API key environment variable is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The HTTP request to the model provider failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The provider returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The provider reported an error we could classify.
    #[error("provider error: {0}")]
    Provider(String),

    /// The response body or the model's JSON could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The response carried no candidate content.
    #[error("empty model response")]
    EmptyResponse,

    /// A speech response had no inline audio.
    #[error("speech response contained no audio")]
    MissingAudio,

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The caller cancelled the request before it completed.
    #[error("request cancelled")]
    Cancelled,
}

impl ErrorCode for LlmError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::MissingApiKey { .. } => "E_MISSING_API_KEY",
            Self::ApiRequest(_) => "E_API_REQUEST",
            Self::ApiResponse { .. } => "E_API_RESPONSE",
            Self::Provider(_) => "E_PROVIDER",
            Self::ApiParse(_) => "E_API_PARSE",
            Self::EmptyResponse => "E_EMPTY_RESPONSE",
            Self::MissingAudio => "E_MISSING_AUDIO",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::Cancelled => "E_CANCELLED",
        }
    }

    fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigParse(_) | Self::MissingApiKey { .. } | Self::HttpClientBuild(_) => ErrorKind::Configuration,
            Self::ApiRequest(_) | Self::ApiResponse { .. } | Self::Provider(_) => ErrorKind::ServiceUnavailable,
            Self::ApiParse(_) | Self::EmptyResponse | Self::MissingAudio => ErrorKind::MalformedResponse,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::ApiRequest(_) | Self::ApiResponse { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// REPLIES
// =============================================================================

/// A chat turn's answer plus any web sources the model grounded it on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatReply {
    pub text: String,
    pub citations: Vec<Citation>,
}

// =============================================================================
// BOUNDARY TRAITS
// =============================================================================

/// A stateful conversation with the model. The only piece of conversational
/// memory the client keeps.
#[async_trait::async_trait]
pub trait ChatSession: Send {
    /// Send one user turn and wait for the reply.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the request fails or the reply is malformed.
    /// A failed turn is not recorded in the session history.
    async fn send(&mut self, message: &str) -> Result<ChatReply, LlmError>;

    /// Language the session's system prompt was built for.
    fn language(&self) -> Language;
}

/// The external generative-AI service, behind four narrow operations so a
/// failure in one never blocks another.
#[async_trait::async_trait]
pub trait AiBoundary: Send + Sync {
    /// Classify text or media as real, fake, or suspicious.
    ///
    /// # Errors
    ///
    /// Network, provider, or parse failures. Never retried here.
    async fn analyze(
        &self,
        input: &AnalysisInput,
        language: Language,
        mode: AnalysisMode,
    ) -> Result<AnalysisResult, LlmError>;

    /// Open a grounded safety-advisor conversation in `language`.
    fn open_chat(&self, language: Language) -> Box<dyn ChatSession>;

    /// Read `text` aloud with a voice suited to `language`.
    ///
    /// # Errors
    ///
    /// Network failures or a response without audio.
    async fn synthesize_speech(&self, text: &str, language: Language) -> Result<AudioBuffer, LlmError>;

    /// Speech-to-text. An empty string means the model heard nothing.
    ///
    /// # Errors
    ///
    /// Network or provider failures.
    async fn transcribe(&self, audio: &MediaPayload, language: Language) -> Result<String, LlmError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;

//! LLM — the AI boundary: analysis, chat, speech synthesis, transcription.
//!
//! DESIGN
//! ======
//! Everything above this module depends on the [`AiBoundary`] trait only.
//! [`GeminiClient`] is the single production implementation, configured from
//! environment variables through [`LlmConfig`] and constructed explicitly by
//! the binary. There is no process-wide client.

pub mod config;
pub mod gemini;
pub mod prompts;
pub mod types;

pub use config::LlmConfig;
pub use gemini::GeminiClient;
pub use types::{AiBoundary, ChatReply, ChatSession, LlmError};

#[cfg(test)]
pub mod test_helpers;

//! Scripted [`AiBoundary`] for service and shell tests.

use std::sync::{Arc, Mutex};

use super::types::{AiBoundary, ChatReply, ChatSession, LlmError};
use crate::audio::AudioBuffer;
use crate::i18n::Language;
use crate::model::{AnalysisInput, AnalysisMode, AnalysisResult, InputType, MediaPayload, Source, Verdict};

/// Shared call log and scripted responses. Empty scripts fall back to a
/// benign default so tests only script what they assert on.
#[derive(Default)]
pub struct MockState {
    pub analyses: Mutex<Vec<Result<AnalysisResult, LlmError>>>,
    pub replies: Mutex<Vec<Result<ChatReply, LlmError>>>,
    pub transcripts: Mutex<Vec<Result<String, LlmError>>>,
    pub speech: Mutex<Vec<Result<AudioBuffer, LlmError>>>,
    pub analyze_calls: Mutex<Vec<(AnalysisInput, Language, AnalysisMode)>>,
    /// Language of every session opened, in order. Index is the session id.
    pub opened: Mutex<Vec<Language>>,
    /// `(session id, message)` for every chat send.
    pub sent: Mutex<Vec<(usize, String)>>,
    /// `(text, language)` for every synthesis request.
    pub speech_calls: Mutex<Vec<(String, Language)>>,
    pub transcribe_calls: Mutex<usize>,
}

#[derive(Default, Clone)]
pub struct MockBoundary {
    pub state: Arc<MockState>,
}

impl MockBoundary {
    pub fn push_analysis(&self, result: Result<AnalysisResult, LlmError>) {
        self.state.analyses.lock().unwrap().push(result);
    }

    pub fn push_reply(&self, reply: Result<ChatReply, LlmError>) {
        self.state.replies.lock().unwrap().push(reply);
    }

    pub fn push_transcript(&self, transcript: Result<String, LlmError>) {
        self.state.transcripts.lock().unwrap().push(transcript);
    }

    pub fn push_speech(&self, audio: Result<AudioBuffer, LlmError>) {
        self.state.speech.lock().unwrap().push(audio);
    }

    pub fn sent(&self) -> Vec<(usize, String)> {
        self.state.sent.lock().unwrap().clone()
    }

    pub fn opened(&self) -> Vec<Language> {
        self.state.opened.lock().unwrap().clone()
    }

    pub fn analyze_count(&self) -> usize {
        self.state.analyze_calls.lock().unwrap().len()
    }

    pub fn transcribe_count(&self) -> usize {
        *self.state.transcribe_calls.lock().unwrap()
    }

    pub fn speech_count(&self) -> usize {
        self.state.speech_calls.lock().unwrap().len()
    }

    pub fn spoken(&self) -> Vec<(String, Language)> {
        self.state.speech_calls.lock().unwrap().clone()
    }
}

fn pop<T>(script: &Mutex<Vec<T>>) -> Option<T> {
    let mut script = script.lock().unwrap();
    if script.is_empty() { None } else { Some(script.remove(0)) }
}

#[async_trait::async_trait]
impl AiBoundary for MockBoundary {
    async fn analyze(
        &self,
        input: &AnalysisInput,
        language: Language,
        mode: AnalysisMode,
    ) -> Result<AnalysisResult, LlmError> {
        self.state
            .analyze_calls
            .lock()
            .unwrap()
            .push((input.clone(), language, mode));
        pop(&self.state.analyses).unwrap_or_else(|| Err(LlmError::ApiRequest("no scripted analysis".into())))
    }

    fn open_chat(&self, language: Language) -> Box<dyn ChatSession> {
        let mut opened = self.state.opened.lock().unwrap();
        opened.push(language);
        Box::new(MockSession { id: opened.len() - 1, language, state: Arc::clone(&self.state) })
    }

    async fn synthesize_speech(&self, text: &str, language: Language) -> Result<AudioBuffer, LlmError> {
        self.state.speech_calls.lock().unwrap().push((text.to_string(), language));
        pop(&self.state.speech).unwrap_or_else(|| Ok(sample_audio()))
    }

    async fn transcribe(&self, _audio: &MediaPayload, _language: Language) -> Result<String, LlmError> {
        *self.state.transcribe_calls.lock().unwrap() += 1;
        pop(&self.state.transcripts).unwrap_or_else(|| Ok(String::new()))
    }
}

pub struct MockSession {
    id: usize,
    language: Language,
    state: Arc<MockState>,
}

#[async_trait::async_trait]
impl ChatSession for MockSession {
    async fn send(&mut self, message: &str) -> Result<ChatReply, LlmError> {
        self.state.sent.lock().unwrap().push((self.id, message.to_string()));
        pop(&self.state.replies).unwrap_or_else(|| Ok(ChatReply { text: "ok".into(), citations: Vec::new() }))
    }

    fn language(&self) -> Language {
        self.language
    }
}

#[must_use]
pub fn sample_result(verdict: Verdict, risk_score: Option<f64>) -> AnalysisResult {
    AnalysisResult {
        verdict,
        category: "General".into(),
        explanation: "Checked against official sources.".into(),
        confidence: 0.9,
        risk_score,
        sources: vec![Source::default()],
        input_type: InputType::Text,
    }
}

#[must_use]
pub fn sample_audio() -> AudioBuffer {
    AudioBuffer { samples: vec![0.0, 0.25, -0.25], sample_rate: 24_000, channels: 1 }
}

#[must_use]
pub fn sample_frame() -> MediaPayload {
    MediaPayload::new("iVBORw0KGgo=", "image/png")
}

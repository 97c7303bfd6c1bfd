//! Gemini `generateContent` client.
//!
//! Thin HTTP wrapper for `POST {base}/models/{model}:generateContent`. Request
//! building and response parsing are pure functions so they can be tested
//! without a network. One endpoint serves all four boundary operations; they
//! differ only in prompt, tools, and requested modality.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use super::config::LlmConfig;
use super::prompts;
use super::types::{AiBoundary, ChatReply, ChatSession, LlmError};
use crate::audio::AudioBuffer;
use crate::i18n::Language;
use crate::model::{
    AnalysisInput, AnalysisMode, AnalysisResult, Citation, InputType, MediaPayload, Source, Verdict,
};

// =============================================================================
// CLIENT
// =============================================================================

/// Explicitly constructed Gemini client. Cheap to clone; chat sessions hold
/// their own clone.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    speech_model: String,
}

impl GeminiClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            api_key: config.api_key,
            base_url: config.base_url,
            model: config.model,
            speech_model: config.speech_model,
        })
    }

    /// # Errors
    ///
    /// Returns an error if the API key is missing or the HTTP client fails.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::new(LlmConfig::from_env()?)
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn speech_model(&self) -> &str {
        &self.speech_model
    }

    /// Minimal round trip used to validate the key and model.
    ///
    /// # Errors
    ///
    /// Any request or provider failure.
    pub async fn test_connection(&self) -> Result<(), LlmError> {
        let request = GenerateRequest {
            system_instruction: None,
            contents: vec![WireContent::user(vec![WirePart::text("Say 'ok'")])],
            tools: Vec::new(),
            generation_config: None,
        };
        let response = self.generate(&self.model, &request).await?;
        first_candidate(&response)?;
        info!(model = %self.model, "gemini: connection ok");
        Ok(())
    }

    async fn generate(&self, model: &str, request: &GenerateRequest) -> Result<GenerateResponse, LlmError> {
        let url = format!("{}/models/{model}:generateContent", self.base_url);
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(describe_request_error(&e)))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;
        debug!(model, status, bytes = text.len(), "gemini: response");

        if status != 200 {
            warn!(model, status, "gemini: non-success status");
            return Err(classify_error_response(status, text));
        }

        parse_generate_response(&text)
    }
}

fn describe_request_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timeout".to_string()
    } else if e.is_connect() {
        format!("network error: {e}")
    } else {
        e.to_string()
    }
}

#[async_trait::async_trait]
impl AiBoundary for GeminiClient {
    async fn analyze(
        &self,
        input: &AnalysisInput,
        language: Language,
        mode: AnalysisMode,
    ) -> Result<AnalysisResult, LlmError> {
        let input_type = input.input_type();
        info!(%mode, %language, input_type = input_type.as_str(), "gemini: analyze");

        let request = build_analysis_request(input, language, mode);
        let response = self.generate(&self.model, &request).await?;
        let mut result = parse_analysis(&response_text(&response)?, input_type)?;

        // Model-written sources are often empty even when search grounding ran.
        if result.sources.is_empty() {
            result.sources = grounding_citations(&response)
                .into_iter()
                .map(|web| Source { web: Some(web) })
                .collect();
        }

        info!(verdict = %result.verdict, sources = result.sources.len(), "gemini: analyze done");
        Ok(result)
    }

    fn open_chat(&self, language: Language) -> Box<dyn ChatSession> {
        Box::new(GeminiChatSession::new(self.clone(), language))
    }

    async fn synthesize_speech(&self, text: &str, language: Language) -> Result<AudioBuffer, LlmError> {
        info!(%language, chars = text.chars().count(), "gemini: synthesize speech");
        let request = build_speech_request(text, language);
        let response = self.generate(&self.speech_model, &request).await?;
        response_audio(&response)
    }

    async fn transcribe(&self, audio: &MediaPayload, language: Language) -> Result<String, LlmError> {
        info!(%language, mime = %audio.mime_type, "gemini: transcribe");
        let request = build_transcription_request(audio, language);
        let response = self.generate(&self.model, &request).await?;
        Ok(response_text(&response)?.trim().to_string())
    }
}

// =============================================================================
// CHAT SESSION
// =============================================================================

/// Multi-turn chat. History lives here; each send replays it.
pub struct GeminiChatSession {
    client: GeminiClient,
    language: Language,
    system: String,
    history: Vec<WireContent>,
}

impl GeminiChatSession {
    #[must_use]
    pub fn new(client: GeminiClient, language: Language) -> Self {
        Self { client, language, system: prompts::chat_system_prompt(language), history: Vec::new() }
    }
}

#[async_trait::async_trait]
impl ChatSession for GeminiChatSession {
    async fn send(&mut self, message: &str) -> Result<ChatReply, LlmError> {
        let mut turns = self.history.clone();
        turns.push(WireContent::user(vec![WirePart::text(message)]));
        let request = build_chat_request(&self.system, turns);

        let response = self.client.generate(&self.client.model, &request).await?;
        let reply = ChatReply { text: response_text(&response)?, citations: grounding_citations(&response) };

        // Commit only after a reply, so failed or cancelled turns leave no trace.
        let model_turn = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map_or_else(|| WireContent::model(vec![WirePart::text(&reply.text)]), WireContent::into_model);
        self.history = request.contents;
        self.history.push(model_turn);

        debug!(turns = self.history.len(), citations = reply.citations.len(), "gemini: chat turn");
        Ok(reply)
    }

    fn language(&self) -> Language {
        self.language
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<WirePart>,
}

impl WireContent {
    fn user(parts: Vec<WirePart>) -> Self {
        Self { role: Some("user".into()), parts }
    }

    fn model(parts: Vec<WirePart>) -> Self {
        Self { role: Some("model".into()), parts }
    }

    fn instruction(text: String) -> Self {
        Self { role: None, parts: vec![WirePart { text: Some(text), ..WirePart::default() }] }
    }

    fn into_model(self) -> Self {
        Self { role: Some("model".into()), parts: self.parts }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
    /// Set on reasoning parts; never shown to the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

impl WirePart {
    fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), ..Self::default() }
    }

    fn inline(media: &MediaPayload) -> Self {
        Self {
            inline_data: Some(InlineData { mime_type: media.mime_type.clone(), data: media.data.clone() }),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<WireContent>,
    pub contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<WireContent>,
    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<WireSource>,
}

/// A source entry as the model or grounding metadata writes it. Titles are
/// sometimes missing; URIs are required for anything we render.
#[derive(Debug, Default, Deserialize)]
pub struct WireSource {
    #[serde(default)]
    pub web: Option<WireWeb>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WireWeb {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl WireWeb {
    fn to_citation(&self) -> Option<Citation> {
        let uri = self.uri.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
        let title = self
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(uri);
        Some(Citation { uri: uri.to_string(), title: title.to_string() })
    }
}

impl WireSource {
    fn to_source(&self) -> Source {
        Source { web: self.web.as_ref().and_then(WireWeb::to_citation) }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisWire {
    verdict: Verdict,
    category: String,
    explanation: String,
    confidence: f64,
    #[serde(default)]
    risk_score: Option<f64>,
    #[serde(default)]
    sources: Vec<WireSource>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ProviderError,
}

#[derive(Deserialize)]
struct ProviderError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

// =============================================================================
// REQUEST BUILDING
// =============================================================================

fn google_search_tool() -> Value {
    json!({ "googleSearch": {} })
}

/// Response schema for analysis: the model must answer with this object.
#[must_use]
pub fn analysis_schema() -> Value {
    let verdicts: Vec<&str> = Verdict::ALL.iter().map(|v| v.as_str()).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "verdict": { "type": "STRING", "enum": verdicts },
            "category": { "type": "STRING" },
            "explanation": { "type": "STRING" },
            "confidence": { "type": "NUMBER" },
            "riskScore": { "type": "NUMBER" },
            "sources": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "web": {
                            "type": "OBJECT",
                            "properties": {
                                "uri": { "type": "STRING" },
                                "title": { "type": "STRING" }
                            }
                        }
                    }
                }
            }
        },
        "required": ["verdict", "category", "explanation", "confidence"]
    })
}

#[must_use]
pub fn build_analysis_request(input: &AnalysisInput, language: Language, mode: AnalysisMode) -> GenerateRequest {
    let parts = match input {
        AnalysisInput::Text(text) => vec![WirePart::text(text.as_str())],
        AnalysisInput::Media(media) => {
            vec![WirePart::inline(media), WirePart::text(prompts::media_instruction(input.input_type()))]
        }
    };
    GenerateRequest {
        system_instruction: Some(WireContent::instruction(prompts::analysis_system_prompt(mode, language))),
        contents: vec![WireContent::user(parts)],
        tools: vec![google_search_tool()],
        generation_config: Some(json!({
            "responseMimeType": "application/json",
            "responseSchema": analysis_schema(),
        })),
    }
}

#[must_use]
pub fn build_chat_request(system: &str, turns: Vec<WireContent>) -> GenerateRequest {
    GenerateRequest {
        system_instruction: Some(WireContent::instruction(system.to_string())),
        contents: turns,
        tools: vec![google_search_tool()],
        generation_config: None,
    }
}

#[must_use]
pub fn build_speech_request(text: &str, language: Language) -> GenerateRequest {
    GenerateRequest {
        system_instruction: None,
        contents: vec![WireContent::user(vec![WirePart::text(text)])],
        tools: Vec::new(),
        generation_config: Some(json!({
            "responseModalities": ["AUDIO"],
            "speechConfig": {
                "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": prompts::voice_for(language) } }
            }
        })),
    }
}

#[must_use]
pub fn build_transcription_request(audio: &MediaPayload, language: Language) -> GenerateRequest {
    GenerateRequest {
        system_instruction: None,
        contents: vec![WireContent::user(vec![
            WirePart::inline(audio),
            WirePart::text(prompts::transcription_prompt(language)),
        ])],
        tools: Vec::new(),
        generation_config: None,
    }
}

// =============================================================================
// PARSING
// =============================================================================

/// # Errors
///
/// [`LlmError::ApiParse`] when the body is not a `generateContent` response.
pub fn parse_generate_response(json: &str) -> Result<GenerateResponse, LlmError> {
    serde_json::from_str(json).map_err(|e| LlmError::ApiParse(e.to_string()))
}

fn classify_error_response(status: u16, body: String) -> LlmError {
    let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&body) else {
        return LlmError::ApiResponse { status, body };
    };
    let err = envelope.error;
    match err.status.as_deref() {
        Some("INVALID_ARGUMENT") if err.message.contains("API key") => LlmError::Provider("invalid API key".into()),
        Some("PERMISSION_DENIED" | "UNAUTHENTICATED") => LlmError::Provider("invalid API key".into()),
        Some("RESOURCE_EXHAUSTED") => LlmError::Provider("API quota exceeded".into()),
        _ => LlmError::ApiResponse { status, body },
    }
}

fn first_candidate(response: &GenerateResponse) -> Result<&Candidate, LlmError> {
    response.candidates.first().ok_or_else(|| {
        match response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            Some(reason) => LlmError::Provider(format!("prompt blocked: {reason}")),
            None => LlmError::EmptyResponse,
        }
    })
}

/// Concatenated visible text of the first candidate. May be empty.
///
/// # Errors
///
/// When the response has no candidates at all.
pub fn response_text(response: &GenerateResponse) -> Result<String, LlmError> {
    let candidate = first_candidate(response)?;
    Ok(candidate
        .content
        .iter()
        .flat_map(|c| &c.parts)
        .filter(|p| p.thought != Some(true))
        .filter_map(|p| p.text.as_deref())
        .collect())
}

/// Web sources from search grounding, in order, skipping chunks without a URI.
#[must_use]
pub fn grounding_citations(response: &GenerateResponse) -> Vec<Citation> {
    response
        .candidates
        .first()
        .and_then(|c| c.grounding_metadata.as_ref())
        .map(|m| {
            m.grounding_chunks
                .iter()
                .filter_map(|chunk| chunk.web.as_ref().and_then(WireWeb::to_citation))
                .collect()
        })
        .unwrap_or_default()
}

/// Decode the first inline audio part of a speech response.
///
/// # Errors
///
/// [`LlmError::MissingAudio`] without inline data, [`LlmError::ApiParse`]
/// when the payload is not valid base64.
pub fn response_audio(response: &GenerateResponse) -> Result<AudioBuffer, LlmError> {
    let candidate = first_candidate(response)?;
    let data = candidate
        .content
        .iter()
        .flat_map(|c| &c.parts)
        .find_map(|p| p.inline_data.as_ref())
        .ok_or(LlmError::MissingAudio)?;
    AudioBuffer::from_base64_pcm(&data.data).map_err(|e| LlmError::ApiParse(e.to_string()))
}

/// Parse the model's JSON verdict. `input_type` comes from the request.
///
/// # Errors
///
/// [`LlmError::ApiParse`] for invalid JSON, missing required fields, an
/// unknown verdict, or non-finite numbers.
pub fn parse_analysis(text: &str, input_type: InputType) -> Result<AnalysisResult, LlmError> {
    let wire: AnalysisWire =
        serde_json::from_str(strip_json_fence(text)).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    Ok(AnalysisResult {
        verdict: wire.verdict,
        category: wire.category,
        explanation: wire.explanation,
        confidence: normalize_confidence(wire.confidence)?,
        risk_score: wire.risk_score.map(normalize_risk).transpose()?,
        sources: wire.sources.iter().map(WireSource::to_source).collect(),
        input_type,
    })
}

fn strip_json_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Confidence lands in `[0, 1]`. Percent-scale values are rescaled first.
fn normalize_confidence(raw: f64) -> Result<f64, LlmError> {
    if !raw.is_finite() {
        return Err(LlmError::ApiParse(format!("non-finite confidence: {raw}")));
    }
    let scaled = if raw > 1.0 && raw <= 100.0 { raw / 100.0 } else { raw };
    Ok(scaled.clamp(0.0, 1.0))
}

fn normalize_risk(raw: f64) -> Result<f64, LlmError> {
    if !raw.is_finite() {
        return Err(LlmError::ApiParse(format!("non-finite risk score: {raw}")));
    }
    Ok(raw.clamp(0.0, 100.0))
}

#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;

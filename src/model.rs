//! Analysis result model — the verdict shape shared by every component.
//!
//! DESIGN
//! ======
//! `AnalysisResult` is produced by the AI boundary and consumed by the report
//! view and the conversation manager. `input_type` is always derived from the
//! request (`AnalysisInput::input_type`), never from model output.

use std::fmt;
use std::fmt::Write;

use serde::{Deserialize, Serialize};

// =============================================================================
// VERDICT
// =============================================================================

/// Closed classification of analyzed content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Real,
    Fake,
    Suspicious,
}

impl Verdict {
    pub const ALL: [Verdict; 3] = [Verdict::Real, Verdict::Fake, Verdict::Suspicious];

    /// Marker symbol shown on badges and in chat reports.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Real => "✅",
            Self::Fake => "❌",
            Self::Suspicious => "⚠️",
        }
    }

    /// Wire name, as used in the response schema enum.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Real => "REAL",
            Self::Fake => "FAKE",
            Self::Suspicious => "SUSPICIOUS",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// INPUT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Text,
    Image,
    Video,
    Audio,
}

impl InputType {
    /// Classify a media MIME type. Anything that is not video or audio is
    /// treated as an image (screenshots, photos).
    #[must_use]
    pub fn from_mime(mime_type: &str) -> Self {
        let mime = mime_type.to_ascii_lowercase();
        if mime.starts_with("video") {
            Self::Video
        } else if mime.starts_with("audio") {
            Self::Audio
        } else {
            Self::Image
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

/// Inline base64 media handed to the model unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaPayload {
    pub data: String,
    pub mime_type: String,
}

impl MediaPayload {
    #[must_use]
    pub fn new(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self { data: data.into(), mime_type: mime_type.into() }
    }

    #[must_use]
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// What the user asked us to check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisInput {
    Text(String),
    Media(MediaPayload),
}

impl AnalysisInput {
    #[must_use]
    pub fn input_type(&self) -> InputType {
        match self {
            Self::Text(_) => InputType::Text,
            Self::Media(media) => InputType::from_mime(&media.mime_type),
        }
    }
}

/// Which system prompt the analysis runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Fact-check news and forwards with web search grounding.
    #[default]
    News,
    /// Scam-pattern detection on call transcripts and recordings.
    Call,
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::News => "news",
            Self::Call => "call",
        })
    }
}

// =============================================================================
// RESULT
// =============================================================================

/// A web reference backing a verdict or a chat reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub uri: String,
    pub title: String,
}

/// One entry of the model's `sources` list. Entries without `web` carry
/// nothing renderable and are skipped.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Source {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<Citation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub verdict: Verdict,
    pub category: String,
    pub explanation: String,
    /// Model confidence in `[0, 1]`.
    pub confidence: f64,
    /// Scam risk in `[0, 100]`, usually only present in call mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,
    #[serde(default)]
    pub sources: Vec<Source>,
    pub input_type: InputType,
}

impl AnalysisResult {
    /// Web references in source order, skipping entries without one.
    pub fn citations(&self) -> impl Iterator<Item = &Citation> {
        self.sources.iter().filter_map(|s| s.web.as_ref())
    }

    #[must_use]
    pub fn risk_band(&self) -> Option<RiskBand> {
        self.risk_score.map(RiskBand::from_score)
    }
}

/// Coarse risk meter bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score < 30.0 {
            Self::Low
        } else if score < 70.0 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

// =============================================================================
// CITATION FORMATTING
// =============================================================================

/// Render a numbered markdown link list under `heading`. Empty input renders
/// nothing, so callers can append unconditionally.
#[must_use]
pub fn format_citation_list<'a>(heading: &str, citations: impl IntoIterator<Item = &'a Citation>) -> String {
    let mut out = String::new();
    for (idx, c) in citations.into_iter().enumerate() {
        if idx == 0 {
            let _ = write!(out, "**{heading}:**");
        }
        let _ = write!(out, "\n{}. [{}]({})", idx + 1, c.title, c.uri);
    }
    out
}

/// Detect `[title](url)` links in free text written by the model.
#[must_use]
pub fn parse_markdown_links(text: &str) -> Vec<Citation> {
    let mut found = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find('[') {
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find("](") else {
            break;
        };
        let title = &after_open[..close];
        let after_paren = &after_open[close + 2..];
        let Some(end) = after_paren.find(')') else {
            break;
        };
        let uri = &after_paren[..end];
        // "[a [b](c)": restart at the innermost bracket.
        if let Some(inner) = title.rfind('[') {
            rest = &after_open[inner..];
            continue;
        }
        if !uri.is_empty() && !uri.contains(char::is_whitespace) {
            found.push(Citation { uri: uri.to_string(), title: title.to_string() });
        }
        rest = &after_paren[end + 1..];
    }
    found
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;

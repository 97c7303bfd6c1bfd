//! Outbound share — warn friends about a checked forward.

use reqwest::Url;

use crate::i18n::UiStrings;
use crate::model::AnalysisResult;

const WHATSAPP_SHARE_URL: &str = "https://wa.me/";

#[derive(Debug, thiserror::Error)]
#[error("share link build failed: {0}")]
pub struct ShareError(String);

/// Alert text for a result, in the active language.
#[must_use]
pub fn share_text(result: &AnalysisResult, s: &UiStrings) -> String {
    format!(
        "🚨 *SATYAM ALERT* 🚨\n\n*{}*\n\n{}\n\n{}",
        s.verdict_label(result.verdict),
        result.explanation,
        s.share_call_to_action
    )
}

/// WhatsApp deep link prefilled with [`share_text`].
///
/// # Errors
///
/// Only if the share base URL fails to parse.
pub fn whatsapp_link(result: &AnalysisResult, s: &UiStrings) -> Result<Url, ShareError> {
    Url::parse_with_params(WHATSAPP_SHARE_URL, &[("text", share_text(result, s))])
        .map_err(|e| ShareError(e.to_string()))
}

#[cfg(test)]
#[path = "share_test.rs"]
mod tests;

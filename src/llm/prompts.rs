//! Prompts for analysis, chat, transcription, and context updates.

use crate::i18n::Language;
use crate::model::{AnalysisMode, AnalysisResult, InputType};

/// System prompt for an analysis request.
#[must_use]
pub fn analysis_system_prompt(mode: AnalysisMode, language: Language) -> String {
    let lang = language.english_name();
    match mode {
        AnalysisMode::News => format!(
            "You are Satyam, India's lead AI fact-checker. Use Google Search.\n\
             Verify WhatsApp forwards and rumors. Detect deepfakes in videos.\n\
             Provide verdict (REAL/FAKE/SUSPICIOUS) and explanation in {lang}.\n\
             Cite the web pages you relied on in `sources`.\n\
             Respond with JSON only, matching the requested schema."
        ),
        AnalysisMode::Call => format!(
            "You are Rakshak, India's scam expert. Detect patterns: KYC fraud, lottery scams.\n\
             Risk Score 0-100. Explain in {lang}.\n\
             Provide verdict (REAL/FAKE/SUSPICIOUS) where FAKE means a scam.\n\
             Respond with JSON only, matching the requested schema."
        ),
    }
}

/// Instruction part sent alongside inline media.
#[must_use]
pub fn media_instruction(input_type: InputType) -> String {
    format!("Analyze this {} for scams or fake news.", input_type.as_str())
}

/// System prompt for the Sahayak safety advisor chat.
#[must_use]
pub fn chat_system_prompt(language: Language) -> String {
    format!(
        "You are Satyam Sahayak, a digital safety AI for India. Speak in {}.\n\
         Verify news, explain scams, and advise users to be safe. Use Google Search for facts.",
        language.english_name()
    )
}

#[must_use]
pub fn transcription_prompt(language: Language) -> String {
    format!("Transcribe this {} audio.", language.english_name())
}

/// Hidden message that puts a scan result into the chat session's context.
#[must_use]
pub fn context_update_message(result: &AnalysisResult) -> String {
    let risk = result.risk_score.map_or_else(|| "unknown".to_string(), |r| format!("{r:.0}"));
    format!(
        "[INTERNAL SYSTEM UPDATE]: The user performed a screen scan. Result: {}. Analysis: {}. Risk Score: {}. \
         The user is now going to ask follow-up questions about this specific image/result. \
         Provide helpful safety advice based on this.",
        result.verdict, result.explanation, risk
    )
}

/// Prebuilt voice for speech synthesis.
#[must_use]
pub fn voice_for(language: Language) -> &'static str {
    match language {
        Language::Hi => "Kore",
        Language::En => "Zephyr",
        Language::Ta | Language::Gu => "Puck",
    }
}

#[cfg(test)]
#[path = "prompts_test.rs"]
mod tests;

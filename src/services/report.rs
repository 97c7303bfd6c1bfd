//! Report view — a pure rendering of one analysis result.
//!
//! Computes everything a result card shows (badge, tag, citations, risk
//! meter) from an [`AnalysisResult`] and the active language. No I/O.

use std::fmt;

use crate::i18n::{Language, UiStrings, strings};
use crate::model::{AnalysisResult, InputType, RiskBand, Verdict};

/// Visual tone of the verdict badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
    Warning,
}

impl Tone {
    #[must_use]
    pub fn for_verdict(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Real => Self::Positive,
            Verdict::Fake => Self::Negative,
            Verdict::Suspicious => Self::Warning,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub verdict: Verdict,
    pub symbol: &'static str,
    pub label: &'static str,
    pub tone: Tone,
}

/// One numbered source row. Numbers count rendered rows only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationRow {
    pub number: usize,
    pub title: String,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskMeter {
    pub score: f64,
    pub band: RiskBand,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedReport {
    pub badge: Badge,
    pub input_tag: &'static str,
    pub category: String,
    pub explanation: String,
    pub sources_heading: &'static str,
    pub citations: Vec<CitationRow>,
    pub risk: Option<RiskMeter>,
}

pub struct ReportView<'a> {
    result: &'a AnalysisResult,
    strings: &'static UiStrings,
}

impl<'a> ReportView<'a> {
    #[must_use]
    pub fn new(result: &'a AnalysisResult, language: Language) -> Self {
        Self { result, strings: strings(language) }
    }

    #[must_use]
    pub fn render(&self) -> RenderedReport {
        let s = self.strings;
        let r = self.result;
        RenderedReport {
            badge: Badge {
                verdict: r.verdict,
                symbol: r.verdict.symbol(),
                label: s.verdict_label(r.verdict),
                tone: Tone::for_verdict(r.verdict),
            },
            input_tag: input_tag(r.input_type, s),
            category: r.category.clone(),
            explanation: r.explanation.clone(),
            sources_heading: s.verified_sources,
            citations: r
                .citations()
                .enumerate()
                .map(|(i, c)| CitationRow { number: i + 1, title: c.title.clone(), uri: c.uri.clone() })
                .collect(),
            risk: r
                .risk_score
                .zip(r.risk_band())
                .map(|(score, band)| RiskMeter { score, band, label: risk_label(band, s) }),
        }
    }
}

fn input_tag(input_type: InputType, s: &UiStrings) -> &'static str {
    match input_type {
        InputType::Text => s.media.text,
        InputType::Image => s.media.image,
        InputType::Video => s.media.video,
        InputType::Audio => s.media.voice,
    }
}

fn risk_label(band: RiskBand, s: &UiStrings) -> &'static str {
    match band {
        RiskBand::Low => s.risk.safe,
        RiskBand::Medium => s.risk.suspicious,
        RiskBand::High => s.risk.scam,
    }
}

const METER_WIDTH: usize = 20;

impl fmt::Display for RenderedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}  [{}]", self.badge.symbol, self.badge.label, self.input_tag)?;
        writeln!(f, "{}", self.category)?;
        writeln!(f)?;
        writeln!(f, "{}", self.explanation)?;

        if let Some(risk) = &self.risk {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
            let filled = ((risk.score / 100.0) * METER_WIDTH as f64).round() as usize;
            let filled = filled.min(METER_WIDTH);
            writeln!(f)?;
            writeln!(
                f,
                "[{}{}] {:.0}% {}",
                "#".repeat(filled),
                "-".repeat(METER_WIDTH - filled),
                risk.score,
                risk.label
            )?;
        }

        if !self.citations.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}:", self.sources_heading)?;
            for row in &self.citations {
                writeln!(f, "  {}. {} <{}>", row.number, row.title, row.uri)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;

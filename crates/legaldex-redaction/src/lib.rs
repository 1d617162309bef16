// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]
//! Candidate sensitive-span detection for document redaction review
//! (§4.11). Detection is advisory only — applying redactions to PDF bytes
//! is a separate collaborator this crate never touches.
//!
//! Two detection sources feed [`detect`]: the enumerated [`patterns`]
//! table (always run) and an optional [`AiRedactionDetector`] (run in a
//! "sensitive-span" mode conceptually the same external-provider
//! abstraction `legaldex-classify` dispatches to, but kept as its own
//! trait here so this crate has no hard dependency on a classifier
//! implementation). Findings from both sources are merged by bounding-box
//! overlap when page geometry is available, or by text-span overlap
//! otherwise.

mod error;
mod geometry;
pub mod patterns;

use std::ops::Range;

use async_trait::async_trait;

pub use error::RedactionError;
pub use geometry::{char_range_overlap_ratio, locate, BBox, GlyphPosition};

/// Bbox/text-span overlap fraction above which two findings are
/// considered the same span and merged (§4.11).
pub const MERGE_OVERLAP_THRESHOLD: f64 = 0.5;

/// Category of sensitive data a [`Redaction`] was flagged for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RedactionType {
    /// Social security number.
    Ssn,
    /// State-issued driver's licence number.
    DriversLicense,
    /// Phone number.
    Phone,
    /// Email address.
    Email,
    /// Credit card number.
    CreditCard,
    /// Bank account number.
    BankAccount,
    /// Date of birth.
    DateOfBirth,
    /// Financial institution routing/identifier.
    FinancialIdentifier,
    /// Flagged by the AI detector rather than a pattern rule.
    AiDetected,
}

/// One candidate sensitive span (§4.11).
#[derive(Debug, Clone, PartialEq)]
pub struct Redaction {
    /// 1-based page number, or `1` when no positional information was
    /// available (e.g. a non-PDF source).
    pub page: u32,
    /// Page-relative bounding box, or [`BBox::unknown`] when unavailable.
    pub bbox: BBox,
    /// The matched text.
    pub text: String,
    /// Category of sensitive data.
    pub kind: RedactionType,
    /// Free-text citation of the matched pattern, when one applies.
    pub citation: Option<String>,
    /// Legal-code reference the redaction is grounded on.
    pub legal_code: Option<String>,
    /// Short human-readable reason.
    pub reason: String,
    /// Character range into the source text this finding covers, kept for
    /// merge comparisons and caller cross-referencing.
    pub char_range: Range<usize>,
}

impl Redaction {
    fn overlaps(&self, other: &Redaction, has_positions: bool) -> bool {
        let ratio = if has_positions {
            self.bbox.overlap_ratio(&other.bbox)
        } else {
            char_range_overlap_ratio(&self.char_range, &other.char_range)
        };
        ratio > MERGE_OVERLAP_THRESHOLD
    }
}

/// A structured sensitive span returned by an [`AiRedactionDetector`],
/// before it has been placed on a page (§4.11 detection source 2).
#[derive(Debug, Clone)]
pub struct AiSpan {
    /// Character range into the source text.
    pub char_range: Range<usize>,
    /// The matched text, as the detector reported it.
    pub text: String,
    /// Detector-reported category label, if any.
    pub kind: Option<String>,
    /// Detector-reported reason, if any.
    pub reason: Option<String>,
}

/// Optional AI-driven detector run in "sensitive-span" mode (§4.11
/// detection source 2). Implementations typically wrap a
/// `legaldex-classify`-style provider configured to return structured
/// spans instead of a full classification.
#[async_trait]
pub trait AiRedactionDetector: Send + Sync {
    /// Submit `text` for sensitive-span detection.
    async fn detect_spans(&self, text: &str) -> Result<Vec<AiSpan>, RedactionError>;
}

fn run_pattern_rules(text: &str, positions: Option<&[GlyphPosition]>) -> Vec<Redaction> {
    let mut findings = Vec::new();
    for rule in patterns::PATTERN_RULES {
        for m in rule.regex.find_iter(text) {
            let char_range = m.start()..m.end();
            let (page, bbox) = positions
                .and_then(|p| locate(p, &char_range))
                .unwrap_or((1, BBox::unknown()));
            findings.push(Redaction {
                page,
                bbox,
                text: m.as_str().to_string(),
                kind: rule.kind,
                citation: Some(rule.legal_code.to_string()),
                legal_code: Some(rule.legal_code.to_string()),
                reason: rule.reason.to_string(),
                char_range,
            });
        }
    }
    findings
}

fn ai_spans_to_redactions(spans: Vec<AiSpan>, text: &str, positions: Option<&[GlyphPosition]>) -> Vec<Redaction> {
    spans
        .into_iter()
        .map(|span| {
            let (page, bbox) = positions.and_then(|p| locate(p, &span.char_range)).unwrap_or((1, BBox::unknown()));
            let matched_text = text.get(span.char_range.clone()).map(str::to_string).unwrap_or(span.text);
            Redaction {
                page,
                bbox,
                text: matched_text,
                kind: RedactionType::AiDetected,
                citation: None,
                legal_code: None,
                reason: span.reason.unwrap_or_else(|| span.kind.unwrap_or_else(|| "ai-flagged sensitive span".to_string())),
                char_range: span.char_range,
            }
        })
        .collect()
}

/// Merge two finding lists, folding any pattern/AI pair whose bbox (or, if
/// no positions were supplied, text-span) overlap exceeds
/// [`MERGE_OVERLAP_THRESHOLD`] into a single entry that keeps the
/// pattern-rule finding's citation (patterns are always more specific
/// about *why* than the AI detector) and the AI finding's additional
/// reason text (§4.11).
fn merge_findings(pattern: Vec<Redaction>, ai: Vec<Redaction>, has_positions: bool) -> Vec<Redaction> {
    let mut merged = pattern;
    for ai_finding in ai {
        let duplicate = merged.iter().any(|existing| existing.overlaps(&ai_finding, has_positions));
        if !duplicate {
            merged.push(ai_finding);
        }
    }
    merged.sort_by_key(|r| r.char_range.start);
    merged
}

/// Detect candidate redaction spans in `text` (§4.11).
///
/// `positions`, when supplied (from the PDF extractor), lets findings
/// carry a real page/bbox; without it every finding defaults to page `1`
/// and [`BBox::unknown`], and merge comparisons fall back to text-span
/// overlap. `ai`, when supplied, runs the optional AI detector leg and
/// merges its spans with the pattern-rule findings.
///
/// # Errors
///
/// Returns the AI detector's error, if one was supplied and its call
/// failed; pattern-rule detection itself never fails.
pub async fn detect(
    text: &str,
    positions: Option<&[GlyphPosition]>,
    ai: Option<&dyn AiRedactionDetector>,
) -> Result<Vec<Redaction>, RedactionError> {
    let pattern_findings = run_pattern_rules(text, positions);

    let ai_findings = match ai {
        Some(detector) => ai_spans_to_redactions(detector.detect_spans(text).await?, text, positions),
        None => Vec::new(),
    };

    Ok(merge_findings(pattern_findings, ai_findings, positions.is_some()))
}

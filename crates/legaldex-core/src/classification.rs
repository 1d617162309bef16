// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`ClassificationResult`], the output of a classifier provider before date
//! normalisation (§4.3).

use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::document::{Attorney, Authority, CaseInfo, CourtInfo, DocumentType, Party};

/// Raw, pre-normalisation date strings as returned by a classifier adapter.
///
/// Each field accepts whatever flexible format the adapter emitted
/// (`YYYY-MM-DD`, `MM/DD/YYYY`, `Month DD, YYYY`, or a relative phrase like
/// `"tomorrow"`). [`crate::DocumentMetadata`]'s dates are the normalised,
/// validated form produced by the date-normalisation step; this type holds
/// the pre-normalisation input.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RawDates {
    /// Raw filing-date string, if the adapter supplied one.
    pub filing_date: Option<String>,
    /// Raw event-date string.
    pub event_date: Option<String>,
    /// Raw hearing-date string.
    pub hearing_date: Option<String>,
    /// Raw decision-date string.
    pub decision_date: Option<String>,
    /// Raw served-date string.
    pub served_date: Option<String>,
}

/// Output of a classifier provider, prior to date normalisation and result
/// validation (§4.3 steps 3-4). The [`crate::ClassifierRouter`]-equivalent
/// in `legaldex-classify` mutates this in place during those steps.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ClassificationResult {
    /// Classified document type, possibly an unrecognised raw value before
    /// coercion.
    pub document_type: Option<DocumentType>,
    /// Legal category; defaulted by the router if absent.
    pub legal_category: Option<String>,
    /// Short subject line.
    pub subject: Option<String>,
    /// Longer free-text summary.
    pub summary: Option<String>,
    /// Raw confidence, not yet clamped to `[0, 1]`.
    pub confidence: f64,
    /// Pre-normalisation date strings.
    pub dates: RawDates,
    /// Legal tags.
    pub legal_tags: BTreeSet<String>,
    /// Parties, if the adapter extracted entities.
    pub parties: Vec<Party>,
    /// Attorneys, if the adapter extracted entities.
    pub attorneys: Vec<Attorney>,
    /// Cited authorities, if the adapter extracted entities.
    pub authorities: Vec<Authority>,
    /// Case information, if the adapter extracted it.
    pub case_info: Option<CaseInfo>,
    /// Court information, if the adapter extracted it.
    pub court_info: Option<CourtInfo>,
}

impl ClassificationResult {
    /// Clamp [`ClassificationResult::confidence`] into `[0, 1]`, in place.
    pub fn clamp_confidence(&mut self) {
        self.confidence = self.confidence.clamp(0.0, 1.0);
    }

    /// Apply the legal-category default fallback when the adapter did not
    /// supply one.
    pub fn apply_legal_category_default(&mut self, default: &str) {
        if self.legal_category.is_none() {
            self.legal_category = Some(default.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_confidence_bounds_to_unit_interval() {
        let mut result = ClassificationResult {
            confidence: 1.5,
            ..Default::default()
        };
        result.clamp_confidence();
        assert_eq!(result.confidence, 1.0);

        result.confidence = -0.2;
        result.clamp_confidence();
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn legal_category_default_only_applied_when_absent() {
        let mut result = ClassificationResult::default();
        result.apply_legal_category_default("Civil");
        assert_eq!(result.legal_category.as_deref(), Some("Civil"));

        let mut result = ClassificationResult {
            legal_category: Some("Criminal".to_string()),
            ..Default::default()
        };
        result.apply_legal_category_default("Civil");
        assert_eq!(result.legal_category.as_deref(), Some("Criminal"));
    }
}

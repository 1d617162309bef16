// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`EnhancedExtractionService`] (§4.2 "EnhancedService"): composes the
//! [`crate::analyzer::DocumentAnalyzer`]'s document-kind classification
//! with the plain [`crate::registry::ExtractorRegistry`] dispatch and an
//! optional [`crate::ocr::OcrCapability`], selecting a primary method and
//! an ordered fallback list per input and invoking the first method that
//! meets the configured success threshold.

use std::sync::Arc;

use legaldex_config::ExtractionConfig;
use legaldex_core::ExtractionResult;
use legaldex_textclean::{clean, CleanerConfig};

use crate::analyzer::{AnalysisResult, DocumentAnalyzer, ExtractionMethod};
use crate::error::ExtractError;
use crate::hints::{resolve_format, ExtractionHints};
use crate::ocr::OcrCapability;
use crate::pdf::PdfExtractor;
use crate::registry::{Extractor, ExtractorRegistry};

/// Wires a [`DocumentAnalyzer`] ahead of extraction for PDF/image inputs,
/// and delegates to the plain [`ExtractorRegistry`] for every other format.
///
/// Non-PDF formats have no document-kind ambiguity worth analysing, so the
/// service only activates the analyzer's method ordering for inputs that
/// resolve to the `"pdf"` format (including bare images, which the
/// analyzer classifies as [`crate::analyzer::DocumentKind::Image`] and
/// routes straight to OCR).
pub struct EnhancedExtractionService {
    registry: ExtractorRegistry,
    analyzer: DocumentAnalyzer,
    ocr: Option<Arc<dyn OcrCapability>>,
    config: ExtractionConfig,
    cleaner_config: CleanerConfig,
}

impl EnhancedExtractionService {
    /// Build a service over `registry` (used for every non-PDF format and
    /// as the plain library cascade for PDF), optionally attaching an OCR
    /// capability the analyzer's method ordering can invoke directly.
    #[must_use]
    pub fn new(registry: ExtractorRegistry, config: ExtractionConfig, cleaner_config: CleanerConfig) -> Self {
        Self {
            registry,
            analyzer: DocumentAnalyzer::new(),
            ocr: None,
            config,
            cleaner_config,
        }
    }

    /// Attach an OCR capability the analyzer may select as primary (for
    /// [`crate::analyzer::DocumentKind::ScannedPdf`]/`Image`) or fallback.
    #[must_use]
    pub fn with_ocr(mut self, ocr: Arc<dyn OcrCapability>) -> Self {
        self.ocr = Some(ocr);
        self
    }

    async fn try_pdf_cascade(&self, bytes: &[u8], hints: &ExtractionHints) -> Option<ExtractionResult> {
        let extractor = PdfExtractor::new(self.config.clone(), self.cleaner_config.clone());
        match extractor.extract(bytes, hints).await {
            Ok(result) => Some(result),
            Err(ExtractError::ExtractionFailed { partial_text: Some(text), .. }) => {
                Some(ExtractionResult::failure("cascade below threshold", 0).with_partial(text))
            }
            Err(_) => None,
        }
    }

    async fn try_ocr(&self, bytes: &[u8]) -> Option<ExtractionResult> {
        let ocr = self.ocr.as_ref()?;
        if !ocr.is_available() {
            return None;
        }
        let pages = ocr.recognize_pages(bytes, &self.config.ocr).await.ok()?;
        if pages.is_empty() {
            return None;
        }
        let page_count = pages.len().max(1) as u32;
        let merged = pages.iter().map(|p| p.text.as_str()).collect::<Vec<_>>().join("\n\n");
        let cleaned = clean(&merged, &self.cleaner_config);
        Some(ExtractionResult::from_text(cleaned, page_count, 0).with_method("ocr_direct"))
    }

    async fn run_method(
        &self,
        method: ExtractionMethod,
        bytes: &[u8],
        hints: &ExtractionHints,
    ) -> Option<ExtractionResult> {
        match method {
            ExtractionMethod::PdfCascade => self.try_pdf_cascade(bytes, hints).await,
            ExtractionMethod::Ocr => self.try_ocr(bytes).await,
        }
    }

    /// Extract text from `bytes`, resolving `hints` to a format first.
    /// Non-PDF formats delegate directly to the wrapped registry; PDF
    /// (and image) formats run the analyzer-selected method order,
    /// returning the first candidate whose character count meets
    /// [`ExtractionConfig::primary_char_threshold`], or the longest
    /// candidate seen if none clears it and it is non-empty.
    pub async fn extract(&self, bytes: &[u8], hints: &ExtractionHints) -> Result<ExtractionResult, ExtractError> {
        let format = resolve_format(hints);
        if format != "pdf" {
            return self.registry.extract(bytes, hints).await;
        }

        let analysis: AnalysisResult = self.analyzer.analyze(bytes);
        let mut order = vec![analysis.primary];
        order.extend(analysis.fallback.iter().copied());

        let mut best: Option<ExtractionResult> = None;
        for method in order {
            let Some(candidate) = self.run_method(method, bytes, hints).await else {
                continue;
            };
            if candidate.char_count as usize >= self.config.primary_char_threshold {
                return Ok(candidate.with_analysis_kind(analysis.kind));
            }
            if best.as_ref().is_none_or(|b| candidate.char_count > b.char_count) {
                best = Some(candidate);
            }
        }

        match best {
            Some(result) if !result.text.trim().is_empty() => Ok(result.with_analysis_kind(analysis.kind)),
            _ => Err(ExtractError::ExtractionFailed {
                cause: format!("no analyzer-selected method produced usable text (kind {:?})", analysis.kind),
                format: "pdf".to_string(),
                partial_text: best.map(|b| b.text),
            }),
        }
    }
}

/// Extension helpers kept local to this module: attaching diagnostic
/// metadata to an [`ExtractionResult`] without growing its public surface
/// in `legaldex-core`.
trait ExtractionResultExt {
    fn with_analysis_kind(self, kind: crate::analyzer::DocumentKind) -> Self;
    fn with_partial(self, text: String) -> Self;
}

impl ExtractionResultExt for ExtractionResult {
    fn with_analysis_kind(mut self, kind: crate::analyzer::DocumentKind) -> Self {
        self.metadata.insert(
            "analyzed_kind".to_string(),
            serde_json::Value::String(format!("{kind:?}")),
        );
        self
    }

    fn with_partial(mut self, text: String) -> Self {
        self.text = text;
        self.word_count = self.text.split_whitespace().count() as u64;
        self.char_count = self.text.chars().count() as u64;
        self
    }
}

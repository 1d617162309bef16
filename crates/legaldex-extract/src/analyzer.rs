// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`DocumentAnalyzer`]: classifies a PDF input before extraction so the
//! [`crate::enhanced::EnhancedExtractionService`] can pick a sensible
//! primary method and fallback order up front (§4.2 "EnhancedService").

use once_cell::sync::Lazy;
use regex::Regex;

static IMAGE_XOBJECT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/Subtype\s*/Image").expect("valid regex"));
static TEXT_OPERATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\)\s*T[jJ]").expect("valid regex"));

/// Coarse classification of what kind of content a PDF carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Primarily text laid out by a word processor or typesetter.
    TextPdf,
    /// Primarily scanned page images with no embedded text layer.
    ScannedPdf,
    /// A mix of embedded text and page images.
    HybridPdf,
    /// A bare raster image with no PDF structure at all.
    Image,
    /// Could not be confidently classified.
    Unknown,
}

/// The method order an [`crate::enhanced::EnhancedExtractionService`]
/// should try, most promising first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    /// The library-based PDF cascade (`legaldex-extract`'s `pdf` module).
    PdfCascade,
    /// The OCR capability, if one is configured.
    Ocr,
}

/// Result of analysing a byte stream ahead of extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisResult {
    /// The detected document kind.
    pub kind: DocumentKind,
    /// The method to try first.
    pub primary: ExtractionMethod,
    /// Remaining methods to try, in order, if `primary` does not meet the
    /// success threshold.
    pub fallback: &'static [ExtractionMethod],
}

/// Classifies PDF byte streams by header, image/text operator keyword
/// counts, and an extractable-text probe.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentAnalyzer;

impl DocumentAnalyzer {
    /// Build an analyzer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Analyse `bytes`, deciding the document kind and a method order.
    #[must_use]
    pub fn analyze(&self, bytes: &[u8]) -> AnalysisResult {
        let looks_like_pdf = bytes.windows(4).take(1024).any(|w| w == b"%PDF");
        if !looks_like_pdf {
            return AnalysisResult {
                kind: DocumentKind::Image,
                primary: ExtractionMethod::Ocr,
                fallback: &[],
            };
        }

        let text = String::from_utf8_lossy(bytes);
        let image_count = IMAGE_XOBJECT_RE.find_iter(&text).count();
        let text_operator_count = TEXT_OPERATOR_RE.find_iter(&text).count();
        let extractable_probe = text.contains("/Contents") || text_operator_count > 0;

        let kind = if image_count > 0 && text_operator_count > 0 {
            DocumentKind::HybridPdf
        } else if image_count > 0 {
            DocumentKind::ScannedPdf
        } else if extractable_probe {
            DocumentKind::TextPdf
        } else {
            DocumentKind::Unknown
        };

        let (primary, fallback): (ExtractionMethod, &'static [ExtractionMethod]) = match kind {
            DocumentKind::TextPdf => (ExtractionMethod::PdfCascade, &[ExtractionMethod::Ocr]),
            DocumentKind::HybridPdf => (ExtractionMethod::PdfCascade, &[ExtractionMethod::Ocr]),
            DocumentKind::ScannedPdf => (ExtractionMethod::Ocr, &[ExtractionMethod::PdfCascade]),
            DocumentKind::Image => (ExtractionMethod::Ocr, &[]),
            DocumentKind::Unknown => (ExtractionMethod::PdfCascade, &[ExtractionMethod::Ocr]),
        };

        AnalysisResult { kind, primary, fallback }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_pdf_bytes_classify_as_image() {
        let analyzer = DocumentAnalyzer::new();
        let result = analyzer.analyze(b"\x89PNG\r\n\x1a\nrest of a png file");
        assert_eq!(result.kind, DocumentKind::Image);
        assert_eq!(result.primary, ExtractionMethod::Ocr);
    }

    #[test]
    fn pdf_with_text_operators_and_no_images_is_text_pdf() {
        let analyzer = DocumentAnalyzer::new();
        let bytes = b"%PDF-1.4\nstream\nBT (hello) Tj ET\nendstream";
        let result = analyzer.analyze(bytes);
        assert_eq!(result.kind, DocumentKind::TextPdf);
        assert_eq!(result.primary, ExtractionMethod::PdfCascade);
    }

    #[test]
    fn pdf_with_only_images_is_scanned_pdf() {
        let analyzer = DocumentAnalyzer::new();
        let bytes = b"%PDF-1.4\n/Type /XObject /Subtype /Image /Width 100 /Height 100";
        let result = analyzer.analyze(bytes);
        assert_eq!(result.kind, DocumentKind::ScannedPdf);
        assert_eq!(result.primary, ExtractionMethod::Ocr);
    }

    #[test]
    fn pdf_with_images_and_text_operators_is_hybrid() {
        let analyzer = DocumentAnalyzer::new();
        let bytes = b"%PDF-1.4\n/Subtype /Image\nstream\nBT (caption) Tj ET\nendstream";
        let result = analyzer.analyze(bytes);
        assert_eq!(result.kind, DocumentKind::HybridPdf);
    }

    #[test]
    fn pdf_with_neither_signal_is_unknown() {
        let analyzer = DocumentAnalyzer::new();
        let bytes = b"%PDF-1.4\n1 0 obj\n<< >>\nendobj\n";
        let result = analyzer.analyze(bytes);
        assert_eq!(result.kind, DocumentKind::Unknown);
    }
}

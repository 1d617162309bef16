// SPDX-License-Identifier: MIT OR Apache-2.0
//! PDF extractor (§4.2 "PDF"): a four-step cascade, each step tried only
//! if the previous one failed to clear the configured character threshold.

use std::sync::Arc;

use async_trait::async_trait;
use legaldex_config::ExtractionConfig;
use legaldex_core::ExtractionResult;
use legaldex_textclean::{clean, CleanerConfig};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ExtractError;
use crate::hints::ExtractionHints;
use crate::ocr::OcrCapability;
use crate::registry::Extractor;

/// How many of the header's first bytes are searched for the `%PDF` magic
/// (§4.2: "first occurrence of `%PDF` within the first 1024 bytes").
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Minimum fraction of printable characters for the last-resort
/// readable-line heuristic to accept a candidate line.
const READABLE_LINE_PRINTABLE_RATIO: f64 = 0.70;

static TEXT_SHOWING_OPERATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(((?:[^()\\]|\\.)*)\)\s*Tj|\[((?:[^\]\\]|\\.)*)\]\s*TJ|\(((?:[^()\\]|\\.)*)\)\s*Td").expect("valid regex"));

/// Validate the header and return the byte offset the real PDF body
/// starts at, trimming any leading prefix (e.g. an email envelope).
fn validate_header(bytes: &[u8]) -> Result<usize, ExtractError> {
    let window = &bytes[..bytes.len().min(HEADER_SEARCH_WINDOW)];
    window
        .windows(4)
        .position(|w| w == b"%PDF")
        .ok_or_else(|| ExtractError::InvalidFormat {
            format: "pdf".to_string(),
            reason: "no %PDF header in first 1024 bytes".to_string(),
        })
}

/// Step (a): primary library extraction over the whole document.
fn extract_primary(bytes: &[u8]) -> Result<String, String> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| e.to_string())
}

/// Step (b): structured per-page extraction, joined with blank lines.
fn extract_structured_rows(bytes: &[u8]) -> Result<(String, u32), String> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| e.to_string())?;
    let page_count = pages.len().max(1) as u32;
    Ok((pages.join("\n\n"), page_count))
}

/// Isolate the raw bytes between each `stream`/`endstream` marker pair,
/// stripping the single EOL that follows `stream`. Steps (c) and (d) both
/// operate only on this narrower slice so that PDF structural syntax
/// (object headers, dictionaries) is never mistaken for document content.
fn content_streams(bytes: &[u8]) -> Vec<&[u8]> {
    let mut streams = Vec::new();
    let mut rest = bytes;
    while let Some(start) = find_subslice(rest, b"stream") {
        let after_marker = &rest[start + b"stream".len()..];
        let body_start = if after_marker.starts_with(b"\r\n") {
            2
        } else if after_marker.starts_with(b"\n") {
            1
        } else {
            0
        };
        let body = &after_marker[body_start..];
        let Some(end) = find_subslice(body, b"endstream") else {
            break;
        };
        streams.push(&body[..end]);
        rest = &body[end + b"endstream".len()..];
    }
    streams
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Step (c): regex scan for text-showing operators over the raw content
/// streams, a lossy fallback for structurally unusual documents the
/// library cascades above could not parse.
fn extract_via_text_operators(bytes: &[u8]) -> String {
    let mut out = String::new();
    for stream in content_streams(bytes) {
        let text = String::from_utf8_lossy(stream);
        for captures in TEXT_SHOWING_OPERATORS.captures_iter(&text) {
            let chunk = captures
                .get(1)
                .or_else(|| captures.get(2))
                .or_else(|| captures.get(3))
                .map(|m| m.as_str())
                .unwrap_or_default();
            out.push_str(chunk);
            out.push(' ');
        }
    }
    out
}

/// Step (d): within the content streams, keep only lines that are mostly
/// printable ASCII/whitespace — the last resort before declaring
/// extraction failed.
fn extract_readable_lines(bytes: &[u8]) -> String {
    content_streams(bytes)
        .into_iter()
        .map(String::from_utf8_lossy)
        .flat_map(|chunk| chunk.lines().filter(|line| is_readable_line(line)).map(str::to_string).collect::<Vec<_>>())
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_readable_line(line: &str) -> bool {
    if line.trim().is_empty() {
        return false;
    }
    let total = line.chars().count();
    let printable = line.chars().filter(|c| c.is_ascii_graphic() || c.is_whitespace()).count();
    (printable as f64 / total as f64) >= READABLE_LINE_PRINTABLE_RATIO
}

/// Extracts text from a PDF byte stream via the cascade described in §4.2,
/// falling back to an optional [`OcrCapability`] when every library-based
/// step still leaves the text below the configured threshold.
pub struct PdfExtractor {
    config: ExtractionConfig,
    cleaner_config: CleanerConfig,
    ocr: Option<Arc<dyn OcrCapability>>,
}

impl PdfExtractor {
    /// Build an extractor with no OCR fallback configured.
    #[must_use]
    pub fn new(config: ExtractionConfig, cleaner_config: CleanerConfig) -> Self {
        Self { config, cleaner_config, ocr: None }
    }

    /// Attach an OCR capability, consulted when every cascade step still
    /// falls below `ocr_trigger_threshold`.
    #[must_use]
    pub fn with_ocr(mut self, ocr: Arc<dyn OcrCapability>) -> Self {
        self.ocr = Some(ocr);
        self
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new(ExtractionConfig::default(), CleanerConfig::default())
    }
}

#[async_trait]
impl Extractor for PdfExtractor {
    fn supported_formats(&self) -> &'static [&'static str] {
        &["pdf"]
    }

    async fn extract(&self, bytes: &[u8], _hints: &ExtractionHints) -> Result<ExtractionResult, ExtractError> {
        let start = std::time::Instant::now();
        let offset = validate_header(bytes)?;
        let bytes = &bytes[offset..];

        let mut methods_tried = Vec::new();
        let mut best_text = String::new();
        let mut best_page_count = 1u32;
        let mut succeeded_method: Option<&'static str> = None;

        methods_tried.push("primary");
        if let Ok(text) = extract_primary(bytes) {
            if text.chars().count() >= self.config.primary_char_threshold {
                best_text = text;
                succeeded_method = Some("primary");
            } else if text.chars().count() > best_text.chars().count() {
                best_text = text;
            }
        }

        if succeeded_method.is_none() {
            methods_tried.push("structured_rows");
            if let Ok((text, page_count)) = extract_structured_rows(bytes) {
                if text.chars().count() >= self.config.primary_char_threshold {
                    best_text = text;
                    best_page_count = page_count;
                    succeeded_method = Some("structured_rows");
                } else if text.chars().count() > best_text.chars().count() {
                    best_text = text;
                    best_page_count = page_count;
                }
            }
        }

        if succeeded_method.is_none() {
            methods_tried.push("text_operators");
            let text = extract_via_text_operators(bytes);
            if text.chars().count() >= self.config.primary_char_threshold {
                succeeded_method = Some("text_operators");
                best_text = text;
            } else if text.chars().count() > best_text.chars().count() {
                best_text = text;
            }
        }

        if succeeded_method.is_none() {
            methods_tried.push("readable_lines");
            let text = extract_readable_lines(bytes);
            if text.chars().count() > best_text.chars().count() {
                best_text = text;
            }
            if !best_text.trim().is_empty() {
                succeeded_method = Some("readable_lines");
            }
        }

        if best_text.chars().count() < self.config.ocr_trigger_threshold {
            if let Some(ocr) = &self.ocr {
                methods_tried.push("ocr");
                if let Ok(pages) = ocr.recognize_pages(bytes, &self.config.ocr).await {
                    let ocr_text = pages.iter().map(|p| p.text.as_str()).collect::<Vec<_>>().join("\n\n");
                    if ocr_text.chars().count() > best_text.chars().count() {
                        best_text = ocr_text;
                        best_page_count = pages.len().max(1) as u32;
                        succeeded_method = Some("ocr");
                    }
                }
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;

        let Some(method) = succeeded_method else {
            return Err(ExtractError::ExtractionFailed {
                cause: format!("no cascade step produced usable text (tried {})", methods_tried.join(", ")),
                format: "pdf".to_string(),
                partial_text: if best_text.trim().is_empty() { None } else { Some(best_text) },
            });
        };

        let cleaned = clean(&best_text, &self.cleaner_config);
        let mut result = ExtractionResult::from_text(cleaned, best_page_count, duration_ms).with_method(method);
        result.metadata.insert(
            "methods_tried".to_string(),
            serde_json::Value::Array(methods_tried.into_iter().map(|m| serde_json::Value::String(m.to_string())).collect()),
        );
        Ok(result)
    }
}

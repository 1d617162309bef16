// SPDX-License-Identifier: MIT OR Apache-2.0
//! §6 "analyse redactions": runs the [`legaldex_redaction`] detector over
//! either freshly-extracted bytes or an already-indexed document's text.

use legaldex_extract::enhanced::EnhancedExtractionService;
use legaldex_extract::ExtractionHints;
use legaldex_ports::SearchEngine;
use legaldex_redaction::{AiRedactionDetector, Redaction};

use crate::ApiError;

/// Input to a §6 "analyse redactions" call: either raw bytes to extract
/// text from first, or the id of an already-indexed document.
pub enum RedactionInput {
    /// Freshly-uploaded bytes, not yet ingested.
    Bytes {
        /// Raw file bytes.
        bytes: Vec<u8>,
        /// Original file name, used to resolve an extractor.
        filename: String,
    },
    /// An already-indexed document, looked up by id.
    DocumentId(String),
}

/// Run a §6 "analyse redactions" call: resolve the input to plain text
/// (extracting it if raw bytes were given, or fetching it from the
/// search engine if a document id was given), then run the enumerated
/// pattern rules and, if supplied, the optional AI detector (§4.11).
///
/// No page/bbox information is threaded through here — this crate's
/// extractors don't currently produce a per-glyph position index, so
/// every finding falls back to text-span overlap for merging and reports
/// page `1` (see [`legaldex_redaction::detect`]).
///
/// # Errors
///
/// Returns [`ApiError::Extraction`]/[`ApiError::Unsupported`]/
/// [`ApiError::Validation`] if bytes could not be turned into text, or
/// [`ApiError::NotFound`] if the requested document id is unknown.
pub async fn analyse_redactions(
    extraction: &EnhancedExtractionService,
    engine: &dyn SearchEngine,
    ai: Option<&dyn AiRedactionDetector>,
    input: RedactionInput,
) -> Result<Vec<Redaction>, ApiError> {
    let text = match input {
        RedactionInput::Bytes { bytes, filename } => {
            let hints = ExtractionHints::from_filename(filename);
            let result = extraction.extract(&bytes, &hints).await?;
            if !result.success {
                return Err(ApiError::Extraction(result.error_message.unwrap_or_else(|| "extraction failed".to_string())));
            }
            result.text
        }
        RedactionInput::DocumentId(id) => engine.get(&id).await?.text,
    };

    Ok(legaldex_redaction::detect(&text, None, ai).await?)
}

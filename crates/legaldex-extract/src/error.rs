// SPDX-License-Identifier: MIT OR Apache-2.0
//! Extraction failure modes (§4.2).

use legaldex_core::ErrorKind;

/// Errors raised by an [`crate::Extractor`] or the [`crate::ExtractorRegistry`].
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The byte stream does not look like the claimed format (e.g. a PDF
    /// missing its `%PDF` header).
    #[error("invalid {format} format: {reason}")]
    InvalidFormat {
        /// Format tag the extractor was asked to handle.
        format: String,
        /// Why the bytes were rejected.
        reason: String,
    },
    /// No registered extractor handles the resolved format.
    #[error("unsupported format: {format}")]
    UnsupportedFormat {
        /// The format string that could not be resolved.
        format: String,
    },
    /// Extraction started but failed partway through.
    #[error("extraction failed for {format}: {cause}")]
    ExtractionFailed {
        /// Underlying cause.
        cause: String,
        /// Format tag being processed.
        format: String,
        /// Any text recovered before the failure, if useful to the caller.
        partial_text: Option<String>,
    },
}

impl ExtractError {
    /// Map this error onto the coarse [`ErrorKind`] taxonomy used by the
    /// pipeline engine.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidFormat { .. } => ErrorKind::Validation,
            Self::UnsupportedFormat { .. } => ErrorKind::Unsupported,
            Self::ExtractionFailed { .. } => ErrorKind::Extraction,
        }
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`ApiError`]: the error kinds named against each operation in §6's
//! HTTP-boundary table, collapsed onto one enum since every handler in
//! this crate is a thin typed wrapper over the lower-level crates'
//! operations.

use legaldex_batch::BatchError;
use legaldex_core::ErrorKind;
use legaldex_extract::ExtractError;
use legaldex_ports::SearchEngineError;
use legaldex_redaction::RedactionError;

/// Error surfaced by a handler in this crate. Callers building an HTTP
/// transport on top map each variant onto their own status-code/JSON
/// convention; this crate only distinguishes the kinds the §6 table
/// names.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Caller-supplied input failed a contract.
    #[error("validation failed: {0}")]
    Validation(String),
    /// No extractor is registered for the resolved format.
    #[error("unsupported format: {0}")]
    Unsupported(String),
    /// A byte stream could not be parsed into text.
    #[error("extraction failed: {0}")]
    Extraction(String),
    /// The classifier failed.
    #[error("classification failed: {0}")]
    Classification(String),
    /// The engine (search or aggregate) rejected the request.
    #[error("search engine error: {0}")]
    Engine(String),
    /// No job/document exists with the requested id.
    #[error("not found: {0}")]
    NotFound(String),
    /// A batch job has already reached a terminal state and cannot be
    /// cancelled.
    #[error("job {0} is already in a terminal state")]
    TerminalState(String),
}

impl ApiError {
    /// Map onto the shared error-kind taxonomy (§7), for callers that want
    /// to branch on retryability rather than match every variant.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Unsupported(_) => ErrorKind::Unsupported,
            Self::Extraction(_) => ErrorKind::Extraction,
            Self::Classification(_) => ErrorKind::Classification,
            Self::Engine(_) => ErrorKind::Index,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::TerminalState(_) => ErrorKind::Validation,
        }
    }
}

impl From<BatchError> for ApiError {
    fn from(err: BatchError) -> Self {
        match err.kind() {
            ErrorKind::NotFound => Self::NotFound(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}

impl From<SearchEngineError> for ApiError {
    fn from(err: SearchEngineError) -> Self {
        match err.kind() {
            ErrorKind::NotFound => Self::NotFound(err.to_string()),
            _ => Self::Engine(err.to_string()),
        }
    }
}

impl From<ExtractError> for ApiError {
    fn from(err: ExtractError) -> Self {
        match err.kind() {
            ErrorKind::Validation => Self::Validation(err.to_string()),
            ErrorKind::Unsupported => Self::Unsupported(err.to_string()),
            _ => Self::Extraction(err.to_string()),
        }
    }
}

impl From<RedactionError> for ApiError {
    fn from(err: RedactionError) -> Self {
        Self::Classification(err.to_string())
    }
}

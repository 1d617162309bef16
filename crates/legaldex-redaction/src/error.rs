// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`RedactionError`]: faults raised by the optional AI detector leg of
//! [`crate::detect`].

use legaldex_core::ErrorKind;

/// Errors raised by an [`crate::AiRedactionDetector`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum RedactionError {
    /// The detector could not be reached or refused the request.
    #[error("sensitive-span detector unavailable: {reason}")]
    Unavailable {
        /// Human-readable cause.
        reason: String,
    },
    /// The detector responded but the payload could not be parsed into
    /// spans.
    #[error("sensitive-span detector returned a malformed response: {reason}")]
    Malformed {
        /// Human-readable cause.
        reason: String,
    },
}

impl RedactionError {
    /// Map onto the shared error-kind taxonomy (§7): both sub-kinds are
    /// classification-family failures, since the AI detector is the same
    /// kind of external collaborator as the classifier.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Classification
    }
}

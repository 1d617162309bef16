// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error taxonomy for the ingestion core.
//!
//! Every error carries one of the kinds below. Kinds are categories, not
//! concrete error types — each crate in the workspace defines its own
//! `thiserror` enum for its failure modes and maps them onto a [`ErrorKind`]
//! at the boundary so that upstream callers (the Pipeline Engine, the Batch
//! Job Manager) can discriminate retryability without inspecting crate-
//! specific error types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse category every error in the core belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller-supplied input failed a contract (size, format, required field).
    Validation,
    /// Requested format/operation is not available.
    Unsupported,
    /// A byte stream could not be parsed into text.
    Extraction,
    /// The classifier failed. See [`ClassificationFailure`] for the sub-kind.
    Classification,
    /// Object-store I/O failed.
    Storage,
    /// Search-engine rejection.
    Index,
    /// Caller deadline or explicit cancellation — not a failure.
    Cancelled,
    /// Locally produced by the rate limiter.
    RateLimited,
    /// An id is unknown to the engine, store, or job manager.
    NotFound,
    /// An internal invariant was violated.
    Fatal,
}

impl ErrorKind {
    /// Whether an error of this kind is safe for the Batch Job Manager to
    /// retry with bounded exponential backoff.
    ///
    /// Mirrors §7: `Classification` retries only for its `Unavailable` /
    /// `QuotaExceeded` sub-kinds (see [`ClassificationFailure::is_retryable`]),
    /// `Storage` retries up to a configured limit, `Index` retries only on
    /// transient rejections (the caller must consult [`IndexFailure`] for
    /// that distinction — this coarse check assumes transient).
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Storage | Self::Index | Self::RateLimited)
    }

    /// Whether an error of this kind counts against a job's failure
    /// statistics, or is instead recorded but excluded (cancellation is
    /// never counted as a failure against success rate, per §5).
    #[must_use]
    pub fn counts_as_failure(self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

/// Sub-kind for [`ErrorKind::Classification`] failures, per §4.3/§7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationFailure {
    /// The provider could not be reached or refused the request outright.
    Unavailable,
    /// The provider's usage quota was exhausted.
    QuotaExceeded,
    /// The provider responded but the payload could not be parsed into a
    /// [`crate::ClassificationResult`].
    Malformed,
}

impl ClassificationFailure {
    /// `Unavailable` and `QuotaExceeded` are retryable; `Malformed` is not
    /// (retrying an adapter that sent garbage will send garbage again).
    #[must_use]
    pub fn is_retryable(self) -> bool {
        !matches!(self, Self::Malformed)
    }
}

/// Sub-kind for [`ErrorKind::Index`] failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexFailure {
    /// A transient engine error (5xx-like); safe to retry.
    Transient,
    /// A permanent mapping conflict; retrying will not help.
    Permanent,
}

/// Wraps an underlying cause with the pipeline stage and document id it
/// occurred in, per §7's propagation rule: `{stage, document_id, cause}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageError {
    /// Name of the stage the error occurred in (`"extract"`, `"classify"`, …).
    pub stage: String,
    /// Identifier of the document being processed, if one had been assigned
    /// yet (it may not have, if `Validate` itself failed).
    pub document_id: Option<String>,
    /// Coarse error kind for retry/accounting decisions.
    pub kind: ErrorKind,
    /// Human-readable cause, preserving the original error's `Display`.
    pub cause: String,
}

impl StageError {
    /// Construct a new stage error.
    pub fn new(stage: impl Into<String>, kind: ErrorKind, cause: impl fmt::Display) -> Self {
        Self {
            stage: stage.into(),
            document_id: None,
            kind,
            cause: cause.to_string(),
        }
    }

    /// Attach a document id after construction (the id is often only known
    /// once `Validate` has assigned or confirmed one).
    #[must_use]
    pub fn with_document_id(mut self, id: impl Into<String>) -> Self {
        self.document_id = Some(id.into());
        self
    }
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.document_id {
            Some(id) => write!(f, "[{}] document {id}: {}", self.stage, self.cause),
            None => write!(f, "[{}]: {}", self.stage, self.cause),
        }
    }
}

impl std::error::Error for StageError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_is_not_retryable_but_not_a_failure_either() {
        assert!(!ErrorKind::Cancelled.is_retryable());
        assert!(!ErrorKind::Cancelled.counts_as_failure());
    }

    #[test]
    fn classification_malformed_is_not_retryable() {
        assert!(!ClassificationFailure::Malformed.is_retryable());
        assert!(ClassificationFailure::Unavailable.is_retryable());
        assert!(ClassificationFailure::QuotaExceeded.is_retryable());
    }

    #[test]
    fn stage_error_display_includes_document_id_when_present() {
        let err = StageError::new("extract", ErrorKind::Extraction, "bad header")
            .with_document_id("doc-1");
        assert_eq!(err.to_string(), "[extract] document doc-1: bad header");
    }

    #[test]
    fn stage_error_display_without_document_id() {
        let err = StageError::new("validate", ErrorKind::Validation, "missing filename");
        assert_eq!(err.to_string(), "[validate]: missing filename");
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`IngestRequest`]/[`IngestOptions`] (the pipeline's inputs) and
//! [`PipelineContext`] (the mutable state threaded through every stage,
//! §4.5/§9 "cross-stage metadata propagation").

use std::collections::BTreeMap;
use std::time::Duration;

use legaldex_core::{ClassificationResult, Document, ExtractionResult};
use serde_json::Value;
use tokio::time::Instant;

/// Well-known metadata keys every stage reads/writes on
/// [`PipelineContext::metadata`] (§4.5). Keeping these as named constants
/// avoids typo drift between stages that otherwise only agree on an
/// untyped string key.
pub mod metadata_keys {
    pub const EXTRACTED_TEXT: &str = "extracted_text";
    pub const WORD_COUNT: &str = "word_count";
    pub const PAGE_COUNT: &str = "page_count";
    pub const DOCUMENT_TYPE: &str = "document_type";
    pub const LEGAL_CATEGORY: &str = "legal_category";
    pub const CONFIDENCE: &str = "confidence";
    pub const FILING_DATE: &str = "filing_date";
    pub const EVENT_DATE: &str = "event_date";
    pub const HEARING_DATE: &str = "hearing_date";
    pub const DECISION_DATE: &str = "decision_date";
    pub const SERVED_DATE: &str = "served_date";
    pub const STORAGE_PATH: &str = "storage_path";
    pub const STORAGE_URL: &str = "storage_url";
}

/// Per-request options recognised by the pipeline engine and, when the
/// request originates from a batch submission, mirrored from the job's
/// [`legaldex_batch`]-equivalent submit options (§4.5/§4.7).
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Bypass the Classify stage's external call; proceed with a defaulted
    /// classification, and tolerate an Extract failure by continuing with
    /// empty text rather than aborting (§4.5).
    pub skip_ai: bool,
    /// Proceed to the Index stage's engine call even when classification
    /// failed or was skipped (§4.5/§4.7).
    pub force_index: bool,
    /// Whether the Index stage should run at all. Mirrors the batch
    /// `update_index` option; single-document ingestion requests normally
    /// set this to `true`.
    pub update_index: bool,
    /// Route external calls (classifier, object store, engine) through a
    /// named rate-limit bucket.
    pub rate_limit_key: Option<String>,
    /// Explicitly request a classifier provider by name, bypassing the
    /// router's "first configured" default.
    pub classifier_provider: Option<String>,
}

/// A single document submitted for processing.
#[derive(Debug, Clone)]
pub struct IngestRequest {
    /// Caller-provided stable identifier. When absent, the Validate stage
    /// mints a new one (§4.4).
    pub id: Option<String>,
    /// Original uploaded file name.
    pub original_file_name: String,
    /// Upload content type (MIME), used as a fallback extractor hint.
    pub content_type: String,
    /// Raw uploaded bytes.
    pub bytes: Vec<u8>,
    /// Request options.
    pub options: IngestOptions,
}

/// Mutable state threaded through every [`crate::Processor`] in a
/// pipeline run. Stages communicate only through [`PipelineContext::metadata`]
/// (an untyped string → JSON value map, per §9's design note) plus the few
/// typed slots below that later stages need in their native type rather
/// than re-parsed from JSON.
pub struct PipelineContext {
    /// The inbound request, including caller options.
    pub request: IngestRequest,
    /// Identifier assigned (or confirmed) by the Validate stage.
    pub document_id: Option<String>,
    /// Untyped cross-stage metadata map (§4.5's enumerated well-known keys).
    pub metadata: BTreeMap<String, Value>,
    /// Raw extraction output, set by the Extract stage.
    pub extraction: Option<ExtractionResult>,
    /// Raw (post-normalisation) classification output, set by the Classify
    /// stage. Remains `None` when `skip_ai` is set or the provider call
    /// failed.
    pub classification: Option<ClassificationResult>,
    /// Whether the Classify stage actually dispatched to a provider and
    /// received a result (`false` under `skip_ai` or on failure).
    pub classification_applied: bool,
    /// The assembled canonical document, set by the Store stage (or by
    /// Index directly, if Store did not run).
    pub document: Option<Document>,
    /// Whether the Store stage's object-store PUT succeeded.
    pub stored: bool,
    /// Engine-assigned id, set by the Index stage on success.
    pub index_id: Option<String>,
    /// Human-readable cause, set by the Index stage on failure.
    pub index_error: Option<String>,
    /// Deadline for the whole pipeline run (§4.5 per-request timeout).
    pub deadline: Instant,
}

impl PipelineContext {
    /// Build a fresh context for `request`, with a deadline `timeout` from
    /// now.
    #[must_use]
    pub fn new(request: IngestRequest, timeout: Duration) -> Self {
        Self {
            document_id: request.id.clone(),
            request,
            metadata: BTreeMap::new(),
            extraction: None,
            classification: None,
            classification_applied: false,
            document: None,
            stored: false,
            index_id: None,
            index_error: None,
            deadline: Instant::now() + timeout,
        }
    }

    /// Whether the pipeline's overall deadline has already elapsed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Remaining time before [`PipelineContext::deadline`], or
    /// [`Duration::ZERO`] if already expired.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Snapshot this context for a stage that will run concurrently with
    /// another (§4.5's Store/Index fan-out): each concurrent branch gets
    /// its own copy of everything accumulated so far and mutates it
    /// independently; the engine merges the two afterwards.
    #[must_use]
    pub fn fork(&self) -> Self {
        Self {
            request: self.request.clone(),
            document_id: self.document_id.clone(),
            metadata: self.metadata.clone(),
            extraction: self.extraction.clone(),
            classification: self.classification.clone(),
            classification_applied: self.classification_applied,
            document: self.document.clone(),
            stored: self.stored,
            index_id: self.index_id.clone(),
            index_error: self.index_error.clone(),
            deadline: self.deadline,
        }
    }
}

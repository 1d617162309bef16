// SPDX-License-Identifier: MIT OR Apache-2.0
//! The [`Processor`] capability every pipeline stage implements (§4.5/§9),
//! and the result types the engine accumulates as stages run.

use async_trait::async_trait;
use legaldex_core::{ClassificationResult, Document, StageError};

use crate::context::PipelineContext;

/// The five pipeline stages, in the fixed order they run (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    /// Input-shape validation.
    Validate,
    /// Byte stream → plain text.
    Extract,
    /// Plain text → structured classification.
    Classify,
    /// Persist bytes to the object store.
    Store,
    /// Persist the document to the search engine.
    Index,
}

impl StageKind {
    /// Lowercase tag used in [`StepRecord::stage`] and `StageError::stage`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::Extract => "extract",
            Self::Classify => "classify",
            Self::Store => "store",
            Self::Index => "index",
        }
    }
}

/// What a stage's [`Processor::process`] call produced.
pub enum StageOutcome {
    /// The stage did what it was asked to.
    Success,
    /// The stage failed, but the failure is recoverable per the stage's
    /// §4.5 policy — the engine records it and lets later stages proceed
    /// with whatever defaults the context already carries.
    Degraded {
        /// Human-readable reason, recorded on the step.
        reason: String,
    },
    /// The stage failed in a way its §4.5 policy marks fatal — the engine
    /// aborts the remaining pipeline.
    Fatal(StageError),
    /// The stage observed the pipeline's deadline before it could finish.
    Cancelled,
}

/// A pipeline stage. Implementations read/write [`PipelineContext`] rather
/// than returning strongly-typed stage output, so the engine can iterate a
/// homogeneous `Vec<Arc<dyn Processor>>` (§9: "avoid deep hierarchies —
/// stages are siblings").
#[async_trait]
pub trait Processor: Send + Sync {
    /// Which of the five stages this processor implements.
    fn kind(&self) -> StageKind;

    /// Run the stage, mutating `ctx` with whatever it produced.
    async fn process(&self, ctx: &mut PipelineContext) -> StageOutcome;

    /// Whether the stage's external dependency (if any) currently looks
    /// reachable. Stages with no external dependency (e.g. Validate)
    /// always report healthy.
    fn is_healthy(&self) -> bool {
        true
    }
}

/// One entry in [`ProcessResult::steps`] — recorded for every stage
/// actually attempted, in request order, even on failure (§4.5/§8).
#[derive(Debug, Clone)]
pub struct StepRecord {
    /// Which stage this step records.
    pub stage: StageKind,
    /// Wall-clock duration of the attempt, in milliseconds.
    pub duration_ms: u64,
    /// Whether the stage reported [`StageOutcome::Success`].
    pub success: bool,
    /// Error text, present for [`StageOutcome::Degraded`]/[`StageOutcome::Fatal`].
    pub error: Option<String>,
    /// Whether this step was cut short by the pipeline deadline.
    pub cancelled: bool,
}

/// Outcome of running one [`crate::engine::Pipeline`] over one
/// [`crate::context::IngestRequest`] (§4.5/§7: "the `ProcessResult` is the
/// single source of truth with per-stage booleans").
#[derive(Debug, Clone)]
pub struct ProcessResult {
    /// Identifier assigned during Validate, if the pipeline got that far.
    pub document_id: Option<String>,
    /// Every stage attempted, in order.
    pub steps: Vec<StepRecord>,
    /// The assembled document, if Store or Index produced one.
    pub document: Option<Document>,
    /// Whether the Store stage's object-store PUT succeeded.
    pub stored: bool,
    /// Whether the Index stage's engine call succeeded.
    pub indexed: bool,
    /// Engine-assigned id, present when `indexed` is `true`.
    pub index_id: Option<String>,
    /// Cause of an Index failure, present when `indexed` is `false` but
    /// indexing was attempted.
    pub index_error: Option<String>,
    /// Classification result, when the Classify stage actually dispatched
    /// to a provider and it succeeded. `None` under `skip_ai` or failure.
    pub classification: Option<ClassificationResult>,
    /// Whether the Classify stage actually ran an external classification
    /// (as opposed to defaulting under `skip_ai` or failing).
    pub classification_applied: bool,
    /// Whether the pipeline stopped because its deadline elapsed.
    pub cancelled: bool,
    /// The fatal error that aborted the pipeline, if any.
    pub fatal_error: Option<StageError>,
}

impl ProcessResult {
    /// Whether every stage that ran succeeded and nothing was fatal.
    #[must_use]
    pub fn fully_succeeded(&self) -> bool {
        self.fatal_error.is_none() && !self.cancelled && self.steps.iter().all(|s| s.success)
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]
//! The ordered Validate → Extract → Classify → Store → Index pipeline
//! (§4.5): a [`Processor`] per stage, a [`PipelineContext`] threading
//! cross-stage state between them, and a [`Pipeline`] engine applying the
//! per-stage failure policy and optional batch fan-out.

pub mod assemble;
pub mod context;
mod engine;
pub mod stage;
pub mod stages;

pub use context::{IngestOptions, IngestRequest, PipelineContext};
pub use engine::{BatchResult, Pipeline, DEFAULT_TIMEOUT};
pub use stage::{Processor, ProcessResult, StageKind, StageOutcome, StepRecord};

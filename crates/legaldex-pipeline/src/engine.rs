// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`Pipeline`]: runs the ordered Validate/Extract/Classify/Store/Index
//! stages over one request, or fans a batch of requests out over
//! `legaldex-workerpool` (§4.5).

use std::sync::Arc;
use std::time::Duration;

use legaldex_core::{ErrorKind, StageError};
use legaldex_workerpool::{Job, PoolError, WorkerPool, WorkerPoolConfig};
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::warn;

use crate::context::{IngestRequest, PipelineContext};
use crate::stage::{Processor, StageKind, StageOutcome, StepRecord};
use crate::ProcessResult;

/// Default per-request timeout when a [`Pipeline`] is built with
/// [`Pipeline::new`] directly (§4.5).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Outcome of [`Pipeline::process_batch`]: one [`ProcessResult`] per input,
/// in submission order, plus aggregate counters (§4.5).
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// Per-document results, in the same order as the submitted requests.
    pub results: Vec<ProcessResult>,
    /// Total documents submitted.
    pub total: usize,
    /// Documents for which every attempted stage succeeded.
    pub success_count: usize,
    /// Documents with at least one degraded or fatal stage.
    pub error_count: usize,
}

/// Runs an ordered list of stages over a request. Stages are siblings
/// behind a single `Processor` trait object (§9) — the engine special-
/// cases only one adjacency, an immediately-following `Store` → `Index`
/// pair, which it runs concurrently via [`tokio::join!`] since both
/// depend only on `Classify`'s output and neither on the other's (§4.5).
#[derive(Clone)]
pub struct Pipeline {
    stages: Vec<Arc<dyn Processor>>,
    timeout: Duration,
}

impl Pipeline {
    /// Build a pipeline over `stages`, run in the given order, with the
    /// default 300s per-request timeout.
    #[must_use]
    pub fn new(stages: Vec<Arc<dyn Processor>>) -> Self {
        Self { stages, timeout: DEFAULT_TIMEOUT }
    }

    /// Override the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run_stage(stage: &Arc<dyn Processor>, ctx: &mut PipelineContext) -> (StepRecord, StageOutcome) {
        let kind = stage.kind();
        let remaining = ctx.remaining();
        if remaining.is_zero() {
            let step = StepRecord {
                stage: kind,
                duration_ms: 0,
                success: false,
                error: Some("pipeline deadline already elapsed".to_string()),
                cancelled: true,
            };
            return (step, StageOutcome::Cancelled);
        }

        let start = Instant::now();
        let outcome = match tokio::time::timeout(remaining, stage.process(ctx)).await {
            Ok(outcome) => outcome,
            Err(_) => StageOutcome::Cancelled,
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        let step = match &outcome {
            StageOutcome::Success => StepRecord { stage: kind, duration_ms, success: true, error: None, cancelled: false },
            StageOutcome::Degraded { reason } => {
                StepRecord { stage: kind, duration_ms, success: false, error: Some(reason.clone()), cancelled: false }
            }
            StageOutcome::Fatal(err) => {
                StepRecord { stage: kind, duration_ms, success: false, error: Some(err.to_string()), cancelled: false }
            }
            StageOutcome::Cancelled => StepRecord {
                stage: kind,
                duration_ms,
                success: false,
                error: Some("stage cancelled: pipeline deadline elapsed".to_string()),
                cancelled: true,
            },
        };
        (step, outcome)
    }

    /// Run every stage over `request`, applying the §4.5 failure policy:
    /// a [`StageOutcome::Fatal`] aborts the remaining stages; everything
    /// else (`Success`/`Degraded`) lets the pipeline continue. An adjacent
    /// `Store` → `Index` pair runs concurrently (see the type's doc).
    pub async fn process_document(&self, request: IngestRequest) -> ProcessResult {
        let mut ctx = PipelineContext::new(request, self.timeout);
        let mut steps = Vec::with_capacity(self.stages.len());
        let mut fatal_error: Option<StageError> = None;
        let mut cancelled = false;

        let mut i = 0;
        while i < self.stages.len() {
            if ctx.is_expired() {
                cancelled = true;
                break;
            }

            let is_store_index_pair = self.stages[i].kind() == StageKind::Store
                && i + 1 < self.stages.len()
                && self.stages[i + 1].kind() == StageKind::Index;

            if is_store_index_pair {
                let mut store_ctx = ctx.fork();
                let mut index_ctx = ctx.fork();
                let (store_result, index_result) = tokio::join!(
                    Self::run_stage(&self.stages[i], &mut store_ctx),
                    Self::run_stage(&self.stages[i + 1], &mut index_ctx),
                );

                ctx.stored = store_ctx.stored;
                ctx.index_id = index_ctx.index_id;
                ctx.index_error = index_ctx.index_error;
                ctx.document = store_ctx.document.or(index_ctx.document);

                if matches!(store_result.1, StageOutcome::Cancelled) || matches!(index_result.1, StageOutcome::Cancelled) {
                    cancelled = true;
                }
                steps.push(store_result.0);
                steps.push(index_result.0);

                if cancelled {
                    break;
                }
                i += 2;
                continue;
            }

            let (step, outcome) = Self::run_stage(&self.stages[i], &mut ctx).await;
            steps.push(step);
            match outcome {
                StageOutcome::Success | StageOutcome::Degraded { .. } => {}
                StageOutcome::Fatal(err) => {
                    fatal_error = Some(err);
                    break;
                }
                StageOutcome::Cancelled => {
                    cancelled = true;
                    break;
                }
            }
            i += 1;
        }

        ProcessResult {
            document_id: ctx.document_id.clone(),
            steps,
            document: ctx.document.clone(),
            stored: ctx.stored,
            indexed: ctx.index_id.is_some(),
            index_id: ctx.index_id.clone(),
            index_error: ctx.index_error.clone(),
            classification: ctx.classification.clone(),
            classification_applied: ctx.classification_applied,
            cancelled,
            fatal_error,
        }
    }

    /// Run [`Pipeline::process_document`] over every request in `requests`,
    /// fanned out over a [`WorkerPool`] with `max_workers` concurrency.
    /// Returns one result per input, in submission order.
    pub async fn process_batch(&self, requests: Vec<IngestRequest>, max_workers: usize) -> BatchResult {
        let total = requests.len();
        let pool = WorkerPool::new(WorkerPoolConfig { max_workers: max_workers.max(1), queue_size: total.max(1) });
        pool.start();

        enum Pending {
            Receiver(oneshot::Receiver<ProcessResult>),
            Immediate(ProcessResult),
        }

        let mut pending = Vec::with_capacity(total);
        for (idx, request) in requests.into_iter().enumerate() {
            let (tx, rx) = oneshot::channel();
            let pipeline = self.clone();
            let job = Job::new(format!("ingest-{idx}"), async move {
                let result = pipeline.process_document(request).await;
                let _ = tx.send(result);
            });
            match pool.submit(job) {
                Ok(()) => pending.push(Pending::Receiver(rx)),
                Err(PoolError::QueueFull { max }) => {
                    warn!(target: "legaldex.pipeline", idx, max, "batch worker queue full, recording synthetic failure");
                    let err = StageError::new(StageKind::Validate.as_str(), ErrorKind::Fatal, format!("batch queue full (max {max})"));
                    pending.push(Pending::Immediate(ProcessResult {
                        document_id: None,
                        steps: Vec::new(),
                        document: None,
                        stored: false,
                        indexed: false,
                        index_id: None,
                        index_error: None,
                        classification: None,
                        classification_applied: false,
                        cancelled: false,
                        fatal_error: Some(err),
                    }));
                }
            }
        }

        pool.stop(tokio::time::Instant::now().into_std() + self.timeout + Duration::from_secs(5)).await;

        let mut results = Vec::with_capacity(total);
        for item in pending {
            match item {
                Pending::Receiver(rx) => match rx.await {
                    Ok(result) => results.push(result),
                    Err(_) => {
                        let err = StageError::new(StageKind::Validate.as_str(), ErrorKind::Cancelled, "job abandoned before completion");
                        results.push(ProcessResult {
                            document_id: None,
                            steps: Vec::new(),
                            document: None,
                            stored: false,
                            indexed: false,
                            index_id: None,
                            index_error: None,
                            classification: None,
                            classification_applied: false,
                            cancelled: true,
                            fatal_error: Some(err),
                        });
                    }
                },
                Pending::Immediate(result) => results.push(result),
            }
        }

        let success_count = results.iter().filter(|r| r.fully_succeeded()).count();
        BatchResult { total, success_count, error_count: total - success_count, results }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration as StdDuration;

    use legaldex_config::ExtractionConfig;
    use legaldex_extract::{default_registry, enhanced::EnhancedExtractionService};
    use legaldex_ports::{InMemoryObjectStore, InMemorySearchEngine};
    use legaldex_textclean::CleanerConfig;

    use crate::context::IngestOptions;
    use crate::stages::{ExtractProcessor, IndexProcessor, StoreProcessor, ValidateProcessor};

    use super::*;

    fn request(name: &str, bytes: &[u8]) -> IngestRequest {
        IngestRequest {
            id: None,
            original_file_name: name.to_string(),
            content_type: "text/plain".to_string(),
            bytes: bytes.to_vec(),
            options: IngestOptions { update_index: true, force_index: true, skip_ai: true, ..IngestOptions::default() },
        }
    }

    fn pipeline_without_classify() -> Pipeline {
        let registry = default_registry(CleanerConfig::default(), ExtractionConfig::default());
        let service = Arc::new(EnhancedExtractionService::new(registry, ExtractionConfig::default(), CleanerConfig::default()));
        let stages: Vec<Arc<dyn Processor>> = vec![
            Arc::new(ValidateProcessor::new()),
            Arc::new(ExtractProcessor::new(service)),
            Arc::new(StoreProcessor::new(Arc::new(InMemoryObjectStore::new()), "Civil")),
            Arc::new(IndexProcessor::new(Arc::new(InMemorySearchEngine::new()), "Civil")),
        ];
        Pipeline::new(stages)
    }

    #[tokio::test]
    async fn skip_ai_with_force_index_stores_and_indexes_without_classification() {
        let pipeline = pipeline_without_classify();
        let result = pipeline.process_document(request("notice.txt", b"Notice of hearing.")).await;
        assert!(result.stored);
        assert!(result.indexed);
        assert!(result.classification.is_none());
        assert!(result.fatal_error.is_none());
    }

    #[tokio::test]
    async fn process_batch_preserves_submission_order_and_counts() {
        let pipeline = pipeline_without_classify();
        let requests = vec![
            request("a.txt", b"Alpha document text."),
            request("b.txt", b"Bravo document text."),
            request("c.txt", b"Charlie document text."),
        ];
        let batch = pipeline.process_batch(requests, 2).await;
        assert_eq!(batch.total, 3);
        assert_eq!(batch.results.len(), 3);
        assert_eq!(batch.success_count, 3);
        assert_eq!(batch.error_count, 0);
    }

    #[tokio::test]
    async fn validate_failure_aborts_before_later_stages_run() {
        let pipeline = pipeline_without_classify();
        let result = pipeline.process_document(request("", b"bytes")).await;
        assert!(result.fatal_error.is_some());
        assert!(!result.stored);
        assert!(!result.indexed);
        assert_eq!(result.steps.len(), 1);
    }

    #[tokio::test]
    async fn expired_deadline_marks_remaining_stages_cancelled() {
        let pipeline = pipeline_without_classify().with_timeout(StdDuration::from_nanos(1));
        tokio::time::sleep(StdDuration::from_millis(5)).await;
        let result = pipeline.process_document(request("notice.txt", b"text")).await;
        assert!(result.cancelled);
    }
}

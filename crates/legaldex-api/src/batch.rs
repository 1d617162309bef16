// SPDX-License-Identifier: MIT OR Apache-2.0
//! §6 "submit batch" / "get batch status/results" / "cancel batch": thin
//! wrappers over [`BatchManager`] that add the one check it doesn't make
//! itself — refusing to cancel a job already in a terminal state.

use legaldex_batch::{BatchManager, BatchSubmitOptions, JobResultItem, JobSummary};
use legaldex_pipeline::IngestRequest;
use tracing::{info, warn};

use crate::ApiError;

/// Submit a §6 "submit batch" request, returning the assigned job id.
///
/// # Errors
///
/// Returns [`ApiError::Validation`] if `requests` is empty. A worker-pool
/// queue-full condition is not surfaced here — [`BatchManager::submit`]
/// records it per-document on the job's results instead (§4.7).
pub fn submit_batch(manager: &BatchManager, requests: Vec<IngestRequest>, options: BatchSubmitOptions) -> Result<String, ApiError> {
    let count = requests.len();
    let job_id = manager.submit(requests, options)?;
    info!(target: "legaldex.api", job_id = %job_id, count, "batch submitted");
    Ok(job_id)
}

/// Fetch a §6 "get batch status/results" job summary.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] if no job with `job_id` is known.
pub fn batch_status(manager: &BatchManager, job_id: &str) -> Result<JobSummary, ApiError> {
    Ok(manager.status(job_id)?)
}

/// Fetch a §6 "get batch status/results" per-document result list, in
/// submission order.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] if no job with `job_id` is known.
pub fn batch_results(manager: &BatchManager, job_id: &str) -> Result<Vec<JobResultItem>, ApiError> {
    Ok(manager.results(job_id)?)
}

/// Request cancellation of a §6 "cancel batch" job.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] if no job with `job_id` is known, or
/// [`ApiError::TerminalState`] if the job already reached a terminal
/// state — [`BatchManager::cancel`] itself has no such guard, so this
/// handler checks status first.
pub fn cancel_batch(manager: &BatchManager, job_id: &str) -> Result<(), ApiError> {
    let summary = manager.status(job_id)?;
    if summary.status.is_terminal() {
        warn!(target: "legaldex.api", job_id, status = ?summary.status, "refusing to cancel a job already in a terminal state");
        return Err(ApiError::TerminalState(job_id.to_string()));
    }
    Ok(manager.cancel(job_id)?)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use legaldex_config::ExtractionConfig;
    use legaldex_extract::{default_registry, enhanced::EnhancedExtractionService};
    use legaldex_pipeline::stages::{ExtractProcessor, IndexProcessor, StoreProcessor, ValidateProcessor};
    use legaldex_pipeline::{IngestOptions, Pipeline, Processor};
    use legaldex_ports::{InMemoryObjectStore, InMemorySearchEngine};
    use legaldex_textclean::CleanerConfig;
    use legaldex_workerpool::WorkerPoolConfig;

    use super::*;

    fn request(name: &str) -> IngestRequest {
        IngestRequest {
            id: None,
            original_file_name: name.to_string(),
            content_type: "text/plain".to_string(),
            bytes: b"motion to dismiss".to_vec(),
            options: IngestOptions::default(),
        }
    }

    fn manager() -> BatchManager {
        let registry = default_registry(CleanerConfig::default(), ExtractionConfig::default());
        let service = Arc::new(EnhancedExtractionService::new(registry, ExtractionConfig::default(), CleanerConfig::default()));
        let stages: Vec<Arc<dyn Processor>> = vec![
            Arc::new(ValidateProcessor::new()),
            Arc::new(ExtractProcessor::new(service)),
            Arc::new(StoreProcessor::new(Arc::new(InMemoryObjectStore::new()), "Civil")),
            Arc::new(IndexProcessor::new(Arc::new(InMemorySearchEngine::new()), "Civil")),
        ];
        let pipeline = Arc::new(Pipeline::new(stages));
        BatchManager::new(pipeline, WorkerPoolConfig { max_workers: 2, queue_size: 16 }, Duration::from_secs(60 * 60))
    }

    fn options() -> BatchSubmitOptions {
        BatchSubmitOptions { update_index: true, skip_ai: true, force_index: true, priority: 5, rate_limit_key: None }
    }

    #[test]
    fn submit_rejects_empty_batch() {
        let err = submit_batch(&manager(), Vec::new(), options()).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn status_of_unknown_job_is_not_found() {
        let err = batch_status(&manager(), "does-not-exist").unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn cancel_of_unknown_job_is_not_found() {
        let err = cancel_batch(&manager(), "does-not-exist").unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn cancel_after_completion_is_rejected_as_terminal() {
        let manager = manager();
        let job_id = submit_batch(&manager, vec![request("a.txt")], options()).unwrap();

        let mut summary = batch_status(&manager, &job_id).unwrap();
        for _ in 0..200 {
            if summary.status.is_terminal() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
            summary = batch_status(&manager, &job_id).unwrap();
        }

        let err = cancel_batch(&manager, &job_id).unwrap_err();
        assert!(matches!(err, ApiError::TerminalState(_)));
    }

    #[tokio::test]
    async fn results_are_returned_in_submission_order() {
        let manager = manager();
        let job_id = submit_batch(&manager, vec![request("a.txt"), request("b.txt")], options()).unwrap();

        let mut summary = batch_status(&manager, &job_id).unwrap();
        for _ in 0..200 {
            if summary.status.is_terminal() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
            summary = batch_status(&manager, &job_id).unwrap();
        }

        let results = batch_results(&manager, &job_id).unwrap();
        assert_eq!(results[0].original_file_name, "a.txt");
        assert_eq!(results[1].original_file_name, "b.txt");
    }
}

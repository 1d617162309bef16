// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`BatchManager`]: submits a batch of documents onto a shared
//! [`WorkerPool`], tracks each job's progress and per-document results, and
//! reaps terminal jobs past the retention window (§4.7).

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use legaldex_pipeline::{IngestRequest, Pipeline};
use legaldex_workerpool::{Job, PoolError, WorkerPool, WorkerPoolConfig};
use tracing::warn;
use uuid::Uuid;

use crate::error::BatchError;
use crate::job::{JobProgress, JobResultItem, JobStatus, JobSummary};
use crate::options::BatchSubmitOptions;

struct JobRecord {
    id: String,
    status: Mutex<JobStatus>,
    submitted_at: DateTime<Utc>,
    started_at: Mutex<Option<DateTime<Utc>>>,
    completed_at: Mutex<Option<DateTime<Utc>>>,
    progress: JobProgress,
    results: Mutex<Vec<JobResultItem>>,
    cancel_requested: AtomicBool,
}

impl JobRecord {
    /// Move `status` to `target` if the transition is legal; logs and
    /// ignores an illegal request rather than panicking, since it can only
    /// arise from two completion callbacks racing (harmless — the first
    /// one to land wins).
    fn transition(&self, target: JobStatus) {
        let mut status = self.status.lock().expect("job status mutex poisoned");
        if status.can_transition_to(target) {
            *status = target;
        } else if *status != target {
            warn!(target: "legaldex.batch", job_id = %self.id, from = ?*status, to = ?target, "ignored illegal batch job transition");
        }
    }

    fn check_completion(&self) {
        if !self.progress.is_complete() {
            return;
        }
        let final_status = if self.progress.has_skipped() { JobStatus::Cancelled } else { JobStatus::Completed };
        let already_terminal = self.status.lock().expect("job status mutex poisoned").is_terminal();
        if already_terminal {
            return;
        }
        self.transition(final_status);
        *self.completed_at.lock().expect("job completed_at mutex poisoned") = Some(Utc::now());
    }
}

struct Inner {
    jobs: Mutex<BTreeMap<String, Arc<JobRecord>>>,
    pipeline: Arc<Pipeline>,
    pool: WorkerPool,
    retention: StdDuration,
}

/// Submits batches of documents to a shared pipeline and worker pool,
/// tracking per-job progress and results until the retention reaper purges
/// them (§4.7).
#[derive(Clone)]
pub struct BatchManager {
    inner: Arc<Inner>,
}

impl BatchManager {
    /// Build a manager over `pipeline`, sized by `pool_config`, retaining
    /// terminal jobs for `retention` before the background reaper purges
    /// them.
    #[must_use]
    pub fn new(pipeline: Arc<Pipeline>, pool_config: WorkerPoolConfig, retention: StdDuration) -> Self {
        let pool = WorkerPool::new(pool_config);
        pool.start();
        let inner = Arc::new(Inner { jobs: Mutex::new(BTreeMap::new()), pipeline, pool, retention });
        let reaper = inner.clone();
        tokio::spawn(async move { reap_loop(reaper).await });
        Self { inner }
    }

    /// Submit `requests` as one job, applying `options` uniformly to every
    /// document. Returns the assigned job id.
    pub fn submit(&self, requests: Vec<IngestRequest>, options: BatchSubmitOptions) -> Result<String, BatchError> {
        if requests.is_empty() {
            return Err(BatchError::EmptyBatch);
        }

        let job_id = Uuid::new_v4().to_string();
        let total = requests.len() as u64;
        let results = requests
            .iter()
            .enumerate()
            .map(|(index, request)| JobResultItem::pending(index, request.original_file_name.clone()))
            .collect();
        let record = Arc::new(JobRecord {
            id: job_id.clone(),
            status: Mutex::new(JobStatus::Queued),
            submitted_at: Utc::now(),
            started_at: Mutex::new(None),
            completed_at: Mutex::new(None),
            progress: JobProgress::new(total),
            results: Mutex::new(results),
            cancel_requested: AtomicBool::new(false),
        });
        self.inner.jobs.lock().expect("batch jobs mutex poisoned").insert(job_id.clone(), record.clone());

        for (index, mut request) in requests.into_iter().enumerate() {
            request.options.update_index = options.update_index;
            request.options.skip_ai = options.skip_ai;
            request.options.force_index = options.force_index;
            request.options.rate_limit_key = options.rate_limit_key.clone();

            let inner = self.inner.clone();
            let record = record.clone();
            let priority = options.priority;
            let job = Job::new(format!("{job_id}-{index}"), async move {
                run_one(&inner, &record, index, request).await;
            })
            .with_priority(priority);

            if let Err(PoolError::QueueFull { max }) = self.inner.pool.submit(job) {
                warn!(target: "legaldex.batch", job_id = %job_id, index, max, "batch document queue full, recording immediate failure");
                let mut results = record.results.lock().expect("job results mutex poisoned");
                results[index].error = Some(format!("worker pool queue full (max {max})"));
                drop(results);
                record.progress.record(false, false, false, false);
                record.check_completion();
            }
        }

        Ok(job_id)
    }

    /// Current status and progress of a job.
    pub fn status(&self, job_id: &str) -> Result<JobSummary, BatchError> {
        let record = self.find(job_id)?;
        Ok(JobSummary {
            id: record.id.clone(),
            status: *record.status.lock().expect("job status mutex poisoned"),
            submitted_at: record.submitted_at,
            started_at: *record.started_at.lock().expect("job started_at mutex poisoned"),
            completed_at: *record.completed_at.lock().expect("job completed_at mutex poisoned"),
            progress: record.progress.snapshot(),
        })
    }

    /// Per-document results, in submission order.
    pub fn results(&self, job_id: &str) -> Result<Vec<JobResultItem>, BatchError> {
        let record = self.find(job_id)?;
        Ok(record.results.lock().expect("job results mutex poisoned").clone())
    }

    /// Request cancellation: documents already running finish; documents
    /// that have not yet started are recorded as `skipped` (§4.7).
    pub fn cancel(&self, job_id: &str) -> Result<(), BatchError> {
        let record = self.find(job_id)?;
        record.cancel_requested.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn find(&self, job_id: &str) -> Result<Arc<JobRecord>, BatchError> {
        self.inner
            .jobs
            .lock()
            .expect("batch jobs mutex poisoned")
            .get(job_id)
            .cloned()
            .ok_or_else(|| BatchError::NotFound { job_id: job_id.to_string() })
    }
}

async fn run_one(inner: &Arc<Inner>, record: &Arc<JobRecord>, index: usize, request: IngestRequest) {
    if record.cancel_requested.load(Ordering::SeqCst) {
        record.results.lock().expect("job results mutex poisoned")[index].skipped = true;
        record.progress.record(false, false, false, true);
        record.check_completion();
        return;
    }

    record.transition(JobStatus::Running);
    {
        let mut started_at = record.started_at.lock().expect("job started_at mutex poisoned");
        if started_at.is_none() {
            *started_at = Some(Utc::now());
        }
    }

    let result = inner.pipeline.process_document(request).await;
    let success = result.fully_succeeded();
    let index_error = result.index_error.is_some();
    {
        let mut results = record.results.lock().expect("job results mutex poisoned");
        let item = &mut results[index];
        item.document_id = result.document_id;
        item.success = success;
        item.error = result.fatal_error.map(|err| err.to_string());
        item.classification = result.classification;
        item.indexed = result.indexed;
        item.index_error = result.index_error;
    }
    record.progress.record(success, result.indexed, index_error, false);
    record.check_completion();
}

async fn reap_loop(inner: Arc<Inner>) {
    let sweep_interval = StdDuration::from_secs(60).min(inner.retention);
    loop {
        tokio::time::sleep(sweep_interval).await;
        let now = Utc::now();
        let retention = chrono::Duration::from_std(inner.retention).unwrap_or(chrono::Duration::zero());
        let mut jobs = inner.jobs.lock().expect("batch jobs mutex poisoned");
        jobs.retain(|_, record| {
            let completed_at = *record.completed_at.lock().expect("job completed_at mutex poisoned");
            match completed_at {
                Some(completed_at) => now - completed_at < retention,
                None => true,
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc as StdArc;

    use legaldex_config::ExtractionConfig;
    use legaldex_extract::{default_registry, enhanced::EnhancedExtractionService};
    use legaldex_pipeline::{IngestOptions, Processor};
    use legaldex_ports::{InMemoryObjectStore, InMemorySearchEngine};
    use legaldex_textclean::CleanerConfig;

    use super::*;

    fn request(name: &str, bytes: &[u8]) -> IngestRequest {
        IngestRequest {
            id: None,
            original_file_name: name.to_string(),
            content_type: "text/plain".to_string(),
            bytes: bytes.to_vec(),
            options: IngestOptions::default(),
        }
    }

    fn manager() -> BatchManager {
        let registry = default_registry(CleanerConfig::default(), ExtractionConfig::default());
        let service = StdArc::new(EnhancedExtractionService::new(registry, ExtractionConfig::default(), CleanerConfig::default()));
        let stages: Vec<StdArc<dyn Processor>> = vec![
            StdArc::new(legaldex_pipeline::stages::ValidateProcessor::new()),
            StdArc::new(legaldex_pipeline::stages::ExtractProcessor::new(service)),
            StdArc::new(legaldex_pipeline::stages::StoreProcessor::new(StdArc::new(InMemoryObjectStore::new()), "Civil")),
            StdArc::new(legaldex_pipeline::stages::IndexProcessor::new(StdArc::new(InMemorySearchEngine::new()), "Civil")),
        ];
        let pipeline = StdArc::new(Pipeline::new(stages));
        BatchManager::new(pipeline, WorkerPoolConfig { max_workers: 2, queue_size: 16 }, StdDuration::from_secs(60 * 60 * 24))
    }

    fn options() -> BatchSubmitOptions {
        BatchSubmitOptions { update_index: true, skip_ai: true, force_index: true, priority: 5, rate_limit_key: None }
    }

    #[tokio::test]
    async fn submit_runs_to_completion_with_full_progress() {
        let manager = manager();
        let job_id = manager
            .submit(vec![request("a.txt", b"Alpha text."), request("b.txt", b"Bravo text.")], options())
            .unwrap();

        let mut summary = manager.status(&job_id).unwrap();
        for _ in 0..200 {
            if summary.status.is_terminal() {
                break;
            }
            tokio::time::sleep(StdDuration::from_millis(10)).await;
            summary = manager.status(&job_id).unwrap();
        }

        assert_eq!(summary.status, JobStatus::Completed);
        assert_eq!(summary.progress.total, 2);
        assert_eq!(summary.progress.success, 2);
        assert_eq!(summary.progress.percent_complete, 100.0);

        let results = manager.results(&job_id).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].original_file_name, "a.txt");
        assert_eq!(results[1].original_file_name, "b.txt");
        assert!(results.iter().all(|r| r.success));
    }

    #[tokio::test]
    async fn submit_rejects_empty_batch() {
        let manager = manager();
        let err = manager.submit(Vec::new(), options()).unwrap_err();
        assert!(matches!(err, BatchError::EmptyBatch));
    }

    #[tokio::test]
    async fn status_of_unknown_job_is_not_found() {
        let manager = manager();
        let err = manager.status("does-not-exist").unwrap_err();
        assert!(matches!(err, BatchError::NotFound { .. }));
    }

    #[tokio::test]
    async fn cancel_before_completion_skips_documents_and_marks_cancelled() {
        let manager = manager();
        let job_id = manager
            .submit(
                (0..5).map(|i| request(&format!("doc-{i}.txt"), b"short text")).collect(),
                options(),
            )
            .unwrap();
        manager.cancel(&job_id).unwrap();

        let mut summary = manager.status(&job_id).unwrap();
        for _ in 0..200 {
            if summary.status.is_terminal() {
                break;
            }
            tokio::time::sleep(StdDuration::from_millis(10)).await;
            summary = manager.status(&job_id).unwrap();
        }

        assert_eq!(summary.progress.total, 5);
        assert!(summary.progress.skipped > 0);
        assert_eq!(summary.status, JobStatus::Cancelled);
    }
}

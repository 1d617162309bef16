// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]
//! Bounded-concurrency primitive used to run pipeline jobs (§4.6).
//!
//! Workers drain a priority queue; higher priority is dequeued first with
//! FIFO tie-break at equal priority. [`WorkerPool::stop`] waits for
//! in-flight jobs up to its deadline, then abandons survivors rather than
//! blocking forever.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::{Notify, Semaphore};
use tracing::{debug, warn};

/// A unit of work submitted to the pool. The body is an opaque, already-
/// boxed future: the caller is responsible for reporting its own outcome
/// (e.g. via a channel it holds onto, or by mutating shared state it
/// captured) since job outputs are not uniformly typed.
pub struct Job {
    /// Caller-assigned identifier, used only for logging/diagnostics.
    pub id: String,
    /// Scheduling priority, `1` (lowest) to `9` (highest); out-of-range
    /// values are clamped on submit.
    pub priority: u8,
    /// Per-job timeout. Exceeding it does not cancel the underlying future
    /// (Rust futures cooperate with cancellation only at `.await` points
    /// the body itself defines) but stops the pool from waiting on it.
    pub timeout: Duration,
    /// The work itself.
    pub body: Pin<Box<dyn Future<Output = ()> + Send>>,
}

impl Job {
    /// Build a job from an async block/future, defaulting to priority `5`
    /// and a 60s timeout.
    pub fn new(id: impl Into<String>, body: impl Future<Output = ()> + Send + 'static) -> Self {
        Self {
            id: id.into(),
            priority: 5,
            timeout: Duration::from_secs(60),
            body: Box::pin(body),
        }
    }

    /// Override the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Override the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Errors raised by [`WorkerPool::submit`].
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// The bounded queue is at capacity.
    #[error("worker pool queue is full (max {max})")]
    QueueFull {
        /// Configured queue capacity.
        max: usize,
    },
}

/// Sizing configuration for a [`WorkerPool`] (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPoolConfig {
    /// Number of jobs that may run concurrently.
    pub max_workers: usize,
    /// Bounded queue capacity.
    pub queue_size: usize,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            max_workers: 8,
            queue_size: 256,
        }
    }
}

/// Point-in-time snapshot of pool activity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolStats {
    /// Configured number of worker slots.
    pub worker_count: usize,
    /// Jobs currently executing.
    pub active_workers: usize,
    /// Jobs waiting in the queue.
    pub queue_depth: usize,
    /// Total jobs that have finished (successfully or not).
    pub processed_count: u64,
    /// Jobs that ran past their timeout.
    pub failed_count: u64,
    /// Mean wall-clock duration of finished jobs, in milliseconds.
    pub average_latency_ms: f64,
}

/// One entry in the internal priority queue: a [`Job`] plus the monotonic
/// sequence number used to break priority ties FIFO.
struct QueuedJob {
    priority: u8,
    sequence: u64,
    job: Job,
}

impl PartialEq for QueuedJob {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}
impl Eq for QueuedJob {}

impl PartialOrd for QueuedJob {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedJob {
    /// Higher priority sorts greater (popped first from the max-heap); at
    /// equal priority, the job enqueued earlier (lower `sequence`) sorts
    /// greater, giving FIFO order within a priority level.
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

struct Inner {
    queue: Mutex<BinaryHeap<QueuedJob>>,
    queue_size: usize,
    sequence: AtomicU64,
    semaphore: Arc<Semaphore>,
    running: AtomicBool,
    active: AtomicUsize,
    processed: AtomicU64,
    failed: AtomicU64,
    total_latency_ms: AtomicU64,
    submitted: Notify,
    shutdown: Notify,
}

/// A bounded-concurrency, priority-aware worker pool (§4.6).
#[derive(Clone)]
pub struct WorkerPool {
    config: WorkerPoolConfig,
    inner: Arc<Inner>,
}

impl WorkerPool {
    /// Build a pool with the given sizing. The pool does not start
    /// dispatching jobs until [`WorkerPool::start`] is called.
    #[must_use]
    pub fn new(config: WorkerPoolConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                queue: Mutex::new(BinaryHeap::new()),
                queue_size: config.queue_size,
                sequence: AtomicU64::new(0),
                semaphore: Arc::new(Semaphore::new(config.max_workers)),
                running: AtomicBool::new(false),
                active: AtomicUsize::new(0),
                processed: AtomicU64::new(0),
                failed: AtomicU64::new(0),
                total_latency_ms: AtomicU64::new(0),
                submitted: Notify::new(),
                shutdown: Notify::new(),
            }),
            config,
        }
    }

    /// Enqueue a job. Fails with [`PoolError::QueueFull`] once the queue
    /// reaches `queue_size`; priority values outside `1..=9` are clamped.
    pub fn submit(&self, mut job: Job) -> Result<(), PoolError> {
        job.priority = job.priority.clamp(1, 9);
        let mut queue = self.inner.queue.lock().expect("worker pool queue mutex poisoned");
        if queue.len() >= self.inner.queue_size {
            return Err(PoolError::QueueFull { max: self.inner.queue_size });
        }
        let sequence = self.inner.sequence.fetch_add(1, AtomicOrdering::SeqCst);
        debug!(target: "legaldex.workerpool", job_id = %job.id, priority = job.priority, "job submitted");
        queue.push(QueuedJob { priority: job.priority, sequence, job });
        drop(queue);
        self.inner.submitted.notify_one();
        Ok(())
    }

    /// Start the dispatcher loop as a background task. Calling `start` more
    /// than once is a no-op.
    pub fn start(&self) {
        if self.inner.running.swap(true, AtomicOrdering::SeqCst) {
            return;
        }
        let inner = self.inner.clone();
        tokio::spawn(async move { dispatch_loop(inner).await });
    }

    /// Whether the dispatcher loop is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.running.load(AtomicOrdering::SeqCst)
    }

    /// Stop accepting new dequeues and wait for in-flight jobs to finish, up
    /// to `deadline`. Jobs still running when `deadline` passes are
    /// abandoned in place — there is no forced-cancellation handle into an
    /// already-spawned job, since bodies are opaque futures the pool does
    /// not own beyond polling them.
    pub async fn stop(&self, deadline: Instant) {
        self.inner.running.store(false, AtomicOrdering::SeqCst);
        self.inner.shutdown.notify_waiters();
        while Instant::now() < deadline {
            if self.inner.active.load(AtomicOrdering::SeqCst) == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let stranded = self.inner.active.load(AtomicOrdering::SeqCst);
        if stranded > 0 {
            warn!(target: "legaldex.workerpool", stranded, "stop deadline reached with jobs still in flight");
        }
    }

    /// Snapshot current pool statistics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let queue_depth = self.inner.queue.lock().expect("worker pool queue mutex poisoned").len();
        let processed = self.inner.processed.load(AtomicOrdering::SeqCst);
        let total_latency = self.inner.total_latency_ms.load(AtomicOrdering::SeqCst);
        PoolStats {
            worker_count: self.config.max_workers,
            active_workers: self.inner.active.load(AtomicOrdering::SeqCst),
            queue_depth,
            processed_count: processed,
            failed_count: self.inner.failed.load(AtomicOrdering::SeqCst),
            average_latency_ms: if processed == 0 { 0.0 } else { total_latency as f64 / processed as f64 },
        }
    }
}

async fn dispatch_loop(inner: Arc<Inner>) {
    loop {
        let next = inner.queue.lock().expect("worker pool queue mutex poisoned").pop();
        let Some(queued) = next else {
            if !inner.running.load(AtomicOrdering::SeqCst) {
                return;
            }
            tokio::select! {
                () = inner.submitted.notified() => continue,
                () = inner.shutdown.notified() => {
                    if !inner.running.load(AtomicOrdering::SeqCst)
                        && inner.queue.lock().expect("worker pool queue mutex poisoned").is_empty()
                    {
                        return;
                    }
                    continue;
                }
            }
        };

        let Ok(permit) = inner.semaphore.clone().acquire_owned().await else {
            return;
        };
        inner.active.fetch_add(1, AtomicOrdering::SeqCst);
        let worker_inner = inner.clone();
        let timeout = queued.job.timeout;
        let job_id = queued.job.id;
        let body = queued.job.body;
        tokio::spawn(async move {
            let start = Instant::now();
            let outcome = tokio::time::timeout(timeout, body).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            worker_inner.total_latency_ms.fetch_add(elapsed_ms, AtomicOrdering::SeqCst);
            worker_inner.processed.fetch_add(1, AtomicOrdering::SeqCst);
            if outcome.is_err() {
                warn!(target: "legaldex.workerpool", job_id = %job_id, timeout_ms = timeout.as_millis() as u64, "job exceeded timeout");
                worker_inner.failed.fetch_add(1, AtomicOrdering::SeqCst);
            }
            worker_inner.active.fetch_sub(1, AtomicOrdering::SeqCst);
            drop(permit);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use tokio::sync::Mutex as AsyncMutex;

    #[tokio::test]
    async fn runs_a_submitted_job() {
        let pool = WorkerPool::new(WorkerPoolConfig { max_workers: 2, queue_size: 8 });
        pool.start();
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();
        pool.submit(Job::new("j1", async move {
            c.fetch_add(1, AtomicOrdering::SeqCst);
        }))
        .unwrap();

        for _ in 0..50 {
            if counter.load(AtomicOrdering::SeqCst) == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(counter.load(AtomicOrdering::SeqCst), 1);
    }

    #[tokio::test]
    async fn higher_priority_runs_before_lower_when_queue_backed_up() {
        let pool = WorkerPool::new(WorkerPoolConfig { max_workers: 1, queue_size: 8 });
        let order = Arc::new(AsyncMutex::new(Vec::new()));

        // occupy the single worker slot so subsequent submits queue up.
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
        pool.submit(Job::new("blocker", async move {
            let _ = release_rx.await;
        }))
        .unwrap();
        pool.start();
        tokio::time::sleep(Duration::from_millis(20)).await;

        for (id, pri) in [("low", 1u8), ("high", 9u8), ("mid", 5u8)] {
            let order = order.clone();
            pool.submit(Job::new(id, async move {
                order.lock().await.push(id);
            }).with_priority(pri))
            .unwrap();
        }

        let _ = release_tx.send(());
        for _ in 0..100 {
            if order.lock().await.len() == 3 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let got = order.lock().await.clone();
        assert_eq!(got, vec!["high", "mid", "low"]);
    }

    #[tokio::test]
    async fn fifo_tie_break_at_equal_priority() {
        let pool = WorkerPool::new(WorkerPoolConfig { max_workers: 1, queue_size: 8 });
        let order = Arc::new(AsyncMutex::new(Vec::new()));
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
        pool.submit(Job::new("blocker", async move {
            let _ = release_rx.await;
        }))
        .unwrap();
        pool.start();
        tokio::time::sleep(Duration::from_millis(20)).await;

        for id in ["first", "second", "third"] {
            let order = order.clone();
            pool.submit(Job::new(id, async move {
                order.lock().await.push(id);
            }))
            .unwrap();
        }
        let _ = release_tx.send(());
        for _ in 0..100 {
            if order.lock().await.len() == 3 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(order.lock().await.clone(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn submit_fails_when_queue_full() {
        let pool = WorkerPool::new(WorkerPoolConfig { max_workers: 1, queue_size: 1 });
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
        pool.submit(Job::new("blocker", async move {
            let _ = release_rx.await;
        }))
        .unwrap();
        pool.start();
        tokio::time::sleep(Duration::from_millis(20)).await;

        pool.submit(Job::new("a", async {})).unwrap();
        let err = pool.submit(Job::new("b", async {})).unwrap_err();
        assert!(matches!(err, PoolError::QueueFull { max: 1 }));
        let _ = release_tx.send(());
    }

    #[tokio::test]
    async fn stats_reports_queue_depth_and_worker_count() {
        let pool = WorkerPool::new(WorkerPoolConfig { max_workers: 3, queue_size: 8 });
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
        pool.submit(Job::new("blocker", async move {
            let _ = release_rx.await;
        }))
        .unwrap();
        pool.start();
        tokio::time::sleep(Duration::from_millis(20)).await;
        pool.submit(Job::new("queued", async {})).unwrap();

        let stats = pool.stats();
        assert_eq!(stats.worker_count, 3);
        assert_eq!(stats.queue_depth, 1);
        assert_eq!(stats.active_workers, 1);
        let _ = release_tx.send(());
    }

    #[tokio::test]
    async fn stop_waits_for_in_flight_jobs() {
        let pool = WorkerPool::new(WorkerPoolConfig { max_workers: 1, queue_size: 8 });
        pool.start();
        let done = Arc::new(AtomicBool::new(false));
        let d = done.clone();
        pool.submit(Job::new("slow", async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            d.store(true, AtomicOrdering::SeqCst);
        }))
        .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        pool.stop(Instant::now() + Duration::from_secs(1)).await;
        assert!(done.load(AtomicOrdering::SeqCst));
        assert!(!pool.is_running());
    }

    #[tokio::test]
    async fn stop_gives_up_at_deadline_with_stranded_job() {
        let pool = WorkerPool::new(WorkerPoolConfig { max_workers: 1, queue_size: 8 });
        pool.start();
        pool.submit(Job::new("very_slow", async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
        }))
        .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let start = Instant::now();
        pool.stop(Instant::now() + Duration::from_millis(30)).await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn job_exceeding_timeout_is_counted_as_failed() {
        let pool = WorkerPool::new(WorkerPoolConfig { max_workers: 1, queue_size: 8 });
        pool.start();
        pool.submit(
            Job::new("timeout_me", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
            })
            .with_timeout(Duration::from_millis(10)),
        )
        .unwrap();

        for _ in 0..100 {
            if pool.stats().processed_count == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let stats = pool.stats();
        assert_eq!(stats.processed_count, 1);
        assert_eq!(stats.failed_count, 1);
    }
}

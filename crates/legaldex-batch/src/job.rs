// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`JobStatus`]'s monotone state machine, the atomic [`JobProgress`]
//! counters, and the per-document [`JobResultItem`] a batch job accumulates
//! (§4.7).

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use legaldex_core::ClassificationResult;

/// Lifecycle of a batch job. Transitions are monotone: once a job reaches
/// a terminal state (`Completed`/`Failed`/`Cancelled`) it never leaves it
/// (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// Submitted, not yet picked up by a worker.
    Queued,
    /// At least one document is being (or has been) processed.
    Running,
    /// Every document was processed and none were left `skipped` by a
    /// cancellation.
    Completed,
    /// A manager-level fault prevented the job from running at all (not
    /// raised for individual document failures — those are recorded on
    /// each [`JobResultItem`] instead, see `DESIGN.md`).
    Failed,
    /// [`crate::BatchManager::cancel`] was called before every document had
    /// finished.
    Cancelled,
}

impl JobStatus {
    /// Whether this status is terminal (no further transitions allowed).
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// The states reachable directly from this one.
    #[must_use]
    pub fn valid_transitions(self) -> &'static [JobStatus] {
        match self {
            Self::Queued => &[Self::Running, Self::Cancelled, Self::Failed],
            Self::Running => &[Self::Completed, Self::Failed, Self::Cancelled],
            Self::Completed | Self::Failed | Self::Cancelled => &[],
        }
    }

    /// Whether moving from this status to `target` is a legal transition.
    #[must_use]
    pub fn can_transition_to(self, target: JobStatus) -> bool {
        self.valid_transitions().contains(&target)
    }
}

/// Atomic progress counters for one job, safe to update concurrently from
/// every in-flight document's completion callback (§4.7).
#[derive(Debug, Default)]
pub struct JobProgress {
    total: AtomicU64,
    processed: AtomicU64,
    success: AtomicU64,
    error: AtomicU64,
    skipped: AtomicU64,
    indexed: AtomicU64,
    index_error: AtomicU64,
}

impl JobProgress {
    /// Build counters for a job with `total` documents submitted.
    #[must_use]
    pub fn new(total: u64) -> Self {
        Self { total: AtomicU64::new(total), ..Self::default() }
    }

    /// Record one document's outcome.
    pub fn record(&self, success: bool, indexed: bool, index_error: bool, skipped: bool) {
        self.processed.fetch_add(1, Ordering::SeqCst);
        if skipped {
            self.skipped.fetch_add(1, Ordering::SeqCst);
        } else if success {
            self.success.fetch_add(1, Ordering::SeqCst);
        } else {
            self.error.fetch_add(1, Ordering::SeqCst);
        }
        if indexed {
            self.indexed.fetch_add(1, Ordering::SeqCst);
        }
        if index_error {
            self.index_error.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Whether every submitted document has been accounted for.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.processed.load(Ordering::SeqCst) >= self.total.load(Ordering::SeqCst)
    }

    /// Whether at least one document was recorded as `skipped` (a
    /// cancellation reached it before it started).
    #[must_use]
    pub fn has_skipped(&self) -> bool {
        self.skipped.load(Ordering::SeqCst) > 0
    }

    /// Point-in-time snapshot, safe to hand to callers.
    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        let total = self.total.load(Ordering::SeqCst);
        let processed = self.processed.load(Ordering::SeqCst);
        let percent_complete = if total == 0 { 0.0 } else { (processed as f64 / total as f64) * 100.0 };
        ProgressSnapshot {
            total,
            processed,
            success: self.success.load(Ordering::SeqCst),
            error: self.error.load(Ordering::SeqCst),
            skipped: self.skipped.load(Ordering::SeqCst),
            indexed: self.indexed.load(Ordering::SeqCst),
            index_error: self.index_error.load(Ordering::SeqCst),
            percent_complete,
        }
    }
}

/// Immutable snapshot of [`JobProgress`] returned by
/// [`crate::BatchManager::status`] (§4.7).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    /// Documents submitted with this job.
    pub total: u64,
    /// Documents processed so far (success, error or skipped).
    pub processed: u64,
    /// Documents that completed with no fatal error.
    pub success: u64,
    /// Documents that completed with a fatal error.
    pub error: u64,
    /// Documents skipped because the job was cancelled before they started.
    pub skipped: u64,
    /// Documents successfully indexed.
    pub indexed: u64,
    /// Documents where indexing was attempted but failed.
    pub index_error: u64,
    /// `processed / total * 100`, or `0` when `total` is `0`.
    pub percent_complete: f64,
}

/// Outcome of one document within a batch job, in submission order (§4.7).
#[derive(Debug, Clone)]
pub struct JobResultItem {
    /// Position of this document within the batch, for stable ordering.
    pub index: usize,
    /// Original uploaded file name, for diagnostics.
    pub original_file_name: String,
    /// Assigned document id, once Validate ran.
    pub document_id: Option<String>,
    /// Whether this document was skipped by a cancellation before it
    /// started.
    pub skipped: bool,
    /// Whether the pipeline ran to completion with no fatal error.
    pub success: bool,
    /// Cause of a fatal pipeline error, if any.
    pub error: Option<String>,
    /// Classification result, when one was produced.
    pub classification: Option<ClassificationResult>,
    /// Whether the document was indexed.
    pub indexed: bool,
    /// Cause of an indexing failure, if indexing was attempted and failed.
    pub index_error: Option<String>,
}

impl JobResultItem {
    /// Build the placeholder recorded at submission time, before the
    /// document has actually run.
    #[must_use]
    pub fn pending(index: usize, original_file_name: impl Into<String>) -> Self {
        Self {
            index,
            original_file_name: original_file_name.into(),
            document_id: None,
            skipped: false,
            success: false,
            error: None,
            classification: None,
            indexed: false,
            index_error: None,
        }
    }
}

/// Summary of a job's identity and timestamps, returned alongside its
/// [`ProgressSnapshot`] by [`crate::BatchManager::status`].
#[derive(Debug, Clone)]
pub struct JobSummary {
    /// Job identifier, as returned by [`crate::BatchManager::submit`].
    pub id: String,
    /// Current lifecycle state.
    pub status: JobStatus,
    /// When the job was submitted.
    pub submitted_at: DateTime<Utc>,
    /// When the first document started processing, if any has.
    pub started_at: Option<DateTime<Utc>>,
    /// When the job reached a terminal state, if it has.
    pub completed_at: Option<DateTime<Utc>>,
    /// Current progress counters.
    pub progress: ProgressSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queued_can_only_move_to_running_cancelled_or_failed() {
        assert!(JobStatus::Queued.can_transition_to(JobStatus::Running));
        assert!(JobStatus::Queued.can_transition_to(JobStatus::Cancelled));
        assert!(!JobStatus::Queued.can_transition_to(JobStatus::Completed));
    }

    #[test]
    fn terminal_states_accept_no_further_transitions() {
        for terminal in [JobStatus::Completed, JobStatus::Failed, JobStatus::Cancelled] {
            assert!(terminal.is_terminal());
            assert!(!terminal.can_transition_to(JobStatus::Running));
        }
    }

    #[test]
    fn progress_percent_complete_is_zero_for_empty_total() {
        let progress = JobProgress::new(0);
        assert_eq!(progress.snapshot().percent_complete, 0.0);
        assert!(progress.is_complete());
    }

    #[test]
    fn progress_tracks_success_error_skipped_and_indexed() {
        let progress = JobProgress::new(4);
        progress.record(true, true, false, false);
        progress.record(false, false, false, false);
        progress.record(false, false, false, true);
        progress.record(true, false, true, false);
        let snapshot = progress.snapshot();
        assert_eq!(snapshot.processed, 4);
        assert_eq!(snapshot.success, 2);
        assert_eq!(snapshot.error, 1);
        assert_eq!(snapshot.skipped, 1);
        assert_eq!(snapshot.indexed, 1);
        assert_eq!(snapshot.index_error, 1);
        assert_eq!(snapshot.percent_complete, 100.0);
        assert!(progress.is_complete());
    }
}

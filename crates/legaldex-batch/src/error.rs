// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`BatchError`]: faults raised by the batch manager itself, distinct
//! from per-document pipeline outcomes recorded on a job's results (§4.7).

use legaldex_core::ErrorKind;

/// Errors raised by [`crate::BatchManager`]'s own operations.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// No job with the given id is known (either never submitted, or
    /// already purged by the retention reaper).
    #[error("batch job {job_id} not found")]
    NotFound {
        /// The id that was looked up.
        job_id: String,
    },
    /// The batch was empty (no documents to submit).
    #[error("batch submission contained no documents")]
    EmptyBatch,
}

impl BatchError {
    /// Map this error onto the shared error-kind taxonomy (§7).
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::EmptyBatch => ErrorKind::Validation,
        }
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]
//! Batch submission over the ingestion pipeline (§4.7): one [`BatchManager`]
//! fans a batch's documents out over a shared [`legaldex_workerpool::WorkerPool`],
//! tracks per-job progress and per-document results, and reaps terminal jobs
//! once they age past the configured retention window.

mod error;
mod job;
mod manager;
mod options;

pub use error::BatchError;
pub use job::{JobProgress, JobResultItem, JobStatus, JobSummary, ProgressSnapshot};
pub use manager::BatchManager;
pub use options::BatchSubmitOptions;

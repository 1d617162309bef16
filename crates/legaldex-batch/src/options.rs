// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-job submission options (§4.7).

/// Options applied uniformly to every document within a submitted batch.
#[derive(Debug, Clone, Default)]
pub struct BatchSubmitOptions {
    /// Whether documents should be indexed once classified/stored.
    pub update_index: bool,
    /// Bypass the Classify stage's external call for every document in
    /// this batch.
    pub skip_ai: bool,
    /// Index despite a missing/failed classification, for every document
    /// in this batch.
    pub force_index: bool,
    /// Scheduling priority (`1`-`9`) handed to the shared worker pool;
    /// arbitrates across concurrently-running batches, not just within
    /// one.
    pub priority: u8,
    /// Rate-limit bucket key applied to every document in this batch.
    pub rate_limit_key: Option<String>,
}

impl BatchSubmitOptions {
    /// Default priority (`5`, matching [`legaldex_workerpool::Job`]'s own
    /// default) when a caller does not specify one.
    #[must_use]
    pub fn default_priority() -> u8 {
        5
    }
}

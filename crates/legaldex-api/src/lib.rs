// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]
//! Typed handler functions for the §6 HTTP boundary (`ingest`, `search`,
//! `aggregate`, `submit/status/cancel batch`, `analyse redactions`),
//! against the in-scope capabilities only — no HTTP routing, JSON
//! envelope, or auth. A transport layer built on this crate owns those
//! concerns; every function here takes and returns plain domain types.

mod aggregate;
mod batch;
mod error;
mod ingest;
mod redaction;
mod search;

pub use aggregate::{aggregate, field_options, stats};
pub use batch::{batch_results, batch_status, cancel_batch, submit_batch};
pub use error::ApiError;
pub use ingest::{ingest_document, IngestInput};
pub use redaction::{analyse_redactions, RedactionInput};
pub use search::{search, SearchResult};

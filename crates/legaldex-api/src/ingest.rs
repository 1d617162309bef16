// SPDX-License-Identifier: MIT OR Apache-2.0
//! §6 "ingest one document": validates the caller's input shape and hands
//! it to the pipeline. The pipeline itself is the source of truth for
//! partial success (§7) — this handler only rejects requests that never
//! reach a stage at all.

use legaldex_pipeline::{IngestOptions, IngestRequest, Pipeline, ProcessResult};
use tracing::debug;

use crate::ApiError;

/// Caller-supplied input for a single-document ingest (§6).
#[derive(Debug, Clone)]
pub struct IngestInput {
    /// Caller-provided stable identifier, if any.
    pub document_id: Option<String>,
    /// Raw uploaded bytes.
    pub file_bytes: Vec<u8>,
    /// Original uploaded file name.
    pub filename: String,
    /// Upload content type (MIME).
    pub content_type: String,
    /// Request options.
    pub options: IngestOptions,
}

/// Run the full Validate → Extract → Classify → Store → Index pipeline
/// over one document (§6 "ingest one document").
///
/// # Errors
///
/// Returns [`ApiError::Validation`] only when the input itself is
/// malformed (no file name, no bytes) — every other failure mode the
/// pipeline can produce is recorded on the returned [`ProcessResult`]
/// instead, per §7's partial-success contract.
pub async fn ingest_document(pipeline: &Pipeline, input: IngestInput) -> Result<ProcessResult, ApiError> {
    if input.filename.trim().is_empty() {
        return Err(ApiError::Validation("file name is required".to_string()));
    }
    if input.file_bytes.is_empty() {
        return Err(ApiError::Validation("uploaded file has no bytes".to_string()));
    }

    debug!(target: "legaldex.api", filename = %input.filename, size = input.file_bytes.len(), "ingest request accepted");

    let request = IngestRequest {
        id: input.document_id,
        original_file_name: input.filename,
        content_type: input.content_type,
        bytes: input.file_bytes,
        options: input.options,
    };
    Ok(pipeline.process_document(request).await)
}

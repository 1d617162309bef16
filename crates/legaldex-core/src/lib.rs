// SPDX-License-Identifier: MIT OR Apache-2.0
//! Canonical types shared across the ingestion and retrieval workspace:
//! the [`Document`] record and its nested metadata, the error taxonomy
//! every stage maps its failures onto, and the request/result types
//! (`ExtractionResult`, `ClassificationResult`, `SearchRequest`) that flow
//! between the pipeline, classifier and query layers.

mod classification;
mod document;
mod error;
mod extraction;
mod search;

pub use classification::{ClassificationResult, RawDates};
pub use document::{
    build_storage_path, compute_text_hash, sanitise_filename, Attorney, Authority, CaseInfo,
    CourtInfo, Document, DocumentMetadata, DocumentType, JurisdictionLevel, Party,
    ProcessingStatus,
};
pub use error::{ClassificationFailure, ErrorKind, IndexFailure, StageError};
pub use extraction::ExtractionResult;
pub use search::{
    DateRange, Filters, SearchRequest, SortOrder, SortSpec, DEFAULT_SIZE, MAX_QUERY_LEN, MAX_SIZE,
};

// SPDX-License-Identifier: MIT OR Apache-2.0
//! §6 "search": normalises the caller's request, builds an engine query
//! body and translates the result back into a typed [`SearchResult`].

use legaldex_core::{Document, SearchRequest};
use legaldex_ports::SearchEngine;
use legaldex_query::QueryBuilder;
use serde_json::Value;

use crate::ApiError;

/// Result of a §6 "search" call: the matching page of documents plus
/// engine bookkeeping the caller may want to surface (total hits, timing,
/// any requested aggregations run alongside the query).
#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    /// Matching documents, in engine-determined order.
    pub hits: Vec<Document>,
    /// Total number of matches before pagination was applied.
    pub total_hits: u64,
    /// Raw aggregation bodies requested alongside the query, if any.
    pub aggregations: Value,
    /// Engine-reported query duration, in milliseconds.
    pub took_ms: u64,
    /// Whether the engine gave up before completing the query.
    pub timed_out: bool,
}

/// Run a §6 "search" request: normalise it, build the engine query body
/// with `builder`, and translate the engine's outcome into a
/// [`SearchResult`] (§4.9).
///
/// # Errors
///
/// Returns [`ApiError::Engine`] if the search engine rejects the query.
pub async fn search(engine: &dyn SearchEngine, builder: &QueryBuilder, mut request: SearchRequest) -> Result<SearchResult, ApiError> {
    request.normalize();
    let query_body = builder.build(&request);
    let outcome = engine.search(&query_body).await?;
    Ok(SearchResult {
        hits: outcome.hits,
        total_hits: outcome.total_hits,
        aggregations: outcome.aggregations,
        took_ms: outcome.took_ms,
        timed_out: outcome.timed_out,
    })
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! §6 "aggregate": runs a caller-requested set of named facets (or the
//! combined field-options convenience, or document-level stats) against
//! the search engine and extracts typed results.

use legaldex_aggregate::{all_field_options_body, document_stats, extract_field_options, CompositeAggregationBuilder, DocumentStats, FieldOptions, DOCUMENT_TYPES};
use legaldex_ports::SearchEngine;

use crate::ApiError;

/// Run a §6 "aggregate" call for an arbitrary set of named aggregations
/// (unknown names are silently dropped by
/// [`CompositeAggregationBuilder::build`]), returning the raw response.
///
/// # Errors
///
/// Returns [`ApiError::Engine`] if the search engine rejects the request.
pub async fn aggregate(engine: &dyn SearchEngine, names: &[&str]) -> Result<serde_json::Value, ApiError> {
    let body = CompositeAggregationBuilder::build(names);
    Ok(engine.aggregate(&body).await?)
}

/// Run the §4.10 "combined all field options" convenience: courts,
/// judges, document types, legal tags, statuses and authors in one
/// request.
///
/// # Errors
///
/// Returns [`ApiError::Engine`] if the search engine rejects the request.
pub async fn field_options(engine: &dyn SearchEngine) -> Result<FieldOptions, ApiError> {
    let response = engine.aggregate(&all_field_options_body()).await?;
    Ok(extract_field_options(&response))
}

/// Run the §4.10 document-level statistics aggregation (document counts
/// broken down by type).
///
/// # Errors
///
/// Returns [`ApiError::Engine`] if the search engine rejects the request.
pub async fn stats(engine: &dyn SearchEngine) -> Result<DocumentStats, ApiError> {
    let body = legaldex_aggregate::terms_aggregation(DOCUMENT_TYPES);
    let response = engine.aggregate(&body).await?;
    Ok(document_stats(&response))
}

#[cfg(test)]
mod tests {
    use legaldex_ports::InMemorySearchEngine;

    use super::*;

    #[tokio::test]
    async fn aggregate_runs_against_the_engine() {
        let engine = InMemorySearchEngine::new();
        let response = aggregate(&engine, &["courts", "not_a_real_one"]).await.unwrap();
        assert!(response.is_object());
    }

    #[tokio::test]
    async fn field_options_extracts_every_facet() {
        let engine = InMemorySearchEngine::new();
        let options = field_options(&engine).await.unwrap();
        assert!(options.courts.is_empty());
    }

    #[tokio::test]
    async fn stats_extracts_document_type_breakdown() {
        let engine = InMemorySearchEngine::new();
        let stats = stats(&engine).await.unwrap();
        assert_eq!(stats.total_documents, 0);
    }
}

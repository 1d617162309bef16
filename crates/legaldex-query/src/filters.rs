// SPDX-License-Identifier: MIT OR Apache-2.0
//! Filter-clause builders shared between [`crate::QueryBuilder`] and
//! `legaldex-aggregate` (§4.9/§4.10's "translated through the same
//! filter-clause helpers `legaldex-query` exposes").

use legaldex_core::{DateRange, Filters};
use serde_json::{json, Value};

/// Build a `term` clause matching `field` against `value`.
#[must_use]
pub fn term(field: &str, value: &str) -> Value {
    json!({ "term": { field: value } })
}

/// Build a `terms` clause matching `field` against any of `values`.
#[must_use]
pub fn terms(field: &str, values: &[String]) -> Value {
    json!({ "terms": { field: values } })
}

/// Build a `range` clause on `field` from an inclusive [`DateRange`].
/// Returns `None` if both bounds are absent.
#[must_use]
pub fn date_range(field: &str, range: &DateRange) -> Option<Value> {
    if range.from.is_none() && range.to.is_none() {
        return None;
    }
    let mut bounds = serde_json::Map::new();
    if let Some(from) = range.from {
        bounds.insert("gte".to_string(), json!(from.format("%Y-%m-%d").to_string()));
    }
    if let Some(to) = range.to {
        bounds.insert("lte".to_string(), json!(to.format("%Y-%m-%d").to_string()));
    }
    Some(json!({ "range": { field: Value::Object(bounds) } }))
}

/// Translate [`Filters`] into a list of `bool.filter` clauses (§4.9):
/// scalar fields become `term`, list fields become `terms`, and
/// `legal_tags_match_all` splits the tag list into one `term` clause per
/// tag instead of a single `terms` clause.
#[must_use]
pub fn filter_clauses(filters: &Filters) -> Vec<Value> {
    let mut clauses = Vec::new();

    if let Some(document_type) = &filters.document_type {
        clauses.push(term("doc_type", document_type));
    }
    if let Some(case_number) = &filters.case_number {
        clauses.push(term("metadata.case_info.case_number", case_number));
    }
    if let Some(case_name) = &filters.case_name {
        clauses.push(term("metadata.case_info.case_name", case_name));
    }
    if !filters.judges.is_empty() {
        clauses.push(terms("metadata.judge", &filters.judges));
    }
    if !filters.courts.is_empty() {
        clauses.push(terms("metadata.court", &filters.courts));
    }
    if let Some(author) = &filters.author {
        clauses.push(term("metadata.author", author));
    }
    if let Some(status) = &filters.status {
        clauses.push(term("metadata.status", status));
    }
    if !filters.legal_tags.is_empty() {
        if filters.legal_tags_match_all {
            clauses.extend(filters.legal_tags.iter().map(|tag| term("metadata.legal_tags", tag)));
        } else {
            clauses.push(terms("metadata.legal_tags", &filters.legal_tags));
        }
    }

    clauses
}

/// Translate an arbitrary string→string filter map (as accepted by the
/// aggregate layer's metadata-field-values variant) into the same clause
/// shape: one `term` clause per entry, in key order for deterministic
/// output.
#[must_use]
pub fn arbitrary_filter_clauses(filters: &std::collections::BTreeMap<String, String>) -> Vec<Value> {
    filters.iter().map(|(field, value)| term(field, value)).collect()
}

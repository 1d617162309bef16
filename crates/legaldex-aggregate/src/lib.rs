// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]
//! Named facet/stat/field-options aggregations over the search backend
//! (§4.10): one standalone body builder per named aggregation, a
//! [`CompositeAggregationBuilder`] that combines a requested subset, and
//! response extractors that walk an engine aggregation response into
//! typed [`FieldValue`] lists.

use std::collections::BTreeMap;

use legaldex_query::filters::arbitrary_filter_clauses;
use serde_json::{json, Value};

/// One entry in the §4.10 named-aggregation table: the aggregation's
/// name, the field it buckets on, and its default bucket size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationSpec {
    /// Name used both as the request key and the response key.
    pub name: &'static str,
    /// Field the terms aggregation buckets on.
    pub field: &'static str,
    /// Default bucket size (the lower bound, for fields with a size band).
    pub size: u32,
}

/// `document_types` (§4.10): buckets on `doc_type`, 50 buckets.
pub const DOCUMENT_TYPES: AggregationSpec = AggregationSpec { name: "document_types", field: "doc_type", size: 50 };
/// `legal_tags` (§4.10): buckets on `metadata.legal_tags`, 100 buckets
/// (lower bound of the 100-200 band).
pub const LEGAL_TAGS: AggregationSpec = AggregationSpec { name: "legal_tags", field: "metadata.legal_tags", size: 100 };
/// `courts` (§4.10): buckets on `metadata.court`, 25 buckets (lower bound
/// of the 25-100 band).
pub const COURTS: AggregationSpec = AggregationSpec { name: "courts", field: "metadata.court", size: 25 };
/// `judges` (§4.10): buckets on `metadata.judge`, 30 buckets (lower bound
/// of the 30-100 band).
pub const JUDGES: AggregationSpec = AggregationSpec { name: "judges", field: "metadata.judge", size: 30 };
/// `statuses` (§4.10): buckets on `metadata.status`, 20 buckets.
pub const STATUSES: AggregationSpec = AggregationSpec { name: "statuses", field: "metadata.status", size: 20 };
/// `authors` (§4.10): buckets on `metadata.author`, 100 buckets.
pub const AUTHORS: AggregationSpec = AggregationSpec { name: "authors", field: "metadata.author", size: 100 };

/// The name of the fixed-range `date_ranges` aggregation (§4.10). Not a
/// terms aggregation, so it has no [`AggregationSpec`] entry.
pub const DATE_RANGES_NAME: &str = "date_ranges";

/// Every terms-bucketed aggregation the composite builder recognises.
pub const TERMS_AGGREGATIONS: &[AggregationSpec] = &[DOCUMENT_TYPES, LEGAL_TAGS, COURTS, JUDGES, STATUSES, AUTHORS];

/// Build a standalone terms-aggregation body for `spec`.
#[must_use]
pub fn terms_aggregation(spec: AggregationSpec) -> Value {
    json!({
        spec.name: {
            "terms": { "field": spec.field, "size": spec.size }
        }
    })
}

/// Build the `date_ranges` aggregation body: fixed buckets for the last
/// 7/30/90 days and the last year, bucketed on `created_at` (§4.10).
#[must_use]
pub fn date_ranges_aggregation() -> Value {
    json!({
        DATE_RANGES_NAME: {
            "date_range": {
                "field": "created_at",
                "ranges": [
                    { "key": "last_7_days", "from": "now-7d/d" },
                    { "key": "last_30_days", "from": "now-30d/d" },
                    { "key": "last_90_days", "from": "now-90d/d" },
                    { "key": "last_year", "from": "now-365d/d" },
                ]
            }
        }
    })
}

/// Look up a terms [`AggregationSpec`] by name.
#[must_use]
pub fn find_terms_spec(name: &str) -> Option<AggregationSpec> {
    TERMS_AGGREGATIONS.iter().copied().find(|spec| spec.name == name)
}

/// Combines a caller-requested list of aggregation names into one body,
/// validating each against the enumerated set and silently dropping
/// unknown names (§4.10).
#[derive(Debug, Clone, Default)]
pub struct CompositeAggregationBuilder;

impl CompositeAggregationBuilder {
    /// Build the combined aggregation body for `names`. Unknown names are
    /// dropped without error; `"date_ranges"` is recognised alongside the
    /// terms-bucketed names.
    #[must_use]
    pub fn build(names: &[&str]) -> Value {
        let mut combined = serde_json::Map::new();
        for name in names {
            if let Some(spec) = find_terms_spec(name) {
                merge_into(&mut combined, terms_aggregation(spec));
            } else if *name == DATE_RANGES_NAME {
                merge_into(&mut combined, date_ranges_aggregation());
            }
        }
        Value::Object(combined)
    }
}

fn merge_into(target: &mut serde_json::Map<String, Value>, body: Value) {
    if let Value::Object(map) = body {
        target.extend(map);
    }
}

/// One bucket of a facet response: a value and its document count
/// (§4.10).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    /// Bucket key (e.g. a court name, a legal tag).
    pub value: String,
    /// Number of documents in this bucket.
    pub count: u64,
}

/// Walk a raw engine aggregation response and extract the `name`
/// aggregation's buckets as [`FieldValue`]s, in the engine's bucket order.
/// Returns an empty list if the aggregation is absent or shaped
/// unexpectedly.
#[must_use]
pub fn extract_field_values(response: &Value, name: &str) -> Vec<FieldValue> {
    response
        .get(name)
        .and_then(|agg| agg.get("buckets"))
        .and_then(Value::as_array)
        .map(|buckets| {
            buckets
                .iter()
                .filter_map(|bucket| {
                    let value = bucket.get("key")?.as_str()?.to_string();
                    let count = bucket.get("doc_count")?.as_u64()?;
                    Some(FieldValue { value, count })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Every filterable facet combined in one request/response (§4.10 "Combined
/// all field options").
#[derive(Debug, Clone, Default)]
pub struct FieldOptions {
    /// `document_types` facet.
    pub document_types: Vec<FieldValue>,
    /// `legal_tags` facet.
    pub legal_tags: Vec<FieldValue>,
    /// `courts` facet.
    pub courts: Vec<FieldValue>,
    /// `judges` facet.
    pub judges: Vec<FieldValue>,
    /// `statuses` facet.
    pub statuses: Vec<FieldValue>,
    /// `authors` facet.
    pub authors: Vec<FieldValue>,
}

/// Build the combined request body for every facet in [`FieldOptions`]
/// (§4.10 "Combined `all field options` fetches courts, judges, doc
/// types, legal tags, statuses and authors in a single request").
#[must_use]
pub fn all_field_options_body() -> Value {
    CompositeAggregationBuilder::build(&["document_types", "legal_tags", "courts", "judges", "statuses", "authors"])
}

/// Extract [`FieldOptions`] from the response to a body built by
/// [`all_field_options_body`].
#[must_use]
pub fn extract_field_options(response: &Value) -> FieldOptions {
    FieldOptions {
        document_types: extract_field_values(response, DOCUMENT_TYPES.name),
        legal_tags: extract_field_values(response, LEGAL_TAGS.name),
        courts: extract_field_values(response, COURTS.name),
        judges: extract_field_values(response, JUDGES.name),
        statuses: extract_field_values(response, STATUSES.name),
        authors: extract_field_values(response, AUTHORS.name),
    }
}

/// Aggregate document-level statistics derived from a `document_types`
/// facet response, for the §6 "aggregate" operation's `DocumentStats`
/// result shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentStats {
    /// Total documents across every `document_types` bucket.
    pub total_documents: u64,
    /// Per-document-type breakdown.
    pub by_document_type: Vec<FieldValue>,
}

/// Derive [`DocumentStats`] from a response containing (at least) the
/// `document_types` aggregation.
#[must_use]
pub fn document_stats(response: &Value) -> DocumentStats {
    let by_document_type = extract_field_values(response, DOCUMENT_TYPES.name);
    let total_documents = by_document_type.iter().map(|v| v.count).sum();
    DocumentStats { total_documents, by_document_type }
}

/// Default bucket size for [`MetadataFieldValuesRequest`] when the caller
/// doesn't specify one.
pub const DEFAULT_METADATA_FIELD_VALUES_SIZE: u32 = 50;
/// Maximum bucket size accepted after normalisation.
pub const MAX_METADATA_FIELD_VALUES_SIZE: u32 = 1000;

/// Request shape for the metadata-field-values aggregation variant
/// (§4.10): an arbitrary metadata field, with optional prefix/exclude
/// narrowing and an arbitrary filter map applied before bucketing.
#[derive(Debug, Clone)]
pub struct MetadataFieldValuesRequest {
    /// Field to bucket on (required).
    pub field: String,
    /// Only include bucket keys starting with this prefix, if set.
    pub prefix: Option<String>,
    /// Drop bucket keys matching any of these values.
    pub exclude: Vec<String>,
    /// Bucket size, clamped to `[1, 1000]` by [`Self::normalize`].
    pub size: u32,
    /// Arbitrary filter map, translated into the same filter clauses the
    /// query builder uses.
    pub filters: BTreeMap<String, String>,
}

impl Default for MetadataFieldValuesRequest {
    fn default() -> Self {
        Self {
            field: String::new(),
            prefix: None,
            exclude: Vec::new(),
            size: DEFAULT_METADATA_FIELD_VALUES_SIZE,
            filters: BTreeMap::new(),
        }
    }
}

impl MetadataFieldValuesRequest {
    /// Clamp `size` to `[1, 1000]`, defaulting to
    /// [`DEFAULT_METADATA_FIELD_VALUES_SIZE`] when unset (i.e. `0`).
    pub fn normalize(&mut self) {
        let requested = if self.size == 0 { DEFAULT_METADATA_FIELD_VALUES_SIZE } else { self.size };
        self.size = requested.clamp(1, MAX_METADATA_FIELD_VALUES_SIZE);
    }
}

/// Build the request body for a [`MetadataFieldValuesRequest`]: a terms
/// aggregation on `field` (with `include`/`exclude` narrowing) nested
/// inside a `bool.filter` query built from the arbitrary filter map
/// (§4.10).
#[must_use]
pub fn metadata_field_values_body(request: &MetadataFieldValuesRequest) -> Value {
    let mut terms = serde_json::Map::new();
    terms.insert("field".to_string(), json!(request.field));
    terms.insert("size".to_string(), json!(request.size));
    if let Some(prefix) = &request.prefix {
        terms.insert("include".to_string(), json!(format!("{prefix}.*")));
    }
    if !request.exclude.is_empty() {
        terms.insert("exclude".to_string(), json!(request.exclude));
    }

    let aggs = json!({ "values": { "terms": Value::Object(terms) } });

    let filter_clauses = arbitrary_filter_clauses(&request.filters);
    if filter_clauses.is_empty() {
        json!({ "size": 0, "aggs": aggs })
    } else {
        json!({
            "size": 0,
            "query": { "bool": { "filter": filter_clauses } },
            "aggs": aggs,
        })
    }
}

/// Extract the `values` aggregation's buckets from a response produced
/// against a [`metadata_field_values_body`] request.
#[must_use]
pub fn extract_metadata_field_values(response: &Value) -> Vec<FieldValue> {
    extract_field_values(response, "values")
}

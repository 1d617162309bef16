// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]
//! Translates a normalised [`legaldex_core::SearchRequest`] into the
//! search engine's query body (§4.9): a multi-match full-text clause,
//! `bool.filter` structured clauses, a `created_at` date range, sort,
//! pagination and highlighting.

pub mod filters;

use legaldex_core::SearchRequest;
use serde_json::{json, Value};

/// Per-field boosts applied to the full-text `multi_match` clause (§4.9:
/// "tunable per-field boosts"). Defaults favour the extracted body text
/// over metadata and the file name.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBoosts {
    /// Boost applied to the extracted document text.
    pub text: f64,
    /// Boost applied to the classified subject line.
    pub subject: f64,
    /// Boost applied to the classifier-produced summary.
    pub summary: f64,
    /// Boost applied to the original file name.
    pub file_name: f64,
}

impl Default for FieldBoosts {
    fn default() -> Self {
        Self { text: 1.0, subject: 2.0, summary: 1.5, file_name: 0.5 }
    }
}

impl FieldBoosts {
    fn as_fields(&self) -> Vec<String> {
        vec![
            format!("text^{}", self.text),
            format!("metadata.subject^{}", self.subject),
            format!("metadata.summary^{}", self.summary),
            format!("file_name^{}", self.file_name),
        ]
    }
}

/// Characters of fuzzy edit distance granted per [`FUZZINESS_CHARS_PER_EDIT`]
/// characters of query text, capped at [`MAX_FUZZINESS`] (§4.9).
const FUZZINESS_CHARS_PER_EDIT: usize = 6;
/// Maximum fuzziness (edit distance) ever applied, regardless of query length.
const MAX_FUZZINESS: u32 = 2;

/// Compute the fuzziness (edit-distance) value for a query of `len`
/// characters: one edit per [`FUZZINESS_CHARS_PER_EDIT`] characters,
/// capped at [`MAX_FUZZINESS`] (§4.9).
#[must_use]
pub fn fuzziness_for_len(len: usize) -> u32 {
    let edits = (len / FUZZINESS_CHARS_PER_EDIT) as u32;
    edits.clamp(0, MAX_FUZZINESS)
}

/// Highlight pre/post tags applied when [`SearchRequest::highlight`] is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightTags {
    /// Tag inserted before a matched fragment.
    pub pre: String,
    /// Tag inserted after a matched fragment.
    pub post: String,
}

impl Default for HighlightTags {
    fn default() -> Self {
        Self { pre: "<em>".to_string(), post: "</em>".to_string() }
    }
}

/// Builds engine query bodies from normalised [`SearchRequest`]s.
///
/// Callers must call [`SearchRequest::normalize`] first — this builder
/// trusts the invariants normalisation establishes (size/from clamped,
/// sort order defaulted) and does not re-derive them.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    boosts: FieldBoosts,
    highlight_tags: HighlightTags,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self { boosts: FieldBoosts::default(), highlight_tags: HighlightTags::default() }
    }
}

impl QueryBuilder {
    /// Build with the default field boosts and highlight tags.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the per-field boosts used in the multi-match clause.
    #[must_use]
    pub fn with_boosts(mut self, boosts: FieldBoosts) -> Self {
        self.boosts = boosts;
        self
    }

    /// Override the highlight pre/post tags.
    #[must_use]
    pub fn with_highlight_tags(mut self, tags: HighlightTags) -> Self {
        self.highlight_tags = tags;
        self
    }

    /// Build the engine query body for `request`, which must already be
    /// normalised (§4.9).
    #[must_use]
    pub fn build(&self, request: &SearchRequest) -> Value {
        let mut must = Vec::new();
        if !request.query.trim().is_empty() {
            must.push(self.multi_match(&request.query, request.fuzzy));
        }

        let mut filter = filters::filter_clauses(&request.filters);
        if let Some(range) = &request.date_range {
            if let Some(clause) = filters::date_range("created_at", range) {
                filter.push(clause);
            }
        }

        let query = if must.is_empty() && filter.is_empty() {
            json!({ "match_all": {} })
        } else {
            json!({
                "bool": {
                    "must": must,
                    "filter": filter,
                }
            })
        };

        let mut body = json!({
            "query": query,
            "size": request.effective_size(),
            "from": request.effective_from(),
        });

        if let Some(sort) = &request.sort {
            body["sort"] = self.sort_clause(sort);
        }

        if request.highlight {
            body["highlight"] = self.highlight_clause();
        }

        body
    }

    fn multi_match(&self, query: &str, fuzzy: bool) -> Value {
        let mut clause = json!({
            "multi_match": {
                "query": query,
                "fields": self.boosts.as_fields(),
            }
        });
        if fuzzy {
            clause["multi_match"]["fuzziness"] = json!(fuzziness_for_len(query.chars().count()));
        }
        clause
    }

    fn sort_clause(&self, sort: &legaldex_core::SortSpec) -> Value {
        let order = match sort.order {
            legaldex_core::SortOrder::Asc => "asc",
            legaldex_core::SortOrder::Desc => "desc",
        };
        let field = if sort.field.eq_ignore_ascii_case("relevance") { "_score" } else { sort.field.as_str() };
        json!([{ field: { "order": order } }])
    }

    fn highlight_clause(&self) -> Value {
        json!({
            "pre_tags": [self.highlight_tags.pre],
            "post_tags": [self.highlight_tags.post],
            "fields": {
                "text": {},
                "metadata.subject": {},
                "metadata.summary": {},
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use legaldex_core::{Filters, SortOrder, SortSpec};

    fn normalized(mut req: SearchRequest) -> SearchRequest {
        req.normalize();
        req
    }

    #[test]
    fn empty_request_builds_match_all() {
        let req = normalized(SearchRequest::default());
        let body = QueryBuilder::new().build(&req);
        assert_eq!(body["query"], json!({ "match_all": {} }));
        assert_eq!(body["size"], 20);
        assert_eq!(body["from"], 0);
    }

    #[test]
    fn full_text_query_becomes_multi_match_across_four_fields() {
        let req = normalized(SearchRequest { query: "motion to dismiss".to_string(), ..SearchRequest::default() });
        let body = QueryBuilder::new().build(&req);
        let fields = body["query"]["bool"]["must"][0]["multi_match"]["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 4);
        assert!(fields.iter().any(|f| f.as_str().unwrap().starts_with("text^")));
    }

    #[test]
    fn fuzzy_flag_sets_fuzziness_by_query_length() {
        let req = normalized(SearchRequest { query: "a".repeat(13), fuzzy: true, ..SearchRequest::default() });
        let body = QueryBuilder::new().build(&req);
        assert_eq!(body["query"]["bool"]["must"][0]["multi_match"]["fuzziness"], 2);
    }

    #[test]
    fn fuzziness_caps_at_two_for_long_queries() {
        assert_eq!(fuzziness_for_len(5), 0);
        assert_eq!(fuzziness_for_len(6), 1);
        assert_eq!(fuzziness_for_len(120), 2);
    }

    #[test]
    fn structured_filters_become_bool_filter_clauses() {
        let req = normalized(SearchRequest {
            filters: Filters { status: Some("processed".to_string()), ..Filters::default() },
            ..SearchRequest::default()
        });
        let body = QueryBuilder::new().build(&req);
        let filter = body["query"]["bool"]["filter"].as_array().unwrap();
        assert_eq!(filter.len(), 1);
        assert_eq!(filter[0]["term"]["metadata.status"], "processed");
    }

    #[test]
    fn sort_relevance_maps_to_score() {
        let req = normalized(SearchRequest {
            sort: Some(SortSpec { field: "relevance".to_string(), order: SortOrder::Desc }),
            ..SearchRequest::default()
        });
        let body = QueryBuilder::new().build(&req);
        assert!(body["sort"][0].get("_score").is_some());
    }

    #[test]
    fn sort_named_field_passes_through() {
        let req = normalized(SearchRequest {
            sort: Some(SortSpec { field: "created_at".to_string(), order: SortOrder::Asc }),
            ..SearchRequest::default()
        });
        let body = QueryBuilder::new().build(&req);
        assert_eq!(body["sort"][0]["created_at"]["order"], "asc");
    }

    #[test]
    fn highlight_flag_adds_highlight_clause_with_default_tags() {
        let req = normalized(SearchRequest { highlight: true, ..SearchRequest::default() });
        let body = QueryBuilder::new().build(&req);
        assert_eq!(body["highlight"]["pre_tags"][0], "<em>");
    }

    #[test]
    fn pagination_reflects_normalised_size_and_from() {
        let req = normalized(SearchRequest { size: Some(5), from: Some(10), ..SearchRequest::default() });
        let body = QueryBuilder::new().build(&req);
        assert_eq!(body["size"], 5);
        assert_eq!(body["from"], 10);
    }

    #[test]
    fn date_range_filter_added_to_bool_filter() {
        use chrono::NaiveDate;
        use legaldex_core::DateRange;
        let req = normalized(SearchRequest {
            date_range: Some(DateRange { from: NaiveDate::from_ymd_opt(2024, 1, 1), to: None }),
            ..SearchRequest::default()
        });
        let body = QueryBuilder::new().build(&req);
        let filter = body["query"]["bool"]["filter"].as_array().unwrap();
        assert_eq!(filter[0]["range"]["created_at"]["gte"], "2024-01-01");
    }
}

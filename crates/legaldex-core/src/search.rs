// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`SearchRequest`] and its nested filter/sort/date-range types (§3/§4.9).

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Maximum accepted length of [`SearchRequest::query`], in characters.
pub const MAX_QUERY_LEN: usize = 1000;
/// Default page size when neither `size` nor legacy `limit` is supplied.
pub const DEFAULT_SIZE: u32 = 20;
/// Maximum page size accepted after normalisation.
pub const MAX_SIZE: u32 = 100;

/// Sort direction for [`SortSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::Desc
    }
}

/// Field + direction to sort search results by.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SortSpec {
    /// Field name to sort on (e.g. `"created_at"`, `"relevance"`).
    pub field: String,
    /// Sort direction; an empty/missing value normalises to [`SortOrder::Desc`].
    #[serde(default)]
    pub order: SortOrder,
}

/// Inclusive date range filter, applied to `created_at` (§4.9).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DateRange {
    /// Inclusive lower bound.
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound.
    pub to: Option<NaiveDate>,
}

/// Structured filters applied alongside the full-text query (§3).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Filters {
    /// Restrict to a classified document type.
    pub document_type: Option<String>,
    /// Exact case number.
    pub case_number: Option<String>,
    /// Exact or partial case name.
    pub case_name: Option<String>,
    /// Any of these judges.
    #[serde(default)]
    pub judges: Vec<String>,
    /// Any of these courts.
    #[serde(default)]
    pub courts: Vec<String>,
    /// Document author.
    pub author: Option<String>,
    /// Processing status.
    pub status: Option<String>,
    /// Legal tags to filter on.
    #[serde(default)]
    pub legal_tags: Vec<String>,
    /// When `true`, a document must carry every tag in `legal_tags` rather
    /// than any one of them.
    #[serde(default)]
    pub legal_tags_match_all: bool,
}

/// A full-text + structured search request (§3).
///
/// Call [`SearchRequest::normalize`] before passing to a query builder; the
/// invariants below only hold afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchRequest {
    /// Full-text query string, truncated to [`MAX_QUERY_LEN`] chars by
    /// [`SearchRequest::normalize`].
    #[serde(default)]
    pub query: String,
    /// Structured filters.
    #[serde(default)]
    pub filters: Filters,
    /// Optional date-range filter.
    pub date_range: Option<DateRange>,
    /// Requested page size. Legacy clients may send [`SearchRequest::limit`]
    /// instead.
    pub size: Option<u32>,
    /// Legacy alias for `size`, consulted only when `size` is unset.
    pub limit: Option<u32>,
    /// Zero-based offset into the result set.
    pub from: Option<i64>,
    /// Sort specification.
    pub sort: Option<SortSpec>,
    /// Whether to request highlighted fragments.
    #[serde(default)]
    pub highlight: bool,
    /// Whether to enable fuzzy matching.
    #[serde(default)]
    pub fuzzy: bool,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            query: String::new(),
            filters: Filters::default(),
            date_range: None,
            size: None,
            limit: None,
            from: None,
            sort: None,
            highlight: false,
            fuzzy: false,
        }
    }
}

impl SearchRequest {
    /// Apply the §4.9 normalisation rules in place:
    /// - `size` falls back to `limit` when unset, then defaults to
    ///   [`DEFAULT_SIZE`], then clamps to `[1, MAX_SIZE]`.
    /// - `from` defaults to `0` and clamps to `>= 0`.
    /// - an empty/missing `sort` order coerces to [`SortOrder::Desc`]
    ///   (already the type-level default; this normalises an explicit
    ///   empty field string to `"created_at"` for callers that only named
    ///   an order).
    /// - `query` is truncated to [`MAX_QUERY_LEN`] characters.
    pub fn normalize(&mut self) {
        if self.query.chars().count() > MAX_QUERY_LEN {
            self.query = self.query.chars().take(MAX_QUERY_LEN).collect();
        }

        let requested = self.size.or(self.limit).unwrap_or(DEFAULT_SIZE);
        self.size = Some(requested.clamp(1, MAX_SIZE));

        let requested_from = self.from.unwrap_or(0);
        self.from = Some(requested_from.max(0));

        if let Some(sort) = &mut self.sort {
            if sort.field.trim().is_empty() {
                sort.field = "created_at".to_string();
            }
        }
    }

    /// Effective page size; only meaningful after [`SearchRequest::normalize`].
    #[must_use]
    pub fn effective_size(&self) -> u32 {
        self.size.unwrap_or(DEFAULT_SIZE)
    }

    /// Effective offset; only meaningful after [`SearchRequest::normalize`].
    #[must_use]
    pub fn effective_from(&self) -> i64 {
        self.from.unwrap_or(0)
    }
}

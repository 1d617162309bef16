// SPDX-License-Identifier: MIT OR Apache-2.0
//! Configuration loading, validation and merging for the ingestion and
//! retrieval core.
//!
//! This crate provides [`IngestConfig`] — the top-level runtime settings for
//! every tunable named across the component specs (plausibility window,
//! extraction thresholds, OCR ranges, rate-limiter capacity/refill, worker
//! pool sizing, job retention, pipeline timeout) — together with helpers for
//! loading from TOML, merging overlays, and producing advisory
//! [`ConfigWarning`]s.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{Days, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested configuration file was not found.
    #[error("config file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file could not be parsed as valid TOML.
    #[error("failed to parse config: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// Semantic validation failed (one or more problems).
    #[error("config validation failed: {reasons:?}")]
    ValidationError {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },

    /// Two configs could not be merged because of conflicting constraints.
    #[error("merge conflict: {reason}")]
    MergeConflict {
        /// Description of the conflict.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Advisory-level issues that do not prevent operation but deserve attention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A deprecated field was used in the configuration.
    DeprecatedField {
        /// Name of the deprecated field.
        field: String,
        /// Suggested replacement, if any.
        suggestion: Option<String>,
    },
    /// A recommended optional field is missing.
    MissingOptionalField {
        /// Name of the missing field.
        field: String,
        /// Why it matters.
        hint: String,
    },
    /// A rate limiter key has an unusually large burst capacity.
    LargeRateLimitCapacity {
        /// Rate-limit key.
        key: String,
        /// Capacity value.
        capacity: f64,
    },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::DeprecatedField { field, suggestion } => {
                write!(f, "deprecated field '{field}'")?;
                if let Some(s) = suggestion {
                    write!(f, " — use '{s}' instead")?;
                }
                Ok(())
            }
            ConfigWarning::MissingOptionalField { field, hint } => {
                write!(f, "missing optional field '{field}': {hint}")
            }
            ConfigWarning::LargeRateLimitCapacity { key, capacity } => {
                write!(f, "rate limit key '{key}' has a large burst capacity ({capacity})")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// Valid date range for the five metadata date fields (§3 `DocumentMetadata`).
/// Dates outside this window are dropped by the classifier router, not
/// rejected.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct PlausibilityWindow {
    /// Earliest accepted date, inclusive.
    pub min_date: NaiveDate,
    /// Latest accepted date, inclusive.
    pub max_date: NaiveDate,
}

impl PlausibilityWindow {
    /// Default window: `[1950-01-01, today + 5 years]`.
    #[must_use]
    pub fn default_at(today: NaiveDate) -> Self {
        Self {
            min_date: NaiveDate::from_ymd_opt(1950, 1, 1).expect("valid constant date"),
            max_date: today
                .checked_add_days(Days::new(5 * 365))
                .unwrap_or(today),
        }
    }

    /// Whether `date` falls within `[min_date, max_date]` inclusive.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.min_date && date <= self.max_date
    }
}

impl Default for PlausibilityWindow {
    fn default() -> Self {
        Self::default_at(Utc::now().date_naive())
    }
}

/// Thresholds governing the PDF extraction cascade and OCR handoff (§4.2).
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct ExtractionConfig {
    /// Minimum character count for the primary PDF library call to be
    /// accepted without falling through the cascade.
    #[serde(default = "ExtractionConfig::default_primary_char_threshold")]
    pub primary_char_threshold: usize,
    /// Character count below which OCR is triggered, when an OCR capability
    /// is configured.
    #[serde(default = "ExtractionConfig::default_ocr_trigger_threshold")]
    pub ocr_trigger_threshold: usize,
    /// OCR tuning, only consulted when an OCR capability is present.
    #[serde(default)]
    pub ocr: OcrConfig,
}

impl ExtractionConfig {
    const fn default_primary_char_threshold() -> usize {
        50
    }
    const fn default_ocr_trigger_threshold() -> usize {
        50
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            primary_char_threshold: Self::default_primary_char_threshold(),
            ocr_trigger_threshold: Self::default_ocr_trigger_threshold(),
            ocr: OcrConfig::default(),
        }
    }
}

/// OCR capability tuning (§4.2).
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct OcrConfig {
    /// OCR language code (e.g. `"eng"`).
    #[serde(default = "OcrConfig::default_language")]
    pub language: String,
    /// Rasterisation DPI, valid range `[72, 600]`.
    #[serde(default = "OcrConfig::default_dpi")]
    pub dpi: u32,
    /// Page-segmentation mode, valid range `[0, 13]`.
    #[serde(default = "OcrConfig::default_psm")]
    pub page_segmentation_mode: u8,
    /// Minimum per-page confidence to accept OCR output without flagging.
    #[serde(default = "OcrConfig::default_confidence_threshold")]
    pub confidence_threshold: f64,
    /// Maximum pages rasterised and submitted concurrently.
    #[serde(default = "OcrConfig::default_max_concurrent_pages")]
    pub max_concurrent_pages: usize,
}

impl OcrConfig {
    fn default_language() -> String {
        "eng".to_string()
    }
    const fn default_dpi() -> u32 {
        300
    }
    const fn default_psm() -> u8 {
        3
    }
    const fn default_confidence_threshold() -> f64 {
        0.6
    }
    const fn default_max_concurrent_pages() -> usize {
        4
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: Self::default_language(),
            dpi: Self::default_dpi(),
            page_segmentation_mode: Self::default_psm(),
            confidence_threshold: Self::default_confidence_threshold(),
            max_concurrent_pages: Self::default_max_concurrent_pages(),
        }
    }
}

/// Token-bucket settings for one rate-limit key (§4.8).
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct RateLimitKeyConfig {
    /// Maximum burst capacity, in tokens.
    pub capacity: f64,
    /// Continuous refill rate, in tokens per second.
    pub refill_per_sec: f64,
}

impl Default for RateLimitKeyConfig {
    fn default() -> Self {
        Self {
            capacity: 10.0,
            refill_per_sec: 1.0,
        }
    }
}

/// Worker pool sizing (§4.6).
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct WorkerPoolConfig {
    /// Number of concurrent worker slots.
    #[serde(default = "WorkerPoolConfig::default_max_workers")]
    pub max_workers: usize,
    /// Bounded queue capacity.
    #[serde(default = "WorkerPoolConfig::default_queue_size")]
    pub queue_size: usize,
}

impl WorkerPoolConfig {
    const fn default_max_workers() -> usize {
        8
    }
    const fn default_queue_size() -> usize {
        256
    }
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            max_workers: Self::default_max_workers(),
            queue_size: Self::default_queue_size(),
        }
    }
}

/// Batch job manager tuning (§4.7).
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct BatchConfig {
    /// How long a terminal job record is retained before the reaper purges
    /// it, in hours.
    #[serde(default = "BatchConfig::default_retention_hours")]
    pub retention_hours: u64,
}

impl BatchConfig {
    const fn default_retention_hours() -> u64 {
        24
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            retention_hours: Self::default_retention_hours(),
        }
    }
}

/// Pipeline engine tuning (§4.5).
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Per-request timeout, in seconds, after which remaining stages are
    /// cancelled.
    #[serde(default = "PipelineConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl PipelineConfig {
    const fn default_timeout_secs() -> u64 {
        300
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

/// Classifier router tuning (§4.3).
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct ClassifyConfig {
    /// Legal category assigned when a provider omits one.
    #[serde(default = "ClassifyConfig::default_legal_category")]
    pub default_legal_category: String,
}

impl ClassifyConfig {
    fn default_legal_category() -> String {
        "Civil".to_string()
    }
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            default_legal_category: Self::default_legal_category(),
        }
    }
}

/// Top-level runtime configuration for the ingestion and retrieval core.
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct IngestConfig {
    /// Plausibility window applied to classified metadata dates.
    #[serde(default)]
    pub plausibility_window: PlausibilityWindow,
    /// Extraction cascade and OCR tuning.
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Per-key rate limiter settings, keyed by rate-limit key (typically a
    /// provider name); `default` applies to keys with no explicit entry.
    #[serde(default)]
    pub rate_limits: BTreeMap<String, RateLimitKeyConfig>,
    /// Default rate-limit settings for keys not present in `rate_limits`.
    #[serde(default)]
    pub default_rate_limit: RateLimitKeyConfig,
    /// Worker pool sizing.
    #[serde(default)]
    pub worker_pool: WorkerPoolConfig,
    /// Batch job manager tuning.
    #[serde(default)]
    pub batch: BatchConfig,
    /// Pipeline engine tuning.
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Classifier router tuning.
    #[serde(default)]
    pub classify: ClassifyConfig,
    /// Log level override (e.g. `"debug"`, `"info"`, `"warn"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            plausibility_window: PlausibilityWindow::default(),
            extraction: ExtractionConfig::default(),
            rate_limits: BTreeMap::new(),
            default_rate_limit: RateLimitKeyConfig::default(),
            worker_pool: WorkerPoolConfig::default(),
            batch: BatchConfig::default(),
            pipeline: PipelineConfig::default(),
            classify: ClassifyConfig::default(),
            log_level: Some("info".into()),
        }
    }
}

impl IngestConfig {
    /// Resolve the effective rate-limit settings for `key`, falling back to
    /// [`IngestConfig::default_rate_limit`] when `key` has no explicit entry.
    #[must_use]
    pub fn rate_limit_for(&self, key: &str) -> &RateLimitKeyConfig {
        self.rate_limits.get(key).unwrap_or(&self.default_rate_limit)
    }
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Recognised log levels.
const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load an [`IngestConfig`] from an optional TOML file path.
///
/// * If `path` is `Some`, reads and parses the file.
/// * If `path` is `None`, returns [`IngestConfig::default()`].
pub fn load_config(path: Option<&Path>) -> Result<IngestConfig, ConfigError> {
    match path {
        Some(p) => {
            let content = std::fs::read_to_string(p).map_err(|_| ConfigError::FileNotFound {
                path: p.display().to_string(),
            })?;
            parse_toml(&content)
        }
        None => Ok(IngestConfig::default()),
    }
}

/// Parse a TOML string into an [`IngestConfig`].
pub fn parse_toml(content: &str) -> Result<IngestConfig, ConfigError> {
    toml::from_str::<IngestConfig>(content).map_err(|e| ConfigError::ParseError {
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a parsed configuration, returning advisory warnings.
///
/// Hard errors (inverted plausibility window, out-of-range OCR settings,
/// non-positive rate limits) are returned as a [`ConfigError::ValidationError`];
/// soft issues come back as warnings.
pub fn validate_config(config: &IngestConfig) -> Result<Vec<ConfigWarning>, ConfigError> {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<ConfigWarning> = Vec::new();

    if let Some(ref level) = config.log_level
        && !VALID_LOG_LEVELS.contains(&level.as_str())
    {
        errors.push(format!("invalid log_level '{level}'"));
    }

    if config.plausibility_window.min_date > config.plausibility_window.max_date {
        errors.push("plausibility_window.min_date must be <= max_date".into());
    }

    let ocr = &config.extraction.ocr;
    if !(72..=600).contains(&ocr.dpi) {
        errors.push(format!("extraction.ocr.dpi {} out of range [72, 600]", ocr.dpi));
    }
    if ocr.page_segmentation_mode > 13 {
        errors.push(format!(
            "extraction.ocr.page_segmentation_mode {} out of range [0, 13]",
            ocr.page_segmentation_mode
        ));
    }
    if !(0.0..=1.0).contains(&ocr.confidence_threshold) {
        errors.push("extraction.ocr.confidence_threshold must be in [0, 1]".into());
    }

    if config.worker_pool.max_workers == 0 {
        errors.push("worker_pool.max_workers must be > 0".into());
    }
    if config.worker_pool.queue_size == 0 {
        errors.push("worker_pool.queue_size must be > 0".into());
    }

    for (key, entry) in &config.rate_limits {
        if entry.capacity <= 0.0 || entry.refill_per_sec <= 0.0 {
            errors.push(format!(
                "rate_limits.{key}: capacity and refill_per_sec must be > 0"
            ));
        } else if entry.capacity > 10_000.0 {
            warnings.push(ConfigWarning::LargeRateLimitCapacity {
                key: key.clone(),
                capacity: entry.capacity,
            });
        }
    }

    if config.pipeline.timeout_secs == 0 {
        errors.push("pipeline.timeout_secs must be > 0".into());
    }

    if config.rate_limits.is_empty() {
        warnings.push(ConfigWarning::MissingOptionalField {
            field: "rate_limits".into(),
            hint: "no per-provider entries configured; every key falls back to default_rate_limit".into(),
        });
    }

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(ConfigError::ValidationError { reasons: errors })
    }
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

/// Merge two configurations. Values in `overlay` take precedence over `base`.
///
/// `rate_limits` maps are combined; on key collisions the overlay entry
/// wins.
#[must_use]
pub fn merge_configs(base: IngestConfig, overlay: IngestConfig) -> IngestConfig {
    let mut rate_limits = base.rate_limits;
    rate_limits.extend(overlay.rate_limits);
    IngestConfig {
        plausibility_window: overlay.plausibility_window,
        extraction: overlay.extraction,
        rate_limits,
        default_rate_limit: overlay.default_rate_limit,
        worker_pool: overlay.worker_pool,
        batch: overlay.batch,
        pipeline: overlay.pipeline,
        classify: overlay.classify,
        log_level: overlay.log_level.or(base.log_level),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

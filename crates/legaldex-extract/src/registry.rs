// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`Extractor`] trait and the format → extractor [`ExtractorRegistry`]
//! (§4.2).

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use legaldex_core::ExtractionResult;

use crate::error::ExtractError;
use crate::hints::ExtractionHints;

/// A format-specific text extractor.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Lowercase extension strings this extractor handles (e.g. `["txt"]`).
    fn supported_formats(&self) -> &'static [&'static str];

    /// Extract text from `bytes`, using `hints` for any format-specific
    /// steering the extractor supports.
    async fn extract(
        &self,
        bytes: &[u8],
        hints: &ExtractionHints,
    ) -> Result<ExtractionResult, ExtractError>;
}

/// Maps a resolved format string to the [`Extractor`] that handles it.
#[derive(Default, Clone)]
pub struct ExtractorRegistry {
    by_format: BTreeMap<&'static str, Arc<dyn Extractor>>,
}

impl ExtractorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `extractor` for every format it declares support for.
    pub fn register(&mut self, extractor: Arc<dyn Extractor>) {
        for format in extractor.supported_formats() {
            self.by_format.insert(format, extractor.clone());
        }
    }

    /// Look up the extractor for an already-resolved format string.
    #[must_use]
    pub fn get(&self, format: &str) -> Option<Arc<dyn Extractor>> {
        self.by_format.get(format).cloned()
    }

    /// Resolve `hints` to a format and extract, returning
    /// [`ExtractError::UnsupportedFormat`] when no extractor matches.
    pub async fn extract(
        &self,
        bytes: &[u8],
        hints: &ExtractionHints,
    ) -> Result<ExtractionResult, ExtractError> {
        let format = crate::hints::resolve_format(hints);
        let extractor = self
            .get(&format)
            .ok_or_else(|| ExtractError::UnsupportedFormat { format: format.clone() })?;
        extractor.extract(bytes, hints).await
    }
}

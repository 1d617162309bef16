// SPDX-License-Identifier: MIT OR Apache-2.0
//! Optional OCR capability (§4.2 "OCR"). The crate does not implement OCR
//! itself — it only orchestrates rasterisation and recognition through
//! whatever [`OcrCapability`] the caller plugs in.

use async_trait::async_trait;
use legaldex_config::OcrConfig;

use crate::error::ExtractError;

/// Recognised text for a single page, plus the engine's confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrPageResult {
    /// 1-based page number.
    pub page_number: u32,
    /// Recognised text for this page.
    pub text: String,
    /// Engine-reported confidence in `[0, 1]`.
    pub confidence: f64,
}

impl OcrPageResult {
    /// Whether this page's confidence met the configured threshold.
    #[must_use]
    pub fn meets_threshold(&self, config: &OcrConfig) -> bool {
        self.confidence >= config.confidence_threshold
    }
}

/// An external OCR provider. Implementations are responsible for
/// rasterising the source document at `config.dpi` and recognising text
/// per page; [`crate::pdf::PdfExtractor`] only calls this when the
/// library cascade still leaves text below the OCR trigger threshold.
#[async_trait]
pub trait OcrCapability: Send + Sync {
    /// Whether the capability is currently usable (e.g. the OCR engine
    /// process or service is reachable).
    fn is_available(&self) -> bool;

    /// Rasterise and recognise every page of `source_bytes`, honouring
    /// `config.max_concurrent_pages` for internal fan-out.
    async fn recognize_pages(&self, source_bytes: &[u8], config: &OcrConfig) -> Result<Vec<OcrPageResult>, ExtractError>;
}

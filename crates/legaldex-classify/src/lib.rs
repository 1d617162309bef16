// SPDX-License-Identifier: MIT OR Apache-2.0
//! Multi-provider AI classifier dispatch (§4.3): the [`ClassifierProvider`]
//! trait adapters speak, a [`prompt::PromptCatalog`] of per-provider prompt
//! tuning, flexible [`dates`] normalisation, and the [`router::ClassifierRouter`]
//! that ties dispatch, normalisation, and result validation together.

pub mod dates;
mod error;
pub mod prompt;
pub mod providers;
pub mod router;

use async_trait::async_trait;
use legaldex_core::ClassificationResult;

pub use error::ClassifyError;
pub use prompt::ClassifyHints;
pub use router::ClassifierRouter;

/// A single classification backend (§6: "Classifier" external interface).
/// Adapters in [`providers`] implement this by calling out over HTTP;
/// test doubles can implement it directly.
#[async_trait]
pub trait ClassifierProvider: Send + Sync {
    /// Stable provider name used for routing and logging.
    fn name(&self) -> &'static str;

    /// Whether this adapter currently has the credentials/configuration
    /// needed to serve a request.
    fn is_configured(&self) -> bool;

    /// Legal categories this provider is known to emit.
    fn supported_categories(&self) -> &'static [&'static str];

    /// Classify the document text behind `prompt`, returning the
    /// provider's raw (pre-normalisation) result.
    async fn classify(&self, prompt: &str, hints: &ClassifyHints) -> Result<ClassificationResult, ClassifyError>;
}

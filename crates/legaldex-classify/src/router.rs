// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`ClassifierRouter`]: dispatches to one configured [`ClassifierProvider`]
//! and runs the post-processing steps every adapter shares (§4.3).

use std::sync::Arc;

use chrono::NaiveDate;
use legaldex_config::PlausibilityWindow;
use legaldex_core::ClassificationResult;

use crate::dates::normalize_dates;
use crate::prompt::PromptCatalog;
use crate::{ClassifierProvider, ClassifyError, ClassifyHints};

/// Routes a classification request to the first configured provider (in
/// registration order, or to a specifically `requested` one), then applies
/// the shared post-processing pipeline: date normalisation, confidence
/// clamping, and legal-category defaulting (§4.3 steps 2-4).
pub struct ClassifierRouter {
    providers: Vec<Arc<dyn ClassifierProvider>>,
    catalog: PromptCatalog,
    plausibility: PlausibilityWindow,
    default_legal_category: String,
}

impl ClassifierRouter {
    /// Build a router over `providers`, tried in order.
    #[must_use]
    pub fn new(
        providers: Vec<Arc<dyn ClassifierProvider>>,
        catalog: PromptCatalog,
        plausibility: PlausibilityWindow,
        default_legal_category: impl Into<String>,
    ) -> Self {
        Self { providers, catalog, plausibility, default_legal_category: default_legal_category.into() }
    }

    /// Names of every registered provider, in dispatch order.
    #[must_use]
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    fn select(&self, requested: Option<&str>) -> Result<&Arc<dyn ClassifierProvider>, ClassifyError> {
        if let Some(requested) = requested {
            let provider = self
                .providers
                .iter()
                .find(|p| p.name() == requested)
                .ok_or_else(|| ClassifyError::UnknownProvider(requested.to_string()))?;
            return Ok(provider);
        }
        self.providers.iter().find(|p| p.is_configured()).ok_or(ClassifyError::NoProviderConfigured)
    }

    /// Classify `text`, dispatching to `requested` provider if given,
    /// otherwise the first configured one. `now` anchors relative date
    /// parsing and the plausibility window check.
    pub async fn classify(
        &self,
        text: &str,
        hints: &ClassifyHints,
        requested: Option<&str>,
        now: NaiveDate,
    ) -> Result<ClassificationResult, ClassifyError> {
        let provider = self.select(requested)?;
        let prompt = self.catalog.build_prompt(provider.name(), text, hints);

        tracing::info!(target: "legaldex_classify::router", provider = provider.name(), "dispatching classification request");

        let mut result = provider.classify(&prompt, hints).await?;
        normalize_dates(&mut result.dates, &self.plausibility, now);
        result.clamp_confidence();
        result.apply_legal_category_default(&self.default_legal_category);
        Ok(result)
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Central prompt catalog (§4.3 step 1): one [`PromptConfig`] per provider,
//! rendering the same semantic template so every adapter's response maps
//! onto the same [`legaldex_core::ClassificationResult`] schema.

use std::collections::BTreeMap;

/// How much analytical detail a provider is asked to include.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailLevel {
    /// Document type and legal category only.
    Minimal,
    /// Type, category, subject, summary and dates.
    Standard,
    /// Everything in `Standard` plus parties, attorneys and authorities.
    Comprehensive,
}

/// Hints passed alongside extracted text that a prompt may reference.
#[derive(Debug, Clone, Default)]
pub struct ClassifyHints {
    /// Original uploaded file name, if known.
    pub filename: Option<String>,
    /// Upload content type, if known.
    pub content_type: Option<String>,
}

/// Per-provider prompt tuning (§4.3 step 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptConfig {
    /// Maximum number of characters of extracted text to include; longer
    /// input is truncated.
    pub max_text_len: usize,
    /// Requested level of analytical detail.
    pub detail_level: DetailLevel,
    /// Whether to include document-context analysis (filename, content
    /// type) in the prompt.
    pub include_context: bool,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_text_len: 8_000,
            detail_level: DetailLevel::Standard,
            include_context: true,
        }
    }
}

/// Canonical provider names recognised by [`PromptCatalog::with_defaults`]
/// and the bundled adapters (§4.3: "enumerate at least three").
pub const CLOUD_LARGE: &str = "cloud-large";
pub const CLOUD_ALT: &str = "cloud-alt";
pub const LOCAL_SELF_HOSTED: &str = "local-self-hosted";

/// Maps provider name to its [`PromptConfig`].
#[derive(Debug, Clone)]
pub struct PromptCatalog {
    configs: BTreeMap<String, PromptConfig>,
}

impl PromptCatalog {
    /// Build an empty catalog; unregistered providers fall back to
    /// [`PromptConfig::default`].
    #[must_use]
    pub fn new() -> Self {
        Self { configs: BTreeMap::new() }
    }

    /// Build the catalog with sensible defaults for the three bundled
    /// provider adapters.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();
        catalog.register(
            CLOUD_LARGE,
            PromptConfig { max_text_len: 16_000, detail_level: DetailLevel::Comprehensive, include_context: true },
        );
        catalog.register(
            CLOUD_ALT,
            PromptConfig { max_text_len: 8_000, detail_level: DetailLevel::Standard, include_context: true },
        );
        catalog.register(
            LOCAL_SELF_HOSTED,
            PromptConfig { max_text_len: 4_000, detail_level: DetailLevel::Minimal, include_context: false },
        );
        catalog
    }

    /// Register or replace the config for `provider`.
    pub fn register(&mut self, provider: &str, config: PromptConfig) {
        self.configs.insert(provider.to_string(), config);
    }

    /// The config for `provider`, or [`PromptConfig::default`] if
    /// unregistered.
    #[must_use]
    pub fn config_for(&self, provider: &str) -> PromptConfig {
        self.configs.get(provider).copied().unwrap_or_default()
    }

    /// Render the prompt for `provider` given extracted `text` and
    /// `hints`, truncating to that provider's `max_text_len`.
    #[must_use]
    pub fn build_prompt(&self, provider: &str, text: &str, hints: &ClassifyHints) -> String {
        let cfg = self.config_for(provider);
        let truncated: String = text.chars().take(cfg.max_text_len).collect();

        let mut prompt = String::new();
        prompt.push_str(
            "Classify the following legal document. Return document type, legal category, \
             subject, summary, confidence, up to five dated events (filing, event, hearing, \
             decision, served), and legal tags.",
        );
        match cfg.detail_level {
            DetailLevel::Minimal => {}
            DetailLevel::Standard => {
                prompt.push_str(" Include a one-paragraph summary.");
            }
            DetailLevel::Comprehensive => {
                prompt.push_str(
                    " Include a one-paragraph summary, and extract parties, attorneys, \
                     cited authorities, and case/court information where present.",
                );
            }
        }
        if cfg.include_context {
            if let Some(filename) = &hints.filename {
                prompt.push_str(&format!("\nFile name: {filename}"));
            }
            if let Some(content_type) = &hints.content_type {
                prompt.push_str(&format!("\nContent type: {content_type}"));
            }
        }
        prompt.push_str("\n\nDocument text:\n");
        prompt.push_str(&truncated);
        prompt
    }
}

impl Default for PromptCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_provider_falls_back_to_default_config() {
        let catalog = PromptCatalog::new();
        assert_eq!(catalog.config_for("unknown"), PromptConfig::default());
    }

    #[test]
    fn build_prompt_truncates_to_provider_max_len() {
        let catalog = PromptCatalog::with_defaults();
        let text = "x".repeat(10_000);
        let prompt = catalog.build_prompt(LOCAL_SELF_HOSTED, &text, &ClassifyHints::default());
        let body_len = prompt.split("Document text:\n").nth(1).unwrap().chars().count();
        assert_eq!(body_len, 4_000);
    }

    #[test]
    fn build_prompt_includes_context_when_configured() {
        let catalog = PromptCatalog::with_defaults();
        let hints = ClassifyHints { filename: Some("motion.pdf".into()), content_type: Some("application/pdf".into()) };
        let prompt = catalog.build_prompt(CLOUD_LARGE, "text", &hints);
        assert!(prompt.contains("motion.pdf"));
    }

    #[test]
    fn build_prompt_omits_context_for_local_provider() {
        let catalog = PromptCatalog::with_defaults();
        let hints = ClassifyHints { filename: Some("motion.pdf".into()), content_type: None };
        let prompt = catalog.build_prompt(LOCAL_SELF_HOSTED, "text", &hints);
        assert!(!prompt.contains("motion.pdf"));
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Bundled classifier adapters (§4.3 step 2: "at least three dispatch
//! targets"). Each adapter speaks JSON over HTTP to a differently shaped
//! backend and maps its response onto [`legaldex_core::ClassificationResult`].

use std::time::Duration;

use async_trait::async_trait;
use legaldex_core::{Attorney, Authority, CaseInfo, ClassificationResult, CourtInfo, DocumentType, Party};
use serde::Deserialize;

use crate::{ClassifierProvider, ClassifyError, ClassifyHints};

/// Connection details shared by the bundled adapters.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL of the classifier endpoint.
    pub endpoint: String,
    /// Bearer credential; absent means the adapter reports
    /// [`ClassifierProvider::is_configured`] as `false`.
    pub api_key: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ProviderConfig {
    /// Build a config with no credential and a 30s timeout.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into(), api_key: None, timeout: Duration::from_secs(30) }
    }

    /// Attach an API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

/// Wire response shape shared by the bundled adapters; a provider is
/// expected to return this JSON body regardless of which backend model
/// produced it (§4.3 step 2: "normalise each adapter's payload to one
/// shape at the boundary").
#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    document_type: Option<String>,
    legal_category: Option<String>,
    subject: Option<String>,
    summary: Option<String>,
    confidence: Option<f64>,
    #[serde(default)]
    filing_date: Option<String>,
    #[serde(default)]
    event_date: Option<String>,
    #[serde(default)]
    hearing_date: Option<String>,
    #[serde(default)]
    decision_date: Option<String>,
    #[serde(default)]
    served_date: Option<String>,
    #[serde(default)]
    legal_tags: Vec<String>,
    #[serde(default)]
    parties: Vec<Party>,
    #[serde(default)]
    attorneys: Vec<Attorney>,
    #[serde(default)]
    authorities: Vec<Authority>,
    #[serde(default)]
    case_info: Option<CaseInfo>,
    #[serde(default)]
    court_info: Option<CourtInfo>,
}

impl ClassifyResponse {
    fn into_result(self) -> ClassificationResult {
        let mut result = ClassificationResult {
            document_type: self.document_type.as_deref().map(DocumentType::coerce),
            legal_category: self.legal_category,
            subject: self.subject,
            summary: self.summary,
            confidence: self.confidence.unwrap_or(0.0),
            legal_tags: self.legal_tags.into_iter().collect(),
            parties: self.parties,
            attorneys: self.attorneys,
            authorities: self.authorities,
            case_info: self.case_info,
            court_info: self.court_info,
            ..ClassificationResult::default()
        };
        result.dates.filing_date = self.filing_date;
        result.dates.event_date = self.event_date;
        result.dates.hearing_date = self.hearing_date;
        result.dates.decision_date = self.decision_date;
        result.dates.served_date = self.served_date;
        result
    }
}

async fn dispatch(
    provider: &'static str,
    client: &reqwest::Client,
    config: &ProviderConfig,
    prompt: &str,
) -> Result<ClassificationResult, ClassifyError> {
    let mut request = client.post(format!("{}/v1/classify", config.endpoint)).json(&serde_json::json!({
        "prompt": prompt,
    }));
    if let Some(api_key) = &config.api_key {
        request = request.bearer_auth(api_key);
    }

    let response = request.send().await.map_err(|err| ClassifyError::Unavailable {
        provider: provider.to_string(),
        reason: err.to_string(),
    })?;

    let status = response.status();
    if status.as_u16() == 429 {
        return Err(ClassifyError::QuotaExceeded { provider: provider.to_string() });
    }
    if !status.is_success() {
        return Err(ClassifyError::Unavailable {
            provider: provider.to_string(),
            reason: format!("HTTP {status}"),
        });
    }

    let body: ClassifyResponse = response.json().await.map_err(|err| ClassifyError::Malformed {
        provider: provider.to_string(),
        reason: err.to_string(),
    })?;
    Ok(body.into_result())
}

/// Adapter for the large hosted cloud model (highest detail, highest cost).
#[derive(Debug, Clone)]
pub struct CloudLargeProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl CloudLargeProvider {
    /// Build the adapter from connection `config`.
    #[must_use]
    pub fn new(config: ProviderConfig) -> Self {
        let client = reqwest::Client::builder().timeout(config.timeout).build().unwrap_or_default();
        Self { config, client }
    }
}

#[async_trait]
impl ClassifierProvider for CloudLargeProvider {
    fn name(&self) -> &'static str {
        "cloud-large"
    }

    fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn supported_categories(&self) -> &'static [&'static str] {
        &["Civil", "Criminal", "Family", "Corporate", "Immigration", "Bankruptcy", "Other"]
    }

    async fn classify(&self, prompt: &str, _hints: &ClassifyHints) -> Result<ClassificationResult, ClassifyError> {
        dispatch(self.name(), &self.client, &self.config, prompt).await
    }
}

/// Adapter for a secondary hosted cloud model, used when the primary is
/// unavailable or over quota.
#[derive(Debug, Clone)]
pub struct CloudAltProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl CloudAltProvider {
    /// Build the adapter from connection `config`.
    #[must_use]
    pub fn new(config: ProviderConfig) -> Self {
        let client = reqwest::Client::builder().timeout(config.timeout).build().unwrap_or_default();
        Self { config, client }
    }
}

#[async_trait]
impl ClassifierProvider for CloudAltProvider {
    fn name(&self) -> &'static str {
        "cloud-alt"
    }

    fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn supported_categories(&self) -> &'static [&'static str] {
        &["Civil", "Criminal", "Family", "Corporate", "Other"]
    }

    async fn classify(&self, prompt: &str, _hints: &ClassifyHints) -> Result<ClassificationResult, ClassifyError> {
        dispatch(self.name(), &self.client, &self.config, prompt).await
    }
}

/// Adapter for a locally self-hosted model, used as a fallback with no
/// external dependency and no API key requirement.
#[derive(Debug, Clone)]
pub struct LocalSelfHostedProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl LocalSelfHostedProvider {
    /// Build the adapter from connection `config`.
    #[must_use]
    pub fn new(config: ProviderConfig) -> Self {
        let client = reqwest::Client::builder().timeout(config.timeout).build().unwrap_or_default();
        Self { config, client }
    }
}

#[async_trait]
impl ClassifierProvider for LocalSelfHostedProvider {
    fn name(&self) -> &'static str {
        "local-self-hosted"
    }

    fn is_configured(&self) -> bool {
        true
    }

    fn supported_categories(&self) -> &'static [&'static str] {
        &["Civil", "Criminal", "Other"]
    }

    async fn classify(&self, prompt: &str, _hints: &ClassifyHints) -> Result<ClassificationResult, ClassifyError> {
        dispatch(self.name(), &self.client, &self.config, prompt).await
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn cloud_large_classifies_successful_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/classify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "document_type": "motion",
                "legal_category": "Civil",
                "subject": "Motion to Dismiss",
                "confidence": 0.92,
            })))
            .mount(&server)
            .await;

        let provider =
            CloudLargeProvider::new(ProviderConfig::new(server.uri()).with_api_key("key"));
        let result = provider.classify("prompt", &ClassifyHints::default()).await.unwrap();
        assert_eq!(result.legal_category.as_deref(), Some("Civil"));
        assert!((result.confidence - 0.92).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn quota_exceeded_maps_to_quota_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).and(path("/v1/classify")).respond_with(ResponseTemplate::new(429)).mount(&server).await;

        let provider = CloudAltProvider::new(ProviderConfig::new(server.uri()).with_api_key("key"));
        let err = provider.classify("prompt", &ClassifyHints::default()).await.unwrap_err();
        assert!(matches!(err, ClassifyError::QuotaExceeded { .. }));
    }

    #[tokio::test]
    async fn server_error_maps_to_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).and(path("/v1/classify")).respond_with(ResponseTemplate::new(503)).mount(&server).await;

        let provider = LocalSelfHostedProvider::new(ProviderConfig::new(server.uri()));
        let err = provider.classify("prompt", &ClassifyHints::default()).await.unwrap_err();
        assert!(matches!(err, ClassifyError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn malformed_body_maps_to_malformed_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/classify"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let provider = CloudLargeProvider::new(ProviderConfig::new(server.uri()).with_api_key("key"));
        let err = provider.classify("prompt", &ClassifyHints::default()).await.unwrap_err();
        assert!(matches!(err, ClassifyError::Malformed { .. }));
    }

    #[test]
    fn local_provider_is_always_configured() {
        let provider = LocalSelfHostedProvider::new(ProviderConfig::new("http://localhost"));
        assert!(provider.is_configured());
    }

    #[test]
    fn cloud_providers_require_api_key() {
        let provider = CloudLargeProvider::new(ProviderConfig::new("http://localhost"));
        assert!(!provider.is_configured());
    }
}

//! Vertex-style provider adapter
//!
//! Single-shot only: this family's tool-calling shape is not wired into
//! the gateway, so `tool_dialog()` stays `None` and the orchestrator
//! skips it for tool-bearing requests.

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use girder_config::{CostRates, ProviderConfig};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use super::{AdapterCapabilities, ProviderAdapter, elapsed_ms};
use crate::error::GatewayError;
use crate::health::HealthMemo;
use crate::protocol::google::{GoogleRequest, GoogleResponse, build_request, response_to_turn};
use crate::types::{PromptRequest, PromptResponse, TokenUsage};

/// Default API base URL
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Adapter for Vertex-style generateContent APIs
pub struct GoogleAdapter {
    name: String,
    model: String,
    client: Client,
    base_url: Url,
    api_key: Option<SecretString>,
    enabled: bool,
    government_eligible: bool,
    rates: CostRates,
    health: HealthMemo,
}

impl GoogleAdapter {
    /// Create from provider configuration and an injected HTTP client
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded default base URL is invalid (never happens).
    pub fn new(name: String, config: &ProviderConfig, client: Client) -> Self {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| Url::parse(DEFAULT_BASE_URL).expect("valid default URL"));

        Self {
            name,
            model: config.model.clone(),
            client,
            base_url,
            api_key: config.api_key.clone(),
            enabled: config.enabled,
            government_eligible: config.government_eligible,
            rates: config.rates,
            health: HealthMemo::new(),
        }
    }

    /// Endpoint URL; this family authenticates via a query parameter
    fn generate_url(&self, api_key: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/models/{}:generateContent?key={api_key}", self.model)
    }

    async fn round_trip(&self, wire: &GoogleRequest) -> Result<GoogleResponse, GatewayError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| GatewayError::Upstream("api key not configured".to_owned()))?;

        let response = self
            .client
            .post(self.generate_url(api_key.expose_secret()))
            .json(wire)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(provider = %self.name, error = %e, "upstream request failed");
                GatewayError::Upstream(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(provider = %self.name, status = %status, "upstream returned error");
            return Err(GatewayError::Upstream(format!("provider returned {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| GatewayError::Upstream(format!("failed to parse response: {e}")))
    }
}

#[async_trait]
impl ProviderAdapter for GoogleAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn government_eligible(&self) -> bool {
        self.government_eligible
    }

    fn rates(&self) -> &CostRates {
        &self.rates
    }

    fn health(&self) -> &HealthMemo {
        &self.health
    }

    fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities { tool_use: false }
    }

    fn configured(&self) -> bool {
        // An env-defaulted empty key is "not configured", not an error
        self.api_key.as_ref().is_some_and(|key| !key.expose_secret().is_empty())
    }

    async fn send(&self, request: &PromptRequest) -> Result<PromptResponse, GatewayError> {
        let start = Instant::now();
        let conversation = request.conversation();
        let wire = build_request(request, &conversation);
        let response = self.round_trip(&wire).await?;
        let turn = response_to_turn(&response);

        let usage = TokenUsage {
            cost: self.calculate_cost(&turn.usage),
            ..turn.usage
        };

        let mut metadata = HashMap::new();
        if let Some(finish) = turn.raw.as_ref().and_then(|raw| raw.pointer("/candidates/0/finishReason")) {
            metadata.insert("finish_reason".to_owned(), finish.clone());
        }

        Ok(PromptResponse {
            content: turn.text.unwrap_or_default(),
            provider: self.name.clone(),
            model: self.model.clone(),
            usage,
            latency_ms: elapsed_ms(start),
            finish: turn.stop,
            metadata,
            tool_results: Vec::new(),
            raw: turn.raw,
        })
    }
}

//! Gateway orchestrator
//!
//! Walks the routed provider chain sequentially: skips providers that are
//! disabled or not viable, adapts the prompt per provider, dispatches
//! single-shot or tool-conversation calls, and fails over on error. The
//! chain is never raced in parallel; one logical request pays for at most
//! one provider. Only exhaustion of the whole chain surfaces to the
//! caller.

use std::collections::BTreeMap;
use std::sync::Arc;

use girder_config::{GatewayConfig, ProviderKind};
use indexmap::IndexMap;
use serde::Serialize;

use crate::error::GatewayError;
use crate::provider::{ProviderAdapter, anthropic::AnthropicAdapter, google::GoogleAdapter, openai::OpenAiAdapter};
use crate::routing::RoutingPolicy;
use crate::types::{PromptRequest, PromptResponse};
use crate::variant::VariantResolver;

/// Read-only provider snapshot for operational dashboards
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    /// Whether credentials are present
    pub configured: bool,
    /// Whether configuration enables the provider
    pub enabled: bool,
    /// Whether government-tier traffic may be routed here
    pub government_eligible: bool,
    /// Model id the provider dispatches to
    pub model: String,
}

/// The gateway: adapter registry, routing policy, and prompt variants
pub struct Gateway {
    adapters: IndexMap<String, Arc<dyn ProviderAdapter>>,
    policy: RoutingPolicy,
    variants: VariantResolver,
}

impl Gateway {
    /// Build a gateway from explicit parts
    ///
    /// Every provider name any chain can return must have a registered
    /// adapter; a dangling name is a configuration error, caught here
    /// rather than at call time.
    pub fn new(
        adapters: IndexMap<String, Arc<dyn ProviderAdapter>>,
        policy: RoutingPolicy,
        variants: VariantResolver,
    ) -> Result<Self, GatewayError> {
        for chain in policy.chains() {
            if chain.is_empty() {
                return Err(GatewayError::Config(
                    "routing policy contains an empty provider chain".to_owned(),
                ));
            }
            for name in chain {
                if !adapters.contains_key(name) {
                    return Err(GatewayError::UnknownProvider(name.clone()));
                }
            }
        }

        Ok(Self {
            adapters,
            policy,
            variants,
        })
    }

    /// Build a gateway from loaded configuration, constructing one
    /// adapter per provider entry with a shared HTTP client
    pub fn from_config(config: &GatewayConfig, client: reqwest::Client) -> Result<Self, GatewayError> {
        let mut adapters: IndexMap<String, Arc<dyn ProviderAdapter>> = IndexMap::new();

        for (name, provider_config) in &config.providers {
            let adapter: Arc<dyn ProviderAdapter> = match provider_config.kind {
                ProviderKind::Anthropic => {
                    Arc::new(AnthropicAdapter::new(name.clone(), provider_config, client.clone()))
                }
                ProviderKind::Openai => {
                    Arc::new(OpenAiAdapter::new(name.clone(), provider_config, client.clone()))
                }
                ProviderKind::Google => {
                    Arc::new(GoogleAdapter::new(name.clone(), provider_config, client.clone()))
                }
            };
            adapters.insert(name.clone(), adapter);
        }

        let policy = RoutingPolicy::from_config(&config.routing);
        Self::new(adapters, policy, VariantResolver::new())
    }

    /// Replace the prompt variant resolver
    #[must_use]
    pub fn with_variants(mut self, variants: VariantResolver) -> Self {
        self.variants = variants;
        self
    }

    /// Dispatch one normalized request through the routed chain
    ///
    /// Returns the first successful provider response. Skips (missing
    /// credentials, disabled, missing tool capability) are silent;
    /// failures are logged and absorbed by failover. Only when every
    /// provider in the chain is skipped or fails does an error surface,
    /// carrying the most recent failure's message.
    pub async fn send_prompt(&self, request: &PromptRequest) -> Result<PromptResponse, GatewayError> {
        let request_id = uuid::Uuid::new_v4();
        let chain = self.policy.route(request);
        tracing::debug!(
            %request_id,
            task = %request.task,
            tier = %request.tier,
            tenant = %request.tenant_id,
            ?chain,
            "routing request"
        );

        let wants_tools = request.wants_tools();
        let mut last_error: Option<GatewayError> = None;

        for name in chain {
            let Some(adapter) = self.adapters.get(name) else {
                // Chains are validated at construction; an unknown name
                // here means the registry and policy diverged
                tracing::error!(provider = %name, "provider in chain has no registered adapter");
                continue;
            };

            if !adapter.enabled() {
                tracing::debug!(provider = %name, "provider disabled, skipping");
                continue;
            }

            if !adapter.available().await {
                tracing::debug!(provider = %name, "provider not configured, skipping");
                continue;
            }

            let adapted = self.variants.adapt(request, name);

            let result = if wants_tools {
                // A tool-bearing request must never silently degrade to a
                // tool-less single shot
                match adapter.tool_dialog() {
                    Some(dialog) => dialog.send_with_tools(&adapted).await,
                    None => {
                        tracing::warn!(
                            %request_id,
                            provider = %name,
                            "provider lacks tool support, skipping"
                        );
                        continue;
                    }
                }
            } else {
                adapter.send(&adapted).await
            };

            match result {
                Ok(response) => {
                    tracing::info!(
                        %request_id,
                        provider = %response.provider,
                        model = %response.model,
                        latency_ms = response.latency_ms,
                        input_tokens = response.usage.input_tokens,
                        output_tokens = response.usage.output_tokens,
                        cost_usd = response.usage.cost,
                        "prompt dispatched"
                    );
                    return Ok(response);
                }
                Err(e) => {
                    tracing::warn!(
                        %request_id,
                        provider = %name,
                        error = %e,
                        "provider failed, trying next in chain"
                    );
                    last_error = Some(e);
                }
            }
        }

        let last = last_error.map_or_else(
            || "no eligible providers in chain".to_owned(),
            |e| e.to_string(),
        );
        tracing::error!(%request_id, error = %last, "provider chain exhausted");
        Err(GatewayError::Exhausted { last })
    }

    /// Pre-flight cost estimate at the first provider the request would
    /// route to; for display and budgeting, never for control flow
    pub fn estimate_cost(&self, request: &PromptRequest) -> Option<f64> {
        let chain = self.policy.route(request);
        chain
            .first()
            .and_then(|name| self.adapters.get(name))
            .map(|adapter| adapter.estimate_cost(request))
    }

    /// Read-only snapshot of every registered provider
    pub fn provider_health(&self) -> BTreeMap<String, ProviderStatus> {
        self.adapters
            .iter()
            .map(|(name, adapter)| {
                (
                    name.clone(),
                    ProviderStatus {
                        configured: adapter.configured(),
                        enabled: adapter.enabled(),
                        government_eligible: adapter.government_eligible(),
                        model: adapter.model().to_owned(),
                    },
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use girder_config::{ClientTier, CostRates, TaskType};
    use serde_json::json;

    use super::*;
    use crate::health::HealthMemo;
    use crate::provider::{AdapterCapabilities, ToolDialog};
    use crate::routing::{RoutingRule, RuleMatch};
    use crate::types::{FinishReason, TokenUsage, ToolDefinition, ToolKit};
    use crate::variant::{PromptTemplate, style};

    struct MockAdapter {
        name: String,
        configured: bool,
        fail_message: Option<String>,
        tool_capable: bool,
        send_calls: AtomicU32,
        tool_calls: AtomicU32,
        last_prompt: Mutex<Option<String>>,
        rates: CostRates,
        health: HealthMemo,
    }

    impl MockAdapter {
        fn ok(name: &str) -> Self {
            Self::build(name, true, None, false)
        }

        fn failing(name: &str, message: &str) -> Self {
            Self::build(name, true, Some(message.to_owned()), false)
        }

        fn unconfigured(name: &str) -> Self {
            Self::build(name, false, None, false)
        }

        fn tool_capable(name: &str) -> Self {
            Self::build(name, true, None, true)
        }

        fn build(name: &str, configured: bool, fail_message: Option<String>, tool_capable: bool) -> Self {
            Self {
                name: name.to_owned(),
                configured,
                fail_message,
                tool_capable,
                send_calls: AtomicU32::new(0),
                tool_calls: AtomicU32::new(0),
                last_prompt: Mutex::new(None),
                rates: CostRates {
                    input_per_million: 1.0,
                    output_per_million: 2.0,
                },
                health: HealthMemo::new(),
            }
        }

        fn response(&self) -> PromptResponse {
            PromptResponse {
                content: format!("answer from {}", self.name),
                provider: self.name.clone(),
                model: "mock-model".to_owned(),
                usage: TokenUsage {
                    input_tokens: 10,
                    output_tokens: 5,
                    cost: 0.0,
                },
                latency_ms: 1,
                finish: FinishReason::Stop,
                metadata: HashMap::new(),
                tool_results: Vec::new(),
                raw: None,
            }
        }

        fn dispatch(&self) -> Result<PromptResponse, GatewayError> {
            self.fail_message.as_ref().map_or_else(
                || Ok(self.response()),
                |message| Err(GatewayError::Upstream(message.clone())),
            )
        }
    }

    #[async_trait]
    impl ProviderAdapter for MockAdapter {
        fn name(&self) -> &str {
            &self.name
        }

        fn model(&self) -> &str {
            "mock-model"
        }

        fn enabled(&self) -> bool {
            true
        }

        fn government_eligible(&self) -> bool {
            false
        }

        fn rates(&self) -> &CostRates {
            &self.rates
        }

        fn health(&self) -> &HealthMemo {
            &self.health
        }

        fn capabilities(&self) -> AdapterCapabilities {
            AdapterCapabilities {
                tool_use: self.tool_capable,
            }
        }

        fn configured(&self) -> bool {
            self.configured
        }

        async fn send(&self, request: &PromptRequest) -> Result<PromptResponse, GatewayError> {
            self.send_calls.fetch_add(1, Ordering::Relaxed);
            *self.last_prompt.lock().unwrap() = request.prompt.clone();
            self.dispatch()
        }

        fn tool_dialog(&self) -> Option<&dyn ToolDialog> {
            self.tool_capable.then_some(self as &dyn ToolDialog)
        }
    }

    #[async_trait]
    impl ToolDialog for MockAdapter {
        async fn send_with_tools(&self, _request: &PromptRequest) -> Result<PromptResponse, GatewayError> {
            self.tool_calls.fetch_add(1, Ordering::Relaxed);
            self.dispatch()
        }
    }

    fn gateway_over(adapters: Vec<Arc<MockAdapter>>, chain: &[&str]) -> Gateway {
        let registry: IndexMap<String, Arc<dyn ProviderAdapter>> = adapters
            .into_iter()
            .map(|adapter| (adapter.name.clone(), adapter as Arc<dyn ProviderAdapter>))
            .collect();
        let policy = RoutingPolicy::new(
            Vec::new(),
            chain.iter().map(|&name| name.to_owned()).collect(),
        );
        Gateway::new(registry, policy, VariantResolver::new()).unwrap()
    }

    fn request() -> PromptRequest {
        PromptRequest::new(TaskType::Chat, ClientTier::Standard, "tenant-1")
            .with_prompt("Any change orders on the Fairview job?")
    }

    fn tool_request() -> PromptRequest {
        request().with_tools(
            vec![ToolDefinition {
                name: "site_lookup".to_owned(),
                description: None,
                input_schema: json!({"type": "object"}),
            }],
            ToolKit::new(),
        )
    }

    #[tokio::test]
    async fn first_success_stops_the_chain() {
        let a = Arc::new(MockAdapter::ok("a"));
        let b = Arc::new(MockAdapter::ok("b"));
        let gateway = gateway_over(vec![Arc::clone(&a), Arc::clone(&b)], &["a", "b"]);

        let response = gateway.send_prompt(&request()).await.unwrap();
        assert_eq!(response.provider, "a");
        assert_eq!(a.send_calls.load(Ordering::Relaxed), 1);
        assert_eq!(b.send_calls.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn failover_swallows_earlier_errors() {
        let a = Arc::new(MockAdapter::failing("a", "a down"));
        let b = Arc::new(MockAdapter::failing("b", "b down"));
        let c = Arc::new(MockAdapter::ok("c"));
        let gateway = gateway_over(
            vec![Arc::clone(&a), Arc::clone(&b), Arc::clone(&c)],
            &["a", "b", "c"],
        );

        let response = gateway.send_prompt(&request()).await.unwrap();
        assert_eq!(response.provider, "c");
        assert_eq!(a.send_calls.load(Ordering::Relaxed), 1);
        assert_eq!(b.send_calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn exhaustion_carries_the_most_recent_error() {
        let a = Arc::new(MockAdapter::failing("a", "first down"));
        let b = Arc::new(MockAdapter::failing("b", "second down"));
        let gateway = gateway_over(vec![a, b], &["a", "b"]);

        let err = gateway.send_prompt(&request()).await.unwrap_err();
        let GatewayError::Exhausted { last } = err else {
            panic!("expected exhaustion, got {err}");
        };
        assert!(last.contains("second down"));
        assert!(!last.contains("first down"));
    }

    #[tokio::test]
    async fn unconfigured_provider_is_never_invoked() {
        let a = Arc::new(MockAdapter::unconfigured("a"));
        let b = Arc::new(MockAdapter::ok("b"));
        let gateway = gateway_over(vec![Arc::clone(&a), Arc::clone(&b)], &["a", "b"]);

        let response = gateway.send_prompt(&request()).await.unwrap();
        assert_eq!(response.provider, "b");
        assert_eq!(a.send_calls.load(Ordering::Relaxed), 0);
        assert_eq!(a.tool_calls.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn tool_request_skips_tool_less_provider() {
        let plain = Arc::new(MockAdapter::ok("plain"));
        let tooled = Arc::new(MockAdapter::tool_capable("tooled"));
        let gateway = gateway_over(vec![Arc::clone(&plain), Arc::clone(&tooled)], &["plain", "tooled"]);

        let response = gateway.send_prompt(&tool_request()).await.unwrap();
        assert_eq!(response.provider, "tooled");
        // Never degraded to a tool-less single shot
        assert_eq!(plain.send_calls.load(Ordering::Relaxed), 0);
        assert_eq!(tooled.tool_calls.load(Ordering::Relaxed), 1);
        assert_eq!(tooled.send_calls.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn tool_request_with_no_capable_provider_exhausts() {
        let plain = Arc::new(MockAdapter::ok("plain"));
        let gateway = gateway_over(vec![Arc::clone(&plain)], &["plain"]);

        let err = gateway.send_prompt(&tool_request()).await.unwrap_err();
        let GatewayError::Exhausted { last } = err else {
            panic!("expected exhaustion, got {err}");
        };
        assert!(last.contains("no eligible providers"));
        assert_eq!(plain.send_calls.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn variant_adaptation_reaches_the_adapter() {
        let a = Arc::new(MockAdapter::ok("a"));
        let registry: IndexMap<String, Arc<dyn ProviderAdapter>> =
            IndexMap::from([("a".to_owned(), Arc::clone(&a) as Arc<dyn ProviderAdapter>)]);
        let policy = RoutingPolicy::new(Vec::new(), vec!["a".to_owned()]);

        let mut variants = VariantResolver::new();
        variants.register(
            TaskType::Chat,
            "a",
            PromptTemplate {
                system: None,
                user: Some(style::json_user),
            },
        );

        let gateway = Gateway::new(registry, policy, variants).unwrap();
        gateway.send_prompt(&request()).await.unwrap();

        let seen = a.last_prompt.lock().unwrap().clone().unwrap();
        assert!(seen.contains("valid JSON only"));
    }

    #[test]
    fn construction_rejects_unknown_chain_name() {
        let a = Arc::new(MockAdapter::ok("a"));
        let registry: IndexMap<String, Arc<dyn ProviderAdapter>> =
            IndexMap::from([("a".to_owned(), a as Arc<dyn ProviderAdapter>)]);
        let policy = RoutingPolicy::new(
            vec![RoutingRule {
                matcher: RuleMatch::default(),
                providers: vec!["ghost".to_owned()],
            }],
            vec!["a".to_owned()],
        );

        let err = Gateway::new(registry, policy, VariantResolver::new()).unwrap_err();
        assert!(matches!(err, GatewayError::UnknownProvider(name) if name == "ghost"));
    }

    #[test]
    fn provider_health_reports_every_adapter() {
        let a = Arc::new(MockAdapter::ok("a"));
        let b = Arc::new(MockAdapter::unconfigured("b"));
        let gateway = gateway_over(vec![a, b], &["a"]);

        let health = gateway.provider_health();
        assert_eq!(health.len(), 2);
        assert!(health["a"].configured);
        assert!(!health["b"].configured);
        assert_eq!(health["a"].model, "mock-model");
    }

    #[test]
    fn estimate_cost_uses_the_routed_chain_head() {
        let a = Arc::new(MockAdapter::ok("a"));
        let gateway = gateway_over(vec![a], &["a"]);

        let request = request().with_max_tokens(1_000_000);
        // 1M output tokens at $2/M dominates the estimate
        let estimate = gateway.estimate_cost(&request).unwrap();
        assert!(estimate > 1.9 && estimate < 2.1);
    }
}

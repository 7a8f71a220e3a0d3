//! Provider adapter contract and implementations
//!
//! An adapter translates the gateway's normalized request/response into
//! one backend's wire format. Adapters never retry internally; failover
//! is the orchestrator's job. Tool-use support is a type-level
//! capability: adapters that can drive the conversation loop expose it
//! through [`ProviderAdapter::tool_dialog`], and the orchestrator skips
//! providers that return `None` for tool-bearing requests.

pub mod anthropic;
pub mod google;
pub mod openai;

use async_trait::async_trait;
use girder_config::CostRates;

use crate::error::GatewayError;
use crate::health::HealthMemo;
use crate::types::{PromptRequest, PromptResponse, TokenUsage};

/// Output-token estimate used when the request sets no budget
pub const DEFAULT_OUTPUT_ESTIMATE: u32 = 1024;

/// Capabilities advertised by an adapter
#[derive(Debug, Clone, Copy)]
pub struct AdapterCapabilities {
    /// Whether the adapter can drive a tool-use conversation
    pub tool_use: bool,
}

/// Uniform contract every backend adapter implements
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Adapter name as registered in configuration
    fn name(&self) -> &str;

    /// Exact model id sent on every request
    fn model(&self) -> &str;

    /// Whether configuration enables this adapter at all
    fn enabled(&self) -> bool;

    /// Whether government-tier traffic may be routed here
    fn government_eligible(&self) -> bool;

    /// Per-token cost rates for this adapter's model
    fn rates(&self) -> &CostRates;

    /// The adapter's health memo
    fn health(&self) -> &HealthMemo;

    /// Advertised capabilities
    fn capabilities(&self) -> AdapterCapabilities;

    /// Whether the credentials this backend requires are present;
    /// cheap, synchronous, no network call
    fn configured(&self) -> bool;

    /// Cached viability within the health TTL; recomputed lazily as
    /// `configured()` after expiry. Never errors.
    async fn available(&self) -> bool {
        self.health().probe(|| self.configured())
    }

    /// Single-shot call: build the provider-native payload, dispatch,
    /// and normalize the reply
    async fn send(&self, request: &PromptRequest) -> Result<PromptResponse, GatewayError>;

    /// Tool-use capability; `None` means the orchestrator must skip
    /// this adapter for tool-bearing requests
    fn tool_dialog(&self) -> Option<&dyn ToolDialog> {
        None
    }

    /// Cheap pre-flight cost estimate for display and budgeting, never
    /// for control flow: `prompt chars / 4` as the input-token proxy,
    /// `max_tokens` (or a fixed default) as the output estimate
    fn estimate_cost(&self, request: &PromptRequest) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let input_tokens = request.prompt_chars() as f64 / 4.0;
        let output_tokens = f64::from(request.max_tokens.unwrap_or(DEFAULT_OUTPUT_ESTIMATE));
        let rates = self.rates();
        (input_tokens / 1_000_000.0) * rates.input_per_million
            + (output_tokens / 1_000_000.0) * rates.output_per_million
    }

    /// Exact cost from actual token counts, pure in `(usage, rates)`
    fn calculate_cost(&self, usage: &TokenUsage) -> f64 {
        cost_of(self.rates(), usage.input_tokens, usage.output_tokens)
    }
}

/// Tool-use conversation capability
#[async_trait]
pub trait ToolDialog: Send + Sync {
    /// Drive the full bounded tool conversation and return the final
    /// normalized response
    async fn send_with_tools(&self, request: &PromptRequest) -> Result<PromptResponse, GatewayError>;
}

/// Cost in USD for a token count at the given rates
pub fn cost_of(rates: &CostRates, input_tokens: u32, output_tokens: u32) -> f64 {
    (f64::from(input_tokens) / 1_000_000.0) * rates.input_per_million
        + (f64::from(output_tokens) / 1_000_000.0) * rates.output_per_million
}

/// Milliseconds elapsed since `start`, saturating
pub(crate) fn elapsed_ms(start: std::time::Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

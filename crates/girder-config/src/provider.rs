use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Configuration for a single model provider
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Provider wire-protocol family
    #[serde(rename = "type")]
    pub kind: ProviderKind,
    /// API key for authentication; absent means "not configured"
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override for self-hosted or proxied deployments
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Model identifier sent on every request
    pub model: String,
    /// Whether this provider participates in routing at all
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Whether government-tier traffic may be routed here
    #[serde(default)]
    pub government_eligible: bool,
    /// Per-token cost rates for this provider's model
    #[serde(default)]
    pub rates: CostRates,
}

/// Supported provider wire-protocol families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Messages API with a top-level system field and tool_use blocks
    Anthropic,
    /// Chat-completions API with function-style tool declarations
    Openai,
    /// generateContent API with contents/parts and systemInstruction
    Google,
}

/// Cost rates in USD per million tokens
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CostRates {
    /// Cost per million input (prompt) tokens
    #[serde(default)]
    pub input_per_million: f64,
    /// Cost per million output (completion) tokens
    #[serde(default)]
    pub output_per_million: f64,
}

const fn default_true() -> bool {
    true
}

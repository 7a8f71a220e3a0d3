//! Configuration for the girder model-request gateway
//!
//! Providers, cost rates, and routing rules are static configuration,
//! loaded once at process start from a TOML file with `{{ env.VAR }}`
//! placeholder expansion. Absence of an API key for a provider is a
//! normal "not configured" state, not a load failure.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod env;
pub mod loader;
pub mod provider;
pub mod routing;

use indexmap::IndexMap;
use serde::Deserialize;

pub use provider::{CostRates, ProviderConfig, ProviderKind};
pub use routing::{ClientTier, Priority, RoutingConfig, RuleConfig, RuleMatchConfig, TaskType};

/// Top-level gateway configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Provider configurations keyed by name; declaration order is
    /// preserved and meaningful for operational listings
    #[serde(default)]
    pub providers: IndexMap<String, ProviderConfig>,
    /// Routing rules and the default failover chain
    #[serde(default)]
    pub routing: RoutingConfig,
}

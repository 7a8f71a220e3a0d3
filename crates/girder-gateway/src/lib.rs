//! Model-request gateway for the girder platform
//!
//! Accepts a normalized prompt/tool-call request, selects an ordered chain
//! of backend providers according to routing policy, adapts the request to
//! each provider's wire shape, optionally runs a bounded tool-use
//! conversation, and fails over along the chain — tracking cost and health
//! throughout. One logical request pays for at most one provider: the
//! chain is walked sequentially and the first success wins.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod error;
pub mod health;
pub mod orchestrator;
pub mod protocol;
pub mod provider;
pub mod routing;
pub mod toolloop;
pub mod types;
pub mod variant;

pub use error::GatewayError;
pub use girder_config::{ClientTier, CostRates, Priority, ProviderKind, TaskType};
pub use health::HealthMemo;
pub use orchestrator::{Gateway, ProviderStatus};
pub use provider::{AdapterCapabilities, ProviderAdapter, ToolDialog};
pub use routing::{RoutingPolicy, RoutingRule, RuleMatch};
pub use toolloop::{ModelTurn, ROUND_LIMIT_FALLBACK, ToolTurnDriver};
pub use types::{
    Content, ExecutedTool, FinishReason, Message, PromptRequest, PromptResponse, Role, TokenUsage,
    ToolCall, ToolDefinition, ToolExecutor, ToolKit, ToolResultBlock,
};
pub use variant::{PromptTemplate, VariantResolver};

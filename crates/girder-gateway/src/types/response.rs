use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Reason the dispatch finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural end of generation
    Stop,
    /// Hit the `max_tokens` limit
    Length,
    /// Model stopped to request tools (single-shot calls only)
    ToolCalls,
    /// Tool conversation hit its round bound and degraded to the
    /// fixed fallback text; still a success, never an error
    RoundLimit,
}

/// Token usage and cost, additive across tool-use rounds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens consumed by prompts across all rounds
    pub input_tokens: u32,
    /// Tokens generated across all rounds
    pub output_tokens: u32,
    /// Cost in USD at the answering provider's rates
    pub cost: f64,
}

impl TokenUsage {
    /// Fold another round's token counts into this accumulator
    pub fn absorb(&mut self, other: Self) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.cost += other.cost;
    }
}

/// A tool invocation that actually executed successfully
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutedTool {
    /// Tool name
    pub tool: String,
    /// Input the model supplied
    pub input: serde_json::Value,
    /// Value the executor returned
    pub result: serde_json::Value,
}

/// Normalized reply from whichever provider answered
#[derive(Debug, Clone, Serialize)]
pub struct PromptResponse {
    /// Final text content
    pub content: String,
    /// Name of the adapter that answered
    pub provider: String,
    /// Exact model id used
    pub model: String,
    /// Accumulated token usage and cost
    pub usage: TokenUsage,
    /// Wall-clock latency of the dispatch, tool rounds included
    pub latency_ms: u64,
    /// Why the dispatch finished
    pub finish: FinishReason,
    /// Provider-specific extras, opaque to callers
    pub metadata: HashMap<String, serde_json::Value>,
    /// Tools executed during the conversation, in execution order
    pub tool_results: Vec<ExecutedTool>,
    /// Raw provider payload for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
}

//! Bounded tool-use conversation loop
//!
//! A trampoline over a possibly-buggy model that keeps requesting tools:
//! each round sends the conversation to the backend, executes whatever
//! tool calls come back (sequentially, in request order), appends the
//! results as a single user turn, and repeats. The round cap is the one
//! piece of backpressure bounding total backend calls; hitting it
//! degrades to a fixed fallback message rather than an error. One failing
//! tool never aborts its siblings in the same round.

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::types::{
    ExecutedTool, FinishReason, Message, PromptRequest, TokenUsage, ToolCall, ToolOutcome,
};

/// Fallback text returned when the round cap is reached without a final
/// answer
pub const ROUND_LIMIT_FALLBACK: &str =
    "I hit a processing limit while working on this request. Please try again or break the \
     request into smaller steps.";

/// One backend round-trip in a tool conversation
#[derive(Debug)]
pub struct ModelTurn {
    /// Text the model emitted this turn
    pub text: Option<String>,
    /// Tool invocations the model requested; empty means final answer
    pub calls: Vec<ToolCall>,
    /// Token counts for this turn only
    pub usage: TokenUsage,
    /// Backend stop reason mapped to the normalized form
    pub stop: FinishReason,
    /// Raw provider payload for debugging
    pub raw: Option<serde_json::Value>,
}

/// Backend capable of producing one tool-conversation turn
///
/// Adapters implement this once; the loop drives any driver the same
/// way, so round semantics live in exactly one place.
#[async_trait]
pub trait ToolTurnDriver: Send + Sync {
    /// Send the conversation and declared tools, returning the model's
    /// next turn
    async fn next_turn(
        &self,
        request: &PromptRequest,
        conversation: &[Message],
    ) -> Result<ModelTurn, GatewayError>;
}

/// What a completed (or capped) conversation produced
#[derive(Debug)]
pub struct LoopOutcome {
    /// Final text, or the fixed fallback on round-cap exhaustion
    pub content: String,
    /// Token counts accumulated across every round
    pub usage: TokenUsage,
    /// Successfully executed tools, in execution order
    pub tool_results: Vec<ExecutedTool>,
    /// Terminal stop reason
    pub finish: FinishReason,
    /// Raw payload of the last turn
    pub raw: Option<serde_json::Value>,
}

/// Run a bounded tool conversation against a driver
///
/// Makes at most `request.max_tool_rounds` backend calls. Per-tool
/// failures (unknown tool name, executor error) are surfaced to the
/// model as structured error blocks and never abort the round.
pub async fn run(
    driver: &dyn ToolTurnDriver,
    request: &PromptRequest,
) -> Result<LoopOutcome, GatewayError> {
    let executors = request.executors.as_ref().ok_or_else(|| {
        GatewayError::InvalidRequest("tool conversation requires registered executors".to_owned())
    })?;

    let mut conversation = request.conversation();
    let mut usage = TokenUsage::default();
    let mut tool_results = Vec::new();

    for round in 0..request.max_tool_rounds {
        let turn = driver.next_turn(request, &conversation).await?;
        usage.absorb(turn.usage);

        if turn.calls.is_empty() {
            return Ok(LoopOutcome {
                content: turn.text.unwrap_or_default(),
                usage,
                tool_results,
                finish: turn.stop,
                raw: turn.raw,
            });
        }

        tracing::debug!(round, calls = turn.calls.len(), "model requested tools");
        conversation.push(Message::tool_use(turn.text.clone(), turn.calls.clone()));

        let mut blocks = Vec::with_capacity(turn.calls.len());
        for call in &turn.calls {
            let outcome = execute_call(executors, call, request, &mut tool_results).await;
            blocks.push(outcome.into_block(&call.id));
        }
        conversation.push(Message::tool_results(blocks));
    }

    tracing::warn!(
        rounds = request.max_tool_rounds,
        tenant = %request.tenant_id,
        "tool conversation hit round limit, returning fallback"
    );

    Ok(LoopOutcome {
        content: ROUND_LIMIT_FALLBACK.to_owned(),
        usage,
        tool_results,
        finish: FinishReason::RoundLimit,
        raw: None,
    })
}

/// Execute one requested call, isolating any failure into an error
/// outcome the model can react to
async fn execute_call(
    executors: &crate::types::ToolKit,
    call: &ToolCall,
    request: &PromptRequest,
    tool_results: &mut Vec<ExecutedTool>,
) -> ToolOutcome {
    let Some(executor) = executors.get(&call.name) else {
        tracing::warn!(tool = %call.name, "model requested unknown tool");
        return ToolOutcome::Err(format!("unknown tool: {}", call.name));
    };

    match executor.execute(call.input.clone(), &request.tenant_id).await {
        Ok(value) => {
            tool_results.push(ExecutedTool {
                tool: call.name.clone(),
                input: call.input.clone(),
                result: value.clone(),
            });
            ToolOutcome::Ok(value)
        }
        Err(e) => {
            tracing::warn!(tool = %call.name, error = %e, "tool executor failed");
            ToolOutcome::Err(e.to_string())
        }
    }
}

//! Anthropic-style Messages API wire format
//!
//! This family takes the system prompt as a distinct top-level field,
//! tool schemas as `{name, description, input_schema}`, and tool results
//! as `tool_result` content blocks inside a user message.

use serde::{Deserialize, Serialize};

use crate::toolloop::ModelTurn;
use crate::types::{Content, FinishReason, Message, PromptRequest, Role, TokenUsage, ToolCall};

/// The messages endpoint requires `max_tokens`; used when the request
/// sets none
const DEFAULT_MAX_TOKENS: u32 = 4096;

// -- Request types --

/// Messages API request
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicRequest {
    /// Model identifier
    pub model: String,
    /// Maximum tokens to generate (required by this family)
    pub max_tokens: u32,
    /// System prompt (top-level, not in messages)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Conversation messages
    pub messages: Vec<AnthropicMessage>,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Tool definitions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<AnthropicTool>>,
}

/// Message with either shorthand text or structured blocks
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicMessage {
    /// "user" or "assistant"
    pub role: String,
    /// Message content
    pub content: AnthropicContent,
}

/// Content as a plain string or an array of blocks
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AnthropicContent {
    /// Plain text shorthand
    Text(String),
    /// Structured content blocks
    Blocks(Vec<AnthropicBlock>),
}

/// Content block in a request message
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicBlock {
    /// Text content
    Text {
        /// The text string
        text: String,
    },
    /// Tool use request echoed back from the assistant turn
    ToolUse {
        /// Tool use identifier
        id: String,
        /// Tool name
        name: String,
        /// Tool input as JSON
        input: serde_json::Value,
    },
    /// Tool result in a user turn
    ToolResult {
        /// Tool use ID this result responds to
        tool_use_id: String,
        /// JSON-encoded result content
        content: String,
        /// Whether the tool call errored
        is_error: bool,
    },
}

/// Tool definition
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicTool {
    /// Tool name
    pub name: String,
    /// Human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for input parameters
    pub input_schema: serde_json::Value,
}

// -- Response types --

/// Messages API response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicResponse {
    /// Response identifier
    pub id: String,
    /// Model used
    pub model: String,
    /// Response content blocks
    pub content: Vec<AnthropicResponseBlock>,
    /// Stop reason ("end_turn", "tool_use", "max_tokens")
    #[serde(default)]
    pub stop_reason: Option<String>,
    /// Token usage
    #[serde(default)]
    pub usage: AnthropicUsage,
}

/// Content block in a response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicResponseBlock {
    /// Text content
    Text {
        /// The text string
        text: String,
    },
    /// Tool invocation request
    ToolUse {
        /// Tool use identifier
        id: String,
        /// Tool name
        name: String,
        /// Tool input as JSON
        input: serde_json::Value,
    },
}

/// Token usage in a response
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AnthropicUsage {
    /// Tokens consumed by the prompt
    #[serde(default)]
    pub input_tokens: u32,
    /// Tokens generated
    #[serde(default)]
    pub output_tokens: u32,
}

// -- Conversions --

/// Build a wire request from a normalized request and conversation
pub fn build_request(request: &PromptRequest, model: &str, conversation: &[Message]) -> AnthropicRequest {
    let mut system = request.system_prompt.clone();
    let mut messages = Vec::new();

    for message in conversation {
        match (message.role, &message.content) {
            // Stray system turns fold into the top-level field
            (Role::System, content) => {
                let text = content.as_text();
                system = Some(match system.take() {
                    Some(existing) => format!("{existing}\n\n{text}"),
                    None => text,
                });
            }
            (role, Content::Text { text }) => messages.push(AnthropicMessage {
                role: wire_role(role),
                content: AnthropicContent::Text(text.clone()),
            }),
            (_, Content::ToolUse { text, calls }) => {
                let mut blocks = Vec::with_capacity(calls.len() + 1);
                if let Some(text) = text
                    && !text.is_empty()
                {
                    blocks.push(AnthropicBlock::Text { text: text.clone() });
                }
                blocks.extend(calls.iter().map(|call| AnthropicBlock::ToolUse {
                    id: call.id.clone(),
                    name: call.name.clone(),
                    input: call.input.clone(),
                }));
                messages.push(AnthropicMessage {
                    role: "assistant".to_owned(),
                    content: AnthropicContent::Blocks(blocks),
                });
            }
            (_, Content::ToolResults { blocks }) => {
                let blocks = blocks
                    .iter()
                    .map(|block| AnthropicBlock::ToolResult {
                        tool_use_id: block.tool_use_id.clone(),
                        content: block.content.clone(),
                        is_error: block.is_error,
                    })
                    .collect();
                messages.push(AnthropicMessage {
                    role: "user".to_owned(),
                    content: AnthropicContent::Blocks(blocks),
                });
            }
        }
    }

    let tools = if request.tools.is_empty() {
        None
    } else {
        Some(
            request
                .tools
                .iter()
                .map(|tool| AnthropicTool {
                    name: tool.name.clone(),
                    description: tool.description.clone(),
                    input_schema: tool.input_schema.clone(),
                })
                .collect(),
        )
    };

    AnthropicRequest {
        model: model.to_owned(),
        max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        system,
        messages,
        temperature: request.temperature,
        tools,
    }
}

fn wire_role(role: Role) -> String {
    match role {
        Role::Assistant => "assistant",
        _ => "user",
    }
    .to_owned()
}

/// Normalize a wire response into one conversation turn
pub fn response_to_turn(response: &AnthropicResponse) -> ModelTurn {
    let mut text_parts: Vec<&str> = Vec::new();
    let mut calls = Vec::new();

    for block in &response.content {
        match block {
            AnthropicResponseBlock::Text { text } => text_parts.push(text),
            AnthropicResponseBlock::ToolUse { id, name, input } => calls.push(ToolCall {
                id: id.clone(),
                name: name.clone(),
                input: input.clone(),
            }),
        }
    }

    let stop = match response.stop_reason.as_deref() {
        Some("tool_use") => FinishReason::ToolCalls,
        Some("max_tokens") => FinishReason::Length,
        _ => FinishReason::Stop,
    };

    ModelTurn {
        text: if text_parts.is_empty() {
            None
        } else {
            Some(text_parts.concat())
        },
        calls,
        usage: TokenUsage {
            input_tokens: response.usage.input_tokens,
            output_tokens: response.usage.output_tokens,
            cost: 0.0,
        },
        stop,
        raw: serde_json::to_value(response).ok(),
    }
}

//! `OpenAI`-style chat-completions wire format
//!
//! This family folds the system prompt into the message list, declares
//! tools as JSON-schema function declarations, and returns tool results
//! as one `role: "tool"` message per call.

use serde::{Deserialize, Serialize};

use crate::toolloop::ModelTurn;
use crate::types::{Content, FinishReason, Message, PromptRequest, Role, TokenUsage, ToolCall};

// -- Request types --

/// Chat completions request
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiRequest {
    /// Model identifier
    pub model: String,
    /// Conversation messages, system first
    pub messages: Vec<OpenAiMessage>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Tool definitions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<OpenAiTool>>,
}

/// Message in the request list
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiMessage {
    /// "system", "user", "assistant", or "tool"
    pub role: String,
    /// Text content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Tool calls on an assistant message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<OpenAiToolCall>>,
    /// Tool call this message responds to (role "tool" only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// Tool call on an assistant message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiToolCall {
    /// Call identifier
    pub id: String,
    /// Always "function"
    #[serde(rename = "type")]
    pub call_type: String,
    /// Function name and arguments
    pub function: OpenAiFunctionCall,
}

/// Function reference inside a tool call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiFunctionCall {
    /// Function name
    pub name: String,
    /// JSON-encoded arguments
    pub arguments: String,
}

/// Tool definition wrapper
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiTool {
    /// Always "function"
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Function declaration
    pub function: OpenAiFunctionDef,
}

/// Function declaration with a JSON-schema parameter spec
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiFunctionDef {
    /// Function name
    pub name: String,
    /// Human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for parameters
    pub parameters: serde_json::Value,
}

// -- Response types --

/// Chat completions response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiResponse {
    /// Response identifier
    pub id: String,
    /// Model used
    pub model: String,
    /// Generated choices; the gateway reads the first
    pub choices: Vec<OpenAiChoice>,
    /// Token usage
    #[serde(default)]
    pub usage: Option<OpenAiUsage>,
}

/// One completion choice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiChoice {
    /// Generated message
    pub message: OpenAiChoiceMessage,
    /// Why generation stopped ("stop", "length", "tool_calls")
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Message within a choice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiChoiceMessage {
    /// Text content
    #[serde(default)]
    pub content: Option<String>,
    /// Tool calls requested by the model
    #[serde(default)]
    pub tool_calls: Option<Vec<OpenAiToolCall>>,
}

/// Token usage in a response
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct OpenAiUsage {
    /// Tokens consumed by the prompt
    #[serde(default)]
    pub prompt_tokens: u32,
    /// Tokens generated
    #[serde(default)]
    pub completion_tokens: u32,
}

// -- Conversions --

/// Build a wire request from a normalized request and conversation
pub fn build_request(request: &PromptRequest, model: &str, conversation: &[Message]) -> OpenAiRequest {
    let mut messages = Vec::new();

    // This family has no top-level system field; it leads the list
    if let Some(system) = &request.system_prompt {
        messages.push(text_message("system", system.clone()));
    }

    for message in conversation {
        match (message.role, &message.content) {
            (Role::System, content) => messages.push(text_message("system", content.as_text())),
            (role, Content::Text { text }) => messages.push(text_message(wire_role(role), text.clone())),
            (_, Content::ToolUse { text, calls }) => messages.push(OpenAiMessage {
                role: "assistant".to_owned(),
                content: text.clone(),
                tool_calls: Some(
                    calls
                        .iter()
                        .map(|call| OpenAiToolCall {
                            id: call.id.clone(),
                            call_type: "function".to_owned(),
                            function: OpenAiFunctionCall {
                                name: call.name.clone(),
                                arguments: call.input.to_string(),
                            },
                        })
                        .collect(),
                ),
                tool_call_id: None,
            }),
            // One role:"tool" message per block, preserving request order
            (_, Content::ToolResults { blocks }) => {
                for block in blocks {
                    messages.push(OpenAiMessage {
                        role: "tool".to_owned(),
                        content: Some(block.content.clone()),
                        tool_calls: None,
                        tool_call_id: Some(block.tool_use_id.clone()),
                    });
                }
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
                .map(|tool| OpenAiTool {
                    tool_type: "function".to_owned(),
                    function: OpenAiFunctionDef {
                        name: tool.name.clone(),
                        description: tool.description.clone(),
                        parameters: tool.input_schema.clone(),
                    },
                })
                .collect(),
        )
    };

    OpenAiRequest {
        model: model.to_owned(),
        messages,
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        tools,
    }
}

fn text_message(role: &str, content: String) -> OpenAiMessage {
    OpenAiMessage {
        role: role.to_owned(),
        content: Some(content),
        tool_calls: None,
        tool_call_id: None,
    }
}

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::Assistant => "assistant",
        _ => "user",
    }
}

/// Normalize a wire response into one conversation turn
pub fn response_to_turn(response: &OpenAiResponse) -> ModelTurn {
    let choice = response.choices.first();

    let text = choice.and_then(|c| c.message.content.clone()).filter(|t| !t.is_empty());

    let calls = choice
        .and_then(|c| c.message.tool_calls.as_ref())
        .map(|calls| {
            calls
                .iter()
                .map(|call| ToolCall {
                    id: call.id.clone(),
                    name: call.function.name.clone(),
                    input: serde_json::from_str(&call.function.arguments)
                        .unwrap_or_else(|_| serde_json::json!({})),
                })
                .collect()
        })
        .unwrap_or_default();

    let stop = match choice.and_then(|c| c.finish_reason.as_deref()) {
        Some("tool_calls") => FinishReason::ToolCalls,
        Some("length") => FinishReason::Length,
        _ => FinishReason::Stop,
    };

    let usage = response.usage.unwrap_or_default();

    ModelTurn {
        text,
        calls,
        usage: TokenUsage {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
            cost: 0.0,
        },
        stop,
        raw: serde_json::to_value(response).ok(),
    }
}

//! Vertex-style `generateContent` wire format
//!
//! This family speaks `contents`/`parts` with camelCase field names, a
//! `systemInstruction` content object, and the API key as a query
//! parameter. The gateway uses it single-shot only; tool turns are
//! flattened to text defensively since the orchestrator never routes
//! tool-bearing requests here.

use serde::{Deserialize, Serialize};

use crate::toolloop::ModelTurn;
use crate::types::{FinishReason, Message, PromptRequest, Role, TokenUsage};

// -- Request types --

/// `generateContent` request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleRequest {
    /// Conversation contents
    pub contents: Vec<GoogleContent>,
    /// System instruction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GoogleContent>,
    /// Generation parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GoogleGenerationConfig>,
}

/// Content object with role and parts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleContent {
    /// "user" or "model"; absent on the system instruction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Content parts
    pub parts: Vec<GooglePart>,
}

/// Individual content part
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GooglePart {
    /// Text content
    Text(String),
}

/// Generation parameters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleGenerationConfig {
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Maximum output tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

// -- Response types --

/// `generateContent` response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleResponse {
    /// Generated candidates; the gateway reads the first
    #[serde(default)]
    pub candidates: Vec<GoogleCandidate>,
    /// Token usage
    #[serde(default)]
    pub usage_metadata: Option<GoogleUsage>,
}

/// One generated candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleCandidate {
    /// Candidate content
    #[serde(default)]
    pub content: Option<GoogleContent>,
    /// Why generation stopped ("STOP", "MAX_TOKENS")
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token usage in a response
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleUsage {
    /// Tokens consumed by the prompt
    #[serde(default)]
    pub prompt_token_count: u32,
    /// Tokens generated across candidates
    #[serde(default)]
    pub candidates_token_count: u32,
}

// -- Conversions --

/// Build a wire request from a normalized request and conversation
pub fn build_request(request: &PromptRequest, conversation: &[Message]) -> GoogleRequest {
    let system_instruction = request.system_prompt.as_ref().map(|system| GoogleContent {
        role: None,
        parts: vec![GooglePart::Text(system.clone())],
    });

    let contents = conversation
        .iter()
        .filter(|message| message.role != Role::System)
        .map(|message| GoogleContent {
            role: Some(wire_role(message.role).to_owned()),
            parts: vec![GooglePart::Text(message.content.as_text())],
        })
        .collect();

    let generation_config = if request.temperature.is_none() && request.max_tokens.is_none() {
        None
    } else {
        Some(GoogleGenerationConfig {
            temperature: request.temperature,
            max_output_tokens: request.max_tokens,
        })
    };

    GoogleRequest {
        contents,
        system_instruction,
        generation_config,
    }
}

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::Assistant => "model",
        _ => "user",
    }
}

/// Normalize a wire response into one conversation turn
pub fn response_to_turn(response: &GoogleResponse) -> ModelTurn {
    let candidate = response.candidates.first();

    let text = candidate.and_then(|c| c.content.as_ref()).map(|content| {
        content
            .parts
            .iter()
            .map(|GooglePart::Text(text)| text.as_str())
            .collect::<Vec<_>>()
            .concat()
    });

    let stop = match candidate.and_then(|c| c.finish_reason.as_deref()) {
        Some("MAX_TOKENS") => FinishReason::Length,
        _ => FinishReason::Stop,
    };

    let usage = response.usage_metadata.unwrap_or_default();

    ModelTurn {
        text,
        calls: Vec::new(),
        usage: TokenUsage {
            input_tokens: usage.prompt_token_count,
            output_tokens: usage.candidates_token_count,
            cost: 0.0,
        },
        stop,
        raw: serde_json::to_value(response).ok(),
    }
}

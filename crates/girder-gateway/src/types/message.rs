use serde::{Deserialize, Serialize};

/// Role of a conversation participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instruction
    System,
    /// Caller-side turn
    User,
    /// Model-side turn
    Assistant,
}

/// One turn in a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role of the turn's author
    pub role: Role,
    /// Turn content
    pub content: Content,
}

impl Message {
    /// System-role text turn
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: Content::Text { text: text.into() },
        }
    }

    /// User-role text turn
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Content::Text { text: text.into() },
        }
    }

    /// Assistant-role text turn
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Content::Text { text: text.into() },
        }
    }

    /// Assistant turn requesting tool invocations
    pub const fn tool_use(text: Option<String>, calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: Content::ToolUse { text, calls },
        }
    }

    /// User turn carrying the results of a round's tool invocations
    ///
    /// All of a round's results travel in one turn, in the order the
    /// model requested them; some providers correlate tool-call ids
    /// positionally.
    pub const fn tool_results(blocks: Vec<ToolResultBlock>) -> Self {
        Self {
            role: Role::User,
            content: Content::ToolResults { blocks },
        }
    }
}

/// Content of a conversation turn
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    /// Plain text
    Text {
        /// The text string
        text: String,
    },
    /// Assistant text (possibly empty) plus requested tool calls
    ToolUse {
        /// Text emitted alongside the tool requests
        text: Option<String>,
        /// Tool invocations requested by the model, in request order
        calls: Vec<ToolCall>,
    },
    /// Tool results for the preceding tool-use turn
    ToolResults {
        /// One block per requested invocation, in request order
        blocks: Vec<ToolResultBlock>,
    },
}

impl Content {
    /// Extract a plain-text rendering of the content
    pub fn as_text(&self) -> String {
        match self {
            Self::Text { text } => text.clone(),
            Self::ToolUse { text, .. } => text.clone().unwrap_or_default(),
            Self::ToolResults { blocks } => blocks
                .iter()
                .map(|b| b.content.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned identifier correlating the call with its result
    pub id: String,
    /// Tool name
    pub name: String,
    /// Tool input as JSON
    pub input: serde_json::Value,
}

/// Wire-boundary form of one tool invocation's outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResultBlock {
    /// ID of the tool call this result responds to
    pub tool_use_id: String,
    /// JSON-encoded result content
    pub content: String,
    /// Whether the invocation failed
    pub is_error: bool,
}

//! Shared request/response vocabulary spoken by every gateway component

pub mod message;
pub mod request;
pub mod response;
pub mod tool;

pub use message::{Content, Message, Role, ToolCall, ToolResultBlock};
pub use request::{DEFAULT_MAX_TOOL_ROUNDS, PromptRequest};
pub use response::{ExecutedTool, FinishReason, PromptResponse, TokenUsage};
pub use tool::{ToolDefinition, ToolExecutor, ToolKit, ToolOutcome};

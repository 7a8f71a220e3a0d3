use girder_config::{ClientTier, Priority, TaskType};

use super::message::Message;
use super::tool::{ToolDefinition, ToolKit};

/// Default bound on tool-use conversation rounds
pub const DEFAULT_MAX_TOOL_ROUNDS: u32 = 5;

/// One normalized model call
///
/// Immutable once built; the orchestrator clones it per provider when the
/// variant resolver rewrites prompts.
#[derive(Debug, Clone)]
pub struct PromptRequest {
    /// Kind of work this request represents
    pub task: TaskType,
    /// Commercial tier of the requesting client
    pub tier: ClientTier,
    /// Optional priority hint for routing
    pub priority: Option<Priority>,
    /// Opaque correlation id; not a security boundary
    pub tenant_id: String,
    /// System instruction
    pub system_prompt: Option<String>,
    /// Single-shot prompt; ignored when `messages` is non-empty
    pub prompt: Option<String>,
    /// Ordered conversation turns
    pub messages: Vec<Message>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    pub temperature: Option<f64>,
    /// Tool schema descriptors offered to the model
    pub tools: Vec<ToolDefinition>,
    /// Executors backing the offered tools
    pub executors: Option<ToolKit>,
    /// Bound on tool-use rounds
    pub max_tool_rounds: u32,
}

impl PromptRequest {
    /// Create a request with the required routing fields
    pub fn new(task: TaskType, tier: ClientTier, tenant_id: impl Into<String>) -> Self {
        Self {
            task,
            tier,
            priority: None,
            tenant_id: tenant_id.into(),
            system_prompt: None,
            prompt: None,
            messages: Vec::new(),
            max_tokens: None,
            temperature: None,
            tools: Vec::new(),
            executors: None,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    /// Set the single-shot prompt
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Set the system instruction
    #[must_use]
    pub fn with_system_prompt(mut self, system: impl Into<String>) -> Self {
        self.system_prompt = Some(system.into());
        self
    }

    /// Replace the conversation turns
    #[must_use]
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    /// Set the priority hint
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the generation token budget
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the sampling temperature
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Attach tool schemas and their executors
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>, executors: ToolKit) -> Self {
        self.tools = tools;
        self.executors = Some(executors);
        self
    }

    /// Override the tool-round bound
    #[must_use]
    pub const fn with_max_tool_rounds(mut self, rounds: u32) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    /// Whether this request requires a tool-capable provider
    pub fn wants_tools(&self) -> bool {
        !self.tools.is_empty() && self.executors.is_some()
    }

    /// Seed conversation for dispatch: explicit turns if present,
    /// otherwise a single user turn built from the prompt
    pub fn conversation(&self) -> Vec<Message> {
        if self.messages.is_empty() {
            vec![Message::user(self.prompt.clone().unwrap_or_default())]
        } else {
            self.messages.clone()
        }
    }

    /// Character count of all prompt material, the basis of the
    /// pre-flight `len / 4` token estimate
    pub fn prompt_chars(&self) -> usize {
        let system = self.system_prompt.as_deref().map_or(0, str::len);
        let prompt = self.prompt.as_deref().map_or(0, str::len);
        let messages: usize = self.messages.iter().map(|m| m.content.as_text().len()).sum();
        system + prompt + messages
    }
}

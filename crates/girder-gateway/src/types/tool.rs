use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::message::ToolResultBlock;

/// Definition of a tool the model may invoke
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name
    pub name: String,
    /// Human-readable description shown to the model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the tool input
    pub input_schema: Value,
}

/// Caller-supplied tool implementation
///
/// Executors may perform arbitrary I/O (database queries, document
/// lookups). They must return a JSON-serializable value or fail with an
/// error the model can be shown.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Run the tool against the given input for the given tenant
    async fn execute(&self, input: Value, tenant_id: &str) -> anyhow::Result<Value>;
}

type BoxedToolFn =
    Box<dyn Fn(Value, String) -> Pin<Box<dyn Future<Output = anyhow::Result<Value>> + Send>> + Send + Sync>;

struct FnExecutor {
    f: BoxedToolFn,
}

#[async_trait]
impl ToolExecutor for FnExecutor {
    async fn execute(&self, input: Value, tenant_id: &str) -> anyhow::Result<Value> {
        (self.f)(input, tenant_id.to_owned()).await
    }
}

/// Name-keyed registry of tool executors attached to a request
#[derive(Clone, Default)]
pub struct ToolKit {
    executors: HashMap<String, Arc<dyn ToolExecutor>>,
}

impl ToolKit {
    /// Create an empty toolkit
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a boxed executor under a tool name
    pub fn insert(&mut self, name: impl Into<String>, executor: Arc<dyn ToolExecutor>) {
        self.executors.insert(name.into(), executor);
    }

    /// Register an async closure under a tool name
    pub fn register<F, Fut>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(Value, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        let boxed: BoxedToolFn = Box::new(move |input, tenant| Box::pin(f(input, tenant)));
        self.insert(name, Arc::new(FnExecutor { f: boxed }));
    }

    /// Look up the executor for a tool name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn ToolExecutor>> {
        self.executors.get(name)
    }

    /// Number of registered executors
    pub fn len(&self) -> usize {
        self.executors.len()
    }

    /// Whether no executors are registered
    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }
}

impl fmt::Debug for ToolKit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.executors.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ToolKit").field("tools", &names).finish()
    }
}

/// Outcome of one tool invocation, kept tagged inside the loop and
/// serialized to a [`ToolResultBlock`] only at the conversation boundary
#[derive(Debug, Clone)]
pub enum ToolOutcome {
    /// Executor returned a value
    Ok(Value),
    /// Unknown tool name or executor failure
    Err(String),
}

impl ToolOutcome {
    /// Serialize the outcome into its wire-boundary block form
    pub fn into_block(self, tool_use_id: &str) -> ToolResultBlock {
        match self {
            Self::Ok(value) => ToolResultBlock {
                tool_use_id: tool_use_id.to_owned(),
                content: value.to_string(),
                is_error: false,
            },
            Self::Err(message) => ToolResultBlock {
                tool_use_id: tool_use_id.to_owned(),
                content: serde_json::json!({ "error": message }).to_string(),
                is_error: true,
            },
        }
    }

    /// Whether the invocation failed
    pub const fn is_err(&self) -> bool {
        matches!(self, Self::Err(_))
    }
}

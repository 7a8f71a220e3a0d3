//! Per-provider prompt variants
//!
//! Different backend model families respond measurably better to
//! different instruction formatting: some favor tag-delimited structured
//! instructions, others plain prose with an explicit output-format
//! sentence. The resolver keeps that formatting knowledge out of call
//! sites: it looks up a template per `(task, provider)` pair and rewrites
//! only the prompt fields it covers. No template means pass-through.

use std::collections::HashMap;

use girder_config::TaskType;

use crate::types::PromptRequest;

/// Rewrites a base prompt into a provider-preferred shape
pub type PromptWrapper = fn(&str) -> String;

/// Wrappers a template applies; either side may be absent
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptTemplate {
    /// Wrapper for the system prompt
    pub system: Option<PromptWrapper>,
    /// Wrapper for the user prompt
    pub user: Option<PromptWrapper>,
}

/// Registry of prompt templates keyed by task and provider name
#[derive(Debug, Default)]
pub struct VariantResolver {
    templates: HashMap<TaskType, HashMap<String, PromptTemplate>>,
}

impl VariantResolver {
    /// Create an empty resolver; every lookup passes through
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template for a `(task, provider)` pair
    pub fn register(&mut self, task: TaskType, provider: impl Into<String>, template: PromptTemplate) {
        self.templates.entry(task).or_default().insert(provider.into(), template);
    }

    /// Rewrite a request for a provider
    ///
    /// Only `system_prompt` and `prompt` are ever touched, and only the
    /// sides the template defines; all other fields pass through
    /// unchanged. A missing template returns the request as-is.
    pub fn adapt(&self, request: &PromptRequest, provider: &str) -> PromptRequest {
        let Some(template) = self.templates.get(&request.task).and_then(|m| m.get(provider)) else {
            return request.clone();
        };

        let mut adapted = request.clone();

        if let Some(wrap) = template.system {
            let base = request.system_prompt.as_deref().unwrap_or_default();
            adapted.system_prompt = Some(wrap(base));
        }

        if let Some(wrap) = template.user
            && let Some(prompt) = &request.prompt
        {
            adapted.prompt = Some(wrap(prompt));
        }

        adapted
    }
}

/// Canned wrapper styles for the provider families the gateway ships
pub mod style {
    /// Tag-delimited system instruction for providers tuned on
    /// structured prompts
    pub fn tagged_system(base: &str) -> String {
        format!(
            "<role>\n{base}\n</role>\n<guidelines>\nStay within the role above. \
             Ground every claim in the provided project context.\n</guidelines>"
        )
    }

    /// Plain-prose system instruction
    pub fn plain_system(base: &str) -> String {
        format!("{base}\n\nBe direct. Do not invent facts that are not in the provided context.")
    }

    /// User prompt demanding a bare JSON reply, for extraction tasks
    pub fn json_user(base: &str) -> String {
        format!("{base}\n\nRespond with valid JSON only, no prose before or after.")
    }
}

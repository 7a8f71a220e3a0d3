use serde::{Deserialize, Serialize};
use strum::Display;

/// Kind of work a request represents
///
/// The task vocabulary of the host platform: deal-room document chat,
/// report summaries, structured field extraction, outreach drafting,
/// and proposal review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TaskType {
    /// Conversational document chat
    Chat,
    /// Narrative summarization
    Summarize,
    /// Structured data extraction
    Extract,
    /// Outreach and proposal drafting
    Draft,
    /// Proposal and contract review
    Review,
}

/// Commercial tier of the requesting client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ClientTier {
    /// Default commercial tier
    Standard,
    /// Federal government client
    Government,
    /// State or local government client
    GovernmentState,
    /// Enterprise agreement client
    Enterprise,
}

/// Request priority hint used by routing rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Priority {
    Low,
    Normal,
    High,
}

/// Routing rules and the fallback chain
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Rules evaluated strictly in declaration order; first full match wins
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
    /// Chain used when no rule matches
    #[serde(default)]
    pub default_chain: Vec<String>,
}

/// One routing rule: a conjunction of match fields and a provider chain
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// Fields the request must equal for this rule to apply; absent
    /// fields are wildcards
    #[serde(rename = "match", default)]
    pub matcher: RuleMatchConfig,
    /// Ordered provider chain returned when the rule matches
    pub providers: Vec<String>,
}

/// Match block of a routing rule
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleMatchConfig {
    /// Client tier the request must carry
    #[serde(default)]
    pub tier: Option<ClientTier>,
    /// Task type the request must carry
    #[serde(default)]
    pub task: Option<TaskType>,
    /// Priority the request must carry
    #[serde(default)]
    pub priority: Option<Priority>,
}

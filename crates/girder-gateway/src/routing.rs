//! Routing policy: ordered rules mapping request attributes to
//! provider failover chains
//!
//! Rules are evaluated strictly in declaration order and the first full
//! match wins; a rule placed earlier deliberately shadows later ones
//! (e.g. a government-tier rule ahead of task-type rules). Provider
//! unavailability never influences routing; the orchestrator handles
//! it downstream.

use girder_config::{ClientTier, Priority, RoutingConfig, TaskType};

use crate::types::PromptRequest;

/// Conjunction of request attributes a rule requires
///
/// Absent fields are wildcards. A rule that names a priority only
/// matches requests that carry one.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleMatch {
    /// Required client tier
    pub tier: Option<ClientTier>,
    /// Required task type
    pub task: Option<TaskType>,
    /// Required priority
    pub priority: Option<Priority>,
}

impl RuleMatch {
    fn matches(&self, request: &PromptRequest) -> bool {
        self.tier.is_none_or(|tier| tier == request.tier)
            && self.task.is_none_or(|task| task == request.task)
            && self.priority.is_none_or(|priority| request.priority == Some(priority))
    }
}

/// One routing rule: a match block and the chain it selects
#[derive(Debug, Clone)]
pub struct RoutingRule {
    /// Attributes the request must carry
    pub matcher: RuleMatch,
    /// Ordered provider chain returned on match
    pub providers: Vec<String>,
}

/// Static routing policy, loaded once at process start
#[derive(Debug, Clone)]
pub struct RoutingPolicy {
    rules: Vec<RoutingRule>,
    default_chain: Vec<String>,
}

impl RoutingPolicy {
    /// Build a policy from explicit rules and a default chain
    pub const fn new(rules: Vec<RoutingRule>, default_chain: Vec<String>) -> Self {
        Self { rules, default_chain }
    }

    /// Build a policy from loaded configuration
    pub fn from_config(config: &RoutingConfig) -> Self {
        let rules = config
            .rules
            .iter()
            .map(|rule| RoutingRule {
                matcher: RuleMatch {
                    tier: rule.matcher.tier,
                    task: rule.matcher.task,
                    priority: rule.matcher.priority,
                },
                providers: rule.providers.clone(),
            })
            .collect();

        Self {
            rules,
            default_chain: config.default_chain.clone(),
        }
    }

    /// Resolve the failover chain for a request
    ///
    /// Deterministic and pure: first full rule match wins, else the
    /// default chain.
    pub fn route(&self, request: &PromptRequest) -> &[String] {
        for rule in &self.rules {
            if rule.matcher.matches(request) {
                tracing::debug!(
                    task = %request.task,
                    tier = %request.tier,
                    chain = ?rule.providers,
                    "routing rule matched"
                );
                return &rule.providers;
            }
        }
        &self.default_chain
    }

    /// Every chain the policy can return, the default included;
    /// used for registry validation at gateway construction
    pub fn chains(&self) -> impl Iterator<Item = &[String]> {
        self.rules
            .iter()
            .map(|rule| rule.providers.as_slice())
            .chain(std::iter::once(self.default_chain.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(task: TaskType, tier: ClientTier) -> PromptRequest {
        PromptRequest::new(task, tier, "tenant-1")
    }

    fn policy() -> RoutingPolicy {
        RoutingPolicy::new(
            vec![
                // Government traffic never leaves the eligible provider,
                // ahead of every task-type rule
                RoutingRule {
                    matcher: RuleMatch {
                        tier: Some(ClientTier::Government),
                        ..RuleMatch::default()
                    },
                    providers: vec!["atlas".to_owned()],
                },
                RoutingRule {
                    matcher: RuleMatch {
                        task: Some(TaskType::Extract),
                        ..RuleMatch::default()
                    },
                    providers: vec!["meridian".to_owned(), "atlas".to_owned()],
                },
            ],
            vec!["atlas".to_owned(), "meridian".to_owned(), "vertexa".to_owned()],
        )
    }

    #[test]
    fn first_matching_rule_wins() {
        // Both the government rule and the extract rule could match;
        // the earlier rule decides
        let chain = policy().route(&request(TaskType::Extract, ClientTier::Government));
        assert_eq!(chain, ["atlas"]);
    }

    #[test]
    fn absent_match_fields_are_wildcards() {
        let chain = policy().route(&request(TaskType::Extract, ClientTier::Enterprise));
        assert_eq!(chain, ["meridian", "atlas"]);
    }

    #[test]
    fn no_match_returns_default_chain_by_value() {
        let policy = policy();
        let chain = policy.route(&request(TaskType::Chat, ClientTier::Standard));
        assert_eq!(chain, policy.default_chain.as_slice());
    }

    #[test]
    fn government_chain_never_contains_excluded_provider() {
        let policy = policy();
        for task in [
            TaskType::Chat,
            TaskType::Summarize,
            TaskType::Extract,
            TaskType::Draft,
            TaskType::Review,
        ] {
            let chain = policy.route(&request(task, ClientTier::Government));
            assert!(
                !chain.contains(&"meridian".to_owned()),
                "government request for {task} was routed to meridian"
            );
        }
    }

    #[test]
    fn priority_rule_requires_priority_on_request() {
        let policy = RoutingPolicy::new(
            vec![RoutingRule {
                matcher: RuleMatch {
                    priority: Some(Priority::High),
                    ..RuleMatch::default()
                },
                providers: vec!["atlas".to_owned()],
            }],
            vec!["meridian".to_owned()],
        );

        let without = request(TaskType::Chat, ClientTier::Standard);
        assert_eq!(policy.route(&without), ["meridian"]);

        let with = without.clone().with_priority(Priority::High);
        assert_eq!(policy.route(&with), ["atlas"]);
    }

    #[test]
    fn conjunction_requires_every_field() {
        let policy = RoutingPolicy::new(
            vec![RoutingRule {
                matcher: RuleMatch {
                    tier: Some(ClientTier::Enterprise),
                    task: Some(TaskType::Draft),
                    priority: None,
                },
                providers: vec!["atlas".to_owned()],
            }],
            vec!["vertexa".to_owned()],
        );

        assert_eq!(policy.route(&request(TaskType::Draft, ClientTier::Enterprise)), ["atlas"]);
        assert_eq!(policy.route(&request(TaskType::Draft, ClientTier::Standard)), ["vertexa"]);
        assert_eq!(policy.route(&request(TaskType::Chat, ClientTier::Enterprise)), ["vertexa"]);
    }
}

pub mod condition;
pub mod engine;

pub use condition::Condition;
pub use engine::evaluate;

use crate::domain::policy::{DEFAULT_CASE_VALUE_FIELD, DEFAULT_STATUS_FIELD};
use crate::domain::RuleDocument;
use crate::normalize::normalize_str;
use std::collections::HashSet;

/// An inclusion rule: a conjunction of conditions plus the reason reported
/// when all of them hold.
#[derive(Debug, Clone)]
pub struct InclusionRule {
    pub conditions: Vec<(String, Condition)>,
    pub reason: String,
}

impl InclusionRule {
    pub fn new(reason: impl Into<String>) -> Self {
        InclusionRule {
            conditions: Vec::new(),
            reason: reason.into(),
        }
    }

    pub fn with_condition(mut self, field: impl Into<String>, condition: Condition) -> Self {
        self.conditions.push((field.into(), condition));
        self
    }
}

/// Loaded rule configuration, read-only once built.
///
/// Share it behind an `Arc` across workers; evaluation never mutates it.
#[derive(Debug, Clone)]
pub struct RuleConfig {
    /// Normalized statuses that exclude a row
    pub excluded_statuses: HashSet<String>,

    /// Rules in priority order; the first full match wins
    pub inclusion_rules: Vec<InclusionRule>,

    pub status_field: String,
    pub case_value_field: String,
}

impl RuleConfig {
    /// Build a configuration from a parsed rule document.
    pub fn from_document(doc: &RuleDocument) -> Self {
        let excluded_statuses = doc
            .status_exclusion
            .iter()
            .map(|s| normalize_str(s))
            .collect();

        let inclusion_rules = doc
            .inclusion_rules
            .iter()
            .map(|rule_def| InclusionRule {
                conditions: rule_def
                    .conditions
                    .iter()
                    .map(|(field, def)| {
                        (
                            field.clone(),
                            Condition::compile(&rule_def.reason, field, def),
                        )
                    })
                    .collect(),
                reason: rule_def.reason.clone(),
            })
            .collect();

        RuleConfig {
            excluded_statuses,
            inclusion_rules,
            status_field: doc.status_field.clone(),
            case_value_field: doc.case_value_field.clone(),
        }
    }

    /// Create an empty configuration: nothing excluded, nothing included.
    pub fn empty() -> Self {
        RuleConfig {
            excluded_statuses: HashSet::new(),
            inclusion_rules: Vec::new(),
            status_field: DEFAULT_STATUS_FIELD.to_string(),
            case_value_field: DEFAULT_CASE_VALUE_FIELD.to_string(),
        }
    }

    /// Add an excluded status (normalized on insert).
    pub fn exclude_status(mut self, status: &str) -> Self {
        self.excluded_statuses.insert(normalize_str(status));
        self
    }

    pub fn with_rule(mut self, rule: InclusionRule) -> Self {
        self.inclusion_rules.push(rule);
        self
    }

    #[inline]
    pub fn is_excluded_status(&self, normalized_status: &str) -> bool {
        self.excluded_statuses.contains(normalized_status)
    }
}

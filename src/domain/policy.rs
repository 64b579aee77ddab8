use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Value;

/// Column holding the process status unless the document overrides it.
pub const DEFAULT_STATUS_FIELD: &str = "Status";

/// Column holding the case value unless the document overrides it.
pub const DEFAULT_CASE_VALUE_FIELD: &str = "Valor da Causa";

/// Rule document as written on disk, before normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDocument {
    /// Statuses that disqualify a row outright
    pub status_exclusion: Vec<String>,

    /// Inclusion rules in priority order
    pub inclusion_rules: Vec<RuleDef>,

    #[serde(default = "default_status_field")]
    pub status_field: String,

    #[serde(default = "default_case_value_field")]
    pub case_value_field: String,
}

fn default_status_field() -> String {
    DEFAULT_STATUS_FIELD.to_string()
}

fn default_case_value_field() -> String {
    DEFAULT_CASE_VALUE_FIELD.to_string()
}

/// Definition of a single inclusion rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDef {
    /// Field name to condition; all must hold
    pub conditions: BTreeMap<String, ConditionDef>,

    /// Returned when the rule matches
    pub reason: String,
}

/// Condition as written in the document.
///
/// Shapes the engine does not understand land in `Unrecognized` instead of
/// failing the whole load; they compile to a condition that never holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionDef {
    /// `["ativo", "suspenso"]`
    AnyOf(Vec<Value>),
    /// `{min: 1000}`
    Threshold { min: Value },
    /// `"ativo"`
    Single(Value),
    Unrecognized(serde_json::Value),
}

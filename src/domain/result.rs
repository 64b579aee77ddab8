use serde::{Deserialize, Serialize};

/// Reason given when a row's status is on the exclusion list.
pub const EXCLUDED_BY_STATUS: &str = "excluded by status";

/// Reason given when no inclusion rule matched.
pub const NO_RULE_MATCHED: &str = "does not meet inclusion rules";

/// Outcome of evaluating one row against a rule configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Whether the row belongs in the findings set
    pub included: bool,

    /// Human-readable explanation
    pub reason: String,
}

impl EvaluationResult {
    /// Create an including result carrying the matched rule's reason.
    #[inline]
    pub fn include(reason: impl Into<String>) -> Self {
        EvaluationResult {
            included: true,
            reason: reason.into(),
        }
    }

    /// Create a non-including result.
    #[inline]
    pub fn exclude(reason: impl Into<String>) -> Self {
        EvaluationResult {
            included: false,
            reason: reason.into(),
        }
    }

    pub fn excluded_by_status() -> Self {
        EvaluationResult::exclude(EXCLUDED_BY_STATUS)
    }

    pub fn no_rule_matched() -> Self {
        EvaluationResult::exclude(NO_RULE_MATCHED)
    }

    pub fn is_excluded_by_status(&self) -> bool {
        !self.included && self.reason == EXCLUDED_BY_STATUS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_constructors() {
        let hit = EvaluationResult::include("alto valor ativo");
        assert!(hit.included);
        assert_eq!(hit.reason, "alto valor ativo");

        let miss = EvaluationResult::no_rule_matched();
        assert!(!miss.included);
        assert_eq!(miss.reason, NO_RULE_MATCHED);
        assert!(!miss.is_excluded_by_status());

        assert!(EvaluationResult::excluded_by_status().is_excluded_by_status());
    }

    #[test]
    fn test_result_serialization() {
        let json = serde_json::to_string(&EvaluationResult::include("r1")).unwrap();
        assert_eq!(json, r#"{"included":true,"reason":"r1"}"#);
    }
}

use crate::domain::{EvaluationResult, ProcessRecord};
use crate::normalize::{normalize, parse_amount};

use super::{InclusionRule, RuleConfig};

/// Decide whether a row belongs in the findings set.
///
/// Exclusion by status is checked first and short-circuits. Otherwise the
/// inclusion rules are tried in order and the first one whose conditions all
/// hold supplies the reason. Pure: safe to call concurrently against one
/// shared config.
pub fn evaluate(record: &ProcessRecord, config: &RuleConfig) -> EvaluationResult {
    let status = normalize(record.get(&config.status_field));
    if config.is_excluded_status(&status) {
        return EvaluationResult::excluded_by_status();
    }

    let case_value = parse_amount(record.get(&config.case_value_field));

    config
        .inclusion_rules
        .iter()
        .find(|rule| rule_matches(rule, record, case_value))
        .map(|rule| EvaluationResult::include(rule.reason.as_str()))
        .unwrap_or_else(EvaluationResult::no_rule_matched)
}

#[inline]
fn rule_matches(rule: &InclusionRule, record: &ProcessRecord, case_value: f64) -> bool {
    rule.conditions
        .iter()
        .all(|(field, condition)| condition.holds(record.get(field), case_value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::result::{EXCLUDED_BY_STATUS, NO_RULE_MATCHED};
    use crate::domain::{RuleDocument, Value};
    use crate::rules::Condition;
    use std::collections::HashSet;

    fn scenario_config() -> RuleConfig {
        let doc: RuleDocument = serde_json::from_str(
            r#"{
                "status_exclusion": ["arquivado"],
                "inclusion_rules": [
                    {
                        "conditions": {
                            "Status": ["ativo", "suspenso"],
                            "Valor da Causa": {"min": 1000}
                        },
                        "reason": "alto valor ativo"
                    }
                ]
            }"#,
        )
        .unwrap();
        RuleConfig::from_document(&doc)
    }

    fn row(status: &str, value: &str) -> ProcessRecord {
        ProcessRecord::new()
            .with("Status", status)
            .with("Valor da Causa", value)
    }

    fn one_of(values: &[&str]) -> Condition {
        Condition::OneOf(values.iter().map(|v| v.to_string()).collect::<HashSet<_>>())
    }

    #[test]
    fn test_high_value_active_row_is_included() {
        let result = evaluate(&row("Ativo", "1.500,00"), &scenario_config());
        assert_eq!(result, EvaluationResult::include("alto valor ativo"));
    }

    #[test]
    fn test_archived_row_is_excluded() {
        let result = evaluate(&row("Arquivado", "5.000,00"), &scenario_config());
        assert_eq!(result, EvaluationResult::exclude(EXCLUDED_BY_STATUS));
    }

    #[test]
    fn test_low_value_row_is_not_included() {
        let result = evaluate(&row("Ativo", "500,00"), &scenario_config());
        assert_eq!(result, EvaluationResult::exclude(NO_RULE_MATCHED));
    }

    #[test]
    fn test_exclusion_wins_over_catch_all_rule() {
        let config = RuleConfig::empty()
            .exclude_status("Arquivado")
            .with_rule(InclusionRule::new("everything"));

        let result = evaluate(&row("  ARQUIVADO ", "1.000.000,00"), &config);
        assert!(result.is_excluded_by_status());
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let broad = InclusionRule::new("broad").with_condition("Status", one_of(&["ativo"]));
        let narrow = InclusionRule::new("narrow")
            .with_condition("Status", one_of(&["ativo"]))
            .with_condition("Valor da Causa", Condition::AtLeast(1000.0));

        let forward = RuleConfig::empty()
            .with_rule(narrow.clone())
            .with_rule(broad.clone());
        let reversed = RuleConfig::empty().with_rule(broad).with_rule(narrow);

        let record = row("Ativo", "2.000,00");
        assert_eq!(evaluate(&record, &forward).reason, "narrow");
        assert_eq!(evaluate(&record, &reversed).reason, "broad");
        assert!(evaluate(&record, &forward).included);
        assert!(evaluate(&record, &reversed).included);
    }

    #[test]
    fn test_empty_rule_list_includes_nothing() {
        let config = RuleConfig::empty().exclude_status("arquivado");
        let result = evaluate(&row("Ativo", "9.999,00"), &config);
        assert_eq!(result, EvaluationResult::no_rule_matched());
    }

    #[test]
    fn test_rule_without_conditions_matches_everything_not_excluded() {
        let config = RuleConfig::empty()
            .exclude_status("arquivado")
            .with_rule(InclusionRule::new("catch-all"));

        assert_eq!(evaluate(&ProcessRecord::new(), &config).reason, "catch-all");
        assert_eq!(evaluate(&row("Baixado", "abc"), &config).reason, "catch-all");
    }

    #[test]
    fn test_threshold_ignores_its_own_field() {
        let config = RuleConfig::empty().with_rule(
            InclusionRule::new("valor").with_condition("Outro Campo", Condition::AtLeast(100.0)),
        );

        let record = row("Ativo", "150,00").with("Outro Campo", "1");
        assert!(evaluate(&record, &config).included);

        let record = row("Ativo", "50,00").with("Outro Campo", "99999");
        assert!(!evaluate(&record, &config).included);
    }

    #[test]
    fn test_missing_fields_are_empty_and_zero() {
        let config = RuleConfig::empty().with_rule(
            InclusionRule::new("sem status").with_condition("Status", one_of(&[""])),
        );
        assert!(evaluate(&ProcessRecord::new(), &config).included);

        let config = RuleConfig::empty().with_rule(
            InclusionRule::new("zero").with_condition("Valor da Causa", Condition::AtLeast(0.0)),
        );
        assert!(evaluate(&ProcessRecord::new().with("Status", Value::Absent), &config).included);
    }

    #[test]
    fn test_numeric_case_value() {
        let record = ProcessRecord::new()
            .with("Status", "ativo")
            .with("Valor da Causa", 1000.0);
        assert!(evaluate(&record, &scenario_config()).included);
    }

    #[test]
    fn test_malformed_condition_fails_closed() {
        let doc: RuleDocument = serde_json::from_str(
            r#"{
                "status_exclusion": [],
                "inclusion_rules": [
                    {"conditions": {"Status": {"max": 1}}, "reason": "broken"},
                    {"conditions": {"Status": "ativo"}, "reason": "fallback"}
                ]
            }"#,
        )
        .unwrap();
        let config = RuleConfig::from_document(&doc);

        assert_eq!(evaluate(&row("ativo", "1"), &config).reason, "fallback");
        assert!(!evaluate(&row("suspenso", "1"), &config).included);
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let config = scenario_config();
        let record = row("Suspenso", "1.000,00");

        let first = evaluate(&record, &config);
        let second = evaluate(&record, &config);
        assert_eq!(first, second);
        assert!(first.included);
    }
}

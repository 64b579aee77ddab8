use serde::Serialize;
use std::collections::BTreeMap;

use crate::batch::Finding;
use crate::domain::policy::{DEFAULT_CASE_VALUE_FIELD, DEFAULT_STATUS_FIELD};
use crate::domain::Value;
use crate::normalize::parse_amount;
use crate::rules::RuleConfig;

/// Column grouped on besides the status.
pub const DEFAULT_CLASS_FIELD: &str = "Classe Processual";

/// Column counted per group.
pub const DEFAULT_PROCESS_NUMBER_FIELD: &str = "N° Processo";

/// Which columns the summary groups, counts and sums.
#[derive(Debug, Clone)]
pub struct SummarySpec {
    pub group_by: Vec<String>,
    pub count_field: String,
    pub amount_field: String,
}

impl SummarySpec {
    /// Group by class and the config's status column, summing its case value column.
    pub fn for_config(config: &RuleConfig) -> Self {
        SummarySpec {
            group_by: vec![
                DEFAULT_CLASS_FIELD.to_string(),
                config.status_field.clone(),
            ],
            count_field: DEFAULT_PROCESS_NUMBER_FIELD.to_string(),
            amount_field: config.case_value_field.clone(),
        }
    }
}

impl Default for SummarySpec {
    fn default() -> Self {
        SummarySpec {
            group_by: vec![
                DEFAULT_CLASS_FIELD.to_string(),
                DEFAULT_STATUS_FIELD.to_string(),
            ],
            count_field: DEFAULT_PROCESS_NUMBER_FIELD.to_string(),
            amount_field: DEFAULT_CASE_VALUE_FIELD.to_string(),
        }
    }
}

/// One group of the findings summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    /// Group column to the group's value
    #[serde(flatten)]
    pub groups: BTreeMap<String, Value>,

    /// Rows in the group with a non-blank count field
    pub count: usize,

    /// Sum of the group's amounts
    pub total_value: f64,
}

#[derive(Debug)]
struct GroupAcc {
    values: Vec<Value>,
    count: usize,
    total_value: f64,
}

/// Sort key for one group value. Text and numbers never share a group.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum GroupKey {
    Text(String),
    Number(String),
}

impl GroupKey {
    fn of(value: &Value) -> Self {
        match value {
            Value::Number(n) => GroupKey::Number(n.to_string()),
            other => GroupKey::Text(other.to_string()),
        }
    }
}

/// Group findings and total their amounts.
///
/// Rows missing any group column are left out, and groups come back sorted
/// by their key values.
pub fn summarize(findings: &[Finding], spec: &SummarySpec) -> Vec<SummaryRow> {
    let mut groups: BTreeMap<Vec<GroupKey>, GroupAcc> = BTreeMap::new();

    for finding in findings {
        let values: Vec<Value> = spec
            .group_by
            .iter()
            .map(|field| finding.record.get(field).clone())
            .collect();
        if values.iter().any(Value::is_absent) {
            continue;
        }

        let key = values.iter().map(GroupKey::of).collect();
        let acc = groups.entry(key).or_insert_with(|| GroupAcc {
            values,
            count: 0,
            total_value: 0.0,
        });

        if !finding.record.get(&spec.count_field).is_absent() {
            acc.count += 1;
        }
        acc.total_value += parse_amount(finding.record.get(&spec.amount_field));
    }

    groups
        .into_values()
        .map(|acc| SummaryRow {
            groups: spec.group_by.iter().cloned().zip(acc.values).collect(),
            count: acc.count,
            total_value: acc.total_value,
        })
        .collect()
}

use std::collections::HashSet;
use tracing::warn;

use crate::domain::{ConditionDef, Value};
use crate::normalize::{normalize, normalize_str};

/// A compiled condition of an inclusion rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// The field's normalized value must be one of these
    OneOf(HashSet<String>),

    /// The row's case value must be at least this much.
    ///
    /// Reads the case-value column no matter which field the condition is
    /// attached to.
    AtLeast(f64),
}

impl Condition {
    /// Compile a condition from its document form.
    ///
    /// Unsupported shapes become an empty `OneOf`, which never holds.
    pub fn compile(reason: &str, field: &str, def: &ConditionDef) -> Self {
        match def {
            ConditionDef::AnyOf(values) => {
                Condition::OneOf(values.iter().map(normalize).collect())
            }
            ConditionDef::Single(value @ (Value::Text(_) | Value::Number(_))) => {
                Condition::OneOf(HashSet::from([normalize(value)]))
            }
            ConditionDef::Threshold { min } => match threshold(min) {
                Some(min) => Condition::AtLeast(min),
                None => {
                    warn!(rule = reason, field, min = %min, "Non-numeric minimum, condition will never match");
                    Condition::never()
                }
            },
            ConditionDef::Single(Value::Absent) | ConditionDef::Unrecognized(_) => {
                warn!(rule = reason, field, "Unrecognized condition shape, condition will never match");
                Condition::never()
            }
        }
    }

    /// Condition that no row satisfies.
    pub fn never() -> Self {
        Condition::OneOf(HashSet::new())
    }

    /// Check the condition against a row's field value and case value.
    #[inline]
    pub fn holds(&self, field_value: &Value, case_value: f64) -> bool {
        match self {
            Condition::OneOf(accepted) => accepted.contains(&normalize(field_value)),
            Condition::AtLeast(min) => case_value >= *min,
        }
    }
}

fn threshold(min: &Value) -> Option<f64> {
    let n = match min {
        Value::Number(n) => *n,
        Value::Text(s) => normalize_str(s).parse::<f64>().ok()?,
        Value::Absent => return None,
    };
    n.is_finite().then_some(n)
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Value;

static ABSENT: Value = Value::Absent;

/// One spreadsheet row describing a legal process.
///
/// Column names are whatever the uploaded sheet carries; the engine never
/// assumes a fixed schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessRecord {
    fields: BTreeMap<String, Value>,
}

impl ProcessRecord {
    pub fn new() -> Self {
        ProcessRecord::default()
    }

    /// Builder-style insert, handy for fixtures.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(column.into(), value.into());
    }

    /// Get a cell, treating missing columns as absent.
    #[inline]
    pub fn get(&self, column: &str) -> &Value {
        self.fields.get(column).unwrap_or(&ABSENT)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ProcessRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        ProcessRecord {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

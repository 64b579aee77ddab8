//! Batch evaluation of uploaded rows against one loaded config.

use rayon::prelude::*;
use serde::Serialize;

use crate::domain::{EvaluationResult, ProcessRecord};
use crate::rules::{evaluate, RuleConfig};

/// A row paired with its evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluated {
    pub record: ProcessRecord,
    pub result: EvaluationResult,
}

/// An included row and the reason it was included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub record: ProcessRecord,
    pub reason: String,
}

/// Counts over one evaluated batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub evaluated: usize,
    pub included: usize,
    pub excluded_by_status: usize,
}

impl BatchStats {
    pub fn from_evaluated(rows: &[Evaluated]) -> Self {
        rows.iter().fold(BatchStats::default(), |mut stats, row| {
            stats.evaluated += 1;
            if row.result.included {
                stats.included += 1;
            } else if row.result.is_excluded_by_status() {
                stats.excluded_by_status += 1;
            }
            stats
        })
    }
}

/// Evaluate rows one after another, keeping input order.
pub fn evaluate_batch(records: Vec<ProcessRecord>, config: &RuleConfig) -> Vec<Evaluated> {
    records
        .into_iter()
        .map(|record| {
            let result = evaluate(&record, config);
            Evaluated { record, result }
        })
        .collect()
}

/// Evaluate rows on the rayon pool, keeping input order.
///
/// Produces exactly what [`evaluate_batch`] produces.
pub fn evaluate_batch_parallel(records: Vec<ProcessRecord>, config: &RuleConfig) -> Vec<Evaluated> {
    records
        .into_par_iter()
        .map(|record| {
            let result = evaluate(&record, config);
            Evaluated { record, result }
        })
        .collect()
}

/// Chooses sequential or parallel evaluation by batch size.
#[derive(Debug, Clone, Copy)]
pub struct BatchEvaluator {
    parallel_threshold: usize,
}

impl BatchEvaluator {
    /// Batches with at least `parallel_threshold` rows run in parallel.
    /// Zero disables parallel evaluation.
    pub fn new(parallel_threshold: usize) -> Self {
        BatchEvaluator { parallel_threshold }
    }

    pub fn evaluate(&self, records: Vec<ProcessRecord>, config: &RuleConfig) -> Vec<Evaluated> {
        if self.parallel_threshold > 0 && records.len() >= self.parallel_threshold {
            evaluate_batch_parallel(records, config)
        } else {
            evaluate_batch(records, config)
        }
    }
}

/// Keep the included rows with their reasons.
pub fn into_findings(rows: Vec<Evaluated>) -> Vec<Finding> {
    rows.into_iter()
        .filter(|row| row.result.included)
        .map(|row| Finding {
            record: row.record,
            reason: row.result.reason,
        })
        .collect()
}

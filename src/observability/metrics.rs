use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::batch::BatchStats;

/// Metrics registry for the application.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Imports that produced findings
    pub imports_total: AtomicU64,

    /// Imports that failed (bad config, unreadable sheet, store error)
    pub import_errors: AtomicU64,

    /// Rule config load failures
    pub config_load_errors: AtomicU64,

    /// Row outcomes
    pub rows_evaluated_total: AtomicU64,
    pub rows_included_total: AtomicU64,
    pub rows_excluded_by_status_total: AtomicU64,

    /// Import latency, one counter per bucket (cumulated on export)
    pub latency_under_10ms: AtomicU64,
    pub latency_10_100ms: AtomicU64,
    pub latency_100ms_1s: AtomicU64,
    pub latency_over_1s: AtomicU64,
    pub latency_sum_micros: AtomicU64,

    /// Findings lookups
    pub findings_requests_total: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry.
    pub fn new() -> Self {
        MetricsRegistry::default()
    }

    /// Record a completed import.
    pub fn record_import(&self, stats: &BatchStats) {
        self.imports_total.fetch_add(1, Ordering::Relaxed);
        self.rows_evaluated_total
            .fetch_add(stats.evaluated as u64, Ordering::Relaxed);
        self.rows_included_total
            .fetch_add(stats.included as u64, Ordering::Relaxed);
        self.rows_excluded_by_status_total
            .fetch_add(stats.excluded_by_status as u64, Ordering::Relaxed);
    }

    /// Record a failed import.
    pub fn record_import_error(&self) {
        self.import_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_config_error(&self) {
        self.config_load_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_findings_request(&self) {
        self.findings_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record import latency.
    pub fn record_latency(&self, start: Instant) {
        let elapsed = start.elapsed();
        let millis = elapsed.as_millis() as u64;
        self.latency_sum_micros
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);

        if millis < 10 {
            self.latency_under_10ms.fetch_add(1, Ordering::Relaxed);
        } else if millis < 100 {
            self.latency_10_100ms.fetch_add(1, Ordering::Relaxed);
        } else if millis < 1000 {
            self.latency_100ms_1s.fetch_add(1, Ordering::Relaxed);
        } else {
            self.latency_over_1s.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Export metrics in Prometheus format.
    pub fn to_prometheus(&self) -> String {
        let under_10ms = self.latency_under_10ms.load(Ordering::Relaxed);
        let under_100ms = under_10ms + self.latency_10_100ms.load(Ordering::Relaxed);
        let under_1s = under_100ms + self.latency_100ms_1s.load(Ordering::Relaxed);
        let count = under_1s + self.latency_over_1s.load(Ordering::Relaxed);
        let sum_secs = self.latency_sum_micros.load(Ordering::Relaxed) as f64 / 1_000_000.0;

        format!(
            r#"# HELP casescreen_imports_total Completed spreadsheet imports
# TYPE casescreen_imports_total counter
casescreen_imports_total {}

# HELP casescreen_import_errors_total Failed spreadsheet imports
# TYPE casescreen_import_errors_total counter
casescreen_import_errors_total {}

# HELP casescreen_config_load_errors_total Rule config load failures
# TYPE casescreen_config_load_errors_total counter
casescreen_config_load_errors_total {}

# HELP casescreen_rows Rows evaluated by outcome
# TYPE casescreen_rows counter
casescreen_rows{{outcome="evaluated"}} {}
casescreen_rows{{outcome="included"}} {}
casescreen_rows{{outcome="excluded_by_status"}} {}

# HELP casescreen_import_latency_seconds Import latency
# TYPE casescreen_import_latency_seconds histogram
casescreen_import_latency_seconds_bucket{{le="0.01"}} {}
casescreen_import_latency_seconds_bucket{{le="0.1"}} {}
casescreen_import_latency_seconds_bucket{{le="1"}} {}
casescreen_import_latency_seconds_bucket{{le="+Inf"}} {}
casescreen_import_latency_seconds_sum {}
casescreen_import_latency_seconds_count {}

# HELP casescreen_findings_requests_total Findings report lookups
# TYPE casescreen_findings_requests_total counter
casescreen_findings_requests_total {}
"#,
            self.imports_total.load(Ordering::Relaxed),
            self.import_errors.load(Ordering::Relaxed),
            self.config_load_errors.load(Ordering::Relaxed),
            self.rows_evaluated_total.load(Ordering::Relaxed),
            self.rows_included_total.load(Ordering::Relaxed),
            self.rows_excluded_by_status_total.load(Ordering::Relaxed),
            under_10ms,
            under_100ms,
            under_1s,
            count,
            sum_secs,
            count,
            self.findings_requests_total.load(Ordering::Relaxed),
        )
    }
}

/// Guard for timing operations.
pub struct TimingGuard<'a> {
    registry: &'a MetricsRegistry,
    start: Instant,
}

impl<'a> TimingGuard<'a> {
    pub fn new(registry: &'a MetricsRegistry) -> Self {
        TimingGuard {
            registry,
            start: Instant::now(),
        }
    }
}

impl<'a> Drop for TimingGuard<'a> {
    fn drop(&mut self) {
        self.registry.record_latency(self.start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_import() {
        let metrics = MetricsRegistry::new();

        metrics.record_import(&BatchStats {
            evaluated: 10,
            included: 4,
            excluded_by_status: 3,
        });
        metrics.record_import(&BatchStats {
            evaluated: 2,
            included: 1,
            excluded_by_status: 0,
        });

        assert_eq!(metrics.imports_total.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.rows_evaluated_total.load(Ordering::Relaxed), 12);
        assert_eq!(metrics.rows_included_total.load(Ordering::Relaxed), 5);
        assert_eq!(metrics.rows_excluded_by_status_total.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn test_timing_guard() {
        let metrics = MetricsRegistry::new();
        {
            let _timer = TimingGuard::new(&metrics);
        }

        let recorded = metrics.latency_under_10ms.load(Ordering::Relaxed)
            + metrics.latency_10_100ms.load(Ordering::Relaxed)
            + metrics.latency_100ms_1s.load(Ordering::Relaxed)
            + metrics.latency_over_1s.load(Ordering::Relaxed);
        assert_eq!(recorded, 1);
    }

    #[test]
    fn test_latency_buckets_are_cumulative() {
        let metrics = MetricsRegistry::new();
        metrics.latency_under_10ms.store(2, Ordering::Relaxed);
        metrics.latency_100ms_1s.store(1, Ordering::Relaxed);
        metrics.latency_over_1s.store(1, Ordering::Relaxed);

        let output = metrics.to_prometheus();

        assert!(output.contains("casescreen_import_latency_seconds_bucket{le=\"0.01\"} 2"));
        assert!(output.contains("casescreen_import_latency_seconds_bucket{le=\"0.1\"} 2"));
        assert!(output.contains("casescreen_import_latency_seconds_bucket{le=\"1\"} 3"));
        assert!(output.contains("casescreen_import_latency_seconds_bucket{le=\"+Inf\"} 4"));
        assert!(output.contains("casescreen_import_latency_seconds_count 4"));
    }

    #[test]
    fn test_prometheus_format() {
        let metrics = MetricsRegistry::new();
        metrics.record_import(&BatchStats {
            evaluated: 3,
            included: 1,
            excluded_by_status: 1,
        });
        metrics.record_config_error();

        let output = metrics.to_prometheus();

        assert!(output.contains("casescreen_imports_total 1"));
        assert!(output.contains("casescreen_rows{outcome=\"included\"} 1"));
        assert!(output.contains("casescreen_config_load_errors_total 1"));
    }
}

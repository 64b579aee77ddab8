use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Screening service configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "casescreen")]
#[command(about = "Screens lawsuit spreadsheets against inclusion/exclusion rules")]
pub struct Config {
    /// HTTP server listen address
    #[arg(long, default_value = "0.0.0.0:8080", env = "CASESCREEN_LISTEN_ADDR")]
    pub listen_addr: String,

    /// Path to the rule config (JSON, or YAML by extension)
    #[arg(long, default_value = "config/regras.json", env = "CASESCREEN_RULES_PATH")]
    pub rules_path: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, default_value = "false", env = "CASESCREEN_LOG_JSON")]
    pub log_json: bool,

    /// Batches with at least this many rows are evaluated in parallel (0 disables)
    #[arg(long, default_value = "1000", env = "CASESCREEN_PARALLEL_THRESHOLD")]
    pub parallel_threshold: usize,

    /// Maximum upload size in bytes
    #[arg(long, default_value = "26214400", env = "CASESCREEN_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: usize,

    /// Request timeout in seconds
    #[arg(long, default_value = "60", env = "CASESCREEN_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: u64,

    /// Enable graceful shutdown
    #[arg(long, default_value = "true", env = "CASESCREEN_GRACEFUL_SHUTDOWN")]
    pub graceful_shutdown: bool,
}

impl Config {
    /// Get request timeout as Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_addr: "0.0.0.0:8080".to_string(),
            rules_path: PathBuf::from("config/regras.json"),
            log_level: "info".to_string(),
            log_json: false,
            parallel_threshold: 1000,
            max_upload_bytes: 25 * 1024 * 1024,
            request_timeout_secs: 60,
            graceful_shutdown: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.rules_path, PathBuf::from("config/regras.json"));
        assert_eq!(config.parallel_threshold, 1000);
    }

    #[test]
    fn test_cli_defaults_match_default_impl() {
        let parsed = Config::try_parse_from(["casescreen"]).unwrap();
        let default = Config::default();

        assert_eq!(parsed.rules_path, default.rules_path);
        assert_eq!(parsed.max_upload_bytes, default.max_upload_bytes);
        assert_eq!(parsed.request_timeout_secs, default.request_timeout_secs);
    }

    #[test]
    fn test_request_timeout() {
        let config = Config {
            request_timeout_secs: 5,
            ..Default::default()
        };

        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }
}

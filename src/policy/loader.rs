use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::domain::RuleDocument;
use crate::rules::RuleConfig;

/// Errors that can occur while loading a rule configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Serialization format of a rule document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// `.yaml`/`.yml` files are YAML, everything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                ConfigFormat::Yaml
            }
            _ => ConfigFormat::Json,
        }
    }
}

/// Load a rule configuration from a file.
pub fn load_config(path: impl AsRef<Path>) -> Result<RuleConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
        _ => ConfigError::Io(e),
    })?;

    let config = load_config_str(&content, ConfigFormat::from_path(path))?;

    debug!(
        path = %path.display(),
        excluded_statuses = config.excluded_statuses.len(),
        inclusion_rules = config.inclusion_rules.len(),
        "Loaded rule config"
    );

    Ok(config)
}

/// Parse a rule configuration from text.
///
/// A leading byte-order mark is ignored.
pub fn load_config_str(content: &str, format: ConfigFormat) -> Result<RuleConfig, ConfigError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let doc: RuleDocument = match format {
        ConfigFormat::Json => serde_json::from_str(content)?,
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
    };

    validate_document(&doc)?;

    Ok(RuleConfig::from_document(&doc))
}

/// Validate a rule document.
fn validate_document(doc: &RuleDocument) -> Result<(), ConfigError> {
    for (idx, rule) in doc.inclusion_rules.iter().enumerate() {
        if rule.reason.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "Inclusion rule #{} has an empty reason",
                idx + 1
            )));
        }
    }

    if doc.status_field.trim().is_empty() || doc.case_value_field.trim().is_empty() {
        return Err(ConfigError::Validation(
            "Field names cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Loads the rule configuration for each batch from a fixed location.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    path: PathBuf,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ConfigLoader { path: path.into() }
    }

    /// Load the configuration.
    pub fn load(&self) -> Result<RuleConfig, ConfigError> {
        load_config(&self.path)
    }

    /// Get the config file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProcessRecord;
    use crate::rules::evaluate;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    const SCENARIO_JSON: &str = r#"{
        "status_exclusion": ["arquivado"],
        "inclusion_rules": [
            {
                "conditions": {"Status": ["ativo", "suspenso"], "Valor da Causa": {"min": 1000}},
                "reason": "alto valor ativo"
            }
        ]
    }"#;

    fn json_file(content: &[u8]) -> NamedTempFile {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_load_config() {
        let file = json_file(SCENARIO_JSON.as_bytes());

        let config = load_config(file.path()).unwrap();

        assert!(config.is_excluded_status("arquivado"));
        assert_eq!(config.inclusion_rules.len(), 1);
        assert_eq!(config.inclusion_rules[0].reason, "alto valor ativo");
    }

    #[test]
    fn test_load_config_with_bom() {
        let mut content = "\u{feff}".as_bytes().to_vec();
        content.extend_from_slice(SCENARIO_JSON.as_bytes());
        let file = json_file(&content);

        let config = load_config(file.path()).unwrap();

        assert!(config.is_excluded_status("arquivado"));
        assert_eq!(config.inclusion_rules.len(), 1);
    }

    #[test]
    fn test_load_yaml_config() {
        let mut file = Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            r#"
status_exclusion: [Arquivado]
inclusion_rules:
  - conditions:
      Status: [ativo, suspenso]
      Valor da Causa: {{min: 1000}}
    reason: alto valor ativo
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        let record = ProcessRecord::new()
            .with("Status", "Ativo")
            .with("Valor da Causa", "1.500,00");

        assert!(evaluate(&record, &config).included);
    }

    #[test]
    fn test_missing_file() {
        let result = load_config("/nonexistent/regras.json");
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_malformed_document() {
        let file = json_file(b"{ not json");
        assert!(matches!(load_config(file.path()), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_missing_required_keys() {
        let result = load_config_str(r#"{"status_exclusion": []}"#, ConfigFormat::Json);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("inclusion_rules"));

        let result = load_config_str(r#"{"inclusion_rules": []}"#, ConfigFormat::Json);
        assert!(result.unwrap_err().to_string().contains("status_exclusion"));
    }

    #[test]
    fn test_rule_without_reason() {
        let result = load_config_str(
            r#"{"status_exclusion": [], "inclusion_rules": [{"conditions": {}}]}"#,
            ConfigFormat::Json,
        );
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_empty_reason_validation() {
        let result = load_config_str(
            r#"{"status_exclusion": [], "inclusion_rules": [{"conditions": {}, "reason": "  "}]}"#,
            ConfigFormat::Json,
        );
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("#1"));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new("regras.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("regras.YML")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("regras")), ConfigFormat::Json);
    }

    #[test]
    fn test_config_loader() {
        let file = json_file(SCENARIO_JSON.as_bytes());
        let loader = ConfigLoader::new(file.path());

        assert_eq!(loader.path(), file.path());
        assert_eq!(loader.load().unwrap().inclusion_rules.len(), 1);
    }
}

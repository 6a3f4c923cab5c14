//! Engine settings mapping to the TOML schema.
//!
//! ```toml
//! [pipeline]
//! workflow = "workflow.json"
//! step_timeout_secs = 120
//!
//! [secrets]
//! names = ["COHERE_API_KEY", "SENDGRID_API_KEY", "SHEET_ID"]
//! dotenv = true
//!
//! [logging]
//! level = "info"
//! file = true
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::secrets::DEFAULT_SECRET_NAMES;

/// Default workflow document path, relative to the working directory.
pub const DEFAULT_WORKFLOW_FILE: &str = "workflow.json";

/// Root settings structure.
///
/// Every section is optional so that partial files (e.g. a project-local
/// override) can be loaded and merged on top of the user config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutreachConfig {
    /// Pipeline execution settings.
    pub pipeline: Option<PipelineSection>,

    /// Secret lookup settings.
    pub secrets: Option<SecretsSection>,

    /// Logging settings.
    pub logging: Option<LoggingSection>,
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSection {
    /// Path to the workflow document.
    pub workflow: Option<PathBuf>,
    /// Per-step timeout in seconds. Unset or `0` means steps may run
    /// indefinitely.
    pub step_timeout_secs: Option<u64>,
}

/// `[secrets]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretsSection {
    /// Environment variable names exposed as secret placeholders.
    pub names: Option<Vec<String>>,
    /// Load a `.env` file before reading the environment.
    pub dotenv: Option<bool>,
}

/// `[logging]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Console filter level (e.g. "info", "debug").
    pub level: Option<String>,
    /// Write JSON logs to a rolling file under the config directory.
    pub file: Option<bool>,
}

impl OutreachConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Merge another config on top of this one (other takes priority, field by field).
    pub fn merge(&mut self, other: OutreachConfig) {
        if let Some(p) = other.pipeline {
            let base = self.pipeline.get_or_insert_with(Default::default);
            if p.workflow.is_some() {
                base.workflow = p.workflow;
            }
            if p.step_timeout_secs.is_some() {
                base.step_timeout_secs = p.step_timeout_secs;
            }
        }

        if let Some(s) = other.secrets {
            let base = self.secrets.get_or_insert_with(Default::default);
            if s.names.is_some() {
                base.names = s.names;
            }
            if s.dotenv.is_some() {
                base.dotenv = s.dotenv;
            }
        }

        if let Some(l) = other.logging {
            let base = self.logging.get_or_insert_with(Default::default);
            if l.level.is_some() {
                base.level = l.level;
            }
            if l.file.is_some() {
                base.file = l.file;
            }
        }
    }

    /// Workflow document path, defaulting to `workflow.json`.
    pub fn workflow_path(&self) -> PathBuf {
        self.pipeline
            .as_ref()
            .and_then(|p| p.workflow.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKFLOW_FILE))
    }

    /// Per-step timeout, if configured.
    pub fn step_timeout(&self) -> Option<Duration> {
        self.pipeline
            .as_ref()
            .and_then(|p| p.step_timeout_secs)
            .and_then(step_timeout_from_secs)
    }

    /// Secret names to read from the environment.
    pub fn secret_names(&self) -> Vec<String> {
        self.secrets
            .as_ref()
            .and_then(|s| s.names.clone())
            .unwrap_or_else(|| DEFAULT_SECRET_NAMES.iter().map(|s| s.to_string()).collect())
    }

    /// Whether to load `.env` before reading secrets.
    pub fn load_dotenv(&self) -> bool {
        self.secrets.as_ref().and_then(|s| s.dotenv).unwrap_or(true)
    }

    /// Console log level, defaulting to "info".
    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or("info")
    }

    /// Whether file logging is enabled.
    pub fn log_to_file(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.file).unwrap_or(true)
    }
}

/// A step timeout from a seconds count. `0` disables the timeout.
pub fn step_timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_defaults() {
        let config = OutreachConfig::from_toml("").unwrap();
        assert_eq!(config.workflow_path(), PathBuf::from("workflow.json"));
        assert!(config.step_timeout().is_none());
        assert_eq!(config.secret_names().len(), DEFAULT_SECRET_NAMES.len());
        assert!(config.load_dotenv());
        assert_eq!(config.log_level(), "info");
        assert!(config.log_to_file());
    }

    #[test]
    fn test_parse_full_config() {
        let config = OutreachConfig::from_toml(
            r#"
[pipeline]
workflow = "flows/q3.json"
step_timeout_secs = 30

[secrets]
names = ["SHEET_ID"]
dotenv = false

[logging]
level = "debug"
file = false
"#,
        )
        .unwrap();
        assert_eq!(config.workflow_path(), PathBuf::from("flows/q3.json"));
        assert_eq!(config.step_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.secret_names(), vec!["SHEET_ID".to_string()]);
        assert!(!config.load_dotenv());
        assert_eq!(config.log_level(), "debug");
        assert!(!config.log_to_file());
    }

    #[test]
    fn test_merge_overrides_field_by_field() {
        let mut base = OutreachConfig::from_toml(
            r#"
[pipeline]
workflow = "base.json"
step_timeout_secs = 10
"#,
        )
        .unwrap();
        let overlay = OutreachConfig::from_toml(
            r#"
[pipeline]
step_timeout_secs = 99
"#,
        )
        .unwrap();

        base.merge(overlay);
        assert_eq!(base.workflow_path(), PathBuf::from("base.json"));
        assert_eq!(base.step_timeout(), Some(Duration::from_secs(99)));
    }

    #[test]
    fn test_zero_step_timeout_means_none() {
        let config = OutreachConfig::from_toml("[pipeline]\nstep_timeout_secs = 0\n").unwrap();
        assert_eq!(config.step_timeout(), None);
        assert_eq!(step_timeout_from_secs(0), None);
        assert_eq!(step_timeout_from_secs(5), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(OutreachConfig::from_toml("[pipeline\nworkflow = ").is_err());
    }
}

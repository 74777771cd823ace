//! Configuration loaded from `~/.brokerday/config.json`.
//!
//! Every field is optional; a missing config file yields the defaults.
//! `BROKERDAY_CONFIG` or `--config` points at an alternate file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV_VAR: &str = "BROKERDAY_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Root for the database, audit trail and Google token (defaults to `~/.brokerday`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<String>,
    /// Append-only diagnostic log file, in addition to stderr.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub planning: PlanningConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub google: GoogleConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GeneratorBackend {
    #[default]
    ClaudeCli,
    OpenAiCompatible,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorConfig {
    #[serde(default)]
    pub backend: GeneratorBackend,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Base URL including `/v1` for the OpenAI-compatible backend.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_api_key_env() -> String {
    "BROKERDAY_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            backend: GeneratorBackend::default(),
            model: None,
            api_url: default_api_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// What a run does when the generation backend fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GenerationFailurePolicy {
    /// Return the error; nothing is dispatched.
    #[default]
    Abort,
    /// Log the error and continue with an empty plan.
    EmptyPlan,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningConfig {
    #[serde(default)]
    pub on_generation_failure: GenerationFailurePolicy,
}

/// How the dispatcher treats a handler error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DispatchPolicy {
    /// Record the failure and move on to the next task.
    #[default]
    BestEffort,
    /// Record the failure and stop the run.
    FailFast,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchConfig {
    #[serde(default)]
    pub policy: DispatchPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailConfig {
    #[serde(default = "default_email_subject")]
    pub subject: String,
    /// Recipient used when a client name has no address on file.
    #[serde(default = "default_fallback_address")]
    pub fallback_address: String,
}

fn default_email_subject() -> String {
    "Follow-up Required for Pre-Approval".to_string()
}

fn default_fallback_address() -> String {
    "client@example.com".to_string()
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            subject: default_email_subject(),
            fallback_address: default_fallback_address(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarConfig {
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    /// IANA zone name sent with every event (naive times are read in this zone).
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    /// Hour of day used when a task names no time.
    #[serde(default = "default_hour")]
    pub default_hour: u32,
    #[serde(default = "default_duration_minutes")]
    pub duration_minutes: i64,
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

fn default_time_zone() -> String {
    "UTC".to_string()
}

fn default_hour() -> u32 {
    15
}

/// One week.
pub const MAX_EVENT_MINUTES: i64 = 7 * 24 * 60;

fn default_duration_minutes() -> i64 {
    60
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            calendar_id: default_calendar_id(),
            time_zone: default_time_zone(),
            default_hour: default_hour(),
            duration_minutes: default_duration_minutes(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_path: Option<String>,
}

impl Config {
    /// Directory holding the database, audit files and Google token.
    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.data_dir {
            Some(dir) => Ok(PathBuf::from(dir)),
            None => default_data_dir(),
        }
    }

    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.database_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => Ok(self.data_dir()?.join("brokerday.db")),
        }
    }

    pub fn token_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.google.token_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => Ok(self.data_dir()?.join("google").join("token.json")),
        }
    }

    /// Reject values that would only fail later, mid-run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.calendar.default_hour > 23 {
            return Err(ConfigError::Invalid(format!(
                "calendar.defaultHour must be 0-23, got {}",
                self.calendar.default_hour
            )));
        }
        if !(1..=MAX_EVENT_MINUTES).contains(&self.calendar.duration_minutes) {
            return Err(ConfigError::Invalid(format!(
                "calendar.durationMinutes must be 1-{}, got {}",
                MAX_EVENT_MINUTES, self.calendar.duration_minutes
            )));
        }
        if self.calendar.time_zone.parse::<chrono_tz::Tz>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "calendar.timeZone is not a known IANA zone: {}",
                self.calendar.time_zone
            )));
        }
        if self.generator.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "generator.timeoutSecs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_data_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)?;
    Ok(home.join(".brokerday"))
}

/// Resolve which config file to read: explicit path, then env var, then `~/.brokerday/config.json`.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    Ok(default_data_dir()?.join("config.json"))
}

/// Load configuration, falling back to defaults when the file does not exist.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let path = config_path(explicit)?;

    if !path.exists() {
        if explicit.is_some() {
            return Err(ConfigError::Read {
                path: path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
            });
        }
        log::info!("No config at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;

    let config: Config =
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse { path, source })?;
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.generator.backend, GeneratorBackend::ClaudeCli);
        assert_eq!(config.dispatch.policy, DispatchPolicy::BestEffort);
        assert_eq!(
            config.planning.on_generation_failure,
            GenerationFailurePolicy::Abort
        );
        assert_eq!(config.email.fallback_address, "client@example.com");
        assert_eq!(config.calendar.default_hour, 15);
        assert_eq!(config.calendar.duration_minutes, 60);
        assert_eq!(config.calendar.calendar_id, "primary");
    }

    #[test]
    fn test_camel_case_fields() {
        let json = r#"{
            "dataDir": "/tmp/broker",
            "generator": {"backend": "openAiCompatible", "model": "llama3", "timeoutSecs": 30},
            "planning": {"onGenerationFailure": "emptyPlan"},
            "dispatch": {"policy": "failFast"},
            "calendar": {"timeZone": "Australia/Sydney", "defaultHour": 10}
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.generator.backend, GeneratorBackend::OpenAiCompatible);
        assert_eq!(config.generator.model.as_deref(), Some("llama3"));
        assert_eq!(config.generator.timeout_secs, 30);
        assert_eq!(
            config.planning.on_generation_failure,
            GenerationFailurePolicy::EmptyPlan
        );
        assert_eq!(config.dispatch.policy, DispatchPolicy::FailFast);
        assert_eq!(config.calendar.time_zone, "Australia/Sydney");
        assert_eq!(config.calendar.default_hour, 10);
        assert_eq!(
            config.database_path().unwrap(),
            PathBuf::from("/tmp/broker/brokerday.db")
        );
        assert_eq!(
            config.token_path().unwrap(),
            PathBuf::from("/tmp/broker/google/token.json")
        );
    }

    #[test]
    fn test_validate_rejects_bad_hour() {
        let mut config = Config::default();
        config.calendar.default_hour = 24;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_duration_bounds() {
        let mut config = Config::default();
        config.calendar.duration_minutes = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        config.calendar.duration_minutes = MAX_EVENT_MINUTES;
        assert!(config.validate().is_ok());
        config.calendar.duration_minutes = 1_000_000_000_000;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_time_zone() {
        let mut config = Config::default();
        config.calendar.time_zone = "America/Toronto".to_string();
        assert!(config.validate().is_ok());
        config.calendar.time_zone = "Mars/Olympus".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"email": {"subject": "Docs needed"}}"#).unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.email.subject, "Docs needed");
        assert_eq!(config.email.fallback_address, "client@example.com");
    }

    #[test]
    fn test_load_config_explicit_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        assert!(matches!(
            load_config(Some(&path)),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_load_config_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            load_config(Some(&path)),
            Err(ConfigError::Parse { .. })
        ));
    }
}

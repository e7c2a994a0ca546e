use crate::datasources::bikeshare::DEFAULT_FEED_URL;
use crate::error::{BikeAlertError, Result};
use crate::models::Job;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

// Matches ${VAR_NAME} placeholders
static ENV_VAR_PATTERN: LazyLock<regex_lite::Regex> = LazyLock::new(|| {
    regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("valid env var pattern")
});

/// Top-level keys that must be present and non-empty in conf.json.
pub const REQUIRED_OPTIONS: [&str; 5] = [
    "jobs",
    "email_from_address",
    "email_from_password",
    "email_from_server",
    "email_to_address",
];

#[derive(Clone, Deserialize)]
pub struct Config {
    pub jobs: Vec<Job>,
    pub email_from_address: String,
    pub email_from_password: String,
    pub email_from_server: String,
    pub email_to_address: String,
    #[serde(default = "default_feed_url")]
    pub feed_url: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub geocoding_api_key: Option<String>,
}

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.to_string()
}

fn default_poll_interval() -> u64 {
    60
}

fn default_request_timeout() -> u64 {
    30
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("jobs", &self.jobs)
            .field("email_from_address", &self.email_from_address)
            .field("email_from_password", &"[REDACTED]")
            .field("email_from_server", &self.email_from_server)
            .field("email_to_address", &self.email_to_address)
            .field("feed_url", &self.feed_url)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field(
                "geocoding_api_key",
                &self.geocoding_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Config {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p,
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(BikeAlertError::Config(format!(
                "Config file not found at {:?}",
                config_path
            )));
        }

        Self::from_file(&config_path)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| BikeAlertError::Config(format!("Failed to read config: {}", e)))?;

        let config = Self::from_json_str(&config_str)?;
        tracing::debug!(path = %path.display(), jobs = config.jobs.len(), "configuration loaded");
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        // Substitute environment variables
        let content = Self::substitute_env_vars(content);

        let value: Value = serde_json::from_str(&content)
            .map_err(|e| BikeAlertError::Config(format!("Failed to parse config: {}", e)))?;

        for option in REQUIRED_OPTIONS {
            if !value.get(option).is_some_and(is_truthy) {
                return Err(BikeAlertError::Config(format!(
                    "Missing option {} in config file.",
                    option
                )));
            }
        }

        let config: Config = serde_json::from_value(value)
            .map_err(|e| BikeAlertError::Config(format!("Failed to parse config: {}", e)))?;

        if config.poll_interval_secs == 0 {
            return Err(BikeAlertError::Config(
                "poll_interval_secs must be greater than zero".into(),
            ));
        }

        Ok(config)
    }

    /// Search for conf.json in the working directory, then the XDG config dir.
    fn find_config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("conf.json");
        if local_config.exists() {
            return Ok(local_config);
        }

        // Return XDG path as the default (will trigger "not found" in load)
        let default_path = dirs::config_dir()
            .ok_or_else(|| BikeAlertError::Config("Cannot determine config directory".into()))?
            .join("bikealert")
            .join("conf.json");
        Ok(default_path)
    }

    fn substitute_env_vars(content: &str) -> String {
        let mut result = content.to_string();

        for cap in ENV_VAR_PATTERN.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        result
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

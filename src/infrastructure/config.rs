use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::DEFAULT_PROJECT_LINK;
use crate::domain::{default_countries, FormSchema, WizardVariant, DEFAULT_MIN_PASSWORD_LENGTH};
use super::analytics::{AnalyticsError, AnalyticsSink, JsonLinesSink, LogSink, SegmentSink, DEFAULT_SEGMENT_ENDPOINT};

pub const DEFAULT_CONFIG_FILE: &str = "signup-wizard.json";
pub const DEFAULT_LOG_FILE: &str = "signup-wizard.log";
pub const WRITE_KEY_ENV: &str = "SEGMENT_WRITE_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config format: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),

    #[error("analytics setup failed: {0}")]
    Analytics(#[from] AnalyticsError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub segment_write_key: Option<String>,
    pub segment_endpoint: String,
    pub events_file: Option<PathBuf>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            segment_write_key: None,
            segment_endpoint: DEFAULT_SEGMENT_ENDPOINT.to_string(),
            events_file: None,
        }
    }
}

/// Runtime settings, read from a JSON file.
///
/// # Examples
///
/// ```
/// use signup_wizard::infrastructure::Config;
/// use signup_wizard::domain::WizardVariant;
///
/// let config = Config::from_json(r#"{ "variant": "two_step" }"#).unwrap();
/// assert_eq!(config.variant, WizardVariant::TwoStep);
/// assert_eq!(config.min_password_length, 8);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub variant: WizardVariant,
    pub countries: Vec<String>,
    pub min_password_length: usize,
    pub analytics: AnalyticsConfig,
    pub log_file: PathBuf,
    pub project_link: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            variant: WizardVariant::default(),
            countries: default_countries(),
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
            analytics: AnalyticsConfig::default(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            project_link: DEFAULT_PROJECT_LINK.to_string(),
        }
    }
}

impl Config {
    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_json(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read { path: path.to_path_buf(), source }),
        }
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Fills the Segment write key from the environment when the file left it unset.
    pub fn with_write_key_from(mut self, env_value: Option<String>) -> Self {
        if self.analytics.segment_write_key.is_none() {
            self.analytics.segment_write_key = env_value.filter(|key| !key.trim().is_empty());
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.countries.is_empty() {
            return Err(ConfigError::Invalid("countries must not be empty".to_string()));
        }
        if self.countries.iter().any(|c| c.trim().is_empty()) {
            return Err(ConfigError::Invalid("country names must not be blank".to_string()));
        }
        if self.min_password_length == 0 {
            return Err(ConfigError::Invalid("min_password_length must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn schema(&self) -> FormSchema {
        FormSchema::new(self.countries.clone(), self.min_password_length)
    }

    /// Picks the analytics sink: Segment when a write key is set, then a
    /// JSON-lines file, otherwise the log.
    pub fn analytics_sink(&self) -> Result<Box<dyn AnalyticsSink>, ConfigError> {
        if let Some(key) = &self.analytics.segment_write_key {
            log::info!("sending analytics to {}", self.analytics.segment_endpoint);
            return Ok(Box::new(SegmentSink::new(self.analytics.segment_endpoint.clone(), key.clone())?));
        }
        if let Some(path) = &self.analytics.events_file {
            log::info!("recording analytics to {}", path.display());
            return Ok(Box::new(JsonLinesSink::new(path.clone())));
        }
        Ok(Box::new(LogSink))
    }
}

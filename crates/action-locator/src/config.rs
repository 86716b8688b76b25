//! Engine configuration

use crate::{
    errors::LocatorError,
    i18n::DEFAULT_LOCALE,
    types::{
        RetryPolicy, DEFAULT_BACKOFF_FACTOR, DEFAULT_EXISTS_RETRIES, DEFAULT_INITIAL_DELAY_MS,
        DEFAULT_MAX_DELAY_MS, DEFAULT_RETRIES, DEFAULT_WAIT_TIMEOUT_MS,
    },
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

pub const ENV_LOCALE: &str = "SOUL_LOCATOR_LOCALE";
pub const ENV_TIMEOUT_MS: &str = "SOUL_LOCATOR_TIMEOUT_MS";
pub const ENV_RETRIES: &str = "SOUL_LOCATOR_RETRIES";

/// Locator engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Active locale for key-based text lookups
    pub locale: String,
    pub wait: WaitConfig,
    pub exists: ExistsConfig,
    pub i18n: I18nConfig,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            wait: WaitConfig::default(),
            exists: ExistsConfig::default(),
            i18n: I18nConfig::default(),
        }
    }
}

/// Wait-retry defaults for `find`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    /// Per-attempt wait timeout
    pub timeout_ms: u64,
    pub retries: u32,
    pub initial_delay_ms: u64,
    pub backoff_factor: f64,
    pub max_delay_ms: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            retries: DEFAULT_RETRIES,
            initial_delay_ms: DEFAULT_INITIAL_DELAY_MS,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
        }
    }
}

impl WaitConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.retries,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            backoff_factor: self.backoff_factor,
            max_delay: Duration::from_millis(self.max_delay_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExistsConfig {
    pub retries: u32,
}

impl Default for ExistsConfig {
    fn default() -> Self {
        Self {
            retries: DEFAULT_EXISTS_RETRIES,
        }
    }
}

/// Text catalog sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct I18nConfig {
    /// Catalog files or directories, loaded in order
    pub paths: Vec<PathBuf>,
    pub default_locale: String,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            default_locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

impl LocatorConfig {
    /// Parse YAML; missing fields take their defaults
    pub fn from_yaml_str(raw: &str) -> Result<Self, LocatorError> {
        let config: LocatorConfig =
            serde_yaml::from_str(raw).map_err(|e| LocatorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `SOUL_LOCATOR_*` overrides; unparsable values are ignored
    pub fn apply_env_overrides(&mut self) {
        if let Ok(locale) = env::var(ENV_LOCALE) {
            let locale = locale.trim();
            if locale.is_empty() {
                warn!(var = ENV_LOCALE, "ignoring empty locale override");
            } else {
                self.locale = locale.to_string();
            }
        }
        if let Ok(raw) = env::var(ENV_TIMEOUT_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => self.wait.timeout_ms = ms,
                _ => warn!(var = ENV_TIMEOUT_MS, value = %raw, "ignoring invalid timeout override"),
            }
        }
        if let Ok(raw) = env::var(ENV_RETRIES) {
            match raw.trim().parse::<u32>() {
                Ok(retries) => self.wait.retries = retries,
                Err(_) => warn!(var = ENV_RETRIES, value = %raw, "ignoring invalid retries override"),
            }
        }
    }

    pub fn validate(&self) -> Result<(), LocatorError> {
        let factor = self.wait.backoff_factor;
        if !factor.is_finite() || factor < 1.0 {
            return Err(LocatorError::Config(format!(
                "wait.backoff_factor must be a finite number >= 1.0, got {}",
                factor
            )));
        }
        if self.wait.timeout_ms == 0 {
            return Err(LocatorError::Config(
                "wait.timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.locale.trim().is_empty() {
            return Err(LocatorError::Config("locale must not be empty".to_string()));
        }
        Ok(())
    }
}

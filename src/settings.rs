//! Locator settings discovery
//!
//! Priority: explicit path > `./config/locator.yaml` >
//! `<config dir>/soulbrowser/locator.yaml` > defaults. `SOUL_LOCATOR_*`
//! environment variables are applied on top.

use action_locator::LocatorConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

pub const LOCAL_SETTINGS: &str = "config/locator.yaml";

pub struct LoadedSettings {
    pub config: LocatorConfig,
    pub path: PathBuf,
    /// Whether `path` existed and was parsed
    pub from_file: bool,
}

fn default_settings_path() -> PathBuf {
    let local = PathBuf::from(LOCAL_SETTINGS);
    if local.exists() {
        return local;
    }
    match dirs::config_dir() {
        Some(mut path) => {
            path.push("soulbrowser");
            path.push("locator.yaml");
            path
        }
        None => local,
    }
}

pub async fn load_settings(path: Option<&Path>) -> Result<LoadedSettings> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => default_settings_path(),
    };

    let (mut config, from_file) = if fs::try_exists(&path).await.unwrap_or(false) {
        let content = fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let config = LocatorConfig::from_yaml_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        info!("Loaded locator settings from: {}", path.display());
        (config, true)
    } else {
        warn!("Settings file not found, using defaults: {}", path.display());
        (LocatorConfig::default(), false)
    };

    config.apply_env_overrides();
    config
        .validate()
        .context("invalid settings after environment overrides")?;

    Ok(LoadedSettings {
        config,
        path,
        from_file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use action_locator::{ENV_LOCALE, ENV_RETRIES, ENV_TIMEOUT_MS};
    use serial_test::serial;
    use std::env;
    use tempfile::tempdir;

    fn clear_env() {
        for var in [ENV_LOCALE, ENV_RETRIES, ENV_TIMEOUT_MS] {
            env::remove_var(var);
        }
    }

    #[tokio::test]
    #[serial]
    async fn explicit_file_is_parsed() {
        clear_env();
        let dir = tempdir().unwrap();
        let path = dir.path().join("locator.yaml");
        std::fs::write(&path, "locale: en\nwait:\n  timeout_ms: 800\n").unwrap();

        let loaded = load_settings(Some(path.as_path())).await.unwrap();
        assert!(loaded.from_file);
        assert_eq!(loaded.config.locale, "en");
        assert_eq!(loaded.config.wait.timeout_ms, 800);
    }

    #[tokio::test]
    #[serial]
    async fn missing_file_uses_defaults_with_env() {
        clear_env();
        let dir = tempdir().unwrap();
        env::set_var(ENV_RETRIES, "7");
        let absent = dir.path().join("absent.yaml");
        let loaded = load_settings(Some(absent.as_path())).await.unwrap();
        clear_env();

        assert!(!loaded.from_file);
        assert_eq!(loaded.config.wait.retries, 7);
        assert_eq!(loaded.config.locale, "zh");
    }

    #[tokio::test]
    #[serial]
    async fn invalid_file_is_an_error() {
        clear_env();
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "wait:\n  backoff_factor: 0.1\n").unwrap();
        let err = load_settings(Some(path.as_path())).await.err().unwrap();
        assert!(format!("{:#}", err).contains("backoff_factor"));
    }
}

//! src/config.rs
//! ============================================================================
//! # Config: dispatcher and logging settings
//!
//! Loads and saves settings as TOML from the platform config directory
//! resolved through [`directories`](https://docs.rs/directories). Every
//! field has a default, so a partial (or empty) file is valid.
//!
//! ## Example
//! ```rust,ignore
//! let config = Config::load().await?;
//! let dispatcher = EventDispatcher::with_config(config.dispatcher.clone());
//! ```

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use tokio::fs as TokioFs;

use crate::error::{DispatchError, DispatchResult};
use crate::logging::LoggerConfig;

/// What `notify` does after a handler fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Keep invoking the remaining handlers and report all failures at the end.
    #[default]
    Continue,

    /// Stop at the first failure.
    Abort,
}

/// Dispatcher behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    pub failure_policy: FailurePolicy,

    /// Turn a panicking handler into a reported failure instead of unwinding
    /// through `notify`.
    pub catch_panics: bool,

    /// Handlers running longer than this are logged at WARN.
    #[serde(with = "humantime_serde")]
    pub slow_handler_threshold: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::Continue,
            catch_panics: true,
            slow_handler_threshold: Duration::from_millis(50),
        }
    }
}

/// Main configuration struct for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dispatcher: DispatcherConfig,

    pub logging: LoggerConfig,
}

impl Config {
    /// Loads config from the platform config dir, writing defaults if absent.
    ///
    /// The config is expected at `$XDG_CONFIG_HOME/events/config.toml`
    /// (Linux), or equivalent on Windows/macOS.
    pub async fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            info!("Loading config from {}", path.display());
            Ok(Self::load_from(&path).await?)
        } else {
            info!(
                "No config file found at {}, using default configuration. Creating it now.",
                path.display()
            );

            let default_config = Self::default();
            default_config.save_to(&path).await?;

            Ok(default_config)
        }
    }

    /// Like [`Config::load`], but falls back to the defaults on failure.
    ///
    /// The error is handed back rather than logged, since this usually runs
    /// before a subscriber is installed.
    pub async fn load_or_default() -> (Self, Option<anyhow::Error>) {
        Self::or_default(Self::load().await)
    }

    pub fn or_default(loaded: anyhow::Result<Self>) -> (Self, Option<anyhow::Error>) {
        match loaded {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Reads and parses a config file.
    pub async fn load_from(path: &Path) -> DispatchResult<Self> {
        let text = TokioFs::read_to_string(path)
            .await
            .map_err(|e| DispatchError::config_io(path, e))?;

        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> DispatchResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml_string(&self) -> DispatchResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Writes the config as TOML, creating parent directories.
    pub async fn save_to(&self, path: &Path) -> DispatchResult<()> {
        info!("Saving config to {}", path.display());

        if let Some(parent) = path.parent() {
            TokioFs::create_dir_all(parent)
                .await
                .map_err(|e| DispatchError::config_io(parent, e))?;
        }

        let toml_str = self.to_toml_string()?;
        TokioFs::write(path, toml_str)
            .await
            .map_err(|e| DispatchError::config_io(path, e))?;

        Ok(())
    }

    /// Returns the canonical config file path using `directories::ProjectDirs`.
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "example", "events")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory."))?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogRotation;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = Config::from_toml_str("").expect("empty config parses");

        assert_eq!(config.dispatcher.failure_policy, FailurePolicy::Continue);
        assert!(config.dispatcher.catch_panics);
        assert_eq!(
            config.dispatcher.slow_handler_threshold,
            Duration::from_millis(50)
        );
    }

    #[test]
    fn test_partial_dispatcher_section() {
        let config = Config::from_toml_str(
            r#"
            [dispatcher]
            failure_policy = "abort"
            slow_handler_threshold = "2s"
            "#,
        )
        .expect("valid config");

        assert_eq!(config.dispatcher.failure_policy, FailurePolicy::Abort);
        assert_eq!(config.dispatcher.slow_handler_threshold, Duration::from_secs(2));
        assert!(config.dispatcher.catch_panics);
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let err = Config::from_toml_str("[dispatcher]\nfailure_policy = \"retry\"\n")
            .expect_err("invalid policy");
        assert!(matches!(err, DispatchError::Config(_)));
    }

    #[test]
    fn test_rotation_is_lowercase() {
        let config = Config::from_toml_str("[logging]\nrotation = \"never\"\n")
            .expect("lowercase rotation");
        assert_eq!(config.logging.rotation, LogRotation::Never);

        let text = Config::default().to_toml_string().expect("serializable");
        assert!(text.contains("rotation = \"daily\""));

        assert!(Config::from_toml_str("[logging]\nrotation = \"Daily\"\n").is_err());
    }

    #[tokio::test]
    async fn test_unreadable_config_falls_back_with_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        TokioFs::write(&path, "[dispatcher]\nfailure_policy = \"retry\"\n")
            .await
            .expect("write");

        let (config, error) =
            Config::or_default(Config::load_from(&path).await.map_err(anyhow::Error::from));

        assert_eq!(config.dispatcher.failure_policy, FailurePolicy::Continue);
        let error = error.expect("failure is kept");
        assert!(matches!(
            error.downcast_ref::<DispatchError>(),
            Some(DispatchError::Config(_))
        ));
    }

    #[test]
    fn test_successful_load_has_no_fallback_error() {
        let mut loaded = Config::default();
        loaded.dispatcher.catch_panics = false;

        let (config, error) = Config::or_default(Ok(loaded));
        assert!(error.is_none());
        assert!(!config.dispatcher.catch_panics);
    }

    #[tokio::test]
    async fn test_save_then_load_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.dispatcher.failure_policy = FailurePolicy::Abort;
        config.dispatcher.catch_panics = false;
        config.save_to(&path).await.expect("save");

        let loaded = Config::load_from(&path).await.expect("load");
        assert_eq!(loaded.dispatcher.failure_policy, FailurePolicy::Abort);
        assert!(!loaded.dispatcher.catch_panics);
        assert_eq!(loaded.logging.log_level, config.logging.log_level);
    }

    #[tokio::test]
    async fn test_missing_file_reports_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.toml");

        let err = Config::load_from(&path).await.expect_err("missing file");
        match err {
            DispatchError::ConfigIo { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}

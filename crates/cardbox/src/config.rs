//! Configuration management for cardbox.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::render::Template;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "cardbox";

/// Default store file name.
const DATABASE_FILE_NAME: &str = "cards.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `CARDBOX_`, with `__` separating
///    nesting levels, e.g. `CARDBOX_STORAGE__BUSY_TIMEOUT_MS`)
/// 2. TOML config file at `~/.config/cardbox/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Rendering configuration.
    pub render: RenderConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the store file.
    /// Defaults to `~/.local/share/cardbox/cards.db`
    pub database_path: Option<PathBuf>,
    /// How long to wait for another holder of the store to yield,
    /// in milliseconds.
    pub busy_timeout_ms: u64,
}

/// Rendering-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Template identifier used when the caller does not pick one.
    pub default_template: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Resolved to the platform default at runtime
            busy_timeout_ms: 5000,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            default_template: "custom".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            // Plain [storage]/[render] tables, no figment profiles.
            .merge(Toml::file(&config_file))
            // Field names contain underscores, so nesting is split on a
            // double underscore: CARDBOX_STORAGE__BUSY_TIMEOUT_MS.
            .merge(Env::prefixed("CARDBOX_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.storage.busy_timeout_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "busy_timeout_ms must be greater than 0".to_string(),
            });
        }

        if self.render.default_template.is_empty() {
            return Err(Error::ConfigValidation {
                message: "default_template must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the store path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the busy timeout as a Duration.
    #[must_use]
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.storage.busy_timeout_ms)
    }

    /// Get the default render template.
    #[must_use]
    pub fn default_template(&self) -> Template {
        Template::parse(&self.render.default_template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.database_path.is_none());
        assert_eq!(config.storage.busy_timeout_ms, 5000);
        assert_eq!(config.render.default_template, "custom");
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_busy_timeout() {
        let mut config = Config::default();
        config.storage.busy_timeout_ms = 0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("busy_timeout_ms"));
    }

    #[test]
    fn test_validate_empty_template() {
        let mut config = Config::default();
        config.render.default_template = String::new();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("default_template"));
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        assert!(config
            .database_path()
            .to_string_lossy()
            .contains("cards.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/cards.db"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/cards.db")
        );
    }

    #[test]
    fn test_busy_timeout() {
        let config = Config::default();
        assert_eq!(config.busy_timeout(), Duration::from_millis(5000));
    }

    #[test]
    fn test_default_template_parsed() {
        let config = Config::default();
        assert_eq!(config.default_template(), Template::Custom);

        let mut config = Config::default();
        config.render.default_template = "something-else".to_string();
        assert_eq!(config.default_template(), Template::Minimal);
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("cardbox"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_default_data_dir() {
        assert!(Config::default_data_dir()
            .to_string_lossy()
            .contains("cardbox"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        // Loading from a nonexistent path should work (uses defaults). The
        // jail keeps stray CARDBOX_ variables out of the comparison.
        figment::Jail::expect_with(|_jail| {
            let config =
                Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn test_env_vars_override_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("CARDBOX_STORAGE__BUSY_TIMEOUT_MS", "250");
            jail.set_env("CARDBOX_RENDER__DEFAULT_TEMPLATE", "minimal");

            let config =
                Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
            assert_eq!(config.storage.busy_timeout_ms, 250);
            assert_eq!(config.render.default_template, "minimal");
            Ok(())
        });
    }

    #[test]
    fn test_toml_file_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [storage]
                busy_timeout_ms = 100

                [render]
                default_template = "minimal"
                "#,
            )?;

            let config = Config::load_from(Some(PathBuf::from("config.toml"))).unwrap();
            assert_eq!(config.storage.busy_timeout_ms, 100);
            assert_eq!(config.render.default_template, "minimal");
            Ok(())
        });
    }

    #[test]
    fn test_env_vars_override_toml_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [storage]
                busy_timeout_ms = 100
                "#,
            )?;
            jail.set_env("CARDBOX_STORAGE__BUSY_TIMEOUT_MS", "250");

            let config = Config::load_from(Some(PathBuf::from("config.toml"))).unwrap();
            assert_eq!(config.storage.busy_timeout_ms, 250);
            Ok(())
        });
    }

    #[test]
    fn test_env_var_database_path() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("CARDBOX_STORAGE__DATABASE_PATH", "/env/cards.db");

            let config =
                Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
            assert_eq!(config.database_path(), PathBuf::from("/env/cards.db"));
            Ok(())
        });
    }

    #[test]
    fn test_config_serialize_round_trip() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_storage_config_deserialize() {
        let json = r#"{"busy_timeout_ms": 250}"#;
        let storage: StorageConfig = serde_json::from_str(json).unwrap();
        assert_eq!(storage.busy_timeout_ms, 250);
        assert!(storage.database_path.is_none());
    }
}

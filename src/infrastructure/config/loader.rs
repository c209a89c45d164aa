use std::path::Path;

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use thiserror::Error;

use crate::domain::models::config::{Config, MAX_OFFSET_LIMIT};

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid max_offset: {0}. Must be between 0 and {MAX_OFFSET_LIMIT}")]
    InvalidMaxOffset(u32),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Store path cannot be empty: {0}")]
    EmptyStorePath(&'static str),

    #[error("Live and schedule stores must use different files: {0}")]
    SharedStorePath(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .cardsignal/config.yaml (project config)
    /// 3. .cardsignal/local.yaml (local overrides, optional)
    /// 4. Environment variables (CARDSIGNAL_* prefix, `__` separates sections)
    pub fn load() -> Result<Config> {
        Self::load_with(None)
    }

    /// Same as [`ConfigLoader::load`], with an extra file merged above the
    /// project files and below the environment.
    pub fn load_with(extra: Option<&Path>) -> Result<Config> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".cardsignal/config.yaml"))
            .merge(Yaml::file(".cardsignal/local.yaml"));
        if let Some(path) = extra {
            figment = figment.merge(Yaml::file(path));
        }
        let config: Config = figment
            .merge(Env::prefixed("CARDSIGNAL_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.tunables.validate().is_err() {
            return Err(ConfigError::InvalidMaxOffset(config.tunables.max_offset));
        }

        if config.store.live_path.trim().is_empty() {
            return Err(ConfigError::EmptyStorePath("live_path"));
        }
        if config.store.schedule_path.trim().is_empty() {
            return Err(ConfigError::EmptyStorePath("schedule_path"));
        }
        if config.store.live_path == config.store.schedule_path {
            return Err(ConfigError::SharedStorePath(config.store.live_path.clone()));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.tunables.offset_a, 1);
        assert_eq!(config.tunables.max_offset, 2);
        assert_eq!(config.channels.display_channel, -1_002_999_811_353);
        assert_eq!(config.logging.level, "info");
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
tunables:
  offset_a: 2
  max_offset: 5
channels:
  source_channel: -1001
  display_channel: -1002
store:
  live_path: /tmp/live.yaml
logging:
  level: debug
  format: json
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.tunables.offset_a, 2);
        assert_eq!(config.tunables.max_offset, 5);
        assert_eq!(config.channels.source_channel, Some(-1001));
        assert_eq!(config.channels.display_channel, -1002);
        assert_eq!(config.store.live_path, "/tmp/live.yaml");
        assert_eq!(
            config.store.schedule_path,
            ".cardsignal/schedule_predictions.yaml"
        );
        assert_eq!(config.logging.format, "json");

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_max_offset_ceiling() {
        let mut config = Config::default();
        config.tunables.max_offset = 11;

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMaxOffset(11))
        ));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "invalid"),
            _ => panic!("Expected InvalidLogLevel error"),
        }
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogFormat(format) => assert_eq!(format, "xml"),
            _ => panic!("Expected InvalidLogFormat error"),
        }
    }

    #[test]
    fn test_validate_store_paths() {
        let mut config = Config::default();
        config.store.schedule_path = "  ".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyStorePath("schedule_path"))
        ));

        config.store.schedule_path = config.store.live_path.clone();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::SharedStorePath(_))
        ));
    }

    #[test]
    fn test_env_override() {
        temp_env::with_vars(
            [
                ("CARDSIGNAL_TUNABLES__OFFSET_A", Some("3")),
                ("CARDSIGNAL_TUNABLES__MAX_OFFSET", Some("7")),
                ("CARDSIGNAL_LOGGING__LEVEL", Some("debug")),
            ],
            || {
                let config = ConfigLoader::load().expect("env config should load");
                assert_eq!(config.tunables.offset_a, 3);
                assert_eq!(config.tunables.max_offset, 7);
                assert_eq!(config.logging.level, "debug");
            },
        );
    }

    #[test]
    fn test_env_rejects_out_of_range_max_offset() {
        temp_env::with_var("CARDSIGNAL_TUNABLES__MAX_OFFSET", Some("12"), || {
            assert!(ConfigLoader::load().is_err());
        });
    }

    #[test]
    fn test_hierarchical_merging() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut base_file = NamedTempFile::new().unwrap();
        writeln!(
            base_file,
            "tunables:\n  offset_a: 2\nlogging:\n  level: info\n  format: json"
        )
        .unwrap();
        base_file.flush().unwrap();

        let mut override_file = NamedTempFile::new().unwrap();
        writeln!(override_file, "tunables:\n  offset_a: 4\nlogging:\n  level: debug").unwrap();
        override_file.flush().unwrap();

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .unwrap();

        assert_eq!(config.tunables.offset_a, 4, "Override should win");
        assert_eq!(config.tunables.max_offset, 2, "Default should survive");
        assert_eq!(
            config.logging.level, "debug",
            "Override should win for nested fields"
        );
        assert_eq!(
            config.logging.format, "json",
            "Base value should persist when not overridden"
        );
    }

    #[test]
    fn test_load_with_extra_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "schedule:\n  launch_tolerance: 6").unwrap();
        file.flush().unwrap();

        let config = ConfigLoader::load_with(Some(file.path())).unwrap();
        assert_eq!(config.schedule.launch_tolerance, 6);
    }
}

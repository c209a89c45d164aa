use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};

/// Largest accepted live attempt ceiling.
pub const MAX_OFFSET_LIMIT: u32 = 10;

/// Main configuration structure for cardsignal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Initial prediction tunables (runtime changes are persisted in the live store)
    #[serde(default)]
    pub tunables: Tunables,

    /// Imported schedule behaviour
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Channel routing
    #[serde(default)]
    pub channels: ChannelsConfig,

    /// Record store locations
    #[serde(default)]
    pub store: StoreConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Process-wide prediction tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Tunables {
    /// Added to the triggering game number to get the predicted one
    #[serde(default = "default_offset_a")]
    pub offset_a: u64,

    /// Live attempt ceiling, 0..=10
    #[serde(default = "default_max_offset")]
    pub max_offset: u32,
}

const fn default_offset_a() -> u64 {
    1
}

const fn default_max_offset() -> u32 {
    2
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            offset_a: default_offset_a(),
            max_offset: default_max_offset(),
        }
    }
}

impl Tunables {
    /// Check a candidate attempt ceiling without applying it.
    pub fn check_max_offset(value: u32) -> DomainResult<u32> {
        if value > MAX_OFFSET_LIMIT {
            return Err(DomainError::InvalidTunable {
                name: "max_offset",
                value: i64::from(value),
                min: 0,
                max: i64::from(MAX_OFFSET_LIMIT),
            });
        }
        Ok(value)
    }

    /// Check every tunable.
    pub fn validate(&self) -> DomainResult<()> {
        Self::check_max_offset(self.max_offset)?;
        Ok(())
    }
}

/// Imported schedule configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScheduleConfig {
    /// How many games ahead of the live number an entry may be launched
    #[serde(default = "default_launch_tolerance")]
    pub launch_tolerance: u64,

    /// Copy the schedule store aside before a replacing import
    #[serde(default = "default_true")]
    pub backup_on_replace: bool,
}

const fn default_launch_tolerance() -> u64 {
    4
}

const fn default_true() -> bool {
    true
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            launch_tolerance: default_launch_tolerance(),
            backup_on_replace: default_true(),
        }
    }
}

/// Channel routing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ChannelsConfig {
    /// Channel whose result lines are watched
    #[serde(default)]
    pub source_channel: Option<i64>,

    /// Channel where predictions are published
    #[serde(default = "default_display_channel")]
    pub display_channel: i64,
}

const fn default_display_channel() -> i64 {
    -1_002_999_811_353
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            source_channel: None,
            display_channel: default_display_channel(),
        }
    }
}

/// Record store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StoreConfig {
    /// YAML file holding tunables and live predictions
    #[serde(default = "default_live_path")]
    pub live_path: String,

    /// YAML file holding the imported schedule
    #[serde(default = "default_schedule_path")]
    pub schedule_path: String,
}

fn default_live_path() -> String {
    ".cardsignal/live_predictions.yaml".to_string()
}

fn default_schedule_path() -> String {
    ".cardsignal/schedule_predictions.yaml".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            live_path: default_live_path(),
            schedule_path: default_schedule_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tunables() {
        let tunables = Tunables::default();
        assert_eq!(tunables.offset_a, 1);
        assert_eq!(tunables.max_offset, 2);
        assert!(tunables.validate().is_ok());
    }

    #[test]
    fn test_check_max_offset_bounds() {
        assert_eq!(Tunables::check_max_offset(0).unwrap(), 0);
        assert_eq!(Tunables::check_max_offset(10).unwrap(), 10);
        assert!(matches!(
            Tunables::check_max_offset(11),
            Err(DomainError::InvalidTunable { value: 11, .. })
        ));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("tunables:\n  offset_a: 3\n").unwrap();
        assert_eq!(config.tunables.offset_a, 3);
        assert_eq!(config.tunables.max_offset, 2);
        assert_eq!(config.schedule.launch_tolerance, 4);
        assert!(config.channels.source_channel.is_none());
    }
}

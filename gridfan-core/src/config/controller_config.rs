//! Controller configuration loaded once at startup
//!
//! Located at `~/.config/gridfan/config.toml` by default. Every field is
//! optional in the file; missing values fall back to the Grid+ v2 defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::board::GridPlusV2;
use crate::error::{GridFanError, Result};

/// Serial link settings used for every command exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialSettings {
    /// Device node of the controller
    pub device: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Read timeout in milliseconds
    pub read_timeout_ms: u64,
    /// Write timeout in milliseconds
    pub write_timeout_ms: u64,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            device: GridPlusV2::DEFAULT_DEVICE.to_string(),
            baud_rate: GridPlusV2::BAUD_RATE,
            read_timeout_ms: GridPlusV2::READ_TIMEOUT_MS,
            write_timeout_ms: GridPlusV2::WRITE_TIMEOUT_MS,
        }
    }
}

impl SerialSettings {
    /// Settings for a device node, everything else default
    pub fn for_device(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Default::default()
        }
    }

    /// Read timeout as a `Duration`
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Write timeout as a `Duration`
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

/// Attempt counts and fixed pacing for the wake and presence loops
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Pings sent before giving up on waking the controller
    pub wake_attempts: u32,
    /// Pause between wake pings in milliseconds
    pub wake_interval_ms: u64,
    /// Attempts made by the fan presence check
    pub presence_attempts: u32,
    /// Time given to a channel forced on before re-reading it, in milliseconds
    pub presence_settle_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            wake_attempts: 30,
            wake_interval_ms: 100,
            presence_attempts: 3,
            presence_settle_ms: 1000,
        }
    }
}

impl RetryPolicy {
    /// Same attempt counts with no pauses at all
    pub fn without_delays(self) -> Self {
        Self {
            wake_interval_ms: 0,
            presence_settle_ms: 0,
            ..self
        }
    }

    /// Pause between wake pings
    pub fn wake_interval(&self) -> Duration {
        Duration::from_millis(self.wake_interval_ms)
    }

    /// Settle time after forcing a channel on
    pub fn presence_settle(&self) -> Duration {
        Duration::from_millis(self.presence_settle_ms)
    }
}

/// Complete driver configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Serial link settings
    pub serial: SerialSettings,
    /// Retry pacing
    pub retry: RetryPolicy,
}

impl ControllerConfig {
    /// Parse a configuration from TOML.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| GridFanError::Config(e.to_string()))
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Reject settings the controller cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.serial.device.trim().is_empty() {
            return Err(GridFanError::Config("serial.device must not be empty".into()));
        }
        if self.serial.baud_rate == 0 {
            return Err(GridFanError::Config("serial.baud_rate must be positive".into()));
        }
        if self.retry.wake_attempts == 0 {
            return Err(GridFanError::Config("retry.wake_attempts must be at least 1".into()));
        }
        if self.retry.presence_attempts == 0 {
            return Err(GridFanError::Config(
                "retry.presence_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_board() {
        let config = ControllerConfig::default();
        assert_eq!(config.serial.device, "/dev/GridPlus0");
        assert_eq!(config.serial.baud_rate, 4800);
        assert_eq!(config.serial.read_timeout(), Duration::from_secs(2));
        assert_eq!(config.serial.write_timeout(), Duration::from_secs(4));
        assert_eq!(config.retry.wake_attempts, 30);
        assert_eq!(config.retry.wake_interval(), Duration::from_millis(100));
        assert_eq!(config.retry.presence_attempts, 3);
        assert_eq!(config.retry.presence_settle(), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ControllerConfig::from_toml(
            r#"
            [serial]
            device = "/dev/ttyACM3"
            "#,
        )
        .unwrap();

        assert_eq!(config.serial.device, "/dev/ttyACM3");
        assert_eq!(config.serial.baud_rate, 4800);
        assert_eq!(config.retry, RetryPolicy::default());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = ControllerConfig::default();
        config.retry.wake_attempts = 5;

        let text = config.to_toml().unwrap();
        assert_eq!(ControllerConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = ControllerConfig::from_toml("[retry]\nwake_attempts = 0\n").unwrap_err();
        assert!(matches!(err, GridFanError::Config(_)));

        let err = ControllerConfig::from_toml("[serial]\ndevice = \"\"\n").unwrap_err();
        assert!(matches!(err, GridFanError::Config(_)));

        assert!(ControllerConfig::from_toml("[serial\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[retry]\npresence_settle_ms = 250").unwrap();

        let config = ControllerConfig::load(file.path()).unwrap();
        assert_eq!(config.retry.presence_settle(), Duration::from_millis(250));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = ControllerConfig::load(Path::new("/nonexistent/gridfan.toml")).unwrap_err();
        assert!(matches!(err, GridFanError::Io(_)));
    }

    #[test]
    fn test_without_delays_keeps_counts() {
        let policy = RetryPolicy::default().without_delays();
        assert_eq!(policy.wake_attempts, 30);
        assert_eq!(policy.wake_interval(), Duration::ZERO);
        assert_eq!(policy.presence_settle(), Duration::ZERO);
    }
}

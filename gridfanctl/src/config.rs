//! CLI configuration management
//!
//! Handles loading the configuration file and layering overrides on top.

use anyhow::{bail, Context, Result};
use gridfan_core::{default_config_path, ControllerConfig, RetryPolicy, SerialSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration
///
/// The file shares the `[serial]` and `[retry]` tables with the controller
/// configuration and adds the CLI's own output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CliConfig {
    /// Default output format
    pub output_format: String,

    /// Enable verbose logging by default
    pub verbose: bool,

    /// Serial link settings
    pub serial: SerialSettings,

    /// Retry pacing
    pub retry: RetryPolicy,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            output_format: "table".to_string(),
            verbose: false,
            serial: SerialSettings::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl CliConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize CLI config")
    }

    /// Get the configuration file path
    pub fn config_path(explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("GRIDFAN_CONFIG").map(PathBuf::from))
            .unwrap_or_else(default_config_path)
    }

    /// Controller configuration derived from these settings
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            serial: self.serial.clone(),
            retry: self.retry.clone(),
        }
    }

    /// Create a new builder for constructing configuration
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for CLI configuration with validation and priority chain support
///
/// Priority chain (lowest to highest):
/// 1. Defaults
/// 2. Config file
/// 3. Environment variables
/// 4. CLI arguments
///
/// Overrides are recorded first and the file is consulted only for values
/// still unset, so the `with_*` calls may come in any order.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    device: Option<String>,
    output_format: Option<String>,
    verbose: Option<bool>,
    file: Option<CliConfig>,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set serial device (with validation)
    pub fn with_device(mut self, device: impl Into<String>) -> Result<Self> {
        let device = device.into();
        Self::validate_device(&device)?;
        self.device = Some(device);
        Ok(self)
    }

    /// Set output format (with validation)
    pub fn with_output_format(mut self, format: impl Into<String>) -> Result<Self> {
        let format = format.into();
        Self::validate_output_format(&format)?;
        self.output_format = Some(format);
        Ok(self)
    }

    /// Set verbose flag
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    /// Load configuration from file
    ///
    /// A missing file is not an error; an unreadable or malformed one is.
    pub fn with_config_file(mut self, path: Option<&Path>, load_file: bool) -> Result<Self> {
        if !load_file {
            return Ok(self);
        }

        let path = CliConfig::config_path(path);
        if path.exists() {
            self.file = Some(CliConfig::load(&path)?);
        }
        Ok(self)
    }

    /// Apply environment variable overrides
    pub fn with_env_overrides(mut self) -> Self {
        // Only apply env vars if values weren't already set (preserving priority)
        if self.device.is_none() {
            if let Ok(device) = std::env::var("GRIDFAN_DEVICE") {
                if Self::validate_device(&device).is_ok() {
                    self.device = Some(device);
                }
            }
        }

        if self.output_format.is_none() {
            if let Ok(format) = std::env::var("GRIDFAN_FORMAT") {
                if Self::validate_output_format(&format).is_ok() {
                    self.output_format = Some(format);
                }
            }
        }

        if self.verbose.is_none() {
            if let Ok(verbose) = std::env::var("GRIDFAN_VERBOSE") {
                self.verbose = Some(verbose.to_lowercase() == "true" || verbose == "1");
            }
        }

        self
    }

    /// Build the final configuration
    pub fn build(self) -> Result<CliConfig> {
        let mut config = self.file.unwrap_or_default();

        if let Some(device) = self.device {
            config.serial.device = device;
        }
        if let Some(format) = self.output_format {
            config.output_format = format;
        }
        if let Some(verbose) = self.verbose {
            config.verbose = verbose;
        }

        Self::validate_device(&config.serial.device)?;
        Self::validate_output_format(&config.output_format)?;
        config
            .controller_config()
            .validate()
            .context("Invalid controller configuration")?;

        Ok(config)
    }

    fn validate_device(device: &str) -> Result<()> {
        if device.trim().is_empty() {
            bail!("Device path cannot be empty");
        }
        Ok(())
    }

    fn validate_output_format(format: &str) -> Result<()> {
        match format {
            "table" | "json" => Ok(()),
            _ => bail!(
                "Invalid output format '{}'. Must be 'table' or 'json'",
                format
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn clear_env() {
        std::env::remove_var("GRIDFAN_DEVICE");
        std::env::remove_var("GRIDFAN_FORMAT");
        std::env::remove_var("GRIDFAN_VERBOSE");
        std::env::remove_var("GRIDFAN_CONFIG");
    }

    fn config_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = CliConfig::builder().build().unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.serial.device, "/dev/GridPlus0");
        assert_eq!(config.output_format, "table");
    }

    #[test]
    fn test_file_values_apply() {
        let file = config_file(
            r#"
            output_format = "json"

            [serial]
            device = "/dev/ttyACM1"

            [retry]
            wake_attempts = 10
            "#,
        );

        let config = CliConfig::builder()
            .with_config_file(Some(file.path()), true)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(config.output_format, "json");
        assert_eq!(config.serial.device, "/dev/ttyACM1");
        assert_eq!(config.serial.baud_rate, 4800);
        assert_eq!(config.controller_config().retry.wake_attempts, 10);
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = config_file("[serial]\ndevice = \"/dev/ttyACM1\"\n");

        let config = CliConfig::builder()
            .with_device("/dev/ttyUSB0")
            .unwrap()
            .with_config_file(Some(file.path()), true)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(config.serial.device, "/dev/ttyUSB0");
    }

    #[test]
    fn test_no_config_skips_file() {
        let file = config_file("output_format = \"json\"\n");

        let config = CliConfig::builder()
            .with_config_file(Some(file.path()), false)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(config.output_format, "table");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = CliConfig::builder()
            .with_config_file(Some(Path::new("/nonexistent/gridfan/cli.toml")), true)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let file = config_file("output_format = [\n");

        assert!(CliConfig::builder()
            .with_config_file(Some(file.path()), true)
            .is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(CliConfig::builder().with_output_format("yaml").is_err());
        assert!(CliConfig::builder().with_device("  ").is_err());

        let file = config_file("[retry]\npresence_attempts = 0\n");
        let result = CliConfig::builder()
            .with_config_file(Some(file.path()), true)
            .unwrap()
            .build();
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        std::env::set_var("GRIDFAN_DEVICE", "/dev/ttyS9");
        std::env::set_var("GRIDFAN_FORMAT", "json");
        std::env::set_var("GRIDFAN_VERBOSE", "1");

        let config = CliConfig::builder().with_env_overrides().build().unwrap();
        clear_env();

        assert_eq!(config.serial.device, "/dev/ttyS9");
        assert_eq!(config.output_format, "json");
        assert!(config.verbose);
    }

    #[test]
    #[serial]
    fn test_cli_args_beat_env() {
        clear_env();
        std::env::set_var("GRIDFAN_FORMAT", "json");

        let config = CliConfig::builder()
            .with_output_format("table")
            .unwrap()
            .with_env_overrides()
            .build()
            .unwrap();
        clear_env();

        assert_eq!(config.output_format, "table");
    }

    #[test]
    #[serial]
    fn test_invalid_env_ignored() {
        clear_env();
        std::env::set_var("GRIDFAN_FORMAT", "xml");

        let config = CliConfig::builder().with_env_overrides().build().unwrap();
        clear_env();

        assert_eq!(config.output_format, "table");
    }

    #[test]
    #[serial]
    fn test_config_path_resolution() {
        clear_env();
        assert_eq!(
            CliConfig::config_path(Some(Path::new("/tmp/x.toml"))),
            PathBuf::from("/tmp/x.toml")
        );

        std::env::set_var("GRIDFAN_CONFIG", "/tmp/env.toml");
        assert_eq!(CliConfig::config_path(None), PathBuf::from("/tmp/env.toml"));
        clear_env();

        assert_eq!(CliConfig::config_path(None), default_config_path());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = CliConfig::default();
        config.verbose = true;
        let text = config.to_toml().unwrap();
        assert_eq!(toml::from_str::<CliConfig>(&text).unwrap(), config);
    }
}

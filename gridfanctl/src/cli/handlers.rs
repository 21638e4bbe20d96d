//! Command execution handlers
//!
//! Each handler runs one command against the controller and returns the
//! text to print.

use anyhow::{bail, Result};
use gridfan_hardware::{GridController, SerialConnector};
use std::path::Path;

use crate::config::CliConfig;
use crate::format::{
    format_flag, format_readings, format_success, format_value, format_values, OutputFormat,
};

use super::commands::ConfigCommands;

/// Handle ping command
pub async fn handle_ping<C: SerialConnector>(
    controller: &GridController<C>,
    format: &OutputFormat,
) -> Result<String> {
    let alive = controller.ping().await;
    if !alive {
        bail!("Controller did not answer the ping");
    }
    format_flag("alive", alive, format)
}

/// Handle wake command
pub async fn handle_wake<C: SerialConnector>(
    controller: &GridController<C>,
    format: &OutputFormat,
) -> Result<String> {
    if !controller.wake().await {
        bail!(
            "Controller did not wake up after {} attempts",
            controller.retry_policy().wake_attempts
        );
    }
    format_flag("awake", true, format)
}

/// Handle rpm command
pub async fn handle_rpm<C: SerialConnector>(
    controller: &GridController<C>,
    channel: Option<u8>,
    format: &OutputFormat,
) -> Result<String> {
    match channel {
        Some(channel) => {
            let rpm = controller.get_rpm(channel).await?;
            format_value("RPM", "", channel, rpm, format)
        }
        None => format_values("RPM", "", controller.get_rpm_all().await?, format),
    }
}

/// Handle voltage command
pub async fn handle_voltage<C: SerialConnector>(
    controller: &GridController<C>,
    channel: Option<u8>,
    format: &OutputFormat,
) -> Result<String> {
    match channel {
        Some(channel) => {
            let voltage = controller.get_voltage(channel).await?;
            format_value("Voltage", "V", channel, voltage, format)
        }
        None => format_values("Voltage", "V", controller.get_voltage_all().await?, format),
    }
}

/// Handle wattage command
pub async fn handle_wattage<C: SerialConnector>(
    controller: &GridController<C>,
    channel: Option<u8>,
    format: &OutputFormat,
) -> Result<String> {
    match channel {
        Some(channel) => {
            let wattage = controller.get_wattage(channel).await?;
            format_value("Wattage", "W", channel, wattage, format)
        }
        None => format_values("Wattage", "W", controller.get_wattage_all().await?, format),
    }
}

/// Handle percent command
pub async fn handle_percent<C: SerialConnector>(
    controller: &GridController<C>,
    channel: Option<u8>,
    format: &OutputFormat,
) -> Result<String> {
    match channel {
        Some(channel) => {
            let percent = controller.get_percent(channel).await?;
            format_value("Percent", "%", channel, percent, format)
        }
        None => format_values("Percent", "%", controller.get_percent_all().await?, format),
    }
}

/// Handle status command
pub async fn handle_status<C: SerialConnector>(
    controller: &GridController<C>,
    format: &OutputFormat,
) -> Result<String> {
    let readings = controller.read_all().await?;
    format_readings(&readings, format)
}

/// Handle set command
pub async fn handle_set<C: SerialConnector>(
    controller: &GridController<C>,
    speed: u8,
    channel: Option<u8>,
) -> Result<String> {
    match channel {
        Some(channel) => {
            controller.set_fan(channel, speed).await?;
            Ok(format_success(&format!(
                "Set fan {} to {}%",
                channel, speed
            )))
        }
        None => {
            controller.set_fan_all(speed).await?;
            Ok(format_success(&format!("Set all fans to {}%", speed)))
        }
    }
}

/// Handle connected command
pub async fn handle_connected<C: SerialConnector>(
    controller: &GridController<C>,
    channel: u8,
    format: &OutputFormat,
) -> Result<String> {
    let connected = controller.is_fan_connected(channel).await?;
    format_flag("connected", connected, format)
}

/// Handle config commands
pub fn handle_config(
    command: ConfigCommands,
    config: &CliConfig,
    config_path: &Path,
    format: &OutputFormat,
) -> Result<String> {
    match command {
        ConfigCommands::Show => match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(config)?),
            OutputFormat::Table => config.to_toml(),
        },
        ConfigCommands::Path => Ok(config_path.display().to_string()),
    }
}

/// Generate shell completion script
pub fn generate_completion(shell: clap_complete::Shell) {
    use clap::CommandFactory;

    let mut cmd = super::commands::Cli::command();
    clap_complete::generate(shell, &mut cmd, "gridfanctl", &mut std::io::stdout());
}

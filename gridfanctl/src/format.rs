//! Output formatting utilities for the CLI
//!
//! Provides table and JSON formatting with colors.

use anyhow::Result;
use colored::*;
use gridfan_core::ChannelReading;
use serde::Serialize;
use std::fmt::Display;
use tabled::{settings::Style, Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

/// One telemetry value per channel, channel 1 first
#[derive(Debug, Serialize)]
struct ChannelValue<T> {
    channel: u8,
    value: T,
}

/// Format one telemetry value for a single channel
pub fn format_value<T: Serialize + Display>(
    label: &str,
    unit: &str,
    channel: u8,
    value: T,
    format: &OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&ChannelValue {
            channel,
            value,
        })?),
        OutputFormat::Table => Ok(format!(
            "Fan {} {}: {}",
            channel,
            label,
            format!("{}{}", value, unit).cyan()
        )),
    }
}

/// Format one telemetry value for every channel
pub fn format_values<T: Serialize + Display>(
    label: &str,
    unit: &str,
    values: Vec<T>,
    format: &OutputFormat,
) -> Result<String> {
    let values: Vec<ChannelValue<T>> = values
        .into_iter()
        .zip(1u8..)
        .map(|(value, channel)| ChannelValue { channel, value })
        .collect();

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&values)?),
        OutputFormat::Table => {
            #[derive(Tabled)]
            struct ValueRow {
                #[tabled(rename = "Channel")]
                channel: String,
                #[tabled(rename = "Value")]
                value: String,
            }

            let rows: Vec<ValueRow> = values
                .iter()
                .map(|v| ValueRow {
                    channel: v.channel.to_string(),
                    value: format!("{}{}", v.value, unit),
                })
                .collect();

            let table = Table::new(rows).with(Style::rounded()).to_string();
            Ok(format!("{}\n{}", format!("Fan {}:", label).bold(), table))
        }
    }
}

/// Format full channel readings
pub fn format_readings(readings: &[ChannelReading], format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(readings)?),
        OutputFormat::Table => {
            #[derive(Tabled)]
            struct ReadingRow {
                #[tabled(rename = "Channel")]
                channel: String,
                #[tabled(rename = "RPM")]
                rpm: String,
                #[tabled(rename = "Voltage")]
                voltage: String,
                #[tabled(rename = "Wattage")]
                wattage: String,
                #[tabled(rename = "Percent")]
                percent: String,
            }

            let rows: Vec<ReadingRow> = readings
                .iter()
                .map(|r| ReadingRow {
                    channel: r.channel.to_string(),
                    rpm: if r.rpm > 0 {
                        r.rpm.to_string().green().to_string()
                    } else {
                        "0".red().to_string()
                    },
                    voltage: format!("{}V", r.voltage),
                    wattage: format!("{}W", r.wattage),
                    percent: if r.percent > 0 {
                        format!("{}%", r.percent).cyan().to_string()
                    } else {
                        "0%".dimmed().to_string()
                    },
                })
                .collect();

            let table = Table::new(rows).with(Style::rounded()).to_string();
            Ok(format!("{}\n{}", "Fan Status:".bold(), table))
        }
    }
}

/// Format a yes/no answer
pub fn format_flag(label: &str, value: bool, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::json!({ label: value }).to_string()),
        OutputFormat::Table => Ok(format!(
            "{}: {}",
            label,
            if value { "Yes".green() } else { "No".red() }
        )),
    }
}

/// Format success message
pub fn format_success(message: &str) -> String {
    format!("{} {}", "✓".green(), message)
}

//! CLI command and subcommand definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// NZXT Grid+ v2 fan controller CLI
#[derive(Parser, Debug)]
#[command(name = "gridfanctl")]
#[command(version, about = "NZXT Grid+ v2 fan controller CLI", long_about = None)]
pub struct Cli {
    /// Serial device of the controller (overrides config file)
    #[arg(short, long)]
    pub device: Option<String>,

    /// Output format (overrides config file)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Enable verbose logging (overrides config file)
    #[arg(short, long)]
    pub verbose: Option<bool>,

    /// Don't load config file
    #[arg(long)]
    pub no_config: bool,

    /// Config file path (default: ~/.config/gridfan/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty table output
    Table,
    /// JSON output
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ping the controller once
    Ping,

    /// Ping the controller until it wakes up
    Wake,

    /// Show fan RPM
    Rpm {
        /// Channel (1-6); all channels if omitted
        channel: Option<u8>,
    },

    /// Show applied voltage
    Voltage {
        /// Channel (1-6); all channels if omitted
        channel: Option<u8>,
    },

    /// Show power draw in watts
    Wattage {
        /// Channel (1-6); all channels if omitted
        channel: Option<u8>,
    },

    /// Show applied voltage as a speed percentage
    Percent {
        /// Channel (1-6); all channels if omitted
        channel: Option<u8>,
    },

    /// Show every reading for every channel
    Status,

    /// Set fan speed
    Set {
        /// Speed percentage: 0 (off) or 20-100
        speed: u8,

        /// Channel (1-6); all channels if omitted
        #[arg(short, long)]
        channel: Option<u8>,
    },

    /// Check whether a fan is plugged into a channel
    Connected {
        /// Channel (1-6)
        channel: u8,
    },

    /// Show or manage CLI configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Show the configuration file path
    Path,
}

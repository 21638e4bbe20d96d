//! GridFan CLI
//!
//! Command-line interface for the NZXT Grid+ v2 fan controller.

use anyhow::Result;
use clap::Parser;
use gridfan_hardware::GridController;
use gridfanctl::cli::{
    generate_completion, handle_config, handle_connected, handle_percent, handle_ping,
    handle_rpm, handle_set, handle_status, handle_voltage, handle_wake, handle_wattage, Cli,
    Commands, OutputFormat,
};
use gridfanctl::config::CliConfig;
use gridfanctl::format;
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Build configuration using priority chain: defaults → file → env → CLI args
    let mut builder = CliConfig::builder();

    if let Some(ref device) = cli.device {
        builder = builder.with_device(device)?;
    }
    if let Some(ref format) = cli.format {
        let format_str = match format {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
        };
        builder = builder.with_output_format(format_str)?;
    }
    if let Some(verbose) = cli.verbose {
        builder = builder.with_verbose(verbose);
    }

    builder = builder.with_env_overrides();

    let config = match builder
        .with_config_file(cli.config.as_deref(), !cli.no_config)
        .and_then(|b| b.build())
    {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_tracing(config.verbose);

    let output_format = match config.output_format.as_str() {
        "json" => format::OutputFormat::Json,
        _ => format::OutputFormat::Table,
    };
    debug!("Device: {}", config.serial.device);
    debug!("Output format: {:?}", output_format);

    let controller = GridController::new(&config.controller_config());

    // Execute commands
    let result = match cli.command {
        Commands::Ping => handle_ping(&controller, &output_format).await,
        Commands::Wake => handle_wake(&controller, &output_format).await,
        Commands::Rpm { channel } => handle_rpm(&controller, channel, &output_format).await,
        Commands::Voltage { channel } => {
            handle_voltage(&controller, channel, &output_format).await
        }
        Commands::Wattage { channel } => {
            handle_wattage(&controller, channel, &output_format).await
        }
        Commands::Percent { channel } => {
            handle_percent(&controller, channel, &output_format).await
        }
        Commands::Status => handle_status(&controller, &output_format).await,
        Commands::Set { speed, channel } => handle_set(&controller, speed, channel).await,
        Commands::Connected { channel } => {
            handle_connected(&controller, channel, &output_format).await
        }
        Commands::Config { command } => handle_config(
            command,
            &config,
            &CliConfig::config_path(cli.config.as_deref()),
            &output_format,
        ),
        Commands::Completion { shell } => {
            generate_completion(shell);
            Ok(String::new())
        }
    };

    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            if config.verbose {
                eprintln!("Error details: {:?}", e);
            }
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` wins over the verbose flag
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

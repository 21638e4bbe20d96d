//! GridFan CLI Library
//!
//! This library provides the core functionality for the `gridfanctl` tool.
//!
//! # Public API
//!
//! Configuration types are available via [`config::CliConfig`] and
//! [`config::ConfigBuilder`]. The controller itself lives in
//! `gridfan_hardware::GridController`.
//!
//! ```no_run
//! use gridfan_hardware::GridController;
//! use gridfanctl::config::CliConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = CliConfig::builder().with_config_file(None, true)?.build()?;
//! let controller = GridController::new(&config.controller_config());
//!
//! if controller.wake().await {
//!     println!("Fan 1: {} RPM", controller.get_rpm(1).await?);
//! }
//! # Ok(())
//! # }
//! ```

// Internal CLI implementation - not part of public API
#[doc(hidden)]
pub mod cli;

/// Configuration types for the CLI tool.
pub mod config;

// Internal formatting functions - not part of public API
#[doc(hidden)]
pub mod format;

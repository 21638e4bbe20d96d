//! Configuration for the GridFan driver
//!
//! - [`controller_config`] - Serial link settings and retry pacing
//! - [`paths`] - Default configuration file location

mod controller_config;
mod paths;

pub use controller_config::{ControllerConfig, RetryPolicy, SerialSettings};
pub use paths::default_config_path;

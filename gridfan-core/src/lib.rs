//! GridFan Core Library
//!
//! Shared types, wire codec and command table for the NZXT Grid+ v2 fan
//! controller. Nothing in this crate performs I/O; the serial transport and
//! the controller logic live in `gridfan-hardware`.

pub mod board;
pub mod codec;
pub mod command;
pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use board::*;
pub use command::Command;
pub use config::{default_config_path, ControllerConfig, RetryPolicy, SerialSettings};
pub use error::*;
pub use types::*;

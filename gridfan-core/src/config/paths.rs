//! Default path resolution for configuration files
//!
//! Uses XDG Base Directory specification when available, with sensible fallbacks.

use std::path::PathBuf;

/// Returns the default path for the controller configuration file.
///
/// Uses XDG config directory if available:
/// - Linux/macOS: `~/.config/gridfan/config.toml`
/// - Fallback: `/etc/gridfan/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("/etc"))
        .join("gridfan")
        .join("config.toml")
}

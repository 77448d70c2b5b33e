//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// Auto-save poll interval (the browser script polls every 2 seconds)
pub const DEFAULT_AUTO_SAVE_INTERVAL_MS: u64 = 2000;

/// Toasts are shown unless disabled
pub const DEFAULT_NOTIFICATIONS: bool = true;

/// Config file location, relative to the home directory
pub const DEFAULT_CONFIG_PATH: &str = "~/.wme-shortcuts/config.json";

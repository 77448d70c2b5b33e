//! Configuration module - process settings
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - Configuration struct definitions
//! - `loader` - File system loading and parsing

mod defaults;
mod loader;
mod types;

pub use defaults::{DEFAULT_AUTO_SAVE_INTERVAL_MS, DEFAULT_NOTIFICATIONS};
pub use loader::{default_config_path, load_config, load_config_from};
pub use types::KitConfig;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

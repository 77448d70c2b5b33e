//! Configuration loading from file system

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use super::defaults::DEFAULT_CONFIG_PATH;
use super::types::KitConfig;

/// Default config file path (~/.wme-shortcuts/config.json)
pub fn default_config_path() -> PathBuf {
    PathBuf::from(shellexpand::tilde(DEFAULT_CONFIG_PATH).as_ref())
}

/// Load configuration from ~/.wme-shortcuts/config.json
pub fn load_config() -> KitConfig {
    load_config_from(&default_config_path())
}

/// Load configuration from `path`.
///
/// Returns KitConfig::default() if the file is missing, unreadable or invalid.
#[instrument(name = "load_config")]
pub fn load_config_from(path: &Path) -> KitConfig {
    if !path.exists() {
        info!(path = %path.display(), "Config file not found, using defaults");
        return KitConfig::default();
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read config, using defaults");
            return KitConfig::default();
        }
    };

    match serde_json::from_str::<KitConfig>(&content) {
        Ok(config) => {
            info!(path = %path.display(), "Successfully loaded config");
            config
        }
        Err(e) => {
            let hint = if e.to_string().contains("unknown variant") {
                "modifierScheme must be \"demo-script\" or \"guide\""
            } else {
                ""
            };
            warn!(
                path = %path.display(),
                error = %e,
                hint,
                "Failed to parse config JSON, using defaults"
            );
            KitConfig::default()
        }
    }
}

//! Configuration type definitions

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults::*;
use crate::shortcuts::{AutoSaveConfig, SchemeName};
use crate::storage::default_storage_path;

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KitConfig {
    /// Local storage file (default: ~/.wme-shortcuts/local-storage.json).
    /// A leading `~` is expanded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<String>,
    /// Auto-save poll interval in milliseconds (default: 2000)
    #[serde(default = "default_auto_save_interval_ms")]
    pub auto_save_interval_ms: u64,
    /// Stop each auto-save timer after this many ticks (None = until shutdown)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_save_max_ticks: Option<u64>,
    /// Bit-to-modifier mapping of the host's numeric chords (default: demo-script)
    #[serde(default)]
    pub modifier_scheme: SchemeName,
    /// Show toasts (default: true)
    #[serde(default = "default_notifications")]
    pub notifications: bool,
}

fn default_auto_save_interval_ms() -> u64 {
    DEFAULT_AUTO_SAVE_INTERVAL_MS
}
fn default_notifications() -> bool {
    DEFAULT_NOTIFICATIONS
}

impl Default for KitConfig {
    fn default() -> Self {
        KitConfig {
            storage_path: None,
            auto_save_interval_ms: DEFAULT_AUTO_SAVE_INTERVAL_MS,
            auto_save_max_ticks: None,
            modifier_scheme: SchemeName::default(),
            notifications: DEFAULT_NOTIFICATIONS,
        }
    }
}

impl KitConfig {
    /// Resolved storage file path.
    pub fn storage_path(&self) -> PathBuf {
        match &self.storage_path {
            Some(path) => PathBuf::from(shellexpand::tilde(path).as_ref()),
            None => default_storage_path(),
        }
    }

    /// Auto-save timer settings. A zero interval falls back to the default.
    pub fn auto_save(&self) -> AutoSaveConfig {
        let interval_ms = if self.auto_save_interval_ms == 0 {
            DEFAULT_AUTO_SAVE_INTERVAL_MS
        } else {
            self.auto_save_interval_ms
        };
        AutoSaveConfig {
            interval: Duration::from_millis(interval_ms),
            max_ticks: self.auto_save_max_ticks,
        }
    }
}

//! Persisted shortcut record.
//!
//! One record per shortcut, stored as JSON under that shortcut's storage key:
//!
//! ```json
//! {"shortcutId":"wme-demo-manual","name":"Manual save demo","description":"...","shortcutKeys":"4,50"}
//! ```
//!
//! `shortcutKeys` holds the host's numeric chord verbatim. A record is only
//! ever written with a chord; "unassigned" is represented by the absence of a
//! record, never by `null`.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShortcutKitError};
use crate::host::ShortcutInfo;
use crate::storage::KeyValueStore;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedShortcutConfig {
    pub shortcut_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub shortcut_keys: Option<String>,
}

impl PersistedShortcutConfig {
    /// Snapshot a live registration.
    pub fn from_live(info: &ShortcutInfo) -> Self {
        Self {
            shortcut_id: info.id.clone(),
            name: info.name.clone(),
            description: info.description.clone(),
            shortcut_keys: info.chord.clone(),
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Read and parse the record under `key`. `Ok(None)` when nothing is stored.
    pub fn load(store: &dyn KeyValueStore, key: &str) -> Result<Option<Self>> {
        let raw = store.get(key).map_err(|source| ShortcutKitError::Storage {
            key: key.to_string(),
            source,
        })?;

        match raw {
            None => Ok(None),
            Some(json) => Self::from_json(&json)
                .map(Some)
                .map_err(|source| ShortcutKitError::CorruptRecord {
                    key: key.to_string(),
                    source,
                }),
        }
    }

    /// Overwrite the record under `key`. Refuses records without a chord.
    pub fn save(&self, store: &dyn KeyValueStore, key: &str) -> Result<()> {
        if self.shortcut_keys.is_none() {
            return Err(ShortcutKitError::UnassignedChord(self.shortcut_id.clone()));
        }

        let json = self
            .to_json()
            .map_err(|source| ShortcutKitError::CorruptRecord {
                key: key.to_string(),
                source,
            })?;

        store
            .set(key, &json)
            .map_err(|source| ShortcutKitError::Storage {
                key: key.to_string(),
                source,
            })
    }
}

//! Per-shortcut lifecycle: restore, register, save, reset, auto-save.
//!
//! # Startup protocol
//!
//! 1. Read and parse the record under the storage key (failure = absent).
//! 2. If a record with a chord exists, deregister any stale registration
//!    (`NotFound` is the normal first-run answer and is ignored).
//! 3. Pick the chord: decoded persisted chord, else the hardcoded default,
//!    else none. A persisted chord that fails to decode means "unassigned".
//! 4. Register with a fresh callback. Failure leaves the lifecycle inert
//!    until the next process start; there is no retry.
//! 5. In auto-save mode, start the poll timer.
//!
//! `save` and `reset` only touch storage. The live registration changes only
//! through the host or the next startup.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use super::auto_save::{AutoSaveConfig, AutoSaveHandle};
use super::codec::ModifierScheme;
use super::persistence::PersistedShortcutConfig;
use crate::commands::Command;
use crate::error::{ResultExt, ShortcutKitError};
use crate::host::{HostError, Notifier, ShortcutCallback, ShortcutHost, ShortcutRegistration};
use crate::storage::KeyValueStore;

/// How the lifecycle keeps storage in sync with the live registration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PersistenceMode {
    /// Storage changes only through explicit `save`.
    #[default]
    ManualSave,
    /// A timer persists any drift between live and stored chord.
    AutoSave(AutoSaveConfig),
}

/// Static description of one logical shortcut.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShortcutSpec {
    pub shortcut_id: String,
    pub storage_key: String,
    pub name: String,
    pub description: String,
    /// Registration-form chord used when nothing is persisted.
    pub hardcoded_default: Option<String>,
    pub mode: PersistenceMode,
    /// Skip `save` when the live chord is unassigned instead of clearing the record.
    pub require_chord_on_save: bool,
}

impl ShortcutSpec {
    pub fn new(
        shortcut_id: impl Into<String>,
        storage_key: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            shortcut_id: shortcut_id.into(),
            storage_key: storage_key.into(),
            name: name.into(),
            description: String::new(),
            hardcoded_default: None,
            mode: PersistenceMode::ManualSave,
            require_chord_on_save: false,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn hardcoded_default(mut self, chord: impl Into<String>) -> Self {
        self.hardcoded_default = Some(chord.into());
        self
    }

    pub fn with_auto_save(mut self, config: AutoSaveConfig) -> Self {
        self.mode = PersistenceMode::AutoSave(config);
        self
    }

    pub fn require_chord_on_save(mut self) -> Self {
        self.require_chord_on_save = true;
        self
    }

    /// Pattern A: no default, storage changes only on explicit save/reset.
    pub fn manual_save(
        shortcut_id: impl Into<String>,
        storage_key: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self::new(shortcut_id, storage_key, name)
    }

    /// Pattern B: hardcoded default, drift is auto-saved.
    pub fn default_with_auto_save(
        shortcut_id: impl Into<String>,
        storage_key: impl Into<String>,
        name: impl Into<String>,
        default_chord: impl Into<String>,
        config: AutoSaveConfig,
    ) -> Self {
        Self::new(shortcut_id, storage_key, name)
            .hardcoded_default(default_chord)
            .with_auto_save(config)
    }

    /// Pattern C: hardcoded default, explicit save only writes a real chord.
    pub fn default_with_override(
        shortcut_id: impl Into<String>,
        storage_key: impl Into<String>,
        name: impl Into<String>,
        default_chord: impl Into<String>,
    ) -> Self {
        Self::new(shortcut_id, storage_key, name)
            .hardcoded_default(default_chord)
            .require_chord_on_save()
    }

    /// Pattern D: no default, any assigned chord is auto-saved.
    pub fn auto_save(
        shortcut_id: impl Into<String>,
        storage_key: impl Into<String>,
        name: impl Into<String>,
        config: AutoSaveConfig,
    ) -> Self {
        Self::new(shortcut_id, storage_key, name).with_auto_save(config)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Registering,
    Registered,
    /// Registration failed; nothing works until the next start.
    Inert,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uninitialized => "uninitialized",
            Self::Registering => "registering",
            Self::Registered => "registered",
            Self::Inert => "inert",
        };
        f.write_str(s)
    }
}

/// Where the registered chord came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChordSource {
    Persisted,
    HardcodedDefault,
    Unassigned,
}

/// What `start` did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StartupReport {
    pub restored: Option<PersistedShortcutConfig>,
    /// Registration-form chord handed to the host.
    pub chord: Option<String>,
    pub source: ChordSource,
    pub state: LifecycleState,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Record written with this numeric chord.
    Saved(String),
    /// Live chord is unassigned; the record was removed.
    Cleared,
    /// Live chord is unassigned and this shortcut only saves real chords.
    NothingToSave,
    /// The host has no live registration for this id.
    NotRegistered,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetOutcome {
    Cleared,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Persisted(String),
    Unchanged,
    Unassigned,
    NotRegistered,
    Failed,
}

struct Inner {
    spec: ShortcutSpec,
    host: Arc<dyn ShortcutHost>,
    store: Arc<dyn KeyValueStore>,
    notifier: Option<Arc<dyn Notifier>>,
    scheme: ModifierScheme,
    callback: ShortcutCallback,
    state: Mutex<LifecycleState>,
    /// Last numeric chord written to storage (or observed at startup).
    last_persisted: Mutex<Option<String>>,
    /// Most recent auto-save failure, toasted once until a write succeeds.
    last_tick_failure: Mutex<Option<String>>,
}

/// Lifecycle manager for one shortcut.
pub struct ShortcutLifecycle {
    inner: Arc<Inner>,
    auto_save: Mutex<Option<AutoSaveHandle>>,
}

impl ShortcutLifecycle {
    pub fn new(
        spec: ShortcutSpec,
        host: Arc<dyn ShortcutHost>,
        store: Arc<dyn KeyValueStore>,
        notifier: Option<Arc<dyn Notifier>>,
        scheme: ModifierScheme,
        callback: ShortcutCallback,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                spec,
                host,
                store,
                notifier,
                scheme,
                callback,
                state: Mutex::new(LifecycleState::Uninitialized),
                last_persisted: Mutex::new(None),
                last_tick_failure: Mutex::new(None),
            }),
            auto_save: Mutex::new(None),
        }
    }

    pub fn spec(&self) -> &ShortcutSpec {
        &self.inner.spec
    }

    pub fn state(&self) -> LifecycleState {
        *self.inner.state.lock()
    }

    pub fn last_persisted_chord(&self) -> Option<String> {
        self.inner.last_persisted.lock().clone()
    }

    pub fn auto_save_running(&self) -> bool {
        self.auto_save
            .lock()
            .as_ref()
            .is_some_and(AutoSaveHandle::is_running)
    }

    /// Run the startup protocol. Returns `None` if it already ran.
    pub fn start(&self) -> Option<StartupReport> {
        {
            let mut state = self.inner.state.lock();
            if *state != LifecycleState::Uninitialized {
                warn!(
                    shortcut_id = %self.inner.spec.shortcut_id,
                    state = %*state,
                    "Startup already ran; ignoring"
                );
                return None;
            }
            *state = LifecycleState::Registering;
        }

        let report = self.inner.register_from_storage();

        if report.state == LifecycleState::Registered {
            if let PersistenceMode::AutoSave(config) = self.inner.spec.mode {
                self.spawn_auto_save(config);
            }
        }

        Some(report)
    }

    /// Persist the live chord now.
    pub fn save(&self) -> SaveOutcome {
        self.inner.save()
    }

    /// Delete the persisted record. Takes effect at the next start.
    pub fn reset(&self) -> ResetOutcome {
        self.inner.reset()
    }

    /// One auto-save poll step.
    pub fn tick(&self) -> TickOutcome {
        self.inner.tick()
    }

    /// Stop the auto-save timer, if any.
    pub fn shutdown(&self) {
        if let Some(mut handle) = self.auto_save.lock().take() {
            handle.stop();
            info!(shortcut_id = %self.inner.spec.shortcut_id, "Auto-save stopped");
        }
    }

    /// `<prefix>-save` and `<prefix>-reset` commands for a dispatch table.
    pub fn commands(&self, prefix: &str) -> Vec<(String, Command)> {
        let save_inner = Arc::clone(&self.inner);
        let reset_inner = Arc::clone(&self.inner);
        vec![
            (
                format!("{}-save", prefix),
                Arc::new(move || {
                    save_inner.save();
                }) as Command,
            ),
            (
                format!("{}-reset", prefix),
                Arc::new(move || {
                    reset_inner.reset();
                }) as Command,
            ),
        ]
    }

    fn spawn_auto_save(&self, config: AutoSaveConfig) {
        let inner = Arc::clone(&self.inner);
        let handle = AutoSaveHandle::spawn(&self.inner.spec.shortcut_id, config, move || {
            inner.tick();
        })
        .log_err();
        *self.auto_save.lock() = handle;
    }
}

impl Inner {
    fn register_from_storage(&self) -> StartupReport {
        let spec = &self.spec;

        // Unreadable or unparseable counts as absent.
        let restored = PersistedShortcutConfig::load(self.store.as_ref(), &spec.storage_key)
            .warn_on_err()
            .flatten();
        let persisted_keys = restored.as_ref().and_then(|r| r.shortcut_keys.clone());

        if persisted_keys.is_some() {
            match self.host.deregister_shortcut(&spec.shortcut_id) {
                Ok(()) => debug!(shortcut_id = %spec.shortcut_id, "Removed stale registration"),
                Err(HostError::NotFound(_)) => {
                    debug!(shortcut_id = %spec.shortcut_id, "No stale registration (first run)")
                }
                Err(e) => warn!(
                    shortcut_id = %spec.shortcut_id,
                    error = %e,
                    "Deregistration failed; continuing"
                ),
            }
        }

        let (chord, source) = match persisted_keys.as_deref() {
            Some(numeric) => match self.scheme.decode(Some(numeric)) {
                Some(chord) => (Some(chord), ChordSource::Persisted),
                None => {
                    warn!(
                        shortcut_id = %spec.shortcut_id,
                        shortcut_keys = numeric,
                        "Persisted chord is malformed; user must assign one"
                    );
                    (None, ChordSource::Unassigned)
                }
            },
            None => match &spec.hardcoded_default {
                Some(default) => (Some(default.clone()), ChordSource::HardcodedDefault),
                None => (None, ChordSource::Unassigned),
            },
        };

        let registration = ShortcutRegistration {
            id: spec.shortcut_id.clone(),
            name: spec.name.clone(),
            description: spec.description.clone(),
            chord: chord.clone(),
            callback: Arc::clone(&self.callback),
        };

        let state = match self.host.register_shortcut(registration) {
            Ok(()) => {
                info!(
                    event_type = "shortcut_lifecycle",
                    action = "registered",
                    shortcut_id = %spec.shortcut_id,
                    chord = ?chord,
                    source = ?source,
                    "Shortcut registered"
                );
                if source == ChordSource::Persisted {
                    self.notify_info(&format!(
                        "Restored saved keys {}",
                        chord.as_deref().unwrap_or_default()
                    ));
                }
                LifecycleState::Registered
            }
            Err(source_err) => {
                let e = ShortcutKitError::Host {
                    id: spec.shortcut_id.clone(),
                    source: source_err,
                };
                error!(
                    event_type = "shortcut_lifecycle",
                    action = "register_failed",
                    shortcut_id = %spec.shortcut_id,
                    error = %e,
                    "Shortcut registration failed; inert until reload"
                );
                self.notify_error(&e.user_message());
                LifecycleState::Inert
            }
        };
        *self.state.lock() = state;

        if state == LifecycleState::Registered {
            let live = self
                .host
                .find_shortcut(&spec.shortcut_id)
                .and_then(|info| info.chord);
            *self.last_persisted.lock() = live.or(persisted_keys);
        }

        StartupReport {
            restored,
            chord,
            source,
            state,
        }
    }

    fn save(&self) -> SaveOutcome {
        let spec = &self.spec;
        let Some(live) = self.host.find_shortcut(&spec.shortcut_id) else {
            info!(shortcut_id = %spec.shortcut_id, "Nothing to save: shortcut not registered");
            return SaveOutcome::NotRegistered;
        };

        let mut last = self.last_persisted.lock();

        let Some(chord) = live.chord.clone() else {
            if spec.require_chord_on_save {
                info!(shortcut_id = %spec.shortcut_id, "Nothing to save: no keys assigned");
                return SaveOutcome::NothingToSave;
            }
            return match self.store.delete(&spec.storage_key) {
                Ok(()) => {
                    info!(
                        shortcut_id = %spec.shortcut_id,
                        storage_key = %spec.storage_key,
                        "Keys unassigned; cleared saved record"
                    );
                    *last = None;
                    self.notify_success("Shortcut cleared");
                    SaveOutcome::Cleared
                }
                Err(source) => {
                    self.report_failure(ShortcutKitError::Storage {
                        key: spec.storage_key.clone(),
                        source,
                    });
                    SaveOutcome::Failed
                }
            };
        };

        match PersistedShortcutConfig::from_live(&live).save(self.store.as_ref(), &spec.storage_key) {
            Ok(()) => {
                info!(
                    event_type = "shortcut_lifecycle",
                    action = "saved",
                    shortcut_id = %spec.shortcut_id,
                    storage_key = %spec.storage_key,
                    shortcut_keys = %chord,
                    "Shortcut saved"
                );
                *last = Some(chord.clone());
                self.notify_success("Shortcut saved");
                SaveOutcome::Saved(chord)
            }
            Err(e) => {
                self.report_failure(e);
                SaveOutcome::Failed
            }
        }
    }

    fn reset(&self) -> ResetOutcome {
        let spec = &self.spec;
        match self.store.delete(&spec.storage_key) {
            Ok(()) => {
                info!(
                    event_type = "shortcut_lifecycle",
                    action = "reset",
                    shortcut_id = %spec.shortcut_id,
                    storage_key = %spec.storage_key,
                    "Saved shortcut removed; takes effect on reload"
                );
                self.notify_info("Saved keys removed. Reload to apply.");
                ResetOutcome::Cleared
            }
            Err(source) => {
                self.report_failure(ShortcutKitError::Storage {
                    key: spec.storage_key.clone(),
                    source,
                });
                ResetOutcome::Failed
            }
        }
    }

    fn tick(&self) -> TickOutcome {
        let spec = &self.spec;
        let Some(live) = self.host.find_shortcut(&spec.shortcut_id) else {
            return TickOutcome::NotRegistered;
        };
        let Some(chord) = live.chord.clone() else {
            return TickOutcome::Unassigned;
        };

        let mut last = self.last_persisted.lock();
        if last.as_deref() == Some(chord.as_str()) {
            return TickOutcome::Unchanged;
        }

        match PersistedShortcutConfig::from_live(&live).save(self.store.as_ref(), &spec.storage_key) {
            Ok(()) => {
                info!(
                    event_type = "shortcut_lifecycle",
                    action = "auto_saved",
                    shortcut_id = %spec.shortcut_id,
                    previous = ?*last,
                    shortcut_keys = %chord,
                    "Shortcut change auto-saved"
                );
                *last = Some(chord.clone());
                *self.last_tick_failure.lock() = None;
                self.notify_success("Shortcut change saved automatically");
                TickOutcome::Persisted(chord)
            }
            Err(e) => {
                let message = e.to_string();
                let mut last_failure = self.last_tick_failure.lock();
                if last_failure.as_deref() == Some(message.as_str()) {
                    debug!(
                        shortcut_id = %spec.shortcut_id,
                        error = %message,
                        "Auto-save still failing"
                    );
                } else {
                    self.report_failure(e);
                    *last_failure = Some(message);
                }
                TickOutcome::Failed
            }
        }
    }

    fn report_failure(&self, e: ShortcutKitError) {
        error!(
            shortcut_id = %self.spec.shortcut_id,
            error = %e,
            severity = ?e.severity(),
            "Shortcut persistence failed"
        );
        self.notify_error(&e.user_message());
    }

    fn notify_info(&self, message: &str) {
        if let Some(notifier) = &self.notifier {
            notifier.info(&self.spec.name, message);
        }
    }

    fn notify_success(&self, message: &str) {
        if let Some(notifier) = &self.notifier {
            notifier.success(&self.spec.name, message);
        }
    }

    fn notify_error(&self, message: &str) {
        if let Some(notifier) = &self.notifier {
            notifier.error(&self.spec.name, message);
        }
    }
}

impl Drop for ShortcutLifecycle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

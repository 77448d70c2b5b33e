//! Deterministic in-process host registry.
//!
//! Uses Vec for deterministic iteration order and HashMap for O(1) lookup.
//! Like the editor it stands in for, it keeps chords in numeric form and
//! converts the registration string itself when a shortcut is registered.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, info};

use super::{HostError, ShortcutCallback, ShortcutHost, ShortcutInfo, ShortcutRegistration};
use crate::shortcuts::{Modifier, ModifierScheme};

/// How long `wait_ready` blocks before giving up.
const READY_TIMEOUT: Duration = Duration::from_secs(10);

struct Entry {
    info: ShortcutInfo,
    callback: ShortcutCallback,
}

#[derive(Default)]
struct Registry {
    entries: Vec<Entry>,
    id_to_index: HashMap<String, usize>,
    fail_next_register: Option<HostError>,
}

impl Registry {
    fn rebuild_index(&mut self) {
        self.id_to_index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.info.id.clone(), i))
            .collect();
    }

    fn entry_mut(&mut self, id: &str) -> Result<&mut Entry, HostError> {
        let index = *self
            .id_to_index
            .get(id)
            .ok_or_else(|| HostError::NotFound(id.to_string()))?;
        Ok(&mut self.entries[index])
    }
}

/// Fake host registry for tests and the offline CLI.
pub struct InMemoryHost {
    scheme: ModifierScheme,
    registry: Mutex<Registry>,
    ready: Mutex<bool>,
    ready_signal: Condvar,
}

impl Default for InMemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::with_scheme(ModifierScheme::default())
    }

    pub fn with_scheme(scheme: ModifierScheme) -> Self {
        Self {
            scheme,
            registry: Mutex::new(Registry::default()),
            ready: Mutex::new(true),
            ready_signal: Condvar::new(),
        }
    }

    /// A host whose SDK has not signalled readiness yet.
    pub fn not_ready(scheme: ModifierScheme) -> Self {
        let host = Self::with_scheme(scheme);
        *host.ready.lock() = false;
        host
    }

    pub fn mark_ready(&self) {
        *self.ready.lock() = true;
        self.ready_signal.notify_all();
    }

    /// Simulate the user rebinding a shortcut in the editor's settings.
    ///
    /// `numeric` must be a `<mask>,<keycode>` chord the scheme can decode.
    pub fn set_chord_numeric(&self, id: &str, numeric: &str) -> Result<(), HostError> {
        if self.scheme.decode(Some(numeric)).is_none() {
            return Err(HostError::InvalidChord(numeric.to_string()));
        }
        let mut registry = self.registry.lock();
        let entry = registry.entry_mut(id)?;
        entry.info.chord = Some(numeric.to_string());
        debug!(shortcut_id = id, chord = numeric, "Chord changed in host");
        Ok(())
    }

    /// Simulate the user clearing a shortcut in the editor's settings.
    pub fn clear_chord(&self, id: &str) -> Result<(), HostError> {
        let mut registry = self.registry.lock();
        registry.entry_mut(id)?.info.chord = None;
        Ok(())
    }

    /// Fire the callback bound to `id`.
    pub fn trigger(&self, id: &str) -> Result<(), HostError> {
        let callback = {
            let mut registry = self.registry.lock();
            registry.entry_mut(id)?.callback.clone()
        };
        callback();
        Ok(())
    }

    /// Make the next `register_shortcut` call fail with `error`.
    pub fn fail_next_register(&self, error: HostError) {
        self.registry.lock().fail_next_register = Some(error);
    }

    pub fn len(&self) -> usize {
        self.registry.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert a registration chord (`"CS+k"`) to numeric form (`"3,75"`).
    fn numeric_chord(&self, chord: &str) -> Result<String, HostError> {
        let invalid = || HostError::InvalidChord(chord.to_string());

        let (letters, key) = match chord.rsplit_once('+') {
            Some((letters, key)) if !letters.is_empty() => (letters, key),
            Some(_) => return Err(invalid()),
            None => ("", chord),
        };

        let mut mask = 0u8;
        for letter in letters.chars() {
            let modifier = Modifier::from_letter(letter).ok_or_else(invalid)?;
            mask |= 1 << self.scheme.bit(modifier);
        }

        let mut chars = key.chars();
        let key_code = match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphanumeric() => c.to_ascii_uppercase() as u32,
            _ if !key.is_empty() && key.chars().all(|c| c.is_ascii_digit()) => {
                key.parse::<u32>().map_err(|_| invalid())?
            }
            _ => return Err(invalid()),
        };

        Ok(format!("{},{}", mask, key_code))
    }
}

impl ShortcutHost for InMemoryHost {
    fn register_shortcut(&self, registration: ShortcutRegistration) -> Result<(), HostError> {
        let chord = registration
            .chord
            .as_deref()
            .map(|c| self.numeric_chord(c))
            .transpose()?;

        let mut registry = self.registry.lock();
        if let Some(error) = registry.fail_next_register.take() {
            return Err(error);
        }
        if registry.id_to_index.contains_key(&registration.id) {
            return Err(HostError::AlreadyRegistered(registration.id));
        }

        info!(
            shortcut_id = %registration.id,
            chord = ?chord,
            "Host registered shortcut"
        );
        let index = registry.entries.len();
        registry.id_to_index.insert(registration.id.clone(), index);
        registry.entries.push(Entry {
            info: ShortcutInfo {
                id: registration.id,
                name: registration.name,
                description: registration.description,
                chord,
            },
            callback: registration.callback,
        });
        Ok(())
    }

    fn deregister_shortcut(&self, id: &str) -> Result<(), HostError> {
        let mut registry = self.registry.lock();
        let index = *registry
            .id_to_index
            .get(id)
            .ok_or_else(|| HostError::NotFound(id.to_string()))?;
        registry.entries.remove(index);
        registry.rebuild_index();
        Ok(())
    }

    fn all_shortcuts(&self) -> Vec<ShortcutInfo> {
        self.registry
            .lock()
            .entries
            .iter()
            .map(|e| e.info.clone())
            .collect()
    }

    fn wait_ready(&self) -> Result<(), HostError> {
        let mut ready = self.ready.lock();
        if !*ready {
            let _ = self
                .ready_signal
                .wait_while_for(&mut ready, |ready| !*ready, READY_TIMEOUT);
        }
        if *ready {
            Ok(())
        } else {
            Err(HostError::NotReady)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn registration(id: &str, chord: Option<&str>) -> ShortcutRegistration {
        ShortcutRegistration {
            id: id.to_string(),
            name: format!("{} name", id),
            description: format!("{} description", id),
            chord: chord.map(str::to_string),
            callback: Arc::new(|| {}),
        }
    }

    #[test]
    fn register_stores_numeric_chord() {
        let host = InMemoryHost::new();
        host.register_shortcut(registration("one", Some("A+2"))).unwrap();
        host.register_shortcut(registration("two", Some("CS+k"))).unwrap();
        host.register_shortcut(registration("three", None)).unwrap();
        host.register_shortcut(registration("four", Some("C+186"))).unwrap();

        assert_eq!(host.find_shortcut("one").unwrap().chord.as_deref(), Some("4,50"));
        assert_eq!(host.find_shortcut("two").unwrap().chord.as_deref(), Some("3,75"));
        assert_eq!(host.find_shortcut("three").unwrap().chord, None);
        assert_eq!(host.find_shortcut("four").unwrap().chord.as_deref(), Some("1,186"));
    }

    #[test]
    fn guide_scheme_maps_shift_to_bit_zero() {
        let host = InMemoryHost::with_scheme(ModifierScheme::guide());
        host.register_shortcut(registration("one", Some("S+x"))).unwrap();
        assert_eq!(host.find_shortcut("one").unwrap().chord.as_deref(), Some("1,88"));
    }

    #[test]
    fn rejects_malformed_chords() {
        let host = InMemoryHost::new();
        for chord in ["", "+a", "Q+a", "A+", "A+ab"] {
            assert_eq!(
                host.register_shortcut(registration("x", Some(chord))),
                Err(HostError::InvalidChord(chord.to_string()))
            );
        }
        assert!(host.is_empty());
    }

    #[test]
    fn rebind_rejects_undecodable_numeric_chord() {
        let host = InMemoryHost::new();
        host.register_shortcut(registration("one", Some("A+2"))).unwrap();

        for numeric in ["garbage", "4", "1,2,3", "-1,65"] {
            assert_eq!(
                host.set_chord_numeric("one", numeric),
                Err(HostError::InvalidChord(numeric.to_string()))
            );
        }
        assert_eq!(host.find_shortcut("one").unwrap().chord.as_deref(), Some("4,50"));

        host.set_chord_numeric("one", "2,88").unwrap();
        assert_eq!(host.find_shortcut("one").unwrap().chord.as_deref(), Some("2,88"));
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let host = InMemoryHost::new();
        host.register_shortcut(registration("one", Some("a"))).unwrap();
        assert_eq!(
            host.register_shortcut(registration("one", Some("b"))),
            Err(HostError::AlreadyRegistered("one".to_string()))
        );
    }

    #[test]
    fn deregister_keeps_order_and_index() {
        let host = InMemoryHost::new();
        host.register_shortcut(registration("one", None)).unwrap();
        host.register_shortcut(registration("two", None)).unwrap();
        host.register_shortcut(registration("three", None)).unwrap();

        host.deregister_shortcut("one").unwrap();
        assert_eq!(
            host.deregister_shortcut("one"),
            Err(HostError::NotFound("one".to_string()))
        );

        let ids: Vec<String> = host.all_shortcuts().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["two", "three"]);
        host.set_chord_numeric("three", "2,88").unwrap();
        assert_eq!(host.find_shortcut("three").unwrap().chord.as_deref(), Some("2,88"));
    }

    #[test]
    fn trigger_runs_callback() {
        let host = InMemoryHost::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let mut reg = registration("one", Some("a"));
        reg.callback = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        host.register_shortcut(reg).unwrap();

        host.trigger("one").unwrap();
        host.trigger("one").unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert!(host.trigger("missing").is_err());
    }

    #[test]
    fn injected_failure_applies_once() {
        let host = InMemoryHost::new();
        host.fail_next_register(HostError::Unavailable("offline".to_string()));
        assert!(host.register_shortcut(registration("one", None)).is_err());
        assert!(host.register_shortcut(registration("one", None)).is_ok());
    }

    #[test]
    fn wait_ready_unblocks_after_mark_ready() {
        let host = Arc::new(InMemoryHost::not_ready(ModifierScheme::default()));
        let signaller = Arc::clone(&host);
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            signaller.mark_ready();
        });
        assert_eq!(host.wait_ready(), Ok(()));
        handle.join().unwrap();
    }
}

//! The four demo shortcuts, one per persistence pattern.
//!
//! | prefix            | pattern                               | default |
//! |-------------------|---------------------------------------|---------|
//! | `manual`          | A: explicit save/reset                | none    |
//! | `default-auto`    | B: hardcoded default + auto-save      | `A+2`   |
//! | `default-override`| C: hardcoded default + explicit save  | `A+3`   |
//! | `auto`            | D: auto-save only                     | none    |

use std::sync::Arc;

use tracing::{info, warn};

use crate::commands::CommandTable;
use crate::config::KitConfig;
use crate::error::ShortcutKitError;
use crate::host::{HostError, Notifier, ShortcutCallback, ShortcutHost};
use crate::logging;
use crate::shortcuts::{ShortcutLifecycle, ShortcutSpec, StartupReport};
use crate::storage::KeyValueStore;

/// One demo action before it is bound to collaborators.
pub struct DemoAction {
    pub prefix: &'static str,
    pub spec: ShortcutSpec,
}

/// The four demo specs, with auto-save timing taken from `config`.
pub fn demo_actions(config: &KitConfig) -> Vec<DemoAction> {
    let auto_save = config.auto_save();
    vec![
        DemoAction {
            prefix: "manual",
            spec: ShortcutSpec::manual_save(
                "wme-demo-manual",
                "wme-demo-manual-shortcut",
                "Manual save demo",
            )
            .description("Shortcut saved only when you run manual-save"),
        },
        DemoAction {
            prefix: "default-auto",
            spec: ShortcutSpec::default_with_auto_save(
                "wme-demo-default-auto",
                "wme-demo-default-auto-shortcut",
                "Default + auto-save demo",
                "A+2",
                auto_save,
            )
            .description("Starts on Alt+2; changes are saved automatically"),
        },
        DemoAction {
            prefix: "default-override",
            spec: ShortcutSpec::default_with_override(
                "wme-demo-default-override",
                "wme-demo-default-override-shortcut",
                "Default + override demo",
                "A+3",
            )
            .description("Starts on Alt+3; run default-override-save to keep a custom chord"),
        },
        DemoAction {
            prefix: "auto",
            spec: ShortcutSpec::auto_save(
                "wme-demo-auto",
                "wme-demo-auto-shortcut",
                "Auto-save demo",
                auto_save,
            )
            .description("No default; any chord you assign is saved automatically"),
        },
    ]
}

/// All demo lifecycles plus the command table that drives them.
pub struct DemoKit {
    lifecycles: Vec<(&'static str, ShortcutLifecycle)>,
    commands: CommandTable,
}

impl DemoKit {
    /// Wait for the host, then start every demo shortcut independently.
    pub fn bootstrap(
        host: Arc<dyn ShortcutHost>,
        store: Arc<dyn KeyValueStore>,
        notifier: Option<Arc<dyn Notifier>>,
        config: &KitConfig,
    ) -> Result<(Self, Vec<(&'static str, StartupReport)>), ShortcutKitError> {
        host.wait_ready().map_err(|source| ShortcutKitError::Host {
            id: "sdk".to_string(),
            source,
        })?;
        logging::log("BOOT", "Host SDK ready, registering demo shortcuts");

        let notifier = if config.notifications { notifier } else { None };
        let scheme = config.modifier_scheme.scheme();

        let mut lifecycles = Vec::new();
        let mut reports = Vec::new();
        let mut commands = CommandTable::new();

        for action in demo_actions(config) {
            let lifecycle = ShortcutLifecycle::new(
                action.spec,
                Arc::clone(&host),
                Arc::clone(&store),
                notifier.clone(),
                scheme,
                demo_callback(action.prefix),
            );
            match lifecycle.start() {
                Some(report) => {
                    logging::log(
                        "BOOT",
                        &format!("{}: {} ({:?})", action.prefix, report.state, report.source),
                    );
                    reports.push((action.prefix, report));
                }
                None => warn!(prefix = action.prefix, "Demo shortcut already started"),
            }
            commands.extend(lifecycle.commands(action.prefix));
            lifecycles.push((action.prefix, lifecycle));
        }

        info!(
            event_type = "app_lifecycle",
            action = "bootstrapped",
            shortcuts = lifecycles.len(),
            commands = commands.len(),
            "Demo shortcuts ready"
        );

        Ok((
            Self {
                lifecycles,
                commands,
            },
            reports,
        ))
    }

    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }

    pub fn lifecycle(&self, prefix: &str) -> Option<&ShortcutLifecycle> {
        self.lifecycles
            .iter()
            .find(|(p, _)| *p == prefix)
            .map(|(_, l)| l)
    }

    /// Stop every auto-save timer.
    pub fn shutdown(&self) {
        for (_, lifecycle) in &self.lifecycles {
            lifecycle.shutdown();
        }
        info!(event_type = "app_lifecycle", action = "shutdown", "Demo shortcuts stopped");
    }
}

fn demo_callback(prefix: &'static str) -> ShortcutCallback {
    Arc::new(move || {
        logging::log("SHORTCUT", &format!("{} shortcut triggered", prefix));
    })
}

/// True when bootstrap gave up waiting for the host SDK.
pub fn is_not_ready(error: &ShortcutKitError) -> bool {
    matches!(
        error,
        ShortcutKitError::Host {
            source: HostError::NotReady,
            ..
        }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::InMemoryHost;
    use crate::shortcuts::{ChordSource, LifecycleState, ModifierScheme};
    use crate::storage::MemoryStore;
    use std::time::Duration;

    fn quiet_config() -> KitConfig {
        KitConfig {
            auto_save_interval_ms: 3_600_000,
            ..KitConfig::default()
        }
    }

    #[test]
    fn bootstrap_registers_all_four() {
        let host = Arc::new(InMemoryHost::new());
        let store = Arc::new(MemoryStore::new());
        let (kit, reports) = DemoKit::bootstrap(host.clone(), store, None, &quiet_config()).unwrap();

        assert_eq!(host.len(), 4);
        assert_eq!(reports.len(), 4);
        assert!(reports.iter().all(|(_, r)| r.state == LifecycleState::Registered));
        assert_eq!(
            kit.commands().names(),
            vec![
                "manual-save",
                "manual-reset",
                "default-auto-save",
                "default-auto-reset",
                "default-override-save",
                "default-override-reset",
                "auto-save",
                "auto-reset",
            ]
        );
        assert!(kit.lifecycle("default-auto").unwrap().auto_save_running());
        assert!(!kit.lifecycle("manual").unwrap().auto_save_running());
        kit.shutdown();
        assert!(!kit.lifecycle("auto").unwrap().auto_save_running());
    }

    #[test]
    fn defaults_match_patterns() {
        let host = Arc::new(InMemoryHost::new());
        let store = Arc::new(MemoryStore::new());
        let (_kit, reports) = DemoKit::bootstrap(host.clone(), store, None, &quiet_config()).unwrap();

        let chord = |id: &str| host.find_shortcut(id).and_then(|s| s.chord);
        assert_eq!(chord("wme-demo-manual"), None);
        assert_eq!(chord("wme-demo-default-auto").as_deref(), Some("4,50"));
        assert_eq!(chord("wme-demo-default-override").as_deref(), Some("4,51"));
        assert_eq!(chord("wme-demo-auto"), None);
        assert_eq!(reports[1].1.source, ChordSource::HardcodedDefault);
    }

    #[test]
    fn saved_override_survives_reload() {
        let store = Arc::new(MemoryStore::new());
        let host = Arc::new(InMemoryHost::new());
        {
            let (kit, _) =
                DemoKit::bootstrap(host.clone(), store.clone(), None, &quiet_config()).unwrap();
            host.set_chord_numeric("wme-demo-default-override", "3,75").unwrap();
            kit.commands().invoke("default-override-save").unwrap();
        }

        let reloaded = Arc::new(InMemoryHost::new());
        let (_kit, reports) =
            DemoKit::bootstrap(reloaded.clone(), store, None, &quiet_config()).unwrap();
        let (_, override_report) = &reports[2];
        assert_eq!(override_report.source, ChordSource::Persisted);
        assert_eq!(override_report.chord.as_deref(), Some("CS+k"));
    }

    #[test]
    fn bootstrap_waits_for_host_ready() {
        let host = Arc::new(InMemoryHost::not_ready(ModifierScheme::default()));
        let signaller = host.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            signaller.mark_ready();
        });
        let result = DemoKit::bootstrap(host, Arc::new(MemoryStore::new()), None, &quiet_config());
        handle.join().unwrap();
        assert!(result.is_ok());

        let err = ShortcutKitError::Host {
            id: "sdk".to_string(),
            source: HostError::NotReady,
        };
        assert!(is_not_ready(&err));
    }
}

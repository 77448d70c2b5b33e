//! Host editor collaborators.
//!
//! The editor owns the live shortcut registry and the toast surface. This
//! crate only consumes them, through the traits here, so each lifecycle can be
//! handed a real bridge or an [`InMemoryHost`] in tests.

mod memory;
mod notify;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

pub use memory::InMemoryHost;
pub use notify::{Notifier, RecordingNotifier, Toast, ToastKind, TracingNotifier};

/// Behavior bound to a shortcut. Never persisted; supplied on every registration.
pub type ShortcutCallback = Arc<dyn Fn() + Send + Sync>;

/// Errors reported by the host registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("no shortcut registered with id '{0}'")]
    NotFound(String),
    #[error("a shortcut with id '{0}' is already registered")]
    AlreadyRegistered(String),
    #[error("chord '{0}' is not accepted by the host")]
    InvalidChord(String),
    #[error("host SDK is not initialized")]
    NotReady,
    #[error("host unavailable: {0}")]
    Unavailable(String),
}

/// A registration request: identity, display metadata, chord and behavior.
#[derive(Clone)]
pub struct ShortcutRegistration {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Registration-form chord (`"A+2"`), or `None` for "user must assign".
    pub chord: Option<String>,
    pub callback: ShortcutCallback,
}

impl fmt::Debug for ShortcutRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShortcutRegistration")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("description", &self.description)
            .field("chord", &self.chord)
            .finish_non_exhaustive()
    }
}

/// A live registration as reported by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShortcutInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Host numeric form (`"4,50"`), or `None` when unassigned.
    pub chord: Option<String>,
}

/// The host's shortcut registry.
pub trait ShortcutHost: Send + Sync {
    fn register_shortcut(&self, registration: ShortcutRegistration) -> Result<(), HostError>;

    /// Fails with [`HostError::NotFound`] for an unknown id.
    fn deregister_shortcut(&self, id: &str) -> Result<(), HostError>;

    fn all_shortcuts(&self) -> Vec<ShortcutInfo>;

    /// Blocks until the SDK signals it is initialized.
    fn wait_ready(&self) -> Result<(), HostError> {
        Ok(())
    }

    fn find_shortcut(&self, id: &str) -> Option<ShortcutInfo> {
        self.all_shortcuts().into_iter().find(|s| s.id == id)
    }
}

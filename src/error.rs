use thiserror::Error;
use tracing::{error, warn};

use crate::host::HostError;
use crate::storage::StorageError;

/// Error severity for toast display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,    // informational, expected on first run
    Warning, // recoverable, shortcut keeps working
    Error,   // operation failed, shortcut may be inert until reload
}

/// Domain-specific errors for shortcut persistence
#[derive(Error, Debug)]
pub enum ShortcutKitError {
    #[error("Storage failure for key '{key}': {source}")]
    Storage {
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("Persisted config under '{key}' is not valid JSON: {source}")]
    CorruptRecord {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Host rejected shortcut '{id}': {source}")]
    Host {
        id: String,
        #[source]
        source: HostError,
    },

    #[error("Refusing to persist shortcut '{0}' without an assigned chord")]
    UnassignedChord(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

impl ShortcutKitError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Storage { .. } => ErrorSeverity::Warning,
            Self::CorruptRecord { .. } => ErrorSeverity::Warning,
            Self::Host {
                source: HostError::NotFound(_),
                ..
            } => ErrorSeverity::Info,
            Self::Host { .. } => ErrorSeverity::Error,
            Self::UnassignedChord(_) => ErrorSeverity::Info,
            Self::UnknownCommand(_) => ErrorSeverity::Warning,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Storage { key, .. } => format!("Could not access saved shortcut '{}'", key),
            Self::CorruptRecord { key, .. } => {
                format!("Saved shortcut '{}' is unreadable and was ignored", key)
            }
            Self::Host { id, .. } => format!("Shortcut '{}' could not be registered", id),
            Self::UnassignedChord(id) => format!("Shortcut '{}' has no keys to save", id),
            Self::UnknownCommand(name) => format!("No command named '{}'", name),
        }
    }
}

pub type Result<T> = std::result::Result<T, ShortcutKitError>;

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and the user doesn't need to know.
///
/// # Examples
///
/// ```ignore
/// use wme_shortcuts::error::ResultExt;
///
/// // Log and continue if the timer thread can't be spawned
/// let handle = AutoSaveHandle::spawn(id, config, tick).log_err();
///
/// // Log as warning for expected failures: a corrupt record reads as absent
/// let restored = PersistedShortcutConfig::load(store, key).warn_on_err().flatten();
/// ```
pub trait ResultExt<T> {
    /// Log error with caller location and return None. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}

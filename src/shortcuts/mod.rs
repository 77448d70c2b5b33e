//! User-customizable shortcut persistence.
//!
//! This module provides:
//! - Numeric chord decoding (`codec`)
//! - The persisted per-shortcut record (`persistence`)
//! - The per-shortcut lifecycle: restore, register, save, reset (`lifecycle`)
//! - The auto-save poll timer (`auto_save`)
//!
//! # Example
//!
//! ```ignore
//! use wme_shortcuts::shortcuts::{ShortcutLifecycle, ShortcutSpec, ModifierScheme};
//!
//! let spec = ShortcutSpec::new("my-action", "my-action-shortcut", "My action")
//!     .hardcoded_default("A+2");
//! let lifecycle = ShortcutLifecycle::new(spec, host, store, None, ModifierScheme::default(), callback);
//! lifecycle.start();
//! lifecycle.save();
//! ```

mod auto_save;
mod codec;
mod lifecycle;
mod persistence;


pub use auto_save::{AutoSaveConfig, AutoSaveHandle};
pub use codec::{decode, key_for_code, Modifier, ModifierScheme, SchemeError, SchemeName};
pub use lifecycle::{
    ChordSource, LifecycleState, PersistenceMode, ResetOutcome, SaveOutcome, ShortcutLifecycle,
    ShortcutSpec, StartupReport, TickOutcome,
};
pub use persistence::PersistedShortcutConfig;

//! WME Shortcuts - user-customizable keyboard shortcuts that survive reloads
//!
//! This library decodes the host editor's numeric chords, restores and
//! registers shortcuts at startup, and keeps the persisted record in sync
//! through explicit save/reset commands or an auto-save poll.

pub mod commands;
pub mod config;
pub mod demo;
pub mod error;
pub mod host;
pub mod logging;
pub mod shortcuts;
pub mod storage;

pub use error::{Result, ShortcutKitError};

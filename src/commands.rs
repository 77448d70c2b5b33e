//! Named zero-argument operations for manual invocation.
//!
//! The process owns one table; whatever surface exposes manual invocation
//! (the CLI here) looks commands up by name.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{Result, ShortcutKitError};

pub type Command = Arc<dyn Fn() + Send + Sync>;

/// Ordered name -> command table.
#[derive(Default, Clone)]
pub struct CommandTable {
    commands: Vec<(String, Command)>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a command. Replacement keeps the original position.
    pub fn register(&mut self, name: impl Into<String>, command: Command) {
        let name = name.into();
        if let Some(slot) = self.commands.iter_mut().find(|(n, _)| *n == name) {
            warn!(command = %name, "Replacing existing command");
            slot.1 = command;
        } else {
            self.commands.push((name, command));
        }
    }

    pub fn extend(&mut self, commands: impl IntoIterator<Item = (String, Command)>) {
        for (name, command) in commands {
            self.register(name, command);
        }
    }

    pub fn invoke(&self, name: &str) -> Result<()> {
        let (_, command) = self
            .commands
            .iter()
            .find(|(n, _)| n == name)
            .ok_or_else(|| ShortcutKitError::UnknownCommand(name.to_string()))?;
        info!(command = name, "Invoking command");
        command();
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.iter().any(|(n, _)| n == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.commands.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

use std::fmt::Display;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

/// Prefix written before every error diagnostic.
pub const DEFAULT_ERROR_PREFIX: &str = "Error:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsoleEntry {
    pub prefix: String,
    pub message: String,
}

impl ConsoleEntry {
    /// The line as it appears on the console: prefix, space, error value.
    pub fn text(&self) -> String {
        format!("{} {}", self.prefix, self.message)
    }
}

/// The diagnostic channel for failed submissions. Entries go to `tracing`
/// at error level and are kept so they can be inspected afterwards.
#[derive(Debug)]
pub struct Console {
    prefix: String,
    entries: Mutex<Vec<ConsoleEntry>>,
}

impl Default for Console {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_ERROR_PREFIX)
    }
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn error(&self, error: &dyn Display) {
        let entry = ConsoleEntry {
            prefix: self.prefix.clone(),
            message: error.to_string(),
        };
        tracing::error!(target: "console", "{}", entry.text());

        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    pub fn entries(&self) -> Vec<ConsoleEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_empty(&self) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

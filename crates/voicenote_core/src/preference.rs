//! Persisted display-theme preference.

use crate::capability::storage::{KeyValueStore, StorageError, DARK_MODE_KEY};
use log::warn;
use std::sync::Arc;

/// Dark-mode flag stored as a JSON boolean under `darkMode`.
pub struct ThemePreference {
    storage: Arc<dyn KeyValueStore>,
    dark_mode: bool,
}

impl ThemePreference {
    /// Reads the stored flag. Absent, malformed or unreadable values mean
    /// light mode.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let dark_mode = match storage.get_item(DARK_MODE_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<bool>(&raw).unwrap_or_else(|err| {
                warn!("event=theme_load module=preference status=recovered error={err}");
                false
            }),
            Ok(None) => false,
            Err(err) => {
                warn!("event=theme_load module=preference status=recovered error={err}");
                false
            }
        };
        Self { storage, dark_mode }
    }

    pub fn is_dark(&self) -> bool {
        self.dark_mode
    }

    /// Sets and persists the flag.
    ///
    /// The in-memory flag changes even when the write fails.
    pub fn set(&mut self, dark_mode: bool) -> Result<(), StorageError> {
        self.dark_mode = dark_mode;
        let encoded = if dark_mode { "true" } else { "false" };
        self.storage.set_item(DARK_MODE_KEY, encoded)
    }

    /// Flips the flag and returns the new value.
    pub fn toggle(&mut self) -> Result<bool, StorageError> {
        let next = !self.dark_mode;
        self.set(next)?;
        Ok(next)
    }
}

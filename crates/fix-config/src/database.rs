//! Database configuration.

use serde::{Deserialize, Serialize};

/// Default on-disk database path, relative to the working directory.
fn default_path() -> String {
    "data/fixline.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path to the libSQL database file. `":memory:"` gives an ephemeral
    /// in-process store (used by tests).
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

impl DatabaseConfig {
    /// Whether this config points at an in-memory database.
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_on_disk() {
        let config = DatabaseConfig::default();
        assert_eq!(config.path, "data/fixline.db");
        assert!(!config.is_in_memory());
    }

    #[test]
    fn memory_path_detection() {
        let config = DatabaseConfig {
            path: ":memory:".into(),
        };
        assert!(config.is_in_memory());
    }
}

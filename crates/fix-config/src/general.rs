//! General application configuration.

use serde::{Deserialize, Serialize};

/// Default result limit for list queries.
const fn default_limit() -> u32 {
    50
}

/// Default due-date offset for new tickets, in days.
const fn default_due_in_days() -> i64 {
    3
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Default result limit for list/search surfaces.
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Days added to the creation time to derive the default due date.
    #[serde(default = "default_due_in_days")]
    pub due_in_days: i64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            due_in_days: default_due_in_days(),
        }
    }
}

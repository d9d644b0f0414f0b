use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An append-only record of a due-date change with client-confirmation audit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeadlineExtension {
    pub id: i64,
    pub ticket_id: i64,
    pub old_due_at: Option<DateTime<Utc>>,
    pub new_due_at: DateTime<Utc>,
    pub client_confirmed: bool,
    pub note: String,
    /// Username of the actor who moved the deadline.
    pub extended_by: String,
    pub extended_at: DateTime<Utc>,
}

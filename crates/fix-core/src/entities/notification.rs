use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A per-recipient unread message generated as a side effect of a lifecycle
/// event. Created only by the engine; the sole permitted mutation is the
/// idempotent read acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    /// Public number of the ticket this notification refers to, if any.
    pub request_number: Option<i64>,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

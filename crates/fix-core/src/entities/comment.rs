use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An append-only comment on a ticket, attributed to its author.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    pub id: i64,
    pub ticket_id: i64,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

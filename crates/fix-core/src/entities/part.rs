use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A spare part recorded against a ticket. Quantity is always positive;
/// parts are individually deletable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Part {
    pub id: i64,
    pub ticket_id: i64,
    pub part_name: String,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

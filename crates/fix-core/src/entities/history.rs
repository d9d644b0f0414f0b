use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::TicketStatus;

/// An append-only status transition record.
///
/// The first entry for a ticket always has `old_status = None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusHistoryItem {
    pub id: i64,
    pub ticket_id: i64,
    pub old_status: Option<TicketStatus>,
    pub new_status: TicketStatus,
    /// Username of the actor who made the change.
    pub changed_by: String,
    pub changed_at: DateTime<Utc>,
}

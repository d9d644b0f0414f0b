use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::TicketStatus;

/// A repair ticket, the aggregate root.
///
/// This is the joined projection returned by every lifecycle operation:
/// client, appliance, issue-type, and technician references are resolved to
/// their display fields. `request_number` is the public sequential
/// identifier; `id` is the internal row id that child tables key on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ticket {
    pub id: i64,
    pub request_number: i64,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub due_at: Option<DateTime<Utc>>,
    /// Set on first entry into `in_progress`; never reset.
    pub started_at: Option<DateTime<Utc>>,
    /// Set on first entry into `ready`; never reset.
    pub completed_at: Option<DateTime<Utc>>,
    pub appliance_type: String,
    pub appliance_model: String,
    pub issue_type: Option<String>,
    pub problem_description: String,
    pub client_name: String,
    pub client_phone: String,
    /// Username of the primary technician, if assigned.
    pub technician: Option<String>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::AssigneeRole;

/// A technician's role on a ticket, unique per (ticket, user).
///
/// Joined with the users table on read so deactivated technicians still
/// display in history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Assignee {
    pub id: i64,
    pub ticket_id: i64,
    pub user_id: i64,
    pub username: String,
    pub full_name: String,
    pub role: AssigneeRole,
    pub assigned_by: i64,
    pub assigned_at: DateTime<Utc>,
}

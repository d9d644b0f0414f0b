use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::UserRole;

/// A user account.
///
/// Only active users are resolvable for new assignment; inactive users still
/// appear in historical associations (comments, history, past assignments).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: UserRole,
    pub full_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

//! Status and role enums for Fixline.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`;
//! the serde string is also the SQL storage representation returned by `as_str()`.
//! Parsing from caller-supplied strings goes through `FromStr`, which rejects
//! anything outside the closed set instead of defaulting.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// TicketStatus
// ---------------------------------------------------------------------------

/// Status of a repair ticket.
///
/// The nominal flow is `new → in_progress → awaiting_parts → ready`, but the
/// enumeration defines labels, not a transition graph: an authorized caller
/// may set any status from any other. The only derived behavior is
/// timestamp-setting on first entry into `in_progress` (`started_at`) and
/// `ready` (`completed_at`), regardless of the path taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    New,
    InProgress,
    AwaitingParts,
    Ready,
}

impl TicketStatus {
    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in_progress",
            Self::AwaitingParts => "awaiting_parts",
            Self::Ready => "ready",
        }
    }

    /// All statuses in nominal lifecycle order, for caller-side choice lists.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::New,
            Self::InProgress,
            Self::AwaitingParts,
            Self::Ready,
        ]
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "in_progress" => Ok(Self::InProgress),
            "awaiting_parts" => Ok(Self::AwaitingParts),
            "ready" => Ok(Self::Ready),
            other => Err(CoreError::Validation(format!(
                "unknown ticket status '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// UserRole
// ---------------------------------------------------------------------------

/// Role of a user account.
///
/// `master` users are the technicians eligible for ticket assignment.
/// `admin`, `operator`, and `manager` are the oversight roles notified on
/// status changes and help requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Operator,
    Master,
    Manager,
}

impl UserRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Operator => "operator",
            Self::Master => "master",
            Self::Manager => "manager",
        }
    }

    /// Whether this role receives status-change and help-request fan-out.
    #[must_use]
    pub const fn is_oversight(self) -> bool {
        matches!(self, Self::Admin | Self::Operator | Self::Manager)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "operator" => Ok(Self::Operator),
            "master" => Ok(Self::Master),
            "manager" => Ok(Self::Manager),
            other => Err(CoreError::Validation(format!("unknown role '{other}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// AssigneeRole
// ---------------------------------------------------------------------------

/// Role a technician holds on a ticket.
///
/// At most one `primary` row may exist per ticket at any time; the engine
/// demotes the previous primary to `assistant` on reassignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssigneeRole {
    Primary,
    Assistant,
}

impl AssigneeRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for AssigneeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssigneeRole {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primary" => Ok(Self::Primary),
            "assistant" => Ok(Self::Assistant),
            other => Err(CoreError::Validation(format!(
                "unknown assignee role '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

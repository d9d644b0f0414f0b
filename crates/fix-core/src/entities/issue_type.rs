use serde::{Deserialize, Serialize};

/// An issue type, identified by name and lazily created on first use.
///
/// The sentinel name `"unspecified"` maps to "no issue type" and is never
/// persisted as a row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IssueType {
    pub id: i64,
    pub name: String,
}

impl IssueType {
    /// The sentinel label meaning "no issue type selected".
    pub const UNSPECIFIED: &'static str = "unspecified";
}

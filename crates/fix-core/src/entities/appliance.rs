use serde::{Deserialize, Serialize};

/// An appliance, identified by the pair (kind, model). Immutable once created
/// and shared across tickets with the same pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Appliance {
    pub id: i64,
    pub kind: String,
    pub model: String,
}

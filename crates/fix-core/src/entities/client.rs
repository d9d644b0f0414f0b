use serde::{Deserialize, Serialize};

/// A client, identified by phone number (natural key).
///
/// The name is mutable: every ticket touching the same phone overwrites it
/// (last writer wins, no merge detection).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Client {
    pub id: i64,
    pub full_name: String,
    pub phone: String,
}

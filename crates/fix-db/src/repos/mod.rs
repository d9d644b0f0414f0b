//! Repository modules implementing the ticket store operations.
//!
//! Each module adds methods to `FixService` via `impl FixService` blocks.
//! Internal write helpers take `&libsql::Connection` so they run inside the
//! caller's transaction (a `libsql::Transaction` derefs to `Connection`).

pub mod assignee;
pub mod comment;
pub mod extension;
pub mod history;
pub mod notification;
pub mod part;
pub mod ticket;
pub mod upsert;
pub mod user;

//! Entity structs for all Fixline domain objects.
//!
//! Each entity maps to a table in the libSQL database. Structs returned from
//! read paths are projections joined with their related rows (usernames,
//! client and appliance fields) so callers never need a second lookup.

mod appliance;
mod assignee;
mod client;
mod comment;
mod extension;
mod history;
mod issue_type;
mod notification;
mod part;
mod ticket;
mod user;

pub use appliance::Appliance;
pub use assignee::Assignee;
pub use client::Client;
pub use comment::Comment;
pub use extension::DeadlineExtension;
pub use history::StatusHistoryItem;
pub use issue_type::IssueType;
pub use notification::Notification;
pub use part::Part;
pub use ticket::Ticket;
pub use user::User;

//! Append-only status history.

use chrono::{DateTime, Utc};

use fix_core::entities::StatusHistoryItem;
use fix_core::enums::TicketStatus;

use crate::error::StoreError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum};
use crate::repos::ticket::require_ticket_id;
use crate::service::FixService;

/// Append one transition record inside the caller's transaction.
///
/// `old_status` is `None` only for the creation entry.
pub(crate) async fn append_history(
    conn: &libsql::Connection,
    ticket_id: i64,
    old_status: Option<TicketStatus>,
    new_status: TicketStatus,
    changed_by: i64,
    at: DateTime<Utc>,
) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO status_history (ticket_id, old_status, new_status, changed_by, changed_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        libsql::params![
            ticket_id,
            old_status.map(|s| s.as_str()),
            new_status.as_str(),
            changed_by,
            at.to_rfc3339()
        ],
    )
    .await?;
    Ok(())
}

fn row_to_history(row: &libsql::Row) -> Result<StatusHistoryItem, StoreError> {
    let old_status = match get_opt_string(row, 2)? {
        Some(s) => Some(parse_enum(&s)?),
        None => None,
    };
    Ok(StatusHistoryItem {
        id: row.get(0)?,
        ticket_id: row.get(1)?,
        old_status,
        new_status: parse_enum(&row.get::<String>(3)?)?,
        changed_by: row.get(4)?,
        changed_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

impl FixService {
    /// List a ticket's status transitions, oldest first. The first entry
    /// always has no old status (creation).
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the request number is unknown.
    pub async fn list_history(
        &self,
        request_number: i64,
    ) -> Result<Vec<StatusHistoryItem>, StoreError> {
        let conn = self.db().conn();
        let ticket_id = require_ticket_id(conn, request_number).await?;

        let mut rows = conn
            .query(
                "SELECT h.id, h.ticket_id, h.old_status, h.new_status, u.username, h.changed_at
                 FROM status_history h
                 JOIN users u ON u.id = h.changed_by
                 WHERE h.ticket_id = ?1
                 ORDER BY h.id",
                [ticket_id],
            )
            .await?;
        let mut items = Vec::new();
        while let Some(row) = rows.next().await? {
            items.push(row_to_history(&row)?);
        }
        Ok(items)
    }
}

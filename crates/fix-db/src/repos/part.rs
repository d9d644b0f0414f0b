//! Spare parts recorded against tickets.

use chrono::Utc;

use fix_core::entities::Part;

use crate::error::StoreError;
use crate::helpers::parse_datetime;
use crate::repos::ticket::require_ticket_id;
use crate::service::FixService;

fn row_to_part(row: &libsql::Row) -> Result<Part, StoreError> {
    Ok(Part {
        id: row.get(0)?,
        ticket_id: row.get(1)?,
        part_name: row.get(2)?,
        quantity: row.get(3)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

impl FixService {
    /// Record a spare part against a ticket.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` on a blank name or non-positive quantity,
    /// `NotFound` when the request number is unknown.
    pub async fn add_part(
        &self,
        request_number: i64,
        part_name: &str,
        quantity: i64,
    ) -> Result<Part, StoreError> {
        let part_name = part_name.trim();
        if part_name.is_empty() {
            return Err(StoreError::InvalidArgument("part name is empty".into()));
        }
        if quantity < 1 {
            return Err(StoreError::InvalidArgument(format!(
                "part quantity must be positive, got {quantity}"
            )));
        }

        let conn = self.db().conn();
        let ticket_id = require_ticket_id(conn, request_number).await?;
        let now = Utc::now();
        conn.execute(
            "INSERT INTO ticket_parts (ticket_id, part_name, quantity, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            libsql::params![ticket_id, part_name, quantity, now.to_rfc3339()],
        )
        .await?;

        Ok(Part {
            id: conn.last_insert_rowid(),
            ticket_id,
            part_name: part_name.to_string(),
            quantity,
            created_at: now,
        })
    }

    /// Delete one part row, scoped to the ticket so a part id cannot be
    /// removed through another ticket. Unknown ids are a no-op.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the request number is unknown.
    pub async fn delete_part(&self, request_number: i64, part_id: i64) -> Result<(), StoreError> {
        let conn = self.db().conn();
        let ticket_id = require_ticket_id(conn, request_number).await?;
        conn.execute(
            "DELETE FROM ticket_parts WHERE id = ?1 AND ticket_id = ?2",
            libsql::params![part_id, ticket_id],
        )
        .await?;
        Ok(())
    }

    /// List a ticket's parts, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the request number is unknown.
    pub async fn list_parts(&self, request_number: i64) -> Result<Vec<Part>, StoreError> {
        let conn = self.db().conn();
        let ticket_id = require_ticket_id(conn, request_number).await?;

        let mut rows = conn
            .query(
                "SELECT id, ticket_id, part_name, quantity, created_at
                 FROM ticket_parts WHERE ticket_id = ?1 ORDER BY id",
                [ticket_id],
            )
            .await?;
        let mut parts = Vec::new();
        while let Some(row) = rows.next().await? {
            parts.push(row_to_part(&row)?);
        }
        Ok(parts)
    }
}

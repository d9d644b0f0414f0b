//! Assignment manager: one primary technician plus any number of assistants.
//!
//! The primary is mirrored in `tickets.technician_id` so the joined ticket
//! projection carries it without an extra query. The `ticket_assignees`
//! table holds one row per (ticket, user) whose role can flip.

use chrono::{DateTime, Utc};

use fix_core::entities::Assignee;
use fix_core::enums::AssigneeRole;

use crate::error::StoreError;
use crate::helpers::{parse_datetime, parse_enum};
use crate::repos::notification::notify_user;
use crate::repos::ticket::{require_ticket_id, require_ticket_row};
use crate::service::FixService;

/// Upsert the (ticket, user) row with the given role.
async fn upsert_role(
    conn: &libsql::Connection,
    ticket_id: i64,
    user_id: i64,
    role: AssigneeRole,
    assigned_by: i64,
    at: DateTime<Utc>,
) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO ticket_assignees (ticket_id, user_id, role, assigned_by, assigned_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT (ticket_id, user_id) DO UPDATE SET
             role = excluded.role,
             assigned_by = excluded.assigned_by,
             assigned_at = excluded.assigned_at",
        libsql::params![ticket_id, user_id, role.as_str(), assigned_by, at.to_rfc3339()],
    )
    .await?;
    Ok(())
}

/// Make `user_id` the ticket's primary technician inside the caller's
/// transaction: demote any other primary to assistant, upsert the new
/// primary's row, and mirror the id onto the ticket.
pub(crate) async fn set_primary(
    conn: &libsql::Connection,
    ticket_id: i64,
    user_id: i64,
    assigned_by: i64,
    at: DateTime<Utc>,
) -> Result<(), StoreError> {
    conn.execute(
        "UPDATE ticket_assignees SET role = 'assistant'
         WHERE ticket_id = ?1 AND role = 'primary' AND user_id != ?2",
        libsql::params![ticket_id, user_id],
    )
    .await?;
    upsert_role(conn, ticket_id, user_id, AssigneeRole::Primary, assigned_by, at).await?;
    conn.execute(
        "UPDATE tickets SET technician_id = ?1 WHERE id = ?2",
        libsql::params![user_id, ticket_id],
    )
    .await?;
    Ok(())
}

fn row_to_assignee(row: &libsql::Row) -> Result<Assignee, StoreError> {
    Ok(Assignee {
        id: row.get(0)?,
        ticket_id: row.get(1)?,
        user_id: row.get(2)?,
        username: row.get(3)?,
        full_name: row.get(4)?,
        role: parse_enum(&row.get::<String>(5)?)?,
        assigned_by: row.get(6)?,
        assigned_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

impl FixService {
    /// Assign an active technician to a ticket in the given role and notify
    /// them. Assigning a primary demotes the previous one to assistant;
    /// re-adding an existing assignee flips their role in place.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the request number or actor is unknown, or the
    /// username is not an active master.
    pub async fn add_assignee(
        &self,
        request_number: i64,
        username: &str,
        role: AssigneeRole,
        actor_username: &str,
    ) -> Result<Assignee, StoreError> {
        let actor = self.resolve_active_user(actor_username).await?;
        let technician = self.resolve_active_master(username).await?;

        let conn = self.db().conn();
        let tx = conn.transaction().await?;
        let current = require_ticket_row(&tx, request_number).await?;
        let now = Utc::now();

        match role {
            AssigneeRole::Primary => {
                set_primary(&tx, current.id, technician.id, actor.id, now).await?;
            }
            AssigneeRole::Assistant => {
                upsert_role(&tx, current.id, technician.id, role, actor.id, now).await?;
                // A demoted primary leaves the ticket without one.
                if current.technician_id == Some(technician.id) {
                    tx.execute(
                        "UPDATE tickets SET technician_id = NULL WHERE id = ?1",
                        [current.id],
                    )
                    .await?;
                }
            }
        }
        notify_user(
            &tx,
            technician.id,
            Some(current.id),
            &format!("You were assigned ticket #{request_number} as {role}"),
            now,
        )
        .await?;
        tx.execute(
            "UPDATE tickets SET updated_at = ?1 WHERE id = ?2",
            libsql::params![now.to_rfc3339(), current.id],
        )
        .await?;

        let mut rows = tx
            .query(
                "SELECT id FROM ticket_assignees WHERE ticket_id = ?1 AND user_id = ?2",
                libsql::params![current.id, technician.id],
            )
            .await?;
        let id = rows
            .next()
            .await?
            .ok_or_else(|| StoreError::Query("assignee upsert returned no row".into()))?
            .get(0)?;
        tx.commit().await?;

        tracing::info!(request_number, username, role = %role, "assignee added");
        Ok(Assignee {
            id,
            ticket_id: current.id,
            user_id: technician.id,
            username: technician.username,
            full_name: technician.full_name,
            role,
            assigned_by: actor.id,
            assigned_at: now,
        })
    }

    /// Remove a user from a ticket's assignment set. Removing the primary
    /// clears the ticket's technician. Unknown assignments are a no-op.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the request number or username is unknown.
    pub async fn remove_assignee(
        &self,
        request_number: i64,
        username: &str,
    ) -> Result<(), StoreError> {
        let user = self
            .get_user(username)
            .await?
            .ok_or_else(|| StoreError::not_found("user", username))?;

        let conn = self.db().conn();
        let tx = conn.transaction().await?;
        let current = require_ticket_row(&tx, request_number).await?;

        tx.execute(
            "DELETE FROM ticket_assignees WHERE ticket_id = ?1 AND user_id = ?2",
            libsql::params![current.id, user.id],
        )
        .await?;
        if current.technician_id == Some(user.id) {
            tx.execute(
                "UPDATE tickets SET technician_id = NULL WHERE id = ?1",
                [current.id],
            )
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// List a ticket's assignees, primary first, then assistants in
    /// assignment order. Deactivated users remain visible.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the request number is unknown.
    pub async fn list_assignees(&self, request_number: i64) -> Result<Vec<Assignee>, StoreError> {
        let conn = self.db().conn();
        let ticket_id = require_ticket_id(conn, request_number).await?;

        let mut rows = conn
            .query(
                "SELECT ta.id, ta.ticket_id, ta.user_id, u.username, u.full_name,
                        ta.role, ta.assigned_by, ta.assigned_at
                 FROM ticket_assignees ta
                 JOIN users u ON u.id = ta.user_id
                 WHERE ta.ticket_id = ?1
                 ORDER BY CASE ta.role WHEN 'primary' THEN 0 ELSE 1 END, ta.id",
                [ticket_id],
            )
            .await?;
        let mut assignees = Vec::new();
        while let Some(row) = rows.next().await? {
            assignees.push(row_to_assignee(&row)?);
        }
        Ok(assignees)
    }
}

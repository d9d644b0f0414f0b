//! Deadline extension ledger.
//!
//! Every due-date change appends one row recording the old and new values,
//! whether the client confirmed the move, and who made it. The ticket's
//! `due_at` is just the latest entry's `new_due_at`.

use chrono::{DateTime, Utc};

use fix_core::entities::DeadlineExtension;

use crate::error::StoreError;
use crate::helpers::{get_bool, get_opt_string, parse_datetime, parse_optional_datetime};
use crate::repos::notification::notify_assignees;
use crate::repos::ticket::{require_ticket_id, require_ticket_row};
use crate::service::FixService;

fn row_to_extension(row: &libsql::Row) -> Result<DeadlineExtension, StoreError> {
    Ok(DeadlineExtension {
        id: row.get(0)?,
        ticket_id: row.get(1)?,
        old_due_at: parse_optional_datetime(get_opt_string(row, 2)?.as_deref())?,
        new_due_at: parse_datetime(&row.get::<String>(3)?)?,
        client_confirmed: get_bool(row, 4)?,
        note: row.get(5)?,
        extended_by: row.get(6)?,
        extended_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

impl FixService {
    /// Move a ticket's due date and append the ledger entry.
    ///
    /// The new date may be earlier than the current one; the ledger records
    /// the move either way. In one transaction: updates the ticket, writes
    /// the entry, and notifies every current assignee.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the request number or actor is unknown.
    pub async fn extend_deadline(
        &self,
        request_number: i64,
        new_due_at: DateTime<Utc>,
        client_confirmed: bool,
        note: &str,
        actor_username: &str,
    ) -> Result<DeadlineExtension, StoreError> {
        let actor = self.resolve_active_user(actor_username).await?;

        let conn = self.db().conn();
        let tx = conn.transaction().await?;
        let current = require_ticket_row(&tx, request_number).await?;
        let now = Utc::now();
        let note = note.trim();

        tx.execute(
            "UPDATE tickets SET due_at = ?1, updated_at = ?2 WHERE id = ?3",
            libsql::params![new_due_at.to_rfc3339(), now.to_rfc3339(), current.id],
        )
        .await?;
        tx.execute(
            "INSERT INTO deadline_extensions
                 (ticket_id, old_due_at, new_due_at, client_confirmed, note, extended_by, extended_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            libsql::params![
                current.id,
                current.due_at.map(|dt| dt.to_rfc3339()),
                new_due_at.to_rfc3339(),
                i64::from(client_confirmed),
                note,
                actor.id,
                now.to_rfc3339()
            ],
        )
        .await?;
        let id = tx.last_insert_rowid();

        let message = format!(
            "Ticket #{request_number} due date moved to {}",
            new_due_at.to_rfc3339()
        );
        notify_assignees(&tx, current.id, &message, None, now).await?;
        tx.commit().await?;

        tracing::info!(request_number, actor = %actor.username, "deadline moved");
        Ok(DeadlineExtension {
            id,
            ticket_id: current.id,
            old_due_at: current.due_at,
            new_due_at,
            client_confirmed,
            note: note.to_string(),
            extended_by: actor.username,
            extended_at: now,
        })
    }

    /// List a ticket's deadline moves, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the request number is unknown.
    pub async fn list_deadline_extensions(
        &self,
        request_number: i64,
    ) -> Result<Vec<DeadlineExtension>, StoreError> {
        let conn = self.db().conn();
        let ticket_id = require_ticket_id(conn, request_number).await?;

        let mut rows = conn
            .query(
                "SELECT de.id, de.ticket_id, de.old_due_at, de.new_due_at,
                        de.client_confirmed, de.note, u.username, de.extended_at
                 FROM deadline_extensions de
                 JOIN users u ON u.id = de.extended_by
                 WHERE de.ticket_id = ?1
                 ORDER BY de.id",
                [ticket_id],
            )
            .await?;
        let mut extensions = Vec::new();
        while let Some(row) = rows.next().await? {
            extensions.push(row_to_extension(&row)?);
        }
        Ok(extensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{fridge_ticket, seed_users, test_service};
    use chrono::Duration;

    #[tokio::test]
    async fn ledger_chains_old_and_new_dates() {
        let svc = test_service().await;
        seed_users(&svc).await;
        let ticket = svc.create_ticket(fridge_ticket(), "operator").await.unwrap();
        let original_due = ticket.due_at.unwrap();

        let first_move = original_due + Duration::days(2);
        svc.extend_deadline(ticket.request_number, first_move, true, "parts delayed", "operator")
            .await
            .unwrap();
        let second_move = first_move + Duration::days(5);
        svc.extend_deadline(ticket.request_number, second_move, false, "", "operator")
            .await
            .unwrap();

        let ledger = svc
            .list_deadline_extensions(ticket.request_number)
            .await
            .unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[0].old_due_at, Some(original_due));
        assert_eq!(ledger[0].new_due_at, first_move);
        assert!(ledger[0].client_confirmed);
        assert_eq!(ledger[0].note, "parts delayed");
        assert_eq!(ledger[0].extended_by, "operator");
        assert_eq!(ledger[1].old_due_at, Some(first_move));
        assert_eq!(ledger[1].new_due_at, second_move);
        assert!(!ledger[1].client_confirmed);

        let refreshed = svc.get_ticket(ticket.request_number).await.unwrap().unwrap();
        assert_eq!(refreshed.due_at, Some(second_move));
    }

    #[tokio::test]
    async fn deadline_may_move_earlier() {
        let svc = test_service().await;
        seed_users(&svc).await;
        let ticket = svc.create_ticket(fridge_ticket(), "operator").await.unwrap();
        let earlier = ticket.due_at.unwrap() - Duration::days(1);

        let entry = svc
            .extend_deadline(ticket.request_number, earlier, true, "client asked", "operator")
            .await
            .unwrap();
        assert_eq!(entry.new_due_at, earlier);

        let refreshed = svc.get_ticket(ticket.request_number).await.unwrap().unwrap();
        assert_eq!(refreshed.due_at, Some(earlier));
    }

    #[tokio::test]
    async fn move_notifies_every_current_assignee() {
        let svc = test_service().await;
        seed_users(&svc).await;
        svc.create_user("master2", fix_core::enums::UserRole::Master, "Second")
            .await
            .unwrap();
        let mut input = fridge_ticket();
        input.technician_username = Some("master".into());
        let ticket = svc.create_ticket(input, "operator").await.unwrap();
        svc.add_assignee(
            ticket.request_number,
            "master2",
            fix_core::enums::AssigneeRole::Assistant,
            "operator",
        )
        .await
        .unwrap();

        let new_due = ticket.due_at.unwrap() + Duration::days(3);
        svc.extend_deadline(ticket.request_number, new_due, true, "", "operator")
            .await
            .unwrap();

        for username in ["master", "master2"] {
            let inbox = svc.list_notifications(username).await.unwrap();
            assert_eq!(
                inbox
                    .iter()
                    .filter(|n| n.message.contains("due date moved"))
                    .count(),
                1,
                "{username} should be notified exactly once"
            );
        }
        // Oversight users are not part of this fan-out.
        let admin_inbox = svc.list_notifications("admin").await.unwrap();
        assert!(admin_inbox.iter().all(|n| !n.message.contains("due date moved")));
    }
}

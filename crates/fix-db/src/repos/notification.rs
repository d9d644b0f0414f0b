//! Notification fan-out and the read-side inbox.
//!
//! Notifications are created only as side effects of lifecycle events, always
//! inside the same transaction as the event itself. There is no deduplication:
//! repeating an event repeats its notifications.

use chrono::{DateTime, Utc};

use fix_core::entities::Notification;

use crate::error::StoreError;
use crate::helpers::{get_bool, parse_datetime};
use crate::repos::ticket::require_ticket_id;
use crate::service::FixService;

/// Insert one notification row inside the caller's transaction.
pub(crate) async fn notify_user(
    conn: &libsql::Connection,
    user_id: i64,
    ticket_id: Option<i64>,
    message: &str,
    at: DateTime<Utc>,
) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO notifications (user_id, ticket_id, message, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        libsql::params![user_id, ticket_id, message, at.to_rfc3339()],
    )
    .await?;
    Ok(())
}

/// Fan a message out to every active oversight user (admin, operator,
/// manager), optionally skipping the acting user.
pub(crate) async fn notify_oversight(
    conn: &libsql::Connection,
    ticket_id: i64,
    message: &str,
    exclude_user: Option<i64>,
    at: DateTime<Utc>,
) -> Result<(), StoreError> {
    match exclude_user {
        Some(actor) => {
            conn.execute(
                "INSERT INTO notifications (user_id, ticket_id, message, created_at)
                 SELECT id, ?1, ?2, ?3 FROM users
                 WHERE is_active = 1 AND role IN ('admin', 'operator', 'manager') AND id != ?4",
                libsql::params![ticket_id, message, at.to_rfc3339(), actor],
            )
            .await?;
        }
        None => {
            conn.execute(
                "INSERT INTO notifications (user_id, ticket_id, message, created_at)
                 SELECT id, ?1, ?2, ?3 FROM users
                 WHERE is_active = 1 AND role IN ('admin', 'operator', 'manager')",
                libsql::params![ticket_id, message, at.to_rfc3339()],
            )
            .await?;
        }
    }
    Ok(())
}

/// Fan a message out to everyone assigned to the ticket, optionally skipping
/// the acting user.
pub(crate) async fn notify_assignees(
    conn: &libsql::Connection,
    ticket_id: i64,
    message: &str,
    exclude_user: Option<i64>,
    at: DateTime<Utc>,
) -> Result<(), StoreError> {
    match exclude_user {
        Some(actor) => {
            conn.execute(
                "INSERT INTO notifications (user_id, ticket_id, message, created_at)
                 SELECT user_id, ?1, ?2, ?3 FROM ticket_assignees
                 WHERE ticket_id = ?1 AND user_id != ?4",
                libsql::params![ticket_id, message, at.to_rfc3339(), actor],
            )
            .await?;
        }
        None => {
            conn.execute(
                "INSERT INTO notifications (user_id, ticket_id, message, created_at)
                 SELECT user_id, ?1, ?2, ?3 FROM ticket_assignees
                 WHERE ticket_id = ?1",
                libsql::params![ticket_id, message, at.to_rfc3339()],
            )
            .await?;
        }
    }
    Ok(())
}

fn row_to_notification(row: &libsql::Row) -> Result<Notification, StoreError> {
    Ok(Notification {
        id: row.get(0)?,
        user_id: row.get(1)?,
        request_number: row.get(2)?,
        message: row.get(3)?,
        is_read: get_bool(row, 4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

impl FixService {
    /// List a user's notifications, newest first. The ticket reference is
    /// surfaced as the public request number.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the username is unknown.
    pub async fn list_notifications(
        &self,
        username: &str,
    ) -> Result<Vec<Notification>, StoreError> {
        let user = self
            .get_user(username)
            .await?
            .ok_or_else(|| StoreError::not_found("user", username))?;

        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT n.id, n.user_id, t.request_number, n.message, n.is_read, n.created_at
                 FROM notifications n
                 LEFT JOIN tickets t ON t.id = n.ticket_id
                 WHERE n.user_id = ?1
                 ORDER BY n.id DESC",
                [user.id],
            )
            .await?;
        let mut items = Vec::new();
        while let Some(row) = rows.next().await? {
            items.push(row_to_notification(&row)?);
        }
        Ok(items)
    }

    /// Count a user's unread notifications (badge counter).
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the username is unknown.
    pub async fn unread_notifications_count(&self, username: &str) -> Result<i64, StoreError> {
        let user = self
            .get_user(username)
            .await?
            .ok_or_else(|| StoreError::not_found("user", username))?;

        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT COUNT(*) FROM notifications WHERE user_id = ?1 AND is_read = 0",
                [user.id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(row.get(0)?),
            None => Ok(0),
        }
    }

    /// Mark one of a user's notifications as read. Scoped to the recipient
    /// so an id cannot be acknowledged through someone else's inbox.
    /// Idempotent: already-read and unknown ids are both quiet no-ops.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the username is unknown.
    pub async fn mark_notification_read(
        &self,
        username: &str,
        notification_id: i64,
    ) -> Result<(), StoreError> {
        let user = self
            .get_user(username)
            .await?
            .ok_or_else(|| StoreError::not_found("user", username))?;
        self.db()
            .conn()
            .execute(
                "UPDATE notifications SET is_read = 1 WHERE id = ?1 AND user_id = ?2",
                libsql::params![notification_id, user.id],
            )
            .await?;
        Ok(())
    }

    /// Broadcast a help request from a ticket to all active oversight users.
    /// The note rides along in the message; nothing else is persisted.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the request number or actor is unknown.
    pub async fn request_help(
        &self,
        request_number: i64,
        actor_username: &str,
        note: &str,
    ) -> Result<(), StoreError> {
        let actor = self.resolve_active_user(actor_username).await?;
        let conn = self.db().conn();
        let ticket_id = require_ticket_id(conn, request_number).await?;

        let note = note.trim();
        let message = if note.is_empty() {
            format!("{} requested help on ticket #{request_number}", actor.username)
        } else {
            format!(
                "{} requested help on ticket #{request_number}: {note}",
                actor.username
            )
        };
        notify_oversight(conn, ticket_id, &message, None, Utc::now()).await?;

        tracing::info!(request_number, actor = %actor.username, "help requested");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{fridge_ticket, seed_users, test_service};

    #[tokio::test]
    async fn help_request_reaches_all_oversight_users() {
        let svc = test_service().await;
        seed_users(&svc).await;
        let ticket = svc.create_ticket(fridge_ticket(), "operator").await.unwrap();

        svc.request_help(ticket.request_number, "master", "need a second opinion")
            .await
            .unwrap();

        for username in ["admin", "operator", "manager"] {
            let inbox = svc.list_notifications(username).await.unwrap();
            let help: Vec<_> = inbox
                .iter()
                .filter(|n| n.message.contains("requested help"))
                .collect();
            assert_eq!(help.len(), 1, "{username} should see the help request");
            assert!(help[0].message.contains("master"));
            assert!(help[0].message.contains("need a second opinion"));
            assert_eq!(help[0].request_number, Some(ticket.request_number));
        }

        // Technicians are not in the oversight audience.
        let master_inbox = svc.list_notifications("master").await.unwrap();
        assert!(master_inbox.iter().all(|n| !n.message.contains("requested help")));
    }

    #[tokio::test]
    async fn repeated_events_repeat_notifications() {
        let svc = test_service().await;
        seed_users(&svc).await;
        let ticket = svc.create_ticket(fridge_ticket(), "operator").await.unwrap();

        svc.request_help(ticket.request_number, "master", "stuck")
            .await
            .unwrap();
        svc.request_help(ticket.request_number, "master", "stuck")
            .await
            .unwrap();

        let inbox = svc.list_notifications("admin").await.unwrap();
        let help_count = inbox
            .iter()
            .filter(|n| n.message.contains("requested help"))
            .count();
        assert_eq!(help_count, 2);
    }

    #[tokio::test]
    async fn mark_read_is_idempotent() {
        let svc = test_service().await;
        seed_users(&svc).await;
        let ticket = svc.create_ticket(fridge_ticket(), "operator").await.unwrap();
        svc.request_help(ticket.request_number, "master", "")
            .await
            .unwrap();

        let before = svc.unread_notifications_count("admin").await.unwrap();
        assert_eq!(before, 1);

        let id = svc.list_notifications("admin").await.unwrap()[0].id;
        svc.mark_notification_read("admin", id).await.unwrap();
        svc.mark_notification_read("admin", id).await.unwrap();
        svc.mark_notification_read("admin", 99_999).await.unwrap();

        assert_eq!(svc.unread_notifications_count("admin").await.unwrap(), 0);
        // Other inboxes are untouched.
        assert_eq!(svc.unread_notifications_count("manager").await.unwrap(), 1);

        // A recipient cannot acknowledge through someone else's inbox.
        let manager_id = svc.list_notifications("manager").await.unwrap()[0].id;
        svc.mark_notification_read("admin", manager_id).await.unwrap();
        assert_eq!(svc.unread_notifications_count("manager").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn inbox_is_newest_first() {
        let svc = test_service().await;
        let seeded = seed_users(&svc).await;
        let ticket = svc.create_ticket(fridge_ticket(), "operator").await.unwrap();

        svc.request_help(ticket.request_number, "master", "first")
            .await
            .unwrap();
        svc.request_help(ticket.request_number, "master", "second")
            .await
            .unwrap();

        let inbox = svc.list_notifications("admin").await.unwrap();
        assert!(inbox[0].message.contains("second"));
        assert!(inbox[1].message.contains("first"));
        assert!(inbox.iter().all(|n| n.user_id == seeded.admin));
    }

    #[tokio::test]
    async fn unknown_user_inbox_is_not_found() {
        let svc = test_service().await;
        let result = svc.list_notifications("ghost").await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }
}

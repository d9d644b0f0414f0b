//! # fix-db
//!
//! Transactional libSQL ticket store for Fixline.
//!
//! Owns all relational state for appliance-repair tickets: the ticket rows
//! themselves plus assignees, status history, notifications, deadline
//! extensions, comments, and parts. Every lifecycle operation derives its
//! side effects from the requested state change and writes all affected
//! tables inside a single transaction — there is no external orchestrator
//! and no partial commit.
//!
//! Uses the `libsql` crate (C `SQLite` fork) — native transactions, stable
//! API, and an in-memory mode that keeps the test suite hermetic.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;
pub mod updates;

#[cfg(test)]
mod test_support;

use error::StoreError;
use libsql::Builder;

/// Central database handle for all Fixline state operations.
///
/// Wraps a libSQL database and connection. Opening runs migrations and
/// enables foreign-key enforcement, which the cascade deletes rely on.
pub struct FixDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl FixDb {
    /// Open a local database at the given path, or `":memory:"` for tests.
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the database cannot be opened or migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, StoreError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Foreign keys must be enabled per-connection in SQLite.
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| StoreError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let fix_db = Self { db, conn };
        fix_db.run_migrations().await?;
        Ok(fix_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> FixDb {
        FixDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        let tables = [
            "users",
            "clients",
            "appliances",
            "issue_types",
            "tickets",
            "ticket_assignees",
            "ticket_comments",
            "ticket_parts",
            "status_history",
            "notifications",
            "deadline_extensions",
        ];
        for table in &tables {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [*table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        // Run migrations again — should not fail
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn part_quantity_check_constraint() {
        let db = test_db().await;
        db.conn()
            .execute(
                "INSERT INTO users (username, role, created_at) VALUES ('m', 'master', '2026-01-01T00:00:00+00:00')",
                (),
            )
            .await
            .unwrap();
        db.conn()
            .execute("INSERT INTO clients (full_name, phone) VALUES ('C', '89991234567')", ())
            .await
            .unwrap();
        db.conn()
            .execute("INSERT INTO appliances (kind, model) VALUES ('Fridge', 'LG')", ())
            .await
            .unwrap();
        db.conn()
            .execute(
                "INSERT INTO tickets (request_number, client_id, appliance_id, problem_description, status, created_at, updated_at)
                 VALUES (1, 1, 1, 'broken', 'new', '2026-01-01T00:00:00+00:00', '2026-01-01T00:00:00+00:00')",
                (),
            )
            .await
            .unwrap();

        let result = db
            .conn()
            .execute(
                "INSERT INTO ticket_parts (ticket_id, part_name, quantity, created_at)
                 VALUES (1, 'compressor', 0, '2026-01-01T00:00:00+00:00')",
                (),
            )
            .await;
        assert!(result.is_err(), "zero quantity should violate CHECK");
    }

    #[tokio::test]
    async fn assignee_unique_per_ticket_and_user() {
        let db = test_db().await;
        db.conn()
            .execute(
                "INSERT INTO users (username, role, created_at) VALUES ('m', 'master', '2026-01-01T00:00:00+00:00')",
                (),
            )
            .await
            .unwrap();
        db.conn()
            .execute("INSERT INTO clients (full_name, phone) VALUES ('C', '89991234567')", ())
            .await
            .unwrap();
        db.conn()
            .execute("INSERT INTO appliances (kind, model) VALUES ('Fridge', 'LG')", ())
            .await
            .unwrap();
        db.conn()
            .execute(
                "INSERT INTO tickets (request_number, client_id, appliance_id, problem_description, status, created_at, updated_at)
                 VALUES (1, 1, 1, 'broken', 'new', '2026-01-01T00:00:00+00:00', '2026-01-01T00:00:00+00:00')",
                (),
            )
            .await
            .unwrap();

        db.conn()
            .execute(
                "INSERT INTO ticket_assignees (ticket_id, user_id, role, assigned_by, assigned_at)
                 VALUES (1, 1, 'primary', 1, '2026-01-01T00:00:00+00:00')",
                (),
            )
            .await
            .unwrap();
        let duplicate = db
            .conn()
            .execute(
                "INSERT INTO ticket_assignees (ticket_id, user_id, role, assigned_by, assigned_at)
                 VALUES (1, 1, 'assistant', 1, '2026-01-01T00:00:00+00:00')",
                (),
            )
            .await;
        assert!(duplicate.is_err(), "duplicate (ticket, user) row should be rejected");
    }
}

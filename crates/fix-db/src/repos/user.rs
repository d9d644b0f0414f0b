//! User repository — the identity resolver.
//!
//! Separates "resolve for write" (active users only, technician role where
//! assignment requires it) from "read association" (any user, joined by id),
//! so history keeps displaying users after deactivation.

use chrono::Utc;

use fix_core::entities::User;
use fix_core::enums::UserRole;

use crate::error::StoreError;
use crate::helpers::{get_bool, parse_datetime, parse_enum};
use crate::service::FixService;

const SELECT_COLS: &str = "id, username, role, full_name, is_active, created_at";

fn row_to_user(row: &libsql::Row) -> Result<User, StoreError> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        role: parse_enum(&row.get::<String>(2)?)?,
        full_name: row.get(3)?,
        is_active: get_bool(row, 4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

/// Look up an active technician by username inside the caller's transaction.
///
/// Returns `None` when the username is unknown, inactive, or not a master —
/// callers decide whether that is a `NotFound` or a no-op.
pub(crate) async fn lookup_active_master(
    conn: &libsql::Connection,
    username: &str,
) -> Result<Option<User>, StoreError> {
    let mut rows = conn
        .query(
            &format!(
                "SELECT {SELECT_COLS} FROM users
                 WHERE username = ?1 AND is_active = 1 AND role = 'master'"
            ),
            [username],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_user(&row)?)),
        None => Ok(None),
    }
}

impl FixService {
    /// Create a user account. Usernames are unique; new accounts are active.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` on an empty username, `StoreError` if the
    /// INSERT fails (including a duplicate username).
    pub async fn create_user(
        &self,
        username: &str,
        role: UserRole,
        full_name: &str,
    ) -> Result<User, StoreError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(StoreError::InvalidArgument("username is empty".into()));
        }

        let now = Utc::now();
        self.db()
            .conn()
            .execute(
                "INSERT INTO users (username, role, full_name, is_active, created_at)
                 VALUES (?1, ?2, ?3, 1, ?4)",
                libsql::params![username, role.as_str(), full_name, now.to_rfc3339()],
            )
            .await?;
        let id = self.db().conn().last_insert_rowid();

        tracing::debug!(username, role = role.as_str(), "user created");
        Ok(User {
            id,
            username: username.to_string(),
            role,
            full_name: full_name.to_string(),
            is_active: true,
            created_at: now,
        })
    }

    /// Get a user by username regardless of active flag (read association).
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails.
    pub async fn get_user(&self, username: &str) -> Result<Option<User>, StoreError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM users WHERE username = ?1"),
                [username],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    /// Resolve a username to an active user, for new work attribution.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the user is unknown or inactive.
    pub async fn resolve_active_user(&self, username: &str) -> Result<User, StoreError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM users WHERE username = ?1 AND is_active = 1"),
                [username],
            )
            .await?;
        match rows.next().await? {
            Some(row) => row_to_user(&row),
            None => Err(StoreError::not_found("user", username)),
        }
    }

    /// Resolve a username to an active technician, for assignment writes.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the user is unknown, inactive, or not a master.
    pub async fn resolve_active_master(&self, username: &str) -> Result<User, StoreError> {
        lookup_active_master(self.db().conn(), username)
            .await?
            .ok_or_else(|| StoreError::not_found("master", username))
    }

    /// List active technicians, for caller-side assignment choices.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails.
    pub async fn list_masters(&self) -> Result<Vec<User>, StoreError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM users
                     WHERE is_active = 1 AND role = 'master' ORDER BY username"
                ),
                (),
            )
            .await?;
        let mut users = Vec::new();
        while let Some(row) = rows.next().await? {
            users.push(row_to_user(&row)?);
        }
        Ok(users)
    }

    /// List active oversight users (admin, operator, manager) — the
    /// status-change and help-request fan-out audience.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails.
    pub async fn list_oversight_users(&self) -> Result<Vec<User>, StoreError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM users
                     WHERE is_active = 1 AND role IN ('admin', 'operator', 'manager')
                     ORDER BY username"
                ),
                (),
            )
            .await?;
        let mut users = Vec::new();
        while let Some(row) = rows.next().await? {
            users.push(row_to_user(&row)?);
        }
        Ok(users)
    }

    /// Activate or deactivate an account. Deactivation blocks new assignment
    /// but leaves every historical association readable.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the username is unknown.
    pub async fn set_user_active(&self, username: &str, active: bool) -> Result<(), StoreError> {
        let affected = self
            .db()
            .conn()
            .execute(
                "UPDATE users SET is_active = ?1 WHERE username = ?2",
                libsql::params![i64::from(active), username],
            )
            .await?;
        if affected == 0 {
            return Err(StoreError::not_found("user", username));
        }
        tracing::debug!(username, active, "user active flag changed");
        Ok(())
    }
}

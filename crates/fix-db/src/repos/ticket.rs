//! Ticket lifecycle: create, partial update, delete, lookups, search.
//!
//! Every mutation runs in one transaction that also writes the derived side
//! effects (history, notifications, assignee rows). Reads return the joined
//! projection so callers never chase foreign keys.

use chrono::{Duration, Utc};

use fix_core::entities::Ticket;
use fix_core::enums::TicketStatus;

use crate::error::StoreError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_optional_datetime};
use crate::repos::assignee::set_primary;
use crate::repos::history::append_history;
use crate::repos::notification::{notify_oversight, notify_user};
use crate::repos::upsert::{resolve_issue_type, upsert_appliance, upsert_client};
use crate::repos::user::lookup_active_master;
use crate::service::FixService;
use crate::updates::ticket::{NewTicket, TicketUpdate};

const TICKET_SELECT: &str = "SELECT t.id, t.request_number, t.status, t.created_at, t.updated_at, \
     t.due_at, t.started_at, t.completed_at, a.kind, a.model, it.name, \
     t.problem_description, c.full_name, c.phone, u.username \
     FROM tickets t \
     JOIN clients c ON c.id = t.client_id \
     JOIN appliances a ON a.id = t.appliance_id \
     LEFT JOIN issue_types it ON it.id = t.issue_type_id \
     LEFT JOIN users u ON u.id = t.technician_id";

fn row_to_ticket(row: &libsql::Row) -> Result<Ticket, StoreError> {
    Ok(Ticket {
        id: row.get(0)?,
        request_number: row.get(1)?,
        status: parse_enum(&row.get::<String>(2)?)?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
        updated_at: parse_datetime(&row.get::<String>(4)?)?,
        due_at: parse_optional_datetime(get_opt_string(row, 5)?.as_deref())?,
        started_at: parse_optional_datetime(get_opt_string(row, 6)?.as_deref())?,
        completed_at: parse_optional_datetime(get_opt_string(row, 7)?.as_deref())?,
        appliance_type: row.get(8)?,
        appliance_model: row.get(9)?,
        issue_type: get_opt_string(row, 10)?,
        problem_description: row.get(11)?,
        client_name: row.get(12)?,
        client_phone: row.get(13)?,
        technician: get_opt_string(row, 14)?,
    })
}

/// Current write-relevant state of a ticket row, read at the start of a
/// mutation so partial updates can fill in the unchanged half of a pair.
pub(crate) struct TicketRow {
    pub id: i64,
    pub status: TicketStatus,
    pub client_id: i64,
    pub technician_id: Option<i64>,
    pub client_name: String,
    pub appliance_type: String,
    pub appliance_model: String,
    pub due_at: Option<chrono::DateTime<Utc>>,
    pub started_at: Option<chrono::DateTime<Utc>>,
    pub completed_at: Option<chrono::DateTime<Utc>>,
}

/// Map a public request number to the internal row id.
pub(crate) async fn require_ticket_id(
    conn: &libsql::Connection,
    request_number: i64,
) -> Result<i64, StoreError> {
    let mut rows = conn
        .query(
            "SELECT id FROM tickets WHERE request_number = ?1",
            [request_number],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(row.get(0)?),
        None => Err(StoreError::not_found("ticket", request_number.to_string())),
    }
}

pub(crate) async fn require_ticket_row(
    conn: &libsql::Connection,
    request_number: i64,
) -> Result<TicketRow, StoreError> {
    let mut rows = conn
        .query(
            "SELECT t.id, t.status, t.client_id, t.technician_id, c.full_name,
                    a.kind, a.model, t.due_at, t.started_at, t.completed_at
             FROM tickets t
             JOIN clients c ON c.id = t.client_id
             JOIN appliances a ON a.id = t.appliance_id
             WHERE t.request_number = ?1",
            [request_number],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| StoreError::not_found("ticket", request_number.to_string()))?;
    Ok(TicketRow {
        id: row.get(0)?,
        status: parse_enum(&row.get::<String>(1)?)?,
        client_id: row.get(2)?,
        technician_id: row.get(3)?,
        client_name: row.get(4)?,
        appliance_type: row.get(5)?,
        appliance_model: row.get(6)?,
        due_at: parse_optional_datetime(get_opt_string(&row, 7)?.as_deref())?,
        started_at: parse_optional_datetime(get_opt_string(&row, 8)?.as_deref())?,
        completed_at: parse_optional_datetime(get_opt_string(&row, 9)?.as_deref())?,
    })
}

/// Allocate the next public request number inside the caller's transaction.
///
/// MAX + 1 over all rows; numbers are never reused while their row exists,
/// but a deleted maximum frees its number.
pub(crate) async fn next_request_number(conn: &libsql::Connection) -> Result<i64, StoreError> {
    let mut rows = conn
        .query("SELECT COALESCE(MAX(request_number), 0) + 1 FROM tickets", ())
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| StoreError::Query("request number allocation returned no row".into()))?;
    Ok(row.get(0)?)
}

/// Fetch the joined projection by internal row id.
pub(crate) async fn fetch_ticket(
    conn: &libsql::Connection,
    ticket_id: i64,
) -> Result<Ticket, StoreError> {
    let mut rows = conn
        .query(&format!("{TICKET_SELECT} WHERE t.id = ?1"), [ticket_id])
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| StoreError::not_found("ticket", ticket_id.to_string()))?;
    row_to_ticket(&row)
}

impl FixService {
    /// Create a ticket, upserting its client, appliance, and issue type, and
    /// optionally assigning a primary technician.
    ///
    /// In one transaction: allocates the next request number, inserts the
    /// ticket with status `new` and a due date `due_in_days` out, writes the
    /// creation history entry, and notifies the technician if one resolved.
    /// An absent or unresolvable technician leaves the ticket unassigned.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the actor is unknown or inactive,
    /// `InvalidArgument` on blank client or appliance fields.
    pub async fn create_ticket(
        &self,
        input: NewTicket,
        actor_username: &str,
    ) -> Result<Ticket, StoreError> {
        let description = input.problem_description.trim().to_string();
        if description.is_empty() {
            return Err(StoreError::InvalidArgument(
                "problem description is empty".into(),
            ));
        }
        let actor = self.resolve_active_user(actor_username).await?;

        let conn = self.db().conn();
        let tx = conn.transaction().await?;

        let client = upsert_client(&tx, &input.client_name, &input.client_phone).await?;
        let appliance =
            upsert_appliance(&tx, &input.appliance_type, &input.appliance_model).await?;
        let issue_type_id = resolve_issue_type(&tx, input.issue_type.as_deref()).await?;

        let technician = match input.technician_username.as_deref().map(str::trim) {
            Some(username) if !username.is_empty() => {
                let found = lookup_active_master(&tx, username).await?;
                if found.is_none() {
                    tracing::warn!(username, "technician did not resolve, leaving unassigned");
                }
                found
            }
            _ => None,
        };

        let request_number = next_request_number(&tx).await?;
        let now = Utc::now();
        let due_at = now + Duration::days(self.due_in_days());

        tx.execute(
            "INSERT INTO tickets (request_number, client_id, appliance_id, issue_type_id,
                 problem_description, status, technician_id, created_at, updated_at, due_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8, ?9)",
            libsql::params![
                request_number,
                client.id,
                appliance.id,
                issue_type_id,
                description.as_str(),
                TicketStatus::New.as_str(),
                technician.as_ref().map(|t| t.id),
                now.to_rfc3339(),
                due_at.to_rfc3339()
            ],
        )
        .await?;
        let ticket_id = tx.last_insert_rowid();

        if let Some(tech) = &technician {
            set_primary(&tx, ticket_id, tech.id, actor.id, now).await?;
            notify_user(
                &tx,
                tech.id,
                Some(ticket_id),
                &format!("You were assigned ticket #{request_number} as primary"),
                now,
            )
            .await?;
        }

        append_history(&tx, ticket_id, None, TicketStatus::New, actor.id, now).await?;
        tx.commit().await?;

        tracing::info!(request_number, actor = %actor.username, "ticket created");
        fetch_ticket(conn, ticket_id).await
    }

    /// Apply a partial update to a ticket, deriving all side effects.
    ///
    /// In one transaction: re-keys or renames the client, repoints the
    /// appliance pair, swaps the issue type, reassigns the primary
    /// technician, and applies a status change with its first-entry
    /// timestamps, history entry, and fan-out. `updated_at` is always
    /// refreshed.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the request number or actor is unknown.
    pub async fn update_ticket(
        &self,
        request_number: i64,
        update: TicketUpdate,
        actor_username: &str,
    ) -> Result<Ticket, StoreError> {
        let actor = self.resolve_active_user(actor_username).await?;

        let conn = self.db().conn();
        let tx = conn.transaction().await?;
        let current = require_ticket_row(&tx, request_number).await?;
        let now = Utc::now();

        let mut sets: Vec<String> = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();
        fn push(
            sets: &mut Vec<String>,
            params: &mut Vec<libsql::Value>,
            col: &str,
            value: libsql::Value,
        ) {
            params.push(value);
            sets.push(format!("{col} = ?{}", params.len()));
        }

        // Client: a new phone re-keys through the upsert; a name alone
        // renames the current row in place.
        match (&update.client_name, &update.client_phone) {
            (name, Some(phone)) => {
                let full_name = name.as_deref().unwrap_or(&current.client_name);
                let client = upsert_client(&tx, full_name, phone).await?;
                push(&mut sets, &mut params, "client_id", client.id.into());
            }
            (Some(name), None) => {
                tx.execute(
                    "UPDATE clients SET full_name = ?1 WHERE id = ?2",
                    libsql::params![name.trim(), current.client_id],
                )
                .await?;
            }
            (None, None) => {}
        }

        // Appliance rows are immutable; a changed pair upserts and repoints.
        if update.appliance_type.is_some() || update.appliance_model.is_some() {
            let kind = update
                .appliance_type
                .as_deref()
                .unwrap_or(&current.appliance_type);
            let model = update
                .appliance_model
                .as_deref()
                .unwrap_or(&current.appliance_model);
            let appliance = upsert_appliance(&tx, kind, model).await?;
            push(&mut sets, &mut params, "appliance_id", appliance.id.into());
        }

        if let Some(name) = &update.issue_type {
            let issue_type_id = resolve_issue_type(&tx, Some(name)).await?;
            match issue_type_id {
                Some(id) => push(&mut sets, &mut params, "issue_type_id", id.into()),
                None => push(&mut sets, &mut params, "issue_type_id", libsql::Value::Null),
            }
        }

        if let Some(description) = &update.problem_description {
            let description = description.trim();
            if description.is_empty() {
                return Err(StoreError::InvalidArgument(
                    "problem description is empty".into(),
                ));
            }
            push(
                &mut sets,
                &mut params,
                "problem_description",
                description.into(),
            );
        }

        // Reassignment: only a non-empty, resolvable technician changes the
        // primary. Notification fires only when the primary actually changes.
        match update.technician_username.as_deref().map(str::trim) {
            Some(username) if !username.is_empty() => {
                match lookup_active_master(&tx, username).await? {
                    Some(tech) => {
                        if current.technician_id != Some(tech.id) {
                            set_primary(&tx, current.id, tech.id, actor.id, now).await?;
                            notify_user(
                                &tx,
                                tech.id,
                                Some(current.id),
                                &format!("You were assigned ticket #{request_number} as primary"),
                                now,
                            )
                            .await?;
                        }
                    }
                    None => {
                        tracing::warn!(
                            username,
                            "technician did not resolve, assignment unchanged"
                        );
                    }
                }
            }
            _ => {}
        }

        // Status: same-status requests are a no-op. First entry into
        // in_progress/ready stamps started_at/completed_at once, forever.
        let status_change = update.status.filter(|s| *s != current.status);
        if let Some(new_status) = status_change {
            push(&mut sets, &mut params, "status", new_status.as_str().into());
            if new_status == TicketStatus::InProgress && current.started_at.is_none() {
                push(
                    &mut sets,
                    &mut params,
                    "started_at",
                    now.to_rfc3339().into(),
                );
            }
            if new_status == TicketStatus::Ready && current.completed_at.is_none() {
                push(
                    &mut sets,
                    &mut params,
                    "completed_at",
                    now.to_rfc3339().into(),
                );
            }

            append_history(&tx, current.id, Some(current.status), new_status, actor.id, now)
                .await?;
            let message = format!(
                "Ticket #{request_number} status changed from {} to {}",
                current.status, new_status
            );
            notify_oversight(&tx, current.id, &message, Some(actor.id), now).await?;
        }

        push(&mut sets, &mut params, "updated_at", now.to_rfc3339().into());
        params.push(current.id.into());
        let sql = format!(
            "UPDATE tickets SET {} WHERE id = ?{}",
            sets.join(", "),
            params.len()
        );
        tx.execute(&sql, libsql::params_from_iter(params)).await?;
        tx.commit().await?;

        tracing::debug!(request_number, actor = %actor.username, "ticket updated");
        fetch_ticket(conn, current.id).await
    }

    /// Hard-delete a ticket and everything keyed on it (assignees, comments,
    /// parts, history, notifications, extensions). Unknown request numbers
    /// are a quiet no-op.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the DELETE fails.
    pub async fn delete_ticket(&self, request_number: i64) -> Result<(), StoreError> {
        let affected = self
            .db()
            .conn()
            .execute(
                "DELETE FROM tickets WHERE request_number = ?1",
                [request_number],
            )
            .await?;
        if affected > 0 {
            tracing::info!(request_number, "ticket deleted");
        }
        Ok(())
    }

    /// Get a ticket by its public request number.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails.
    pub async fn get_ticket(&self, request_number: i64) -> Result<Option<Ticket>, StoreError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("{TICKET_SELECT} WHERE t.request_number = ?1"),
                [request_number],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_ticket(&row)?)),
            None => Ok(None),
        }
    }

    /// List tickets, newest request numbers first, optionally filtered by
    /// status and/or by an assigned user (primary or assistant).
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails.
    pub async fn list_tickets(
        &self,
        status: Option<TicketStatus>,
        assignee_username: Option<&str>,
    ) -> Result<Vec<Ticket>, StoreError> {
        let mut conditions: Vec<String> = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(status) = status {
            params.push(status.as_str().into());
            conditions.push(format!("t.status = ?{}", params.len()));
        }
        if let Some(username) = assignee_username {
            params.push(username.into());
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM ticket_assignees ta
                         JOIN users au ON au.id = ta.user_id
                         WHERE ta.ticket_id = t.id AND au.username = ?{})",
                params.len()
            ));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };
        let sql = format!("{TICKET_SELECT}{where_clause} ORDER BY t.request_number DESC");

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut tickets = Vec::new();
        while let Some(row) = rows.next().await? {
            tickets.push(row_to_ticket(&row)?);
        }
        Ok(tickets)
    }

    /// Search tickets, AND-combined with the optional status and assignee
    /// filters, newest request numbers first.
    ///
    /// A purely numeric query matches the request number exactly and nothing
    /// else. Any other query is a case-insensitive substring match across
    /// client name and phone, appliance kind and model, issue type, and
    /// problem description. A blank query returns the filtered set.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails.
    pub async fn search_tickets(
        &self,
        query: &str,
        status: Option<TicketStatus>,
        assignee_username: Option<&str>,
    ) -> Result<Vec<Ticket>, StoreError> {
        let query = query.trim();
        let mut conditions: Vec<String> = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if !query.is_empty() {
            if query.bytes().all(|b| b.is_ascii_digit()) {
                // Digit strings too large for i64 cannot name a ticket.
                let Ok(number) = query.parse::<i64>() else {
                    return Ok(Vec::new());
                };
                params.push(number.into());
                conditions.push(format!("t.request_number = ?{}", params.len()));
            } else {
                params.push(query.to_lowercase().into());
                let n = params.len();
                conditions.push(format!(
                    "(instr(lower(c.full_name), ?{n}) > 0
                      OR instr(lower(c.phone), ?{n}) > 0
                      OR instr(lower(a.kind), ?{n}) > 0
                      OR instr(lower(a.model), ?{n}) > 0
                      OR instr(lower(COALESCE(it.name, '')), ?{n}) > 0
                      OR instr(lower(t.problem_description), ?{n}) > 0)"
                ));
            }
        }
        if let Some(status) = status {
            params.push(status.as_str().into());
            conditions.push(format!("t.status = ?{}", params.len()));
        }
        if let Some(username) = assignee_username {
            params.push(username.into());
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM ticket_assignees ta
                         JOIN users au ON au.id = ta.user_id
                         WHERE ta.ticket_id = t.id AND au.username = ?{})",
                params.len()
            ));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };
        let sql = format!("{TICKET_SELECT}{where_clause} ORDER BY t.request_number DESC");

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut tickets = Vec::new();
        while let Some(row) = rows.next().await? {
            tickets.push(row_to_ticket(&row)?);
        }
        Ok(tickets)
    }
}

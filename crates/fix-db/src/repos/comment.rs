//! Append-only ticket comments.

use chrono::Utc;

use fix_core::entities::Comment;

use crate::error::StoreError;
use crate::helpers::parse_datetime;
use crate::repos::ticket::require_ticket_id;
use crate::service::FixService;

fn row_to_comment(row: &libsql::Row) -> Result<Comment, StoreError> {
    Ok(Comment {
        id: row.get(0)?,
        ticket_id: row.get(1)?,
        author: row.get(2)?,
        body: row.get(3)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

impl FixService {
    /// Add a comment to a ticket. Comments are never edited or deleted.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` on a blank body, `NotFound` when the request
    /// number or author is unknown.
    pub async fn add_comment(
        &self,
        request_number: i64,
        author_username: &str,
        body: &str,
    ) -> Result<Comment, StoreError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(StoreError::InvalidArgument("comment body is empty".into()));
        }
        let author = self.resolve_active_user(author_username).await?;

        let conn = self.db().conn();
        let ticket_id = require_ticket_id(conn, request_number).await?;
        let now = Utc::now();
        conn.execute(
            "INSERT INTO ticket_comments (ticket_id, author_id, body, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            libsql::params![ticket_id, author.id, body, now.to_rfc3339()],
        )
        .await?;

        Ok(Comment {
            id: conn.last_insert_rowid(),
            ticket_id,
            author: author.username,
            body: body.to_string(),
            created_at: now,
        })
    }

    /// List a ticket's comments, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the request number is unknown.
    pub async fn list_comments(&self, request_number: i64) -> Result<Vec<Comment>, StoreError> {
        let conn = self.db().conn();
        let ticket_id = require_ticket_id(conn, request_number).await?;

        let mut rows = conn
            .query(
                "SELECT tc.id, tc.ticket_id, u.username, tc.body, tc.created_at
                 FROM ticket_comments tc
                 JOIN users u ON u.id = tc.author_id
                 WHERE tc.ticket_id = ?1
                 ORDER BY tc.id",
                [ticket_id],
            )
            .await?;
        let mut comments = Vec::new();
        while let Some(row) = rows.next().await? {
            comments.push(row_to_comment(&row)?);
        }
        Ok(comments)
    }
}

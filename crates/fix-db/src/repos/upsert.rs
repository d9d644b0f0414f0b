//! Entity upsert layer: clients keyed by phone, appliances by (kind, model),
//! issue types by name with the `"unspecified"` sentinel.
//!
//! The free functions take `&libsql::Connection` so ticket mutations can call
//! them inside their own transaction. The `FixService` wrappers exist for
//! callers that manage these entities directly.

use fix_core::entities::{Appliance, Client, IssueType};

use crate::error::StoreError;
use crate::service::FixService;

/// Upsert a client by phone (natural key). The name is last-writer-wins.
pub(crate) async fn upsert_client(
    conn: &libsql::Connection,
    full_name: &str,
    phone: &str,
) -> Result<Client, StoreError> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(StoreError::InvalidArgument("client phone is empty".into()));
    }
    let full_name = full_name.trim();

    let mut rows = conn
        .query(
            "INSERT INTO clients (full_name, phone) VALUES (?1, ?2)
             ON CONFLICT (phone) DO UPDATE SET full_name = excluded.full_name
             RETURNING id, full_name, phone",
            libsql::params![full_name, phone],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| StoreError::Query("client upsert returned no row".into()))?;
    Ok(Client {
        id: row.get(0)?,
        full_name: row.get(1)?,
        phone: row.get(2)?,
    })
}

/// Upsert an appliance by the (kind, model) pair. Rows are immutable once
/// created; a matching pair is simply returned.
pub(crate) async fn upsert_appliance(
    conn: &libsql::Connection,
    kind: &str,
    model: &str,
) -> Result<Appliance, StoreError> {
    let kind = kind.trim();
    let model = model.trim();
    if kind.is_empty() || model.is_empty() {
        return Err(StoreError::InvalidArgument(
            "appliance kind and model are required".into(),
        ));
    }

    // DO UPDATE with a no-op assignment so RETURNING yields the existing row
    // (DO NOTHING returns nothing on conflict).
    let mut rows = conn
        .query(
            "INSERT INTO appliances (kind, model) VALUES (?1, ?2)
             ON CONFLICT (kind, model) DO UPDATE SET kind = excluded.kind
             RETURNING id, kind, model",
            libsql::params![kind, model],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| StoreError::Query("appliance upsert returned no row".into()))?;
    Ok(Appliance {
        id: row.get(0)?,
        kind: row.get(1)?,
        model: row.get(2)?,
    })
}

/// Resolve an issue-type name to a row id, creating the row on first use.
///
/// `None`, blank, and the sentinel `"unspecified"` (case-insensitive after
/// trimming) all resolve to `None` without touching the table.
pub(crate) async fn resolve_issue_type(
    conn: &libsql::Connection,
    name: Option<&str>,
) -> Result<Option<i64>, StoreError> {
    let name = match name {
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(IssueType::UNSPECIFIED) {
                return Ok(None);
            }
            trimmed.to_string()
        }
        None => return Ok(None),
    };

    let mut rows = conn
        .query(
            "INSERT INTO issue_types (name) VALUES (?1)
             ON CONFLICT (name) DO UPDATE SET name = excluded.name
             RETURNING id",
            [name.as_str()],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| StoreError::Query("issue type upsert returned no row".into()))?;
    Ok(Some(row.get(0)?))
}

impl FixService {
    /// Upsert a client by phone, returning the stored row.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` on an empty phone.
    pub async fn upsert_client(&self, full_name: &str, phone: &str) -> Result<Client, StoreError> {
        upsert_client(self.db().conn(), full_name, phone).await
    }

    /// Upsert an appliance by (kind, model), returning the stored row.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when kind or model is blank.
    pub async fn upsert_appliance(&self, kind: &str, model: &str) -> Result<Appliance, StoreError> {
        upsert_appliance(self.db().conn(), kind, model).await
    }

    /// List issue types that have been created so far, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the query fails.
    pub async fn list_issue_types(&self) -> Result<Vec<IssueType>, StoreError> {
        let mut rows = self
            .db()
            .conn()
            .query("SELECT id, name FROM issue_types ORDER BY name", ())
            .await?;
        let mut types = Vec::new();
        while let Some(row) = rows.next().await? {
            types.push(IssueType {
                id: row.get(0)?,
                name: row.get(1)?,
            });
        }
        Ok(types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_service;

    #[tokio::test]
    async fn client_upsert_is_keyed_by_phone() {
        let svc = test_service().await;

        let first = svc.upsert_client("Jane Doe", "89991234567").await.unwrap();
        let second = svc.upsert_client("Jane D.", "89991234567").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.full_name, "Jane D.");

        let third = svc.upsert_client("Jane Doe", "89990000000").await.unwrap();
        assert_ne!(first.id, third.id);
    }

    #[tokio::test]
    async fn client_upsert_rejects_empty_phone() {
        let svc = test_service().await;
        let result = svc.upsert_client("Jane Doe", "   ").await;
        assert!(matches!(result, Err(StoreError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn appliance_upsert_dedupes_on_pair() {
        let svc = test_service().await;

        let first = svc.upsert_appliance("Fridge", "LG").await.unwrap();
        let again = svc.upsert_appliance("Fridge", "LG").await.unwrap();
        assert_eq!(first.id, again.id);

        let other_model = svc.upsert_appliance("Fridge", "Bosch").await.unwrap();
        assert_ne!(first.id, other_model.id);
        let other_kind = svc.upsert_appliance("Washer", "LG").await.unwrap();
        assert_ne!(first.id, other_kind.id);
    }

    #[tokio::test]
    async fn issue_type_sentinel_never_persists() {
        let svc = test_service().await;
        let conn = svc.db().conn();

        assert_eq!(resolve_issue_type(conn, None).await.unwrap(), None);
        assert_eq!(resolve_issue_type(conn, Some("")).await.unwrap(), None);
        assert_eq!(resolve_issue_type(conn, Some("  ")).await.unwrap(), None);
        assert_eq!(
            resolve_issue_type(conn, Some("Unspecified")).await.unwrap(),
            None
        );
        assert_eq!(
            resolve_issue_type(conn, Some(" unspecified ")).await.unwrap(),
            None
        );
        assert!(svc.list_issue_types().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn issue_type_created_once_per_name() {
        let svc = test_service().await;
        let conn = svc.db().conn();

        let electric = resolve_issue_type(conn, Some("Electric")).await.unwrap();
        let again = resolve_issue_type(conn, Some("Electric")).await.unwrap();
        assert_eq!(electric, again);
        assert!(electric.is_some());

        let mechanical = resolve_issue_type(conn, Some("Mechanical")).await.unwrap();
        assert_ne!(electric, mechanical);

        let names: Vec<String> = svc
            .list_issue_types()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["Electric", "Mechanical"]);
    }
}

//! Service layer owning the ticket store's call surface.
//!
//! `FixService` wraps `FixDb` (raw database access). All repo methods are
//! implemented as `impl FixService` blocks in the `repos` modules. Every
//! mutation method follows this protocol:
//! 1. Begin transaction
//! 2. Read current state, compute derived effects
//! 3. Write all affected tables (ticket, assignees, history, notifications,
//!    extensions) inside the transaction
//! 4. Commit; any failure before the commit rolls back every prior write

use fix_config::{FixConfig, GeneralConfig};

use crate::FixDb;
use crate::error::StoreError;

/// The transactional ticket store.
pub struct FixService {
    db: FixDb,
    due_in_days: i64,
}

impl FixService {
    /// Open a service over a local database.
    ///
    /// # Arguments
    ///
    /// * `db_path` — Path to the libSQL database file, or `":memory:"` for tests.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, StoreError> {
        let db = FixDb::open_local(db_path).await?;
        Ok(Self::from_db(db))
    }

    /// Open a service using a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the database cannot be opened.
    pub async fn from_config(config: &FixConfig) -> Result<Self, StoreError> {
        let db = FixDb::open_local(&config.database.path).await?;
        Ok(Self {
            db,
            due_in_days: config.general.due_in_days,
        })
    }

    /// Create from an existing `FixDb` with default settings (for testing).
    #[must_use]
    pub fn from_db(db: FixDb) -> Self {
        Self {
            db,
            due_in_days: GeneralConfig::default().due_in_days,
        }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &FixDb {
        &self.db
    }

    /// Days added to the creation time to derive a new ticket's due date.
    #[must_use]
    pub const fn due_in_days(&self) -> i64 {
        self.due_in_days
    }
}

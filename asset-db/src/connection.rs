//! The connection handle every operation hangs off.

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::exec::Db;
use crate::operations::OperationError;
use crate::schema::{self, open_database, open_memory};
use crate::settings::DatabaseSettings;

/// An open asset database.
///
/// Owns a single SQLite connection. It is `Send` but not `Sync`: share it
/// between threads behind a lock, or open one connection per thread against
/// the same file.
pub struct AssetDatabaseConnection {
    conn: Connection,
    query_logging: bool,
    settings: DatabaseSettings,
}

impl AssetDatabaseConnection {
    /// Open the database described by `settings`, creating or migrating the
    /// schema as needed.
    pub fn open(settings: &DatabaseSettings) -> Result<Self, OperationError> {
        let conn = match &settings.path {
            Some(path) => {
                let conn = open_database(path)?;
                conn.execute_batch(&format!(
                    "PRAGMA journal_mode={};",
                    settings.journal_mode.as_str()
                ))?;
                conn
            }
            None => open_memory()?,
        };
        conn.busy_timeout(Duration::from_millis(settings.busy_timeout_ms))?;
        log::debug!(
            "Opened asset database at {}",
            settings
                .path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| ":memory:".to_string())
        );

        Ok(Self {
            conn,
            query_logging: settings.query_logging,
            settings: settings.clone(),
        })
    }

    /// Open a fresh in-memory database. Useful for testing.
    pub fn open_in_memory() -> Result<Self, OperationError> {
        Self::open(&DatabaseSettings::default())
    }

    /// Open an on-disk database with default settings.
    pub fn open_path(path: &Path) -> Result<Self, OperationError> {
        Self::open(&DatabaseSettings::for_path(path))
    }

    pub fn settings(&self) -> &DatabaseSettings {
        &self.settings
    }

    /// Emit every executed statement and its parameters on the
    /// `asset_db::query` log target.
    pub fn set_query_logging(&mut self, enabled: bool) {
        self.query_logging = enabled;
    }

    pub fn query_logging(&self) -> bool {
        self.query_logging
    }

    /// Direct access to the underlying connection, for ad-hoc inspection.
    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn db(&self) -> Db<'_> {
        Db::new(&self.conn, self.query_logging)
    }

    /// Run `f` inside a `BEGIN IMMEDIATE` transaction.
    ///
    /// The write lock is taken before the first read, so natural-key lookups
    /// and the writes that depend on them cannot interleave with another
    /// connection. Any error rolls the whole transaction back.
    pub(crate) fn write<T>(
        &self,
        f: impl FnOnce(&Db<'_>) -> Result<T, OperationError>,
    ) -> Result<T, OperationError> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let value = f(&Db::new(&tx, self.query_logging))?;
        tx.commit()?;
        Ok(value)
    }

    /// Drop every row of every table, leaving an empty, usable database.
    pub fn clear_data(&self) -> Result<(), OperationError> {
        schema::reset_schema(&self.conn)?;
        log::debug!("Cleared asset database");
        Ok(())
    }

    pub fn vacuum_and_analyze(&self) -> Result<(), OperationError> {
        let db = self.db();
        db.execute_batch("VACUUM;")?;
        db.execute_batch("ANALYZE;")?;
        Ok(())
    }

    /// Schema version recorded in `dbinfo`.
    pub fn get_database_version(&self) -> Result<i32, OperationError> {
        Ok(schema::get_schema_version(&self.conn)?)
    }
}

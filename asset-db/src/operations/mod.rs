//! Write and lookup operations, grouped by table.
//!
//! Each public method runs in its own transaction; the private helpers take
//! a [`Db`](crate::exec::Db) so bulk calls can reuse them inside one.

pub mod builder_info;
pub mod files;
pub mod jobs;
pub mod legacy_sub_ids;
pub mod missing_dependencies;
pub mod product_dependencies;
pub mod products;
pub mod scan_folders;
pub mod source_dependencies;
pub mod sources;
pub mod stats;

use thiserror::Error;

use crate::schema::SchemaError;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("Foreign key violation writing {entity}: referenced row does not exist")]
    ForeignKey { entity: &'static str },
    #[error("Entity not found: {entity_type} with id '{id}'")]
    NotFound { entity_type: &'static str, id: i64 },
    #[error("Invalid id for {entity_type}: {id}")]
    InvalidId { entity_type: &'static str, id: i64 },
    #[error("Invalid {entity_type}: {reason}")]
    InvalidEntry {
        entity_type: &'static str,
        reason: String,
    },
    #[error("{operation} called with no entries")]
    EmptyInput { operation: &'static str },
}

impl OperationError {
    pub(crate) fn not_found(entity_type: &'static str, id: i64) -> Self {
        log::error!("{entity_type} with id {id} does not exist");
        Self::NotFound { entity_type, id }
    }

    pub(crate) fn invalid_id(entity_type: &'static str, id: i64) -> Self {
        log::warn!("{entity_type} id {id} is not a valid id");
        Self::InvalidId { entity_type, id }
    }

    pub(crate) fn invalid_entry(entity_type: &'static str, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        log::error!("Invalid {entity_type}: {reason}");
        Self::InvalidEntry {
            entity_type,
            reason,
        }
    }

    pub(crate) fn empty_input(operation: &'static str) -> Self {
        log::warn!("{operation} called with an empty list");
        Self::EmptyInput { operation }
    }

    /// True for failures caused by the data supplied rather than by storage.
    pub fn is_data_error(&self) -> bool {
        !matches!(self, Self::Sqlite(_) | Self::Schema(_))
    }
}

/// Convert a write failure, reporting foreign key violations by entity.
pub(crate) fn write_error(err: rusqlite::Error, entity: &'static str) -> OperationError {
    if is_foreign_key_violation(&err) {
        log::error!("Failed to write {entity}: a referenced row does not exist");
        OperationError::ForeignKey { entity }
    } else {
        OperationError::Sqlite(err)
    }
}

fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}

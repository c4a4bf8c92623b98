//! SQLite persistence layer for the asset pipeline.
//!
//! Tracks scan folders, sources, jobs, products and their dependencies
//! behind a single [`AssetDatabaseConnection`], backed by SQLite (via
//! rusqlite with the bundled feature). Entry types live in the
//! `asset-db-types` crate.

pub mod connection;
mod exec;
pub mod filter;
pub mod operations;
pub mod queries;
pub mod query_log;
mod rows;
pub mod schema;
pub mod settings;

pub use connection::AssetDatabaseConnection;
pub use filter::ProductFilter;
pub use operations::OperationError;
pub use queries::DatabaseStats;
pub use query_log::{QUERY_LOG_TARGET, format_query};
pub use schema::{CURRENT_VERSION, SchemaError};
pub use settings::{
    DatabaseSettings, JournalMode, SettingsError, resolve_database_path, settings_path,
};

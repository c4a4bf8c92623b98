//! SQLite schema creation, validation and migration.

use rusqlite::Connection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Migration error: expected version {expected}, found {found}")]
    VersionMismatch { expected: i32, found: i32 },
    #[error("Database is missing table '{table}'")]
    Corrupt { table: &'static str },
}

/// Current schema version. Increment when adding migrations.
pub const CURRENT_VERSION: i32 = 2;

/// Every table a valid database must contain.
pub const EXPECTED_TABLES: &[&str] = &[
    "BuilderInfo",
    "Files",
    "Jobs",
    "LegacySubIDs",
    "MissingProductDependencies",
    "ProductDependencies",
    "Products",
    "ScanFolders",
    "SourceDependency",
    "Sources",
    "Stats",
    "dbinfo",
];

/// Create all tables and indexes if they don't exist.
///
/// This is idempotent; safe to call on an existing database.
pub fn create_schema(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(SCHEMA_SQL)?;
    set_schema_version(conn, CURRENT_VERSION)?;
    log::debug!("Created asset database schema version {CURRENT_VERSION}");
    Ok(())
}

/// Open or create an asset database at the given path.
pub fn open_database(path: &std::path::Path) -> Result<Connection, SchemaError> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;

    let version = get_schema_version(&conn)?;
    if version == 0 {
        create_schema(&conn)?;
    } else {
        if version < CURRENT_VERSION {
            migrate(&conn, version)?;
        } else if version > CURRENT_VERSION {
            return Err(SchemaError::VersionMismatch {
                expected: CURRENT_VERSION,
                found: version,
            });
        }
        validate_tables(&conn)?;
    }

    Ok(conn)
}

/// Open an in-memory database with the full schema. Useful for testing.
pub fn open_memory() -> Result<Connection, SchemaError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Drop every table and recreate an empty schema.
pub fn reset_schema(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch("PRAGMA foreign_keys=OFF;")?;
    for table in EXPECTED_TABLES {
        conn.execute_batch(&format!("DROP TABLE IF EXISTS {table};"))?;
    }
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    create_schema(conn)
}

/// Get the current schema version, or 0 if no schema exists.
pub fn get_schema_version(conn: &Connection) -> Result<i32, SchemaError> {
    if !table_exists(conn, "dbinfo")? {
        return Ok(0);
    }

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM dbinfo",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool, SchemaError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)",
        [name],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Check that every expected table is present.
fn validate_tables(conn: &Connection) -> Result<(), SchemaError> {
    for &table in EXPECTED_TABLES {
        if !table_exists(conn, table)? {
            log::error!("Asset database is missing table {table}");
            return Err(SchemaError::Corrupt { table });
        }
    }
    Ok(())
}

/// Record a schema version.
fn set_schema_version(conn: &Connection, version: i32) -> Result<(), SchemaError> {
    conn.execute("INSERT INTO dbinfo (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Run migrations from `from_version` up to `CURRENT_VERSION`.
fn migrate(conn: &Connection, from_version: i32) -> Result<(), SchemaError> {
    if from_version > CURRENT_VERSION {
        return Err(SchemaError::VersionMismatch {
            expected: CURRENT_VERSION,
            found: from_version,
        });
    }

    let mut version = from_version;
    while version < CURRENT_VERSION {
        if version == 1 {
            conn.execute_batch(
                "ALTER TABLE Jobs ADD COLUMN FailureCauseSourcePK INTEGER NOT NULL DEFAULT -1;
                 ALTER TABLE Jobs ADD COLUMN FailureCauseFingerprint INTEGER NOT NULL DEFAULT 0;
                 CREATE INDEX IF NOT EXISTS idx_jobs_failure_cause ON Jobs(FailureCauseSourcePK);",
            )?;
        }
        version += 1;
        set_schema_version(conn, version)?;
        log::debug!("Migrated asset database to version {version}");
    }

    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS dbinfo (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Watched root folders
CREATE TABLE IF NOT EXISTS ScanFolders (
    ScanFolderID INTEGER PRIMARY KEY AUTOINCREMENT,
    ScanFolder TEXT NOT NULL COLLATE NOCASE,
    DisplayName TEXT NOT NULL COLLATE NOCASE,
    PortableKey TEXT NOT NULL COLLATE NOCASE,
    IsRoot INTEGER NOT NULL DEFAULT 0
);

-- Source files, relative to their scan folder
CREATE TABLE IF NOT EXISTS Sources (
    SourceID INTEGER PRIMARY KEY AUTOINCREMENT,
    ScanFolderPK INTEGER NOT NULL REFERENCES ScanFolders(ScanFolderID) ON DELETE CASCADE,
    SourceName TEXT NOT NULL COLLATE NOCASE,
    SourceGuid BLOB NOT NULL,
    AnalysisFingerprint TEXT NOT NULL DEFAULT ''
);

-- Builder runs, one per (source, builder, job key, platform)
CREATE TABLE IF NOT EXISTS Jobs (
    JobID INTEGER PRIMARY KEY AUTOINCREMENT,
    SourcePK INTEGER NOT NULL REFERENCES Sources(SourceID) ON DELETE CASCADE,
    JobKey TEXT NOT NULL COLLATE NOCASE,
    Fingerprint INTEGER NOT NULL DEFAULT 0,
    Platform TEXT NOT NULL COLLATE NOCASE,
    BuilderGuid BLOB NOT NULL,
    Status INTEGER NOT NULL,
    JobRunKey INTEGER NOT NULL,
    FirstFailLogTime INTEGER NOT NULL DEFAULT 0,
    FirstFailLogFile TEXT NOT NULL DEFAULT '',
    LastFailLogTime INTEGER NOT NULL DEFAULT 0,
    LastFailLogFile TEXT NOT NULL DEFAULT '',
    LastLogTime INTEGER NOT NULL DEFAULT 0,
    LastLogFile TEXT NOT NULL DEFAULT '',
    ErrorCount INTEGER NOT NULL DEFAULT 0,
    WarningCount INTEGER NOT NULL DEFAULT 0,
    FailureCauseSourcePK INTEGER NOT NULL DEFAULT -1,
    FailureCauseFingerprint INTEGER NOT NULL DEFAULT 0
);

-- Job outputs
CREATE TABLE IF NOT EXISTS Products (
    ProductID INTEGER PRIMARY KEY AUTOINCREMENT,
    JobPK INTEGER NOT NULL REFERENCES Jobs(JobID) ON DELETE CASCADE,
    SubID INTEGER NOT NULL,
    ProductName TEXT NOT NULL COLLATE NOCASE,
    AssetType BLOB NOT NULL,
    LegacyGuid BLOB NOT NULL,
    Hash INTEGER NOT NULL DEFAULT 0,
    Flags INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS LegacySubIDs (
    LegacySubID INTEGER PRIMARY KEY AUTOINCREMENT,
    ProductPK INTEGER NOT NULL REFERENCES Products(ProductID) ON DELETE CASCADE,
    SubID INTEGER NOT NULL
);

-- Builder-scoped source to source dependencies
CREATE TABLE IF NOT EXISTS SourceDependency (
    SourceDependencyID INTEGER PRIMARY KEY AUTOINCREMENT,
    BuilderGuid BLOB NOT NULL,
    Source BLOB NOT NULL,
    DependsOnSource TEXT NOT NULL COLLATE NOCASE,
    TypeOfDependency INTEGER NOT NULL DEFAULT 0,
    FromAssetId INTEGER NOT NULL DEFAULT 0,
    SubIds TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS ProductDependencies (
    ProductDependencyID INTEGER PRIMARY KEY AUTOINCREMENT,
    ProductPK INTEGER NOT NULL REFERENCES Products(ProductID) ON DELETE CASCADE,
    DependencySourceGuid BLOB NOT NULL,
    DependencySubID INTEGER NOT NULL,
    Platform TEXT NOT NULL COLLATE NOCASE,
    DependencyFlags INTEGER NOT NULL DEFAULT 0,
    UnresolvedPath TEXT NOT NULL DEFAULT '' COLLATE NOCASE,
    UnresolvedDependencyType INTEGER NOT NULL DEFAULT 0,
    FromAssetId INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS MissingProductDependencies (
    MissingProductDependencyId INTEGER PRIMARY KEY AUTOINCREMENT,
    ProductPK INTEGER NOT NULL REFERENCES Products(ProductID) ON DELETE CASCADE,
    ScannerId TEXT NOT NULL,
    ScannerVersion TEXT NOT NULL,
    SourceFileFingerprint TEXT NOT NULL,
    DependencySourceGuid BLOB NOT NULL,
    DependencySubId INTEGER NOT NULL,
    MissingDependencyString TEXT NOT NULL,
    LastScanTime TEXT NOT NULL,
    ScanTimeSecondsSinceEpoch INTEGER NOT NULL DEFAULT 0
);

-- File modification tracking
CREATE TABLE IF NOT EXISTS Files (
    FileID INTEGER PRIMARY KEY AUTOINCREMENT,
    ScanFolderPK INTEGER NOT NULL REFERENCES ScanFolders(ScanFolderID) ON DELETE CASCADE,
    FileName TEXT NOT NULL COLLATE NOCASE,
    IsFolder INTEGER NOT NULL DEFAULT 0,
    ModTime INTEGER NOT NULL DEFAULT 0,
    Hash INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS Stats (
    StatName TEXT PRIMARY KEY NOT NULL,
    StatValue INTEGER NOT NULL DEFAULT 0,
    LastLogTime INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS BuilderInfo (
    BuilderID INTEGER PRIMARY KEY AUTOINCREMENT,
    Guid BLOB NOT NULL,
    AnalysisFingerprint TEXT NOT NULL DEFAULT ''
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_scanfolders_portable_key ON ScanFolders(PortableKey);
CREATE INDEX IF NOT EXISTS idx_sources_guid ON Sources(SourceGuid);
CREATE INDEX IF NOT EXISTS idx_sources_scanfolder ON Sources(ScanFolderPK);
CREATE INDEX IF NOT EXISTS idx_sources_name ON Sources(SourceName);
CREATE INDEX IF NOT EXISTS idx_jobs_source ON Jobs(SourcePK);
CREATE INDEX IF NOT EXISTS idx_jobs_run_key ON Jobs(JobRunKey);
CREATE INDEX IF NOT EXISTS idx_jobs_failure_cause ON Jobs(FailureCauseSourcePK);
CREATE INDEX IF NOT EXISTS idx_products_job_subid ON Products(JobPK, SubID);
CREATE INDEX IF NOT EXISTS idx_products_name ON Products(ProductName);
CREATE INDEX IF NOT EXISTS idx_legacy_subids_product ON LegacySubIDs(ProductPK);
CREATE INDEX IF NOT EXISTS idx_source_dependency_source ON SourceDependency(Source);
CREATE INDEX IF NOT EXISTS idx_source_dependency_depends_on ON SourceDependency(DependsOnSource);
CREATE INDEX IF NOT EXISTS idx_product_dependencies_product ON ProductDependencies(ProductPK);
CREATE INDEX IF NOT EXISTS idx_product_dependencies_target ON ProductDependencies(DependencySourceGuid, DependencySubID);
CREATE INDEX IF NOT EXISTS idx_missing_dependencies_product ON MissingProductDependencies(ProductPK);
CREATE INDEX IF NOT EXISTS idx_files_scanfolder_name ON Files(ScanFolderPK, FileName);
"#;

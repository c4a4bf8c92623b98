//! Database settings and their on-disk location.
//!
//! Settings live in `~/.config/asset-db/settings.toml` under a `[database]`
//! table. They are loaded once and passed to
//! [`AssetDatabaseConnection::open`](crate::AssetDatabaseConnection::open);
//! nothing reads them globally.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed settings file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// SQLite journal mode for on-disk databases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalMode {
    #[default]
    Wal,
    Delete,
}

impl JournalMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wal => "WAL",
            Self::Delete => "DELETE",
        }
    }
}

/// How to open the asset database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Database file. `None` opens an in-memory database.
    pub path: Option<PathBuf>,
    /// Start with query logging enabled.
    pub query_logging: bool,
    pub busy_timeout_ms: u64,
    /// Ignored for in-memory databases.
    pub journal_mode: JournalMode,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: None,
            query_logging: false,
            busy_timeout_ms: 5000,
            journal_mode: JournalMode::Wal,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct SettingsFile {
    database: DatabaseSettings,
}

/// Canonical path to the settings file: `~/.config/asset-db/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("asset-db").join("settings.toml")
}

impl DatabaseSettings {
    /// Settings for an on-disk database at `path`, other fields default.
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Load from the canonical settings file. A missing file yields defaults.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&settings_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        let file: SettingsFile = toml::from_str(&contents)?;
        Ok(file.database)
    }

    /// Save to the canonical settings file.
    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to(&settings_path())
    }

    /// Write atomically: serialize to a sibling temp file, then rename.
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let serialized = toml::to_string_pretty(&SettingsFile {
            database: self.clone(),
        })?;
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, &serialized)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

/// Resolve the database file using a priority chain:
///
/// 1. CLI override (if `Some`)
/// 2. Saved `database.path` in `settings.toml`
/// 3. `assets.db` in the current working directory
pub fn resolve_database_path(cli_override: Option<PathBuf>) -> PathBuf {
    if let Some(p) = cli_override {
        return p;
    }
    if let Ok(DatabaseSettings { path: Some(p), .. }) = DatabaseSettings::load() {
        return p;
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("assets.db")
}

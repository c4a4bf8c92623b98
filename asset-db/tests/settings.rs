use asset_db::{AssetDatabaseConnection, DatabaseSettings, JournalMode, SettingsError};

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = DatabaseSettings::load_from(&dir.path().join("settings.toml")).unwrap();
    assert_eq!(settings, DatabaseSettings::default());
    assert_eq!(settings.busy_timeout_ms, 5000);
    assert_eq!(settings.journal_mode, JournalMode::Wal);
}

#[test]
fn save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.toml");
    let settings = DatabaseSettings {
        query_logging: true,
        journal_mode: JournalMode::Delete,
        ..DatabaseSettings::for_path("/tmp/assets.db")
    };
    settings.save_to(&path).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("[database]"));
    assert!(contents.contains("journal_mode = \"delete\""));
    assert_eq!(DatabaseSettings::load_from(&path).unwrap(), settings);
}

#[test]
fn partial_file_fills_in_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "[database]\nquery_logging = true\n").unwrap();

    let settings = DatabaseSettings::load_from(&path).unwrap();
    assert!(settings.query_logging);
    assert_eq!(settings.path, None);
    assert_eq!(settings.busy_timeout_ms, 5000);
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    std::fs::write(&path, "[database\nquery_logging = ").unwrap();
    assert!(matches!(
        DatabaseSettings::load_from(&path),
        Err(SettingsError::Parse(_))
    ));
}

#[test]
fn settings_open_an_on_disk_database() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("assets.db");
    let settings = DatabaseSettings {
        query_logging: true,
        ..DatabaseSettings::for_path(&db_path)
    };
    let db = AssetDatabaseConnection::open(&settings).unwrap();
    assert!(db.query_logging());
    assert_eq!(db.settings(), &settings);
    assert!(db_path.exists());
}

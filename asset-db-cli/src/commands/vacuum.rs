use asset_db::AssetDatabaseConnection;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;

pub(crate) fn run_vacuum(db: &AssetDatabaseConnection) -> Result<(), CliError> {
    let path = db.settings().path.clone();
    let size_before = match &path {
        Some(p) => std::fs::metadata(p)?.len(),
        None => 0,
    };

    db.vacuum_and_analyze()
        .map_err(|e| CliError::database(format!("Failed to vacuum database: {}", e)))?;

    log::info!(
        "{}",
        "Database compacted.".if_supports_color(Stdout, |t| t.bold()),
    );
    if let Some(p) = &path {
        let size_after = std::fs::metadata(p)?.len();
        let to_mb = |bytes: u64| bytes as f64 / (1024.0 * 1024.0);
        log::info!("  Path: {}", p.display());
        log::info!(
            "  Size: {:.1} MB -> {:.1} MB",
            to_mb(size_before),
            to_mb(size_after),
        );
    }
    Ok(())
}

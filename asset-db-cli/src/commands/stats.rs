use asset_db::AssetDatabaseConnection;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;

pub(crate) fn run_stats(db: &AssetDatabaseConnection) -> Result<(), CliError> {
    let stats = db
        .database_stats()
        .map_err(|e| CliError::database(format!("Failed to query database stats: {}", e)))?;
    let version = db
        .get_database_version()
        .map_err(|e| CliError::database(format!("Failed to read schema version: {}", e)))?;

    log::info!(
        "{}",
        "Asset Database Statistics".if_supports_color(Stdout, |t| t.bold()),
    );
    if let Some(path) = &db.settings().path {
        log::info!("  Database: {}", path.display());
    }
    log::info!("  Schema version: {}", version);
    crate::log_blank();
    log::info!("  Scan folders:        {:>8}", stats.scan_folders);
    log::info!("  Sources:             {:>8}", stats.sources);
    log::info!(
        "  Jobs:                {:>8} ({} failed)",
        stats.jobs,
        stats.failed_jobs,
    );
    log::info!("  Products:            {:>8}", stats.products);
    log::info!(
        "  Product deps:        {:>8} ({} unresolved)",
        stats.product_dependencies,
        stats.unresolved_dependencies,
    );
    log::info!("  Missing deps:        {:>8}", stats.missing_dependencies);
    log::info!("  Source deps:         {:>8}", stats.source_dependencies);
    log::info!("  Files:               {:>8}", stats.files);
    log::info!("  Stats:               {:>8}", stats.stats);

    Ok(())
}

use asset_db::AssetDatabaseConnection;
use asset_db_types::ProductEntry;
use chrono::DateTime;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;

fn require_product(db: &AssetDatabaseConnection, product_id: i64) -> Result<ProductEntry, CliError> {
    db.get_product_by_id(product_id)
        .map_err(|e| CliError::database(format!("Failed to look up product: {}", e)))?
        .ok_or_else(|| CliError::not_found(format!("product {}", product_id)))
}

pub(crate) fn run_deps(
    db: &AssetDatabaseConnection,
    product_id: i64,
    all: bool,
) -> Result<(), CliError> {
    let product = require_product(db, product_id)?;
    let deps = if all {
        db.get_all_product_dependencies(product_id)
    } else {
        db.get_direct_product_dependencies(product_id)
    }
    .map_err(|e| CliError::database(format!("Failed to query dependencies: {}", e)))?;

    log::info!(
        "{} {}",
        if all { "All dependencies of" } else { "Dependencies of" },
        product.product_name.if_supports_color(Stdout, |t| t.bold()),
    );
    for dep in &deps {
        log::info!("  {:>6}  {}", dep.product_id, dep.product_name);
    }

    let unresolved: Vec<_> = db
        .get_product_dependencies_by_product_id(product_id)
        .map_err(|e| CliError::database(format!("Failed to query dependencies: {}", e)))?
        .into_iter()
        .filter(|d| !d.unresolved_path.is_empty())
        .collect();
    for dep in &unresolved {
        log::info!(
            "  {:>6}  {} {}",
            "-",
            dep.unresolved_path,
            "(unresolved)".if_supports_color(Stdout, |t| t.yellow()),
        );
    }

    crate::log_blank();
    log::info!(
        "{} resolved, {} unresolved",
        deps.len(),
        unresolved.len(),
    );
    Ok(())
}

pub(crate) fn run_missing_deps(db: &AssetDatabaseConnection, product_id: i64) -> Result<(), CliError> {
    let product = require_product(db, product_id)?;
    let missing = db
        .get_missing_product_dependencies_by_product_id(product_id)
        .map_err(|e| CliError::database(format!("Failed to query missing dependencies: {}", e)))?;

    if missing.is_empty() {
        log::info!("No missing dependencies for {}.", product.product_name);
        return Ok(());
    }

    log::info!(
        "Missing dependencies of {}",
        product.product_name.if_supports_color(Stdout, |t| t.bold()),
    );
    for entry in &missing {
        let scanned = i64::try_from(entry.scan_time_seconds_since_epoch)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| entry.last_scan_time.clone());
        log::info!(
            "  {}",
            entry
                .missing_dependency_string
                .if_supports_color(Stdout, |t| t.red()),
        );
        log::info!(
            "    {} {} @ {} {}",
            entry.scanner_id,
            entry.scanner_version,
            scanned,
            entry
                .dependency_source_guid
                .braced()
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    Ok(())
}

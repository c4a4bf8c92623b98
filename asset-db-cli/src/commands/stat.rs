use std::ops::ControlFlow;

use asset_db::AssetDatabaseConnection;
use asset_db_types::StatEntry;
use chrono::DateTime;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;

use super::truncate_str;

/// List stats, all of them or those whose name matches a LIKE pattern.
pub(crate) fn run_stat(db: &AssetDatabaseConnection, pattern: Option<&str>) -> Result<(), CliError> {
    let stats = match pattern {
        Some(pattern) => db.get_stat_like_stat_name(pattern),
        None => {
            let mut all = Vec::new();
            db.query_stats_table(|stat| {
                all.push(stat.clone());
                ControlFlow::Continue(())
            })
            .map(|()| all)
        }
    }
    .map_err(|e| CliError::database(format!("Failed to query stats: {}", e)))?;

    if stats.is_empty() {
        log::info!("No stats found.");
        return Ok(());
    }

    log::info!(
        "{}",
        format!("  {:<40} {:>14}  {}", "Name", "Value", "Last logged")
            .if_supports_color(Stdout, |t| t.bold()),
    );
    for stat in &stats {
        log::info!(
            "  {:<40} {:>14}  {}",
            truncate_str(&stat.stat_name, 40),
            stat.stat_value,
            format_log_time(stat),
        );
    }
    Ok(())
}

/// Stat log times are milliseconds since the epoch.
fn format_log_time(stat: &StatEntry) -> String {
    DateTime::from_timestamp_millis(stat.last_log_time)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| stat.last_log_time.to_string())
}

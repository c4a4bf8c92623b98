use std::ops::ControlFlow;

use asset_db::{AssetDatabaseConnection, ProductFilter};
use asset_db_types::{CombinedEntry, JobStatus, LikeType};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;

use super::truncate_str;

pub(crate) fn run_products(
    db: &AssetDatabaseConnection,
    source: Option<String>,
    like: Option<String>,
    platform: Option<String>,
    json: bool,
) -> Result<(), CliError> {
    let mut filter = ProductFilter::any();
    if let Some(platform) = platform {
        filter = filter.platform(platform);
    }

    let mut entries: Vec<CombinedEntry> = Vec::new();
    let collect = |entry: &CombinedEntry| {
        entries.push(entry.clone());
        ControlFlow::Continue(())
    };
    let result = match (&source, &like) {
        (Some(name), _) => db.query_combined_by_source_name(name, &filter, false, collect),
        (None, Some(term)) => {
            db.query_combined_like_source_name(term, LikeType::Matches, &filter, false, collect)
        }
        (None, None) => db.query_combined(&filter, false, collect),
    };
    result.map_err(|e| CliError::database(format!("Failed to query products: {}", e)))?;

    if json {
        for entry in &entries {
            let line = serde_json::to_string(entry)
                .map_err(|e| CliError::other(format!("Failed to serialize product: {}", e)))?;
            log::info!("{}", line);
        }
        return Ok(());
    }

    if entries.is_empty() {
        log::info!("No products found.");
        return Ok(());
    }

    let mut current_source = -1;
    for entry in &entries {
        if entry.source.source_id != current_source {
            if current_source != -1 {
                crate::log_blank();
            }
            current_source = entry.source.source_id;
            log::info!(
                "{} {}",
                entry.source.source_name.if_supports_color(Stdout, |t| t.bold()),
                entry
                    .source
                    .source_guid
                    .braced()
                    .if_supports_color(Stdout, |t| t.dimmed()),
            );
        }

        let status = entry.job.status.as_str();
        log::info!(
            "  {:>6}  {:<48} {:>5} {:<8} {}",
            entry.product.product_id,
            truncate_str(&entry.product.product_name, 48),
            entry.product.sub_id,
            entry.job.platform.if_supports_color(Stdout, |t| t.cyan()),
            if entry.job.status == JobStatus::Completed {
                status.if_supports_color(Stdout, |t| t.green()).to_string()
            } else {
                status.if_supports_color(Stdout, |t| t.yellow()).to_string()
            },
        );
    }
    crate::log_blank();
    log::info!("{} product(s)", entries.len());

    Ok(())
}

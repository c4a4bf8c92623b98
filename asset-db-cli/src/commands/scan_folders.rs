use asset_db::AssetDatabaseConnection;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;

pub(crate) fn run_scan_folders(db: &AssetDatabaseConnection) -> Result<(), CliError> {
    let folders = db
        .get_scan_folders()
        .map_err(|e| CliError::database(format!("Failed to list scan folders: {}", e)))?;

    if folders.is_empty() {
        log::info!("No scan folders.");
        return Ok(());
    }

    for folder in &folders {
        log::info!(
            "  {:>4}  {} [{}]{}",
            folder.scan_folder_id,
            folder.display_name.if_supports_color(Stdout, |t| t.bold()),
            folder.portable_key.if_supports_color(Stdout, |t| t.cyan()),
            if folder.is_root {
                format!(" {}", "(root)".if_supports_color(Stdout, |t| t.green()))
            } else {
                String::new()
            },
        );
        log::info!("        {}", folder.scan_folder);
    }
    crate::log_blank();
    log::info!("{} scan folder(s)", folders.len());

    Ok(())
}

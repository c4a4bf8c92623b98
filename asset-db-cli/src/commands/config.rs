use asset_db::{DatabaseSettings, settings_path};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;

/// Show the effective settings and where they come from.
pub(crate) fn run_config_show() -> Result<(), CliError> {
    let path = settings_path();
    let settings = DatabaseSettings::load()
        .map_err(|e| CliError::config(format!("Failed to load {}: {}", path.display(), e)))?;

    log::info!(
        "{}",
        "Asset Database Settings".if_supports_color(Stdout, |t| t.bold()),
    );
    crate::log_blank();

    if path.exists() {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found, using defaults)".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    crate::log_blank();

    let resolved = asset_db::resolve_database_path(None);
    log::info!(
        "  path:            {}",
        match &settings.path {
            Some(p) => p.display().to_string(),
            None => format!("(unset, using {})", resolved.display()),
        },
    );
    log::info!("  query_logging:   {}", settings.query_logging);
    log::info!("  busy_timeout_ms: {}", settings.busy_timeout_ms);
    log::info!("  journal_mode:    {}", settings.journal_mode.as_str());

    Ok(())
}

/// Print the settings file path.
pub(crate) fn run_config_path() {
    log::info!("{}", settings_path().display());
}

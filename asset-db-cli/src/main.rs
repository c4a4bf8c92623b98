//! asset-db CLI
//!
//! Command-line interface for inspecting an asset database.

mod commands;
mod error;

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::LevelFilter;

use asset_db::{AssetDatabaseConnection, DatabaseSettings, resolve_database_path};

pub(crate) use error::CliError;

#[derive(Parser)]
#[command(name = "asset-db")]
#[command(about = "Inspect and maintain an asset processing database", long_about = None)]
struct Cli {
    /// Database file (defaults to the saved setting, then ./assets.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Show debug output and every executed statement
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show row counts of the database tables
    Stats,

    /// List scan folders
    ScanFolders,

    /// List products with their job and source
    Products {
        /// Exact source name
        #[arg(long, conflicts_with = "like")]
        source: Option<String>,

        /// Substring of the source name
        #[arg(long)]
        like: Option<String>,

        /// Only products built for this platform (e.g., pc, osx)
        #[arg(long)]
        platform: Option<String>,

        /// Print one JSON object per product
        #[arg(long)]
        json: bool,
    },

    /// List the products a product depends on
    Deps {
        product_id: i64,

        /// Follow dependencies transitively
        #[arg(long)]
        all: bool,
    },

    /// List missing dependencies reported for a product
    MissingDeps { product_id: i64 },

    /// List the stats table
    Stat {
        /// SQL LIKE pattern on the stat name (e.g., "Apple_%")
        pattern: Option<String>,
    },

    /// Compact the database and refresh query planner statistics
    Vacuum,

    /// Manage the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective database settings
    Show,

    /// Print the settings file path
    Path,
}

/// Print an empty line through the logger.
pub(crate) fn log_blank() {
    log::info!("");
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .parse_default_env()
        .init();
}

/// Open the database named on the command line or in the settings file.
fn open_database(db: Option<PathBuf>, verbose: bool) -> Result<AssetDatabaseConnection, CliError> {
    let settings = DatabaseSettings::load()
        .map_err(|e| CliError::config(format!("Failed to load settings: {}", e)))?;
    let path = resolve_database_path(db);
    if !path.exists() {
        return Err(CliError::not_found(format!(
            "No asset database found at {}",
            path.display()
        )));
    }

    let settings = DatabaseSettings {
        path: Some(path),
        query_logging: settings.query_logging || verbose,
        ..settings
    };
    AssetDatabaseConnection::open(&settings)
        .map_err(|e| CliError::database(format!("Failed to open asset database: {}", e)))
}

fn run(cli: Cli) -> Result<(), CliError> {
    if let Commands::Config { action } = &cli.command {
        return match action {
            ConfigAction::Show => commands::config::run_config_show(),
            ConfigAction::Path => {
                commands::config::run_config_path();
                Ok(())
            }
        };
    }

    let db = open_database(cli.db, cli.verbose)?;
    match cli.command {
        Commands::Stats => commands::stats::run_stats(&db),
        Commands::ScanFolders => commands::scan_folders::run_scan_folders(&db),
        Commands::Products {
            source,
            like,
            platform,
            json,
        } => commands::products::run_products(&db, source, like, platform, json),
        Commands::Deps { product_id, all } => commands::deps::run_deps(&db, product_id, all),
        Commands::MissingDeps { product_id } => commands::deps::run_missing_deps(&db, product_id),
        Commands::Stat { pattern } => commands::stat::run_stat(&db, pattern.as_deref()),
        Commands::Vacuum => commands::vacuum::run_vacuum(&db),
        Commands::Config { .. } => Ok(()),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

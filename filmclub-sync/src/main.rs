//! filmclub-sync - sheet → catalog reconciler
//!
//! Reads the film club's rating sheet, merges it into the catalog JSON and
//! enriches newly listed films from OMDb (full record) and TMDB (crew).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use filmclub_common::catalog::CatalogOrder;
use filmclub_common::config::{default_config_path, load_toml_config};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use filmclub_sync::config::{resolve_run_config, CliOverrides};
use filmclub_sync::{export_catalog_csv, run_sync};

/// Command-line arguments for filmclub-sync
#[derive(Parser, Debug)]
#[command(name = "filmclub-sync")]
#[command(about = "Sync the film club rating sheet into the film catalog")]
#[command(version)]
struct Args {
    /// TOML config file (default: <config dir>/filmclub/config.toml)
    #[arg(long, env = "FILMCLUB_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Google Sheet id, CSV URL, or local CSV file
    #[arg(long, global = true)]
    sheet: Option<String>,

    /// Catalog JSON file
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// OMDb API key
    #[arg(long, global = true)]
    omdb_api_key: Option<String>,

    /// TMDB API read access token
    #[arg(long, global = true)]
    tmdb_api_token: Option<String>,

    /// Club members, comma separated
    #[arg(long, value_delimiter = ',', global = true)]
    roster: Option<Vec<String>>,

    /// Catalog ordering when written: insertion | watch-date-desc
    #[arg(long, global = true)]
    order: Option<CatalogOrder>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one sync pass (default)
    Sync {
        /// Reconcile and report without writing the catalog
        #[arg(long)]
        dry_run: bool,
    },
    /// Write the catalog out in the sheet's CSV layout
    ExportCsv {
        /// Destination CSV file
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(default_config_path);
    let toml_config = match &config_path {
        Some(path) => load_toml_config(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => Default::default(),
    };

    // RUST_LOG wins over the config file level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| toml_config.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting filmclub-sync v{}", env!("CARGO_PKG_VERSION"));

    let cli = CliOverrides {
        sheet: args.sheet,
        catalog: args.catalog,
        omdb_api_key: args.omdb_api_key,
        tmdb_api_token: args.tmdb_api_token,
        roster: args.roster,
        catalog_order: args.order,
    };
    let run_config =
        resolve_run_config(&cli, &toml_config).context("Invalid run configuration")?;

    match args.command.unwrap_or(Command::Sync { dry_run: false }) {
        Command::Sync { dry_run } => {
            let summary = run_sync(&run_config, dry_run)
                .await
                .context("Sync failed")?;
            info!(
                records = summary.records,
                written = summary.written,
                "Done"
            );
        }
        Command::ExportCsv { output } => {
            let count = export_catalog_csv(&run_config, &output)
                .with_context(|| format!("Failed to export CSV to {}", output.display()))?;
            info!(records = count, output = %output.display(), "Done");
        }
    }

    Ok(())
}

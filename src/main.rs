//! Creature Catalog - cached CRUD catalog seeded from PokeAPI
//!
//! Main entry point for the `creature-catalog` binary.

use clap::{Parser, Subcommand};
use creature_catalog::catalog::{CatalogCoordinator, IngestConfig, SeedOutcome};
use creature_catalog::config::{validate_config_result, CatalogConfig};
use creature_catalog::ingest::PokeApiSource;
use creature_catalog::server::CatalogServer;
use creature_catalog::storage::SqliteStore;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

/// Creature catalog service
#[derive(Parser, Debug)]
#[command(name = "creature-catalog")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: ~/.config/creature-catalog/config.yaml)
    #[arg(short, long, env = "CATALOG_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Seed the catalog if empty, then serve the HTTP API (default)
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Clear the catalog and re-seed it from the ingestion source
    Reinitialize,

    /// Print every creature as JSON
    List,

    /// Print a single creature as JSON
    Show {
        /// Creature ID
        id: i64,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = creature_catalog::logging::init(cli.json_logs) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> creature_catalog::Result<()> {
    let mut config = CatalogConfig::load_or_default(cli.config.as_deref())?;
    if let Some(Commands::Serve { port: Some(port) }) = cli.command {
        config.server.port = port;
    }
    validate_config_result(&config)?;

    let catalog = Arc::new(build_coordinator(&config)?);

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { .. } => {
            if config.ingest.seed_on_startup {
                match catalog.seed_if_empty().await {
                    SeedOutcome::Seeded(report) => {
                        tracing::info!(persisted = report.persisted, "Catalog seeded");
                    }
                    SeedOutcome::Skipped { existing } => {
                        tracing::info!(existing, "Catalog already populated");
                    }
                    // Already logged by the coordinator; keep serving
                    SeedOutcome::Failed(_) => {}
                }
            }

            CatalogServer::new(catalog)
                .run(&config.server.bind_addr())
                .await
        }
        Commands::Reinitialize => {
            let ack = catalog.reinitialize().await?;
            println!("{} ({} ingested)", ack.message, ack.ingested);
            Ok(())
        }
        Commands::List => {
            let creatures = catalog.list_all().await?;
            println!("{}", serde_json::to_string_pretty(&creatures)?);
            Ok(())
        }
        Commands::Show { id } => {
            let creature = catalog.get(id).await?;
            println!("{}", serde_json::to_string_pretty(&creature)?);
            Ok(())
        }
    }
}

fn build_coordinator(config: &CatalogConfig) -> creature_catalog::Result<CatalogCoordinator> {
    let store = SqliteStore::open(&config.storage.store_config())?;
    let cache = creature_catalog::cache::from_settings(&config.cache)?;
    let source = PokeApiSource::new(&config.ingest.base_url, config.ingest.timeout())?;

    tracing::info!(
        db = ?store.path(),
        source = %source.base_url(),
        "Catalog components ready"
    );

    Ok(CatalogCoordinator::new(
        Arc::new(store),
        cache,
        Arc::new(source),
        IngestConfig {
            page_size: config.ingest.page_size,
        },
    ))
}

mod cli;
mod config;
mod extractor;
mod model;
mod normalizer;
mod parser;
mod pipeline;
mod storage;
mod utils;

use clap::Parser;
use cli::{format_ranking, Cli, Command};
use config::{resolve_config, AppConfig};
use model::{PricePerUnitStatus, Source};
use pipeline::IngestPipeline;
use std::process::ExitCode;
use std::sync::Arc;
use storage::{ProductRepository, SharedStorage, SqliteStorage};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = match resolve_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Initialize storage (SQLite) with async access
    let storage = match SqliteStorage::new(&config.database_path) {
        Ok(s) => SharedStorage::new(s),
        Err(e) => {
            error!("Failed to initialize storage at {}: {}", config.database_path, e);
            return ExitCode::FAILURE;
        }
    };
    info!("Using database {}", config.database_path);

    match run(cli.command, &config, storage).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(
    command: Command,
    config: &AppConfig,
    storage: SharedStorage,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Ingest { dir } => {
            let pipeline = IngestPipeline::new(Arc::new(storage));
            let report = pipeline.run_on_folder(&dir).await?;
            info!(
                "Price per unit computed for {} of {} records",
                report.count(PricePerUnitStatus::Ok),
                report.records_inserted
            );
            if report.files_failed > 0 {
                warn!("{} dataset files could not be ingested", report.files_failed);
            }
        }
        Command::IngestFile { file, source } => {
            let source = match source {
                Some(s) => s,
                None => {
                    let name = file.file_name().and_then(|n| n.to_str()).unwrap_or_default();
                    Source::from_filename(name)?
                }
            };
            let pipeline = IngestPipeline::new(Arc::new(storage));
            pipeline.run_on_file(&file, source).await?;
        }
        Command::Best { keyword, limit } => {
            let records = storage.query_best_prices(&keyword).await?;
            print!("{}", format_ranking(&keyword, &records, limit));
        }
        Command::Compare { limit } => {
            for product in &config.products {
                let records = storage.query_best_prices(product).await?;
                println!("{}", format_ranking(product, &records, limit));
            }
        }
    }
    Ok(())
}

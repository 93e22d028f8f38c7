// Ingestion driver: dataset files -> normalized records -> storage
use crate::extractor::load_dataset;
use crate::model::{ExtractError, PricePerUnitStatus, Source, StorageError};
use crate::normalizer::normalize_all;
use crate::parser::UnitParser;
use crate::storage::ProductRepository;
use futures::future::join_all;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of one ingest run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IngestReport {
    pub files_processed: usize,
    pub files_failed: usize,
    pub records_inserted: usize,
    pub status_counts: HashMap<PricePerUnitStatus, usize>,
}

impl IngestReport {
    fn merge(&mut self, other: IngestReport) {
        self.files_processed += other.files_processed;
        self.files_failed += other.files_failed;
        self.records_inserted += other.records_inserted;
        for (status, n) in other.status_counts {
            *self.status_counts.entry(status).or_default() += n;
        }
    }

    pub fn count(&self, status: PricePerUnitStatus) -> usize {
        self.status_counts.get(&status).copied().unwrap_or(0)
    }
}

pub struct IngestPipeline {
    parser: UnitParser,
    repo: Arc<dyn ProductRepository>,
}

impl IngestPipeline {
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self {
            parser: UnitParser::new(),
            repo,
        }
    }

    /// Ingests every `*.json` file in `dir`, inferring each file's source from
    /// its name. A failing file is logged and counted; the rest still run.
    pub async fn run_on_folder(&self, dir: &Path) -> Result<IngestReport, IngestError> {
        let files = dataset_files(dir).await?;
        info!("Found {} dataset files in {}", files.len(), dir.display());

        let tasks = files.iter().map(|path| async move {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            let result = match Source::from_filename(name) {
                Ok(source) => self.run_on_file(path, source).await,
                Err(e) => Err(e.into()),
            };
            (path, result)
        });

        let mut report = IngestReport::default();
        for (path, result) in join_all(tasks).await {
            match result {
                Ok(file_report) => report.merge(file_report),
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    report.files_failed += 1;
                }
            }
        }

        info!(
            "Ingest finished: {} files ok, {} failed, {} records inserted",
            report.files_processed, report.files_failed, report.records_inserted
        );
        Ok(report)
    }

    pub async fn run_on_file(&self, path: &Path, source: Source) -> Result<IngestReport, IngestError> {
        info!("Processing {} ({})", path.display(), source);
        let listings = load_dataset(path, source).await?;

        let records = normalize_all(&listings, &self.parser);
        let mut status_counts = HashMap::new();
        for record in &records {
            *status_counts.entry(record.price_per_unit_status).or_default() += 1;
        }
        for (status, n) in &status_counts {
            info!("{}: {} records {}", path.display(), n, status);
        }

        let inserted = self.repo.insert(&records).await?;
        info!("Inserted {} records from {}", inserted, path.display());

        Ok(IngestReport {
            files_processed: 1,
            files_failed: 0,
            records_inserted: inserted,
            status_counts,
        })
    }
}

async fn dataset_files(dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json && entry.file_type().await?.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

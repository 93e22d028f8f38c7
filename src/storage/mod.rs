// Storage module: persistence of normalized records.

pub mod sqlite;

pub use sqlite::SqliteStorage;

use crate::model::{NormalizedRecord, StorageError};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Storage collaborator of the ingestion pipeline.
#[async_trait::async_trait]
pub trait ProductRepository: Send + Sync {
    /// Stores the batch; a failure leaves none of it behind.
    async fn insert(&self, records: &[NormalizedRecord]) -> Result<usize, StorageError>;

    /// Latest `ok` record per source matching `keyword`, cheapest per unit first.
    async fn query_best_prices(&self, keyword: &str) -> Result<Vec<NormalizedRecord>, StorageError>;
}

/// SQLite storage shared between concurrent ingest tasks.
#[derive(Clone)]
pub struct SharedStorage {
    inner: Arc<Mutex<SqliteStorage>>,
}

impl SharedStorage {
    pub fn new(storage: SqliteStorage) -> Self {
        Self {
            inner: Arc::new(Mutex::new(storage)),
        }
    }
}

#[async_trait::async_trait]
impl ProductRepository for SharedStorage {
    async fn insert(&self, records: &[NormalizedRecord]) -> Result<usize, StorageError> {
        self.inner.lock().await.insert_records(records)
    }

    async fn query_best_prices(&self, keyword: &str) -> Result<Vec<NormalizedRecord>, StorageError> {
        self.inner.lock().await.latest_best_prices(keyword)
    }
}

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;
use async_trait::async_trait;

use crate::database::{get_db_pool, DatabasePool};
use crate::models::{NewReadingRecord, ReadingQuery, ReadingRecord};
use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;
use super::storage::DatabaseStorage;

/// Repository trait for vitals readings
#[async_trait]
pub trait ReadingRepositoryTrait: Send + Sync {
    /// Store a new reading, assigning its id
    async fn create(&self, reading: NewReadingRecord) -> Result<ReadingRecord, RepositoryError>;

    /// Get a reading by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<ReadingRecord>, RepositoryError>;

    /// Get the most recently recorded reading of a patient
    async fn get_latest(&self, patient_id: &str) -> Result<Option<ReadingRecord>, RepositoryError>;

    /// Readings matching the query, most recent first, with the unpaged total
    async fn query(&self, query: &ReadingQuery) -> Result<(Vec<ReadingRecord>, usize), RepositoryError>;

    /// Delete a reading, returning whether it existed
    async fn delete(&self, id: &str) -> Result<bool, RepositoryError>;
}

/// Repository for vitals readings.
/// Uses SQLite when a pool is available and process memory otherwise.
#[derive(Debug, Clone, Default)]
pub struct ReadingRepository {
    pool: Option<DatabasePool>,
    storage: InMemoryStorage,
}

impl ReadingRepository {
    /// Create a repository backed by the global pool, if one was initialized
    pub fn new() -> Self {
        Self {
            pool: get_db_pool().ok(),
            storage: InMemoryStorage::new(),
        }
    }

    /// Create a repository backed by the given pool
    pub fn with_pool(pool: DatabasePool) -> Self {
        Self {
            pool: Some(pool),
            storage: InMemoryStorage::new(),
        }
    }

    /// Create a repository that never touches a database
    pub fn in_memory() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReadingRepositoryTrait for ReadingRepository {
    async fn create(&self, reading: NewReadingRecord) -> Result<ReadingRecord, RepositoryError> {
        let record = reading.into_record(Uuid::new_v4().to_string(), Utc::now());

        match &self.pool {
            Some(pool) => {
                DatabaseStorage::store_reading(pool, &record).await?;
                Ok(record)
            }
            None => {
                debug!("Database not configured, storing reading {} in memory", record.id);
                self.storage.store_reading(&record).await
            }
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<ReadingRecord>, RepositoryError> {
        match &self.pool {
            Some(pool) => DatabaseStorage::get_reading(pool, id).await,
            None => self.storage.get_reading(id).await,
        }
    }

    async fn get_latest(&self, patient_id: &str) -> Result<Option<ReadingRecord>, RepositoryError> {
        let (readings, _) = self.query(&ReadingQuery::recent(patient_id, 1)).await?;
        Ok(readings.into_iter().next())
    }

    async fn query(&self, query: &ReadingQuery) -> Result<(Vec<ReadingRecord>, usize), RepositoryError> {
        match &self.pool {
            Some(pool) => DatabaseStorage::query_readings(pool, query).await,
            None => self.storage.query_readings(query).await,
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        match &self.pool {
            Some(pool) => DatabaseStorage::delete_reading(pool, id).await,
            None => self.storage.delete_reading(id).await,
        }
    }
}

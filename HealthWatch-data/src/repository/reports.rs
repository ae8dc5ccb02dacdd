use tracing::debug;
use async_trait::async_trait;

use crate::database::{get_db_pool, DatabasePool};
use crate::models::{ReportQuery, ReportRecord};
use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;
use super::storage::DatabaseStorage;

/// Repository trait for medical reports
#[async_trait]
pub trait ReportRepositoryTrait: Send + Sync {
    /// Store a new report
    async fn insert(&self, report: ReportRecord) -> Result<ReportRecord, RepositoryError>;

    /// Get a report by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<ReportRecord>, RepositoryError>;

    /// Filtered page of reports, newest upload first, with the unpaged total
    async fn query(&self, query: &ReportQuery) -> Result<(Vec<ReportRecord>, usize), RepositoryError>;

    /// Replace a stored report
    async fn update(&self, report: ReportRecord) -> Result<ReportRecord, RepositoryError>;

    /// Delete a report, returning whether it existed
    async fn delete(&self, id: &str) -> Result<bool, RepositoryError>;
}

/// Repository for medical reports.
/// Uses SQLite when a pool is available and process memory otherwise.
#[derive(Debug, Clone, Default)]
pub struct ReportRepository {
    pool: Option<DatabasePool>,
    storage: InMemoryStorage,
}

impl ReportRepository {
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
impl ReportRepositoryTrait for ReportRepository {
    async fn insert(&self, report: ReportRecord) -> Result<ReportRecord, RepositoryError> {
        match &self.pool {
            Some(pool) => {
                DatabaseStorage::store_report(pool, &report).await?;
                Ok(report)
            }
            None => {
                debug!("Database not configured, storing report {} in memory", report.id);
                self.storage.store_report(&report).await
            }
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<ReportRecord>, RepositoryError> {
        match &self.pool {
            Some(pool) => DatabaseStorage::get_report(pool, id).await,
            None => self.storage.get_report(id).await,
        }
    }

    async fn query(&self, query: &ReportQuery) -> Result<(Vec<ReportRecord>, usize), RepositoryError> {
        match &self.pool {
            Some(pool) => DatabaseStorage::query_reports(pool, query).await,
            None => self.storage.query_reports(query).await,
        }
    }

    async fn update(&self, report: ReportRecord) -> Result<ReportRecord, RepositoryError> {
        let found = match &self.pool {
            Some(pool) => DatabaseStorage::update_report(pool, &report).await?,
            None => self.storage.update_report(&report).await?,
        };
        if !found {
            return Err(RepositoryError::NotFound(report.id));
        }
        Ok(report)
    }

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        match &self.pool {
            Some(pool) => DatabaseStorage::delete_report(pool, id).await,
            None => self.storage.delete_report(id).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use crate::database::create_in_memory_sqlite_pool;
    use crate::models::FindingRecord;

    fn report(id: &str, patient_id: &str, report_type: &str, hours: i64) -> ReportRecord {
        ReportRecord {
            id: id.to_string(),
            patient_id: patient_id.to_string(),
            report_type: report_type.to_string(),
            file_url: Some(format!("/uploads/{}.pdf", id)),
            file_name: Some(format!("{}.pdf", id)),
            file_type: Some("pdf".to_string()),
            status: "uploaded".to_string(),
            data: serde_json::json!({}),
            findings: vec![],
            ocr_confidence: None,
            processing_time_ms: None,
            error_message: None,
            uploaded_at: Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap() + Duration::hours(hours),
            processed_at: None,
            notes: None,
        }
    }

    async fn exercise(repo: ReportRepository) {
        repo.insert(report("r1", "p1", "blood_test", 0)).await.unwrap();
        repo.insert(report("r2", "p1", "lipid_profile", 1)).await.unwrap();
        repo.insert(report("r3", "p2", "blood_test", 2)).await.unwrap();

        let (all, total) = repo.query(&ReportQuery::for_patient("p1")).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(all[0].id, "r2");

        let mut completed = repo.get_by_id("r1").await.unwrap().unwrap();
        completed.status = "completed".to_string();
        completed.findings.push(FindingRecord {
            parameter: "Hemoglobin".to_string(),
            value: 10.5,
            normal_range: "12-16 g/dL".to_string(),
            severity: "abnormal".to_string(),
            message: "Low hemoglobin - Anemia suspected".to_string(),
        });
        repo.update(completed.clone()).await.unwrap();

        let by_status = ReportQuery {
            status: Some("completed".to_string()),
            ..ReportQuery::for_patient("p1")
        };
        let (found, total) = repo.query(&by_status).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(found[0], completed);

        let by_type = ReportQuery {
            report_type: Some("blood_test".to_string()),
            ..ReportQuery::for_patient("p2")
        };
        let (_, total) = repo.query(&by_type).await.unwrap();
        assert_eq!(total, 1);

        assert!(repo.delete("r2").await.unwrap());
        assert!(repo.get_by_id("r2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_memory_reports() {
        exercise(ReportRepository::in_memory()).await;
    }

    #[tokio::test]
    async fn test_sqlite_reports() {
        let pool = create_in_memory_sqlite_pool().unwrap();
        exercise(ReportRepository::with_pool(pool)).await;
    }

    #[tokio::test]
    async fn test_update_missing_report_is_not_found() {
        let repo = ReportRepository::in_memory();
        let result = repo.update(report("ghost", "p1", "other", 0)).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }
}

use chrono::{DateTime, Utc};
use tracing::debug;
use async_trait::async_trait;

use crate::database::{get_db_pool, DatabasePool};
use crate::models::{AlertQuery, AlertRecord};
use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;
use super::storage::DatabaseStorage;

/// Repository trait for alerts
#[async_trait]
pub trait AlertRepositoryTrait: Send + Sync {
    /// Store alerts as one unit
    async fn insert_many(&self, alerts: Vec<AlertRecord>) -> Result<Vec<AlertRecord>, RepositoryError>;

    /// Get an alert by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<AlertRecord>, RepositoryError>;

    /// Filtered, ordered page of alerts with the unpaged total
    async fn query(&self, query: &AlertQuery) -> Result<(Vec<AlertRecord>, usize), RepositoryError>;

    /// Replace a stored alert
    async fn update(&self, alert: AlertRecord) -> Result<AlertRecord, RepositoryError>;

    /// Replace several stored alerts as one unit, returning how many matched
    async fn update_many(&self, alerts: Vec<AlertRecord>) -> Result<usize, RepositoryError>;

    /// Alerts awaiting external dispatch, highest priority first
    async fn list_pending_notifications(&self, patient_id: Option<&str>) -> Result<Vec<AlertRecord>, RepositoryError>;

    /// Delete an alert, returning whether it existed
    async fn delete(&self, id: &str) -> Result<bool, RepositoryError>;

    /// Delete alerts that expired at or before `now`
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, RepositoryError>;
}

/// Repository for alerts.
/// Uses SQLite when a pool is available and process memory otherwise.
#[derive(Debug, Clone, Default)]
pub struct AlertRepository {
    pool: Option<DatabasePool>,
    storage: InMemoryStorage,
}

impl AlertRepository {
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
impl AlertRepositoryTrait for AlertRepository {
    async fn insert_many(&self, alerts: Vec<AlertRecord>) -> Result<Vec<AlertRecord>, RepositoryError> {
        if alerts.is_empty() {
            return Ok(alerts);
        }

        match &self.pool {
            Some(pool) => DatabaseStorage::store_alerts(pool, &alerts).await?,
            None => {
                debug!("Database not configured, storing {} alerts in memory", alerts.len());
                self.storage.store_alerts(&alerts).await?
            }
        }
        Ok(alerts)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<AlertRecord>, RepositoryError> {
        match &self.pool {
            Some(pool) => DatabaseStorage::get_alert(pool, id).await,
            None => self.storage.get_alert(id).await,
        }
    }

    async fn query(&self, query: &AlertQuery) -> Result<(Vec<AlertRecord>, usize), RepositoryError> {
        match &self.pool {
            Some(pool) => DatabaseStorage::query_alerts(pool, query).await,
            None => self.storage.query_alerts(query).await,
        }
    }

    async fn update(&self, alert: AlertRecord) -> Result<AlertRecord, RepositoryError> {
        let updated = self.update_many(vec![alert.clone()]).await?;
        if updated == 0 {
            return Err(RepositoryError::NotFound(alert.id));
        }
        Ok(alert)
    }

    async fn update_many(&self, alerts: Vec<AlertRecord>) -> Result<usize, RepositoryError> {
        if alerts.is_empty() {
            return Ok(0);
        }

        match &self.pool {
            Some(pool) => DatabaseStorage::update_alerts(pool, &alerts).await,
            None => self.storage.update_alerts(&alerts).await,
        }
    }

    async fn list_pending_notifications(&self, patient_id: Option<&str>) -> Result<Vec<AlertRecord>, RepositoryError> {
        match &self.pool {
            Some(pool) => DatabaseStorage::list_pending_notifications(pool, patient_id).await,
            None => self.storage.list_pending_notifications(patient_id).await,
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        match &self.pool {
            Some(pool) => DatabaseStorage::delete_alert(pool, id).await,
            None => self.storage.delete_alert(id).await,
        }
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, RepositoryError> {
        match &self.pool {
            Some(pool) => DatabaseStorage::delete_expired_alerts(pool, now).await,
            None => self.storage.delete_expired_alerts(now).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use crate::database::create_in_memory_sqlite_pool;
    use crate::models::AlertSortField;

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn alert(id: &str, patient_id: &str, severity: &str, priority: u8, minutes: i64) -> AlertRecord {
        AlertRecord {
            id: id.to_string(),
            patient_id: patient_id.to_string(),
            reading_id: None,
            report_id: None,
            alert_type: "reading_abnormal".to_string(),
            severity: severity.to_string(),
            priority,
            title: format!("alert {}", id),
            message: "message".to_string(),
            details: None,
            recommendations: vec![],
            suggested_tests: vec![],
            is_read: false,
            is_acknowledged: false,
            acknowledged_at: None,
            notification_sent: false,
            notification_sent_at: None,
            family_notified: false,
            family_notified_at: None,
            expires_at: None,
            created_at: base_time() + Duration::minutes(minutes),
        }
    }

    async fn seed(repo: &AlertRepository) {
        let mut expiring = alert("d", "p1", "info", 3, 30);
        expiring.expires_at = Some(base_time() + Duration::hours(1));

        repo.insert_many(vec![
            alert("a", "p1", "warning", 5, 0),
            alert("b", "p1", "danger", 10, 10),
            alert("c", "p2", "danger", 10, 20),
            expiring,
        ]).await.unwrap();
    }

    async fn exercise(repo: AlertRepository) {
        seed(&repo).await;

        let (newest_first, total) = repo.query(&AlertQuery::for_patient("p1")).await.unwrap();
        assert_eq!(total, 3);
        let ids: Vec<&str> = newest_first.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["d", "b", "a"]);

        let by_severity = AlertQuery {
            sort_by: AlertSortField::Severity,
            ..AlertQuery::for_patient("p1")
        };
        let (sorted, _) = repo.query(&by_severity).await.unwrap();
        assert_eq!(sorted[0].id, "b");

        let danger_only = AlertQuery {
            severity: Some("danger".to_string()),
            ..AlertQuery::for_patient("p1")
        };
        let (danger, total) = repo.query(&danger_only).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(danger[0].id, "b");

        let paged = AlertQuery {
            limit: Some(1),
            offset: Some(1),
            ..AlertQuery::for_patient("p1")
        };
        let (page, total) = repo.query(&paged).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, "b");

        let active = AlertQuery {
            active_at: Some(base_time() + Duration::hours(2)),
            ..AlertQuery::for_patient("p1")
        };
        let (_, total) = repo.query(&active).await.unwrap();
        assert_eq!(total, 2);

        let mut read = repo.get_by_id("a").await.unwrap().unwrap();
        read.is_read = true;
        repo.update(read).await.unwrap();
        let unread = AlertQuery {
            is_read: Some(false),
            ..AlertQuery::for_patient("p1")
        };
        let (_, total) = repo.query(&unread).await.unwrap();
        assert_eq!(total, 2);

        let pending = repo.list_pending_notifications(Some("p1")).await.unwrap();
        assert_eq!(pending.len(), 3);
        assert_eq!(pending[0].id, "b");

        let mut sent = pending[0].clone();
        sent.notification_sent = true;
        sent.family_notified = true;
        repo.update(sent.clone()).await.unwrap();
        let pending = repo.list_pending_notifications(Some("p1")).await.unwrap();
        assert_eq!(pending.len(), 3, "family notification still outstanding");

        sent.family_notified_at = Some(base_time());
        repo.update(sent).await.unwrap();
        let pending = repo.list_pending_notifications(Some("p1")).await.unwrap();
        assert_eq!(pending.len(), 2);

        let purged = repo.delete_expired(base_time() + Duration::hours(2)).await.unwrap();
        assert_eq!(purged, 1);
        assert!(repo.get_by_id("d").await.unwrap().is_none());

        assert!(repo.delete("c").await.unwrap());
        assert!(!repo.delete("c").await.unwrap());
    }

    #[tokio::test]
    async fn test_in_memory_alerts() {
        exercise(AlertRepository::in_memory()).await;
    }

    #[tokio::test]
    async fn test_sqlite_alerts() {
        let pool = create_in_memory_sqlite_pool().unwrap();
        exercise(AlertRepository::with_pool(pool)).await;
    }

    #[tokio::test]
    async fn test_update_missing_alert_is_not_found() {
        let repo = AlertRepository::in_memory();
        let result = repo.update(alert("missing", "p1", "info", 3, 0)).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(id)) if id == "missing"));
    }
}

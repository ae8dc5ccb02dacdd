use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, instrument};

use health_watch_data::models::ReadingQuery;
use health_watch_data::repository::{
    AlertRepository, AlertRepositoryTrait, ReadingRepository, ReadingRepositoryTrait,
};

use crate::config::EngineConfig;
use crate::engine::trends::{self, TrendSummary};
use crate::engine::vitals;
use crate::engine::wellness::{health_status_message, wellness_suggestions, HealthStatusMessage, Suggestion};
use crate::engine::AlertFactory;
use crate::entities::alert::Alert;
use crate::entities::conversions;
use crate::entities::reading::{AbnormalityStatus, Reading, ReadingSubmission};
use crate::errors::{map_repo_error, EngineError, ServiceError};
use crate::services::{corrupt_record, parse_id, Pagination};

const DEFAULT_PAGE_SIZE: usize = 30;

/// Result of submitting a reading
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ReadingOutcome {
    pub reading: Reading,
    pub abnormality: AbnormalityStatus,
    #[cfg_attr(feature = "with-api", schema(value_type = Object))]
    pub health_status: HealthStatusMessage,
    #[cfg_attr(feature = "with-api", schema(value_type = Vec<Object>))]
    pub suggestions: Vec<Suggestion>,
    /// Alerts created for this reading, at most one
    pub alerts: Vec<Alert>,
}

/// Date range and paging for reading listings
#[derive(Debug, Clone, Default)]
pub struct ReadingFilter {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// One page of readings with statistics over the recent window
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
pub struct ReadingPage {
    pub readings: Vec<Reading>,
    pub pagination: Pagination,
    pub stats: Option<TrendSummary>,
}

/// Trait for reading service operations
#[async_trait]
pub trait ReadingServiceTrait: Send + Sync {
    /// Validate, classify and store a reading, raising an alert when it is abnormal.
    ///
    /// The reading and its alert are stored together: if the alert cannot be
    /// stored the reading is removed again and the error returned, so a retry
    /// does not leave a duplicate reading behind.
    async fn submit_reading(&self, patient_id: &str, submission: ReadingSubmission)
        -> Result<ReadingOutcome, ServiceError>;

    async fn get_reading(&self, id: &str) -> Result<Reading, ServiceError>;

    async fn get_latest_reading(&self, patient_id: &str) -> Result<Reading, ServiceError>;

    /// Readings newest first, with trend statistics
    async fn list_readings(&self, patient_id: &str, filter: ReadingFilter) -> Result<ReadingPage, ServiceError>;

    /// Trend statistics over the most recent readings, `None` without readings
    async fn get_trends(&self, patient_id: &str) -> Result<Option<TrendSummary>, ServiceError>;

    /// Delete a reading owned by `patient_id`
    async fn delete_reading(&self, patient_id: &str, id: &str) -> Result<(), ServiceError>;
}

/// Reading service for domain logic
pub struct ReadingService<R: ReadingRepositoryTrait, A: AlertRepositoryTrait> {
    readings: R,
    alerts: A,
    factory: AlertFactory,
    trend_window: usize,
}

impl<R: ReadingRepositoryTrait, A: AlertRepositoryTrait> ReadingService<R, A> {
    pub fn new(readings: R, alerts: A, config: &EngineConfig) -> Self {
        Self {
            readings,
            alerts,
            factory: AlertFactory::new(config.alert_ttl),
            trend_window: config.trend_window,
        }
    }

    async fn store_alerts(&self, alerts: Vec<Alert>) -> Result<Vec<Alert>, ServiceError> {
        if alerts.is_empty() {
            return Ok(alerts);
        }
        let records = alerts.iter().map(conversions::convert_to_data_alert).collect();
        self.alerts.insert_many(records).await.map_err(|e| {
            error!("Failed to store reading alerts: {}", e);
            map_repo_error(e)
        })?;
        Ok(alerts)
    }
}

#[async_trait]
impl<R: ReadingRepositoryTrait, A: AlertRepositoryTrait> ReadingServiceTrait for ReadingService<R, A> {
    #[instrument(skip(self, submission))]
    async fn submit_reading(&self, patient_id: &str, submission: ReadingSubmission)
        -> Result<ReadingOutcome, ServiceError>
    {
        let patient = parse_id(patient_id)?;
        let vitals = submission.to_vitals()?;
        let status = vitals::classify(&vitals);
        let recorded_at = submission.recorded_at.unwrap_or_else(Utc::now);

        let new_record = conversions::convert_to_data_new_reading(
            patient,
            &vitals,
            &status,
            submission.symptoms,
            submission.notes,
            recorded_at,
        );
        let record = self.readings.create(new_record).await.map_err(map_repo_error)?;
        let reading = conversions::convert_to_domain_reading(record).map_err(corrupt_record)?;

        let alerts = match self.store_alerts(self.factory.for_reading(&reading).into_iter().collect()).await {
            Ok(alerts) => alerts,
            Err(err) => {
                let id = reading.id.to_string();
                if let Err(e) = self.readings.delete(&id).await {
                    error!(reading_id = %id, "Failed to roll back reading after alert failure: {}", e);
                }
                return Err(err);
            }
        };

        info!(reading_id = %reading.id, level = %status.level, alerts = alerts.len(), "Reading stored");

        Ok(ReadingOutcome {
            health_status: health_status_message(status.level),
            suggestions: wellness_suggestions(&status.flags),
            abnormality: status,
            reading,
            alerts,
        })
    }

    #[instrument(skip(self))]
    async fn get_reading(&self, id: &str) -> Result<Reading, ServiceError> {
        parse_id(id)?;
        let record = self.readings.get_by_id(id)
            .await
            .map_err(map_repo_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Reading with ID {} not found", id)))?;
        conversions::convert_to_domain_reading(record).map_err(corrupt_record)
    }

    #[instrument(skip(self))]
    async fn get_latest_reading(&self, patient_id: &str) -> Result<Reading, ServiceError> {
        parse_id(patient_id)?;
        let record = self.readings.get_latest(patient_id)
            .await
            .map_err(map_repo_error)?
            .ok_or_else(|| ServiceError::NotFound("No readings found for this patient".to_string()))?;
        conversions::convert_to_domain_reading(record).map_err(corrupt_record)
    }

    #[instrument(skip(self, filter))]
    async fn list_readings(&self, patient_id: &str, filter: ReadingFilter) -> Result<ReadingPage, ServiceError> {
        parse_id(patient_id)?;
        if let (Some(start), Some(end)) = (filter.start, filter.end) {
            if start > end {
                return Err(EngineError::Validation("startDate must not be after endDate".to_string()).into());
            }
        }

        let (page, limit) = Pagination::request(filter.page, filter.limit, DEFAULT_PAGE_SIZE);
        let query = ReadingQuery {
            start: filter.start,
            end: filter.end,
            limit: Some(limit),
            offset: Some(Pagination::offset(page, limit)),
            ..ReadingQuery::for_patient(patient_id)
        };

        let (records, total) = self.readings.query(&query).await.map_err(map_repo_error)?;
        let readings = records
            .into_iter()
            .map(conversions::convert_to_domain_reading)
            .collect::<Result<Vec<_>, _>>()
            .map_err(corrupt_record)?;

        Ok(ReadingPage {
            readings,
            pagination: Pagination::new(total, page, limit),
            stats: self.get_trends(patient_id).await?,
        })
    }

    #[instrument(skip(self))]
    async fn get_trends(&self, patient_id: &str) -> Result<Option<TrendSummary>, ServiceError> {
        parse_id(patient_id)?;
        let query = ReadingQuery::recent(patient_id, self.trend_window);
        let (records, _) = self.readings.query(&query).await.map_err(map_repo_error)?;
        let history = records
            .into_iter()
            .map(conversions::convert_to_domain_reading)
            .collect::<Result<Vec<_>, _>>()
            .map_err(corrupt_record)?;
        Ok(trends::summarize(&history, self.trend_window))
    }

    #[instrument(skip(self))]
    async fn delete_reading(&self, patient_id: &str, id: &str) -> Result<(), ServiceError> {
        let reading = self.get_reading(id).await?;
        if reading.patient_id != parse_id(patient_id)? {
            return Err(ServiceError::Forbidden("Not authorized to delete this reading".to_string()));
        }

        if !self.readings.delete(id).await.map_err(map_repo_error)? {
            return Err(ServiceError::NotFound(format!("Reading with ID {} not found", id)));
        }
        info!(reading_id = %id, "Reading deleted");
        Ok(())
    }
}

/// Create a default reading service using the repositories from the data layer
pub fn create_default_reading_service(config: &EngineConfig) -> impl ReadingServiceTrait {
    ReadingService::new(ReadingRepository::new(), AlertRepository::new(), config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::severity::{AlertSeverity, VitalLevel};
    use crate::entities::reading::BloodPressureInput;
    use chrono::Duration;
    use health_watch_data::models::{AlertQuery, AlertRecord, NewReadingRecord, ReadingRecord};
    use health_watch_data::repository::RepositoryError;
    use mockall::mock;
    use uuid::Uuid;

    mock! {
        pub ReadingRepo {}

        #[async_trait]
        impl ReadingRepositoryTrait for ReadingRepo {
            async fn create(&self, reading: NewReadingRecord) -> Result<ReadingRecord, RepositoryError>;
            async fn get_by_id(&self, id: &str) -> Result<Option<ReadingRecord>, RepositoryError>;
            async fn get_latest(&self, patient_id: &str) -> Result<Option<ReadingRecord>, RepositoryError>;
            async fn query(&self, query: &ReadingQuery) -> Result<(Vec<ReadingRecord>, usize), RepositoryError>;
            async fn delete(&self, id: &str) -> Result<bool, RepositoryError>;
        }
    }

    mock! {
        pub AlertRepo {}

        #[async_trait]
        impl AlertRepositoryTrait for AlertRepo {
            async fn insert_many(&self, alerts: Vec<AlertRecord>) -> Result<Vec<AlertRecord>, RepositoryError>;
            async fn get_by_id(&self, id: &str) -> Result<Option<AlertRecord>, RepositoryError>;
            async fn query(&self, query: &AlertQuery) -> Result<(Vec<AlertRecord>, usize), RepositoryError>;
            async fn update(&self, alert: AlertRecord) -> Result<AlertRecord, RepositoryError>;
            async fn update_many(&self, alerts: Vec<AlertRecord>) -> Result<usize, RepositoryError>;
            fn list_pending_notifications<'life0, 'life1, 'async_trait>(&'life0 self, patient_id: Option<&'life1 str>) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<AlertRecord>, RepositoryError>> + Send + 'async_trait>> where 'life0: 'async_trait, 'life1: 'async_trait, Self: 'async_trait;
            async fn delete(&self, id: &str) -> Result<bool, RepositoryError>;
            async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, RepositoryError>;
        }
    }

    fn submission(systolic: i32, diastolic: i32, heart_rate: i32, sugar: f64, sleep_hours: f64) -> ReadingSubmission {
        ReadingSubmission {
            bp: Some(BloodPressureInput { systolic: Some(systolic), diastolic: Some(diastolic) }),
            heart_rate: Some(heart_rate),
            sugar: Some(sugar),
            sleep_hours: Some(sleep_hours),
            weight: Some(70.0),
            symptoms: vec!["headache".to_string()],
            notes: None,
            recorded_at: None,
        }
    }

    fn service() -> (ReadingService<ReadingRepository, AlertRepository>, AlertRepository) {
        let alerts = AlertRepository::in_memory();
        let service = ReadingService::new(ReadingRepository::in_memory(), alerts.clone(), &EngineConfig::default());
        (service, alerts)
    }

    #[tokio::test]
    async fn test_normal_reading_creates_no_alert() {
        let (service, alerts) = service();
        let patient = Uuid::new_v4().to_string();

        let outcome = service.submit_reading(&patient, submission(120, 80, 75, 100.0, 7.0)).await.unwrap();
        assert_eq!(outcome.abnormality.level, VitalLevel::Normal);
        assert_eq!(outcome.health_status.title, "All Good!");
        assert!(outcome.suggestions.is_empty());
        assert!(outcome.alerts.is_empty());

        let (_, total) = alerts.query(&AlertQuery::for_patient(patient)).await.unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_danger_reading_stores_escalated_alert() {
        let (service, alerts) = service();
        let patient = Uuid::new_v4().to_string();

        let outcome = service.submit_reading(&patient, submission(165, 105, 110, 190.0, 4.0)).await.unwrap();
        assert_eq!(outcome.abnormality.level, VitalLevel::Danger);
        assert_eq!(outcome.reading.symptoms, vec!["headache".to_string()]);
        assert_eq!(outcome.alerts.len(), 1);
        assert_eq!(outcome.alerts[0].severity, AlertSeverity::Danger);

        let (stored, _) = alerts.query(&AlertQuery::for_patient(patient)).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert!(stored[0].family_notified);
        assert_eq!(stored[0].reading_id, Some(outcome.reading.id.to_string()));
    }

    #[tokio::test]
    async fn test_incomplete_submission_is_rejected_before_storage() {
        let mut repo = MockReadingRepo::new();
        repo.expect_create().never();
        let service = ReadingService::new(repo, AlertRepository::in_memory(), &EngineConfig::default());

        let mut input = submission(120, 80, 75, 100.0, 7.0);
        input.sugar = None;
        let err = service.submit_reading(&Uuid::new_v4().to_string(), input).await.unwrap_err();
        assert!(matches!(err, ServiceError::Engine(EngineError::IncompleteInput(msg)) if msg.contains("sugar")));
    }

    #[tokio::test]
    async fn test_repository_failure_is_reported() {
        let mut repo = MockReadingRepo::new();
        repo.expect_create()
            .times(1)
            .returning(|_| Err(RepositoryError::Lock("poisoned".to_string())));
        let service = ReadingService::new(repo, AlertRepository::in_memory(), &EngineConfig::default());

        let err = service
            .submit_reading(&Uuid::new_v4().to_string(), submission(120, 80, 75, 100.0, 7.0))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Repository(msg) if msg.contains("poisoned")));
    }

    #[tokio::test]
    async fn test_alert_failure_removes_reading() {
        let mut alerts = MockAlertRepo::new();
        alerts
            .expect_insert_many()
            .times(1)
            .returning(|_| Err(RepositoryError::MutexLock("poisoned".to_string())));
        let readings = ReadingRepository::in_memory();
        let service = ReadingService::new(readings.clone(), alerts, &EngineConfig::default());
        let patient = Uuid::new_v4().to_string();

        let err = service.submit_reading(&patient, submission(185, 95, 75, 100.0, 7.0)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Repository(_)));

        let (stored, total) = readings.query(&ReadingQuery::for_patient(patient)).await.unwrap();
        assert_eq!(total, 0);
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn test_list_with_range_and_stats() {
        let (service, _) = service();
        let patient = Uuid::new_v4().to_string();
        let now = Utc::now();

        for days_ago in 0..8 {
            let mut input = submission(120, 80, 75, 100.0, 7.0);
            input.recorded_at = Some(now - Duration::days(days_ago));
            service.submit_reading(&patient, input).await.unwrap();
        }

        let filter = ReadingFilter {
            start: Some(now - Duration::days(3) - Duration::minutes(1)),
            page: Some(1),
            limit: Some(2),
            ..Default::default()
        };
        let page = service.list_readings(&patient, filter).await.unwrap();
        assert_eq!(page.pagination.total, 4);
        assert_eq!(page.pagination.pages, 2);
        assert_eq!(page.readings.len(), 2);
        assert!(page.readings[0].recorded_at > page.readings[1].recorded_at);

        let stats = page.stats.unwrap();
        assert_eq!(stats.total_readings, 8);
        assert_eq!(stats.abnormal_count.normal, 8);

        let latest = service.get_latest_reading(&patient).await.unwrap();
        assert_eq!(latest.recorded_at, now);
    }

    #[tokio::test]
    async fn test_page_past_the_end_is_empty() {
        let (service, _) = service();
        let patient = Uuid::new_v4().to_string();
        service.submit_reading(&patient, submission(120, 80, 75, 100.0, 7.0)).await.unwrap();

        let filter = ReadingFilter {
            page: Some(usize::MAX),
            limit: Some(100),
            ..Default::default()
        };
        let page = service.list_readings(&patient, filter).await.unwrap();
        assert!(page.readings.is_empty());
        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.pagination.page, usize::MAX);
    }

    #[tokio::test]
    async fn test_inverted_range_is_rejected() {
        let (service, _) = service();
        let now = Utc::now();
        let filter = ReadingFilter {
            start: Some(now),
            end: Some(now - Duration::days(1)),
            ..Default::default()
        };
        let err = service.list_readings(&Uuid::new_v4().to_string(), filter).await.unwrap_err();
        assert!(matches!(err, ServiceError::Engine(EngineError::Validation(_))));
    }

    #[tokio::test]
    async fn test_only_owner_can_delete() {
        let (service, _) = service();
        let owner = Uuid::new_v4().to_string();
        let outcome = service.submit_reading(&owner, submission(120, 80, 75, 100.0, 7.0)).await.unwrap();
        let id = outcome.reading.id.to_string();

        let err = service.delete_reading(&Uuid::new_v4().to_string(), &id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        service.delete_reading(&owner, &id).await.unwrap();
        assert!(matches!(service.get_reading(&id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_latest_without_readings_is_not_found() {
        let (service, _) = service();
        let err = service.get_latest_reading(&Uuid::new_v4().to_string()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert!(service.get_trends(&Uuid::new_v4().to_string()).await.unwrap().is_none());
    }
}

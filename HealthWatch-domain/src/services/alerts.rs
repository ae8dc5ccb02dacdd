use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::try_join;
use serde::Serialize;
use tracing::{info, instrument, warn};

use health_watch_data::models::{AlertQuery, AlertSortField};
use health_watch_data::repository::{AlertRepository, AlertRepositoryTrait};

use crate::config::EngineConfig;
use crate::engine::alerts::lifecycle;
use crate::engine::severity::AlertSeverity;
use crate::engine::AlertFactory;
use crate::entities::alert::{Alert, AlertType, ManualAlert};
use crate::entities::conversions;
use crate::errors::{map_repo_error, EngineError, ServiceError};
use crate::services::{corrupt_record, parse_id, Pagination};

const DEFAULT_PAGE_SIZE: usize = 50;

/// Filters, ordering and paging for alert listings
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub severity: Option<AlertSeverity>,
    pub alert_type: Option<AlertType>,
    pub is_read: Option<bool>,
    pub sort_by: AlertSortField,
    /// Newest, highest or most severe first unless set to `false`
    pub descending: Option<bool>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// Active alerts per severity for one patient
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
pub struct SeverityCounts {
    pub info: usize,
    pub warning: usize,
    pub danger: usize,
    pub critical: usize,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AlertSummary {
    pub unread_count: usize,
    pub by_severity: SeverityCounts,
}

/// One page of alerts with patient-wide counts
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
pub struct AlertPage {
    pub alerts: Vec<Alert>,
    pub pagination: Pagination,
    pub summary: AlertSummary,
}

/// Trait for alert service operations
#[async_trait]
pub trait AlertServiceTrait: Send + Sync {
    async fn list_alerts(&self, patient_id: &str, filter: AlertFilter) -> Result<AlertPage, ServiceError>;

    /// Get an alert; expired alerts are reported as not found
    async fn get_alert(&self, id: &str) -> Result<Alert, ServiceError>;

    async fn create_manual_alert(&self, patient_id: &str, input: ManualAlert) -> Result<Alert, ServiceError>;

    async fn mark_read(&self, id: &str) -> Result<Alert, ServiceError>;

    /// Acknowledge an alert, reading it if it was unread
    async fn acknowledge(&self, id: &str) -> Result<Alert, ServiceError>;

    /// Mark every unread alert of a patient read, returning how many changed
    async fn mark_all_read(&self, patient_id: &str) -> Result<usize, ServiceError>;

    async fn mark_notification_sent(&self, id: &str) -> Result<Alert, ServiceError>;

    async fn mark_family_notified(&self, id: &str) -> Result<Alert, ServiceError>;

    /// Alerts waiting for the dispatch collaborator, optionally for one patient
    async fn pending_notifications(&self, patient_id: Option<&str>) -> Result<Vec<Alert>, ServiceError>;

    async fn delete_alert(&self, id: &str) -> Result<(), ServiceError>;

    /// Delete every alert that expired at or before `now`
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, ServiceError>;
}

/// Alert service for domain logic
pub struct AlertService<A: AlertRepositoryTrait> {
    repository: A,
    factory: AlertFactory,
}

impl<A: AlertRepositoryTrait> AlertService<A> {
    pub fn new(repository: A, config: &EngineConfig) -> Self {
        Self {
            repository,
            factory: AlertFactory::new(config.alert_ttl),
        }
    }

    async fn count(&self, query: AlertQuery) -> Result<usize, ServiceError> {
        let query = AlertQuery { limit: Some(0), ..query };
        let (_, total) = self.repository.query(&query).await.map_err(map_repo_error)?;
        Ok(total)
    }

    /// Load an alert, apply a lifecycle transition and persist it if it changed
    async fn transition<F>(&self, id: &str, apply: F) -> Result<Alert, ServiceError>
    where
        F: FnOnce(&mut Alert, DateTime<Utc>) -> bool + Send,
    {
        let mut alert = self.get_alert(id).await?;
        if apply(&mut alert, Utc::now()) {
            self.repository
                .update(conversions::convert_to_data_alert(&alert))
                .await
                .map_err(map_repo_error)?;
        }
        Ok(alert)
    }
}

fn validate_manual(input: &ManualAlert) -> Result<(), EngineError> {
    let mut problems = Vec::new();
    if input.title.trim().is_empty() {
        problems.push("title: Title is required");
    }
    if input.message.trim().is_empty() {
        problems.push("message: Message is required");
    }
    if problems.is_empty() {
        Ok(())
    } else {
        Err(EngineError::Validation(problems.join("; ")))
    }
}

#[async_trait]
impl<A: AlertRepositoryTrait> AlertServiceTrait for AlertService<A> {
    #[instrument(skip(self, filter))]
    async fn list_alerts(&self, patient_id: &str, filter: AlertFilter) -> Result<AlertPage, ServiceError> {
        parse_id(patient_id)?;
        let now = Utc::now();
        let (page, limit) = Pagination::request(filter.page, filter.limit, DEFAULT_PAGE_SIZE);

        let active = AlertQuery {
            active_at: Some(now),
            ..AlertQuery::for_patient(patient_id)
        };
        let query = AlertQuery {
            severity: filter.severity.map(|s| s.as_str().to_string()),
            alert_type: filter.alert_type.map(|t| t.as_str().to_string()),
            is_read: filter.is_read,
            sort_by: filter.sort_by,
            descending: filter.descending.unwrap_or(true),
            limit: Some(limit),
            offset: Some(Pagination::offset(page, limit)),
            ..active.clone()
        };

        let (records, total) = self.repository.query(&query).await.map_err(map_repo_error)?;
        let alerts = records
            .into_iter()
            .map(conversions::convert_to_domain_alert)
            .collect::<Result<Vec<_>, _>>()
            .map_err(corrupt_record)?;

        let severity_count = |severity: AlertSeverity| AlertQuery {
            severity: Some(severity.as_str().to_string()),
            ..active.clone()
        };
        let (unread_count, info, warning, danger, critical) = try_join!(
            self.count(AlertQuery { is_read: Some(false), ..active.clone() }),
            self.count(severity_count(AlertSeverity::Info)),
            self.count(severity_count(AlertSeverity::Warning)),
            self.count(severity_count(AlertSeverity::Danger)),
            self.count(severity_count(AlertSeverity::Critical)),
        )?;
        let by_severity = SeverityCounts { info, warning, danger, critical };

        Ok(AlertPage {
            alerts,
            pagination: Pagination::new(total, page, limit),
            summary: AlertSummary { unread_count, by_severity },
        })
    }

    #[instrument(skip(self))]
    async fn get_alert(&self, id: &str) -> Result<Alert, ServiceError> {
        parse_id(id)?;
        let not_found = || ServiceError::NotFound(format!("Alert with ID {} not found", id));

        let record = self.repository.get_by_id(id).await.map_err(map_repo_error)?.ok_or_else(not_found)?;
        let alert = conversions::convert_to_domain_alert(record).map_err(corrupt_record)?;
        if lifecycle::is_expired(&alert, Utc::now()) {
            return Err(not_found());
        }
        Ok(alert)
    }

    #[instrument(skip(self, input))]
    async fn create_manual_alert(&self, patient_id: &str, input: ManualAlert) -> Result<Alert, ServiceError> {
        let patient = parse_id(patient_id)?;
        validate_manual(&input)?;

        let alert = self.factory.manual(patient, input);
        self.repository
            .insert_many(vec![conversions::convert_to_data_alert(&alert)])
            .await
            .map_err(map_repo_error)?;

        info!(alert_id = %alert.id, alert_type = %alert.alert_type, "Manual alert created");
        Ok(alert)
    }

    #[instrument(skip(self))]
    async fn mark_read(&self, id: &str) -> Result<Alert, ServiceError> {
        self.transition(id, |alert, _| lifecycle::mark_read(alert)).await
    }

    #[instrument(skip(self))]
    async fn acknowledge(&self, id: &str) -> Result<Alert, ServiceError> {
        self.transition(id, lifecycle::acknowledge).await
    }

    #[instrument(skip(self))]
    async fn mark_all_read(&self, patient_id: &str) -> Result<usize, ServiceError> {
        parse_id(patient_id)?;
        let query = AlertQuery {
            is_read: Some(false),
            active_at: Some(Utc::now()),
            ..AlertQuery::for_patient(patient_id)
        };
        let (records, _) = self.repository.query(&query).await.map_err(map_repo_error)?;
        let unread = records
            .into_iter()
            .map(conversions::convert_to_domain_alert)
            .collect::<Result<Vec<_>, _>>()
            .map_err(corrupt_record)?;

        let changed: Vec<_> = lifecycle::mark_all_read(unread)
            .iter()
            .map(conversions::convert_to_data_alert)
            .collect();
        let count = self.repository.update_many(changed).await.map_err(map_repo_error)?;

        info!(count, "Marked alerts as read");
        Ok(count)
    }

    #[instrument(skip(self))]
    async fn mark_notification_sent(&self, id: &str) -> Result<Alert, ServiceError> {
        self.transition(id, lifecycle::mark_notification_sent).await
    }

    #[instrument(skip(self))]
    async fn mark_family_notified(&self, id: &str) -> Result<Alert, ServiceError> {
        self.transition(id, lifecycle::mark_family_notified).await
    }

    #[instrument(skip(self))]
    async fn pending_notifications(&self, patient_id: Option<&str>) -> Result<Vec<Alert>, ServiceError> {
        if let Some(patient_id) = patient_id {
            parse_id(patient_id)?;
        }
        let now = Utc::now();
        let records = self.repository
            .list_pending_notifications(patient_id)
            .await
            .map_err(map_repo_error)?;

        let alerts = records
            .into_iter()
            .map(conversions::convert_to_domain_alert)
            .collect::<Result<Vec<_>, _>>()
            .map_err(corrupt_record)?;
        Ok(alerts.into_iter().filter(|alert| !lifecycle::is_expired(alert, now)).collect())
    }

    #[instrument(skip(self))]
    async fn delete_alert(&self, id: &str) -> Result<(), ServiceError> {
        parse_id(id)?;
        if !self.repository.delete(id).await.map_err(map_repo_error)? {
            return Err(ServiceError::NotFound(format!("Alert with ID {} not found", id)));
        }
        info!(alert_id = %id, "Alert deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, ServiceError> {
        let purged = self.repository.delete_expired(now).await.map_err(|e| {
            warn!("Failed to purge expired alerts: {}", e);
            map_repo_error(e)
        })?;
        if purged > 0 {
            info!(purged, "Purged expired alerts");
        }
        Ok(purged)
    }
}

/// Create a default alert service using the repository from the data layer
pub fn create_default_alert_service(config: &EngineConfig) -> impl AlertServiceTrait {
    AlertService::new(AlertRepository::new(), config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn manual(severity: AlertSeverity) -> ManualAlert {
        ManualAlert {
            alert_type: AlertType::WellnessAdvice,
            severity,
            title: "Hydrate".to_string(),
            message: "Drink more water".to_string(),
            details: None,
            recommendations: vec!["Two liters a day".to_string()],
            suggested_tests: vec![],
            reading_id: None,
            report_id: None,
        }
    }

    fn service() -> AlertService<AlertRepository> {
        AlertService::new(AlertRepository::in_memory(), &EngineConfig::default())
    }

    #[tokio::test]
    async fn test_manual_alert_priority_and_validation() {
        let service = service();
        let patient = Uuid::new_v4().to_string();

        let alert = service.create_manual_alert(&patient, manual(AlertSeverity::Danger)).await.unwrap();
        assert_eq!(alert.priority, 10);
        assert!(!alert.family_notified);

        let mut blank = manual(AlertSeverity::Info);
        blank.title = " ".to_string();
        let err = service.create_manual_alert(&patient, blank).await.unwrap_err();
        assert!(matches!(err, ServiceError::Engine(EngineError::Validation(msg)) if msg == "title: Title is required"));
    }

    #[tokio::test]
    async fn test_acknowledge_is_idempotent_and_persisted() {
        let service = service();
        let patient = Uuid::new_v4().to_string();
        let created = service.create_manual_alert(&patient, manual(AlertSeverity::Warning)).await.unwrap();
        let id = created.id.to_string();

        let first = service.acknowledge(&id).await.unwrap();
        assert!(first.is_read && first.is_acknowledged);
        assert!(first.acknowledged_at.is_some());

        let second = service.acknowledge(&id).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(service.get_alert(&id).await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_list_counts_and_mark_all_read() {
        let service = service();
        let patient = Uuid::new_v4().to_string();
        for severity in [AlertSeverity::Info, AlertSeverity::Danger, AlertSeverity::Danger] {
            service.create_manual_alert(&patient, manual(severity)).await.unwrap();
        }

        let filter = AlertFilter {
            sort_by: AlertSortField::Priority,
            limit: Some(2),
            ..Default::default()
        };
        let page = service.list_alerts(&patient, filter).await.unwrap();
        assert_eq!(page.pagination.total, 3);
        assert_eq!(page.alerts.len(), 2);
        assert!(page.alerts.iter().all(|a| a.severity == AlertSeverity::Danger));
        assert_eq!(page.summary.unread_count, 3);
        assert_eq!(page.summary.by_severity.danger, 2);
        assert_eq!(page.summary.by_severity.info, 1);

        assert_eq!(service.mark_all_read(&patient).await.unwrap(), 3);
        assert_eq!(service.mark_all_read(&patient).await.unwrap(), 0);

        let unread = AlertFilter { is_read: Some(false), ..Default::default() };
        assert_eq!(service.list_alerts(&patient, unread).await.unwrap().pagination.total, 0);
    }

    #[tokio::test]
    async fn test_expired_alerts_are_hidden_and_purged() {
        let config = EngineConfig {
            alert_ttl: Some(Duration::days(1)),
            ..Default::default()
        };
        let service = AlertService::new(AlertRepository::in_memory(), &config);
        let patient = Uuid::new_v4().to_string();
        let alert = service.create_manual_alert(&patient, manual(AlertSeverity::Info)).await.unwrap();

        assert_eq!(service.purge_expired(Utc::now()).await.unwrap(), 0);
        assert_eq!(service.purge_expired(alert.created_at + Duration::days(2)).await.unwrap(), 1);
        assert!(matches!(
            service.get_alert(&alert.id.to_string()).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_notification_bookkeeping() {
        let service = service();
        let patient = Uuid::new_v4().to_string();
        let alert = service.create_manual_alert(&patient, manual(AlertSeverity::Warning)).await.unwrap();
        let id = alert.id.to_string();

        assert_eq!(service.pending_notifications(Some(&patient)).await.unwrap().len(), 1);

        let sent = service.mark_notification_sent(&id).await.unwrap();
        assert!(sent.notification_sent && sent.notification_sent_at.is_some());
        assert!(service.pending_notifications(Some(&patient)).await.unwrap().is_empty());

        let family = service.mark_family_notified(&id).await.unwrap();
        assert!(family.family_notified && family.family_notified_at.is_some());
    }

    #[tokio::test]
    async fn test_missing_alert() {
        let service = service();
        let id = Uuid::new_v4().to_string();
        assert!(matches!(service.mark_read(&id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(service.delete_alert(&id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(
            service.get_alert("nope").await,
            Err(ServiceError::Engine(EngineError::Validation(_)))
        ));
    }
}

// Testing utilities and mock implementations for the domain layer
// This module is only available when the "mock" feature is enabled

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::engine::trends::{self, TrendSummary, MAX_WINDOW};
use crate::engine::vitals;
use crate::engine::wellness::{health_status_message, wellness_suggestions};
use crate::engine::AlertFactory;
use crate::entities::reading::{Reading, ReadingSubmission};
use crate::errors::{EngineError, ServiceError};
use crate::health::{ComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth, SystemStatus};
use crate::services::readings::{ReadingFilter, ReadingOutcome, ReadingPage, ReadingServiceTrait};
use crate::services::{parse_id, Pagination};

fn lock_error<E: std::fmt::Display>(e: E) -> ServiceError {
    ServiceError::Repository(format!("Mock store lock poisoned: {}", e))
}

/// Mock implementation of the ReadingServiceTrait for testing.
///
/// Readings are classified with the real engine and kept in memory, newest first.
pub struct MockReadingService {
    readings: RwLock<HashMap<Uuid, Reading>>,
    factory: AlertFactory,
    should_fail_validation: bool,
    should_fail_storage: bool,
}

impl Default for MockReadingService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockReadingService {
    pub fn new() -> Self {
        Self {
            readings: RwLock::new(HashMap::new()),
            factory: AlertFactory::default(),
            should_fail_validation: false,
            should_fail_storage: false,
        }
    }

    /// Configure the mock to reject every submission
    pub fn with_validation_failure(mut self) -> Self {
        self.should_fail_validation = true;
        self
    }

    /// Configure the mock to fail on every storage access
    pub fn with_storage_failure(mut self) -> Self {
        self.should_fail_storage = true;
        self
    }

    /// Add a pre-defined reading to the mock
    pub fn with_reading(self, reading: Reading) -> Self {
        if let Ok(mut readings) = self.readings.write() {
            readings.insert(reading.id, reading);
        }
        self
    }

    fn storage_check(&self) -> Result<(), ServiceError> {
        if self.should_fail_storage {
            Err(ServiceError::Repository("Repository error - mock is configured to fail".to_string()))
        } else {
            Ok(())
        }
    }

    fn history(&self, patient: Uuid) -> Result<Vec<Reading>, ServiceError> {
        self.storage_check()?;
        let readings = self.readings.read().map_err(lock_error)?;
        let mut history: Vec<Reading> = readings.values().filter(|r| r.patient_id == patient).cloned().collect();
        history.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(history)
    }
}

#[async_trait]
impl ReadingServiceTrait for MockReadingService {
    async fn submit_reading(&self, patient_id: &str, submission: ReadingSubmission)
        -> Result<ReadingOutcome, ServiceError>
    {
        if self.should_fail_validation {
            return Err(EngineError::Validation(
                "Validation failed - mock is configured to fail validation".to_string(),
            ).into());
        }
        let patient = parse_id(patient_id)?;
        let vitals = submission.to_vitals()?;
        self.storage_check()?;

        let status = vitals::classify(&vitals);
        let now = Utc::now();
        let reading = Reading {
            id: Uuid::new_v4(),
            patient_id: patient,
            bp: vitals.bp,
            heart_rate: vitals.heart_rate,
            sugar: vitals.sugar,
            sleep_hours: vitals.sleep_hours,
            weight: vitals.weight,
            symptoms: submission.symptoms,
            notes: submission.notes,
            recorded_at: submission.recorded_at.unwrap_or(now),
            created_at: now,
            abnormality_status: status.clone(),
        };
        self.readings.write().map_err(lock_error)?.insert(reading.id, reading.clone());

        Ok(ReadingOutcome {
            alerts: self.factory.for_reading(&reading).into_iter().collect(),
            health_status: health_status_message(status.level),
            suggestions: wellness_suggestions(&status.flags),
            abnormality: status,
            reading,
        })
    }

    async fn get_reading(&self, id: &str) -> Result<Reading, ServiceError> {
        let key = parse_id(id)?;
        self.storage_check()?;
        self.readings
            .read()
            .map_err(lock_error)?
            .get(&key)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("Reading with ID {} not found", id)))
    }

    async fn get_latest_reading(&self, patient_id: &str) -> Result<Reading, ServiceError> {
        self.history(parse_id(patient_id)?)?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::NotFound("No readings found for this patient".to_string()))
    }

    async fn list_readings(&self, patient_id: &str, filter: ReadingFilter) -> Result<ReadingPage, ServiceError> {
        let mut history = self.history(parse_id(patient_id)?)?;
        let stats = trends::summarize(&history, MAX_WINDOW);

        history.retain(|r| filter.start.map_or(true, |s| r.recorded_at >= s) && filter.end.map_or(true, |e| r.recorded_at <= e));
        let (page, limit) = Pagination::request(filter.page, filter.limit, MAX_WINDOW);
        let total = history.len();
        let readings = history.into_iter().skip(Pagination::offset(page, limit)).take(limit).collect();

        Ok(ReadingPage {
            readings,
            pagination: Pagination::new(total, page, limit),
            stats,
        })
    }

    async fn get_trends(&self, patient_id: &str) -> Result<Option<TrendSummary>, ServiceError> {
        Ok(trends::summarize(&self.history(parse_id(patient_id)?)?, MAX_WINDOW))
    }

    async fn delete_reading(&self, patient_id: &str, id: &str) -> Result<(), ServiceError> {
        let patient = parse_id(patient_id)?;
        let reading = self.get_reading(id).await?;
        if reading.patient_id != patient {
            return Err(ServiceError::Forbidden("Not authorized to delete this reading".to_string()));
        }
        self.readings.write().map_err(lock_error)?.remove(&reading.id);
        Ok(())
    }
}

/// Mock implementation of health services for testing system health
#[derive(Debug)]
pub struct MockHealthService {
    database_status: ComponentStatus,
    system_status: SystemStatus,
    components: HashMap<String, HealthComponent>,
}

impl Default for MockHealthService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHealthService {
    /// Create a new mock health service with all components healthy
    pub fn new() -> Self {
        Self {
            database_status: ComponentStatus::Healthy,
            system_status: SystemStatus::Healthy,
            components: HashMap::new(),
        }
    }

    /// Configure the mock with storage running in memory
    pub fn with_degraded_database(mut self) -> Self {
        self.database_status = ComponentStatus::Degraded;
        self.system_status = SystemStatus::Degraded;
        self
    }

    pub fn with_unhealthy_database(mut self) -> Self {
        self.database_status = ComponentStatus::Unhealthy;
        self.system_status = SystemStatus::Unhealthy;
        self
    }

    /// Add a custom component with a specific status
    pub fn with_component(mut self, name: &str, status: ComponentStatus, details: Option<String>) -> Self {
        self.components.insert(name.to_string(), HealthComponent { status, details });
        self
    }
}

#[async_trait]
impl HealthServiceTrait for MockHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = self.components.clone();
        components.insert(
            "database".to_string(),
            HealthComponent {
                status: self.database_status,
                details: match self.database_status {
                    ComponentStatus::Healthy => None,
                    ComponentStatus::Degraded => Some("No database configured, data is kept in memory".to_string()),
                    ComponentStatus::Unhealthy => Some("Database connection failed".to_string()),
                },
            },
        );

        SystemHealth {
            status: self.system_status,
            components,
        }
    }

    async fn check_database_status(&self) -> Result<bool, String> {
        match self.database_status {
            ComponentStatus::Healthy => Ok(true),
            ComponentStatus::Degraded => Ok(false),
            ComponentStatus::Unhealthy => Err("Database connection failed".to_string()),
        }
    }
}

/// Factory function to create a mock reading service
pub fn create_mock_reading_service() -> impl ReadingServiceTrait {
    MockReadingService::new()
}

/// Factory function to create a mock health service
pub fn create_mock_health_service() -> impl HealthServiceTrait {
    MockHealthService::new()
}

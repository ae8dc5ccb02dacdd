use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use chrono::{DateTime, Utc};

use crate::models::alert::severity_rank;
use crate::models::{AlertQuery, AlertRecord, AlertSortField, ReadingQuery, ReadingRecord, ReportQuery, ReportRecord};
use super::errors::RepositoryError;

type Table<T> = Arc<Mutex<HashMap<String, T>>>;

/// In-memory storage used when no database pool is configured
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    readings: Table<ReadingRecord>,
    alerts: Table<AlertRecord>,
    reports: Table<ReportRecord>,
}

fn lock<T>(table: &Table<T>) -> Result<MutexGuard<'_, HashMap<String, T>>, RepositoryError> {
    table.lock().map_err(|e| RepositoryError::MutexLock(e.to_string()))
}

/// Apply offset/limit and return the page together with the unpaged total
pub(crate) fn paginate<T>(items: Vec<T>, limit: Option<usize>, offset: Option<usize>) -> (Vec<T>, usize) {
    let total = items.len();
    let offset = offset.unwrap_or(0);
    let limit = limit.unwrap_or(total);
    let page = items.into_iter().skip(offset).take(limit).collect();
    (page, total)
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    // Readings

    pub async fn store_reading(&self, reading: &ReadingRecord) -> Result<ReadingRecord, RepositoryError> {
        let mut store = lock(&self.readings)?;
        store.insert(reading.id.clone(), reading.clone());
        Ok(reading.clone())
    }

    pub async fn get_reading(&self, id: &str) -> Result<Option<ReadingRecord>, RepositoryError> {
        let store = lock(&self.readings)?;
        Ok(store.get(id).cloned())
    }

    /// Readings matching the query, most recent first
    pub async fn query_readings(&self, query: &ReadingQuery) -> Result<(Vec<ReadingRecord>, usize), RepositoryError> {
        let store = lock(&self.readings)?;
        let mut readings: Vec<ReadingRecord> = store
            .values()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();
        readings.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at).then_with(|| b.id.cmp(&a.id)));
        Ok(paginate(readings, query.limit, query.offset))
    }

    pub async fn delete_reading(&self, id: &str) -> Result<bool, RepositoryError> {
        let mut store = lock(&self.readings)?;
        Ok(store.remove(id).is_some())
    }

    // Alerts

    pub async fn store_alerts(&self, alerts: &[AlertRecord]) -> Result<(), RepositoryError> {
        let mut store = lock(&self.alerts)?;
        for alert in alerts {
            store.insert(alert.id.clone(), alert.clone());
        }
        Ok(())
    }

    pub async fn get_alert(&self, id: &str) -> Result<Option<AlertRecord>, RepositoryError> {
        let store = lock(&self.alerts)?;
        Ok(store.get(id).cloned())
    }

    /// Replace existing alerts, returning how many were present
    pub async fn update_alerts(&self, alerts: &[AlertRecord]) -> Result<usize, RepositoryError> {
        let mut store = lock(&self.alerts)?;
        let mut updated = 0;
        for alert in alerts {
            if let Some(existing) = store.get_mut(&alert.id) {
                *existing = alert.clone();
                updated += 1;
            }
        }
        Ok(updated)
    }

    pub async fn query_alerts(&self, query: &AlertQuery) -> Result<(Vec<AlertRecord>, usize), RepositoryError> {
        let store = lock(&self.alerts)?;
        let mut alerts: Vec<AlertRecord> = store
            .values()
            .filter(|a| query.matches(a))
            .cloned()
            .collect();

        alerts.sort_by(|a, b| {
            let primary = match query.sort_by {
                AlertSortField::CreatedAt => a.created_at.cmp(&b.created_at),
                AlertSortField::Priority => a.priority.cmp(&b.priority),
                AlertSortField::Severity => severity_rank(&a.severity).cmp(&severity_rank(&b.severity)),
            };
            let primary = if query.descending { primary.reverse() } else { primary };
            match primary {
                Ordering::Equal => b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)),
                other => other,
            }
        });

        Ok(paginate(alerts, query.limit, query.offset))
    }

    pub async fn list_pending_notifications(&self, patient_id: Option<&str>) -> Result<Vec<AlertRecord>, RepositoryError> {
        let store = lock(&self.alerts)?;
        let mut alerts: Vec<AlertRecord> = store
            .values()
            .filter(|a| !a.notification_sent || (a.family_notified && a.family_notified_at.is_none()))
            .filter(|a| patient_id.map_or(true, |p| a.patient_id == p))
            .cloned()
            .collect();
        alerts.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.created_at.cmp(&b.created_at)));
        Ok(alerts)
    }

    pub async fn delete_alert(&self, id: &str) -> Result<bool, RepositoryError> {
        let mut store = lock(&self.alerts)?;
        Ok(store.remove(id).is_some())
    }

    pub async fn delete_expired_alerts(&self, now: DateTime<Utc>) -> Result<usize, RepositoryError> {
        let mut store = lock(&self.alerts)?;
        let before = store.len();
        store.retain(|_, alert| alert.expires_at.map_or(true, |expires| expires > now));
        Ok(before - store.len())
    }

    // Reports

    pub async fn store_report(&self, report: &ReportRecord) -> Result<ReportRecord, RepositoryError> {
        let mut store = lock(&self.reports)?;
        store.insert(report.id.clone(), report.clone());
        Ok(report.clone())
    }

    pub async fn get_report(&self, id: &str) -> Result<Option<ReportRecord>, RepositoryError> {
        let store = lock(&self.reports)?;
        Ok(store.get(id).cloned())
    }

    pub async fn update_report(&self, report: &ReportRecord) -> Result<bool, RepositoryError> {
        let mut store = lock(&self.reports)?;
        match store.get_mut(&report.id) {
            Some(existing) => {
                *existing = report.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn query_reports(&self, query: &ReportQuery) -> Result<(Vec<ReportRecord>, usize), RepositoryError> {
        let store = lock(&self.reports)?;
        let mut reports: Vec<ReportRecord> = store
            .values()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();
        reports.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then_with(|| a.id.cmp(&b.id)));
        Ok(paginate(reports, query.limit, query.offset))
    }

    pub async fn delete_report(&self, id: &str) -> Result<bool, RepositoryError> {
        let mut store = lock(&self.reports)?;
        Ok(store.remove(id).is_some())
    }
}

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Storage model for an alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: String,
    pub patient_id: String,
    pub reading_id: Option<String>,
    pub report_id: Option<String>,

    /// Alert type as a snake_case string (reading_abnormal, report_critical, ...)
    pub alert_type: String,

    /// Severity as a lowercase string (info, warning, danger, critical)
    pub severity: String,

    /// Priority from 0 to 10
    pub priority: u8,

    pub title: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
    pub recommendations: Vec<String>,
    pub suggested_tests: Vec<String>,

    pub is_read: bool,
    pub is_acknowledged: bool,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub notification_sent: bool,
    pub notification_sent_at: Option<DateTime<Utc>>,
    pub family_notified: bool,
    pub family_notified_at: Option<DateTime<Utc>>,

    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Field used to order alert listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlertSortField {
    #[default]
    CreatedAt,
    Priority,
    Severity,
}

/// Filters and paging for alert listings
#[derive(Debug, Clone, Default)]
pub struct AlertQuery {
    pub patient_id: String,
    pub severity: Option<String>,
    pub alert_type: Option<String>,
    pub is_read: Option<bool>,
    /// Hide alerts that expired at or before this instant
    pub active_at: Option<DateTime<Utc>>,
    pub sort_by: AlertSortField,
    pub descending: bool,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl AlertQuery {
    /// Query every alert of a patient, newest first
    pub fn for_patient(patient_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            descending: true,
            ..Default::default()
        }
    }

    /// Check whether a record passes the filters (paging excluded)
    pub fn matches(&self, record: &AlertRecord) -> bool {
        if record.patient_id != self.patient_id {
            return false;
        }
        if let Some(severity) = &self.severity {
            if &record.severity != severity {
                return false;
            }
        }
        if let Some(alert_type) = &self.alert_type {
            if &record.alert_type != alert_type {
                return false;
            }
        }
        if let Some(is_read) = self.is_read {
            if record.is_read != is_read {
                return false;
            }
        }
        if let (Some(now), Some(expires_at)) = (self.active_at, record.expires_at) {
            if expires_at <= now {
                return false;
            }
        }
        true
    }
}

/// Rank used when ordering by severity
pub fn severity_rank(severity: &str) -> u8 {
    match severity {
        "critical" => 3,
        "danger" => 2,
        "warning" => 1,
        _ => 0,
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::engine::severity::AlertSeverity;

/// What kind of condition an alert describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    ReadingAbnormal,
    ReportAbnormal,
    ReportCritical,
    ReportBorderline,
    PredictionRisk,
    MedicationReminder,
    CheckupSuggestion,
    CriticalAlert,
    WellnessAdvice,
}

impl AlertType {
    pub const ALL: [AlertType; 9] = [
        AlertType::ReadingAbnormal,
        AlertType::ReportAbnormal,
        AlertType::ReportCritical,
        AlertType::ReportBorderline,
        AlertType::PredictionRisk,
        AlertType::MedicationReminder,
        AlertType::CheckupSuggestion,
        AlertType::CriticalAlert,
        AlertType::WellnessAdvice,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::ReadingAbnormal => "reading_abnormal",
            AlertType::ReportAbnormal => "report_abnormal",
            AlertType::ReportCritical => "report_critical",
            AlertType::ReportBorderline => "report_borderline",
            AlertType::PredictionRisk => "prediction_risk",
            AlertType::MedicationReminder => "medication_reminder",
            AlertType::CheckupSuggestion => "checkup_suggestion",
            AlertType::CriticalAlert => "critical_alert",
            AlertType::WellnessAdvice => "wellness_advice",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of an alert in its read/acknowledge lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum AlertState {
    Unread,
    Read,
    Acknowledged,
}

/// A notification describing one detected condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub reading_id: Option<Uuid>,
    pub report_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    /// 0-10, monotonic with severity
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

/// Input for an alert raised outside the classifiers (reminders, advice)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ManualAlert {
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub suggested_tests: Vec<String>,
    #[serde(default)]
    pub reading_id: Option<Uuid>,
    #[serde(default)]
    pub report_id: Option<Uuid>,
}

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Storage model for one lab finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindingRecord {
    pub parameter: String,
    pub value: f64,
    pub normal_range: String,
    pub severity: String,
    pub message: String,
}

/// Storage model for an uploaded medical report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub id: String,
    pub patient_id: String,
    pub report_type: String,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub file_type: Option<String>,

    /// Processing status (uploaded, processing, completed, failed)
    pub status: String,

    /// Structured parameter groups, kept as JSON
    pub data: serde_json::Value,

    pub findings: Vec<FindingRecord>,
    pub ocr_confidence: Option<f64>,
    pub processing_time_ms: Option<u64>,
    pub error_message: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Filters and paging for report listings
#[derive(Debug, Clone, Default)]
pub struct ReportQuery {
    pub patient_id: String,
    pub status: Option<String>,
    pub report_type: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ReportQuery {
    pub fn for_patient(patient_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            ..Default::default()
        }
    }

    pub fn matches(&self, record: &ReportRecord) -> bool {
        record.patient_id == self.patient_id
            && self.status.as_ref().map_or(true, |s| &record.status == s)
            && self.report_type.as_ref().map_or(true, |t| &record.report_type == t)
    }
}

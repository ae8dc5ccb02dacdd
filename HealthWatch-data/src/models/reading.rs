use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Abnormality flags as stored alongside a reading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusFlagsRecord {
    pub high_bp: bool,
    pub low_bp: bool,
    pub high_heart_rate: bool,
    pub low_heart_rate: bool,
    pub high_sugar: bool,
    pub low_sugar: bool,
    pub poor_sleep: bool,
}

/// Storage model for a vitals reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingRecord {
    /// Unique identifier for the reading
    pub id: String,

    /// Owning patient
    pub patient_id: String,

    /// Systolic blood pressure (the higher number)
    pub systolic: u16,

    /// Diastolic blood pressure (the lower number)
    pub diastolic: u16,

    /// Heart rate in beats per minute
    pub heart_rate: u16,

    /// Blood sugar in mg/dL
    pub sugar: f64,

    /// Hours slept
    pub sleep_hours: f64,

    /// Weight in kilograms
    pub weight: f64,

    /// Symptom tags
    pub symptoms: Vec<String>,

    /// Optional notes about the reading
    pub notes: Option<String>,

    /// When the reading was taken
    pub recorded_at: DateTime<Utc>,

    /// When the reading was stored
    pub created_at: DateTime<Utc>,

    /// Abnormality level as a string (normal, warning, danger)
    pub status_level: String,

    /// Abnormality explanation
    pub status_details: String,

    /// Abnormality flags
    pub status_flags: StatusFlagsRecord,
}

/// Input for storing a new reading. The repository assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReadingRecord {
    pub patient_id: String,
    pub systolic: u16,
    pub diastolic: u16,
    pub heart_rate: u16,
    pub sugar: f64,
    pub sleep_hours: f64,
    pub weight: f64,
    pub symptoms: Vec<String>,
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
    pub status_level: String,
    pub status_details: String,
    pub status_flags: StatusFlagsRecord,
}

impl NewReadingRecord {
    /// Attach an id and creation time, producing the stored record
    pub fn into_record(self, id: String, created_at: DateTime<Utc>) -> ReadingRecord {
        ReadingRecord {
            id,
            patient_id: self.patient_id,
            systolic: self.systolic,
            diastolic: self.diastolic,
            heart_rate: self.heart_rate,
            sugar: self.sugar,
            sleep_hours: self.sleep_hours,
            weight: self.weight,
            symptoms: self.symptoms,
            notes: self.notes,
            recorded_at: self.recorded_at,
            created_at,
            status_level: self.status_level,
            status_details: self.status_details,
            status_flags: self.status_flags,
        }
    }
}

/// Filters and paging for reading listings, most recent first
#[derive(Debug, Clone, Default)]
pub struct ReadingQuery {
    pub patient_id: String,
    /// Inclusive lower bound on `recorded_at`
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `recorded_at`
    pub end: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ReadingQuery {
    pub fn for_patient(patient_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            ..Default::default()
        }
    }

    /// Most recent `limit` readings of a patient
    pub fn recent(patient_id: impl Into<String>, limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::for_patient(patient_id)
        }
    }

    pub fn matches(&self, record: &ReadingRecord) -> bool {
        record.patient_id == self.patient_id
            && self.start.map_or(true, |start| record.recorded_at >= start)
            && self.end.map_or(true, |end| record.recorded_at <= end)
    }
}

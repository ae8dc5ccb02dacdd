use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::engine::severity::VitalLevel;
use crate::errors::{flatten_validation_errors, EngineError};

/// Blood pressure pair in mmHg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
pub struct BloodPressure {
    pub systolic: u16,
    pub diastolic: u16,
}

/// A validated vitals snapshot, ready for classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Vitals {
    pub bp: BloodPressure,
    pub heart_rate: u16,
    pub sugar: f64,
    pub sleep_hours: f64,
    pub weight: f64,
}

/// Which vitals rules fired for a reading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct StatusFlags {
    #[serde(rename = "highBP")]
    pub high_bp: bool,
    #[serde(rename = "lowBP")]
    pub low_bp: bool,
    pub high_heart_rate: bool,
    pub low_heart_rate: bool,
    pub high_sugar: bool,
    pub low_sugar: bool,
    pub poor_sleep: bool,
}

impl StatusFlags {
    pub fn any(&self) -> bool {
        self.high_bp
            || self.low_bp
            || self.high_heart_rate
            || self.low_heart_rate
            || self.high_sugar
            || self.low_sugar
            || self.poor_sleep
    }
}

/// Derived classification of a reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
pub struct AbnormalityStatus {
    pub level: VitalLevel,
    pub details: String,
    pub flags: StatusFlags,
}

/// One stored vitals snapshot with its computed status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub bp: BloodPressure,
    pub heart_rate: u16,
    pub sugar: f64,
    pub sleep_hours: f64,
    pub weight: f64,
    pub symptoms: Vec<String>,
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub abnormality_status: AbnormalityStatus,
}

impl Reading {
    pub fn vitals(&self) -> Vitals {
        Vitals {
            bp: self.bp,
            heart_rate: self.heart_rate,
            sugar: self.sugar,
            sleep_hours: self.sleep_hours,
            weight: self.weight,
        }
    }
}

/// Blood pressure as submitted, before completeness and range checks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
pub struct BloodPressureInput {
    #[validate(range(min = 40, max = 300, message = "Systolic pressure must be between 40 and 300 mmHg"))]
    pub systolic: Option<i32>,

    #[validate(range(min = 30, max = 200, message = "Diastolic pressure must be between 30 and 200 mmHg"))]
    pub diastolic: Option<i32>,
}

/// A vitals reading as submitted by a patient
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ReadingSubmission {
    #[validate]
    pub bp: Option<BloodPressureInput>,

    #[validate(range(min = 30, max = 250, message = "Heart rate must be between 30 and 250 bpm"))]
    pub heart_rate: Option<i32>,

    #[validate(range(min = 20.0, max = 600.0, message = "Blood sugar must be between 20 and 600 mg/dL"))]
    pub sugar: Option<f64>,

    #[validate(range(min = 0.0, max = 24.0, message = "Sleep hours must be between 0 and 24"))]
    pub sleep_hours: Option<f64>,

    #[validate(range(min = 20.0, max = 300.0, message = "Weight must be between 20 and 300 kg"))]
    pub weight: Option<f64>,

    #[serde(default)]
    #[validate(length(max = 20, message = "At most 20 symptoms can be recorded"))]
    pub symptoms: Vec<String>,

    #[validate(length(max = 500, message = "Notes cannot exceed 500 characters"))]
    pub notes: Option<String>,

    /// When the reading was taken; defaults to submission time
    pub recorded_at: Option<DateTime<Utc>>,
}

impl ReadingSubmission {
    /// Names of required fields that are absent, in wire form
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        match &self.bp {
            None => missing.push("bp"),
            Some(bp) => {
                if bp.systolic.is_none() {
                    missing.push("bp.systolic");
                }
                if bp.diastolic.is_none() {
                    missing.push("bp.diastolic");
                }
            }
        }
        if self.heart_rate.is_none() {
            missing.push("heartRate");
        }
        if self.sugar.is_none() {
            missing.push("sugar");
        }
        if self.sleep_hours.is_none() {
            missing.push("sleepHours");
        }
        if self.weight.is_none() {
            missing.push("weight");
        }
        missing
    }

    /// Check completeness then plausible ranges, producing classifiable vitals.
    ///
    /// Out-of-range values are rejected, never clamped.
    pub fn to_vitals(&self) -> Result<Vitals, EngineError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(EngineError::IncompleteInput(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        self.validate()
            .map_err(|errors| EngineError::Validation(flatten_validation_errors(&errors)))?;

        match (self.bp.as_ref(), self.heart_rate, self.sugar, self.sleep_hours, self.weight) {
            (Some(BloodPressureInput { systolic: Some(systolic), diastolic: Some(diastolic) }),
                Some(heart_rate), Some(sugar), Some(sleep_hours), Some(weight)) => {
                if ![sugar, sleep_hours, weight].iter().all(|v| v.is_finite()) {
                    return Err(EngineError::Validation("Vitals must be finite numbers".to_string()));
                }
                Ok(Vitals {
                    bp: BloodPressure {
                        systolic: *systolic as u16,
                        diastolic: *diastolic as u16,
                    },
                    heart_rate: heart_rate as u16,
                    sugar,
                    sleep_hours,
                    weight,
                })
            }
            _ => Err(EngineError::IncompleteInput("Missing required fields".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn complete_submission() -> ReadingSubmission {
        ReadingSubmission {
            bp: Some(BloodPressureInput { systolic: Some(120), diastolic: Some(80) }),
            heart_rate: Some(75),
            sugar: Some(100.0),
            sleep_hours: Some(7.0),
            weight: Some(70.0),
            symptoms: vec![],
            notes: None,
            recorded_at: None,
        }
    }

    #[test]
    fn test_complete_submission_converts() {
        let vitals = complete_submission().to_vitals().unwrap();
        assert_eq!(vitals.bp, BloodPressure { systolic: 120, diastolic: 80 });
        assert_eq!(vitals.heart_rate, 75);
    }

    #[test]
    fn test_missing_fields_are_incomplete() {
        let mut submission = complete_submission();
        submission.heart_rate = None;
        submission.bp = Some(BloodPressureInput { systolic: Some(120), diastolic: None });

        let err = submission.to_vitals().unwrap_err();
        assert_eq!(
            err,
            EngineError::IncompleteInput("Missing required fields: bp.diastolic, heartRate".to_string())
        );
    }

    #[test]
    fn test_out_of_range_is_rejected_not_clamped() {
        let mut submission = complete_submission();
        submission.bp = Some(BloodPressureInput { systolic: Some(350), diastolic: Some(80) });
        submission.sleep_hours = Some(25.0);

        match submission.to_vitals() {
            Err(EngineError::Validation(msg)) => {
                assert!(msg.contains("bp.systolic: Systolic pressure must be between 40 and 300 mmHg"));
                assert!(msg.contains("sleepHours: Sleep hours must be between 0 and 24"));
                assert!(!msg.contains("sleep_hours"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_incomplete_and_invalid_share_wire_names() {
        let mut submission = complete_submission();
        submission.heart_rate = Some(400);
        match submission.to_vitals() {
            Err(EngineError::Validation(msg)) => {
                assert_eq!(msg, "heartRate: Heart rate must be between 30 and 250 bpm");
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        submission.heart_rate = None;
        assert!(matches!(
            submission.to_vitals(),
            Err(EngineError::IncompleteInput(msg)) if msg.ends_with("heartRate")
        ));
    }

    #[test]
    fn test_flags_serialize_with_wire_names() {
        let flags = StatusFlags { high_bp: true, poor_sleep: true, ..Default::default() };
        let json = serde_json::to_value(flags).unwrap();
        assert_eq!(json["highBP"], true);
        assert_eq!(json["lowBP"], false);
        assert_eq!(json["poorSleep"], true);
        assert_eq!(json["highHeartRate"], false);
    }

    #[test]
    fn test_submission_accepts_camel_case() {
        let json = serde_json::json!({
            "bp": {"systolic": 130, "diastolic": 85},
            "heartRate": 80,
            "sugar": 110.5,
            "sleepHours": 6.5,
            "weight": 72.0
        });
        let submission: ReadingSubmission = serde_json::from_value(json).unwrap();
        assert!(submission.missing_fields().is_empty());
        assert!(submission.symptoms.is_empty());
    }
}

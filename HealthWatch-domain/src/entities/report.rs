use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::engine::severity::FindingSeverity;

/// Kind of uploaded medical document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    #[default]
    BloodTest,
    UrineTest,
    LipidProfile,
    Ecg,
    Ultrasound,
    Xray,
    Other,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::BloodTest => "blood_test",
            ReportType::UrineTest => "urine_test",
            ReportType::LipidProfile => "lipid_profile",
            ReportType::Ecg => "ecg",
            ReportType::Ultrasound => "ultrasound",
            ReportType::Xray => "xray",
            ReportType::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "blood_test" => Some(ReportType::BloodTest),
            "urine_test" => Some(ReportType::UrineTest),
            "lipid_profile" => Some(ReportType::LipidProfile),
            "ecg" => Some(ReportType::Ecg),
            "ultrasound" => Some(ReportType::Ultrasound),
            "xray" => Some(ReportType::Xray),
            "other" => Some(ReportType::Other),
            _ => None,
        }
    }
}

/// Format of the stored document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Image,
    Pdf,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Image => "image",
            FileType::Pdf => "pdf",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "image" => Some(FileType::Image),
            "pdf" => Some(FileType::Pdf),
            _ => None,
        }
    }
}

/// Processing status: `uploaded -> processing -> completed | failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Uploaded,
    Processing,
    Completed,
    Failed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Uploaded => "uploaded",
            ReportStatus::Processing => "processing",
            ReportStatus::Completed => "completed",
            ReportStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "uploaded" => Some(ReportStatus::Uploaded),
            "processing" => Some(ReportStatus::Processing),
            "completed" => Some(ReportStatus::Completed),
            "failed" => Some(ReportStatus::Failed),
            _ => None,
        }
    }
}

/// One abnormal, borderline or critical lab parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ReportFinding {
    pub parameter: String,
    pub value: f64,
    pub normal_range: String,
    pub severity: FindingSeverity,
    pub message: String,
}

/// Field deserializers that never fail: unusable values become `None`
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Accept numbers and numeric strings
    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|v| v.is_finite()))
    }

    /// Accept strings, numbers and booleans as text
    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(s) if !s.trim().is_empty() => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct BloodTest {
    #[serde(default, deserialize_with = "lenient::number")]
    pub hemoglobin: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub wbc: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub rbc: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub platelets: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub hematocrit: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub mcv: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub mch: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub mchc: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct LipidProfile {
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_cholesterol: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub ldl: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub hdl: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub triglycerides: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub vldl: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct KidneyFunction {
    #[serde(default, deserialize_with = "lenient::number")]
    pub creatinine: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub urea: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub uric_acid: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub bun: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct LiverFunction {
    #[serde(default, deserialize_with = "lenient::number")]
    pub sgot: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub sgpt: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub alkaline_phosphatase: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_bilirubin: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub direct_bilirubin: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub total_protein: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub albumin: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub globulin: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DiabetesMarkers {
    #[serde(default, deserialize_with = "lenient::number")]
    pub fasting_glucose: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub random_glucose: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub hba1c: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub postprandial_glucose: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ThyroidFunction {
    #[serde(default, deserialize_with = "lenient::number")]
    pub tsh: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub t3: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub t4: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub free_t3: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub free_t4: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UrineTest {
    #[serde(default, deserialize_with = "lenient::number")]
    pub ph: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub specific_gravity: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub protein: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub glucose: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub ketones: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub blood: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub leukocytes: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub nitrites: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct EcgFindings {
    #[serde(default, deserialize_with = "lenient::number")]
    pub heart_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub rhythm: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub pr_interval: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub qrs_duration: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub qt_interval: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub findings: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub interpretation: Option<String>,
}

/// Structured parameter groups of a report; every group is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_test: Option<BloodTest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lipid_profile: Option<LipidProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kidney_function: Option<KidneyFunction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liver_function: Option<LiverFunction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diabetes_markers: Option<DiabetesMarkers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thyroid_function: Option<ThyroidFunction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urine_test: Option<UrineTest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ecg_findings: Option<EcgFindings>,
}

/// Report data and confidence read from an extraction payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub data: ReportData,
    /// OCR confidence, 0-100
    pub confidence: Option<f64>,
}

fn group<T: DeserializeOwned>(payload: &Value, key: &str) -> Option<T> {
    payload
        .get(key)
        .filter(|value| value.is_object())
        .and_then(|value| T::deserialize(value).ok())
}

impl ReportData {
    /// Build report data from an extraction payload.
    ///
    /// Known groups are read from the top level of the payload. Numeric
    /// strings are accepted, unknown fields are ignored and a payload that is
    /// not an object yields empty data.
    pub fn from_extraction(payload: &Value) -> Extraction {
        let data = ReportData {
            blood_test: group(payload, "bloodTest"),
            lipid_profile: group(payload, "lipidProfile"),
            kidney_function: group(payload, "kidneyFunction"),
            liver_function: group(payload, "liverFunction"),
            diabetes_markers: group(payload, "diabetesMarkers"),
            thyroid_function: group(payload, "thyroidFunction"),
            urine_test: group(payload, "urineTest"),
            ecg_findings: group(payload, "ecgFindings"),
        };

        let confidence = match payload.get("confidence") {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|c| c.is_finite() && (0.0..=100.0).contains(c));

        Extraction { data, confidence }
    }

    pub fn is_empty(&self) -> bool {
        *self == ReportData::default()
    }
}

/// An uploaded medical document and its classification state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub report_type: ReportType,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub file_type: Option<FileType>,
    pub status: ReportStatus,
    pub data: ReportData,
    pub findings: Vec<ReportFinding>,
    pub ocr_confidence: Option<f64>,
    pub processing_time_ms: Option<u64>,
    pub error_message: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Metadata supplied by the file-storage collaborator when a report is registered
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    #[serde(default)]
    pub report_type: ReportType,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub file_type: Option<FileType>,
    pub notes: Option<String>,
}

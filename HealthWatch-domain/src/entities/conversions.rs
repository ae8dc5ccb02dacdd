use chrono::{DateTime, Utc};
use uuid::Uuid;

use health_watch_data::models::{
    AlertRecord, FindingRecord, NewReadingRecord, ReadingRecord, ReportRecord, StatusFlagsRecord,
};

use crate::engine::severity::{AlertSeverity, FindingSeverity, VitalLevel};
use crate::entities::alert::{Alert, AlertType};
use crate::entities::reading::{AbnormalityStatus, BloodPressure, Reading, StatusFlags, Vitals};
use crate::entities::report::{FileType, Report, ReportData, ReportFinding, ReportStatus, ReportType};

// Conversion functions between domain entities and storage records,
// named convert_to_[target_layer]_[model_name]

/// Parse a stored or user-supplied id into a UUID
pub fn parse_string_to_uuid(id: &str) -> Result<Uuid, String> {
    Uuid::parse_str(id).map_err(|_| format!("Invalid UUID format: {}", id))
}

fn parse_optional_uuid(id: Option<String>) -> Result<Option<Uuid>, String> {
    id.as_deref().map(parse_string_to_uuid).transpose()
}

fn convert_to_data_flags(flags: &StatusFlags) -> StatusFlagsRecord {
    StatusFlagsRecord {
        high_bp: flags.high_bp,
        low_bp: flags.low_bp,
        high_heart_rate: flags.high_heart_rate,
        low_heart_rate: flags.low_heart_rate,
        high_sugar: flags.high_sugar,
        low_sugar: flags.low_sugar,
        poor_sleep: flags.poor_sleep,
    }
}

fn convert_to_domain_flags(flags: &StatusFlagsRecord) -> StatusFlags {
    StatusFlags {
        high_bp: flags.high_bp,
        low_bp: flags.low_bp,
        high_heart_rate: flags.high_heart_rate,
        low_heart_rate: flags.low_heart_rate,
        high_sugar: flags.high_sugar,
        low_sugar: flags.low_sugar,
        poor_sleep: flags.poor_sleep,
    }
}

/// Build the storage input for a classified reading
pub fn convert_to_data_new_reading(
    patient_id: Uuid,
    vitals: &Vitals,
    status: &AbnormalityStatus,
    symptoms: Vec<String>,
    notes: Option<String>,
    recorded_at: DateTime<Utc>,
) -> NewReadingRecord {
    NewReadingRecord {
        patient_id: patient_id.to_string(),
        systolic: vitals.bp.systolic,
        diastolic: vitals.bp.diastolic,
        heart_rate: vitals.heart_rate,
        sugar: vitals.sugar,
        sleep_hours: vitals.sleep_hours,
        weight: vitals.weight,
        symptoms,
        notes,
        recorded_at,
        status_level: status.level.as_str().to_string(),
        status_details: status.details.clone(),
        status_flags: convert_to_data_flags(&status.flags),
    }
}

pub fn convert_to_domain_reading(record: ReadingRecord) -> Result<Reading, String> {
    let level = VitalLevel::parse(&record.status_level)
        .ok_or_else(|| format!("Unknown abnormality level: {}", record.status_level))?;

    Ok(Reading {
        id: parse_string_to_uuid(&record.id)?,
        patient_id: parse_string_to_uuid(&record.patient_id)?,
        bp: BloodPressure {
            systolic: record.systolic,
            diastolic: record.diastolic,
        },
        heart_rate: record.heart_rate,
        sugar: record.sugar,
        sleep_hours: record.sleep_hours,
        weight: record.weight,
        symptoms: record.symptoms,
        notes: record.notes,
        recorded_at: record.recorded_at,
        created_at: record.created_at,
        abnormality_status: AbnormalityStatus {
            level,
            details: record.status_details,
            flags: convert_to_domain_flags(&record.status_flags),
        },
    })
}

pub fn convert_to_data_alert(alert: &Alert) -> AlertRecord {
    AlertRecord {
        id: alert.id.to_string(),
        patient_id: alert.patient_id.to_string(),
        reading_id: alert.reading_id.map(|id| id.to_string()),
        report_id: alert.report_id.map(|id| id.to_string()),
        alert_type: alert.alert_type.as_str().to_string(),
        severity: alert.severity.as_str().to_string(),
        priority: alert.priority,
        title: alert.title.clone(),
        message: alert.message.clone(),
        details: alert.details.clone(),
        recommendations: alert.recommendations.clone(),
        suggested_tests: alert.suggested_tests.clone(),
        is_read: alert.is_read,
        is_acknowledged: alert.is_acknowledged,
        acknowledged_at: alert.acknowledged_at,
        notification_sent: alert.notification_sent,
        notification_sent_at: alert.notification_sent_at,
        family_notified: alert.family_notified,
        family_notified_at: alert.family_notified_at,
        expires_at: alert.expires_at,
        created_at: alert.created_at,
    }
}

pub fn convert_to_domain_alert(record: AlertRecord) -> Result<Alert, String> {
    let alert_type = AlertType::parse(&record.alert_type)
        .ok_or_else(|| format!("Unknown alert type: {}", record.alert_type))?;
    let severity = AlertSeverity::parse(&record.severity)
        .ok_or_else(|| format!("Unknown alert severity: {}", record.severity))?;

    Ok(Alert {
        id: parse_string_to_uuid(&record.id)?,
        patient_id: parse_string_to_uuid(&record.patient_id)?,
        reading_id: parse_optional_uuid(record.reading_id)?,
        report_id: parse_optional_uuid(record.report_id)?,
        alert_type,
        severity,
        priority: record.priority,
        title: record.title,
        message: record.message,
        details: record.details,
        recommendations: record.recommendations,
        suggested_tests: record.suggested_tests,
        is_read: record.is_read,
        is_acknowledged: record.is_acknowledged,
        acknowledged_at: record.acknowledged_at,
        notification_sent: record.notification_sent,
        notification_sent_at: record.notification_sent_at,
        family_notified: record.family_notified,
        family_notified_at: record.family_notified_at,
        expires_at: record.expires_at,
        created_at: record.created_at,
    })
}

fn convert_to_data_finding(finding: &ReportFinding) -> FindingRecord {
    FindingRecord {
        parameter: finding.parameter.clone(),
        value: finding.value,
        normal_range: finding.normal_range.clone(),
        severity: finding.severity.as_str().to_string(),
        message: finding.message.clone(),
    }
}

fn convert_to_domain_finding(record: FindingRecord) -> Result<ReportFinding, String> {
    Ok(ReportFinding {
        severity: FindingSeverity::parse(&record.severity)
            .ok_or_else(|| format!("Unknown finding severity: {}", record.severity))?,
        parameter: record.parameter,
        value: record.value,
        normal_range: record.normal_range,
        message: record.message,
    })
}

pub fn convert_to_data_report(report: &Report) -> Result<ReportRecord, String> {
    Ok(ReportRecord {
        id: report.id.to_string(),
        patient_id: report.patient_id.to_string(),
        report_type: report.report_type.as_str().to_string(),
        file_url: report.file_url.clone(),
        file_name: report.file_name.clone(),
        file_type: report.file_type.map(|t| t.as_str().to_string()),
        status: report.status.as_str().to_string(),
        data: serde_json::to_value(&report.data).map_err(|e| format!("Invalid report data: {}", e))?,
        findings: report.findings.iter().map(convert_to_data_finding).collect(),
        ocr_confidence: report.ocr_confidence,
        processing_time_ms: report.processing_time_ms,
        error_message: report.error_message.clone(),
        uploaded_at: report.uploaded_at,
        processed_at: report.processed_at,
        notes: report.notes.clone(),
    })
}

pub fn convert_to_domain_report(record: ReportRecord) -> Result<Report, String> {
    let report_type = ReportType::parse(&record.report_type)
        .ok_or_else(|| format!("Unknown report type: {}", record.report_type))?;
    let status = ReportStatus::parse(&record.status)
        .ok_or_else(|| format!("Unknown report status: {}", record.status))?;
    let file_type = match record.file_type.as_deref() {
        Some(value) => Some(FileType::parse(value).ok_or_else(|| format!("Unknown file type: {}", value))?),
        None => None,
    };
    let data: ReportData = if record.data.is_null() {
        ReportData::default()
    } else {
        serde_json::from_value(record.data).map_err(|e| format!("Invalid report data: {}", e))?
    };

    Ok(Report {
        id: parse_string_to_uuid(&record.id)?,
        patient_id: parse_string_to_uuid(&record.patient_id)?,
        report_type,
        file_url: record.file_url,
        file_name: record.file_name,
        file_type,
        status,
        data,
        findings: record
            .findings
            .into_iter()
            .map(convert_to_domain_finding)
            .collect::<Result<Vec<_>, _>>()?,
        ocr_confidence: record.ocr_confidence,
        processing_time_ms: record.processing_time_ms,
        error_message: record.error_message,
        uploaded_at: record.uploaded_at,
        processed_at: record.processed_at,
        notes: record.notes,
    })
}

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::engine::severity::{AlertSeverity, FindingSeverity};
use crate::engine::wellness::{health_status_message, split_suggestions, wellness_suggestions};
use crate::entities::alert::{Alert, AlertType, ManualAlert};
use crate::entities::reading::Reading;
use crate::entities::report::ReportFinding;

/// Fixed wording for one report-finding bucket
struct BucketTemplate {
    finding: FindingSeverity,
    alert_type: AlertType,
    title: &'static str,
    suggested_tests: &'static [&'static str],
    recommendations: &'static [&'static str],
}

const REPORT_BUCKETS: [BucketTemplate; 3] = [
    BucketTemplate {
        finding: FindingSeverity::Critical,
        alert_type: AlertType::ReportCritical,
        title: "🚨 Critical Lab Results Detected",
        suggested_tests: &["Immediate doctor consultation", "Repeat tests if needed"],
        recommendations: &[
            "Consult your doctor immediately",
            "Do not ignore these findings",
            "Carry report to emergency if symptoms worsen",
        ],
    },
    BucketTemplate {
        finding: FindingSeverity::Abnormal,
        alert_type: AlertType::ReportAbnormal,
        title: "⚠️ Abnormal Lab Results",
        suggested_tests: &["Doctor consultation recommended", "Follow-up tests may be needed"],
        recommendations: &[
            "Schedule a doctor appointment soon",
            "Discuss these results with your physician",
            "Follow prescribed treatment if any",
        ],
    },
    BucketTemplate {
        finding: FindingSeverity::Borderline,
        alert_type: AlertType::ReportBorderline,
        title: "ℹ️ Borderline Lab Results",
        suggested_tests: &[],
        recommendations: &[
            "Monitor these parameters regularly",
            "Maintain healthy lifestyle",
            "Discuss with doctor during next visit",
        ],
    },
];

impl BucketTemplate {
    fn message(&self, findings: &[&ReportFinding]) -> String {
        let parameters: Vec<&str> = findings.iter().map(|f| f.parameter.as_str()).collect();
        let fragments: Vec<String> = findings
            .iter()
            .map(|f| format!("{}: {}", f.parameter, f.message))
            .collect();
        let (parameters, fragments) = (parameters.join(", "), fragments.join("; "));

        match self.finding {
            FindingSeverity::Critical => format!(
                "Critical abnormalities found in your medical report: {}. {}",
                parameters, fragments
            ),
            FindingSeverity::Abnormal => format!(
                "Some abnormal values detected in your report: {}. {}",
                parameters, fragments
            ),
            _ => format!(
                "Some borderline values detected: {}. {}. Monitor these parameters.",
                parameters, fragments
            ),
        }
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

/// Builds alerts from classifier output.
///
/// Every call yields fresh alerts; repeats across submissions are not
/// suppressed. Callers must keep at most one classification pass in flight
/// per reading or report, otherwise the same event can be alerted twice.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertFactory {
    ttl: Option<Duration>,
}

impl AlertFactory {
    /// `ttl` sets `expiresAt` on every alert the factory creates
    pub fn new(ttl: Option<Duration>) -> Self {
        Self { ttl }
    }

    fn blank(&self, patient_id: Uuid, alert_type: AlertType, severity: AlertSeverity, now: DateTime<Utc>) -> Alert {
        Alert {
            id: Uuid::new_v4(),
            patient_id,
            reading_id: None,
            report_id: None,
            alert_type,
            severity,
            priority: severity.priority(),
            title: String::new(),
            message: String::new(),
            details: None,
            recommendations: Vec::new(),
            suggested_tests: Vec::new(),
            is_read: false,
            is_acknowledged: false,
            acknowledged_at: None,
            notification_sent: false,
            notification_sent_at: None,
            family_notified: false,
            family_notified_at: None,
            expires_at: self.ttl.map(|ttl| now + ttl),
            created_at: now,
        }
    }

    /// Alert for a classified reading, `None` when the reading is normal.
    ///
    /// Danger-level alerts are pre-marked for family notification.
    pub fn for_reading(&self, reading: &Reading) -> Option<Alert> {
        let status = &reading.abnormality_status;
        let severity = status.level.alert_severity()?;
        let (suggested_tests, recommendations) = split_suggestions(&wellness_suggestions(&status.flags));

        let mut alert = self.blank(reading.patient_id, AlertType::ReadingAbnormal, severity, Utc::now());
        alert.reading_id = Some(reading.id);
        alert.title = health_status_message(status.level).title.to_string();
        alert.message = status.details.clone();
        alert.details = Some(json!({
            "reading": {
                "bp": format!("{}/{}", reading.bp.systolic, reading.bp.diastolic),
                "heartRate": reading.heart_rate,
                "sugar": reading.sugar,
                "sleepHours": reading.sleep_hours,
                "weight": reading.weight,
            },
            "flags": status.flags,
        }));
        alert.recommendations = recommendations;
        alert.suggested_tests = suggested_tests;
        alert.family_notified = severity == AlertSeverity::Danger;

        debug!(reading_id = %reading.id, %severity, "Created reading alert");
        Some(alert)
    }

    /// One alert per non-empty severity bucket: critical, abnormal, borderline
    pub fn for_report(&self, patient_id: Uuid, report_id: Uuid, findings: &[ReportFinding]) -> Vec<Alert> {
        let now = Utc::now();

        REPORT_BUCKETS
            .iter()
            .filter_map(|template| {
                let bucket: Vec<&ReportFinding> =
                    findings.iter().filter(|f| f.severity == template.finding).collect();
                if bucket.is_empty() {
                    return None;
                }
                let severity = template.finding.alert_severity()?;

                let mut alert = self.blank(patient_id, template.alert_type, severity, now);
                alert.report_id = Some(report_id);
                alert.title = template.title.to_string();
                alert.message = template.message(&bucket);
                alert.details = Some(json!({ "reportId": report_id, "abnormalities": bucket }));
                alert.recommendations = owned(template.recommendations);
                alert.suggested_tests = owned(template.suggested_tests);

                debug!(%report_id, %severity, findings = bucket.len(), "Created report alert");
                Some(alert)
            })
            .collect()
    }

    /// Alert raised outside the classifiers, prioritized by the severity table
    pub fn manual(&self, patient_id: Uuid, input: ManualAlert) -> Alert {
        let mut alert = self.blank(patient_id, input.alert_type, input.severity, Utc::now());
        alert.reading_id = input.reading_id;
        alert.report_id = input.report_id;
        alert.title = input.title;
        alert.message = input.message;
        alert.details = input.details;
        alert.recommendations = input.recommendations;
        alert.suggested_tests = input.suggested_tests;
        alert
    }
}

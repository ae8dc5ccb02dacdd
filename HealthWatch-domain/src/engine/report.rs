//! Lab-report classification over the structured parameter groups.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rules::lab::{self, LabParameter};
use super::severity::FindingSeverity;
use crate::entities::report::{ReportData, ReportFinding};

type Accessor = fn(&ReportData) -> Option<f64>;

/// Parameters in evaluation order: group by group, then within each group.
const PARAMETERS: &[(LabParameter, Accessor)] = &[
    (lab::HEMOGLOBIN, |d: &ReportData| d.blood_test.as_ref()?.hemoglobin),
    (lab::WBC, |d: &ReportData| d.blood_test.as_ref()?.wbc),
    (lab::PLATELETS, |d: &ReportData| d.blood_test.as_ref()?.platelets),
    (lab::TOTAL_CHOLESTEROL, |d: &ReportData| d.lipid_profile.as_ref()?.total_cholesterol),
    (lab::LDL, |d: &ReportData| d.lipid_profile.as_ref()?.ldl),
    (lab::HDL, |d: &ReportData| d.lipid_profile.as_ref()?.hdl),
    (lab::TRIGLYCERIDES, |d: &ReportData| d.lipid_profile.as_ref()?.triglycerides),
    (lab::CREATININE, |d: &ReportData| d.kidney_function.as_ref()?.creatinine),
    (lab::UREA, |d: &ReportData| d.kidney_function.as_ref()?.urea),
    (lab::SGOT, |d: &ReportData| d.liver_function.as_ref()?.sgot),
    (lab::SGPT, |d: &ReportData| d.liver_function.as_ref()?.sgpt),
    (lab::TOTAL_BILIRUBIN, |d: &ReportData| d.liver_function.as_ref()?.total_bilirubin),
    (lab::FASTING_GLUCOSE, |d: &ReportData| d.diabetes_markers.as_ref()?.fasting_glucose),
    (lab::HBA1C, |d: &ReportData| d.diabetes_markers.as_ref()?.hba1c),
    (lab::TSH, |d: &ReportData| d.thyroid_function.as_ref()?.tsh),
];

/// Produce the ordered finding list for a report.
///
/// Absent groups and absent parameters contribute nothing, so empty data
/// yields an empty list. The result replaces any earlier findings.
pub fn classify(data: &ReportData) -> Vec<ReportFinding> {
    let findings: Vec<ReportFinding> = PARAMETERS
        .iter()
        .filter_map(|(parameter, value_of)| {
            let value = value_of(data)?;
            let hit = parameter.classify(value)?;
            Some(ReportFinding {
                parameter: parameter.name.to_string(),
                value,
                normal_range: hit.normal_range.to_string(),
                severity: hit.severity,
                message: hit.message.to_string(),
            })
        })
        .collect();

    debug!(findings = findings.len(), "Classified report data");
    findings
}

/// Count of findings per severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SeveritySummary {
    pub normal: usize,
    pub borderline: usize,
    pub abnormal: usize,
    pub critical: usize,
}

impl SeveritySummary {
    pub fn total(&self) -> usize {
        self.normal + self.borderline + self.abnormal + self.critical
    }
}

pub fn severity_summary(findings: &[ReportFinding]) -> SeveritySummary {
    findings.iter().fold(SeveritySummary::default(), |mut summary, finding| {
        match finding.severity {
            FindingSeverity::Normal => summary.normal += 1,
            FindingSeverity::Borderline => summary.borderline += 1,
            FindingSeverity::Abnormal => summary.abnormal += 1,
            FindingSeverity::Critical => summary.critical += 1,
        }
        summary
    })
}

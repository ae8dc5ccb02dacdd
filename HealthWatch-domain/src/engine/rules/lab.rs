//! Threshold tables for lab-report parameters

use super::{Bound, Classification, Rule, RuleSet};
use crate::engine::severity::FindingSeverity::{self, Abnormal, Borderline, Critical};

/// Threshold table for one named lab parameter
#[derive(Debug, Clone, Copy)]
pub struct LabParameter {
    /// Display name used on findings
    pub name: &'static str,
    pub normal_range: &'static str,
    pub high: &'static [Rule<Bound, FindingSeverity>],
    pub low: &'static [Rule<Bound, FindingSeverity>],
}

impl LabParameter {
    /// Classify a value; at most one band matches, high side first
    pub fn classify(&self, value: f64) -> Option<Classification<FindingSeverity>> {
        if !value.is_finite() {
            return None;
        }
        let high = RuleSet { normal_range: self.normal_range, rules: self.high };
        let low = RuleSet { normal_range: self.normal_range, rules: self.low };
        high.classify(&value).or_else(|| low.classify(&value))
    }
}

const fn above(limit: f64, severity: FindingSeverity, message: &'static str) -> Rule<Bound, FindingSeverity> {
    Rule { when: Bound::Above(limit), severity, message }
}

const fn below(limit: f64, severity: FindingSeverity, message: &'static str) -> Rule<Bound, FindingSeverity> {
    Rule { when: Bound::Below(limit), severity, message }
}

// Hematology

pub const HEMOGLOBIN: LabParameter = LabParameter {
    name: "Hemoglobin",
    normal_range: "12-16 g/dL",
    high: &[above(16.0, Abnormal, "High hemoglobin - Polycythemia suspected")],
    low: &[
        below(8.0, Critical, "Low hemoglobin - Anemia suspected"),
        below(12.0, Abnormal, "Low hemoglobin - Anemia suspected"),
    ],
};

pub const WBC: LabParameter = LabParameter {
    name: "WBC",
    normal_range: "4000-11000 cells/μL",
    high: &[
        above(20000.0, Critical, "High WBC count - Possible infection"),
        above(11000.0, Abnormal, "High WBC count - Possible infection"),
    ],
    low: &[
        below(2000.0, Critical, "Low WBC count - Immune system weakness"),
        below(4000.0, Abnormal, "Low WBC count - Immune system weakness"),
    ],
};

pub const PLATELETS: LabParameter = LabParameter {
    name: "Platelets",
    normal_range: "150000-450000 cells/μL",
    high: &[above(450000.0, Abnormal, "High platelet count - Clotting risk")],
    low: &[
        below(50000.0, Critical, "Low platelet count - Bleeding risk"),
        below(150000.0, Abnormal, "Low platelet count - Bleeding risk"),
    ],
};

// Lipid profile

pub const TOTAL_CHOLESTEROL: LabParameter = LabParameter {
    name: "Total Cholesterol",
    normal_range: "<200 mg/dL",
    high: &[
        above(300.0, Critical, "High cholesterol - Heart disease risk"),
        above(240.0, Abnormal, "High cholesterol - Heart disease risk"),
        above(200.0, Borderline, "Borderline high cholesterol"),
    ],
    low: &[],
};

pub const LDL: LabParameter = LabParameter {
    name: "LDL Cholesterol",
    normal_range: "<100 mg/dL",
    high: &[
        above(190.0, Critical, "High LDL - Bad cholesterol elevated"),
        above(160.0, Abnormal, "High LDL - Bad cholesterol elevated"),
    ],
    low: &[],
};

pub const HDL: LabParameter = LabParameter {
    name: "HDL Cholesterol",
    normal_range: ">40 mg/dL",
    high: &[],
    low: &[below(40.0, Abnormal, "Low HDL - Good cholesterol too low")],
};

pub const TRIGLYCERIDES: LabParameter = LabParameter {
    name: "Triglycerides",
    normal_range: "<150 mg/dL",
    high: &[
        above(500.0, Critical, "High triglycerides - Heart disease risk"),
        above(200.0, Abnormal, "High triglycerides - Heart disease risk"),
    ],
    low: &[],
};

// Kidney function

pub const CREATININE: LabParameter = LabParameter {
    name: "Creatinine",
    normal_range: "0.6-1.3 mg/dL",
    high: &[
        above(2.0, Critical, "High creatinine - Kidney function issue"),
        above(1.3, Abnormal, "High creatinine - Kidney function issue"),
    ],
    low: &[],
};

pub const UREA: LabParameter = LabParameter {
    name: "Urea",
    normal_range: "15-45 mg/dL",
    high: &[
        above(100.0, Critical, "High urea - Kidney function concern"),
        above(45.0, Abnormal, "High urea - Kidney function concern"),
    ],
    low: &[],
};

// Liver function

pub const SGOT: LabParameter = LabParameter {
    name: "SGOT/AST",
    normal_range: "5-40 U/L",
    high: &[
        above(100.0, Critical, "Elevated SGOT - Liver damage possible"),
        above(40.0, Abnormal, "Elevated SGOT - Liver damage possible"),
    ],
    low: &[],
};

pub const SGPT: LabParameter = LabParameter {
    name: "SGPT/ALT",
    normal_range: "7-56 U/L",
    high: &[
        above(100.0, Critical, "Elevated SGPT - Liver inflammation"),
        above(56.0, Abnormal, "Elevated SGPT - Liver inflammation"),
    ],
    low: &[],
};

pub const TOTAL_BILIRUBIN: LabParameter = LabParameter {
    name: "Total Bilirubin",
    normal_range: "0.1-1.2 mg/dL",
    high: &[
        above(3.0, Critical, "High bilirubin - Liver/bile duct issue"),
        above(1.2, Abnormal, "High bilirubin - Liver/bile duct issue"),
    ],
    low: &[],
};

// Diabetes markers

pub const FASTING_GLUCOSE: LabParameter = LabParameter {
    name: "Fasting Glucose",
    normal_range: "70-100 mg/dL",
    high: &[
        above(200.0, Critical, "High fasting glucose - Diabetes indicated"),
        above(126.0, Abnormal, "High fasting glucose - Diabetes indicated"),
        above(100.0, Borderline, "Pre-diabetes range"),
    ],
    low: &[],
};

pub const HBA1C: LabParameter = LabParameter {
    name: "HbA1c",
    normal_range: "<5.7%",
    high: &[
        above(9.0, Critical, "High HbA1c - Diabetes confirmed"),
        above(6.5, Abnormal, "High HbA1c - Diabetes confirmed"),
        above(5.7, Borderline, "Pre-diabetes range"),
    ],
    low: &[],
};

// Thyroid function

pub const TSH: LabParameter = LabParameter {
    name: "TSH",
    normal_range: "0.4-4.5 mIU/L",
    high: &[
        above(10.0, Critical, "High TSH - Hypothyroidism suspected"),
        above(4.5, Abnormal, "High TSH - Hypothyroidism suspected"),
    ],
    low: &[
        below(0.1, Critical, "Low TSH - Hyperthyroidism suspected"),
        below(0.4, Abnormal, "Low TSH - Hyperthyroidism suspected"),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::severity::FindingSeverity::Normal;

    fn severity(parameter: &LabParameter, value: f64) -> FindingSeverity {
        parameter.classify(value).map(|c| c.severity).unwrap_or(Normal)
    }

    #[test]
    fn test_hemoglobin_bands() {
        assert_eq!(severity(&HEMOGLOBIN, 7.0), Critical);
        assert_eq!(severity(&HEMOGLOBIN, 11.0), Abnormal);
        assert_eq!(severity(&HEMOGLOBIN, 14.0), Normal);
        assert_eq!(severity(&HEMOGLOBIN, 16.0), Normal);
        assert_eq!(severity(&HEMOGLOBIN, 16.1), Abnormal);
        assert_eq!(HEMOGLOBIN.classify(17.2).unwrap().message, "High hemoglobin - Polycythemia suspected");
    }

    #[test]
    fn test_borderline_only_where_defined() {
        assert_eq!(severity(&TOTAL_CHOLESTEROL, 210.0), Borderline);
        assert_eq!(severity(&FASTING_GLUCOSE, 110.0), Borderline);
        assert_eq!(severity(&HBA1C, 6.0), Borderline);
        assert_eq!(severity(&LDL, 150.0), Normal);
        assert_eq!(severity(&TRIGLYCERIDES, 180.0), Normal);
    }

    #[test]
    fn test_single_threshold_parameters() {
        assert_eq!(severity(&CREATININE, 1.3), Normal);
        assert_eq!(severity(&CREATININE, 1.4), Abnormal);
        assert_eq!(severity(&CREATININE, 2.0), Abnormal);
        assert_eq!(severity(&CREATININE, 2.5), Critical);
        assert_eq!(severity(&SGPT, 55.0), Normal);
        assert_eq!(severity(&HDL, 39.0), Abnormal);
        assert_eq!(severity(&HDL, 40.0), Normal);
    }

    #[test]
    fn test_tsh_both_directions() {
        assert_eq!(severity(&TSH, 12.0), Critical);
        assert_eq!(severity(&TSH, 5.0), Abnormal);
        assert_eq!(severity(&TSH, 4.5), Normal);
        assert_eq!(severity(&TSH, 10.0), Abnormal);
        assert_eq!(severity(&TSH, 0.3), Abnormal);
        assert_eq!(severity(&TSH, 0.05), Critical);
        assert!(TSH.classify(0.05).unwrap().message.contains("Hyperthyroidism"));
    }

    #[test]
    fn test_range_edges_stay_normal() {
        let edges = [
            (&WBC, 11000.0),
            (&PLATELETS, 450000.0),
            (&UREA, 45.0),
            (&SGOT, 40.0),
            (&SGPT, 56.0),
            (&TOTAL_BILIRUBIN, 1.2),
        ];
        for (parameter, value) in edges {
            assert!(parameter.classify(value).is_none(), "{} at {}", parameter.name, value);
        }
        assert_eq!(severity(&TOTAL_CHOLESTEROL, 200.0), Normal);
        assert_eq!(severity(&TOTAL_CHOLESTEROL, 240.0), Borderline);
        assert_eq!(severity(&HBA1C, 6.5), Borderline);
        assert_eq!(severity(&WBC, 20000.0), Abnormal);
        assert_eq!(severity(&WBC, 20001.0), Critical);
    }

    #[test]
    fn test_non_finite_is_skipped() {
        assert!(HEMOGLOBIN.classify(f64::NAN).is_none());
        assert!(WBC.classify(f64::INFINITY).is_none());
    }

    #[test]
    fn test_normal_range_is_reported() {
        let finding = PLATELETS.classify(40000.0).unwrap();
        assert_eq!(finding.normal_range, "150000-450000 cells/μL");
        assert_eq!(finding.severity, Critical);
    }
}

//! Threshold tables for vitals readings

use super::{Bound, Join, PairBound, Rule, RuleSet};
use crate::engine::severity::VitalLevel;

const fn bp_high(systolic: f64, diastolic: f64) -> PairBound {
    PairBound {
        first: Bound::AtLeast(systolic),
        second: Bound::AtLeast(diastolic),
        join: Join::Any,
    }
}

// Low pressure needs both numbers under the cutoff.
const fn bp_low(systolic: f64, diastolic: f64) -> PairBound {
    PairBound {
        first: Bound::Below(systolic),
        second: Bound::Below(diastolic),
        join: Join::All,
    }
}

pub const BP_NORMAL_RANGE: &str = "100/65 - 129/84 mmHg";
pub const HEART_RATE_NORMAL_RANGE: &str = "60-100 bpm";
pub const SUGAR_NORMAL_RANGE: &str = "80-139 mg/dL";
pub const SLEEP_NORMAL_RANGE: &str = "6-10 hours";

pub const BP_HIGH: RuleSet<PairBound, VitalLevel> = RuleSet {
    normal_range: BP_NORMAL_RANGE,
    rules: &[
        Rule {
            when: bp_high(180.0, 120.0),
            severity: VitalLevel::Danger,
            message: "Critical high BP (Hypertensive Crisis)! Seek immediate medical attention.",
        },
        Rule {
            when: bp_high(160.0, 100.0),
            severity: VitalLevel::Danger,
            message: "Very high BP detected! Please consult a doctor immediately.",
        },
        Rule {
            when: bp_high(140.0, 90.0),
            severity: VitalLevel::Warning,
            message: "High BP detected (Stage 1 Hypertension). Monitor closely.",
        },
        Rule {
            when: bp_high(130.0, 85.0),
            severity: VitalLevel::Warning,
            message: "Elevated BP. Consider reducing salt intake and stress.",
        },
    ],
};

pub const BP_LOW: RuleSet<PairBound, VitalLevel> = RuleSet {
    normal_range: BP_NORMAL_RANGE,
    rules: &[
        Rule {
            when: bp_low(90.0, 60.0),
            severity: VitalLevel::Danger,
            message: "Very low BP (Hypotension)! Risk of dizziness and fainting.",
        },
        Rule {
            when: bp_low(100.0, 65.0),
            severity: VitalLevel::Warning,
            message: "Low BP detected. Stay hydrated and avoid sudden movements.",
        },
    ],
};

pub const HEART_RATE_HIGH: RuleSet<Bound, VitalLevel> = RuleSet {
    normal_range: HEART_RATE_NORMAL_RANGE,
    rules: &[
        Rule {
            when: Bound::AtLeast(120.0),
            severity: VitalLevel::Danger,
            message: "Very high heart rate (Tachycardia)! Seek medical attention.",
        },
        Rule {
            when: Bound::Above(100.0),
            severity: VitalLevel::Warning,
            message: "Elevated heart rate. Try to rest and relax.",
        },
    ],
};

pub const HEART_RATE_LOW: RuleSet<Bound, VitalLevel> = RuleSet {
    normal_range: HEART_RATE_NORMAL_RANGE,
    rules: &[
        Rule {
            when: Bound::Below(50.0),
            severity: VitalLevel::Danger,
            message: "Very low heart rate (Bradycardia). Consult a doctor.",
        },
        Rule {
            when: Bound::Below(60.0),
            severity: VitalLevel::Warning,
            message: "Low heart rate detected. Monitor if you experience dizziness.",
        },
    ],
};

pub const SUGAR_HIGH: RuleSet<Bound, VitalLevel> = RuleSet {
    normal_range: SUGAR_NORMAL_RANGE,
    rules: &[
        Rule {
            when: Bound::AtLeast(250.0),
            severity: VitalLevel::Danger,
            message: "Very high blood sugar! Risk of diabetic emergency. Seek immediate care.",
        },
        Rule {
            when: Bound::AtLeast(180.0),
            severity: VitalLevel::Danger,
            message: "High blood sugar detected. Contact your doctor.",
        },
        Rule {
            when: Bound::AtLeast(140.0),
            severity: VitalLevel::Warning,
            message: "Elevated blood sugar. Avoid sugary foods and monitor closely.",
        },
    ],
};

pub const SUGAR_LOW: RuleSet<Bound, VitalLevel> = RuleSet {
    normal_range: SUGAR_NORMAL_RANGE,
    rules: &[
        Rule {
            when: Bound::Below(70.0),
            severity: VitalLevel::Danger,
            message: "Low blood sugar (Hypoglycemia)! Eat something sweet immediately.",
        },
        Rule {
            when: Bound::Below(80.0),
            severity: VitalLevel::Warning,
            message: "Blood sugar is on the lower side. Have a healthy snack.",
        },
    ],
};

pub const SLEEP_SHORT: RuleSet<Bound, VitalLevel> = RuleSet {
    normal_range: SLEEP_NORMAL_RANGE,
    rules: &[Rule {
        when: Bound::Below(6.0),
        severity: VitalLevel::Warning,
        message: "Insufficient sleep detected. Aim for 7-8 hours per night.",
    }],
};

pub const SLEEP_LONG: RuleSet<Bound, VitalLevel> = RuleSet {
    normal_range: SLEEP_NORMAL_RANGE,
    rules: &[Rule {
        when: Bound::Above(10.0),
        severity: VitalLevel::Warning,
        message: "Excessive sleep detected. This may indicate underlying issues.",
    }],
};

#[cfg(test)]
mod tests {
    use super::*;

    fn level(set: &RuleSet<Bound, VitalLevel>, value: f64) -> Option<VitalLevel> {
        set.classify(&value).map(|c| c.severity)
    }

    #[test]
    fn test_bp_high_bands() {
        let classify = |s: f64, d: f64| BP_HIGH.classify(&(s, d)).map(|c| (c.severity, c.message));

        assert_eq!(classify(180.0, 70.0).map(|c| c.0), Some(VitalLevel::Danger));
        assert!(classify(120.0, 120.0).unwrap().1.contains("Hypertensive Crisis"));
        assert!(classify(165.0, 80.0).unwrap().1.starts_with("Very high BP"));
        assert_eq!(classify(140.0, 70.0).map(|c| c.0), Some(VitalLevel::Warning));
        assert!(classify(125.0, 85.0).unwrap().1.starts_with("Elevated BP"));
        assert_eq!(classify(129.0, 84.0), None);
    }

    #[test]
    fn test_bp_low_requires_both() {
        assert_eq!(BP_LOW.classify(&(85.0, 55.0)).map(|c| c.severity), Some(VitalLevel::Danger));
        assert_eq!(BP_LOW.classify(&(85.0, 62.0)).map(|c| c.severity), Some(VitalLevel::Warning));
        assert_eq!(BP_LOW.classify(&(85.0, 70.0)), None);
        assert_eq!(BP_LOW.classify(&(100.0, 55.0)), None);
    }

    #[test]
    fn test_heart_rate_boundaries() {
        assert_eq!(level(&HEART_RATE_HIGH, 120.0), Some(VitalLevel::Danger));
        assert_eq!(level(&HEART_RATE_HIGH, 119.0), Some(VitalLevel::Warning));
        assert_eq!(level(&HEART_RATE_HIGH, 101.0), Some(VitalLevel::Warning));
        assert_eq!(level(&HEART_RATE_HIGH, 100.0), None);
        assert_eq!(level(&HEART_RATE_LOW, 49.0), Some(VitalLevel::Danger));
        assert_eq!(level(&HEART_RATE_LOW, 50.0), Some(VitalLevel::Warning));
        assert_eq!(level(&HEART_RATE_LOW, 60.0), None);
    }

    #[test]
    fn test_sugar_boundaries() {
        assert_eq!(level(&SUGAR_HIGH, 250.0), Some(VitalLevel::Danger));
        assert_eq!(level(&SUGAR_HIGH, 180.0), Some(VitalLevel::Danger));
        assert_eq!(level(&SUGAR_HIGH, 140.0), Some(VitalLevel::Warning));
        assert_eq!(level(&SUGAR_HIGH, 139.9), None);
        assert_eq!(level(&SUGAR_LOW, 69.9), Some(VitalLevel::Danger));
        assert_eq!(level(&SUGAR_LOW, 79.0), Some(VitalLevel::Warning));
        assert_eq!(level(&SUGAR_LOW, 80.0), None);
    }

    #[test]
    fn test_sleep_boundaries() {
        assert_eq!(level(&SLEEP_SHORT, 5.5), Some(VitalLevel::Warning));
        assert_eq!(level(&SLEEP_SHORT, 6.0), None);
        assert_eq!(level(&SLEEP_LONG, 10.5), Some(VitalLevel::Warning));
        assert_eq!(level(&SLEEP_LONG, 10.0), None);
    }
}

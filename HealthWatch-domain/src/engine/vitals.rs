//! Combines the vitals rule sets over one reading.

use tracing::debug;

use super::rules::vitals::{
    BP_HIGH, BP_LOW, HEART_RATE_HIGH, HEART_RATE_LOW, SLEEP_LONG, SLEEP_SHORT, SUGAR_HIGH, SUGAR_LOW,
};
use super::rules::Classification;
use super::severity::{Severity, VitalLevel};
use crate::entities::reading::{AbnormalityStatus, StatusFlags, Vitals};

pub const ALL_NORMAL_DETAILS: &str = "✅ All readings are within normal range. Keep up the good work!";
const URGENT_PREFIX: &str = "⚠️ URGENT: ";
const WARNING_PREFIX: &str = "⚠️ Warning: ";
const FRAGMENT_SEPARATOR: &str = " | ";

/// Classify a validated vitals snapshot.
///
/// Every rule set is evaluated independently and sets its own flag. The
/// overall level is the worst contributing level and `details` lists the
/// messages of that tier only.
pub fn classify(vitals: &Vitals) -> AbnormalityStatus {
    let pressure = (f64::from(vitals.bp.systolic), f64::from(vitals.bp.diastolic));
    let heart_rate = f64::from(vitals.heart_rate);

    let mut flags = StatusFlags::default();
    let mut fired: Vec<Classification<VitalLevel>> = Vec::new();

    let mut record = |hit: Option<Classification<VitalLevel>>, flag: &mut bool| {
        if let Some(classification) = hit {
            *flag = true;
            fired.push(classification);
        }
    };

    record(BP_HIGH.classify(&pressure), &mut flags.high_bp);
    record(BP_LOW.classify(&pressure), &mut flags.low_bp);
    record(HEART_RATE_HIGH.classify(&heart_rate), &mut flags.high_heart_rate);
    record(HEART_RATE_LOW.classify(&heart_rate), &mut flags.low_heart_rate);
    record(SUGAR_HIGH.classify(&vitals.sugar), &mut flags.high_sugar);
    record(SUGAR_LOW.classify(&vitals.sugar), &mut flags.low_sugar);
    record(
        SLEEP_SHORT
            .classify(&vitals.sleep_hours)
            .or_else(|| SLEEP_LONG.classify(&vitals.sleep_hours)),
        &mut flags.poor_sleep,
    );

    let level = VitalLevel::worst_of(fired.iter().map(|c| c.severity));
    let details = describe(level, &fired);

    debug!(%level, findings = fired.len(), "Classified vitals reading");

    AbnormalityStatus { level, details, flags }
}

fn describe(level: VitalLevel, fired: &[Classification<VitalLevel>]) -> String {
    let prefix = match level {
        VitalLevel::Normal => return ALL_NORMAL_DETAILS.to_string(),
        VitalLevel::Warning => WARNING_PREFIX,
        VitalLevel::Danger => URGENT_PREFIX,
    };

    let messages: Vec<&str> = fired
        .iter()
        .filter(|c| c.severity == level)
        .map(|c| c.message)
        .collect();

    format!("{}{}", prefix, messages.join(FRAGMENT_SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::reading::BloodPressure;

    fn vitals(systolic: u16, diastolic: u16, heart_rate: u16, sugar: f64, sleep_hours: f64) -> Vitals {
        Vitals {
            bp: BloodPressure { systolic, diastolic },
            heart_rate,
            sugar,
            sleep_hours,
            weight: 70.0,
        }
    }

    #[test]
    fn test_normal_reading() {
        let status = classify(&vitals(120, 80, 75, 100.0, 7.0));
        assert_eq!(status.level, VitalLevel::Normal);
        assert_eq!(status.details, ALL_NORMAL_DETAILS);
        assert!(!status.flags.any());
    }

    #[test]
    fn test_mixed_danger_reading_reports_danger_tier_only() {
        let status = classify(&vitals(165, 105, 110, 190.0, 4.0));

        assert_eq!(status.level, VitalLevel::Danger);
        assert!(status.flags.high_bp);
        assert!(status.flags.high_sugar);
        assert!(status.flags.poor_sleep);
        assert!(status.flags.high_heart_rate);
        assert!(!status.flags.low_bp);

        assert!(status.details.starts_with("⚠️ URGENT: "));
        assert!(status.details.contains("Very high BP detected!"));
        assert!(status.details.contains("High blood sugar detected."));
        assert!(!status.details.contains("Elevated heart rate"));
        assert!(!status.details.contains("Insufficient sleep"));
    }

    #[test]
    fn test_crisis_threshold_forces_danger() {
        for (systolic, diastolic) in [(180, 70), (120, 120), (200, 130)] {
            let status = classify(&vitals(systolic, diastolic, 75, 100.0, 7.0));
            assert_eq!(status.level, VitalLevel::Danger);
            assert!(status.flags.high_bp);
        }
    }

    #[test]
    fn test_warnings_are_joined() {
        let status = classify(&vitals(135, 80, 105, 100.0, 11.0));

        assert_eq!(status.level, VitalLevel::Warning);
        assert_eq!(
            status.details,
            "⚠️ Warning: Elevated BP. Consider reducing salt intake and stress. | \
             Elevated heart rate. Try to rest and relax. | \
             Excessive sleep detected. This may indicate underlying issues."
        );
    }

    #[test]
    fn test_normal_range_edges() {
        let status = classify(&vitals(129, 84, 100, 139.0, 10.0));
        assert_eq!(status.level, VitalLevel::Normal);
        assert!(!status.flags.high_heart_rate);
        assert!(!status.flags.poor_sleep);

        let status = classify(&vitals(120, 80, 101, 100.0, 6.0));
        assert_eq!(status.level, VitalLevel::Warning);
        assert!(status.flags.high_heart_rate);
        assert!(!status.flags.poor_sleep);
    }

    #[test]
    fn test_low_side_flags() {
        let status = classify(&vitals(85, 55, 45, 65.0, 7.0));
        assert_eq!(status.level, VitalLevel::Danger);
        assert!(status.flags.low_bp);
        assert!(status.flags.low_heart_rate);
        assert!(status.flags.low_sugar);
        assert!(!status.flags.high_bp);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let input = vitals(150, 95, 130, 260.0, 5.0);
        assert_eq!(classify(&input), classify(&input));
    }
}

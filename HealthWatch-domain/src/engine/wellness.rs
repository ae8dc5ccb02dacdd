//! Patient-facing status messages and wellness suggestions keyed by vitals flags.

use serde::{Deserialize, Serialize};

use super::severity::VitalLevel;
use crate::entities::reading::StatusFlags;

/// Headline shown to the patient for an overall level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthStatusMessage {
    pub emoji: &'static str,
    pub title: &'static str,
    pub color: &'static str,
    pub advice: &'static str,
}

pub fn health_status_message(level: VitalLevel) -> HealthStatusMessage {
    match level {
        VitalLevel::Normal => HealthStatusMessage {
            emoji: "✅",
            title: "All Good!",
            color: "green",
            advice: "Your health readings are normal. Continue your healthy lifestyle!",
        },
        VitalLevel::Warning => HealthStatusMessage {
            emoji: "⚠️",
            title: "Attention Needed",
            color: "yellow",
            advice: "Some readings need attention. Follow the recommendations and monitor closely.",
        },
        VitalLevel::Danger => HealthStatusMessage {
            emoji: "❗",
            title: "Urgent Care Required",
            color: "red",
            advice: "Critical readings detected! Please seek medical attention immediately.",
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Test,
    Lifestyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub title: &'static str,
    pub items: &'static [&'static str],
}

const fn recommended_tests(items: &'static [&'static str]) -> Suggestion {
    Suggestion { kind: SuggestionKind::Test, title: "Recommended Tests", items }
}

const fn lifestyle_changes(items: &'static [&'static str]) -> Suggestion {
    Suggestion { kind: SuggestionKind::Lifestyle, title: "Lifestyle Changes", items }
}

const HIGH_BP: [Suggestion; 2] = [
    recommended_tests(&["Kidney Function Test", "Lipid Profile", "ECG", "Echocardiogram"]),
    lifestyle_changes(&["Reduce salt intake", "Exercise 30 mins daily", "Manage stress", "Limit alcohol"]),
];

const HIGH_SUGAR: [Suggestion; 2] = [
    recommended_tests(&["HbA1c", "Fasting Blood Sugar", "Kidney Function", "Eye Examination"]),
    lifestyle_changes(&["Avoid sugary foods", "Eat more fiber", "Regular exercise", "Monitor carb intake"]),
];

const HIGH_HEART_RATE: [Suggestion; 2] = [
    recommended_tests(&["ECG", "Thyroid Profile", "Complete Blood Count", "Stress Test"]),
    lifestyle_changes(&["Practice deep breathing", "Reduce caffeine", "Get adequate rest", "Manage anxiety"]),
];

const POOR_SLEEP: [Suggestion; 1] = [Suggestion {
    kind: SuggestionKind::Lifestyle,
    title: "Sleep Improvement",
    items: &[
        "Maintain sleep schedule",
        "Avoid screens before bed",
        "Create dark environment",
        "Limit evening caffeine",
    ],
}];

/// Suggestions for the active flags, in a fixed flag order
pub fn wellness_suggestions(flags: &StatusFlags) -> Vec<Suggestion> {
    let groups: [(bool, &[Suggestion]); 4] = [
        (flags.high_bp, &HIGH_BP),
        (flags.high_sugar, &HIGH_SUGAR),
        (flags.high_heart_rate, &HIGH_HEART_RATE),
        (flags.poor_sleep, &POOR_SLEEP),
    ];

    groups
        .into_iter()
        .filter(|(active, _)| *active)
        .flat_map(|(_, suggestions)| suggestions.iter().copied())
        .collect()
}

/// Split suggestions into (suggested tests, lifestyle recommendations), concatenated without dedup
pub fn split_suggestions(suggestions: &[Suggestion]) -> (Vec<String>, Vec<String>) {
    let mut tests = Vec::new();
    let mut recommendations = Vec::new();
    for suggestion in suggestions {
        let target = match suggestion.kind {
            SuggestionKind::Test => &mut tests,
            SuggestionKind::Lifestyle => &mut recommendations,
        };
        target.extend(suggestion.items.iter().map(|item| item.to_string()));
    }
    (tests, recommendations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_messages() {
        assert_eq!(health_status_message(VitalLevel::Normal).title, "All Good!");
        assert_eq!(health_status_message(VitalLevel::Warning).color, "yellow");
        assert_eq!(health_status_message(VitalLevel::Danger).emoji, "❗");
    }

    #[test]
    fn test_no_flags_no_suggestions() {
        assert!(wellness_suggestions(&StatusFlags::default()).is_empty());
    }

    #[test]
    fn test_suggestions_follow_flag_order() {
        let flags = StatusFlags { poor_sleep: true, high_bp: true, ..Default::default() };
        let suggestions = wellness_suggestions(&flags);
        let titles: Vec<&str> = suggestions.iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["Recommended Tests", "Lifestyle Changes", "Sleep Improvement"]);
    }

    #[test]
    fn test_split_keeps_duplicates() {
        let flags = StatusFlags { high_bp: true, high_heart_rate: true, ..Default::default() };
        let (tests, recommendations) = split_suggestions(&wellness_suggestions(&flags));
        assert_eq!(tests.len(), 8);
        assert_eq!(tests.iter().filter(|t| *t == "ECG").count(), 2);
        assert_eq!(recommendations[0], "Reduce salt intake");
        assert_eq!(recommendations.len(), 8);
    }
}

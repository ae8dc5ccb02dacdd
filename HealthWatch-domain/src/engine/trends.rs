//! Rolling averages and half-window trend direction over recent readings.

use serde::{Deserialize, Serialize};

use super::severity::VitalLevel;
use crate::entities::reading::Reading;

/// Upper bound and default size of the analysis window
pub const MAX_WINDOW: usize = 30;
/// Minimum readings before a direction is computed
pub const MIN_TREND_READINGS: usize = 6;
/// Absolute difference between half-window averages that counts as movement
pub const TREND_THRESHOLD: f64 = 5.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    #[default]
    Stable,
    Increasing,
    Decreasing,
}

impl TrendDirection {
    fn between(recent: f64, older: f64) -> Self {
        let delta = recent - older;
        if delta.abs() < TREND_THRESHOLD {
            TrendDirection::Stable
        } else if delta > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Averages {
    pub systolic: f64,
    pub diastolic: f64,
    pub heart_rate: f64,
    pub sugar: f64,
    pub weight: f64,
    pub sleep_hours: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Trends {
    /// Direction of systolic pressure
    pub bp: TrendDirection,
    pub heart_rate: TrendDirection,
    pub sugar: TrendDirection,
    pub weight: TrendDirection,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
pub struct LevelCounts {
    pub normal: usize,
    pub warning: usize,
    pub danger: usize,
}

/// Statistics over a patient's most recent readings, recomputed per query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TrendSummary {
    pub total_readings: usize,
    pub averages: Averages,
    pub trends: Trends,
    pub abnormal_count: LevelCounts,
}

fn mean<'a>(readings: &'a [Reading], metric: impl Fn(&'a Reading) -> f64) -> f64 {
    readings.iter().map(metric).sum::<f64>() / readings.len() as f64
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Summarize a most-recent-first history.
///
/// Only the first `window` readings are used, never more than
/// [`MAX_WINDOW`]. Directions stay `stable` below
/// [`MIN_TREND_READINGS`]. Returns `None` for an empty history.
pub fn summarize(history: &[Reading], window: usize) -> Option<TrendSummary> {
    let window = window.clamp(1, MAX_WINDOW);
    let readings = &history[..history.len().min(window)];
    if readings.is_empty() {
        return None;
    }

    let averages = Averages {
        systolic: round_one_decimal(mean(readings, |r| f64::from(r.bp.systolic))),
        diastolic: round_one_decimal(mean(readings, |r| f64::from(r.bp.diastolic))),
        heart_rate: round_one_decimal(mean(readings, |r| f64::from(r.heart_rate))),
        sugar: round_one_decimal(mean(readings, |r| r.sugar)),
        weight: round_one_decimal(mean(readings, |r| r.weight)),
        sleep_hours: round_one_decimal(mean(readings, |r| r.sleep_hours)),
    };

    let trends = if readings.len() >= MIN_TREND_READINGS {
        let (recent, older) = readings.split_at(readings.len() / 2);
        let direction = |metric: fn(&Reading) -> f64| {
            TrendDirection::between(mean(recent, metric), mean(older, metric))
        };
        Trends {
            bp: direction(|r| f64::from(r.bp.systolic)),
            heart_rate: direction(|r| f64::from(r.heart_rate)),
            sugar: direction(|r| r.sugar),
            weight: direction(|r| r.weight),
        }
    } else {
        Trends::default()
    };

    let abnormal_count = readings.iter().fold(LevelCounts::default(), |mut counts, reading| {
        match reading.abnormality_status.level {
            VitalLevel::Normal => counts.normal += 1,
            VitalLevel::Warning => counts.warning += 1,
            VitalLevel::Danger => counts.danger += 1,
        }
        counts
    });

    Some(TrendSummary {
        total_readings: readings.len(),
        averages,
        trends,
        abnormal_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::vitals;
    use crate::entities::reading::{BloodPressure, Vitals};
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn reading(systolic: u16, heart_rate: u16, sugar: f64, weight: f64, age_days: i64) -> Reading {
        let vitals = Vitals {
            bp: BloodPressure { systolic, diastolic: 80 },
            heart_rate,
            sugar,
            sleep_hours: 7.0,
            weight,
        };
        let recorded_at = Utc::now() - Duration::days(age_days);
        Reading {
            id: Uuid::new_v4(),
            patient_id: Uuid::nil(),
            bp: vitals.bp,
            heart_rate,
            sugar,
            sleep_hours: 7.0,
            weight,
            symptoms: vec![],
            notes: None,
            recorded_at,
            created_at: recorded_at,
            abnormality_status: vitals::classify(&vitals),
        }
    }

    #[test]
    fn test_empty_history() {
        assert!(summarize(&[], MAX_WINDOW).is_none());
    }

    #[test]
    fn test_short_history_is_stable() {
        let history = vec![reading(150, 90, 100.0, 70.0, 0), reading(110, 70, 100.0, 70.0, 1)];
        let summary = summarize(&history, MAX_WINDOW).unwrap();
        assert_eq!(summary.total_readings, 2);
        assert_eq!(summary.averages.systolic, 130.0);
        assert_eq!(summary.trends, Trends::default());
    }

    #[test]
    fn test_half_window_directions() {
        // Three recent readings then three older ones
        let history = vec![
            reading(150, 80, 100.0, 72.0, 0),
            reading(148, 80, 102.0, 72.0, 1),
            reading(152, 80, 101.0, 72.0, 2),
            reading(120, 80, 100.0, 80.0, 3),
            reading(122, 80, 100.0, 80.0, 4),
            reading(118, 80, 100.0, 80.0, 5),
        ];
        let summary = summarize(&history, MAX_WINDOW).unwrap();
        assert_eq!(summary.trends.bp, TrendDirection::Increasing);
        assert_eq!(summary.trends.heart_rate, TrendDirection::Stable);
        assert_eq!(summary.trends.sugar, TrendDirection::Stable);
        assert_eq!(summary.trends.weight, TrendDirection::Decreasing);
        assert_eq!(summary.abnormal_count.warning, 3);
        assert_eq!(summary.abnormal_count.normal, 3);
    }

    #[test]
    fn test_threshold_is_inclusive_at_five() {
        assert_eq!(TrendDirection::between(105.0, 100.0), TrendDirection::Increasing);
        assert_eq!(TrendDirection::between(95.0, 100.0), TrendDirection::Decreasing);
        assert_eq!(TrendDirection::between(104.9, 100.0), TrendDirection::Stable);
        assert_eq!(TrendDirection::between(95.1, 100.0), TrendDirection::Stable);
    }

    #[test]
    fn test_same_absolute_threshold_for_every_metric() {
        // Heart rate and systolic move by exactly 5, sugar and weight by 4.9
        let mut history: Vec<Reading> = (0..3).map(|i| reading(125, 85, 104.9, 74.9, i)).collect();
        history.extend((3..6).map(|i| reading(120, 80, 100.0, 70.0, i)));

        let trends = summarize(&history, MAX_WINDOW).unwrap().trends;
        assert_eq!(trends.bp, TrendDirection::Increasing);
        assert_eq!(trends.heart_rate, TrendDirection::Increasing);
        assert_eq!(trends.sugar, TrendDirection::Stable);
        assert_eq!(trends.weight, TrendDirection::Stable);
    }

    #[test]
    fn test_odd_window_puts_extra_reading_in_older_half() {
        // Recent half is the first three, older half the last four
        let sugars = [100.0, 100.0, 100.0, 120.0, 100.0, 100.0, 100.0];
        let history: Vec<Reading> = sugars
            .iter()
            .enumerate()
            .map(|(i, sugar)| reading(120, 80, *sugar, 70.0, i as i64))
            .collect();

        let trends = summarize(&history, MAX_WINDOW).unwrap().trends;
        assert_eq!(trends.sugar, TrendDirection::Decreasing);
        assert_eq!(trends.bp, TrendDirection::Stable);
    }

    #[test]
    fn test_window_is_capped() {
        let history: Vec<Reading> = (0..40).map(|i| reading(120, 75, 100.0, 70.0, i)).collect();
        assert_eq!(summarize(&history, 100).unwrap().total_readings, MAX_WINDOW);
        assert_eq!(summarize(&history, 10).unwrap().total_readings, 10);
    }

    #[test]
    fn test_averages_round_to_one_decimal() {
        let history = vec![
            reading(120, 70, 100.0, 70.0, 0),
            reading(121, 71, 101.0, 70.15, 1),
            reading(121, 71, 101.0, 70.15, 2),
        ];
        let summary = summarize(&history, MAX_WINDOW).unwrap();
        assert_eq!(summary.averages.systolic, 120.7);
        assert_eq!(summary.averages.weight, 70.1);
        assert_eq!(summarize(&history, MAX_WINDOW), Some(summary));
    }
}

//! Severity scales and the single "worst wins" order shared by every aggregator.
//!
//! Each scale derives `Ord` from its declaration order, lowest first, so
//! aggregation is always `max` and never a hand-written comparison chain.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered severity scale with a lowest element
pub trait Severity: Copy + Ord {
    /// The level every aggregation starts from
    const LOWEST: Self;

    /// Keep the more severe of two levels
    fn escalate(self, other: Self) -> Self {
        self.max(other)
    }

    /// Worst level of a sequence, `LOWEST` when empty
    fn worst_of<I: IntoIterator<Item = Self>>(levels: I) -> Self {
        levels.into_iter().fold(Self::LOWEST, Self::escalate)
    }
}

/// Overall level of a vitals reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum VitalLevel {
    Normal,
    Warning,
    Danger,
}

/// Severity of one lab finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum FindingSeverity {
    Normal,
    Borderline,
    Abnormal,
    Critical,
}

/// Severity carried by an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Danger,
    Critical,
}

impl Severity for VitalLevel {
    const LOWEST: Self = VitalLevel::Normal;
}

impl Severity for FindingSeverity {
    const LOWEST: Self = FindingSeverity::Normal;
}

impl Severity for AlertSeverity {
    const LOWEST: Self = AlertSeverity::Info;
}

impl VitalLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VitalLevel::Normal => "normal",
            VitalLevel::Warning => "warning",
            VitalLevel::Danger => "danger",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "normal" => Some(VitalLevel::Normal),
            "warning" => Some(VitalLevel::Warning),
            "danger" => Some(VitalLevel::Danger),
            _ => None,
        }
    }

    /// Alert severity for a vitals level; normal readings raise no alert
    pub fn alert_severity(&self) -> Option<AlertSeverity> {
        match self {
            VitalLevel::Normal => None,
            VitalLevel::Warning => Some(AlertSeverity::Warning),
            VitalLevel::Danger => Some(AlertSeverity::Danger),
        }
    }
}

impl FindingSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingSeverity::Normal => "normal",
            FindingSeverity::Borderline => "borderline",
            FindingSeverity::Abnormal => "abnormal",
            FindingSeverity::Critical => "critical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "normal" => Some(FindingSeverity::Normal),
            "borderline" => Some(FindingSeverity::Borderline),
            "abnormal" => Some(FindingSeverity::Abnormal),
            "critical" => Some(FindingSeverity::Critical),
            _ => None,
        }
    }

    /// Alert severity for a bucket of findings; normal findings raise no alert
    pub fn alert_severity(&self) -> Option<AlertSeverity> {
        match self {
            FindingSeverity::Normal => None,
            FindingSeverity::Borderline => Some(AlertSeverity::Info),
            FindingSeverity::Abnormal => Some(AlertSeverity::Warning),
            FindingSeverity::Critical => Some(AlertSeverity::Danger),
        }
    }
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Info => "info",
            AlertSeverity::Warning => "warning",
            AlertSeverity::Danger => "danger",
            AlertSeverity::Critical => "critical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "info" => Some(AlertSeverity::Info),
            "warning" => Some(AlertSeverity::Warning),
            "danger" => Some(AlertSeverity::Danger),
            "critical" => Some(AlertSeverity::Critical),
            _ => None,
        }
    }

    /// Priority on the 0-10 scale, monotonic in severity
    pub fn priority(&self) -> u8 {
        match self {
            AlertSeverity::Info => 3,
            AlertSeverity::Warning => 5,
            AlertSeverity::Danger | AlertSeverity::Critical => 10,
        }
    }
}

impl fmt::Display for VitalLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for FindingSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

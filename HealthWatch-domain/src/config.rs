use chrono::Duration;
use std::env;
use tracing::{info, warn};

use crate::engine::trends::MAX_WINDOW;

/// Engine and alert-retention settings
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Lifetime given to factory-created alerts; `None` keeps them forever
    pub alert_ttl: Option<Duration>,
    /// Seconds between background purges of expired alerts
    pub purge_interval_secs: u64,
    /// Readings considered by trend statistics, at most 30
    pub trend_window: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            alert_ttl: None,
            purge_interval_secs: 3600,
            trend_window: MAX_WINDOW,
        }
    }
}

impl EngineConfig {
    /// Read `ALERT_TTL_DAYS`, `ALERT_PURGE_INTERVAL_SECS` and `TREND_WINDOW`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let defaults = Self::default();

        let alert_ttl = match lookup("ALERT_TTL_DAYS") {
            Some(value) => match value.trim().parse::<i64>() {
                Ok(days) if days > 0 => Some(Duration::days(days)),
                _ => {
                    warn!("Ignoring invalid ALERT_TTL_DAYS value: {}", value);
                    None
                }
            },
            None => defaults.alert_ttl,
        };

        let purge_interval_secs = lookup("ALERT_PURGE_INTERVAL_SECS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.purge_interval_secs);

        let trend_window = lookup("TREND_WINDOW")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .map(|n| n.min(MAX_WINDOW))
            .unwrap_or(defaults.trend_window);

        info!(
            "Engine configuration: alert_ttl_days={:?}, purge_interval={}s, trend_window={}",
            alert_ttl.map(|ttl| ttl.num_days()),
            purge_interval_secs,
            trend_window
        );

        EngineConfig {
            alert_ttl,
            purge_interval_secs,
            trend_window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> EngineConfig {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        EngineConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(config(&[]), EngineConfig::default());
        assert_eq!(EngineConfig::default().purge_interval_secs, 3600);
        assert_eq!(EngineConfig::default().trend_window, 30);
    }

    #[test]
    fn test_values_are_parsed_and_capped() {
        let parsed = config(&[
            ("ALERT_TTL_DAYS", "14"),
            ("ALERT_PURGE_INTERVAL_SECS", "60"),
            ("TREND_WINDOW", "90"),
        ]);
        assert_eq!(parsed.alert_ttl, Some(Duration::days(14)));
        assert_eq!(parsed.purge_interval_secs, 60);
        assert_eq!(parsed.trend_window, MAX_WINDOW);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let parsed = config(&[("ALERT_TTL_DAYS", "soon"), ("TREND_WINDOW", "0")]);
        assert_eq!(parsed.alert_ttl, None);
        assert_eq!(parsed.trend_window, MAX_WINDOW);
    }
}

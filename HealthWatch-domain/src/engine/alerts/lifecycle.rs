use chrono::{DateTime, Utc};

use crate::entities::alert::{Alert, AlertState};

// Transitions return whether the alert changed; repeating one is a no-op.

pub fn state(alert: &Alert) -> AlertState {
    if alert.is_acknowledged {
        AlertState::Acknowledged
    } else if alert.is_read {
        AlertState::Read
    } else {
        AlertState::Unread
    }
}

pub fn mark_read(alert: &mut Alert) -> bool {
    if alert.is_read {
        return false;
    }
    alert.is_read = true;
    true
}

/// Acknowledge, implicitly reading an unread alert
pub fn acknowledge(alert: &mut Alert, now: DateTime<Utc>) -> bool {
    if alert.is_acknowledged {
        return false;
    }
    alert.is_read = true;
    alert.is_acknowledged = true;
    alert.acknowledged_at = Some(now);
    true
}

pub fn mark_notification_sent(alert: &mut Alert, now: DateTime<Utc>) -> bool {
    if alert.notification_sent {
        return false;
    }
    alert.notification_sent = true;
    alert.notification_sent_at = Some(now);
    true
}

/// Record family dispatch. Also completes a pending auto-escalation.
pub fn mark_family_notified(alert: &mut Alert, now: DateTime<Utc>) -> bool {
    if alert.family_notified && alert.family_notified_at.is_some() {
        return false;
    }
    alert.family_notified = true;
    alert.family_notified_at = Some(now);
    true
}

/// Expired alerts are eligible for silent removal whatever their state
pub fn is_expired(alert: &Alert, now: DateTime<Utc>) -> bool {
    alert.expires_at.map_or(false, |expires_at| expires_at <= now)
}

/// Mark every unread alert read, returning only the ones that changed
pub fn mark_all_read(alerts: Vec<Alert>) -> Vec<Alert> {
    alerts
        .into_iter()
        .filter_map(|mut alert| mark_read(&mut alert).then_some(alert))
        .collect()
}

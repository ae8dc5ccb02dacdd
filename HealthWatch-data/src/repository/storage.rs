use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, params_from_iter, OptionalExtension, ToSql};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::database::DatabasePool;
use crate::models::{AlertQuery, AlertRecord, AlertSortField, ReadingQuery, ReadingRecord, ReportQuery, ReportRecord};
use super::errors::RepositoryError;

/// Database storage operations for readings, alerts and reports
pub struct DatabaseStorage;

/// Fixed-width UTC timestamp, so text ordering matches time ordering
fn timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_all<T: DeserializeOwned>(payloads: Vec<String>) -> Result<Vec<T>, RepositoryError> {
    payloads
        .iter()
        .map(|payload| serde_json::from_str(payload).map_err(RepositoryError::from))
        .collect()
}

/// SQLite reads `LIMIT -1` as no limit
fn limit_clause(limit: Option<usize>, offset: Option<usize>) -> String {
    let limit = limit.and_then(|l| i64::try_from(l).ok()).unwrap_or(-1);
    let offset = offset.map_or(0, |o| i64::try_from(o).unwrap_or(i64::MAX));
    format!(" LIMIT {} OFFSET {}", limit, offset)
}

impl DatabaseStorage {
    // Readings

    pub async fn store_reading(pool: &DatabasePool, reading: &ReadingRecord) -> Result<(), RepositoryError> {
        debug!("Storing reading in database: id={}", reading.id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                conn.execute(
                    "INSERT INTO readings (id, patient_id, recorded_at, payload) VALUES (?1, ?2, ?3, ?4)",
                    params![
                        reading.id,
                        reading.patient_id,
                        timestamp(&reading.recorded_at),
                        serde_json::to_string(reading)?,
                    ],
                )?;
                Ok(())
            }
        }
    }

    pub async fn get_reading(pool: &DatabasePool, id: &str) -> Result<Option<ReadingRecord>, RepositoryError> {
        debug!("Getting reading by ID from database: id={}", id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let payload: Option<String> = conn
                    .query_row("SELECT payload FROM readings WHERE id = ?1", [id], |row| row.get(0))
                    .optional()?;
                payload
                    .map(|p| serde_json::from_str(&p).map_err(RepositoryError::from))
                    .transpose()
            }
        }
    }

    pub async fn query_readings(pool: &DatabasePool, query: &ReadingQuery) -> Result<(Vec<ReadingRecord>, usize), RepositoryError> {
        debug!("Querying readings from database: patient_id={}", query.patient_id);

        let mut where_clauses = vec!["patient_id = ?".to_string()];
        let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(query.patient_id.clone())];

        if let Some(start) = &query.start {
            where_clauses.push("recorded_at >= ?".to_string());
            values.push(Box::new(timestamp(start)));
        }
        if let Some(end) = &query.end {
            where_clauses.push("recorded_at <= ?".to_string());
            values.push(Box::new(timestamp(end)));
        }
        let where_sql = where_clauses.join(" AND ");

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;

                let total: i64 = conn.query_row(
                    &format!("SELECT COUNT(*) FROM readings WHERE {}", where_sql),
                    params_from_iter(values.iter()),
                    |row| row.get(0),
                )?;

                let sql = format!(
                    "SELECT payload FROM readings WHERE {} ORDER BY recorded_at DESC, id DESC{}",
                    where_sql,
                    limit_clause(query.limit, query.offset)
                );
                let mut stmt = conn.prepare(&sql)?;
                let payloads = stmt
                    .query_map(params_from_iter(values.iter()), |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;

                Ok((decode_all(payloads)?, total as usize))
            }
        }
    }

    pub async fn delete_reading(pool: &DatabasePool, id: &str) -> Result<bool, RepositoryError> {
        debug!("Deleting reading from database: id={}", id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let deleted = conn.execute("DELETE FROM readings WHERE id = ?1", [id])?;
                Ok(deleted > 0)
            }
        }
    }

    // Alerts

    /// Insert alerts in one transaction
    pub async fn store_alerts(pool: &DatabasePool, alerts: &[AlertRecord]) -> Result<(), RepositoryError> {
        debug!("Storing {} alerts in database", alerts.len());

        match pool {
            DatabasePool::SQLite(pool) => {
                let mut conn = pool.get()?;
                let tx = conn.transaction()?;
                for alert in alerts {
                    tx.execute(
                        "INSERT INTO alerts
                         (id, patient_id, severity, alert_type, priority, is_read, notification_sent, created_at, expires_at, payload)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                        params![
                            alert.id,
                            alert.patient_id,
                            alert.severity,
                            alert.alert_type,
                            alert.priority,
                            alert.is_read,
                            alert.notification_sent,
                            timestamp(&alert.created_at),
                            alert.expires_at.as_ref().map(timestamp),
                            serde_json::to_string(alert)?,
                        ],
                    )?;
                }
                tx.commit()?;
                Ok(())
            }
        }
    }

    pub async fn get_alert(pool: &DatabasePool, id: &str) -> Result<Option<AlertRecord>, RepositoryError> {
        debug!("Getting alert by ID from database: id={}", id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let payload: Option<String> = conn
                    .query_row("SELECT payload FROM alerts WHERE id = ?1", [id], |row| row.get(0))
                    .optional()?;
                payload
                    .map(|p| serde_json::from_str(&p).map_err(RepositoryError::from))
                    .transpose()
            }
        }
    }

    /// Rewrite existing alerts in one transaction, returning how many matched
    pub async fn update_alerts(pool: &DatabasePool, alerts: &[AlertRecord]) -> Result<usize, RepositoryError> {
        debug!("Updating {} alerts in database", alerts.len());

        match pool {
            DatabasePool::SQLite(pool) => {
                let mut conn = pool.get()?;
                let tx = conn.transaction()?;
                let mut updated = 0;
                for alert in alerts {
                    updated += tx.execute(
                        "UPDATE alerts SET is_read = ?2, notification_sent = ?3, expires_at = ?4, payload = ?5
                         WHERE id = ?1",
                        params![
                            alert.id,
                            alert.is_read,
                            alert.notification_sent,
                            alert.expires_at.as_ref().map(timestamp),
                            serde_json::to_string(alert)?,
                        ],
                    )?;
                }
                tx.commit()?;
                Ok(updated)
            }
        }
    }

    pub async fn query_alerts(pool: &DatabasePool, query: &AlertQuery) -> Result<(Vec<AlertRecord>, usize), RepositoryError> {
        debug!("Querying alerts from database: patient_id={}", query.patient_id);

        let mut where_clauses = vec!["patient_id = ?".to_string()];
        let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(query.patient_id.clone())];

        if let Some(severity) = &query.severity {
            where_clauses.push("severity = ?".to_string());
            values.push(Box::new(severity.clone()));
        }
        if let Some(alert_type) = &query.alert_type {
            where_clauses.push("alert_type = ?".to_string());
            values.push(Box::new(alert_type.clone()));
        }
        if let Some(is_read) = query.is_read {
            where_clauses.push("is_read = ?".to_string());
            values.push(Box::new(is_read));
        }
        if let Some(now) = &query.active_at {
            where_clauses.push("(expires_at IS NULL OR expires_at > ?)".to_string());
            values.push(Box::new(timestamp(now)));
        }
        let where_sql = where_clauses.join(" AND ");

        let direction = if query.descending { "DESC" } else { "ASC" };
        let order_sql = match query.sort_by {
            AlertSortField::CreatedAt => format!("created_at {}", direction),
            AlertSortField::Priority => format!("priority {}", direction),
            AlertSortField::Severity => format!(
                "CASE severity WHEN 'critical' THEN 3 WHEN 'danger' THEN 2 WHEN 'warning' THEN 1 ELSE 0 END {}",
                direction
            ),
        };

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;

                let total: i64 = conn.query_row(
                    &format!("SELECT COUNT(*) FROM alerts WHERE {}", where_sql),
                    params_from_iter(values.iter()),
                    |row| row.get(0),
                )?;

                let sql = format!(
                    "SELECT payload FROM alerts WHERE {} ORDER BY {}, created_at DESC, id ASC{}",
                    where_sql,
                    order_sql,
                    limit_clause(query.limit, query.offset)
                );
                let mut stmt = conn.prepare(&sql)?;
                let payloads = stmt
                    .query_map(params_from_iter(values.iter()), |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;

                Ok((decode_all(payloads)?, total as usize))
            }
        }
    }

    /// Alerts not yet dispatched, or flagged for family notification that was never sent
    pub async fn list_pending_notifications(pool: &DatabasePool, patient_id: Option<&str>) -> Result<Vec<AlertRecord>, RepositoryError> {
        debug!("Listing alerts awaiting notification");

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let mut stmt = conn.prepare(
                    "SELECT payload FROM alerts
                     WHERE (notification_sent = 0
                            OR (json_extract(payload, '$.family_notified') = 1
                                AND json_extract(payload, '$.family_notified_at') IS NULL))
                       AND (?1 IS NULL OR patient_id = ?1)
                     ORDER BY priority DESC, created_at ASC",
                )?;
                let payloads = stmt
                    .query_map([patient_id], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                decode_all(payloads)
            }
        }
    }

    pub async fn delete_alert(pool: &DatabasePool, id: &str) -> Result<bool, RepositoryError> {
        debug!("Deleting alert from database: id={}", id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                Ok(conn.execute("DELETE FROM alerts WHERE id = ?1", [id])? > 0)
            }
        }
    }

    pub async fn delete_expired_alerts(pool: &DatabasePool, now: DateTime<Utc>) -> Result<usize, RepositoryError> {
        debug!("Deleting expired alerts from database");

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let deleted = conn.execute(
                    "DELETE FROM alerts WHERE expires_at IS NOT NULL AND expires_at <= ?1",
                    [timestamp(&now)],
                )?;
                Ok(deleted)
            }
        }
    }

    // Reports

    pub async fn store_report(pool: &DatabasePool, report: &ReportRecord) -> Result<(), RepositoryError> {
        debug!("Storing report in database: id={}", report.id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                conn.execute(
                    "INSERT INTO reports (id, patient_id, status, report_type, uploaded_at, payload)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        report.id,
                        report.patient_id,
                        report.status,
                        report.report_type,
                        timestamp(&report.uploaded_at),
                        serde_json::to_string(report)?,
                    ],
                )?;
                Ok(())
            }
        }
    }

    pub async fn get_report(pool: &DatabasePool, id: &str) -> Result<Option<ReportRecord>, RepositoryError> {
        debug!("Getting report by ID from database: id={}", id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let payload: Option<String> = conn
                    .query_row("SELECT payload FROM reports WHERE id = ?1", [id], |row| row.get(0))
                    .optional()?;
                payload
                    .map(|p| serde_json::from_str(&p).map_err(RepositoryError::from))
                    .transpose()
            }
        }
    }

    pub async fn update_report(pool: &DatabasePool, report: &ReportRecord) -> Result<bool, RepositoryError> {
        debug!("Updating report in database: id={}", report.id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let updated = conn.execute(
                    "UPDATE reports SET status = ?2, report_type = ?3, payload = ?4 WHERE id = ?1",
                    params![
                        report.id,
                        report.status,
                        report.report_type,
                        serde_json::to_string(report)?,
                    ],
                )?;
                Ok(updated > 0)
            }
        }
    }

    pub async fn query_reports(pool: &DatabasePool, query: &ReportQuery) -> Result<(Vec<ReportRecord>, usize), RepositoryError> {
        debug!("Querying reports from database: patient_id={}", query.patient_id);

        let mut where_clauses = vec!["patient_id = ?".to_string()];
        let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(query.patient_id.clone())];

        if let Some(status) = &query.status {
            where_clauses.push("status = ?".to_string());
            values.push(Box::new(status.clone()));
        }
        if let Some(report_type) = &query.report_type {
            where_clauses.push("report_type = ?".to_string());
            values.push(Box::new(report_type.clone()));
        }
        let where_sql = where_clauses.join(" AND ");

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;

                let total: i64 = conn.query_row(
                    &format!("SELECT COUNT(*) FROM reports WHERE {}", where_sql),
                    params_from_iter(values.iter()),
                    |row| row.get(0),
                )?;

                let sql = format!(
                    "SELECT payload FROM reports WHERE {} ORDER BY uploaded_at DESC, id ASC{}",
                    where_sql,
                    limit_clause(query.limit, query.offset)
                );
                let mut stmt = conn.prepare(&sql)?;
                let payloads = stmt
                    .query_map(params_from_iter(values.iter()), |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;

                Ok((decode_all(payloads)?, total as usize))
            }
        }
    }

    pub async fn delete_report(pool: &DatabasePool, id: &str) -> Result<bool, RepositoryError> {
        debug!("Deleting report from database: id={}", id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                Ok(conn.execute("DELETE FROM reports WHERE id = ?1", [id])? > 0)
            }
        }
    }
}

use rusqlite::Connection;
use tracing::info;

/// Run SQLite migrations.
///
/// Each table keeps the full record as a JSON payload next to the columns
/// used for filtering and ordering.
pub fn run_migrations(conn: &Connection) -> Result<(), rusqlite::Error> {
    info!("Running SQLite migrations");

    create_readings_table(conn)?;
    create_alerts_table(conn)?;
    create_reports_table(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

fn create_readings_table(conn: &Connection) -> Result<(), rusqlite::Error> {
    info!("Creating readings table if not exists");

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS readings (
            id TEXT PRIMARY KEY,
            patient_id TEXT NOT NULL,
            recorded_at TEXT NOT NULL,
            payload TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_readings_patient_recorded
        ON readings (patient_id, recorded_at DESC);",
    )
}

fn create_alerts_table(conn: &Connection) -> Result<(), rusqlite::Error> {
    info!("Creating alerts table if not exists");

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS alerts (
            id TEXT PRIMARY KEY,
            patient_id TEXT NOT NULL,
            severity TEXT NOT NULL,
            alert_type TEXT NOT NULL,
            priority INTEGER NOT NULL,
            is_read INTEGER NOT NULL DEFAULT 0,
            notification_sent INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            expires_at TEXT,
            payload TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_alerts_patient_created
        ON alerts (patient_id, created_at DESC);
        CREATE INDEX IF NOT EXISTS idx_alerts_patient_read
        ON alerts (patient_id, is_read);
        CREATE INDEX IF NOT EXISTS idx_alerts_expires
        ON alerts (expires_at);",
    )
}

fn create_reports_table(conn: &Connection) -> Result<(), rusqlite::Error> {
    info!("Creating reports table if not exists");

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS reports (
            id TEXT PRIMARY KEY,
            patient_id TEXT NOT NULL,
            status TEXT NOT NULL,
            report_type TEXT NOT NULL,
            uploaded_at TEXT NOT NULL,
            payload TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_reports_patient_uploaded
        ON reports (patient_id, uploaded_at DESC);",
    )
}

use rusqlite::Connection;
use tracing::info;

use crate::database::DatabaseError;

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Running SQLite migrations");

    create_users_table(conn)?;
    create_medical_reports_table(conn)?;
    create_medical_reports_index(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

/// Create the users table
fn create_users_table(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Creating users table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            age INTEGER,
            gender TEXT,
            created_at TEXT NOT NULL
        )",
        [],
    ).map_err(|e| DatabaseError::MigrationError(format!("users table: {}", e)))?;

    Ok(())
}

/// Create the medical reports table
fn create_medical_reports_table(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Creating medical_reports table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS medical_reports (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id),
            report_name TEXT NOT NULL,
            test_data TEXT NOT NULL,
            analysis_result TEXT,
            recommendations TEXT,
            timestamp TEXT NOT NULL
        )",
        [],
    ).map_err(|e| DatabaseError::MigrationError(format!("medical_reports table: {}", e)))?;

    Ok(())
}

/// Index for per-user history ordered by time
fn create_medical_reports_index(conn: &Connection) -> Result<(), DatabaseError> {
    info!("Creating index on medical_reports (user_id, timestamp)");

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_medical_reports_user_timestamp
        ON medical_reports (user_id, timestamp DESC)",
        [],
    ).map_err(|e| DatabaseError::MigrationError(format!("Failed to create index: {}", e)))?;

    Ok(())
}

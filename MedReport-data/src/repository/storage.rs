use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use crate::database::DatabasePool;
use crate::models::{MedicalReport, ProfileUpdate, User};
use super::errors::RepositoryError;

const USER_COLUMNS: &str = "id, username, email, password_hash, age, gender, created_at";
const REPORT_COLUMNS: &str =
    "id, user_id, report_name, test_data, analysis_result, recommendations, timestamp";

/// SQLite storage operations for users and reports
pub struct DatabaseStorage;

impl DatabaseStorage {
    fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            password_hash: row.get(3)?,
            age: row.get(4)?,
            gender: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    fn map_report(row: &Row<'_>) -> rusqlite::Result<MedicalReport> {
        Ok(MedicalReport {
            id: row.get(0)?,
            user_id: row.get(1)?,
            report_name: row.get(2)?,
            test_data: row.get(3)?,
            analysis_result: row.get(4)?,
            recommendations: row.get(5)?,
            timestamp: row.get(6)?,
        })
    }

    /// Store a user in the database
    pub fn insert_user(pool: &DatabasePool, user: &User) -> Result<(), RepositoryError> {
        debug!("Storing user in database: id={}", user.id);
        let conn = pool.get()?;

        conn.execute(
            "INSERT INTO users (id, username, email, password_hash, age, gender, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                user.id,
                user.username,
                user.email,
                user.password_hash,
                user.age,
                user.gender,
                user.created_at,
            ],
        )?;

        Ok(())
    }

    /// Look up a single user by one of its unique columns
    pub fn get_user_by(
        pool: &DatabasePool,
        column: UserLookup,
        value: &str,
    ) -> Result<Option<User>, RepositoryError> {
        debug!("Getting user by {} from database", column.as_str());
        let conn = pool.get()?;

        let sql = format!(
            "SELECT {} FROM users WHERE {} = ?1",
            USER_COLUMNS,
            column.as_str()
        );
        let user = conn
            .query_row(&sql, [value], Self::map_user)
            .optional()?;

        Ok(user)
    }

    /// Apply a partial profile update and return the stored user
    pub fn update_profile(
        pool: &DatabasePool,
        id: &str,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, RepositoryError> {
        debug!("Updating profile in database: id={}", id);
        let conn = pool.get()?;

        let changed = conn.execute(
            "UPDATE users SET age = COALESCE(?1, age), gender = COALESCE(?2, gender) WHERE id = ?3",
            params![update.age, update.gender, id],
        )?;
        if changed == 0 {
            return Ok(None);
        }

        let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);
        let user = conn.query_row(&sql, [id], Self::map_user).optional()?;
        Ok(user)
    }

    /// Store a report in the database
    pub fn insert_report(pool: &DatabasePool, report: &MedicalReport) -> Result<(), RepositoryError> {
        debug!("Storing medical report in database: id={}", report.id);
        let conn = pool.get()?;

        conn.execute(
            "INSERT INTO medical_reports
             (id, user_id, report_name, test_data, analysis_result, recommendations, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                report.id,
                report.user_id,
                report.report_name,
                report.test_data,
                report.analysis_result,
                report.recommendations,
                report.timestamp,
            ],
        )?;

        Ok(())
    }

    /// Get a report by ID from the database
    pub fn get_report(pool: &DatabasePool, id: &str) -> Result<Option<MedicalReport>, RepositoryError> {
        debug!("Getting medical report by ID from database: id={}", id);
        let conn = pool.get()?;

        let sql = format!("SELECT {} FROM medical_reports WHERE id = ?1", REPORT_COLUMNS);
        let report = conn.query_row(&sql, [id], Self::map_report).optional()?;

        Ok(report)
    }

    /// Get all reports for a user, newest first
    pub fn get_reports_for_user(
        pool: &DatabasePool,
        user_id: &str,
    ) -> Result<Vec<MedicalReport>, RepositoryError> {
        debug!("Getting medical reports for user from database: user_id={}", user_id);
        let conn = pool.get()?;

        let sql = format!(
            "SELECT {} FROM medical_reports WHERE user_id = ?1 ORDER BY timestamp DESC, rowid DESC",
            REPORT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([user_id], Self::map_report)?;

        let mut result = Vec::new();
        for report in rows {
            result.push(report?);
        }

        Ok(result)
    }
}

/// Unique user columns that can be used for lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserLookup {
    Id,
    Username,
    Email,
}

impl UserLookup {
    fn as_str(self) -> &'static str {
        match self {
            UserLookup::Id => "id",
            UserLookup::Username => "username",
            UserLookup::Email => "email",
        }
    }
}

use std::sync::PoisonError;
use thiserror::Error;
use crate::database::DatabaseError;

/// Error type for repository operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unique constraint violated; carries the offending field name
    #[error("Conflict: {0} already exists")]
    Conflict(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),

    /// Connection pool error
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Lock error
    #[error("Lock error: {0}")]
    Lock(String),

    /// Not found error
    #[error("Record not found: {0}")]
    NotFound(String),
}

impl<T> From<PoisonError<T>> for RepositoryError {
    fn from(error: PoisonError<T>) -> Self {
        RepositoryError::Lock(error.to_string())
    }
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(error: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(ref failure, Some(ref message)) = error {
            if failure.code == rusqlite::ErrorCode::ConstraintViolation
                && message.contains("UNIQUE")
            {
                // "UNIQUE constraint failed: users.email"
                let field = message
                    .rsplit('.')
                    .next()
                    .unwrap_or("record")
                    .trim()
                    .to_string();
                return RepositoryError::Conflict(field);
            }
        }
        RepositoryError::Sqlite(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_maps_to_conflict() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE users (email TEXT UNIQUE); INSERT INTO users VALUES ('a@b.c');")
            .unwrap();
        let err = conn
            .execute("INSERT INTO users VALUES ('a@b.c')", [])
            .unwrap_err();

        match RepositoryError::from(err) {
            RepositoryError::Conflict(field) => assert_eq!(field, "email"),
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_other_sqlite_errors_pass_through() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let err = conn.execute("SELECT * FROM missing", []).unwrap_err();
        assert!(matches!(RepositoryError::from(err), RepositoryError::Sqlite(_)));
    }
}

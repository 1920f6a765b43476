//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the catalog store.
//! - Apply schema migrations in deterministic order.
//! - Classify SQLite failures into connection, constraint and generic errors.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write catalog data before migrations succeed.

use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{connect, open_db, open_db_in_memory, open_db_with_busy_timeout};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// The database file could not be opened or configured.
    Connection(rusqlite::Error),
    /// A UNIQUE, NOT NULL, CHECK or FOREIGN KEY constraint rejected a write.
    ConstraintViolation(String),
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    /// Stable machine-readable code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Connection(_) => "db_connection_failed",
            Self::ConstraintViolation(_) => "db_constraint_violation",
            Self::Sqlite(_) => "db_error",
            Self::UnsupportedSchemaVersion { .. } => "db_unsupported_schema",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection(err) => write!(f, "database connection failed: {err}"),
            Self::ConstraintViolation(message) => write!(f, "constraint violation: {message}"),
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connection(err) | Self::Sqlite(err) => Some(err),
            Self::ConstraintViolation(_) | Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        let code = match &value {
            rusqlite::Error::SqliteFailure(failure, _) => Some(failure.code),
            _ => None,
        };

        match code {
            Some(ErrorCode::ConstraintViolation) => Self::ConstraintViolation(value.to_string()),
            Some(ErrorCode::CannotOpen | ErrorCode::NotADatabase | ErrorCode::PermissionDenied) => {
                Self::Connection(value)
            }
            _ => Self::Sqlite(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DbError;
    use rusqlite::Connection;

    #[test]
    fn unique_violation_maps_to_constraint_variant() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (name TEXT UNIQUE); INSERT INTO t VALUES ('a');")
            .unwrap();

        let err: DbError = conn
            .execute("INSERT INTO t VALUES ('a');", [])
            .unwrap_err()
            .into();

        assert!(matches!(
            err,
            DbError::ConstraintViolation(ref message) if message.contains("UNIQUE")
        ));
        assert_eq!(err.code(), "db_constraint_violation");
    }

    #[test]
    fn malformed_sql_maps_to_generic_variant() {
        let conn = Connection::open_in_memory().unwrap();
        let err: DbError = conn.execute("SELEC 1", []).unwrap_err().into();
        assert!(matches!(err, DbError::Sqlite(_)));
    }
}

//! Generic SQL rendering for catalog entities.
//!
//! # Responsibility
//! - Turn any `Entity` plus a table name into a parameterized `Statement`.
//! - Reject table/field names that are not plain SQL identifiers or declared
//!   descriptor fields.
//!
//! # Invariants
//! - Values are always bound as positional parameters, never spliced.
//! - Identifiers reaching SQL text have passed `is_identifier`.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod builder;

pub use builder::{
    build_count, build_delete, build_insert, build_select, build_update, build_update_preview,
    is_identifier,
};

use rusqlite::types::Value;

pub type QueryResult<T> = Result<T, QueryError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    InvalidTableName(String),
    UnknownField { table: String, field: String },
    /// Update value whose storage class does not fit the column.
    MismatchedValue {
        table: String,
        field: String,
        expected: &'static str,
        found: String,
    },
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTableName(name) => write!(f, "invalid table name `{name}`"),
            Self::UnknownField { table, field } => {
                write!(f, "unknown field `{field}` for table `{table}`")
            }
            Self::MismatchedValue {
                table,
                field,
                expected,
                found,
            } => write!(f, "`{table}.{field}` expects {expected}, got {found}"),
        }
    }
}

impl Error for QueryError {}

/// Whether executing the statement changes data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Read,
    Write,
}

impl StatementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

/// Ready-to-run SQL with its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
    pub kind: StatementKind,
    /// Target table, kept for log lines.
    pub table: String,
}

impl Statement {
    pub fn read(table: impl Into<String>, sql: String, params: Vec<Value>) -> Self {
        Self {
            sql,
            params,
            kind: StatementKind::Read,
            table: table.into(),
        }
    }

    pub fn write(table: impl Into<String>, sql: String, params: Vec<Value>) -> Self {
        Self {
            sql,
            params,
            kind: StatementKind::Write,
            table: table.into(),
        }
    }

    pub fn is_mutation(&self) -> bool {
        self.kind == StatementKind::Write
    }
}

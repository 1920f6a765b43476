//! Statement execution against the catalog database.
//!
//! # Responsibility
//! - Open one fresh connection per call and release it on every exit path.
//! - Run exactly one statement per call with bound parameters.
//! - Commit only mutations, each inside its own IMMEDIATE transaction.
//!
//! # Invariants
//! - No connection outlives the call that opened it.
//! - Every failure is logged and returned as `DbError`; nothing is swallowed.
//! - Parameter values never appear in log lines.

use crate::config::StoreConfig;
use crate::db::{connect, open_db_with_busy_timeout, DbError, DbResult};
use crate::query::Statement;
use log::{debug, error};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Effect of one committed mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome {
    /// Rows inserted, updated or deleted.
    pub changed: usize,
    /// Rowid of the most recent insert on this connection (0 when none).
    pub last_insert_rowid: i64,
    /// First column of the first `RETURNING` row, if the statement had one.
    pub returned: Option<Value>,
}

/// Per-call connection executor.
///
/// Holds configuration only, so it is cheap to clone and safe to share across
/// threads; each thread's calls open independent connections.
#[derive(Debug, Clone)]
pub struct Engine {
    db_path: PathBuf,
    busy_timeout: Duration,
}

impl Engine {
    /// Bootstraps the schema once and returns an engine bound to the file.
    pub fn open(config: &StoreConfig) -> DbResult<Self> {
        let conn = open_db_with_busy_timeout(&config.db_path, config.busy_timeout)?;
        drop(conn);

        Ok(Self {
            db_path: config.db_path.clone(),
            busy_timeout: config.busy_timeout,
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Runs a read statement and returns every row as ordered values.
    pub fn fetch_rows(&self, statement: &Statement) -> DbResult<Vec<Vec<Value>>> {
        self.fetch_mapped(statement, |row| {
            let width = row.as_ref().column_count();
            (0..width)
                .map(|index| row.get::<_, Value>(index))
                .collect()
        })
    }

    /// Runs a read statement and decodes each row with `map`.
    pub fn fetch_mapped<T, F>(&self, statement: &Statement, map: F) -> DbResult<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let started_at = Instant::now();
        let result = self
            .connect()
            .and_then(|conn| query_all(&conn, statement, map));
        log_call(statement, started_at, &result, |rows| rows.len());
        result
    }

    /// Runs a mutation inside an IMMEDIATE transaction and commits it.
    pub fn execute(&self, statement: &Statement) -> DbResult<MutationOutcome> {
        let started_at = Instant::now();
        let result = self.with_transaction(|tx| execute_in(tx, statement).map_err(DbError::from));
        log_call(statement, started_at, &result, |outcome| outcome.changed);
        result
    }

    /// Runs `op` inside one IMMEDIATE transaction on a fresh connection.
    ///
    /// Commits when `op` returns `Ok`; the transaction rolls back on drop
    /// otherwise.
    pub fn with_transaction<T, E, F>(&self, op: F) -> Result<T, E>
    where
        E: From<DbError>,
        F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    {
        let mut conn = self.connect()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(DbError::from)?;
        let value = op(&tx)?;
        tx.commit().map_err(DbError::from)?;
        Ok(value)
    }

    fn connect(&self) -> DbResult<Connection> {
        connect(&self.db_path, self.busy_timeout)
    }
}

/// Executes `statement` on an open transaction without committing.
pub(crate) fn execute_in(
    tx: &Transaction<'_>,
    statement: &Statement,
) -> rusqlite::Result<MutationOutcome> {
    let mut stmt = tx.prepare(&statement.sql)?;
    let params = params_from_iter(statement.params.iter());

    let (changed, returned) = if stmt.column_count() > 0 {
        let mut rows = stmt.query(params)?;
        let mut changed = 0;
        let mut returned = None;
        while let Some(row) = rows.next()? {
            if returned.is_none() {
                returned = Some(row.get::<_, Value>(0)?);
            }
            changed += 1;
        }
        (changed, returned)
    } else {
        (stmt.execute(params)?, None)
    };

    Ok(MutationOutcome {
        changed,
        last_insert_rowid: tx.last_insert_rowid(),
        returned,
    })
}

fn query_all<T, F>(conn: &Connection, statement: &Statement, mut map: F) -> DbResult<Vec<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare(&statement.sql)?;
    let mut rows = stmt.query(params_from_iter(statement.params.iter()))?;
    let mut items = Vec::new();

    while let Some(row) = rows.next()? {
        items.push(map(row)?);
    }

    Ok(items)
}

fn log_call<T>(
    statement: &Statement,
    started_at: Instant,
    result: &DbResult<T>,
    count: impl Fn(&T) -> usize,
) {
    match result {
        Ok(value) => debug!(
            "event=db_exec module=engine status=ok kind={} table={} rows={} duration_ms={}",
            statement.kind.as_str(),
            statement.table,
            count(value),
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_exec module=engine status=error kind={} table={} duration_ms={} error_code={} error={}",
            statement.kind.as_str(),
            statement.table,
            started_at.elapsed().as_millis(),
            err.code(),
            err
        ),
    }
}

//! Generic catalog repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert/fetch/update/delete for any `Entity` and table name.
//! - Translate builder, validation and storage failures into `RepoError`.
//!
//! # Invariants
//! - Inserts call `Entity::validate()` before any SQL is issued; updates
//!   validate the resolved row with the new value applied before writing it.
//! - Update/delete target at most one row and report `NotFound` when the
//!   filter resolves nothing.
//! - A filter matching several rows is logged as ambiguous; the lowest id is
//!   the one mutated.

use crate::db::DbError;
use crate::engine::{execute_in, Engine, MutationOutcome};
use crate::model::entity::{Entity, EntityId, ValidationError};
use crate::query::{
    build_count, build_delete, build_insert, build_select, build_update, build_update_preview,
    QueryError, Statement,
};
use log::{debug, error, warn};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, OptionalExtension, Transaction};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for catalog persistence and association resolution.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Query(QueryError),
    Db(DbError),
    /// Update/delete filter resolved no row.
    NotFound { table: String, field: String },
    /// A natural key used for association resolution matched several rows.
    AmbiguousNaturalKey {
        table: &'static str,
        field: &'static str,
        matches: i64,
    },
    /// Association insert without any natural key.
    EmptyAssociation,
    InvalidData(String),
}

impl RepoError {
    /// Stable machine-readable code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::Query(_) => "invalid_query",
            Self::Db(err) => err.code(),
            Self::NotFound { .. } => "not_found",
            Self::AmbiguousNaturalKey { .. } => "ambiguous_natural_key",
            Self::EmptyAssociation => "empty_association",
            Self::InvalidData(_) => "invalid_data",
        }
    }

    /// True for storage-level constraint failures (duplicate title, bad FK).
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::Db(DbError::ConstraintViolation(_)))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Query(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { table, field } => {
                write!(f, "no row in `{table}` matches the given `{field}`")
            }
            Self::AmbiguousNaturalKey {
                table,
                field,
                matches,
            } => write!(
                f,
                "`{table}.{field}` matches {matches} rows; association target is ambiguous"
            ),
            Self::EmptyAssociation => write!(f, "association needs at least one natural key"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Query(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. }
            | Self::AmbiguousNaturalKey { .. }
            | Self::EmptyAssociation
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<QueryError> for RepoError {
    fn from(value: QueryError) -> Self {
        Self::Query(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::from(value))
    }
}

/// Repository interface for generic entity CRUD.
pub trait CatalogRepository {
    /// Inserts `entity` into `table` and returns the assigned identifier.
    fn insert<E: Entity>(&self, entity: &E, table: &str) -> RepoResult<EntityId>;

    /// Returns raw rows, every declared field in order.
    fn fetch<E: Entity>(
        &self,
        entity: &E,
        table: &str,
        filter_field: Option<&str>,
    ) -> RepoResult<Vec<Vec<Value>>>;

    /// Same selection as `fetch`, decoded into entities.
    fn fetch_entities<E: Entity>(
        &self,
        entity: &E,
        table: &str,
        filter_field: Option<&str>,
    ) -> RepoResult<Vec<E>>;

    /// Sets one field on the row matched by `filter_field`; returns its id.
    fn update<E: Entity>(
        &self,
        entity: &E,
        table: &str,
        field_to_update: &str,
        new_value: Value,
        filter_field: &str,
    ) -> RepoResult<EntityId>;

    /// Deletes the row matched by `filter_field`; returns its id.
    fn delete<E: Entity>(
        &self,
        entity: &E,
        table: &str,
        filter_field: &str,
    ) -> RepoResult<EntityId>;
}

/// SQLite-backed catalog repository.
#[derive(Debug, Clone)]
pub struct SqliteCatalogRepository {
    pub(crate) engine: Engine,
}

impl SqliteCatalogRepository {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Runs `check` then `statement` in one IMMEDIATE transaction, counting
    /// the rows `filter_field` matches first.
    fn mutate_resolved<F>(
        &self,
        statement: &Statement,
        count: &Statement,
        filter_field: &str,
        check: F,
    ) -> RepoResult<EntityId>
    where
        F: FnOnce(&Transaction<'_>) -> RepoResult<()>,
    {
        let started_at = Instant::now();
        let result = self.engine.with_transaction(|tx| -> RepoResult<(i64, MutationOutcome)> {
            let matches: i64 =
                tx.query_row(&count.sql, params_from_iter(count.params.iter()), |row| {
                    row.get(0)
                })?;
            check(tx)?;
            let outcome = execute_in(tx, statement)?;
            Ok((matches, outcome))
        });

        let (matches, outcome) = match result {
            Ok(value) => value,
            Err(err) => {
                error!(
                    "event=db_mutate module=repo status=error table={} duration_ms={} error_code={} error={}",
                    statement.table,
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                return Err(err);
            }
        };

        if matches > 1 {
            warn!(
                "event=db_mutate module=repo status=ambiguous table={} field={} matches={}",
                statement.table, filter_field, matches
            );
        }

        let id = match outcome.returned {
            Some(Value::Integer(id)) => id,
            Some(other) => {
                return Err(RepoError::InvalidData(format!(
                    "non-integer identifier {other:?} returned from `{}`",
                    statement.table
                )));
            }
            None => {
                return Err(RepoError::NotFound {
                    table: statement.table.clone(),
                    field: filter_field.to_string(),
                });
            }
        };

        debug!(
            "event=db_mutate module=repo status=ok table={} id={} duration_ms={}",
            statement.table,
            id,
            started_at.elapsed().as_millis()
        );
        Ok(id)
    }
}

impl CatalogRepository for SqliteCatalogRepository {
    fn insert<E: Entity>(&self, entity: &E, table: &str) -> RepoResult<EntityId> {
        entity.validate()?;

        let statement = build_insert(entity, table)?;
        let outcome = self.engine.execute(&statement)?;
        Ok(outcome.last_insert_rowid)
    }

    fn fetch<E: Entity>(
        &self,
        entity: &E,
        table: &str,
        filter_field: Option<&str>,
    ) -> RepoResult<Vec<Vec<Value>>> {
        let statement = build_select(entity, table, filter_field)?;
        Ok(self.engine.fetch_rows(&statement)?)
    }

    fn fetch_entities<E: Entity>(
        &self,
        entity: &E,
        table: &str,
        filter_field: Option<&str>,
    ) -> RepoResult<Vec<E>> {
        let statement = build_select(entity, table, filter_field)?;
        Ok(self.engine.fetch_mapped(&statement, E::from_row)?)
    }

    fn update<E: Entity>(
        &self,
        entity: &E,
        table: &str,
        field_to_update: &str,
        new_value: Value,
        filter_field: &str,
    ) -> RepoResult<EntityId> {
        let preview = build_update_preview(
            entity,
            table,
            field_to_update,
            new_value.clone(),
            filter_field,
        )?;
        let statement = build_update(entity, table, field_to_update, new_value, filter_field)?;
        let count = build_count(entity, table, filter_field)?;

        self.mutate_resolved(&statement, &count, filter_field, |tx| {
            let updated = tx
                .query_row(
                    &preview.sql,
                    params_from_iter(preview.params.iter()),
                    E::from_row,
                )
                .optional()?;
            if let Some(updated) = updated {
                updated.validate()?;
            }
            Ok(())
        })
    }

    fn delete<E: Entity>(
        &self,
        entity: &E,
        table: &str,
        filter_field: &str,
    ) -> RepoResult<EntityId> {
        let statement = build_delete(entity, table, filter_field)?;
        let count = build_count(entity, table, filter_field)?;
        self.mutate_resolved(&statement, &count, filter_field, |_| Ok(()))
    }
}

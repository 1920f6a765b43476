//! Natural-key relationship resolver over the shared association table.
//!
//! # Responsibility
//! - Resolve boardgame title, designer/artist surname, publisher and category
//!   name into identifiers with scalar subqueries.
//! - Write one association row per distinct relationship.
//!
//! # Invariants
//! - A key that is absent or matches nothing stores `NULL`, not an error.
//! - A key that matches more than one row aborts the insert.
//! - Resolution and insert run in one IMMEDIATE transaction.
//! - An identical row (compared with `IS`, so `NULL` equals `NULL`) is never
//!   written twice.

use super::catalog_repo::{RepoError, RepoResult, SqliteCatalogRepository};
use crate::engine::execute_in;
use crate::model::association::{
    AssociationKeys, AssociationOutcome, AssociationRow, ASSOCIATION_LINKS, ASSOCIATION_TABLE,
};
use crate::query::Statement;
use log::{debug, error, info};
use once_cell::sync::Lazy;
use rusqlite::types::Value;
use rusqlite::{Row, Transaction};
use std::time::Instant;

static INSERT_ASSOCIATION_SQL: Lazy<String> = Lazy::new(render_insert_sql);
static SELECT_ASSOCIATIONS_SQL: Lazy<String> = Lazy::new(|| {
    format!(
        "SELECT {} FROM {ASSOCIATION_TABLE} ORDER BY rowid ASC;",
        association_columns()
    )
});

/// Repository interface for association rows.
pub trait AssociationRepository {
    /// Resolves `keys` and inserts one association row.
    fn insert_association(&self, keys: &AssociationKeys) -> RepoResult<AssociationOutcome>;
    /// Returns every association row in insertion order.
    fn list_associations(&self) -> RepoResult<Vec<AssociationRow>>;
}

impl AssociationRepository for SqliteCatalogRepository {
    fn insert_association(&self, keys: &AssociationKeys) -> RepoResult<AssociationOutcome> {
        if keys.is_empty() {
            let err = RepoError::EmptyAssociation;
            error!(
                "event=association_insert module=repo status=error error_code={}",
                err.code()
            );
            return Err(err);
        }

        let statement = Statement::write(
            ASSOCIATION_TABLE,
            INSERT_ASSOCIATION_SQL.clone(),
            keys.values()
                .into_iter()
                .map(|value| Value::from(value.map(str::to_string)))
                .collect(),
        );

        let started_at = Instant::now();
        let result = self.engine.with_transaction(|tx| -> RepoResult<AssociationOutcome> {
            ensure_unambiguous(tx, keys)?;
            let outcome = execute_in(tx, &statement)?;
            if outcome.changed == 0 {
                Ok(AssociationOutcome::AlreadyPresent)
            } else {
                Ok(AssociationOutcome::Inserted(outcome.last_insert_rowid))
            }
        });

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(
                    "event=association_insert module=repo status=error duration_ms={} error_code={} error={}",
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                return Err(err);
            }
        };

        match outcome {
            AssociationOutcome::Inserted(rowid) => info!(
                "event=association_insert module=repo status=ok rowid={}",
                rowid
            ),
            AssociationOutcome::AlreadyPresent => info!(
                "event=association_insert module=repo status=skipped reason=duplicate"
            ),
        }
        Ok(outcome)
    }

    fn list_associations(&self) -> RepoResult<Vec<AssociationRow>> {
        let statement = Statement::read(
            ASSOCIATION_TABLE,
            SELECT_ASSOCIATIONS_SQL.clone(),
            Vec::new(),
        );
        Ok(self.engine.fetch_mapped(&statement, parse_association_row)?)
    }
}

fn ensure_unambiguous(tx: &Transaction<'_>, keys: &AssociationKeys) -> RepoResult<()> {
    for (link, value) in ASSOCIATION_LINKS.iter().zip(keys.values()) {
        let Some(value) = value else {
            continue;
        };

        let matches: i64 = tx.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE {} = ?1;",
                link.table, link.natural_key
            ),
            [value],
            |row| row.get(0),
        )?;

        match matches {
            0 => debug!(
                "event=association_resolve module=repo status=unresolved table={} field={}",
                link.table, link.natural_key
            ),
            1 => {}
            _ => {
                return Err(RepoError::AmbiguousNaturalKey {
                    table: link.table,
                    field: link.natural_key,
                    matches,
                });
            }
        }
    }
    Ok(())
}

fn render_insert_sql() -> String {
    let resolved = ASSOCIATION_LINKS
        .iter()
        .enumerate()
        .map(|(index, link)| {
            format!(
                "(SELECT id FROM {} WHERE {} = ?{}) AS {}",
                link.table,
                link.natural_key,
                index + 1,
                link.column
            )
        })
        .collect::<Vec<_>>()
        .join(", ");
    let same_row = ASSOCIATION_LINKS
        .iter()
        .map(|link| format!("existing.{0} IS resolved.{0}", link.column))
        .collect::<Vec<_>>()
        .join(" AND ");
    let columns = association_columns();

    format!(
        "INSERT INTO {ASSOCIATION_TABLE} ({columns})
         SELECT {columns} FROM (SELECT {resolved}) AS resolved
         WHERE NOT EXISTS (
             SELECT 1 FROM {ASSOCIATION_TABLE} AS existing WHERE {same_row}
         );"
    )
}

fn association_columns() -> String {
    ASSOCIATION_LINKS
        .iter()
        .map(|link| link.column)
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_association_row(row: &Row<'_>) -> rusqlite::Result<AssociationRow> {
    Ok(AssociationRow {
        boardgame_id: row.get("boardgame_id")?,
        designer_id: row.get("designer_id")?,
        publisher_id: row.get("publisher_id")?,
        artist_id: row.get("artist_id")?,
        category_id: row.get("category_id")?,
    })
}

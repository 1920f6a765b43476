//! Statement builders driven purely by `Entity::fields()`.
//!
//! Update and delete resolve their target through the first declared field
//! (the identifier) inside the same statement, so resolution and mutation are
//! atomic. When the filter matches several rows the lowest identifier wins.

use super::{QueryError, QueryResult, Statement};
use crate::model::entity::{Entity, FieldDescriptor};
use rusqlite::types::Value;

/// Returns true for plain SQL identifiers (`[A-Za-z_][A-Za-z0-9_]*`).
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

/// `INSERT` with one placeholder per declared field, identifier included.
pub fn build_insert<E: Entity>(entity: &E, table: &str) -> QueryResult<Statement> {
    ensure_table(table)?;
    let fields = E::fields();

    let sql = format!(
        "INSERT INTO {table} ({}) VALUES ({});",
        column_list(fields),
        placeholders(1, fields.len())
    );
    Ok(Statement::write(table, sql, entity.values()))
}

/// `SELECT` of every declared field.
///
/// Without `filter_field` the rows matching any field value are returned
/// (`f1 = ?1 OR f2 = ?2 ...`). With `filter_field` only rows equal to the
/// entity's current value of that field are returned.
pub fn build_select<E: Entity>(
    entity: &E,
    table: &str,
    filter_field: Option<&str>,
) -> QueryResult<Statement> {
    ensure_table(table)?;
    let fields = E::fields();
    let id = identifier_field::<E>();

    let (where_clause, params) = match filter_field {
        Some(name) => {
            let value = filter_value(entity, table, name)?;
            (format!("{name} = ?1"), vec![value])
        }
        None => {
            let clause = fields
                .iter()
                .enumerate()
                .map(|(index, field)| format!("{} = ?{}", field.name, index + 1))
                .collect::<Vec<_>>()
                .join(" OR ");
            (clause, entity.values())
        }
    };

    let sql = format!(
        "SELECT {} FROM {table} WHERE {where_clause} ORDER BY {id} ASC;",
        column_list(fields)
    );
    Ok(Statement::read(table, sql, params))
}

/// `SELECT COUNT(*)` over rows matching the entity's `filter_field` value.
pub fn build_count<E: Entity>(
    entity: &E,
    table: &str,
    filter_field: &str,
) -> QueryResult<Statement> {
    ensure_table(table)?;
    let value = filter_value(entity, table, filter_field)?;
    let sql = format!("SELECT COUNT(*) FROM {table} WHERE {filter_field} = ?1;");
    Ok(Statement::read(table, sql, vec![value]))
}

/// Sets `field_to_update` to `new_value` on the row resolved by `filter_field`.
///
/// The statement returns the identifier of the updated row, or no row when
/// nothing matched.
pub fn build_update<E: Entity>(
    entity: &E,
    table: &str,
    field_to_update: &str,
    new_value: Value,
    filter_field: &str,
) -> QueryResult<Statement> {
    ensure_table(table)?;
    ensure_assignable::<E>(table, field_to_update, &new_value)?;
    let filter = filter_value(entity, table, filter_field)?;
    let id = identifier_field::<E>();

    let sql = format!(
        "UPDATE {table} SET {field_to_update} = ?1 WHERE {id} = ({}) RETURNING {id};",
        resolve_subquery(table, id, filter_field, 2)
    );
    Ok(Statement::write(table, sql, vec![new_value, filter]))
}

/// Selects the row `build_update` would touch, with `field_to_update`
/// already replaced by `new_value`.
///
/// Decoding the result with `Entity::from_row` yields the record as it would
/// look after the update, ready for `Entity::validate`.
pub fn build_update_preview<E: Entity>(
    entity: &E,
    table: &str,
    field_to_update: &str,
    new_value: Value,
    filter_field: &str,
) -> QueryResult<Statement> {
    ensure_table(table)?;
    ensure_assignable::<E>(table, field_to_update, &new_value)?;
    let filter = filter_value(entity, table, filter_field)?;
    let id = identifier_field::<E>();

    let columns = E::fields()
        .iter()
        .map(|field| {
            if field.name == field_to_update {
                format!("?1 AS {}", field.name)
            } else {
                field.name.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "SELECT {columns} FROM {table} WHERE {id} = ({});",
        resolve_subquery(table, id, filter_field, 2)
    );
    Ok(Statement::read(table, sql, vec![new_value, filter]))
}

/// Deletes the row resolved by `filter_field`, returning its identifier.
pub fn build_delete<E: Entity>(
    entity: &E,
    table: &str,
    filter_field: &str,
) -> QueryResult<Statement> {
    ensure_table(table)?;
    let filter = filter_value(entity, table, filter_field)?;
    let id = identifier_field::<E>();

    let sql = format!(
        "DELETE FROM {table} WHERE {id} = ({}) RETURNING {id};",
        resolve_subquery(table, id, filter_field, 1)
    );
    Ok(Statement::write(table, sql, vec![filter]))
}

fn resolve_subquery(table: &str, id: &str, filter_field: &str, placeholder: usize) -> String {
    format!(
        "SELECT {id} FROM {table} WHERE {filter_field} = ?{placeholder} ORDER BY {id} ASC LIMIT 1"
    )
}

fn identifier_field<E: Entity>() -> &'static str {
    E::fields().first().map_or("id", |field| field.name)
}

fn ensure_table(table: &str) -> QueryResult<()> {
    if is_identifier(table) {
        Ok(())
    } else {
        Err(QueryError::InvalidTableName(table.to_string()))
    }
}

fn ensure_field<E: Entity>(table: &str, name: &str) -> QueryResult<&'static FieldDescriptor<E>> {
    E::field(name).ok_or_else(|| QueryError::UnknownField {
        table: table.to_string(),
        field: name.to_string(),
    })
}

fn ensure_assignable<E: Entity>(table: &str, name: &str, value: &Value) -> QueryResult<()> {
    let field = ensure_field::<E>(table, name)?;
    if field.accepts(value) {
        return Ok(());
    }
    Err(QueryError::MismatchedValue {
        table: table.to_string(),
        field: name.to_string(),
        expected: field.kind.as_str(),
        found: value.data_type().to_string(),
    })
}

fn filter_value<E: Entity>(entity: &E, table: &str, name: &str) -> QueryResult<Value> {
    let field = ensure_field::<E>(table, name)?;
    Ok((field.value)(entity))
}

fn column_list<E>(fields: &[FieldDescriptor<E>]) -> String {
    fields
        .iter()
        .map(|field| field.name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn placeholders(start: usize, count: usize) -> String {
    (start..start + count)
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::publisher::Publisher;
    use crate::query::StatementKind;

    fn publisher() -> Publisher {
        Publisher::new("Cephalofair Games")
    }

    #[test]
    fn identifier_check_rejects_sql_fragments() {
        assert!(is_identifier("boardgames"));
        assert!(is_identifier("_tmp1"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("1table"));
        assert!(!is_identifier("boardgames; DROP TABLE x"));
        assert!(!is_identifier("a-b"));
    }

    #[test]
    fn insert_renders_one_placeholder_per_field() {
        let statement = build_insert(&publisher(), "publishers").unwrap();
        assert_eq!(
            statement.sql,
            "INSERT INTO publishers (id, name) VALUES (?1, ?2);"
        );
        assert_eq!(
            statement.params,
            vec![Value::Null, Value::Text("Cephalofair Games".to_string())]
        );
        assert_eq!(statement.kind, StatementKind::Write);
    }

    #[test]
    fn select_without_filter_ors_every_field() {
        let statement = build_select(&publisher(), "publishers", None).unwrap();
        assert_eq!(
            statement.sql,
            "SELECT id, name FROM publishers WHERE id = ?1 OR name = ?2 ORDER BY id ASC;"
        );
        assert_eq!(statement.params.len(), 2);
        assert!(!statement.is_mutation());
    }

    #[test]
    fn select_with_filter_binds_current_value() {
        let statement = build_select(&publisher(), "publishers", Some("name")).unwrap();
        assert_eq!(
            statement.sql,
            "SELECT id, name FROM publishers WHERE name = ?1 ORDER BY id ASC;"
        );
        assert_eq!(
            statement.params,
            vec![Value::Text("Cephalofair Games".to_string())]
        );
    }

    #[test]
    fn update_binds_new_value_and_resolves_identifier_inline() {
        let statement = build_update(
            &publisher(),
            "publishers",
            "name",
            Value::Text("x'); DROP TABLE publishers; --".to_string()),
            "name",
        )
        .unwrap();
        assert_eq!(
            statement.sql,
            "UPDATE publishers SET name = ?1 WHERE id = (SELECT id FROM publishers WHERE name = ?2 ORDER BY id ASC LIMIT 1) RETURNING id;"
        );
        assert_eq!(statement.params.len(), 2);
        assert!(!statement.sql.contains("DROP"));
    }

    #[test]
    fn delete_resolves_identifier_inline() {
        let statement = build_delete(&publisher(), "publishers", "name").unwrap();
        assert_eq!(
            statement.sql,
            "DELETE FROM publishers WHERE id = (SELECT id FROM publishers WHERE name = ?1 ORDER BY id ASC LIMIT 1) RETURNING id;"
        );
    }

    #[test]
    fn unknown_fields_and_bad_tables_are_rejected() {
        assert_eq!(
            build_select(&publisher(), "publishers", Some("nickname")).unwrap_err(),
            QueryError::UnknownField {
                table: "publishers".to_string(),
                field: "nickname".to_string(),
            }
        );
        assert!(matches!(
            build_update(&publisher(), "publishers", "name; --", Value::Null, "name"),
            Err(QueryError::UnknownField { .. })
        ));
        assert_eq!(
            build_delete(&publisher(), "publishers p", "name").unwrap_err(),
            QueryError::InvalidTableName("publishers p".to_string())
        );
    }

    #[test]
    fn update_rejects_values_of_the_wrong_storage_class() {
        assert_eq!(
            build_update(
                &publisher(),
                "publishers",
                "name",
                Value::Integer(7),
                "name"
            )
            .unwrap_err(),
            QueryError::MismatchedValue {
                table: "publishers".to_string(),
                field: "name".to_string(),
                expected: "text",
                found: "Integer".to_string(),
            }
        );
        assert!(matches!(
            build_update(&publisher(), "publishers", "name", Value::Null, "name"),
            Err(QueryError::MismatchedValue { .. })
        ));
    }

    #[test]
    fn update_preview_substitutes_the_new_value() {
        let statement = build_update_preview(
            &publisher(),
            "publishers",
            "name",
            Value::Text("Renamed".to_string()),
            "name",
        )
        .unwrap();
        assert_eq!(
            statement.sql,
            "SELECT id, ?1 AS name FROM publishers WHERE id = (SELECT id FROM publishers WHERE name = ?2 ORDER BY id ASC LIMIT 1);"
        );
        assert_eq!(
            statement.params,
            vec![
                Value::Text("Renamed".to_string()),
                Value::Text("Cephalofair Games".to_string())
            ]
        );
        assert!(!statement.is_mutation());
    }

    #[test]
    fn count_uses_filter_value() {
        let statement = build_count(&publisher(), "publishers", "name").unwrap();
        assert_eq!(
            statement.sql,
            "SELECT COUNT(*) FROM publishers WHERE name = ?1;"
        );
    }
}

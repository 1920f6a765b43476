use boardgame_core::db::migrations::latest_version;
use boardgame_core::db::{open_db, open_db_in_memory, open_db_with_busy_timeout, DbError};
use boardgame_core::{open_catalog, RepoError, StoreConfig};
use rusqlite::Connection;
use std::time::Duration;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in [
        "boardgames",
        "designers",
        "publishers",
        "artists",
        "categories",
        "associations",
    ] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("boardgames.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute("INSERT INTO publishers (name) VALUES ('Keep Me');", [])
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let kept: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM publishers;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(kept, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }

    let catalog_err = open_catalog(&StoreConfig::new(&path)).err().unwrap();
    assert!(matches!(
        catalog_err,
        RepoError::Db(DbError::UnsupportedSchemaVersion { .. })
    ));
}

#[test]
fn foreign_keys_are_enforced_on_bootstrapped_connections() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn unreachable_database_path_is_a_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("nested").join("boardgames.db");

    let err = open_db(&path).unwrap_err();
    assert!(matches!(err, DbError::Connection(_)), "unexpected error: {err}");
}

#[test]
fn bootstrap_connection_uses_requested_busy_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("boardgames.db");

    let conn = open_db_with_busy_timeout(&path, Duration::from_millis(1234)).unwrap();
    let timeout_ms: i64 = conn
        .query_row("PRAGMA busy_timeout;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(timeout_ms, 1234);
}

#[test]
fn schema_rejects_inverted_player_range_written_directly() {
    let conn = open_db_in_memory().unwrap();
    let err: DbError = conn
        .execute(
            "INSERT INTO boardgames (title, year_released, selling_price, min_players, max_players,
                playing_time, age_from, printed_quantity, printing_price)
             VALUES ('Backwards', 2020, 0, 5, 2, 0, 0, 0, 0);",
            [],
        )
        .unwrap_err()
        .into();
    assert!(matches!(err, DbError::ConstraintViolation(_)), "unexpected error: {err}");
}

#[test]
fn upgrade_from_first_version_drops_empty_and_duplicate_associations() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("v1.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(include_str!("../src/db/migrations/0001_init.sql"))
        .unwrap();
    conn.execute_batch(
        "PRAGMA user_version = 1;
         INSERT INTO categories (id, name) VALUES (1, 'Adventure');
         INSERT INTO associations (category_id) VALUES (1);
         INSERT INTO associations (category_id) VALUES (1);
         INSERT INTO associations (boardgame_id) VALUES (NULL);",
    )
    .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM associations;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 1);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}

//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL string
//! that transforms the schema from version N to N+1.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema version {} is newer than supported version {}",
            current, CURRENT_VERSION
        )));
    }

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
            tracing::debug!(version, "applied schema migration");
        }

        tx.commit()?;
    }

    Ok(())
}

/// Columns the store reads, per table.
const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    (
        "nodes",
        &["node_id", "node_type", "handle", "on_site", "read_rights", "write_rights"],
    ),
    ("node_links", &["parent_id", "child_id"]),
];

/// Check that a database can be read without changing it.
///
/// Databases with a migration history must not be newer than
/// [`CURRENT_VERSION`]; databases without one only need the tables and
/// columns the store reads.
pub fn check_schema(conn: &Connection) -> Result<()> {
    if !table_columns(conn, "schema_migrations")?.is_empty() {
        let version: u32 = conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )?;
        if version > CURRENT_VERSION {
            return Err(StoreError::Migration(format!(
                "database schema version {} is newer than supported version {}",
                version, CURRENT_VERSION
            )));
        }
    }

    for (table, required) in REQUIRED_COLUMNS {
        let columns = table_columns(conn, table)?;
        if columns.is_empty() {
            return Err(StoreError::Schema(format!("missing table {}", table)));
        }
        if let Some(column) = required.iter().find(|c| !columns.iter().any(|have| have == *c)) {
            return Err(StoreError::Schema(format!(
                "table {} has no column {}",
                table, column
            )));
        }
    }

    Ok(())
}

/// Column names of `table`; empty if the table does not exist.
fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Corpus structure nodes and their access information
        CREATE TABLE IF NOT EXISTS nodes (
            node_id TEXT PRIMARY KEY,         -- e.g. MPI12345#
            node_type TEXT NOT NULL,          -- catalogue, session, corpus, resource, ...
            handle TEXT,                      -- persistent identifier, nullable
            on_site INTEGER NOT NULL DEFAULT 1,
            read_rights TEXT NOT NULL DEFAULT '',
            write_rights TEXT NOT NULL DEFAULT ''
        );

        -- Parent/child links of the corpus tree
        CREATE TABLE IF NOT EXISTS node_links (
            parent_id TEXT NOT NULL,
            child_id TEXT NOT NULL,
            PRIMARY KEY (parent_id, child_id)
        );

        CREATE INDEX IF NOT EXISTS idx_nodes_handle ON nodes(handle);
        CREATE INDEX IF NOT EXISTS idx_node_links_child ON node_links(child_id);
        "#,
    )?;

    Ok(())
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

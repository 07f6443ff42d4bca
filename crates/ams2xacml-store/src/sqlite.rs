//! SQLite implementation of the MetadataStore trait.
//!
//! This is the primary storage backend. It uses rusqlite with bundled SQLite,
//! wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};

use ams2xacml_core::{NodeId, NodeType};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{walk_descendants, MetadataStore, NodeRecord};

/// SQLite-based corpus structure store.
///
/// Thread-safe via internal Mutex. Queries run on the blocking pool.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open an existing corpus structure database read-only.
    ///
    /// Nothing is created or written: the file must exist and already carry
    /// the `nodes` and `node_links` tables.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        migration::check_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open a database for loading, creating the file and running
    /// migrations as needed.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Insert or replace a node.
    pub fn insert_node(&self, record: &NodeRecord) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO nodes
                    (node_id, node_type, handle, on_site, read_rights, write_rights)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.node_id.as_str(),
                    record.node_type.as_code(),
                    record.handle,
                    record.on_site,
                    record.read_rights,
                    record.write_rights,
                ],
            )?;
            Ok(())
        })
    }

    /// Record `child` as a child of `parent`. Linking twice is a no-op.
    pub fn link(&self, parent: &NodeId, child: &NodeId) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO node_links (parent_id, child_id) VALUES (?1, ?2)",
                params![parent.as_str(), child.as_str()],
            )?;
            Ok(())
        })
    }

    /// Execute an operation on the connection from synchronous code.
    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        f(&conn)
    }

    /// Execute an operation on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| StoreError::Poisoned(e.to_string()))?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }

    /// Read one text column of a node.
    async fn node_column(&self, node: &NodeId, column: &'static str) -> Result<Option<String>> {
        let node = node.clone();
        self.blocking(move |conn| {
            let sql = format!("SELECT {} FROM nodes WHERE node_id = ?1", column);
            let value: Option<Option<String>> = conn
                .query_row(&sql, params![node.as_str()], |row| row.get(0))
                .optional()?;
            Ok(value.flatten())
        })
        .await
    }
}

#[async_trait]
impl MetadataStore for SqliteStore {
    async fn node_type(&self, node: &NodeId) -> Result<Option<NodeType>> {
        Ok(self
            .node_column(node, "node_type")
            .await?
            .map(|code| NodeType::from_code(&code)))
    }

    async fn descendants(&self, roots: &[NodeId]) -> Result<Vec<NodeId>> {
        let roots = roots.to_vec();
        self.blocking(move |conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT child_id FROM node_links WHERE parent_id = ?1 ORDER BY child_id",
            )?;
            walk_descendants(&roots, |parent| {
                let children = stmt
                    .query_map(params![parent.as_str()], |row| row.get::<_, String>(0))?
                    .map(|r| r.map(NodeId::from_store))
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(children)
            })
        })
        .await
    }

    async fn is_on_site(&self, node: &NodeId) -> Result<Option<bool>> {
        let node = node.clone();
        self.blocking(move |conn| {
            conn.query_row(
                "SELECT on_site FROM nodes WHERE node_id = ?1",
                params![node.as_str()],
                |row| row.get::<_, bool>(0),
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn raw_read_acl(&self, node: &NodeId) -> Result<Option<String>> {
        self.node_column(node, "read_rights").await
    }

    async fn raw_write_acl(&self, node: &NodeId) -> Result<Option<String>> {
        self.node_column(node, "write_rights").await
    }

    async fn handle(&self, node: &NodeId) -> Result<Option<String>> {
        self.node_column(node, "handle").await
    }

    async fn node_for_handle(&self, handle: &str) -> Result<Option<NodeId>> {
        let handle = handle.to_string();
        self.blocking(move |conn| {
            let id: Option<String> = conn
                .query_row(
                    "SELECT node_id FROM nodes WHERE handle = ?1 ORDER BY node_id LIMIT 1",
                    params![handle],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(id.map(NodeId::from_store))
        })
        .await
    }
}

//! In-memory implementation of the MetadataStore trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;

use ams2xacml_core::{NodeId, NodeType};

use crate::error::{Result, StoreError};
use crate::traits::{walk_descendants, MetadataStore, NodeRecord};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Nodes indexed by ID.
    nodes: HashMap<NodeId, NodeRecord>,

    /// Parent -> children, kept sorted.
    links: HashMap<NodeId, BTreeSet<NodeId>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    /// Insert or replace a node.
    pub fn insert_node(&self, record: NodeRecord) -> Result<()> {
        let mut inner = self.write()?;
        inner.nodes.insert(record.node_id.clone(), record);
        Ok(())
    }

    /// Record `child` as a child of `parent`.
    pub fn link(&self, parent: &NodeId, child: &NodeId) -> Result<()> {
        let mut inner = self.write()?;
        inner
            .links
            .entry(parent.clone())
            .or_default()
            .insert(child.clone());
        Ok(())
    }

    /// Number of nodes stored.
    pub fn len(&self) -> usize {
        self.inner.read().map(|i| i.nodes.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn with_node<T>(&self, node: &NodeId, f: impl FnOnce(&NodeRecord) -> T) -> Result<Option<T>> {
        let inner = self.read()?;
        Ok(inner.nodes.get(node).map(f))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataStore for MemoryStore {
    async fn node_type(&self, node: &NodeId) -> Result<Option<NodeType>> {
        self.with_node(node, |r| r.node_type)
    }

    async fn descendants(&self, roots: &[NodeId]) -> Result<Vec<NodeId>> {
        let inner = self.read()?;
        walk_descendants(roots, |parent| {
            Ok(inner
                .links
                .get(parent)
                .map(|children| children.iter().cloned().collect())
                .unwrap_or_default())
        })
    }

    async fn is_on_site(&self, node: &NodeId) -> Result<Option<bool>> {
        self.with_node(node, |r| r.on_site)
    }

    async fn raw_read_acl(&self, node: &NodeId) -> Result<Option<String>> {
        self.with_node(node, |r| r.read_rights.clone())
    }

    async fn raw_write_acl(&self, node: &NodeId) -> Result<Option<String>> {
        self.with_node(node, |r| r.write_rights.clone())
    }

    async fn handle(&self, node: &NodeId) -> Result<Option<String>> {
        Ok(self.with_node(node, |r| r.handle.clone())?.flatten())
    }

    async fn node_for_handle(&self, handle: &str) -> Result<Option<NodeId>> {
        let inner = self.read()?;
        Ok(inner
            .nodes
            .values()
            .filter(|r| r.handle.as_deref() == Some(handle))
            .map(|r| r.node_id.clone())
            .min())
    }
}

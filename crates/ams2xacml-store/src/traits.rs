//! MetadataStore trait: the read-only view of the corpus structure.
//!
//! The converter only needs node types, the node hierarchy, the on-site flag,
//! raw access rights and handles. Implementations include SQLite (primary)
//! and in-memory (for tests).

use std::collections::HashSet;

use async_trait::async_trait;
use ams2xacml_core::{AccessMode, NodeId, NodeType};

use crate::error::Result;

/// One node as stored, used to load a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub node_id: NodeId,
    pub node_type: NodeType,
    /// Persistent identifier, e.g. `hdl:1839/00-0000-0000-0001-2345-6`.
    pub handle: Option<String>,
    /// Whether access data for this node is authoritative here.
    pub on_site: bool,
    /// Raw read ACL in the store encoding.
    pub read_rights: String,
    /// Raw write ACL in the store encoding.
    pub write_rights: String,
}

impl NodeRecord {
    /// An on-site node with no handle and no rights.
    pub fn new(node_id: NodeId, node_type: NodeType) -> Self {
        Self {
            node_id,
            node_type,
            handle: None,
            on_site: true,
            read_rights: String::new(),
            write_rights: String::new(),
        }
    }

    pub fn handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = Some(handle.into());
        self
    }

    pub fn on_site(mut self, on_site: bool) -> Self {
        self.on_site = on_site;
        self
    }

    pub fn read_rights(mut self, acl: impl Into<String>) -> Self {
        self.read_rights = acl.into();
        self
    }

    pub fn write_rights(mut self, acl: impl Into<String>) -> Self {
        self.write_rights = acl.into();
        self
    }
}

/// Read access to corpus structure metadata.
///
/// Lookups of unknown nodes return `Ok(None)`; errors are reserved for
/// failures of the store itself.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Type of a node, or `None` if the node is unknown.
    async fn node_type(&self, node: &NodeId) -> Result<Option<NodeType>>;

    /// All descendants of the given nodes, at any depth.
    ///
    /// Ordered by depth, then identifier; each node appears once and the
    /// given roots are not included.
    async fn descendants(&self, roots: &[NodeId]) -> Result<Vec<NodeId>>;

    /// Whether a node's access data is authoritative here.
    async fn is_on_site(&self, node: &NodeId) -> Result<Option<bool>>;

    /// Raw read ACL string.
    async fn raw_read_acl(&self, node: &NodeId) -> Result<Option<String>>;

    /// Raw write ACL string.
    async fn raw_write_acl(&self, node: &NodeId) -> Result<Option<String>>;

    /// Persistent identifier of a node.
    async fn handle(&self, node: &NodeId) -> Result<Option<String>>;

    /// Reverse handle lookup.
    async fn node_for_handle(&self, handle: &str) -> Result<Option<NodeId>>;

    /// Raw ACL string for the given mode.
    async fn raw_acl(&self, node: &NodeId, mode: AccessMode) -> Result<Option<String>> {
        match mode {
            AccessMode::Read => self.raw_read_acl(node).await,
            AccessMode::Write => self.raw_write_acl(node).await,
        }
    }
}

/// Breadth-first walk below `roots`.
///
/// Each level is sorted by identifier; nodes already seen (including the
/// roots) are skipped, which also makes the walk terminate on cycles.
pub(crate) fn walk_descendants<F>(roots: &[NodeId], mut children: F) -> Result<Vec<NodeId>>
where
    F: FnMut(&NodeId) -> Result<Vec<NodeId>>,
{
    let mut seen: HashSet<NodeId> = roots.iter().cloned().collect();
    let mut frontier: Vec<NodeId> = roots.to_vec();
    let mut out = Vec::new();

    while !frontier.is_empty() {
        let mut level = Vec::new();
        for parent in &frontier {
            for child in children(parent)? {
                if seen.insert(child.clone()) {
                    level.push(child);
                }
            }
        }
        level.sort();
        out.extend(level.iter().cloned());
        frontier = level;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn id(s: &str) -> NodeId {
        NodeId::from_store(s)
    }

    #[test]
    fn test_walk_orders_by_depth_then_id() {
        let mut tree: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        tree.insert(id("MPI1#"), vec![id("MPI5#"), id("MPI2#")]);
        tree.insert(id("MPI2#"), vec![id("MPI3#")]);
        tree.insert(id("MPI5#"), vec![id("MPI4#"), id("MPI3#")]);

        let out = walk_descendants(&[id("MPI1#")], |n| {
            Ok(tree.get(n).cloned().unwrap_or_default())
        })
        .unwrap();

        assert_eq!(out, vec![id("MPI2#"), id("MPI5#"), id("MPI3#"), id("MPI4#")]);
    }

    #[test]
    fn test_walk_multiple_roots_excludes_roots() {
        let mut tree: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        tree.insert(id("MPI1#"), vec![id("MPI2#")]);
        tree.insert(id("MPI2#"), vec![id("MPI3#")]);

        let out = walk_descendants(&[id("MPI1#"), id("MPI2#")], |n| {
            Ok(tree.get(n).cloned().unwrap_or_default())
        })
        .unwrap();

        assert_eq!(out, vec![id("MPI3#")]);
    }
}

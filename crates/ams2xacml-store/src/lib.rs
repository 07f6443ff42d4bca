//! # ams2xacml Store
//!
//! Read-only access to the corpus structure database: node types, the node
//! hierarchy, the on-site flag, raw access rights and handles.
//!
//! ## Overview
//!
//! The converter is storage-agnostic: it talks to the [`MetadataStore`]
//! trait. The primary implementation is [`SqliteStore`], with
//! [`MemoryStore`] for testing.
//!
//! ## Key Types
//!
//! - [`MetadataStore`] - The async trait for all lookups
//! - [`SqliteStore`] - SQLite-based corpus structure database
//! - [`MemoryStore`] - In-memory store for tests
//! - [`NodeRecord`] - One node with its access information, for loading
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ams2xacml_store::{MetadataStore, SqliteStore};
//! use ams2xacml_core::NodeId;
//!
//! async fn example() {
//!     let store = SqliteStore::open("corpusstructure.db").unwrap();
//!     let root = NodeId::parse("MPI12345#").unwrap();
//!
//!     let nodes = store.descendants(&[root]).await.unwrap();
//!     for node in nodes {
//!         let _acl = store.raw_read_acl(&node).await.unwrap();
//!     }
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Unknown nodes are not errors**: lookups return `Ok(None)`
//! - **Deterministic hierarchy walks**: descendants come back by depth, then id
//! - **Cycle-safe**: a node is visited at most once per walk

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{MetadataStore, NodeRecord};

//! Error types for the converter.

use std::path::PathBuf;

use ams2xacml_core::{NodeId, PolicyError, XmlError};
use ams2xacml_store::StoreError;
use thiserror::Error;

/// Errors that can occur while converting access rights to policies.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Policy construction error.
    #[error("policy error: {0}")]
    Policy(#[from] PolicyError),

    /// A finished policy could not be serialized.
    #[error("XML error: {0}")]
    Xml(#[from] XmlError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// The output directory could not be created.
    #[error("cannot create output directory {path}: {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The policy file could not be written.
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A store call or file write exceeded the configured deadline.
    #[error("{operation} for {node} timed out")]
    Timeout {
        operation: &'static str,
        node: NodeId,
    },

    /// No start node was given.
    #[error("at least one start node id is required")]
    NoStartNodes,
}

impl ConvertError {
    /// Whether the batch must stop. Everything else, serialization of a
    /// single policy included, only affects one object.
    pub fn is_fatal(&self) -> bool {
        match self {
            ConvertError::Policy(e) => e.is_fatal(),
            ConvertError::NoStartNodes => true,
            _ => false,
        }
    }
}

/// Result type for converter operations.
pub type Result<T> = std::result::Result<T, ConvertError>;

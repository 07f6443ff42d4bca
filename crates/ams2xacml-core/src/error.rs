//! Error types for the ams2xacml core.

use thiserror::Error;

/// Errors raised while reading or writing XML.
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("malformed XML at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    #[error("document has no root element")]
    NoRootElement,

    #[error("unexpected closing tag </{0}>")]
    UnbalancedEnd(String),

    #[error("document ends inside <{0}>")]
    UnclosedElement(String),

    #[error("content after the root element")]
    TrailingContent,

    #[error("failed to write XML: {0}")]
    Write(String),
}

/// Errors from policy construction.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("XML error: {0}")]
    Xml(#[from] XmlError),

    /// The bundled template is missing a node the locator relies on.
    /// Never recoverable per object.
    #[error("template structure error: rule '{rule}' has no {part}")]
    TemplateStructure {
        rule: &'static str,
        part: &'static str,
    },

    /// A node path no longer points at an element of the working document.
    #[error("node path {0} does not resolve to an element")]
    DanglingPath(String),

    /// An access list with no entries reached the expander.
    #[error("internal error: access list is empty")]
    EmptyAccessList,

    #[error("invalid node id '{0}': expected MPI<digits>#")]
    InvalidNodeId(String),

    #[error("invalid username format '{0}': expected keep, strip or both")]
    InvalidUsernameFormat(String),

    #[error("invalid group limit '{0}': expected a number or 'unlimited'")]
    InvalidGroupLimit(String),

    #[error("handle '{0}' does not yield a usable file name")]
    InvalidHandle(String),
}

impl PolicyError {
    /// Whether this error means the process cannot continue with any object.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PolicyError::Xml(_)
                | PolicyError::TemplateStructure { .. }
                | PolicyError::DanglingPath(_)
                | PolicyError::EmptyAccessList
        )
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, PolicyError>;

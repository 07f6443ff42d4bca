//! Template store: the canonical policy template and its working copies.

use crate::error::PolicyError;
use crate::locator;
use crate::types::AccessMode;
use crate::xml::Document;

/// The bundled XACML template.
pub const BUNDLED_TEMPLATE: &str = include_str!("../assets/default-policy.xml");

/// A per-object copy of the template, mutated by the expander.
pub type WorkingDocument = Document;

/// The parsed, read-only policy template.
///
/// Loaded once per process and shared by reference; it is never mutated.
#[derive(Debug, Clone)]
pub struct PolicyTemplate {
    document: Document,
}

impl PolicyTemplate {
    /// Parse the template bundled with the crate.
    pub fn bundled() -> Result<Self, PolicyError> {
        Self::parse(BUNDLED_TEMPLATE)
    }

    /// Parse a template and check that both rule branches can be located.
    pub fn parse(xml: &str) -> Result<Self, PolicyError> {
        let document = Document::parse(xml)?;
        for mode in [AccessMode::Read, AccessMode::Write] {
            locator::locate(&document, mode)?;
        }
        Ok(Self { document })
    }

    /// A structurally independent deep copy.
    pub fn fresh_copy(&self) -> WorkingDocument {
        self.document.clone()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

//! # ams2xacml Core
//!
//! Pure policy generation: no database, no file system.
//!
//! Given the raw access rights of one archived object, this crate produces
//! an XACML policy document by copying a fixed template, cloning the subject
//! value node once per subject, and pruning the rule branch that does not
//! apply to the object's type.
//!
//! ## Key Types
//!
//! - [`PolicyTemplate`] - The bundled template, parsed once and shared read-only
//! - [`AccessList`] - Normalized ACL produced by [`normalize`]
//! - [`RuleTargets`] - Nodes located in a working copy by [`locate`]
//! - [`ExpandOptions`] - Username format and group-size collapse threshold
//! - [`Document`] - Owned XML tree, pretty printed with quick-xml
//!
//! ## Usage
//!
//! ```rust
//! use ams2xacml_core::{
//!     build_policy, normalize, AccessMode, ExpandOptions, NodeType, PolicyTemplate,
//! };
//!
//! let template = PolicyTemplate::bundled().unwrap();
//! let mode = AccessMode::for_node_type(NodeType::Session);
//! let acl = normalize("marker userA userB");
//!
//! let (doc, summary) = build_policy(&template, mode, &acl, &ExpandOptions::default()).unwrap();
//! assert_eq!(summary.subjects, vec!["userA", "userB"]);
//!
//! let xml = doc.to_pretty_xml().unwrap();
//! assert!(!xml.is_empty());
//! ```

pub mod acl;
pub mod error;
pub mod expand;
pub mod filename;
pub mod locator;
pub mod policy;
pub mod template;
pub mod types;
pub mod xml;

pub use acl::{normalize, normalize_lookup, AccessList};
pub use error::{PolicyError, Result, XmlError};
pub use expand::{expand, strip_domain, subject_values, ExpandOptions, ExpansionSummary};
pub use filename::{policy_file_name, policy_file_stem};
pub use locator::{locate, RuleTargets};
pub use policy::build_policy;
pub use template::{PolicyTemplate, WorkingDocument};
pub use types::{AccessMode, GroupLimit, NodeId, NodeType, UsernameFormat};
pub use xml::{Document, Element, NodePath, XmlNode};

//! Strong type definitions for ams2xacml.
//!
//! Node identifiers and the configuration enums are newtypes or closed
//! enums so that a raw string never reaches the policy builder unchecked.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;

/// Identifier of a node in the corpus structure, e.g. `MPI12345#`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Parse a user-supplied node identifier.
    ///
    /// Accepts exactly `MPI`, one or more ASCII digits, then `#`.
    pub fn parse(s: &str) -> Result<Self, PolicyError> {
        let digits = s
            .strip_prefix("MPI")
            .and_then(|rest| rest.strip_suffix('#'))
            .ok_or_else(|| PolicyError::InvalidNodeId(s.to_string()))?;

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PolicyError::InvalidNodeId(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    /// Wrap an identifier returned by the metadata store.
    ///
    /// The store is authoritative for its own identifiers, so no format
    /// check is applied.
    pub fn from_store(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NodeId {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Kind of node in the corpus structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Catalogue,
    Session,
    Corpus,
    /// A type the store could not classify. Treated as a container.
    Unknown,
    /// Leaf objects: resources, media files, written resources, info files.
    Object,
}

impl NodeType {
    /// Text code used by the store schema.
    pub fn as_code(&self) -> &'static str {
        match self {
            NodeType::Catalogue => "catalogue",
            NodeType::Session => "session",
            NodeType::Corpus => "corpus",
            NodeType::Unknown => "unknown",
            NodeType::Object => "object",
        }
    }

    /// Map a store type code to a node type. Unrecognized codes are `Unknown`.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "catalogue" => NodeType::Catalogue,
            "session" => NodeType::Session,
            "corpus" => NodeType::Corpus,
            "resource" | "media" | "written" | "info" | "object" => NodeType::Object,
            _ => NodeType::Unknown,
        }
    }

    /// Containers carry write (management) rights, leaves carry read rights.
    pub fn is_container(&self) -> bool {
        !matches!(self, NodeType::Object)
    }
}

/// Which template branch applies to an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    /// Reading the object's datastream.
    Read,
    /// Management functions on a container.
    Write,
}

impl AccessMode {
    pub fn for_node_type(node_type: NodeType) -> Self {
        if node_type.is_container() {
            AccessMode::Write
        } else {
            AccessMode::Read
        }
    }

    /// The mode whose template branch is removed when this one applies.
    pub fn other(&self) -> Self {
        match self {
            AccessMode::Read => AccessMode::Write,
            AccessMode::Write => AccessMode::Read,
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessMode::Read => f.write_str("read"),
            AccessMode::Write => f.write_str("write"),
        }
    }
}

/// How a user identifier is rendered in the emitted policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsernameFormat {
    /// Identifier unchanged.
    #[default]
    Keep,
    /// Everything from the first `@` onward removed.
    Strip,
    /// One subject in each form.
    Both,
}

impl FromStr for UsernameFormat {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "keep" => Ok(UsernameFormat::Keep),
            "strip" => Ok(UsernameFormat::Strip),
            "both" => Ok(UsernameFormat::Both),
            _ => Err(PolicyError::InvalidUsernameFormat(s.to_string())),
        }
    }
}

impl fmt::Display for UsernameFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsernameFormat::Keep => f.write_str("keep"),
            UsernameFormat::Strip => f.write_str("strip"),
            UsernameFormat::Both => f.write_str("both"),
        }
    }
}

/// Threshold above which a user list collapses to "authenticated".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupLimit {
    #[default]
    Unlimited,
    /// Lists with at least this many users collapse.
    Max(usize),
}

impl GroupLimit {
    /// Interpret the legacy integer setting, where any negative value
    /// disables collapsing.
    ///
    /// # Errors
    /// `InvalidGroupLimit` if the value does not fit in a `usize`.
    pub fn from_sentinel(value: i64) -> Result<Self, PolicyError> {
        if value < 0 {
            return Ok(GroupLimit::Unlimited);
        }
        usize::try_from(value)
            .map(GroupLimit::Max)
            .map_err(|_| PolicyError::InvalidGroupLimit(value.to_string()))
    }

    /// Whether a list of `users` users collapses under this limit.
    pub fn collapses(&self, users: usize) -> bool {
        match self {
            GroupLimit::Unlimited => false,
            GroupLimit::Max(max) => users >= *max,
        }
    }
}

impl FromStr for GroupLimit {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("unlimited") {
            return Ok(GroupLimit::Unlimited);
        }
        let value = s
            .parse::<i64>()
            .map_err(|_| PolicyError::InvalidGroupLimit(s.to_string()))?;
        GroupLimit::from_sentinel(value)
    }
}

impl fmt::Display for GroupLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupLimit::Unlimited => f.write_str("unlimited"),
            GroupLimit::Max(max) => write!(f, "{}", max),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_parse() {
        assert_eq!(NodeId::parse("MPI12345#").unwrap().as_str(), "MPI12345#");
        assert!(NodeId::parse("MPI#").is_err());
        assert!(NodeId::parse("MPI12a#").is_err());
        assert!(NodeId::parse("MPI123").is_err());
        assert!(NodeId::parse("mpi123#").is_err());
        assert!(NodeId::parse("XMPI123#").is_err());
    }

    #[test]
    fn test_node_type_codes() {
        for t in [
            NodeType::Catalogue,
            NodeType::Session,
            NodeType::Corpus,
            NodeType::Unknown,
            NodeType::Object,
        ] {
            assert_eq!(NodeType::from_code(t.as_code()), t);
        }
        assert_eq!(NodeType::from_code("Media"), NodeType::Object);
        assert_eq!(NodeType::from_code("something-else"), NodeType::Unknown);
    }

    #[test]
    fn test_access_mode_for_node_type() {
        assert_eq!(AccessMode::for_node_type(NodeType::Catalogue), AccessMode::Write);
        assert_eq!(AccessMode::for_node_type(NodeType::Session), AccessMode::Write);
        assert_eq!(AccessMode::for_node_type(NodeType::Corpus), AccessMode::Write);
        assert_eq!(AccessMode::for_node_type(NodeType::Unknown), AccessMode::Write);
        assert_eq!(AccessMode::for_node_type(NodeType::Object), AccessMode::Read);
        assert_eq!(AccessMode::Read.other(), AccessMode::Write);
    }

    #[test]
    fn test_username_format_from_str() {
        assert_eq!("keep".parse::<UsernameFormat>().unwrap(), UsernameFormat::Keep);
        assert_eq!("STRIP".parse::<UsernameFormat>().unwrap(), UsernameFormat::Strip);
        assert_eq!("both".parse::<UsernameFormat>().unwrap(), UsernameFormat::Both);
        assert!("drop".parse::<UsernameFormat>().is_err());
    }

    #[test]
    fn test_group_limit() {
        assert_eq!("unlimited".parse::<GroupLimit>().unwrap(), GroupLimit::Unlimited);
        assert_eq!("-1".parse::<GroupLimit>().unwrap(), GroupLimit::Unlimited);
        assert_eq!("50".parse::<GroupLimit>().unwrap(), GroupLimit::Max(50));
        assert!("many".parse::<GroupLimit>().is_err());

        assert!(!GroupLimit::Unlimited.collapses(1_000_000));
        assert!(!GroupLimit::Max(3).collapses(2));
        assert!(GroupLimit::Max(3).collapses(3));
        assert!(GroupLimit::Max(3).collapses(4));
    }

    #[test]
    fn test_group_limit_from_sentinel() {
        assert_eq!(GroupLimit::from_sentinel(-5).unwrap(), GroupLimit::Unlimited);
        assert_eq!(GroupLimit::from_sentinel(0).unwrap(), GroupLimit::Max(0));
        assert!("99999999999999999999".parse::<GroupLimit>().is_err());
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_group_limit_largest_value() {
        assert_eq!(
            GroupLimit::from_sentinel(i64::MAX).unwrap(),
            GroupLimit::Max(i64::MAX as usize)
        );
    }

    #[cfg(target_pointer_width = "32")]
    #[test]
    fn test_group_limit_overflow_rejected() {
        assert!(matches!(
            GroupLimit::from_sentinel(i64::MAX),
            Err(PolicyError::InvalidGroupLimit(_))
        ));
    }
}

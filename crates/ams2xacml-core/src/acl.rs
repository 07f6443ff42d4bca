//! Access-control lists as stored in the corpus structure, and their
//! normalized form.
//!
//! The store encodes an ACL as a single string: one of the sentinels below,
//! or a space-separated user list whose first token is a legacy marker.

use serde::Serialize;

/// Sentinel granting access to everyone, including anonymous users.
pub const EVERYBODY: &str = "everybody";

/// Sentinel granting access to nobody.
pub const NOBODY: &str = "nobody";

/// Sentinel for cleared rights; treated the same as [`NOBODY`].
pub const CLEARED: &str = "cleared";

/// Sentinel granting access to any authenticated user.
pub const ALL_AUTHENTICATED: &str = "all-authenticated";

/// Subject text emitted for [`AccessList::Everybody`].
pub const ANONYMOUS_SUBJECT: &str = "anonymous";

/// Subject text emitted for [`AccessList::AllAuthenticated`] and for
/// collapsed user lists.
pub const AUTHENTICATED_SUBJECT: &str = "authenticated";

/// A normalized access list.
///
/// The special variants describe the whole list and never mix with users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessList {
    Everybody,
    AllAuthenticated,
    NoOne,
    /// Individual subjects in store order. Never empty when produced by
    /// [`normalize`].
    Users(Vec<String>),
}

impl AccessList {
    /// Number of entries in the list. Special variants count as one.
    pub fn len(&self) -> usize {
        match self {
            AccessList::Users(users) => users.len(),
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Translate the store's raw encoding into an [`AccessList`].
///
/// The first token of a multi-token user list is a legacy marker and is
/// dropped. A single token is kept as the only user. An empty or
/// whitespace-only string grants nothing.
pub fn normalize(raw: &str) -> AccessList {
    match raw {
        EVERYBODY => return AccessList::Everybody,
        NOBODY | CLEARED => return AccessList::NoOne,
        ALL_AUTHENTICATED => return AccessList::AllAuthenticated,
        _ => {}
    }

    let tokens: Vec<&str> = raw.split(' ').filter(|t| !t.is_empty()).collect();
    match tokens.len() {
        0 => AccessList::NoOne,
        1 => AccessList::Users(vec![tokens[0].to_string()]),
        _ => AccessList::Users(tokens[1..].iter().map(|t| t.to_string()).collect()),
    }
}

/// Normalize the result of a store lookup. A missing entry means the node
/// is unknown to the store, which grants nothing.
pub fn normalize_lookup(raw: Option<&str>) -> AccessList {
    raw.map(normalize).unwrap_or(AccessList::NoOne)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels() {
        assert_eq!(normalize("everybody"), AccessList::Everybody);
        assert_eq!(normalize("nobody"), AccessList::NoOne);
        assert_eq!(normalize("cleared"), AccessList::NoOne);
        assert_eq!(normalize("all-authenticated"), AccessList::AllAuthenticated);
    }

    #[test]
    fn test_sentinels_are_exact() {
        // Not a sentinel: the marker is dropped and the rest is a user.
        assert_eq!(
            normalize("x everybody"),
            AccessList::Users(vec!["everybody".into()])
        );
        assert_eq!(normalize("Everybody"), AccessList::Users(vec!["Everybody".into()]));
    }

    #[test]
    fn test_marker_is_dropped() {
        assert_eq!(
            normalize("marker userA userB"),
            AccessList::Users(vec!["userA".into(), "userB".into()])
        );
    }

    #[test]
    fn test_order_preserved_and_empty_tokens_skipped() {
        assert_eq!(
            normalize("m  zed  alice bob@mpi.nl "),
            AccessList::Users(vec!["zed".into(), "alice".into(), "bob@mpi.nl".into()])
        );
    }

    #[test]
    fn test_single_token_is_kept() {
        assert_eq!(normalize("corpman"), AccessList::Users(vec!["corpman".into()]));
        assert_eq!(normalize("  corpman "), AccessList::Users(vec!["corpman".into()]));
    }

    #[test]
    fn test_empty_grants_nothing() {
        assert_eq!(normalize(""), AccessList::NoOne);
        assert_eq!(normalize("   "), AccessList::NoOne);
    }

    #[test]
    fn test_unknown_node_is_no_one() {
        assert_eq!(normalize_lookup(None), AccessList::NoOne);
        assert_eq!(normalize_lookup(Some("everybody")), AccessList::Everybody);
    }

    #[test]
    fn test_len() {
        assert_eq!(AccessList::NoOne.len(), 1);
        assert_eq!(AccessList::Users(vec![]).len(), 0);
        assert!(AccessList::Users(vec![]).is_empty());
        assert_eq!(normalize("m a b c").len(), 3);
    }
}

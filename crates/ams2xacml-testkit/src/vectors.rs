//! Golden policy vectors.
//!
//! Each vector pairs a raw access string from the store with the subjects
//! and rule the generated policy must contain.

use serde::Serialize;

use ams2xacml_core::locator::rule_id;
use ams2xacml_core::{
    build_policy, normalize, AccessMode, Document, ExpandOptions, GroupLimit, PolicyTemplate,
    UsernameFormat,
};

use crate::fixtures::{rule_ids, subject_values};

/// A golden policy vector.
#[derive(Debug, Clone, Serialize)]
pub struct PolicyVector {
    pub name: &'static str,
    pub mode: AccessMode,
    /// Access string as stored.
    pub raw_acl: &'static str,
    pub username_format: UsernameFormat,
    pub group_limit: GroupLimit,
    /// Subject values expected in the bag, in order.
    pub expected_subjects: &'static [&'static str],
}

impl PolicyVector {
    pub fn options(&self) -> ExpandOptions {
        ExpandOptions {
            username_format: self.username_format,
            group_limit: self.group_limit,
        }
    }
}

/// Get all golden vectors.
pub fn all_vectors() -> Vec<PolicyVector> {
    vec![
        PolicyVector {
            name: "session write list drops marker",
            mode: AccessMode::Write,
            raw_acl: "marker userA userB",
            username_format: UsernameFormat::Keep,
            group_limit: GroupLimit::Unlimited,
            expected_subjects: &["userA", "userB"],
        },
        PolicyVector {
            name: "object open to everybody",
            mode: AccessMode::Read,
            raw_acl: "everybody",
            username_format: UsernameFormat::Keep,
            group_limit: GroupLimit::Unlimited,
            expected_subjects: &["anonymous"],
        },
        PolicyVector {
            name: "all authenticated",
            mode: AccessMode::Read,
            raw_acl: "all-authenticated",
            username_format: UsernameFormat::Keep,
            group_limit: GroupLimit::Unlimited,
            expected_subjects: &["authenticated"],
        },
        PolicyVector {
            name: "nobody",
            mode: AccessMode::Write,
            raw_acl: "nobody",
            username_format: UsernameFormat::Keep,
            group_limit: GroupLimit::Unlimited,
            expected_subjects: &[],
        },
        PolicyVector {
            name: "cleared",
            mode: AccessMode::Read,
            raw_acl: "cleared",
            username_format: UsernameFormat::Keep,
            group_limit: GroupLimit::Unlimited,
            expected_subjects: &[],
        },
        PolicyVector {
            name: "empty string",
            mode: AccessMode::Read,
            raw_acl: "",
            username_format: UsernameFormat::Keep,
            group_limit: GroupLimit::Unlimited,
            expected_subjects: &[],
        },
        PolicyVector {
            name: "single token kept",
            mode: AccessMode::Read,
            raw_acl: "solo",
            username_format: UsernameFormat::Keep,
            group_limit: GroupLimit::Unlimited,
            expected_subjects: &["solo"],
        },
        PolicyVector {
            name: "large list collapses",
            mode: AccessMode::Read,
            raw_acl: "x a b c d",
            username_format: UsernameFormat::Keep,
            group_limit: GroupLimit::Max(4),
            expected_subjects: &["authenticated"],
        },
        PolicyVector {
            name: "list below limit",
            mode: AccessMode::Read,
            raw_acl: "x a b c",
            username_format: UsernameFormat::Keep,
            group_limit: GroupLimit::Max(4),
            expected_subjects: &["a", "b", "c"],
        },
        PolicyVector {
            name: "stripped domains",
            mode: AccessMode::Write,
            raw_acl: "x a@mpi.nl b",
            username_format: UsernameFormat::Strip,
            group_limit: GroupLimit::Unlimited,
            expected_subjects: &["a", "b"],
        },
        PolicyVector {
            name: "both forms",
            mode: AccessMode::Read,
            raw_acl: "x a@mpi.nl b",
            username_format: UsernameFormat::Both,
            group_limit: GroupLimit::Unlimited,
            expected_subjects: &["a@mpi.nl", "a", "b", "b"],
        },
    ]
}

/// Build the policy for `vector`.
pub fn build_vector(template: &PolicyTemplate, vector: &PolicyVector) -> Document {
    let (doc, _) = build_policy(
        template,
        vector.mode,
        &normalize(vector.raw_acl),
        &vector.options(),
    )
    .expect("golden vector must build");
    doc
}

/// Check `vector` against `template`. Returns a description of the first
/// mismatch.
pub fn verify_vector(template: &PolicyTemplate, vector: &PolicyVector) -> Result<(), String> {
    let doc = build_vector(template, vector);

    let subjects = subject_values(&doc);
    if subjects != vector.expected_subjects {
        return Err(format!(
            "{}: expected subjects {:?}, got {:?}",
            vector.name, vector.expected_subjects, subjects
        ));
    }

    let rules = rule_ids(&doc);
    if !rules.iter().any(|r| r == rule_id(vector.mode)) {
        return Err(format!("{}: governing rule missing", vector.name));
    }
    if rules.iter().any(|r| r == rule_id(vector.mode.other())) {
        return Err(format!("{}: other rule still present", vector.name));
    }

    let reparsed = doc
        .to_pretty_xml()
        .map_err(|e| e.to_string())
        .and_then(|bytes| String::from_utf8(bytes).map_err(|e| e.to_string()))
        .and_then(|xml| Document::parse(&xml).map_err(|e| e.to_string()))?;
    if subject_values(&reparsed) != subjects {
        return Err(format!("{}: output does not reparse to the same subjects", vector.name));
    }

    Ok(())
}

/// Verify all vectors against the bundled template.
pub fn verify_all_vectors() -> Vec<(String, Result<(), String>)> {
    let template = PolicyTemplate::bundled().expect("bundled template must load");
    all_vectors()
        .iter()
        .map(|v| (v.name.to_string(), verify_vector(&template, v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_pass() {
        for (name, result) in verify_all_vectors() {
            assert!(result.is_ok(), "{}: {:?}", name, result);
        }
    }

    #[test]
    fn test_vectors_serialize() {
        let json = serde_json::to_value(all_vectors()).unwrap();
        assert_eq!(json[0]["mode"], "write");
        assert_eq!(json[0]["expected_subjects"][1], "userB");
    }

    #[test]
    fn test_wrong_expectation_is_reported() {
        let template = PolicyTemplate::bundled().unwrap();
        let mut vector = all_vectors().remove(1);
        vector.expected_subjects = &["someone"];
        let err = verify_vector(&template, &vector).unwrap_err();
        assert!(err.contains("expected subjects"));
    }
}

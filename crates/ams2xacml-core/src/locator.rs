//! Rule locator: finds the clone prototype and the branch to prune.
//!
//! The query is fixed. For the rule of the requested mode:
//!
//! ```text
//! /Policy/Rule[@RuleId=<rule>]/Condition
//!     //SubjectAttributeDesignator[@AttributeId=<login id>]
//!     /following-sibling::node()/AttributeValue[1]
//! ```
//!
//! and the other mode's `/Policy/Rule[@RuleId=<other rule>]` as a whole.
//! Element names are compared without namespace prefixes.

use crate::error::PolicyError;
use crate::types::AccessMode;
use crate::xml::{Document, Element, NodePath};

/// Rule guarding reads of the object datastream.
pub const READ_RULE_ID: &str = "deny-read-object-datastream";

/// Rule guarding management functions.
pub const WRITE_RULE_ID: &str = "deny-management-functions";

/// Subject attribute compared against the listed subjects.
pub const LOGIN_ID_ATTRIBUTE: &str = "urn:fedora:names:fedora:2.1:subject:loginId";

/// Rule id of the template branch for a mode.
pub fn rule_id(mode: AccessMode) -> &'static str {
    match mode {
        AccessMode::Read => READ_RULE_ID,
        AccessMode::Write => WRITE_RULE_ID,
    }
}

/// Locations inside a working document needed by the expander.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTargets {
    /// The subject value node cloned once per subject.
    pub prototype: NodePath,
    /// Root of the rule for the mode that does not apply.
    pub other_branch: NodePath,
}

/// Locate the expansion targets for `mode`.
///
/// A missing node means the template itself is corrupt.
pub fn locate(doc: &Document, mode: AccessMode) -> Result<RuleTargets, PolicyError> {
    let rule = rule_id(mode);
    let other = rule_id(mode.other());

    let rule_path = find_rule(doc, rule).ok_or(PolicyError::TemplateStructure {
        rule,
        part: "rule element",
    })?;
    let prototype = find_subject_value(doc, &rule_path).ok_or(PolicyError::TemplateStructure {
        rule,
        part: "subject value following the loginId designator",
    })?;
    let other_branch = find_rule(doc, other).ok_or(PolicyError::TemplateStructure {
        rule: other,
        part: "rule element",
    })?;

    Ok(RuleTargets {
        prototype,
        other_branch,
    })
}

fn find_rule(doc: &Document, rule_id: &str) -> Option<NodePath> {
    if doc.root.local_name() != "Policy" {
        return None;
    }
    doc.root
        .child_elements()
        .find(|(_, e)| e.local_name() == "Rule" && e.attribute("RuleId") == Some(rule_id))
        .map(|(i, _)| NodePath::root().child(i))
}

fn find_subject_value(doc: &Document, rule_path: &NodePath) -> Option<NodePath> {
    let rule = doc.element(rule_path)?;
    rule.child_elements()
        .filter(|(_, e)| e.local_name() == "Condition")
        .find_map(|(i, condition)| search_designator(condition, rule_path.child(i)))
}

/// Depth-first search below `element` for a loginId designator followed by
/// a sibling holding an `AttributeValue`.
fn search_designator(element: &Element, path: NodePath) -> Option<NodePath> {
    for (i, child) in element.child_elements() {
        if is_login_designator(child) {
            let following = element
                .child_elements()
                .filter(|(j, _)| *j > i)
                .find_map(|(j, sibling)| {
                    sibling
                        .child_elements()
                        .find(|(_, e)| e.local_name() == "AttributeValue")
                        .map(|(k, _)| path.child(j).child(k))
                });
            if following.is_some() {
                return following;
            }
        }
        if let Some(found) = search_designator(child, path.child(i)) {
            return Some(found);
        }
    }
    None
}

fn is_login_designator(element: &Element) -> bool {
    element.local_name() == "SubjectAttributeDesignator"
        && element.attribute("AttributeId") == Some(LOGIN_ID_ATTRIBUTE)
}

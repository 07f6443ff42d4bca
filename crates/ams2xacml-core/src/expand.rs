//! Access-list expansion: the mutation that turns a template copy into a
//! policy for one object.

use serde::Serialize;

use crate::acl::{AccessList, ANONYMOUS_SUBJECT, AUTHENTICATED_SUBJECT};
use crate::error::PolicyError;
use crate::locator::RuleTargets;
use crate::types::{GroupLimit, UsernameFormat};
use crate::xml::{NodePath, XmlNode};
use crate::template::WorkingDocument;

/// Settings applied to every expansion in a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpandOptions {
    pub username_format: UsernameFormat,
    pub group_limit: GroupLimit,
}

/// What an expansion did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpansionSummary {
    /// Subject values appended, in order.
    pub subjects: Vec<String>,
    /// Whether a user list collapsed to "authenticated".
    pub collapsed: bool,
}

/// Drop everything from the first `@` onward.
pub fn strip_domain(identifier: &str) -> &str {
    match identifier.find('@') {
        Some(at) => &identifier[..at],
        None => identifier,
    }
}

/// Subject values to emit for `acl`, in order.
///
/// # Errors
/// `EmptyAccessList` if a user list has no entries. [`crate::acl::normalize`]
/// never produces one, so reaching this is a defect in the caller.
pub fn subject_values(
    acl: &AccessList,
    options: &ExpandOptions,
) -> Result<(Vec<String>, bool), PolicyError> {
    let users = match acl {
        AccessList::Everybody => return Ok((vec![ANONYMOUS_SUBJECT.to_string()], false)),
        AccessList::AllAuthenticated => return Ok((vec![AUTHENTICATED_SUBJECT.to_string()], false)),
        AccessList::NoOne => return Ok((Vec::new(), false)),
        AccessList::Users(users) => users,
    };

    if users.is_empty() {
        return Err(PolicyError::EmptyAccessList);
    }
    if options.group_limit.collapses(users.len()) {
        return Ok((vec![AUTHENTICATED_SUBJECT.to_string()], true));
    }

    let mut values = Vec::with_capacity(users.len() * 2);
    for user in users {
        match options.username_format {
            UsernameFormat::Keep => values.push(user.clone()),
            UsernameFormat::Strip => values.push(strip_domain(user).to_string()),
            UsernameFormat::Both => {
                values.push(user.clone());
                values.push(strip_domain(user).to_string());
            }
        }
    }
    Ok((values, false))
}

/// Expand `acl` into `doc` at `targets`.
///
/// Appends one clone of the prototype per subject value to the prototype's
/// parent, removes the prototype, then removes the other mode's branch.
/// With [`AccessList::NoOne`] the parent is left with no subject values.
pub fn expand(
    doc: &mut WorkingDocument,
    targets: &RuleTargets,
    acl: &AccessList,
    options: &ExpandOptions,
) -> Result<ExpansionSummary, PolicyError> {
    if targets.other_branch.is_prefix_of(&targets.prototype) {
        return Err(PolicyError::DanglingPath(targets.prototype.to_string()));
    }

    let (subjects, collapsed) = subject_values(acl, options)?;

    let prototype = doc
        .element(&targets.prototype)
        .cloned()
        .ok_or_else(|| PolicyError::DanglingPath(targets.prototype.to_string()))?;
    let (parent_path, prototype_index) = targets
        .prototype
        .split_last()
        .ok_or_else(|| PolicyError::DanglingPath(targets.prototype.to_string()))?;

    let parent = doc
        .element_mut(&parent_path)
        .ok_or_else(|| PolicyError::DanglingPath(parent_path.to_string()))?;
    for subject in &subjects {
        let mut clone = prototype.clone();
        clone.set_text_content(subject.as_str());
        parent.children.push(XmlNode::Element(clone));
    }
    parent.children.remove(prototype_index);

    remove_branch(doc, &targets.other_branch, &targets.prototype)?;

    Ok(ExpansionSummary {
        subjects,
        collapsed,
    })
}

/// Remove the other branch. Its path was computed before the prototype was
/// removed, so shift it if both share a parent and the prototype came first.
fn remove_branch(
    doc: &mut WorkingDocument,
    branch: &NodePath,
    prototype: &NodePath,
) -> Result<(), PolicyError> {
    let branch = match (branch.split_last(), prototype.split_last()) {
        (Some((bp, bi)), Some((pp, pi))) if bp == pp && pi < bi => bp.child(bi - 1),
        _ => branch.clone(),
    };
    doc.remove(&branch)
        .map(|_| ())
        .ok_or_else(|| PolicyError::DanglingPath(branch.to_string()))
}

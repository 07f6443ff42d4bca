//! Policy builder: template copy, location and expansion in one step.

use crate::acl::AccessList;
use crate::error::PolicyError;
use crate::expand::{expand, ExpandOptions, ExpansionSummary};
use crate::locator::locate;
use crate::template::{PolicyTemplate, WorkingDocument};
use crate::types::AccessMode;

/// Build the policy document for one object.
///
/// The template is only read; the returned document is exclusively owned
/// by the caller.
pub fn build_policy(
    template: &PolicyTemplate,
    mode: AccessMode,
    acl: &AccessList,
    options: &ExpandOptions,
) -> Result<(WorkingDocument, ExpansionSummary), PolicyError> {
    let mut doc = template.fresh_copy();
    let targets = locate(&doc, mode)?;
    let summary = expand(&mut doc, &targets, acl, options)?;
    Ok((doc, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::normalize;
    use crate::locator::{READ_RULE_ID, WRITE_RULE_ID};
    use crate::types::NodeType;

    #[test]
    fn test_session_write_acl() {
        let template = PolicyTemplate::bundled().unwrap();
        let mode = AccessMode::for_node_type(NodeType::Session);
        let (doc, summary) = build_policy(
            &template,
            mode,
            &normalize("marker userA userB"),
            &ExpandOptions::default(),
        )
        .unwrap();

        assert_eq!(summary.subjects, vec!["userA", "userB"]);
        assert!(!summary.collapsed);

        let xml = String::from_utf8(doc.to_pretty_xml().unwrap()).unwrap();
        assert!(xml.contains(WRITE_RULE_ID));
        assert!(!xml.contains(READ_RULE_ID));
        assert!(xml.contains(">userA</AttributeValue>"));
        assert!(xml.contains(">userB</AttributeValue>"));
        assert!(xml.find("userA").unwrap() < xml.find("userB").unwrap());
    }

    #[test]
    fn test_object_everybody() {
        let template = PolicyTemplate::bundled().unwrap();
        let mode = AccessMode::for_node_type(NodeType::Object);
        let (doc, summary) =
            build_policy(&template, mode, &normalize("everybody"), &ExpandOptions::default())
                .unwrap();

        assert_eq!(summary.subjects, vec!["anonymous"]);
        let xml = String::from_utf8(doc.to_pretty_xml().unwrap()).unwrap();
        assert!(xml.contains(READ_RULE_ID));
        assert!(!xml.contains(WRITE_RULE_ID));
        assert_eq!(xml.matches(">anonymous</AttributeValue>").count(), 1);
    }

    #[test]
    fn test_repeatable() {
        let template = PolicyTemplate::bundled().unwrap();
        let acl = normalize("m a b c");
        let options = ExpandOptions::default();
        let (a, _) = build_policy(&template, AccessMode::Read, &acl, &options).unwrap();
        let (b, _) = build_policy(&template, AccessMode::Read, &acl, &options).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_output_reparses() {
        let template = PolicyTemplate::bundled().unwrap();
        let (doc, _) = build_policy(
            &template,
            AccessMode::Write,
            &normalize("m a&b <c>"),
            &ExpandOptions::default(),
        )
        .unwrap();
        let bytes = doc.to_pretty_xml().unwrap();
        let reparsed = crate::xml::Document::parse(std::str::from_utf8(&bytes).unwrap()).unwrap();
        assert_eq!(reparsed, doc);
    }
}

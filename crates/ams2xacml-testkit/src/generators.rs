//! Proptest generators for property-based testing.

use proptest::prelude::*;

use ams2xacml_core::{
    AccessList, AccessMode, ExpandOptions, GroupLimit, NodeId, UsernameFormat,
};

/// A plain user name, never one of the sentinel words.
pub fn username() -> impl Strategy<Value = String> {
    "u[a-z0-9._-]{0,11}".prop_map(String::from)
}

/// A user name qualified with a domain, e.g. `u1@mpi.nl`.
pub fn qualified_username() -> impl Strategy<Value = String> {
    (username(), "[a-z]{1,8}\\.[a-z]{2,3}").prop_map(|(u, d)| format!("{}@{}", u, d))
}

/// A non-empty list of user names, plain or qualified.
pub fn users(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop_oneof![username(), qualified_username()], 1..=max.max(1))
}

/// Any normalized access list.
pub fn access_list() -> impl Strategy<Value = AccessList> {
    prop_oneof![
        Just(AccessList::Everybody),
        Just(AccessList::AllAuthenticated),
        Just(AccessList::NoOne),
        users(12).prop_map(AccessList::Users),
    ]
}

/// A raw access string as found in the store.
pub fn raw_acl() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("everybody".to_string()),
        Just("nobody".to_string()),
        Just("cleared".to_string()),
        Just("all-authenticated".to_string()),
        Just(String::new()),
        "[ ]{1,3}".prop_map(String::from),
        (username(), users(12)).prop_map(|(marker, users)| {
            format!("{} {}", marker, users.join(" "))
        }),
    ]
}

/// A handle, optionally with a part identifier.
pub fn handle() -> impl Strategy<Value = String> {
    (
        "[0-9]{4}",
        "[0-9A-Fa-f-]{1,20}",
        prop::option::of("[a-z=]{1,12}"),
    )
        .prop_map(|(prefix, suffix, part)| match part {
            Some(part) => format!("hdl:{}/{}@{}", prefix, suffix, part),
            None => format!("hdl:{}/{}", prefix, suffix),
        })
}

pub fn node_id() -> impl Strategy<Value = NodeId> {
    (0u64..1_000_000).prop_map(|n| NodeId::from_store(format!("MPI{}#", n)))
}

pub fn access_mode() -> impl Strategy<Value = AccessMode> {
    prop_oneof![Just(AccessMode::Read), Just(AccessMode::Write)]
}

pub fn username_format() -> impl Strategy<Value = UsernameFormat> {
    prop_oneof![
        Just(UsernameFormat::Keep),
        Just(UsernameFormat::Strip),
        Just(UsernameFormat::Both),
    ]
}

pub fn group_limit() -> impl Strategy<Value = GroupLimit> {
    prop_oneof![
        Just(GroupLimit::Unlimited),
        (1usize..16).prop_map(GroupLimit::Max),
    ]
}

/// Everything one policy expansion depends on.
#[derive(Debug, Clone)]
pub struct ExpansionParams {
    pub mode: AccessMode,
    pub acl: AccessList,
    pub options: ExpandOptions,
}

impl Arbitrary for ExpansionParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (access_mode(), access_list(), username_format(), group_limit())
            .prop_map(|(mode, acl, username_format, group_limit)| ExpansionParams {
                mode,
                acl,
                options: ExpandOptions {
                    username_format,
                    group_limit,
                },
            })
            .boxed()
    }
}

/// Number of subject values an expansion of `params` must produce.
pub fn expected_subject_count(params: &ExpansionParams) -> usize {
    match &params.acl {
        AccessList::Everybody | AccessList::AllAuthenticated => 1,
        AccessList::NoOne => 0,
        AccessList::Users(users) => {
            if params.options.group_limit.collapses(users.len()) {
                1
            } else if params.options.username_format == UsernameFormat::Both {
                users.len() * 2
            } else {
                users.len()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{rule_ids, subject_values};
    use ams2xacml_core::locator::rule_id;
    use ams2xacml_core::{build_policy, normalize, policy_file_stem, strip_domain, PolicyTemplate};

    fn template() -> PolicyTemplate {
        PolicyTemplate::bundled().unwrap()
    }

    proptest! {
        #[test]
        fn test_subject_count(params: ExpansionParams) {
            let (doc, summary) =
                build_policy(&template(), params.mode, &params.acl, &params.options).unwrap();

            let values = subject_values(&doc);
            prop_assert_eq!(values.len(), expected_subject_count(&params));
            prop_assert_eq!(values, summary.subjects);
        }

        #[test]
        fn test_only_governing_rule_remains(params: ExpansionParams) {
            let (doc, _) =
                build_policy(&template(), params.mode, &params.acl, &params.options).unwrap();

            let rules = rule_ids(&doc);
            prop_assert!(rules.iter().any(|r| r == rule_id(params.mode)));
            prop_assert!(!rules.iter().any(|r| r == rule_id(params.mode.other())));
        }

        #[test]
        fn test_user_order_preserved(users in users(8), format in username_format()) {
            let acl = AccessList::Users(users.clone());
            let options = ExpandOptions { username_format: format, group_limit: GroupLimit::Unlimited };
            let (doc, _) = build_policy(&template(), AccessMode::Read, &acl, &options).unwrap();

            let expected: Vec<String> = users
                .iter()
                .flat_map(|u| match format {
                    UsernameFormat::Keep => vec![u.clone()],
                    UsernameFormat::Strip => vec![strip_domain(u).to_string()],
                    UsernameFormat::Both => vec![u.clone(), strip_domain(u).to_string()],
                })
                .collect();
            prop_assert_eq!(subject_values(&doc), expected);
        }

        #[test]
        fn test_build_is_deterministic(params: ExpansionParams) {
            let template = template();
            let (a, _) = build_policy(&template, params.mode, &params.acl, &params.options).unwrap();
            let (b, _) = build_policy(&template, params.mode, &params.acl, &params.options).unwrap();
            prop_assert_eq!(a.to_pretty_xml().unwrap(), b.to_pretty_xml().unwrap());
        }

        #[test]
        fn test_normalized_user_lists_are_never_empty(raw in raw_acl()) {
            if let AccessList::Users(users) = normalize(&raw) {
                prop_assert!(!users.is_empty());
            }
        }

        #[test]
        fn test_multi_token_list_drops_marker(marker in username(), users in users(10)) {
            let raw = format!("{} {}", marker, users.join(" "));
            prop_assert_eq!(normalize(&raw), AccessList::Users(users));
        }

        #[test]
        fn test_file_stem_is_safe(handle in handle()) {
            let stem = policy_file_stem(&handle).unwrap();
            prop_assert!(stem.starts_with("lat_"));
            prop_assert!(stem.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        }
    }
}

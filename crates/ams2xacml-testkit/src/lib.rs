//! # ams2xacml Testkit
//!
//! Testing utilities for ams2xacml.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: raw access strings with the subjects the generated
//!   policy must carry
//! - **Generators**: Proptest strategies for access lists, handles and
//!   expansion settings
//! - **Fixtures**: in-memory corpora wired to a converter
//!
//! ## Golden Vectors
//!
//! ```rust
//! use ams2xacml_testkit::vectors::verify_all_vectors;
//!
//! for (name, result) in verify_all_vectors() {
//!     assert!(result.is_ok(), "{}", name);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use ams2xacml_testkit::generators::{expected_subject_count, ExpansionParams};
//!
//! proptest! {
//!     #[test]
//!     fn subject_count_matches(params: ExpansionParams) {
//!         // build the policy and compare against expected_subject_count(&params)
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use ams2xacml_core::NodeType;
//! use ams2xacml_testkit::fixtures::CorpusFixture;
//!
//! let mut fixture = CorpusFixture::new();
//! let session = fixture.add(NodeType::Session, "owner alice");
//! fixture.add_child(&session, NodeType::Object, "everybody");
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{rule_ids, sample_archive, subject_values, CorpusFixture};
pub use generators::{expected_subject_count, ExpansionParams};
pub use vectors::{all_vectors, verify_all_vectors, verify_vector, PolicyVector};

//! # ams2xacml
//!
//! Converts the access rights recorded in a corpus structure database into
//! XACML policies, one file per archived object.
//!
//! ## Overview
//!
//! For each node below the requested start nodes the converter:
//!
//! - skips it when it is not on site
//! - picks the governing right: read for objects, write for containers
//! - normalizes the raw access list and expands the policy template
//! - writes the result to `<output_dir>/<handle stem>.xml`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use ams2xacml::{Converter, ConverterConfig};
//! use ams2xacml::core::{NodeId, PolicyTemplate};
//! use ams2xacml::store::SqliteStore;
//!
//! async fn example() {
//!     let store = SqliteStore::open("corpusstructure.db").unwrap();
//!     let template = Arc::new(PolicyTemplate::bundled().unwrap());
//!     let converter = Converter::new(store, template, ConverterConfig::default());
//!
//!     let report = converter
//!         .run(&[NodeId::parse("MPI12345#").unwrap()])
//!         .await
//!         .unwrap();
//!     println!("{} policies written", report.written);
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `ams2xacml::core` - Policy construction (template, normalization, expansion)
//! - `ams2xacml::store` - Corpus structure database access

pub mod cli;
pub mod config;
pub mod converter;
pub mod error;
pub mod output;
pub mod report;

pub use ams2xacml_core as core;
pub use ams2xacml_store as store;

pub use cli::Cli;
pub use config::ConverterConfig;
pub use converter::Converter;
pub use error::{ConvertError, Result};
pub use output::PolicyWriter;
pub use report::{BatchReport, ObjectOutcome, ObjectReport};

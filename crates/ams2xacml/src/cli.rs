//! Command-line interface.

use std::path::PathBuf;
use std::time::Duration;

use ams2xacml_core::{GroupLimit, NodeId, UsernameFormat};
use clap::Parser;

use crate::config::{ConverterConfig, DEFAULT_IO_TIMEOUT};

/// Default corpus structure database.
pub const DEFAULT_CORPUS_DB: &str = "corpusstructure.db";

/// Generate XACML policies from corpus structure access rights.
///
/// Every node below the given start nodes, and the start nodes
/// themselves, gets one policy file named after its handle.
#[derive(Debug, Parser)]
#[command(name = "ams2xacml")]
#[command(version)]
pub struct Cli {
    /// Corpus structure database file (SQLite), opened read-only. Database
    /// URLs and the -u/-p user and password options are not supported.
    #[arg(short = 'c', long, default_value = DEFAULT_CORPUS_DB)]
    pub corpus_db: PathBuf,

    /// Directory receiving the generated policies.
    #[arg(short = 'd', long, default_value = "./generatedPolicies/")]
    pub output_dir: PathBuf,

    /// Collapse user lists of at least this size to "authenticated".
    /// Negative values or "unlimited" disable collapsing.
    #[arg(long, default_value = "unlimited", allow_negative_numbers = true)]
    pub max_users_per_group: GroupLimit,

    /// How user identifiers appear in policies: keep, strip or both.
    #[arg(long, default_value = "keep")]
    pub username_format: UsernameFormat,

    /// Deadline in seconds for each database call and file write.
    #[arg(long, default_value_t = DEFAULT_IO_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Write a JSON report of the run to this file.
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Node ids to start from, e.g. MPI123#.
    #[arg(required = true, value_name = "NODE_ID")]
    pub start_nodes: Vec<NodeId>,
}

impl Cli {
    pub fn config(&self) -> ConverterConfig {
        ConverterConfig {
            output_dir: self.output_dir.clone(),
            group_limit: self.max_users_per_group,
            username_format: self.username_format,
            io_timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    /// Log filter used when RUST_LOG is not set.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

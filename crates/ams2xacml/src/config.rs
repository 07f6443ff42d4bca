//! Converter configuration.

use std::path::PathBuf;
use std::time::Duration;

use ams2xacml_core::{ExpandOptions, GroupLimit, UsernameFormat};

/// Default output directory, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "generatedPolicies";

/// Default deadline for a single store call or file write.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for a conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterConfig {
    /// Directory receiving one policy file per object.
    pub output_dir: PathBuf,
    /// User lists at or above this size collapse to "authenticated".
    pub group_limit: GroupLimit,
    /// Rendering of user identifiers.
    pub username_format: UsernameFormat,
    /// Deadline for each store call and file write.
    pub io_timeout: Duration,
}

impl ConverterConfig {
    pub fn expand_options(&self) -> ExpandOptions {
        ExpandOptions {
            username_format: self.username_format,
            group_limit: self.group_limit,
        }
    }
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            group_limit: GroupLimit::Unlimited,
            username_format: UsernameFormat::Keep,
            io_timeout: DEFAULT_IO_TIMEOUT,
        }
    }
}

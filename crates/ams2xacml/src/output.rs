//! Document serializer: writes policies to the output directory.

use std::path::{Path, PathBuf};

use ams2xacml_core::{policy_file_name, Document};

use crate::error::{ConvertError, Result};

/// Writes policy documents under one directory, named after handles.
#[derive(Debug, Clone)]
pub struct PolicyWriter {
    dir: PathBuf,
}

impl PolicyWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the policy for `handle` is written to.
    pub fn path_for(&self, handle: &str) -> Result<PathBuf> {
        Ok(self.dir.join(policy_file_name(handle)?))
    }

    /// Pretty-print `doc` to `<dir>/<stem>.xml`, creating `dir` if needed.
    /// An existing file is replaced.
    pub async fn write(&self, doc: &Document, handle: &str) -> Result<PathBuf> {
        let path = self.path_for(handle)?;
        let bytes = doc.to_pretty_xml()?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| ConvertError::OutputDirectory {
                path: self.dir.clone(),
                source,
            })?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| ConvertError::Write {
                path: path.clone(),
                source,
            })?;

        Ok(path)
    }
}

//! Batch report: what happened to each object in a run.

use std::path::PathBuf;

use ams2xacml_core::NodeId;
use serde::Serialize;

/// Outcome of processing one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ObjectOutcome {
    /// Policy written to `path`.
    Written { path: PathBuf, subjects: usize },
    /// Access data is not authoritative here.
    SkippedOffSite,
    /// The store does not know the node.
    SkippedUnknownNode,
    /// The node has no handle to name the file after.
    SkippedMissingHandle,
    /// A store, file or naming error affecting only this object.
    Failed { reason: String },
}

/// One line of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectReport {
    pub node: NodeId,
    #[serde(flatten)]
    pub outcome: ObjectOutcome,
}

/// Summary of a conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub written: usize,
    pub skipped_off_site: usize,
    pub skipped_unknown: usize,
    pub skipped_missing_handle: usize,
    pub failed: usize,
    pub objects: Vec<ObjectReport>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome for `node`.
    pub fn record(&mut self, node: NodeId, outcome: ObjectOutcome) {
        match &outcome {
            ObjectOutcome::Written { .. } => self.written += 1,
            ObjectOutcome::SkippedOffSite => self.skipped_off_site += 1,
            ObjectOutcome::SkippedUnknownNode => self.skipped_unknown += 1,
            ObjectOutcome::SkippedMissingHandle => self.skipped_missing_handle += 1,
            ObjectOutcome::Failed { .. } => self.failed += 1,
        }
        self.objects.push(ObjectReport { node, outcome });
    }

    /// Objects seen in total.
    pub fn total(&self) -> usize {
        self.objects.len()
    }

    /// Outcome recorded for `node`, if any.
    pub fn outcome(&self, node: &NodeId) -> Option<&ObjectOutcome> {
        self.objects
            .iter()
            .find(|o| &o.node == node)
            .map(|o| &o.outcome)
    }

    /// Pretty JSON rendering.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let mut report = BatchReport::new();
        report.record(
            NodeId::from_store("MPI1#"),
            ObjectOutcome::Written {
                path: PathBuf::from("out/lat_1.xml"),
                subjects: 2,
            },
        );
        report.record(NodeId::from_store("MPI2#"), ObjectOutcome::SkippedOffSite);
        report.record(
            NodeId::from_store("MPI3#"),
            ObjectOutcome::Failed {
                reason: "disk full".into(),
            },
        );

        assert_eq!(report.total(), 3);
        assert_eq!(report.written, 1);
        assert_eq!(report.skipped_off_site, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(
            report.outcome(&NodeId::from_store("MPI2#")),
            Some(&ObjectOutcome::SkippedOffSite)
        );
    }

    #[test]
    fn test_json_shape() {
        let mut report = BatchReport::new();
        report.record(NodeId::from_store("MPI9#"), ObjectOutcome::SkippedUnknownNode);

        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["skipped_unknown"], 1);
        assert_eq!(value["objects"][0]["node"], "MPI9#");
        assert_eq!(value["objects"][0]["status"], "skipped_unknown_node");
    }
}

//! The Converter: walks the corpus tree and writes one policy per object.
//!
//! Objects are processed one at a time. Failures that concern a single
//! object are logged and recorded in the report; only core invariant
//! violations stop the batch.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use ams2xacml_core::{build_policy, normalize_lookup, AccessMode, NodeId, PolicyTemplate};
use ams2xacml_store::MetadataStore;

use crate::config::ConverterConfig;
use crate::error::{ConvertError, Result};
use crate::output::PolicyWriter;
use crate::report::{BatchReport, ObjectOutcome};

/// Converts corpus structure access rights into policy files.
pub struct Converter<S: MetadataStore> {
    store: S,
    template: Arc<PolicyTemplate>,
    writer: PolicyWriter,
    config: ConverterConfig,
}

impl<S: MetadataStore> Converter<S> {
    /// Create a converter over `store`.
    pub fn new(store: S, template: Arc<PolicyTemplate>, config: ConverterConfig) -> Self {
        Self {
            store,
            template,
            writer: PolicyWriter::new(config.output_dir.clone()),
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Descendants of the start nodes followed by the start nodes
    /// themselves, each node once.
    pub async fn collect_nodes(&self, start: &[NodeId]) -> Result<Vec<NodeId>> {
        let descendants = self
            .store
            .descendants(start)
            .await?;

        let mut seen = HashSet::new();
        Ok(descendants
            .into_iter()
            .chain(start.iter().cloned())
            .filter(|node| seen.insert(node.clone()))
            .collect())
    }

    /// Convert every object below (and including) the start nodes.
    pub async fn run(&self, start: &[NodeId]) -> Result<BatchReport> {
        if start.is_empty() {
            return Err(ConvertError::NoStartNodes);
        }

        let nodes = self.collect_nodes(start).await?;
        tracing::info!(
            count = nodes.len(),
            output = %self.config.output_dir.display(),
            "converting access rights"
        );

        let mut report = BatchReport::new();
        for node in nodes {
            match self.convert_node(&node).await {
                Ok(outcome) => report.record(node, outcome),
                Err(e) if e.is_fatal() => {
                    tracing::error!(node = %node, error = %e, "aborting conversion");
                    return Err(e);
                }
                Err(e) => {
                    tracing::error!(node = %node, error = %e, "skipping object");
                    report.record(
                        node,
                        ObjectOutcome::Failed {
                            reason: e.to_string(),
                        },
                    );
                }
            }
        }

        tracing::info!(
            written = report.written,
            off_site = report.skipped_off_site,
            unknown = report.skipped_unknown,
            missing_handle = report.skipped_missing_handle,
            failed = report.failed,
            "conversion finished"
        );
        Ok(report)
    }

    /// Fetch, normalize, expand and write the policy for one node.
    pub async fn convert_node(&self, node: &NodeId) -> Result<ObjectOutcome> {
        match self
            .deadline("on-site lookup", node, self.store.is_on_site(node))
            .await?
        {
            None => {
                tracing::warn!(node = %node, "unknown node, skipping");
                return Ok(ObjectOutcome::SkippedUnknownNode);
            }
            Some(false) => {
                tracing::info!(node = %node, "node is not on site, skipping");
                return Ok(ObjectOutcome::SkippedOffSite);
            }
            Some(true) => {}
        }

        let Some(node_type) = self
            .deadline("node type lookup", node, self.store.node_type(node))
            .await?
        else {
            tracing::warn!(node = %node, "unknown node type, skipping");
            return Ok(ObjectOutcome::SkippedUnknownNode);
        };
        let mode = AccessMode::for_node_type(node_type);

        let raw = self
            .deadline("access rights lookup", node, self.store.raw_acl(node, mode))
            .await?;
        if raw.is_none() {
            tracing::warn!(node = %node, %mode, "no access rights found, granting no one");
        }
        let acl = normalize_lookup(raw.as_deref());

        let (doc, summary) =
            build_policy(&self.template, mode, &acl, &self.config.expand_options())?;
        tracing::debug!(
            node = %node,
            %mode,
            subjects = ?summary.subjects,
            collapsed = summary.collapsed,
            "policy expanded"
        );

        let Some(handle) = self
            .deadline("handle lookup", node, self.store.handle(node))
            .await?
        else {
            tracing::warn!(node = %node, "node has no handle, skipping");
            return Ok(ObjectOutcome::SkippedMissingHandle);
        };

        let path = self
            .deadline("policy write", node, self.writer.write(&doc, &handle))
            .await?;
        tracing::info!(node = %node, path = %path.display(), "policy written");

        Ok(ObjectOutcome::Written {
            path,
            subjects: summary.subjects.len(),
        })
    }

    /// Run `fut` under the configured I/O deadline.
    async fn deadline<T, E, F>(&self, operation: &'static str, node: &NodeId, fut: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, E>>,
        ConvertError: From<E>,
    {
        match tokio::time::timeout(self.config.io_timeout, fut).await {
            Ok(result) => result.map_err(ConvertError::from),
            Err(_) => Err(ConvertError::Timeout {
                operation,
                node: node.clone(),
            }),
        }
    }
}

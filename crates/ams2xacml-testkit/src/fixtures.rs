//! Test fixtures and helpers.
//!
//! Common corpus setups for integration tests.

use std::path::Path;
use std::sync::Arc;

use ams2xacml::{Converter, ConverterConfig};
use ams2xacml_core::{Document, Element, NodeId, NodeType, PolicyTemplate};
use ams2xacml_store::{MemoryStore, NodeRecord};

/// An in-memory corpus being assembled for a test.
pub struct CorpusFixture {
    pub store: MemoryStore,
    next_id: u64,
}

impl CorpusFixture {
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
            next_id: 1,
        }
    }

    /// Add an on-site node with a generated id and handle `hdl:1839/<n>`.
    ///
    /// `rights` is stored as the governing right for the node type: the
    /// write right for containers, the read right for objects.
    pub fn add(&mut self, node_type: NodeType, rights: &str) -> NodeId {
        let n = self.next_id;
        self.next_id += 1;
        let id = NodeId::from_store(format!("MPI{}#", n));

        let record = NodeRecord::new(id.clone(), node_type).handle(format!("hdl:1839/{}", n));
        let record = if node_type.is_container() {
            record.write_rights(rights)
        } else {
            record.read_rights(rights)
        };
        self.insert(record);
        id
    }

    /// Add a node below `parent`.
    pub fn add_child(&mut self, parent: &NodeId, node_type: NodeType, rights: &str) -> NodeId {
        let id = self.add(node_type, rights);
        self.link(parent, &id);
        id
    }

    pub fn insert(&self, record: NodeRecord) {
        self.store
            .insert_node(record)
            .expect("fixture store insert failed");
    }

    pub fn link(&self, parent: &NodeId, child: &NodeId) {
        self.store
            .link(parent, child)
            .expect("fixture store link failed");
    }

    /// File name the policy for the node with generated number `n` gets.
    pub fn policy_file(n: u64) -> String {
        format!("lat_1839_{}.xml", n)
    }

    /// A converter over this corpus writing into `dir`.
    pub fn into_converter(self, dir: &Path) -> Converter<MemoryStore> {
        self.into_converter_with(ConverterConfig {
            output_dir: dir.to_path_buf(),
            ..Default::default()
        })
    }

    pub fn into_converter_with(self, config: ConverterConfig) -> Converter<MemoryStore> {
        let template = PolicyTemplate::bundled().expect("bundled template must load");
        Converter::new(self.store, Arc::new(template), config)
    }
}

impl Default for CorpusFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A small archive: catalogue, corpus, two sessions and four objects.
///
/// Returns the fixture and the catalogue id.
pub fn sample_archive() -> (CorpusFixture, NodeId) {
    let mut fixture = CorpusFixture::new();
    let catalogue = fixture.add(NodeType::Catalogue, "nobody");
    let corpus = fixture.add_child(&catalogue, NodeType::Corpus, "all-authenticated");

    let open = fixture.add_child(&corpus, NodeType::Session, "owner alice");
    fixture.add_child(&open, NodeType::Object, "everybody");
    fixture.add_child(&open, NodeType::Object, "owner alice bob");

    let restricted = fixture.add_child(&corpus, NodeType::Session, "owner carol@mpi.nl");
    fixture.add_child(&restricted, NodeType::Object, "cleared");
    fixture.add_child(&restricted, NodeType::Object, "owner carol@mpi.nl dave@mpi.nl");

    (fixture, catalogue)
}

/// Text of every `AttributeValue` in the subject bags of `doc`, in order.
pub fn subject_values(doc: &Document) -> Vec<String> {
    doc.root
        .descendants()
        .into_iter()
        .filter(|e| is_subject_bag(e))
        .flat_map(|bag| {
            bag.child_elements()
                .filter(|(_, e)| e.local_name() == "AttributeValue")
                .map(|(_, e)| e.text_content())
                .collect::<Vec<_>>()
        })
        .collect()
}

/// `RuleId`s of the rules left in `doc`.
pub fn rule_ids(doc: &Document) -> Vec<String> {
    doc.root
        .child_elements()
        .filter(|(_, e)| e.local_name() == "Rule")
        .filter_map(|(_, e)| e.attribute("RuleId").map(str::to_string))
        .collect()
}

fn is_subject_bag(element: &Element) -> bool {
    element.local_name() == "Apply"
        && element
            .attribute("FunctionId")
            .is_some_and(|f| f.ends_with(":string-bag"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ams2xacml::ObjectOutcome;
    use ams2xacml_core::locator::{READ_RULE_ID, WRITE_RULE_ID};

    #[tokio::test]
    async fn test_sample_archive_run() {
        let (fixture, catalogue) = sample_archive();
        let tmp = tempfile::tempdir().unwrap();
        let converter = fixture.into_converter(tmp.path());

        let report = converter.run(&[catalogue]).await.unwrap();
        assert_eq!(report.total(), 8);
        assert_eq!(report.written, 8);

        let read = |n: u64| {
            let xml = std::fs::read_to_string(tmp.path().join(CorpusFixture::policy_file(n)))
                .unwrap();
            Document::parse(&xml).unwrap()
        };

        // Catalogue: nobody.
        let doc = read(1);
        assert_eq!(rule_ids(&doc), vec![WRITE_RULE_ID, "permit-everything-else"]);
        assert!(subject_values(&doc).is_empty());

        // Corpus: all authenticated.
        assert_eq!(subject_values(&read(2)), vec!["authenticated"]);

        // Written object below the open session.
        let doc = read(5);
        assert_eq!(rule_ids(&doc), vec![READ_RULE_ID, "permit-everything-else"]);
        assert_eq!(subject_values(&doc), vec!["alice", "bob"]);

        // Cleared resource.
        assert!(subject_values(&read(7)).is_empty());
    }

    #[tokio::test]
    async fn test_subtree_run() {
        let (fixture, _) = sample_archive();
        let restricted = NodeId::from_store("MPI6#");
        let tmp = tempfile::tempdir().unwrap();

        let report = fixture
            .into_converter(tmp.path())
            .run(&[restricted.clone()])
            .await
            .unwrap();

        assert_eq!(report.total(), 3);
        assert_eq!(report.objects.last().map(|o| &o.node), Some(&restricted));
        assert!(matches!(
            report.outcome(&restricted),
            Some(ObjectOutcome::Written { subjects: 1, .. })
        ));
        assert!(!tmp.path().join(CorpusFixture::policy_file(1)).exists());
    }
}

//! Owned XML tree with quick-xml parsing and pretty printing.
//!
//! The tree is plain data: cloning a [`Document`] is a deep copy, and nodes
//! are addressed by [`NodePath`] (child indices from the root element) rather
//! than by shared references. A template can therefore be read concurrently
//! while each working copy is mutated by exactly one owner.

use std::fmt;

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::XmlError;

/// Indentation width used by [`Document::to_pretty_xml`].
pub const INDENT_WIDTH: usize = 2;

/// A node in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
}

impl XmlNode {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            XmlNode::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            XmlNode::Element(e) => Some(e),
            _ => None,
        }
    }
}

/// An element with its attributes (in document order) and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified name as written, e.g. `Rule` or `xacml:Rule`.
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    /// Name without any namespace prefix.
    pub fn local_name(&self) -> &str {
        match self.name.rsplit_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Child elements with their index in `children`.
    pub fn child_elements(&self) -> impl Iterator<Item = (usize, &Element)> {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.as_element().map(|e| (i, e)))
    }

    /// Concatenated text of all descendant text and CDATA nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlNode::Text(t) | XmlNode::CData(t) => out.push_str(t),
                XmlNode::Element(e) => e.collect_text(out),
                XmlNode::Comment(_) => {}
            }
        }
    }

    /// Replace all children with a single text node.
    pub fn set_text_content(&mut self, text: impl Into<String>) {
        self.children.clear();
        let text = text.into();
        if !text.is_empty() {
            self.children.push(XmlNode::Text(text));
        }
    }

    /// This element and every descendant element, in document order.
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = vec![self];
        for (_, child) in self.child_elements() {
            out.extend(child.descendants());
        }
        out
    }
}

/// Child-index path from the root element to a node.
///
/// The empty path addresses the root element itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_indices(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Parent path and the index within the parent. `None` for the root.
    pub fn split_last(&self) -> Option<(NodePath, usize)> {
        let (last, parent) = self.0.split_last()?;
        Some((NodePath(parent.to_vec()), *last))
    }

    /// Whether `self` addresses `other` or one of its ancestors.
    pub fn is_prefix_of(&self, other: &NodePath) -> bool {
        other.0.starts_with(&self.0)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for i in &self.0 {
            write!(f, "/{}", i)?;
        }
        Ok(())
    }
}

/// A parsed XML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Comments preceding the root element.
    pub prolog: Vec<XmlNode>,
    pub root: Element,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self {
            prolog: Vec::new(),
            root,
        }
    }

    /// Parse a document from a string.
    pub fn parse(input: &str) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(input);
        reader.config_mut().trim_text(true);

        let mut prolog = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let position = reader.buffer_position() as u64;
            let event = reader.read_event().map_err(|e| XmlError::Malformed {
                position,
                message: e.to_string(),
            })?;

            match event {
                Event::Start(start) => {
                    if root.is_some() {
                        return Err(XmlError::TrailingContent);
                    }
                    stack.push(element_from_start(&start, position)?);
                }
                Event::Empty(start) => {
                    if root.is_some() {
                        return Err(XmlError::TrailingContent);
                    }
                    let element = element_from_start(&start, position)?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::Element(element)),
                        None => root = Some(element),
                    }
                }
                Event::End(end) => {
                    let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                    let element = stack.pop().ok_or(XmlError::UnbalancedEnd(name))?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::Element(element)),
                        None => root = Some(element),
                    }
                }
                Event::Text(text) => {
                    let value = text.unescape().map_err(|e| XmlError::Malformed {
                        position,
                        message: e.to_string(),
                    })?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::Text(value.into_owned())),
                        None if value.trim().is_empty() => {}
                        None => return Err(XmlError::TrailingContent),
                    }
                }
                Event::CData(data) => {
                    let value = String::from_utf8_lossy(&data).into_owned();
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::CData(value)),
                        None => return Err(XmlError::TrailingContent),
                    }
                }
                Event::Comment(comment) => {
                    let value = String::from_utf8_lossy(&comment).into_owned();
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::Comment(value)),
                        None if root.is_none() => prolog.push(XmlNode::Comment(value)),
                        None => {}
                    }
                }
                Event::Eof => break,
                // Declaration, DOCTYPE and processing instructions carry
                // nothing the tree keeps.
                _ => {}
            }
        }

        if let Some(open) = stack.pop() {
            return Err(XmlError::UnclosedElement(open.name));
        }
        let root = root.ok_or(XmlError::NoRootElement)?;
        Ok(Self { prolog, root })
    }

    /// Serialize with an XML declaration and two-space indentation.
    pub fn to_pretty_xml(&self) -> Result<Vec<u8>, XmlError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT_WIDTH);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|e| XmlError::Write(e.to_string()))?;
        for node in &self.prolog {
            write_node(&mut writer, node)?;
        }
        write_element(&mut writer, &self.root)?;

        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Resolve a path to an element.
    pub fn element(&self, path: &NodePath) -> Option<&Element> {
        let mut current = &self.root;
        for &index in path.indices() {
            current = current.children.get(index)?.as_element()?;
        }
        Some(current)
    }

    pub fn element_mut(&mut self, path: &NodePath) -> Option<&mut Element> {
        let mut current = &mut self.root;
        for &index in path.indices() {
            current = current.children.get_mut(index)?.as_element_mut()?;
        }
        Some(current)
    }

    /// Detach the node at `path` from its parent. The root cannot be removed.
    pub fn remove(&mut self, path: &NodePath) -> Option<XmlNode> {
        let (parent_path, index) = path.split_last()?;
        let parent = self.element_mut(&parent_path)?;
        if index >= parent.children.len() {
            return None;
        }
        Some(parent.children.remove(index))
    }
}

fn element_from_start(start: &BytesStart<'_>, position: u64) -> Result<Element, XmlError> {
    let malformed = |message: String| XmlError::Malformed { position, message };

    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| malformed(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|e| malformed(e.to_string()))?;
        element.attributes.push((key, value.into_owned()));
    }
    Ok(element)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), XmlError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| XmlError::Write(e.to_string()));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| XmlError::Write(e.to_string()))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(|e| XmlError::Write(e.to_string()))
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode) -> Result<(), XmlError> {
    let result = match node {
        XmlNode::Element(e) => return write_element(writer, e),
        XmlNode::Text(t) => writer.write_event(Event::Text(BytesText::new(t))),
        XmlNode::CData(t) => writer.write_event(Event::CData(BytesCData::new(t.as_str()))),
        XmlNode::Comment(t) => writer.write_event(Event::Comment(BytesText::from_escaped(t.as_str()))),
    };
    result.map_err(|e| XmlError::Write(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<!-- leading -->
<root a="1" b="x &amp; y">
  <child>hello &lt;world&gt;</child>
  <empty/>
  <!-- inner -->
  <nested><leaf k="v"/></nested>
</root>"#;

    #[test]
    fn test_parse_structure() {
        let doc = Document::parse(SAMPLE).unwrap();
        assert_eq!(doc.root.name, "root");
        assert_eq!(doc.root.attribute("a"), Some("1"));
        assert_eq!(doc.root.attribute("b"), Some("x & y"));
        assert_eq!(doc.prolog.len(), 1);

        let names: Vec<_> = doc.root.child_elements().map(|(_, e)| e.name.as_str()).collect();
        assert_eq!(names, vec!["child", "empty", "nested"]);

        let child = doc.element(&NodePath::from_indices(vec![0])).unwrap();
        assert_eq!(child.text_content(), "hello <world>");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(Document::parse("<a><b></a>").is_err());
        assert!(Document::parse("<a>").is_err());
        assert!(Document::parse("").is_err());
        assert!(Document::parse("<a/><b/>").is_err());
    }

    #[test]
    fn test_pretty_print_indents_two_spaces() {
        let doc = Document::parse("<a><b>text</b><c><d/></c></a>").unwrap();
        let out = String::from_utf8(doc.to_pretty_xml().unwrap()).unwrap();

        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(out.contains("\n  <b>text</b>"));
        assert!(out.contains("\n  <c>\n    <d/>\n  </c>"));
        assert!(out.ends_with("</a>\n"));
    }

    #[test]
    fn test_pretty_print_escapes() {
        let root = Element::new("r")
            .with_attribute("q", "a\"b")
            .with_child(XmlNode::Text("x < y & z".into()));
        let out = String::from_utf8(Document::new(root).to_pretty_xml().unwrap()).unwrap();

        let reparsed = Document::parse(&out).unwrap();
        assert_eq!(reparsed.root.attribute("q"), Some("a\"b"));
        assert_eq!(reparsed.root.text_content(), "x < y & z");
    }

    #[test]
    fn test_clone_is_independent() {
        let original = Document::parse(SAMPLE).unwrap();
        let mut copy = original.clone();

        copy.element_mut(&NodePath::from_indices(vec![0]))
            .unwrap()
            .set_text_content("changed");
        copy.remove(&NodePath::from_indices(vec![1]));

        assert_ne!(original, copy);
        assert_eq!(
            original.element(&NodePath::from_indices(vec![0])).unwrap().text_content(),
            "hello <world>"
        );
        assert_eq!(original.root.child_elements().count(), 3);
    }

    #[test]
    fn test_paths() {
        let doc = Document::parse(SAMPLE).unwrap();
        // children: child, empty, comment, nested
        let leaf = NodePath::from_indices(vec![3, 0]);
        assert_eq!(doc.element(&leaf).unwrap().name, "leaf");
        assert!(doc.element(&NodePath::from_indices(vec![2])).is_none());
        assert_eq!(leaf.to_string(), "/3/0");

        let (parent, index) = leaf.split_last().unwrap();
        assert_eq!(parent, NodePath::from_indices(vec![3]));
        assert_eq!(index, 0);
        assert!(parent.is_prefix_of(&leaf));
        assert!(NodePath::root().split_last().is_none());
    }

    #[test]
    fn test_local_name() {
        let e = Element::new("xacml:Rule");
        assert_eq!(e.local_name(), "Rule");
        assert_eq!(Element::new("Rule").local_name(), "Rule");
    }
}

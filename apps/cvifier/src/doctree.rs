//! Document tree shared with the external markup parser and renderer.
//!
//! Mirrors the subset of the docutils node interface this crate touches:
//! a tag name, an ordered child list, the `names` aliases carried by sections,
//! string attributes (e.g. the `format` of a raw node) and text leaves.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const SECTION: &str = "section";
pub const TITLE: &str = "title";
pub const PARAGRAPH: &str = "paragraph";
pub const RAW: &str = "raw";

/// Attribute naming the writer a raw node targets.
pub const FORMAT_ATTR: &str = "format";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    /// Aliases for the node. docutils fills these for sections from the title text.
    pub names: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<Node>,
}

/// Root of a parsed CV. Top-level children are usually sections.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Document {
    pub children: Vec<Node>,
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    /// All text below this node, concatenated in document order.
    pub fn astext(&self) -> String {
        match self {
            Node::Text(text) => text.clone(),
            Node::Element(element) => element.astext(),
        }
    }

    /// The last text leaf below this node (depth-first).
    pub fn last_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text.as_str()),
            Node::Element(element) => element.last_text(),
        }
    }

    pub fn is_section(&self) -> bool {
        self.as_element().is_some_and(Element::is_section)
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Element {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn title(text: impl Into<String>) -> Self {
        Element::new(TITLE).with_child(Node::text(text))
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Element::new(PARAGRAPH).with_child(Node::text(text))
    }

    /// A raw passthrough node holding writer-native markup.
    pub fn raw(format: impl Into<String>, markup: impl Into<String>) -> Self {
        Element::new(RAW)
            .with_attribute(FORMAT_ATTR, format)
            .with_child(Node::text(markup))
    }

    /// A section named after its title (lowercased, as docutils does), with the
    /// title as first child followed by `body`.
    pub fn section(title: &str, body: impl IntoIterator<Item = Node>) -> Self {
        let mut section = Element::new(SECTION)
            .with_name(title.to_lowercase())
            .with_child(Element::title(title));
        section.children.extend(body);
        section
    }

    pub fn is_section(&self) -> bool {
        self.tag == SECTION
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn astext(&self) -> String {
        self.children.iter().map(Node::astext).collect()
    }

    pub fn last_text(&self) -> Option<&str> {
        self.children.iter().rev().find_map(Node::last_text)
    }

    /// Index of the first `title` child, if any.
    pub fn title_index(&self) -> Option<usize> {
        self.children
            .iter()
            .position(|child| child.as_element().is_some_and(|e| e.tag == TITLE))
    }

    /// Inserts `node` at `index`, clamped to the end of the child list.
    pub fn insert(&mut self, index: usize, node: impl Into<Node>) {
        let index = index.min(self.children.len());
        self.children.insert(index, node.into());
    }
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Document { children }
    }

    /// Inserts `node` at `index`, clamped to the end of the child list.
    pub fn insert(&mut self, index: usize, node: impl Into<Node>) {
        let index = index.min(self.children.len());
        self.children.insert(index, node.into());
    }

    pub fn remove(&mut self, index: usize) -> Option<Node> {
        (index < self.children.len()).then(|| self.children.remove(index))
    }

    /// Top-level section elements in document order.
    pub fn sections(&self) -> impl Iterator<Item = &Element> {
        self.children
            .iter()
            .filter_map(Node::as_element)
            .filter(|e| e.is_section())
    }

    pub fn sections_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children
            .iter_mut()
            .filter_map(Node::as_element_mut)
            .filter(|e| e.is_section())
    }

    /// Removes every top-level section matching `predicate`, returning them in
    /// document order.
    pub fn remove_sections_where(
        &mut self,
        mut predicate: impl FnMut(&Element) -> bool,
    ) -> Vec<Element> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.children.len());
        for node in self.children.drain(..) {
            match node {
                Node::Element(element) if element.is_section() && predicate(&element) => {
                    removed.push(element)
                }
                other => kept.push(other),
            }
        }
        self.children = kept;
        removed
    }

    pub fn astext(&self) -> String {
        self.children.iter().map(Node::astext).collect()
    }
}

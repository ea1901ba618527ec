//! Document tree for parsed markup.
//!
//! The tree lives in an arena:
//! - Nodes with a semantic [`Tag`] and first-child / next-sibling links
//! - Sparse [`Attributes`] keyed by node (most nodes carry none)
//! - One text buffer that text nodes reference by range
//!
//! # Example
//!
//! ```
//! use docweave::nodes::{Document, Tag};
//!
//! let mut doc = Document::new("<string>");
//! let section = doc.add(doc.root(), Tag::Section);
//! let para = doc.add(section, Tag::Paragraph);
//! doc.add_text(para, "Hello & welcome");
//!
//! assert_eq!(doc.get(para).astext(), "Hello & welcome");
//! assert_eq!(doc.get(para).parent().map(|p| p.id()), Some(section));
//! ```

mod attributes;
#[cfg(feature = "serde")]
mod json;
mod node;

use std::collections::HashMap;

pub use attributes::Attributes;
#[cfg(feature = "serde")]
pub use json::JsonNode;
pub use node::{Node, NodeId, Tag, TextRange};

static NO_ATTRIBUTES: Attributes = Attributes::new();

/// A parsed document in arena form.
#[derive(Debug, Clone)]
pub struct Document {
    /// All nodes (index 0 is always the `document` root).
    nodes: Vec<Node>,
    /// Sparse attribute sets.
    attributes: HashMap<NodeId, Attributes>,
    /// Text buffer shared by all text nodes.
    text: String,
    /// Path or label of the source the tree was parsed from.
    source: String,
}

impl Default for Document {
    fn default() -> Self {
        Self::new("<string>")
    }
}

impl Document {
    /// Create an empty document with just its root node.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            nodes: vec![Node::new(Tag::Document)],
            attributes: HashMap::new(),
            text: String::new(),
            source: source.into(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        (id.0 as usize) < self.nodes.len()
    }

    /// Borrow a node together with the document.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated by this document.
    pub fn get(&self, id: NodeId) -> NodeRef<'_> {
        assert!(self.contains(id), "node {id:?} not in document");
        NodeRef { doc: self, id }
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Create an element and append it as the last child of `parent`.
    ///
    /// `parent` must belong to this document. A foreign id trips a debug
    /// assertion; release builds leave the new node detached from the tree.
    pub fn add(&mut self, parent: NodeId, tag: Tag) -> NodeId {
        let id = self.alloc(Node::new(tag));
        self.append_child(parent, id);
        id
    }

    /// Append a text node under `parent`.
    pub fn add_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let range = self.append_text(text);
        let id = self.alloc(Node::text(range));
        self.append_child(parent, id);
        id
    }

    /// Create an element holding a single text child.
    pub fn add_with_text(&mut self, parent: NodeId, tag: Tag, text: &str) -> NodeId {
        let id = self.add(parent, tag);
        self.add_text(id, text);
        id
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn append_text(&mut self, text: &str) -> TextRange {
        let start = self.text.len() as u32;
        self.text.push_str(text);
        TextRange::new(start, text.len() as u32)
    }

    /// Link a freshly allocated node under its parent.
    ///
    /// Nodes are only ever created through `add*`, so a child is linked
    /// exactly once and the tree stays acyclic.
    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(
            self.contains(parent),
            "parent {parent:?} is not a node of this document"
        );
        if !self.contains(parent) {
            log::warn!("node {child:?} left detached: no parent {parent:?}");
            return;
        }
        let previous_last = self.nodes[parent.0 as usize].last_child;
        self.nodes[child.0 as usize].parent = Some(parent);
        match previous_last {
            Some(last) => self.nodes[last.0 as usize].next_sibling = Some(child),
            None => self.nodes[parent.0 as usize].first_child = Some(child),
        }
        self.nodes[parent.0 as usize].last_child = Some(child);
    }

    // ========================================================================
    // Attributes and text
    // ========================================================================

    pub fn attrs(&self, id: NodeId) -> &Attributes {
        self.attributes.get(&id).unwrap_or(&NO_ATTRIBUTES)
    }

    pub fn attrs_mut(&mut self, id: NodeId) -> &mut Attributes {
        self.attributes.entry(id).or_default()
    }

    /// Text of a range in the buffer.
    pub fn text(&self, range: TextRange) -> &str {
        &self.text[range.start as usize..range.end() as usize]
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    pub fn children(&self, parent: NodeId) -> ChildIter<'_> {
        ChildIter {
            doc: self,
            current: self.node(parent).and_then(|n| n.first_child),
        }
    }

    /// Pre-order iterator over `from` and all its descendants.
    pub fn descendants(&self, from: NodeId) -> DfsIter<'_> {
        DfsIter {
            doc: self,
            stack: if self.contains(from) {
                vec![from]
            } else {
                Vec::new()
            },
        }
    }

    /// Pre-order iterator over the whole document.
    pub fn iter_dfs(&self) -> DfsIter<'_> {
        self.descendants(NodeId::ROOT)
    }

    /// Concatenated text of a subtree.
    pub fn astext(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node_id in self.descendants(id) {
            let node = &self.nodes[node_id.0 as usize];
            if node.tag == Tag::Text {
                out.push_str(self.text(node.text));
            }
        }
        out
    }
}

/// Iterator over children of a node.
pub struct ChildIter<'a> {
    doc: &'a Document,
    current: Option<NodeId>,
}

impl Iterator for ChildIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = self.doc.node(current).and_then(|n| n.next_sibling);
        Some(current)
    }
}

/// Depth-first iterator over a subtree.
pub struct DfsIter<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for DfsIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;

        // Push children in reverse order so they're visited left-to-right
        let start = self.stack.len();
        self.stack.extend(self.doc.children(current));
        self.stack[start..].reverse();

        Some(current)
    }
}

/// A node borrowed together with its document, for handler-side queries.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    fn node(&self) -> &'a Node {
        &self.doc.nodes[self.id.0 as usize]
    }

    pub fn tag(&self) -> &'a Tag {
        &self.node().tag
    }

    pub fn attrs(&self) -> &'a Attributes {
        self.doc.attrs(self.id)
    }

    pub fn get_attr(&self, key: &str) -> Option<&'a str> {
        self.attrs().get(key)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attrs().has_class(class)
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.node().parent.map(|id| NodeRef { doc: self.doc, id })
    }

    /// Tag of the parent node, if any.
    pub fn parent_tag(&self) -> Option<&'a Tag> {
        self.parent().map(|p| p.tag())
    }

    pub fn children(self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let doc = self.doc;
        doc.children(self.id).map(move |id| NodeRef { doc, id })
    }

    pub fn first_child(&self) -> Option<NodeRef<'a>> {
        self.node().first_child.map(|id| NodeRef { doc: self.doc, id })
    }

    pub fn next_sibling(&self) -> Option<NodeRef<'a>> {
        self.node()
            .next_sibling
            .map(|id| NodeRef { doc: self.doc, id })
    }

    /// Position among the parent's children.
    pub fn index(&self) -> usize {
        match self.node().parent {
            Some(parent) => self
                .doc
                .children(parent)
                .position(|id| id == self.id)
                .unwrap_or(0),
            None => 0,
        }
    }

    /// Text payload of a text node (empty for elements).
    pub fn text(&self) -> &'a str {
        self.doc.text(self.node().text)
    }

    pub fn astext(&self) -> String {
        self.doc.astext(self.id)
    }

    /// Source line recorded by the parser.
    pub fn line(&self) -> Option<u32> {
        self.attrs().get_u32("line")
    }

    /// Nearest ancestor with the given tag.
    pub fn ancestor(&self, tag: &Tag) -> Option<NodeRef<'a>> {
        let mut current = self.parent();
        while let Some(node) = current {
            if node.tag() == tag {
                return Some(node);
            }
            current = node.parent();
        }
        None
    }
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("tag", self.tag())
            .finish()
    }
}

//! JSON serialization of document trees.
//!
//! Parsers live outside this crate; the command-line tool and tests exchange
//! trees in this nested form:
//!
//! ```json
//! {"tag": "section", "ids": ["intro"], "children": [
//!     {"tag": "title", "children": [{"tag": "#text", "text": "Intro"}]}
//! ]}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Document, NodeId, Tag};
use crate::error::Result;

/// One node of a nested JSON tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonNode {
    pub tag: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, serde_json::Value>,
    /// Text payload; for an element this becomes a single text child.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<JsonNode>,
}

/// Attribute values may be written as JSON numbers or booleans.
fn value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl Document {
    /// Parse a JSON tree. A root whose tag is not `document` is wrapped in one.
    pub fn from_json(json: &str, source: impl Into<String>) -> Result<Self> {
        let node: JsonNode = serde_json::from_str(json)?;
        Ok(Self::from_json_node(&node, source))
    }

    /// Build a document from an already-deserialized tree.
    pub fn from_json_node(node: &JsonNode, source: impl Into<String>) -> Self {
        let mut doc = Document::new(source);
        if node.tag == "document" {
            doc.apply_json_attributes(NodeId::ROOT, node);
            for child in &node.children {
                doc.add_json_node(NodeId::ROOT, child);
            }
        } else {
            doc.add_json_node(NodeId::ROOT, node);
        }
        log::debug!(
            "loaded document tree from {}: {} nodes",
            doc.source(),
            doc.node_count()
        );
        doc
    }

    fn add_json_node(&mut self, parent: NodeId, node: &JsonNode) {
        let tag = Tag::from_name(&node.tag);
        if tag == Tag::Text {
            self.add_text(parent, node.text.as_deref().unwrap_or_default());
            return;
        }
        let id = self.add(parent, tag);
        self.apply_json_attributes(id, node);
        if let Some(text) = &node.text {
            self.add_text(id, text);
        }
        for child in &node.children {
            self.add_json_node(id, child);
        }
    }

    fn apply_json_attributes(&mut self, id: NodeId, node: &JsonNode) {
        if node.ids.is_empty()
            && node.classes.is_empty()
            && node.names.is_empty()
            && node.attributes.is_empty()
        {
            return;
        }
        let attrs = self.attrs_mut(id);
        for value in &node.ids {
            attrs.add_id(value);
        }
        for value in &node.classes {
            attrs.add_class(value);
        }
        for value in &node.names {
            attrs.add_name(value);
        }
        for (key, value) in &node.attributes {
            attrs.set(key.clone(), value_to_string(value));
        }
    }

    /// Convert a subtree back into its nested form.
    pub fn to_json_node(&self, id: NodeId) -> JsonNode {
        let node = self.get(id);
        if *node.tag() == Tag::Text {
            return JsonNode {
                tag: Tag::Text.name().to_string(),
                text: Some(node.text().to_string()),
                ..Default::default()
            };
        }
        let attrs = node.attrs();
        JsonNode {
            tag: node.tag().name().to_string(),
            ids: attrs.ids().to_vec(),
            classes: attrs.classes().to_vec(),
            names: attrs.names().to_vec(),
            attributes: attrs
                .values()
                .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
                .collect(),
            text: None,
            children: self.children(id).map(|c| self.to_json_node(c)).collect(),
        }
    }
}

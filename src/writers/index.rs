//! Identifier and footnote-number pre-pass.
//!
//! Built once before a translator walks the tree, so that references can be
//! resolved no matter whether they come before or after their target.
//!
//! - Explicit ids are claimed first, in document order.
//! - Addressable nodes without an id get one: sections from their title,
//!   citations from their label, footnotes `footnote-N`, tables `table-N`.
//! - A wanted id that is already taken gets `-1`, `-2`, ... appended.
//! - Auto-numbered footnotes are numbered in document order, skipping numbers
//!   that manually labelled footnotes already use.

use std::collections::{HashMap, HashSet};

use crate::nodes::{Document, NodeId, NodeRef, Tag};

/// Build an identifier from arbitrary text.
///
/// Lower-cases ASCII letters and digits, collapses every other run of
/// characters into one hyphen, and trims hyphens and leading digits.
///
/// ```
/// use docweave::writers::make_id;
///
/// assert_eq!(make_id("Chapter One"), "chapter-one");
/// assert_eq!(make_id("1. Hello, World!"), "hello-world");
/// assert_eq!(make_id("???"), "");
/// ```
pub fn make_id(text: &str) -> String {
    let slug = text
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    slug.trim_start_matches(|c: char| c.is_ascii_digit() || c == '-')
        .to_string()
}

/// Ids and footnote labels for one document.
#[derive(Debug, Clone, Default)]
pub struct DocumentIndex {
    /// Final ids per node, first one is the anchor.
    ids: HashMap<NodeId, Vec<String>>,
    claimed: HashSet<String>,
    /// Reverse lookup for reference resolution.
    targets: HashMap<String, NodeId>,
    /// Display label of footnotes and citations.
    labels: HashMap<NodeId, String>,
}

impl DocumentIndex {
    pub fn build(doc: &Document) -> Self {
        let mut index = DocumentIndex::default();

        // Explicit ids first so generated ones never steal them.
        for id in doc.iter_dfs() {
            let explicit = doc.attrs(id).ids();
            if explicit.is_empty() {
                continue;
            }
            let mut final_ids = Vec::with_capacity(explicit.len());
            for wanted in explicit {
                let claimed = index.claim(wanted);
                if claimed != *wanted {
                    log::debug!("duplicate id {wanted:?} renamed to {claimed:?}");
                }
                index.targets.entry(wanted.clone()).or_insert(id);
                final_ids.push(claimed);
            }
            index.ids.insert(id, final_ids);
        }

        let manual_numbers: HashSet<u32> = doc
            .iter_dfs()
            .filter(|&id| doc.get(id).tag() == &Tag::Footnote)
            .filter_map(|id| explicit_label(doc.get(id)))
            .filter_map(|label| label.parse().ok())
            .collect();

        let mut footnotes = 0u32;
        let mut tables = 0u32;
        let mut next_auto = 1u32;
        for id in doc.iter_dfs() {
            let node = doc.get(id);
            match node.tag() {
                Tag::Section | Tag::Topic | Tag::Sidebar => {
                    let title = node
                        .children()
                        .find(|c| c.tag() == &Tag::Title)
                        .map(|t| t.astext())
                        .unwrap_or_default();
                    let fallback = if node.tag() == &Tag::Section {
                        "section"
                    } else {
                        node.tag().name()
                    };
                    index.assign(id, &title, fallback);
                }
                Tag::Footnote => {
                    footnotes += 1;
                    index.ensure_id(id, &format!("footnote-{footnotes}"));
                    let label = match explicit_label(node) {
                        Some(label) => label,
                        None => {
                            while manual_numbers.contains(&next_auto) {
                                next_auto += 1;
                            }
                            let label = next_auto.to_string();
                            next_auto += 1;
                            label
                        }
                    };
                    index.labels.insert(id, label);
                }
                Tag::Citation => {
                    let label = explicit_label(node).unwrap_or_default();
                    index.assign(id, &label, "citation");
                    index.labels.insert(id, label);
                }
                Tag::Table => {
                    tables += 1;
                    index.ensure_id(id, &format!("table-{tables}"));
                }
                _ => {}
            }
        }

        // Targets may also be addressed by name (`refname`).
        for id in doc.iter_dfs() {
            for name in doc.attrs(id).names() {
                index.targets.entry(name.clone()).or_insert(id);
            }
        }

        index
    }

    /// Give `node` an id derived from `text` unless it already has one.
    fn assign(&mut self, node: NodeId, text: &str, fallback: &str) {
        let base = make_id(text);
        let base = if base.is_empty() { fallback } else { &base };
        self.ensure_id(node, base);
    }

    fn ensure_id(&mut self, node: NodeId, base: &str) {
        if self.ids.contains_key(&node) {
            return;
        }
        let id = self.claim(base);
        self.targets.insert(id.clone(), node);
        self.ids.insert(node, vec![id]);
    }

    /// Reserve `base`, or the first free `base-N`.
    fn claim(&mut self, base: &str) -> String {
        if self.claimed.insert(base.to_string()) {
            return base.to_string();
        }
        let mut n = 1u32;
        loop {
            let candidate = format!("{base}-{n}");
            if self.claimed.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Anchor id of a node.
    pub fn id_of(&self, node: NodeId) -> Option<&str> {
        self.ids
            .get(&node)
            .and_then(|ids| ids.first())
            .map(String::as_str)
    }

    /// All ids of a node (anchor first).
    pub fn ids_of(&self, node: NodeId) -> &[String] {
        self.ids.get(&node).map(Vec::as_slice).unwrap_or_default()
    }

    /// Node addressed by an id or name.
    pub fn resolve(&self, target: &str) -> Option<NodeId> {
        self.targets.get(target).copied()
    }

    /// Anchor id of whatever `target` addresses.
    pub fn anchor_for(&self, target: &str) -> Option<&str> {
        self.resolve(target).and_then(|node| self.id_of(node))
    }

    /// Label of a footnote or citation.
    pub fn label_of(&self, node: NodeId) -> Option<&str> {
        self.labels.get(&node).map(String::as_str)
    }

    /// Label to show for a reference pointing at `target`.
    pub fn label_for(&self, target: &str) -> Option<&str> {
        self.resolve(target).and_then(|node| self.label_of(node))
    }
}

/// Text of a footnote's or citation's `label` child, if present.
fn explicit_label(node: NodeRef<'_>) -> Option<String> {
    node.children()
        .find(|c| c.tag() == &Tag::Label)
        .map(|label| label.astext().trim().to_string())
        .filter(|label| !label.is_empty())
}

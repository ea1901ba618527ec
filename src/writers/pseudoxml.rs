//! Pseudo-XML writer.
//!
//! Dumps the tree as indented start tags, one element per line, with text
//! one level deeper than its parent. Useful for debugging and for tests: every
//! tag is handled generically, unknown ones included.

use crate::error::{Error, Result};
use crate::nodes::{Document, NodeRef, Tag};
use crate::settings::Settings;
use crate::visit::{Visit, Visitor};
use crate::writers::{Buffer, Parts, Translator, VERSION, Writer, run};

const INDENT: &str = "    ";

/// Attributes printed before the sorted remainder.
const LEADING_ATTRIBUTES: [&str; 3] = ["ids", "classes", "names"];

/// Writer for pseudo-XML output.
#[derive(Debug, Clone, Default)]
pub struct PseudoXmlWriter;

impl PseudoXmlWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Writer for PseudoXmlWriter {
    fn name(&self) -> &'static str {
        "pseudoxml"
    }

    fn supported(&self) -> &'static [&'static str] {
        &["pseudoxml", "pformat", "pprint"]
    }

    fn translate(&self, doc: &Document, settings: &Settings) -> Result<Parts> {
        settings.validate()?;
        run(self.name(), doc, PseudoXmlTranslator::new(settings))
    }
}

pub struct PseudoXmlTranslator<'a> {
    settings: &'a Settings,
    out: Buffer,
    level: usize,
}

impl<'a> PseudoXmlTranslator<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            out: Buffer::new(),
            level: 0,
        }
    }

    fn indent(&self, extra: usize) -> String {
        INDENT.repeat(self.level + extra)
    }

    fn text_lines(&mut self, text: &str, extra: usize) {
        let indent = self.indent(extra);
        for line in text.lines() {
            self.out.push(format!("{indent}{line}\n"));
        }
    }
}

/// `<tag attr="value" ...>` with list attributes space-joined.
fn starttag(node: NodeRef<'_>) -> String {
    let attrs = node.attrs();
    let mut tag = format!("<{}", node.tag().name());
    if node.tag() == &Tag::Document {
        tag.push_str(&format!(" source=\"{}\"", node.document().source()));
    }
    for (name, values) in LEADING_ATTRIBUTES
        .iter()
        .zip([attrs.ids(), attrs.classes(), attrs.names()])
    {
        if !values.is_empty() {
            tag.push_str(&format!(" {name}=\"{}\"", values.join(" ")));
        }
    }
    for (name, value) in attrs.values().filter(|(name, _)| *name != "line") {
        tag.push_str(&format!(" {name}=\"{value}\""));
    }
    tag.push('>');
    tag
}

impl Visitor for PseudoXmlTranslator<'_> {
    fn handles(&self, _tag: &Tag) -> bool {
        true
    }

    fn enter(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        if node.tag() == &Tag::Text {
            if self.settings.detailed {
                let indent = self.indent(0);
                self.out.push(format!("{indent}<#text>\n"));
                self.text_lines(node.text(), 1);
            } else {
                self.text_lines(node.text(), 0);
            }
            return Ok(Visit::SkipNode);
        }
        let line = format!("{}{}\n", self.indent(0), starttag(node));
        self.out.push(line);
        self.level += 1;
        Ok(Visit::Continue)
    }

    fn leave(&mut self, _node: NodeRef<'_>) -> Result<()> {
        self.level = self
            .level
            .checked_sub(1)
            .ok_or_else(|| Error::Invariant("pseudo-XML indentation below zero".to_string()))?;
        Ok(())
    }
}

impl Translator for PseudoXmlTranslator<'_> {
    fn context_depth(&self) -> usize {
        self.level
    }

    fn finish(self) -> Result<Parts> {
        if self.level != 0 {
            return Err(Error::Invariant(format!(
                "pseudo-XML walk ended at depth {}",
                self.level
            )));
        }
        let body = self.out.join();
        let mut parts = Parts::new();
        parts.insert("body", body.clone());
        parts.insert("encoding", self.settings.output_encoding.clone());
        parts.insert("version", VERSION);
        parts.insert("whole", body);
        Ok(parts)
    }
}

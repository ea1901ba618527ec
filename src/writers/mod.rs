//! Writers for the supported output formats.
//!
//! Provides the `Writer` trait and format-specific implementations.
//!
//! # Architecture
//!
//! A writer is a small, shareable value holding its configuration:
//! - `new()` creates a writer with default configuration
//! - `translate()` builds a fresh translator for one document, walks the
//!   tree with it and assembles the resulting [`Parts`]
//!
//! Translators own all mutable state (buffers, context stack, counters), so
//! one writer can serve any number of concurrent conversions.
//!
//! # Example
//!
//! ```
//! use docweave::nodes::{Document, Tag};
//! use docweave::settings::Settings;
//! use docweave::writers::writer_for;
//!
//! let mut doc = Document::default();
//! let para = doc.add(doc.root(), Tag::Paragraph);
//! doc.add_text(para, "Fish & chips");
//!
//! let writer = writer_for("html5")?;
//! let parts = writer.translate(&doc, &Settings::default())?;
//! assert!(parts.get("body").unwrap().contains("Fish &amp; chips"));
//! # Ok::<(), docweave::Error>(())
//! ```

mod buffer;
pub mod html;
mod index;
pub mod latex;
mod parts;
pub mod pseudoxml;

pub use buffer::{Buffer, Checkpoint, ContextStack, Frame};
pub use html::Html5Writer;
pub use index::{DocumentIndex, make_id};
pub use latex::LatexWriter;
pub use parts::Parts;
pub use pseudoxml::PseudoXmlWriter;

use crate::diagnostics::Level;
use crate::error::{Error, Result};
use crate::nodes::{Document, NodeRef, Tag};
use crate::settings::Settings;
use crate::visit::{Visitor, walkabout};

/// Version string reported in the `version` part and generator comments.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A document writer for one output format.
pub trait Writer: Send + Sync {
    /// Canonical format name.
    fn name(&self) -> &'static str;

    /// Format names this writer answers to. A `raw` node whose `format`
    /// lists any of them is passed through verbatim.
    fn supported(&self) -> &'static [&'static str];

    fn supports(&self, format: &str) -> bool {
        self.supported()
            .iter()
            .any(|name| name.eq_ignore_ascii_case(format))
    }

    /// Render `doc` into named parts.
    fn translate(&self, doc: &Document, settings: &Settings) -> Result<Parts>;
}

/// A visitor that accumulates output and finally yields [`Parts`].
pub trait Translator: Visitor {
    /// Current context-stack depth (zero between top-level constructs).
    fn context_depth(&self) -> usize;

    /// Assemble the parts; fails if the walk left frames open.
    fn finish(self) -> Result<Parts>
    where
        Self: Sized;
}

/// Walk `doc` with `translator` and assemble the result.
pub(crate) fn run<T: Translator>(writer: &str, doc: &Document, mut translator: T) -> Result<Parts> {
    log::debug!(
        "{writer}: translating {} ({} nodes)",
        doc.source(),
        doc.node_count()
    );
    walkabout(doc, &mut translator)?;
    let parts = translator.finish()?;
    for (name, value) in parts.iter() {
        log::debug!("{writer}: part {name} is {} bytes", value.len());
    }
    Ok(parts)
}

/// Look up a writer by name or alias.
pub fn writer_for(name: &str) -> Result<Box<dyn Writer>> {
    match name.to_ascii_lowercase().as_str() {
        "html" | "html5" | "html5_polyglot" | "xhtml" => Ok(Box::new(Html5Writer::new())),
        "latex" | "latex2e" | "tex" => Ok(Box::new(LatexWriter::new())),
        "pseudoxml" | "pformat" | "pprint" => Ok(Box::new(PseudoXmlWriter::new())),
        _ => Err(Error::UnknownWriter(name.to_string())),
    }
}

/// Whether the space-separated `format` of a `raw` node names one of `formats`.
pub(crate) fn raw_targets(node: NodeRef<'_>, formats: &[&str]) -> bool {
    node.get_attr("format")
        .unwrap_or_default()
        .split_whitespace()
        .any(|format| formats.iter().any(|name| name.eq_ignore_ascii_case(format)))
}

// ============================================================================
// In-place reports
// ============================================================================

/// Severity of a `system_message` node from its `level` or `type` attribute.
pub(crate) fn message_level(node: NodeRef<'_>) -> Level {
    node.attrs()
        .get_u32("level")
        .map(|n| Level::from_number(n.min(4) as u8))
        .or_else(|| node.get_attr("type").and_then(|t| t.parse().ok()))
        .unwrap_or(Level::Error)
}

/// Source line of `node` or its nearest ancestor that records one.
pub(crate) fn line_of(node: NodeRef<'_>) -> Option<u32> {
    let mut current = Some(node);
    while let Some(n) = current {
        if let Some(line) = n.line() {
            return Some(line);
        }
        current = n.parent();
    }
    None
}

/// A one-node tree `system_message > paragraph > text` for in-place reports.
pub(crate) fn system_message_tree(
    source: &str,
    level: Level,
    line: Option<u32>,
    message: &str,
) -> Document {
    let mut tree = Document::new(source);
    let node = tree.add(tree.root(), Tag::SystemMessage);
    {
        let attrs = tree.attrs_mut(node);
        attrs.set("level", level.number().to_string());
        attrs.set("type", level.name());
        attrs.set("source", source);
        if let Some(line) = line {
            attrs.set("line", line.to_string());
        }
    }
    tree.add_with_text(node, Tag::Paragraph, message);
    tree
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_for_aliases() {
        assert_eq!(writer_for("html").unwrap().name(), "html5");
        assert_eq!(writer_for("XHTML").unwrap().name(), "html5");
        assert_eq!(writer_for("latex2e").unwrap().name(), "latex");
        assert_eq!(writer_for("pformat").unwrap().name(), "pseudoxml");
        assert!(matches!(
            writer_for("docx"),
            Err(Error::UnknownWriter(name)) if name == "docx"
        ));
    }

    #[test]
    fn test_supports_raw_formats() {
        let html = writer_for("html").unwrap();
        assert!(html.supports("HTML"));
        assert!(!html.supports("latex"));
        let latex = writer_for("latex").unwrap();
        assert!(latex.supports("latex"));
    }

    #[test]
    fn test_writers_are_shareable() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn Writer>();
    }
}

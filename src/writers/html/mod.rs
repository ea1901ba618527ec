//! HTML5 writer.
//!
//! Produces polyglot markup: HTML5 that is also well-formed XML. The
//! translator renders each node into the `body` buffer; a few constructs are
//! relocated after the fact through checkpoint/splice:
//!
//! - the document title and subtitle move to `body_pre_docinfo`
//! - the bibliographic field list moves to `docinfo`
//! - `header` content moves to `body_prefix`, `footer` content to `body_suffix`
//!
//! Images that cannot be rendered are replaced by a system message built as a
//! small document tree and walked with the same translator.

mod escape;
mod image;
mod template;

use std::collections::BTreeMap;
use std::sync::Arc;

pub use escape::{attval, comment, encode};
use template::{BODY_OPEN_WITH_TOC, Buffers};

use crate::diagnostics::{Diagnostic, Level};
use crate::error::{Error, Result};
use crate::io::{FsLoader, ResourceLoader};
use crate::nodes::{Document, NodeRef, Tag};
use crate::settings::Settings;
use crate::visit::{UnknownPolicy, Visit, Visitor, walk};
use crate::writers::{
    ContextStack, DocumentIndex, Frame, Parts, Translator, Writer, line_of, message_level,
    raw_targets, run, system_message_tree,
};

/// Class values that select an HTML text-level element for `inline` and
/// `literal` nodes.
const INLINE_TAGS: [&str; 15] = [
    "code", "kbd", "dfn", "samp", "var", "bdi", "del", "ins", "mark", "small", "b", "i", "q", "s",
    "u",
];

/// Class values that select an HTML block element for `container` nodes.
const BLOCK_TAGS: [&str; 2] = ["ins", "del"];

/// Admonition kinds that get a generated title.
const ADMONITIONS: [&str; 9] = [
    "attention",
    "caution",
    "danger",
    "error",
    "hint",
    "important",
    "note",
    "tip",
    "warning",
];

// ============================================================================
// Writer
// ============================================================================

/// Writer for HTML5 output.
#[derive(Clone)]
pub struct Html5Writer {
    loader: Arc<dyn ResourceLoader>,
}

impl Html5Writer {
    /// Create a writer that reads embedded images from the filesystem.
    pub fn new() -> Self {
        Self {
            loader: Arc::new(FsLoader::new()),
        }
    }

    /// Use a custom loader for `image_loading = embed`.
    pub fn with_loader(loader: Arc<dyn ResourceLoader>) -> Self {
        Self { loader }
    }
}

/// Format names handled by the HTML writer.
const FORMATS: &[&str] = &["html", "html5", "xhtml", "html5_polyglot"];

impl Default for Html5Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer for Html5Writer {
    fn name(&self) -> &'static str {
        "html5"
    }

    fn supported(&self) -> &'static [&'static str] {
        FORMATS
    }

    fn translate(&self, doc: &Document, settings: &Settings) -> Result<Parts> {
        settings.validate()?;
        let translator = HtmlTranslator::new(doc, settings, self.loader.as_ref());
        run(self.name(), doc, translator)
    }
}

// ============================================================================
// Start tags
// ============================================================================

/// An HTML start tag under construction.
///
/// Attributes are emitted in sorted order; ids beyond the first become empty
/// `<span>` anchors in front of the tag.
#[derive(Debug, Clone)]
struct StartTag {
    name: String,
    classes: Vec<String>,
    ids: Vec<String>,
    attrs: BTreeMap<String, String>,
}

impl StartTag {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            classes: Vec::new(),
            ids: Vec::new(),
            attrs: BTreeMap::new(),
        }
    }

    /// Add whitespace-separated class values (duplicates are dropped).
    fn class(mut self, classes: &str) -> Self {
        for class in classes.split_whitespace() {
            if !self.classes.iter().any(|c| c == class) {
                self.classes.push(class.to_string());
            }
        }
        self
    }

    fn without_class(mut self, class: &str) -> Self {
        self.classes.retain(|c| c != class);
        self
    }

    fn attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attrs.insert(key.to_string(), value.into());
        self
    }

    fn attributes(&self) -> String {
        let mut attrs = self.attrs.clone();
        if !self.classes.is_empty() {
            attrs.insert("class".to_string(), self.classes.join(" "));
        }
        if let Some(id) = self.ids.first() {
            attrs.insert("id".to_string(), id.clone());
        }
        attrs
            .iter()
            .map(|(key, value)| format!(" {key}=\"{}\"", attval(value)))
            .collect()
    }

    fn prefix(&self) -> String {
        self.ids
            .iter()
            .skip(1)
            .map(|id| format!("<span id=\"{}\"></span>", attval(id)))
            .collect()
    }

    fn render(&self, suffix: &str) -> String {
        format!("{}<{}{}>{suffix}", self.prefix(), self.name, self.attributes())
    }

    fn render_empty(&self, suffix: &str) -> String {
        format!("{}<{}{} />{suffix}", self.prefix(), self.name, self.attributes())
    }
}

// ============================================================================
// Translator
// ============================================================================

/// Visitor rendering one document into HTML buffers.
pub struct HtmlTranslator<'a> {
    doc: &'a Document,
    settings: &'a Settings,
    loader: &'a dyn ResourceLoader,
    index: DocumentIndex,
    out: Buffers,
    context: ContextStack,
    section_level: u32,
    head_title: String,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> HtmlTranslator<'a> {
    pub fn new(doc: &'a Document, settings: &'a Settings, loader: &'a dyn ResourceLoader) -> Self {
        Self {
            doc,
            settings,
            loader,
            index: DocumentIndex::build(doc),
            out: Buffers::new(),
            context: ContextStack::new(),
            section_level: 0,
            head_title: String::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Current section nesting depth.
    pub fn section_level(&self) -> u32 {
        self.section_level
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn source_label(&self) -> &str {
        self.settings.source_label(self.doc.source())
    }

    /// Whether `node` belongs to the document being translated (and not to a
    /// synthesized fallback tree).
    fn is_main(&self, node: NodeRef<'_>) -> bool {
        std::ptr::eq(node.document(), self.doc)
    }

    fn ids_for(&self, node: NodeRef<'_>) -> Vec<String> {
        if self.is_main(node) {
            self.index.ids_of(node.id()).to_vec()
        } else {
            node.attrs().ids().to_vec()
        }
    }

    fn anchor_of(&self, node: NodeRef<'_>) -> Option<String> {
        self.ids_for(node).into_iter().next()
    }

    /// Start tag carrying the node's ids and classes after `extra_class`.
    fn starttag(&self, node: NodeRef<'_>, name: &str, extra_class: &str) -> StartTag {
        let mut tag = StartTag::new(name).class(extra_class);
        for class in node.attrs().classes() {
            tag = tag.class(class);
        }
        tag.ids = self.ids_for(node);
        tag
    }

    fn push(&mut self, fragment: impl Into<String>) {
        self.out.body.push(fragment);
    }

    /// Emit `start` and remember `close` for the matching leave.
    fn open(&mut self, start: String, close: impl Into<String>) -> Result<Visit> {
        self.out.body.push(start);
        self.context.push(Frame::Close(close.into()));
        Ok(Visit::Continue)
    }

    /// Enter without output of its own.
    fn transparent(&mut self) -> Result<Visit> {
        self.context.push(Frame::Empty);
        Ok(Visit::Continue)
    }

    fn close(&mut self) -> Result<()> {
        let markup = self.context.pop_close()?;
        if !markup.is_empty() {
            self.out.body.push(markup);
        }
        Ok(())
    }

    fn add_meta(&mut self, name: &str, content: &str) {
        self.out.meta.push(format!(
            "<meta name=\"{}\" content=\"{}\" />\n",
            attval(name),
            attval(content)
        ));
    }

    /// Record a recovered problem and render it in place as a system message.
    fn report(&mut self, node: NodeRef<'_>, level: Level, message: String) -> Result<()> {
        let line = line_of(node);
        let diagnostic = Diagnostic::new(level, message.clone(), self.source_label()).with_line(line);
        log::warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);

        let fallback = system_message_tree(self.source_label(), level, line, &message);
        let root = fallback.children(fallback.root()).next();
        match root {
            Some(message_node) => walk(&fallback, message_node, self),
            None => Err(Error::Invariant("empty fallback tree".to_string())),
        }
    }

    // ------------------------------------------------------------------------
    // Document structure
    // ------------------------------------------------------------------------

    fn visit_document(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let document_title = node
            .children()
            .find(|c| c.tag() == &Tag::Title)
            .map(|t| t.astext());
        self.head_title = self
            .settings
            .title
            .clone()
            .or_else(|| node.get_attr("title").map(str::to_string))
            .or(document_title)
            .unwrap_or_else(|| basename(self.doc.source()).to_string());
        self.transparent()
    }

    fn depart_document(&mut self, node: NodeRef<'_>) -> Result<()> {
        self.close()?;
        let main = self.starttag(node, "main", "").render("\n");
        self.out.body_prefix.push(main);
        self.out.body_suffix.insert(0, "</main>\n");
        Ok(())
    }

    fn visit_section(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        self.section_level += 1;
        let start = self.starttag(node, "section", "").render("\n");
        self.open(start, "</section>\n")
    }

    fn depart_section(&mut self) -> Result<()> {
        self.close()?;
        self.section_level = self
            .section_level
            .checked_sub(1)
            .ok_or_else(|| Error::Invariant("section level below zero".to_string()))?;
        Ok(())
    }

    fn visit_title(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        match node.parent_tag() {
            Some(Tag::Document) => {
                self.context.push(Frame::Splice(self.out.body.checkpoint()));
                let start = self.starttag(node, "h1", "title").render("");
                self.push(start);
                Ok(Visit::Continue)
            }
            Some(Tag::Section) => self.visit_section_title(node),
            Some(Tag::Table) => {
                let start = self.starttag(node, "caption", "").render("");
                self.open(start, "</caption>\n")
            }
            Some(parent @ (Tag::Topic | Tag::Sidebar | Tag::Admonition)) => {
                let class = format!("{}-title", parent.name());
                let start = self.starttag(node, "p", &class).render("");
                self.open(start, "</p>\n")
            }
            _ => {
                let start = self.starttag(node, "p", "title").render("");
                self.open(start, "</p>\n")
            }
        }
    }

    fn visit_section_title(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let level = (u32::from(self.settings.initial_header_level) + self.section_level)
            .saturating_sub(1)
            .clamp(1, 6);
        let mut start = self.starttag(node, &format!("h{level}"), "").render("");
        let mut close = String::new();

        if let Some(refid) = node.get_attr("refid") {
            let anchor = self.index.anchor_for(refid).unwrap_or(refid);
            start.push_str(&format!(
                "<a class=\"toc-backref\" href=\"#{}\" role=\"doc-backlink\">",
                attval(anchor)
            ));
            close.push_str("</a>");
        }
        if self.settings.section_self_link
            && let Some(section) = node.parent()
            && let Some(id) = self.anchor_of(section)
        {
            close.push_str(&format!(
                "<a class=\"self-link\" title=\"link to this section\" href=\"#{}\"></a>",
                attval(&id)
            ));
        }
        close.push_str(&format!("</h{level}>\n"));
        self.open(start, close)
    }

    fn depart_title(&mut self, node: NodeRef<'_>) -> Result<()> {
        if node.parent_tag() != Some(&Tag::Document) {
            return self.close();
        }
        self.push("</h1>\n");
        let checkpoint = self.context.pop_checkpoint()?;
        let fragments = self.out.body.splice(checkpoint)?;
        if let [_, inner @ .., _] = fragments.as_slice() {
            self.out.title.extend(inner.iter().cloned());
        }
        self.out.html_title.extend(fragments.iter().cloned());
        if self.settings.doctitle_in_body {
            self.out.body_pre_docinfo.extend(fragments);
        }
        Ok(())
    }

    fn visit_subtitle(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        match node.parent_tag() {
            Some(Tag::Document) => {
                self.context.push(Frame::Splice(self.out.body.checkpoint()));
                let start = self.starttag(node, "p", "subtitle").render("");
                self.push(start);
                Ok(Visit::Continue)
            }
            Some(Tag::Sidebar) => {
                let start = self.starttag(node, "p", "sidebar-subtitle").render("");
                self.open(start, "</p>\n")
            }
            Some(Tag::Section) => {
                let start = self
                    .starttag(node, "p", "section-subtitle")
                    .attr("role", "doc-subtitle")
                    .render("");
                self.open(start, "</p>\n")
            }
            _ => {
                let start = self.starttag(node, "p", "subtitle").render("");
                self.open(start, "</p>\n")
            }
        }
    }

    fn depart_subtitle(&mut self, node: NodeRef<'_>) -> Result<()> {
        if node.parent_tag() != Some(&Tag::Document) {
            return self.close();
        }
        self.push("</p>\n");
        let checkpoint = self.context.pop_checkpoint()?;
        let fragments = self.out.body.splice(checkpoint)?;
        if let [_, inner @ .., _] = fragments.as_slice() {
            self.out.subtitle.extend(inner.iter().cloned());
        }
        self.out.html_subtitle.extend(fragments.iter().cloned());
        if self.settings.doctitle_in_body {
            self.out.body_pre_docinfo.extend(fragments);
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Relocated constructs
    // ------------------------------------------------------------------------

    fn checkpoint(&mut self) -> Result<Visit> {
        self.context.push(Frame::Splice(self.out.body.checkpoint()));
        Ok(Visit::Continue)
    }

    fn depart_header(&mut self, node: NodeRef<'_>) -> Result<()> {
        let checkpoint = self.context.pop_checkpoint()?;
        let content = self.out.body.splice(checkpoint)?;
        let mut header = vec![self.starttag(node, "header", "").render("\n")];
        header.extend(content);
        header.push("</header>\n".to_string());
        self.out.body_prefix.extend(header.iter().cloned());
        self.out.header.extend(header);
        Ok(())
    }

    fn depart_footer(&mut self, node: NodeRef<'_>) -> Result<()> {
        let checkpoint = self.context.pop_checkpoint()?;
        let content = self.out.body.splice(checkpoint)?;
        let mut footer = vec![self.starttag(node, "footer", "").render("\n")];
        footer.extend(content);
        footer.push("</footer>\n".to_string());

        // before the closing </body></html> fragment, after earlier footers
        let at = self.out.body_suffix.len().saturating_sub(1);
        for (offset, fragment) in footer.iter().enumerate() {
            self.out.body_suffix.insert(at + offset, fragment.clone());
        }
        self.out.footer.extend(footer);
        Ok(())
    }

    fn visit_docinfo(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        self.context.push(Frame::Splice(self.out.body.checkpoint()));
        let start = self.starttag(node, "dl", "docinfo simple").render("\n");
        self.push(start);
        Ok(Visit::Continue)
    }

    fn depart_docinfo(&mut self) -> Result<()> {
        self.push("</dl>\n");
        let checkpoint = self.context.pop_checkpoint()?;
        let fragments = self.out.body.splice(checkpoint)?;
        self.out.docinfo.extend(fragments);
        Ok(())
    }

    fn visit_docinfo_item(&mut self, node: NodeRef<'_>, name: &str, label: &str) -> Result<Visit> {
        self.push(format!(
            "<dt class=\"{name}\">{label}<span class=\"colon\">:</span></dt>\n"
        ));
        let start = self.starttag(node, "dd", name).render("");
        self.open(start, "</dd>\n")
    }

    fn visit_bibliographic(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let in_docinfo = node.parent_tag() == Some(&Tag::Docinfo);
        match node.tag() {
            Tag::Author if node.parent_tag() == Some(&Tag::Authors) => {
                let start = self.starttag(node, "p", "").render("");
                self.open(start, "</p>\n")
            }
            Tag::Author if in_docinfo => {
                self.add_meta("author", &node.astext());
                self.visit_docinfo_item(node, "author", "Author")
            }
            Tag::Authors if in_docinfo => {
                for author in node.children().filter(|c| c.tag() == &Tag::Author) {
                    self.add_meta("author", &author.astext());
                }
                self.visit_docinfo_item(node, "authors", "Authors")
            }
            Tag::Organization if in_docinfo => {
                self.visit_docinfo_item(node, "organization", "Organization")
            }
            Tag::Date if in_docinfo => {
                self.add_meta("dcterms.date", &node.astext());
                self.visit_docinfo_item(node, "date", "Date")
            }
            Tag::Copyright if in_docinfo => {
                self.add_meta("dcterms.rights", &node.astext());
                self.visit_docinfo_item(node, "copyright", "Copyright")
            }
            other => {
                let start = self.starttag(node, "p", other.name()).render("");
                self.open(start, "</p>\n")
            }
        }
    }

    fn visit_meta(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let mut tag = StartTag::new("meta");
        for (key, value) in node.attrs().values() {
            if key == "line" || key == "source" {
                continue;
            }
            tag = tag.attr(key, value);
            if key == "lang" {
                tag = tag.attr("xml:lang", value);
            }
        }
        self.out.meta.push(tag.render_empty("\n"));
        Ok(Visit::SkipNode)
    }

    // ------------------------------------------------------------------------
    // Body elements
    // ------------------------------------------------------------------------

    fn visit_literal(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let element = select_tag(node, &INLINE_TAGS).unwrap_or("span");
        if element == "code" {
            let start = self.starttag(node, "code", "").without_class("code").render("");
            return self.open(start, "</code>");
        }
        let start = self
            .starttag(node, element, "docutils literal")
            .without_class(element)
            .render("");
        let mut text = node.astext();
        if node.parent_tag() != Some(&Tag::LiteralBlock) {
            text = text.replace('\n', " ");
        }
        self.push(format!("{start}{}</{element}>", encode(&text)));
        Ok(Visit::SkipNode)
    }

    fn visit_literal_block(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        if node.has_class("code") {
            let start = self.starttag(node, "pre", "").class("literal-block").render("<code>");
            return self.open(start, "</code></pre>\n");
        }
        let start = self.starttag(node, "pre", "literal-block").render("");
        self.open(start, "</pre>\n")
    }

    fn visit_raw(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        if !raw_targets(node, FORMATS) {
            return Ok(Visit::SkipNode);
        }
        let inline = node.parent_tag().is_some_and(Tag::is_text_element);
        let wrapper = if inline { "span" } else { "div" };
        let classes = !node.attrs().classes().is_empty();
        if classes {
            let start = self.starttag(node, wrapper, "").render(if inline { "" } else { "\n" });
            self.push(start);
        }
        self.push(node.astext());
        if classes {
            self.push(format!("</{wrapper}>{}", if inline { "" } else { "\n" }));
        }
        Ok(Visit::SkipNode)
    }

    fn visit_reference(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let mut tag = self.starttag(node, "a", "reference");
        if let Some(uri) = node.get_attr("refuri") {
            tag = tag.class("external").attr("href", uri);
        } else if let Some(target) = node.get_attr("refid").or_else(|| node.get_attr("refname")) {
            let anchor = match self.index.anchor_for(target) {
                Some(anchor) => anchor.to_string(),
                None => target.to_string(),
            };
            tag = tag.class("internal").attr("href", format!("#{anchor}"));
        }
        self.open(tag.render(""), "</a>")
    }

    fn visit_target(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let attrs = node.attrs();
        if attrs.contains("refuri") || attrs.contains("refid") || attrs.contains("refname") {
            return self.transparent();
        }
        let start = self.starttag(node, "span", "target").render("");
        self.open(start, "</span>")
    }

    fn visit_problematic(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        match node.get_attr("refid") {
            Some(refid) => {
                let anchor = self.index.anchor_for(refid).unwrap_or(refid).to_string();
                let start = self
                    .starttag(node, "a", "problematic")
                    .attr("href", format!("#{anchor}"))
                    .render("");
                self.open(start, "</a>")
            }
            None => {
                let start = self.starttag(node, "span", "problematic").render("");
                self.open(start, "</span>")
            }
        }
    }

    fn visit_enumerated_list(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let enumtype = node.get_attr("enumtype").unwrap_or("arabic");
        let mut tag = self.starttag(node, "ol", enumtype);
        if let Some(start) = node.attrs().get_u32("start")
            && start != 1
        {
            tag = tag.attr("start", start.to_string());
        }
        self.open(tag.render("\n"), "</ol>\n")
    }

    fn visit_figure(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let mut tag = self.starttag(node, "figure", "");
        if let Some(align) = node.get_attr("align") {
            tag = tag.class(&format!("align-{align}"));
        }
        if let Some(width) = node.get_attr("width") {
            tag = tag.attr("style", format!("width: {width}"));
        }
        let captioned = node
            .children()
            .any(|c| matches!(c.tag(), Tag::Caption | Tag::Legend));
        let close = if captioned {
            "</figcaption>\n</figure>\n"
        } else {
            "</figure>\n"
        };
        self.open(tag.render("\n"), close)
    }

    fn visit_caption(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        if node.parent_tag() == Some(&Tag::Figure) {
            self.push("<figcaption>\n");
            let start = self.starttag(node, "p", "").render("");
            return self.open(start, "</p>\n");
        }
        let start = self.starttag(node, "p", "caption").render("");
        self.open(start, "</p>\n")
    }

    fn visit_legend(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let after_caption = node
            .parent()
            .and_then(|figure| figure.children().nth(1))
            .is_some_and(|second| second.tag() == &Tag::Caption);
        if !after_caption {
            self.push("<figcaption>\n");
        }
        let start = self.starttag(node, "div", "legend").render("\n");
        self.open(start, "</div>\n")
    }

    fn visit_tgroup(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let auto = node
            .parent()
            .is_some_and(|table| table.has_class("colwidths-auto"));
        let widths: Option<Vec<f64>> = node
            .children()
            .filter(|c| c.tag() == &Tag::Colspec)
            .map(|c| c.get_attr("colwidth").and_then(|w| w.trim().parse().ok()))
            .collect();
        if !auto
            && let Some(widths) = widths
            && !widths.is_empty()
        {
            let total: f64 = widths.iter().sum();
            if total > 0.0 {
                let mut colgroup = String::from("<colgroup>\n");
                for width in widths {
                    let percent = (width * 100.0 / total).round() as u32;
                    colgroup.push_str(&format!("<col style=\"width: {percent}%\" />\n"));
                }
                colgroup.push_str("</colgroup>\n");
                self.push(colgroup);
            }
        }
        self.transparent()
    }

    fn visit_entry(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let head = node.ancestor(&Tag::Thead).is_some();
        let element = if head { "th" } else { "td" };
        let mut tag = self.starttag(node, element, "");
        if let Some(more) = node.attrs().get_u32("morecols") {
            tag = tag.attr("colspan", (more + 1).to_string());
        }
        if let Some(more) = node.attrs().get_u32("morerows") {
            tag = tag.attr("rowspan", (more + 1).to_string());
        }
        self.open(tag.render(""), format!("</{element}>\n"))
    }

    /// Label span of a footnote or citation, with back-links.
    fn note_label(&self, node: NodeRef<'_>) -> String {
        let indexed = self
            .is_main(node)
            .then(|| self.index.label_of(node.id()))
            .flatten()
            .map(str::to_string);
        let label = indexed
            .or_else(|| {
                node.children()
                    .find(|c| c.tag() == &Tag::Label)
                    .map(|l| l.astext())
            })
            .unwrap_or_default();
        let label = encode(&label).into_owned();

        let backrefs: Vec<&str> = if self.settings.footnote_backlinks {
            node.get_attr("backrefs")
                .map(|b| b.split_whitespace().collect())
                .unwrap_or_default()
        } else {
            Vec::new()
        };
        match backrefs.as_slice() {
            [] => format!("<span class=\"label\">[{label}]</span>\n"),
            [single] => format!(
                "<span class=\"label\">[<a role=\"doc-backlink\" href=\"#{}\">{label}</a>]</span>\n",
                attval(single)
            ),
            many => {
                let links: Vec<String> = many
                    .iter()
                    .enumerate()
                    .map(|(i, r)| {
                        format!(
                            "<a role=\"doc-backlink\" href=\"#{}\">{}</a>",
                            attval(r),
                            i + 1
                        )
                    })
                    .collect();
                format!(
                    "<span class=\"label\">[{label}]</span>\n<span class=\"backrefs\">({})</span>\n",
                    links.join(",")
                )
            }
        }
    }

    fn visit_footnote(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let start = self
            .starttag(node, "aside", "footnote brackets")
            .attr("role", "doc-footnote")
            .render("\n");
        let label = self.note_label(node);
        self.open(format!("{start}{label}"), "</aside>\n")
    }

    fn visit_citation(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let start = self
            .starttag(node, "div", "citation")
            .attr("role", "doc-biblioentry")
            .render("\n");
        let label = self.note_label(node);
        self.open(format!("{start}{label}"), "</div>\n")
    }

    fn visit_footnote_reference(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let target = node.get_attr("refid").or_else(|| node.get_attr("refname"));
        let mut tag = self
            .starttag(node, "a", "footnote-reference brackets")
            .attr("role", "doc-noteref");
        if let Some(target) = target {
            let anchor = self.index.anchor_for(target).unwrap_or(target);
            tag = tag.attr("href", format!("#{anchor}"));
        }
        let text = node.astext();
        let label = if text.is_empty() {
            target
                .and_then(|t| self.index.label_for(t))
                .unwrap_or("?")
                .to_string()
        } else {
            text
        };
        self.push(format!("{}[{}]</a>", tag.render(""), encode(&label)));
        Ok(Visit::SkipNode)
    }

    fn visit_citation_reference(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let mut tag = self
            .starttag(node, "a", "citation-reference")
            .attr("role", "doc-biblioref");
        if let Some(target) = node.get_attr("refid").or_else(|| node.get_attr("refname")) {
            let anchor = self.index.anchor_for(target).unwrap_or(target);
            tag = tag.attr("href", format!("#{anchor}"));
        }
        self.push(format!("{}[{}]</a>", tag.render(""), encode(&node.astext())));
        Ok(Visit::SkipNode)
    }

    fn visit_topic(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let (element, tag) = if node.has_class("contents") {
            let mut tag = self.starttag(node, "nav", "");
            if node.parent_tag() == Some(&Tag::Document) {
                tag = tag.attr("role", "doc-toc");
                self.out.body_prefix.set(0, BODY_OPEN_WITH_TOC);
            }
            ("nav", tag)
        } else if node.has_class("abstract") {
            (
                "div",
                self.starttag(node, "div", "topic").attr("role", "doc-abstract"),
            )
        } else if node.has_class("dedication") {
            (
                "div",
                self.starttag(node, "div", "topic").attr("role", "doc-dedication"),
            )
        } else {
            ("aside", self.starttag(node, "aside", "topic"))
        };
        self.open(tag.render("\n"), format!("</{element}>\n"))
    }

    fn visit_container(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let tags: Vec<&str> = BLOCK_TAGS
            .into_iter()
            .filter(|t| node.has_class(t))
            .collect();
        let (element, tag) = match tags.as_slice() {
            [only] => (*only, self.starttag(node, only, "").without_class(only)),
            _ => ("div", self.starttag(node, "div", "docutils container")),
        };
        self.open(tag.render("\n"), format!("</{element}>\n"))
    }

    fn visit_inline(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let element = select_tag(node, &INLINE_TAGS).unwrap_or("span");
        let start = self.starttag(node, element, "").without_class(element).render("");
        self.open(start, format!("</{element}>"))
    }

    fn visit_admonition(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let start = self.starttag(node, "aside", "admonition").render("\n");
        let has_title = node.children().any(|c| c.tag() == &Tag::Title);
        let kind = ADMONITIONS.into_iter().find(|k| node.has_class(k));
        let mut markup = start;
        if !has_title && let Some(kind) = kind {
            markup.push_str(&format!(
                "<p class=\"admonition-title\">{}</p>\n",
                capitalize(kind)
            ));
        }
        self.open(markup, "</aside>\n")
    }

    fn visit_system_message(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let level = message_level(node);
        if level < self.settings.report_level {
            return Ok(Visit::SkipNode);
        }
        let source = node
            .get_attr("source")
            .unwrap_or_else(|| self.source_label())
            .to_string();
        let mut title = format!(
            "System Message: {}/{} (<span class=\"docutils literal\">{}</span>",
            level.name(),
            level.number(),
            encode(&source)
        );
        if let Some(line) = node.line() {
            title.push_str(&format!(", line {line}"));
        }
        title.push(')');
        if let Some(backref) = node
            .get_attr("backrefs")
            .and_then(|b| b.split_whitespace().next())
        {
            title.push_str(&format!(
                "; <em><a href=\"#{}\">backlink</a></em>",
                attval(backref)
            ));
        }
        let start = self.starttag(node, "aside", "system-message").render("\n");
        self.open(
            format!("{start}<p class=\"system-message-title\">{title}</p>\n"),
            "</aside>\n",
        )
    }

    fn visit_line(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        if node.first_child().is_none() {
            self.push("<div class=\"line\"><br /></div>\n");
            return Ok(Visit::SkipNode);
        }
        let start = self.starttag(node, "div", "line").render("");
        self.open(start, "</div>\n")
    }

    fn visit_comment(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        self.push(format!("<!-- {} -->\n", comment(&node.astext())));
        Ok(Visit::SkipNode)
    }

    /// `<name>` ... `</name>` with the node's ids and classes.
    fn simple(&mut self, node: NodeRef<'_>, name: &str, class: &str, block: bool) -> Result<Visit> {
        let start = self
            .starttag(node, name, class)
            .render(if block { "\n" } else { "" });
        let close = if block || matches!(name, "p" | "li" | "dt" | "tr") {
            format!("</{name}>\n")
        } else {
            format!("</{name}>")
        };
        self.open(start, close)
    }
}

impl Visitor for HtmlTranslator<'_> {
    fn enter(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        match node.tag() {
            Tag::Document => self.visit_document(node),
            Tag::Section => self.visit_section(node),
            Tag::Title => self.visit_title(node),
            Tag::Subtitle => self.visit_subtitle(node),
            Tag::Paragraph => self.simple(node, "p", "", false),
            Tag::Text => {
                let text = encode(node.text()).into_owned();
                self.push(text);
                Ok(Visit::SkipNode)
            }
            Tag::Emphasis => self.simple(node, "em", "", false),
            Tag::Strong => self.simple(node, "strong", "", false),
            Tag::Subscript => self.simple(node, "sub", "", false),
            Tag::Superscript => self.simple(node, "sup", "", false),
            Tag::TitleReference => self.simple(node, "cite", "", false),
            Tag::Abbreviation => self.simple(node, "abbr", "", false),
            Tag::Literal => self.visit_literal(node),
            Tag::LiteralBlock => self.visit_literal_block(node),
            Tag::Raw => self.visit_raw(node),
            Tag::Reference => self.visit_reference(node),
            Tag::Target => self.visit_target(node),
            Tag::Image => self.visit_image(node),
            Tag::Figure => self.visit_figure(node),
            Tag::Caption => self.visit_caption(node),
            Tag::Legend => self.visit_legend(node),
            Tag::BulletList => self.simple(node, "ul", "", true),
            Tag::EnumeratedList => self.visit_enumerated_list(node),
            Tag::ListItem => self.simple(node, "li", "", false),
            Tag::DefinitionList => self.simple(node, "dl", "", true),
            Tag::DefinitionListItem | Tag::Field | Tag::Decoration => self.transparent(),
            Tag::Term => self.simple(node, "dt", "", false),
            Tag::Definition => self.simple(node, "dd", "", true),
            Tag::FieldList => self.simple(node, "dl", "field-list simple", true),
            Tag::FieldName => {
                let start = self.starttag(node, "dt", "").render("");
                self.open(start, "<span class=\"colon\">:</span></dt>\n")
            }
            Tag::FieldBody => self.simple(node, "dd", "", false),
            Tag::BlockQuote => self.simple(node, "blockquote", "", true),
            Tag::Attribution => {
                let start = self.starttag(node, "p", "attribution").render("\u{2014}");
                self.open(start, "</p>\n")
            }
            Tag::Table => self.simple(node, "table", "", true),
            Tag::Tgroup => self.visit_tgroup(node),
            Tag::Colspec | Tag::Label | Tag::SubstitutionDefinition => Ok(Visit::SkipNode),
            Tag::Thead => self.simple(node, "thead", "", true),
            Tag::Tbody => self.simple(node, "tbody", "", true),
            Tag::Row => self.simple(node, "tr", "", false),
            Tag::Entry => self.visit_entry(node),
            Tag::Footnote => self.visit_footnote(node),
            Tag::FootnoteReference => self.visit_footnote_reference(node),
            Tag::Citation => self.visit_citation(node),
            Tag::CitationReference => self.visit_citation_reference(node),
            Tag::Header | Tag::Footer => self.checkpoint(),
            Tag::Docinfo => self.visit_docinfo(node),
            Tag::Author
            | Tag::Authors
            | Tag::Organization
            | Tag::Date
            | Tag::Copyright => self.visit_bibliographic(node),
            Tag::Meta => self.visit_meta(node),
            Tag::Topic => self.visit_topic(node),
            Tag::Sidebar => self.simple(node, "aside", "sidebar", true),
            Tag::Rubric => self.simple(node, "p", "rubric", false),
            Tag::Container => self.visit_container(node),
            Tag::Inline => self.visit_inline(node),
            Tag::Admonition => self.visit_admonition(node),
            Tag::SystemMessage => self.visit_system_message(node),
            Tag::Problematic => self.visit_problematic(node),
            Tag::Comment => self.visit_comment(node),
            Tag::Transition => {
                self.push("<hr class=\"docutils\" />\n");
                Ok(Visit::SkipNode)
            }
            Tag::LineBlock => self.simple(node, "div", "line-block", true),
            Tag::Line => self.visit_line(node),
            Tag::Other(_) => self.enter_unknown(node),
        }
    }

    fn leave(&mut self, node: NodeRef<'_>) -> Result<()> {
        match node.tag() {
            Tag::Document => self.depart_document(node),
            Tag::Section => self.depart_section(),
            Tag::Title => self.depart_title(node),
            Tag::Subtitle => self.depart_subtitle(node),
            Tag::Header => self.depart_header(node),
            Tag::Footer => self.depart_footer(node),
            Tag::Docinfo => self.depart_docinfo(),
            Tag::Other(_) => self.leave_unknown(node),
            _ => self.close(),
        }
    }

    fn unknown_policy(&self) -> UnknownPolicy {
        if self.settings.strict_visitor {
            UnknownPolicy::Strict
        } else {
            UnknownPolicy::Lenient
        }
    }
}

impl Translator for HtmlTranslator<'_> {
    fn context_depth(&self) -> usize {
        self.context.depth()
    }

    fn finish(self) -> Result<Parts> {
        self.context.ensure_empty()?;
        if self.section_level != 0 {
            return Err(Error::Invariant(format!(
                "section level {} after walk",
                self.section_level
            )));
        }
        let mut parts = template::assemble(&self.out, self.settings, &self.head_title);
        parts.set_diagnostics(self.diagnostics);
        Ok(parts)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// First class value of `node` that names one of `candidates`.
fn select_tag(node: NodeRef<'_>, candidates: &[&'static str]) -> Option<&'static str> {
    candidates.iter().copied().find(|tag| node.has_class(tag))
}

fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryLoader;
    use crate::visit::walkabout;

    fn translate(doc: &Document, settings: &Settings) -> Parts {
        Html5Writer::with_loader(Arc::new(MemoryLoader::new()))
            .translate(doc, settings)
            .unwrap()
    }

    fn body(doc: &Document) -> String {
        translate(doc, &Settings::default())
            .get("body")
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_section_paragraph_escaped() {
        let mut doc = Document::default();
        let section = doc.add(doc.root(), Tag::Section);
        doc.add_with_text(section, Tag::Title, "Intro");
        doc.add_with_text(section, Tag::Paragraph, "Hello & welcome");

        let settings = Settings::default();
        let loader = MemoryLoader::new();
        let mut translator = HtmlTranslator::new(&doc, &settings, &loader);
        walkabout(&doc, &mut translator).unwrap();
        assert_eq!(translator.section_level(), 0);
        assert_eq!(translator.context_depth(), 0);
        let parts = translator.finish().unwrap();

        assert_eq!(
            parts.get("body").unwrap(),
            "<section id=\"intro\">\n<h2>Intro</h2>\n<p>Hello &amp; welcome</p>\n</section>\n"
        );
    }

    #[test]
    fn test_nested_section_levels() {
        let mut doc = Document::default();
        let outer = doc.add(doc.root(), Tag::Section);
        doc.add_with_text(outer, Tag::Title, "A");
        let inner = doc.add(outer, Tag::Section);
        doc.add_with_text(inner, Tag::Title, "B");

        let settings = Settings::default().with_initial_header_level(1);
        let body = translate(&doc, &settings).get("body").unwrap().to_string();
        assert!(body.contains("<h1>A</h1>"));
        assert!(body.contains("<h2>B</h2>"));
    }

    #[test]
    fn test_section_self_link() {
        let mut doc = Document::default();
        let section = doc.add(doc.root(), Tag::Section);
        doc.add_with_text(section, Tag::Title, "Usage");
        let settings = Settings::default().with_section_self_link(true);
        let body = translate(&doc, &settings).get("body").unwrap().to_string();
        assert!(body.contains(
            "<h2>Usage<a class=\"self-link\" title=\"link to this section\" href=\"#usage\"></a></h2>"
        ));
    }

    #[test]
    fn test_document_title_relocated() {
        let mut doc = Document::default();
        let title = doc.add(doc.root(), Tag::Title);
        doc.add_text(title, "My ");
        doc.add_with_text(title, Tag::Emphasis, "Doc");
        doc.add_with_text(doc.root(), Tag::Paragraph, "text");

        let parts = translate(&doc, &Settings::default());
        assert_eq!(parts.get("title"), Some("My <em>Doc</em>"));
        assert_eq!(
            parts.get("html_title"),
            Some("<h1 class=\"title\">My <em>Doc</em></h1>\n")
        );
        assert_eq!(
            parts.get("body_pre_docinfo"),
            Some("<h1 class=\"title\">My <em>Doc</em></h1>\n")
        );
        assert_eq!(parts.get("body"), Some("<p>text</p>\n"));
        assert!(parts.whole().contains("<title>My Doc</title>"));
    }

    #[test]
    fn test_headers_keep_document_order() {
        let mut doc = Document::default();
        let decoration = doc.add(doc.root(), Tag::Decoration);
        let first = doc.add(decoration, Tag::Header);
        doc.add_with_text(first, Tag::Paragraph, "A");
        let second = doc.add(decoration, Tag::Header);
        doc.add_with_text(second, Tag::Paragraph, "B");
        let footer_a = doc.add(decoration, Tag::Footer);
        doc.add_with_text(footer_a, Tag::Paragraph, "C");
        let footer_b = doc.add(decoration, Tag::Footer);
        doc.add_with_text(footer_b, Tag::Paragraph, "D");
        doc.add_with_text(doc.root(), Tag::Paragraph, "main");

        let parts = translate(&doc, &Settings::default());
        assert_eq!(parts.get("body"), Some("<p>main</p>\n"));
        let header = parts.get("header").unwrap();
        assert_eq!(
            header,
            "<header>\n<p>A</p>\n</header>\n<header>\n<p>B</p>\n</header>\n"
        );
        let prefix = parts.get("body_prefix").unwrap();
        assert!(prefix.find("<p>A</p>").unwrap() < prefix.find("<p>B</p>").unwrap());
        assert!(prefix.ends_with("<main>\n"));

        let suffix = parts.get("body_suffix").unwrap();
        assert!(suffix.starts_with("</main>\n<footer>"));
        assert!(suffix.find("<p>C</p>").unwrap() < suffix.find("<p>D</p>").unwrap());
        assert!(suffix.ends_with("</body>\n</html>\n"));
    }

    #[test]
    fn test_docinfo_meta() {
        let mut doc = Document::default();
        let docinfo = doc.add(doc.root(), Tag::Docinfo);
        doc.add_with_text(docinfo, Tag::Author, "Ada");
        doc.add_with_text(docinfo, Tag::Date, "2024-05-01");

        let parts = translate(&doc, &Settings::default());
        let docinfo = parts.get("docinfo").unwrap();
        assert!(docinfo.starts_with("<dl class=\"docinfo simple\">\n"));
        assert!(docinfo.contains("<dd class=\"author\">Ada</dd>"));
        let meta = parts.get("meta").unwrap();
        assert!(meta.contains("<meta name=\"author\" content=\"Ada\" />"));
        assert!(meta.contains("<meta name=\"dcterms.date\" content=\"2024-05-01\" />"));
        assert!(parts.get("head").unwrap().contains("schema.dcterms"));
        assert_eq!(parts.get("body"), Some(""));
    }

    #[test]
    fn test_raw_html_passes_through() {
        let mut doc = Document::default();
        let raw = doc.add_with_text(doc.root(), Tag::Raw, "<b>bold</b>");
        doc.attrs_mut(raw).set("format", "html");
        let other = doc.add_with_text(doc.root(), Tag::Raw, "\\LaTeX");
        doc.attrs_mut(other).set("format", "latex");
        assert_eq!(body(&doc), "<b>bold</b>");
    }

    #[test]
    fn test_raw_format_aliases() {
        let mut doc = Document::default();
        let xhtml = doc.add_with_text(doc.root(), Tag::Raw, "<i>x</i>");
        doc.attrs_mut(xhtml).set("format", "xhtml");
        let listed = doc.add_with_text(doc.root(), Tag::Raw, "<u>y</u>");
        doc.attrs_mut(listed).set("format", "odt HTML5");
        let pdf = doc.add_with_text(doc.root(), Tag::Raw, "%PDF");
        doc.attrs_mut(pdf).set("format", "pdf");
        assert_eq!(body(&doc), "<i>x</i><u>y</u>");
        assert!(Html5Writer::new().supports("XHTML"));
    }

    #[test]
    fn test_literal_and_inline_tags() {
        let mut doc = Document::default();
        let para = doc.add(doc.root(), Tag::Paragraph);
        doc.add_with_text(para, Tag::Literal, "a<b");
        let kbd = doc.add_with_text(para, Tag::Inline, "Ctrl");
        doc.attrs_mut(kbd).add_class("kbd");
        let code = doc.add_with_text(para, Tag::Literal, "x");
        doc.attrs_mut(code).add_class("code");
        assert_eq!(
            body(&doc),
            "<p><span class=\"docutils literal\">a&lt;b</span><kbd>Ctrl</kbd><code>x</code></p>\n"
        );
    }

    #[test]
    fn test_footnotes() {
        let mut doc = Document::default();
        let para = doc.add(doc.root(), Tag::Paragraph);
        doc.add_text(para, "See");
        let reference = doc.add(para, Tag::FootnoteReference);
        doc.attrs_mut(reference).set("refid", "footnote-1");
        let footnote = doc.add(doc.root(), Tag::Footnote);
        doc.add_with_text(footnote, Tag::Paragraph, "Note.");

        let body = body(&doc);
        assert!(body.contains(
            "<a class=\"footnote-reference brackets\" href=\"#footnote-1\" role=\"doc-noteref\">[1]</a>"
        ));
        assert!(body.contains(
            "<aside class=\"footnote brackets\" id=\"footnote-1\" role=\"doc-footnote\">\n<span class=\"label\">[1]</span>\n<p>Note.</p>\n</aside>\n"
        ));
    }

    #[test]
    fn test_table_colgroup_and_spans() {
        let mut doc = Document::default();
        let table = doc.add(doc.root(), Tag::Table);
        let tgroup = doc.add(table, Tag::Tgroup);
        for width in ["1", "3"] {
            let colspec = doc.add(tgroup, Tag::Colspec);
            doc.attrs_mut(colspec).set("colwidth", width);
        }
        let thead = doc.add(tgroup, Tag::Thead);
        let row = doc.add(thead, Tag::Row);
        let entry = doc.add_with_text(row, Tag::Entry, "H");
        doc.attrs_mut(entry).set("morecols", "1");
        let tbody = doc.add(tgroup, Tag::Tbody);
        let row = doc.add(tbody, Tag::Row);
        doc.add_with_text(row, Tag::Entry, "a");
        doc.add_with_text(row, Tag::Entry, "b");

        let body = body(&doc);
        assert!(body.starts_with("<table id=\"table-1\">\n<colgroup>\n"));
        assert!(body.contains("<col style=\"width: 25%\" />\n<col style=\"width: 75%\" />\n"));
        assert!(body.contains("<th colspan=\"2\">H</th>"));
        assert!(body.contains("<td>a</td>\n<td>b</td>\n"));
    }

    #[test]
    fn test_contents_topic_sets_body_class() {
        let mut doc = Document::default();
        let topic = doc.add(doc.root(), Tag::Topic);
        doc.attrs_mut(topic).add_class("contents");
        doc.add_with_text(topic, Tag::Title, "Contents");
        let parts = translate(&doc, &Settings::default());
        assert!(parts.get("body").unwrap().starts_with(
            "<nav class=\"contents\" id=\"contents\" role=\"doc-toc\">\n<p class=\"topic-title\">Contents</p>\n"
        ));
        assert!(parts.get("body_prefix").unwrap().contains("<body class=\"with-toc\">"));
    }

    #[test]
    fn test_system_message_report_level() {
        let mut doc = Document::default();
        let message = doc.add(doc.root(), Tag::SystemMessage);
        doc.attrs_mut(message).set("level", "1");
        doc.add_with_text(message, Tag::Paragraph, "info only");
        assert_eq!(body(&doc), "");

        doc.attrs_mut(message).set("level", "3");
        doc.attrs_mut(message).set("line", "4");
        assert_eq!(
            body(&doc),
            "<aside class=\"system-message\">\n<p class=\"system-message-title\">System Message: ERROR/3 (<span class=\"docutils literal\">&lt;string&gt;</span>, line 4)</p>\n<p>info only</p>\n</aside>\n"
        );
    }

    #[test]
    fn test_unknown_node_lenient_and_strict() {
        let mut doc = Document::default();
        let blink = doc.add(doc.root(), Tag::from_name("blink"));
        doc.add_with_text(blink, Tag::Paragraph, "inside");
        assert_eq!(body(&doc), "<p>inside</p>\n");

        let err = Html5Writer::new()
            .translate(&doc, &Settings::default().with_strict_visitor(true))
            .unwrap_err();
        assert!(matches!(err, Error::Walk { ref tag, .. } if tag == "blink"));
    }

    #[test]
    fn test_admonition_generated_title() {
        let mut doc = Document::default();
        let note = doc.add(doc.root(), Tag::Admonition);
        doc.attrs_mut(note).add_class("note");
        doc.add_with_text(note, Tag::Paragraph, "Careful.");
        assert_eq!(
            body(&doc),
            "<aside class=\"admonition note\">\n<p class=\"admonition-title\">Note</p>\n<p>Careful.</p>\n</aside>\n"
        );
    }

    #[test]
    fn test_block_container_tag() {
        let mut doc = Document::default();
        let container = doc.add(doc.root(), Tag::Container);
        doc.attrs_mut(container).add_class("del");
        doc.add_with_text(container, Tag::Paragraph, "gone");
        assert_eq!(body(&doc), "<del>\n<p>gone</p>\n</del>\n");
    }

    #[test]
    fn test_attribute_order_is_sorted() {
        let mut doc = Document::default();
        let para = doc.add(doc.root(), Tag::Paragraph);
        let reference = doc.add_with_text(para, Tag::Reference, "site");
        doc.attrs_mut(reference).set("refuri", "https://example.org/?a=1&b=2");
        assert_eq!(
            body(&doc),
            "<p><a class=\"reference external\" href=\"https://example.org/?a=1&amp;b=2\">site</a></p>\n"
        );
    }

    #[test]
    fn test_comment_and_transition() {
        let mut doc = Document::default();
        doc.add_with_text(doc.root(), Tag::Comment, "a -- b");
        doc.add(doc.root(), Tag::Transition);
        assert_eq!(body(&doc), "<!-- a - - b -->\n<hr class=\"docutils\" />\n");
    }

    #[test]
    fn test_comment_cannot_close_early() {
        let mut doc = Document::default();
        doc.add_with_text(doc.root(), Tag::Comment, "x ---><b>bold</b>");
        let html = body(&doc);
        assert_eq!(html, "<!-- x - - -><b>bold</b> -->\n");
        assert_eq!(html.matches("-->").count(), 1);
        assert!(html.ends_with(" -->\n"));
    }
}

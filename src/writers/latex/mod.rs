//! LaTeX writer.
//!
//! Output targets pdflatex with `hyperref`. Packages are only requested when
//! the document needs them (`longtable` for tables, `graphicx` for images,
//! `alltt` for literal blocks, ...), and every `\DU*` macro used in the body
//! gets a `\providecommand` fallback in the preamble, so a user stylesheet
//! can override any of them.
//!
//! Like the HTML writer, everything is rendered into `body` and relocated
//! through checkpoint/splice: the document title, authors and date become
//! `titledata`, the remaining bibliographic fields become `docinfo`, and
//! `header`/`footer` content moves around the body. Table heads are spliced
//! out and replayed for `\endfirsthead` and `\endhead`.

mod escape;
mod table;
mod template;

use percent_encoding::percent_decode_str;

pub use escape::{Escaped, Mode, encode, escape, url};
use table::Table;
use template::{Buffers, Fallback, Requirement};

use crate::diagnostics::{Diagnostic, Level};
use crate::error::{Error, Result};
use crate::nodes::{Document, NodeRef, Tag};
use crate::settings::{Settings, TableStyle};
use crate::visit::{UnknownPolicy, Visit, Visitor, walk};
use crate::writers::{
    ContextStack, DocumentIndex, Frame, Parts, Translator, Writer, line_of, message_level,
    raw_targets, run, system_message_tree,
};

/// Sectioning commands of classes without chapters.
const SECTIONS: [&str; 5] = [
    "section",
    "subsection",
    "subsubsection",
    "paragraph",
    "subparagraph",
];

/// Document classes whose top level is `\chapter`.
const CHAPTER_CLASSES: [&str; 5] = ["book", "report", "memoir", "scrbook", "scrreprt"];

/// `enumerate` counters by nesting depth.
const COUNTERS: [&str; 4] = ["enumi", "enumii", "enumiii", "enumiv"];

/// Classes consumed by the table layout rather than wrapped in `DUclass`.
const TABLE_CLASSES: [&str; 3] = ["borderless", "booktabs", "colwidths-auto"];

// ============================================================================
// Writer
// ============================================================================

/// Writer for LaTeX output.
#[derive(Debug, Clone, Default)]
pub struct LatexWriter;

impl LatexWriter {
    pub fn new() -> Self {
        Self
    }
}

/// Format names handled by the LaTeX writer.
const FORMATS: &[&str] = &["latex", "latex2e", "tex"];

impl Writer for LatexWriter {
    fn name(&self) -> &'static str {
        "latex"
    }

    fn supported(&self) -> &'static [&'static str] {
        FORMATS
    }

    fn translate(&self, doc: &Document, settings: &Settings) -> Result<Parts> {
        settings.validate()?;
        run(self.name(), doc, LatexTranslator::new(doc, settings))
    }
}

// ============================================================================
// Translator
// ============================================================================

/// Visitor rendering one document into LaTeX buffers.
pub struct LatexTranslator<'a> {
    doc: &'a Document,
    settings: &'a Settings,
    index: DocumentIndex,
    out: Buffers,
    context: ContextStack,
    section_level: u32,
    /// Open tables, innermost last.
    tables: Vec<Table>,
    enum_depth: usize,
    /// Inside a literal block: text keeps brackets and spacing.
    verbatim: u32,
    /// Title and subtitle markup with their labels, for `\title`.
    title_parts: Vec<String>,
    pdftitle: Option<String>,
    authors: Vec<String>,
    date: Option<String>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> LatexTranslator<'a> {
    pub fn new(doc: &'a Document, settings: &'a Settings) -> Self {
        Self {
            doc,
            settings,
            index: DocumentIndex::build(doc),
            out: Buffers::new(settings),
            context: ContextStack::new(),
            section_level: 0,
            tables: Vec::new(),
            enum_depth: 0,
            verbatim: 0,
            title_parts: Vec::new(),
            pdftitle: None,
            authors: Vec::new(),
            date: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn section_level(&self) -> u32 {
        self.section_level
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn source_label(&self) -> &str {
        self.settings.source_label(self.doc.source())
    }

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

    /// `%\n  \label{id}` for every id of `node`.
    fn labels(&self, node: NodeRef<'_>) -> String {
        self.ids_for(node)
            .iter()
            .map(|id| format!("%\n  \\label{{{id}}}"))
            .collect()
    }

    fn push(&mut self, fragment: impl Into<String>) {
        self.out.body.push(fragment);
    }

    fn open(&mut self, start: impl Into<String>, close: impl Into<String>) -> Result<Visit> {
        let start = start.into();
        if !start.is_empty() {
            self.out.body.push(start);
        }
        self.context.push(Frame::Close(close.into()));
        Ok(Visit::Continue)
    }

    fn transparent(&mut self) -> Result<Visit> {
        self.context.push(Frame::Empty);
        Ok(Visit::Continue)
    }

    fn checkpoint(&mut self) -> Result<Visit> {
        self.context.push(Frame::Splice(self.out.body.checkpoint()));
        Ok(Visit::Continue)
    }

    /// Pop a checkpoint frame and return what was rendered since.
    fn splice(&mut self) -> Result<String> {
        let checkpoint = self.context.pop_checkpoint()?;
        let fragments = self.out.body.splice(checkpoint)?;
        log::trace!("latex: spliced {} fragments", fragments.len());
        Ok(fragments.concat())
    }

    fn close(&mut self) -> Result<()> {
        let markup = self.context.pop_close()?;
        if !markup.is_empty() {
            self.out.body.push(markup);
        }
        Ok(())
    }

    /// Escape text for the current context, noting `textcomp` use.
    fn encode(&mut self, text: &str) -> String {
        let mode = if self.verbatim > 0 {
            Mode::Verbatim
        } else {
            Mode::Text
        };
        let escaped = escape(text, mode);
        if escaped.textcomp {
            self.out.requirements.insert(Requirement::Textcomp);
        }
        escaped.text.into_owned()
    }

    /// Wrap the node in one `DUclass` environment per class.
    fn open_classes(&mut self, classes: &[&str], trailing: &str) -> Result<Visit> {
        if classes.is_empty() {
            return self.transparent();
        }
        self.out.fallbacks.insert(Fallback::Class);
        let start: String = classes
            .iter()
            .map(|class| format!("\n\\begin{{DUclass}}{{{class}}}"))
            .collect();
        let close = "\\end{DUclass}\n".repeat(classes.len());
        self.open(format!("{start}{trailing}"), close)
    }

    /// Record a recovered problem and render it in place as a system message.
    fn report(&mut self, node: NodeRef<'_>, level: Level, message: String) -> Result<()> {
        let line = line_of(node);
        let diagnostic = Diagnostic::new(level, message.clone(), self.source_label()).with_line(line);
        log::warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);

        let fallback = system_message_tree(self.source_label(), level, line, &message);
        match fallback.children(fallback.root()).next() {
            Some(message_node) => walk(&fallback, message_node, self),
            None => Err(Error::Invariant("empty fallback tree".to_string())),
        }
    }

    // ------------------------------------------------------------------------
    // Document structure
    // ------------------------------------------------------------------------

    fn section_commands(&self) -> &'static [&'static str] {
        const WITH_CHAPTER: [&str; 6] = [
            "chapter",
            "section",
            "subsection",
            "subsubsection",
            "paragraph",
            "subparagraph",
        ];
        if CHAPTER_CLASSES.contains(&self.settings.documentclass.as_str()) {
            &WITH_CHAPTER
        } else {
            &SECTIONS
        }
    }

    fn visit_section(&mut self) -> Result<Visit> {
        self.section_level += 1;
        self.out.requirements.insert(Requirement::Secnumdepth);
        self.transparent()
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
            Some(Tag::Document) | Some(Tag::Table) => self.checkpoint(),
            Some(Tag::Section) => {
                let labels = node.parent().map(|s| self.labels(s)).unwrap_or_default();
                let depth = self.section_level.saturating_sub(1) as usize;
                match self.section_commands().get(depth) {
                    Some(command) => {
                        self.open(format!("\n\n\\{command}{{"), format!("{labels}%\n}}\n"))
                    }
                    None => {
                        self.out.fallbacks.insert(Fallback::Title);
                        self.open("\n\\DUtitle{", format!("}}{}\n", labels.replace("%\n  ", "")))
                    }
                }
            }
            _ => {
                self.out.fallbacks.insert(Fallback::Title);
                self.open("\n\\DUtitle{", "}\n")
            }
        }
    }

    fn depart_title(&mut self, node: NodeRef<'_>) -> Result<()> {
        match node.parent_tag() {
            Some(Tag::Document) => {
                let markup = self.splice()?;
                let labels = node.parent().map(|d| self.labels(d)).unwrap_or_default();
                self.out.title = markup.clone();
                self.title_parts.insert(0, format!("{markup}{labels}"));
                let text = encode(&node.astext()).into_owned();
                self.pdftitle.get_or_insert(text);
                Ok(())
            }
            Some(Tag::Table) => {
                let caption = self.splice()?;
                if let Some(table) = self.tables.last_mut() {
                    table.caption = Some(caption);
                }
                Ok(())
            }
            _ => self.close(),
        }
    }

    fn visit_subtitle(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        if node.parent_tag() == Some(&Tag::Document) {
            return self.checkpoint();
        }
        self.open("\n\\textit{", "}\n")
    }

    fn depart_subtitle(&mut self, node: NodeRef<'_>) -> Result<()> {
        if node.parent_tag() != Some(&Tag::Document) {
            return self.close();
        }
        let markup = self.splice()?;
        self.out.fallbacks.insert(Fallback::DocumentSubtitle);
        self.out.subtitle = markup.clone();
        let labels = self.labels(node);
        self.title_parts
            .push(format!("\\DUdocumentsubtitle{{{markup}}}{labels}"));
        Ok(())
    }

    /// Move a header or footer out of the body.
    fn depart_decoration(&mut self, node: NodeRef<'_>) -> Result<()> {
        let content = self.splice()?;
        if node.tag() == &Tag::Header {
            self.out.header.push(content);
        } else {
            self.out.footer.push(content);
        }
        Ok(())
    }

    fn in_docinfo(node: NodeRef<'_>) -> bool {
        node.ancestor(&Tag::Docinfo).is_some()
    }

    fn depart_docinfo(&mut self) -> Result<()> {
        let items = self.splice()?;
        if !items.trim().is_empty() {
            self.out
                .docinfo
                .push(format!("\n\\begin{{description}}{items}\\end{{description}}\n"));
        }
        Ok(())
    }

    fn visit_bibliographic(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        if !Self::in_docinfo(node) {
            return match node.tag() {
                Tag::Authors => self.transparent(),
                _ => self.open("\n", "\n"),
            };
        }
        match node.tag() {
            Tag::Author | Tag::Date => self.checkpoint(),
            Tag::Authors => self.transparent(),
            other => {
                let label = match other {
                    Tag::Organization => "Organization",
                    Tag::Copyright => "Copyright",
                    _ => other.name(),
                };
                self.open(format!("\n\\item[{{{label}:}}] "), "\n")
            }
        }
    }

    fn depart_bibliographic(&mut self, node: NodeRef<'_>) -> Result<()> {
        if !Self::in_docinfo(node) {
            return self.close();
        }
        match node.tag() {
            Tag::Author => {
                let author = self.splice()?;
                self.authors.push(author);
                Ok(())
            }
            Tag::Date => {
                self.date = Some(self.splice()?);
                Ok(())
            }
            _ => self.close(),
        }
    }

    // ------------------------------------------------------------------------
    // Body elements
    // ------------------------------------------------------------------------

    fn visit_text(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let text = self.encode(node.text());
        self.push(text);
        Ok(Visit::SkipNode)
    }

    fn in_auto_table(&self, node: NodeRef<'_>) -> bool {
        node.parent_tag() == Some(&Tag::Entry) && self.tables.last().is_some_and(|t| t.auto)
    }

    /// Separator in front of a paragraph.
    fn paragraph_leading(&self, node: NodeRef<'_>) -> &'static str {
        let first = node.index() == 0;
        if self.in_auto_table(node) {
            return if first { "" } else { "\n" };
        }
        let previous = previous_sibling(node);
        match node.parent() {
            Some(parent) if matches!(parent.tag(), Tag::Footnote | Tag::Citation) => {
                match previous {
                    None => "%\n",
                    Some(p) if p.tag() == &Tag::Label => "%\n",
                    Some(_) => "\n",
                }
            }
            Some(parent)
                if first
                    && matches!(
                        parent.tag(),
                        Tag::ListItem | Tag::FieldBody | Tag::Definition
                    ) =>
            {
                ""
            }
            Some(parent)
                if first
                    && parent.tag() == &Tag::Container
                    && !parent.attrs().classes().is_empty() =>
            {
                ""
            }
            _ => "\n",
        }
    }

    fn visit_paragraph(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let leading = self.paragraph_leading(node);
        let trailing = if self.in_auto_table(node) { "" } else { "\n" };
        self.open(leading, trailing)
    }

    fn visit_literal_block(&mut self) -> Result<Visit> {
        self.out.requirements.insert(Requirement::Alltt);
        self.verbatim += 1;
        self.open(
            "\n\\begin{quote}\n\\begin{alltt}\n",
            "\n\\end{alltt}\n\\end{quote}\n",
        )
    }

    fn depart_literal_block(&mut self) -> Result<()> {
        self.close()?;
        self.verbatim = self.verbatim.saturating_sub(1);
        Ok(())
    }

    fn visit_raw(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        if !raw_targets(node, FORMATS) {
            return Ok(Visit::SkipNode);
        }
        if node.parent_tag().is_some_and(Tag::is_text_element) {
            self.push(node.astext());
        } else {
            self.push(format!("\n{}\n", node.astext()));
        }
        Ok(Visit::SkipNode)
    }

    fn visit_reference(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        if let Some(uri) = node.get_attr("refuri") {
            let text = node.astext();
            if text == uri || format!("mailto:{text}") == uri {
                self.push(format!("\\url{{{}}}", url(&text)));
                return Ok(Visit::SkipNode);
            }
            return self.open(format!("\\href{{{}}}{{", url(uri)), "}");
        }
        if let Some(target) = node.get_attr("refid").or_else(|| node.get_attr("refname")) {
            let anchor = self.index.anchor_for(target).unwrap_or(target).to_string();
            return self.open(format!("\\hyperref[{anchor}]{{"), "}");
        }
        self.transparent()
    }

    fn visit_target(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let attrs = node.attrs();
        if attrs.contains("refuri") || attrs.contains("refid") || attrs.contains("refname") {
            return self.transparent();
        }
        let labels: String = self
            .ids_for(node)
            .iter()
            .map(|id| format!("\\label{{{id}}}"))
            .collect();
        if labels.is_empty() {
            return self.transparent();
        }
        if node.parent_tag().is_some_and(Tag::is_text_element) {
            self.open(format!("\\phantomsection{labels}"), "")
        } else {
            self.open(format!("\n\\phantomsection{labels}\n"), "")
        }
    }

    fn visit_inline(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let classes = node.attrs().classes();
        if classes.is_empty() {
            return self.transparent();
        }
        self.out.fallbacks.insert(Fallback::Role);
        let start: String = classes
            .iter()
            .map(|class| format!("\\DUrole{{{class}}}{{"))
            .collect();
        self.open(start, "}".repeat(classes.len()))
    }

    fn visit_problematic(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        match node.get_attr("refid") {
            Some(refid) => {
                let anchor = self.index.anchor_for(refid).unwrap_or(refid).to_string();
                self.open(format!("\\hyperref[{anchor}]{{\\textbf{{"), "}}")
            }
            None => self.open("\\textbf{", "}"),
        }
    }

    fn visit_image(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let Some(uri) = node.get_attr("uri").filter(|uri| !uri.is_empty()) else {
            self.report(node, Level::Error, "Image without \"uri\" attribute.".to_string())?;
            return Ok(Visit::SkipNode);
        };
        self.out.requirements.insert(Requirement::Graphicx);
        let path = percent_decode_str(uri).decode_utf8_lossy();
        let command = if self.out.svg && path.to_ascii_lowercase().ends_with(".svg") {
            "includesvg"
        } else {
            "includegraphics"
        };

        let mut options = Vec::new();
        for key in ["width", "height"] {
            if let Some(value) = node.get_attr(key) {
                options.push(format!("{key}={}", latex_length(value)));
            }
        }
        if let Some(scale) = node.attrs().get_u32("scale") {
            options.push(format!("scale={}", f64::from(scale) / 100.0));
        }
        let options = if options.is_empty() {
            String::new()
        } else {
            format!("[{}]", options.join(","))
        };
        let mut markup = format!("\\{command}{options}{{{path}}}");

        if node.parent_tag().is_some_and(Tag::is_text_element) {
            self.push(markup);
            return Ok(Visit::SkipNode);
        }
        let align = match node.get_attr("align") {
            Some("left") => Some("l"),
            Some("center") => Some("c"),
            Some("right") => Some("r"),
            _ => None,
        };
        if let Some(align) = align
            && node.parent_tag() != Some(&Tag::Figure)
        {
            markup = format!("\\noindent\\makebox[\\linewidth][{align}]{{{markup}}}");
        }
        self.push(format!("\n{markup}\n"));
        Ok(Visit::SkipNode)
    }

    fn visit_figure(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let mut start = String::from("\n\\begin{figure}\n");
        if node.get_attr("align").is_none_or(|align| align == "center") {
            start.push_str("\\centering");
        }
        self.open(start, "\\end{figure}\n")
    }

    fn visit_caption(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        if node.parent_tag() == Some(&Tag::Figure) {
            let labels: String = node
                .parent()
                .map(|figure| self.ids_for(figure))
                .unwrap_or_default()
                .iter()
                .map(|id| format!("\\label{{{id}}}"))
                .collect();
            return self.open("\n\\caption{", format!("}}{labels}\n"));
        }
        self.open("\n", "\n")
    }

    // ------------------------------------------------------------------------
    // Lists
    // ------------------------------------------------------------------------

    fn visit_enumerated_list(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        self.enum_depth += 1;
        let counter = COUNTERS[(self.enum_depth - 1).min(COUNTERS.len() - 1)];
        let mut start = String::from("\n\\begin{enumerate}");

        let style = match node.get_attr("enumtype").unwrap_or("arabic") {
            "loweralpha" => "alph",
            "upperalpha" => "Alph",
            "lowerroman" => "roman",
            "upperroman" => "Roman",
            _ => "arabic",
        };
        let prefix = node.get_attr("prefix").unwrap_or("");
        let suffix = node.get_attr("suffix").unwrap_or(".");
        if style != "arabic" || !prefix.is_empty() || suffix != "." {
            start.push_str(&format!(
                "\n\\renewcommand{{\\label{counter}}}{{{}\\{style}{{{counter}}}{}}}",
                encode(prefix),
                encode(suffix)
            ));
        }
        if let Some(first) = node.attrs().get_u32("start")
            && first > 1
        {
            start.push_str(&format!("\n\\setcounter{{{counter}}}{{{}}}", first - 1));
        }
        self.open(start, "\\end{enumerate}\n")
    }

    fn depart_enumerated_list(&mut self) -> Result<()> {
        self.close()?;
        self.enum_depth = self.enum_depth.saturating_sub(1);
        Ok(())
    }

    fn visit_line_block(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        self.out.fallbacks.insert(Fallback::LineBlock);
        if node.parent_tag() == Some(&Tag::LineBlock) {
            self.open(
                "\\item[]\n\\begin{DUlineblock}{1.5em}\n",
                "\\end{DUlineblock}\n",
            )
        } else {
            self.open("\n\\begin{DUlineblock}{0em}\n", "\\end{DUlineblock}\n")
        }
    }

    fn visit_line(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        if node.first_child().is_none() {
            self.push("\\item[]\n");
            return Ok(Visit::SkipNode);
        }
        self.open("\\item[] ", "\n")
    }

    // ------------------------------------------------------------------------
    // Tables
    // ------------------------------------------------------------------------

    fn visit_table(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        self.out.requirements.insert(Requirement::Longtable);
        self.tables.push(Table::new(node, self.settings.table_style));
        let classes: Vec<&str> = node
            .attrs()
            .classes()
            .iter()
            .map(String::as_str)
            .filter(|class| !TABLE_CLASSES.contains(class))
            .collect();
        self.open_classes(&classes, "")
    }

    fn depart_table(&mut self) -> Result<()> {
        self.close()?;
        self.tables
            .pop()
            .map(|_| ())
            .ok_or_else(|| Error::Invariant("table stack empty".to_string()))
    }

    fn current_table(&mut self) -> Result<&mut Table> {
        self.tables
            .last_mut()
            .ok_or_else(|| Error::Invariant("table part outside a table".to_string()))
    }

    fn visit_tgroup(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let table = self.current_table()?;
        table.set_columns(node);
        let (begin, end, booktabs) = (
            table.begin(),
            table.end(),
            table.style == TableStyle::Booktabs,
        );
        if booktabs {
            self.out.requirements.insert(Requirement::Booktabs);
        }
        self.open(begin, end)
    }

    fn visit_thead(&mut self) -> Result<Visit> {
        self.current_table()?.in_head = true;
        self.checkpoint()
    }

    /// Replay the head rows for the first page and the continuation pages.
    fn depart_thead(&mut self) -> Result<()> {
        let rows = self.splice()?;
        let table = self.current_table()?;
        table.in_head = false;
        let head = format!("{rows}{}", table.head_rule());
        let markup = format!(
            "{head}\\endfirsthead\n{}{head}\\endhead\n{}",
            table.top_rule(),
            table.continued_footer()
        );
        self.push(markup);
        Ok(())
    }

    fn visit_row(&mut self) -> Result<Visit> {
        let table = self.current_table()?;
        table.column = 0;
        let close = format!(" \\\\\n{}", table.row_rule());
        self.open("", close)
    }

    fn visit_entry(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let span = node.attrs().get_u32("morecols").unwrap_or(0) as usize + 1;
        let has_content = node.first_child().is_some();
        let table = self.current_table()?;
        let mut start = String::new();
        let mut close = String::new();
        if table.column > 0 {
            start.push_str(" & ");
        }
        if span > 1 {
            start.push_str(&format!(
                "\\multicolumn{{{span}}}{{{}}}{{",
                table.multicolumn(table.column, span, true)
            ));
            close.push('}');
        }
        if table.in_head && has_content {
            start.push_str("\\textbf{%");
            close.insert(0, '}');
        }
        table.column += span;
        self.open(start, close)
    }

    // ------------------------------------------------------------------------
    // Notes, topics and admonitions
    // ------------------------------------------------------------------------

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
        encode(&label).into_owned()
    }

    fn visit_footnote(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        self.out.fallbacks.insert(Fallback::Footnotes);
        let id = self.ids_for(node).into_iter().next().unwrap_or_default();
        let backref = node
            .get_attr("backrefs")
            .and_then(|b| b.split_whitespace().next())
            .filter(|_| self.settings.footnote_backlinks)
            .map(str::to_string)
            .unwrap_or_else(|| id.clone());
        let label = self.note_label(node);
        self.open(
            format!("%\n\\DUfootnotetext{{{id}}}{{{backref}}}{{{label}}}{{"),
            "}\n",
        )
    }

    fn visit_footnote_reference(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        self.out.fallbacks.insert(Fallback::Footnotes);
        let own = self.ids_for(node).into_iter().next().unwrap_or_default();
        let target = node.get_attr("refid").or_else(|| node.get_attr("refname"));
        let anchor = target
            .map(|t| self.index.anchor_for(t).unwrap_or(t))
            .unwrap_or_default()
            .to_string();
        let text = node.astext();
        let label = if text.is_empty() {
            target
                .and_then(|t| self.index.label_for(t))
                .unwrap_or("?")
                .to_string()
        } else {
            text
        };
        self.push(format!(
            "\\DUfootnotemark{{{own}}}{{{anchor}}}{{{}}}",
            encode(&label)
        ));
        Ok(Visit::SkipNode)
    }

    fn visit_citation(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let label = self.note_label(node);
        let anchors: String = self
            .ids_for(node)
            .iter()
            .map(|id| format!("\\label{{{id}}}"))
            .collect();
        self.open(
            format!("\n\\begin{{description}}\n\\item[{{[{label}]}}] \\phantomsection{anchors}"),
            "\\end{description}\n",
        )
    }

    fn visit_citation_reference(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let text = encode(&node.astext()).into_owned();
        match node.get_attr("refid").or_else(|| node.get_attr("refname")) {
            Some(target) => {
                let anchor = self.index.anchor_for(target).unwrap_or(target).to_string();
                self.push(format!("\\hyperref[{anchor}]{{[{text}]}}"));
            }
            None => self.push(format!("[{text}]")),
        }
        Ok(Visit::SkipNode)
    }

    fn visit_topic(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        if !node.has_class("contents") {
            let mut classes: Vec<&str> = vec!["topic"];
            classes.extend(node.attrs().classes().iter().map(String::as_str));
            return self.open_classes(&classes, "");
        }
        let id = self.ids_for(node).into_iter().next().unwrap_or_default();
        let title = node
            .children()
            .find(|c| c.tag() == &Tag::Title)
            .map(|t| t.astext())
            .unwrap_or_else(|| "Contents".to_string());
        let mut markup = format!(
            "\n\\phantomsection\\label{{{id}}}\n\\pdfbookmark[1]{{{}}}{{{id}}}\n",
            encode(&title)
        );
        if let Some(depth) = node.attrs().get_u32("depth") {
            let offset = u32::from(self.section_commands()[0] == "chapter");
            markup.push_str(&format!(
                "\\setcounter{{tocdepth}}{{{}}}\n",
                depth.saturating_sub(offset)
            ));
        }
        markup.push_str("\\tableofcontents\n");
        self.push(markup);
        Ok(Visit::SkipNode)
    }

    fn visit_admonition(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let mut classes: Vec<&str> = vec!["admonition"];
        classes.extend(node.attrs().classes().iter().map(String::as_str));
        let visit = self.open_classes(&classes, "")?;
        let has_title = node.children().any(|c| c.tag() == &Tag::Title);
        if !has_title && let Some(kind) = node.attrs().classes().first() {
            self.out.fallbacks.insert(Fallback::Title);
            let title = capitalize(kind);
            self.push(format!("\n\\DUtitle{{{}}}\n", encode(&title)));
        }
        Ok(visit)
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
            "System Message: {}/{} ({}",
            level.name(),
            level.number(),
            encode(&source)
        );
        if let Some(line) = node.line() {
            title.push_str(&format!(", line {line}"));
        }
        title.push(')');
        self.out.fallbacks.insert(Fallback::Title);
        self.open_classes(&["system-message"], &format!("\n\\DUtitle{{{title}}}\n"))
    }

    fn visit_comment(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let text = node.astext();
        let lines: String = text.lines().map(|line| format!("% {line}\n")).collect();
        self.push(format!("\n{lines}"));
        Ok(Visit::SkipNode)
    }
}

impl Visitor for LatexTranslator<'_> {
    fn enter(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        match node.tag() {
            Tag::Document | Tag::Decoration | Tag::Tbody => self.transparent(),
            Tag::Section => self.visit_section(),
            Tag::Title => self.visit_title(node),
            Tag::Subtitle => self.visit_subtitle(node),
            Tag::Paragraph => self.visit_paragraph(node),
            Tag::Text => self.visit_text(node),
            Tag::Emphasis => self.open("\\emph{", "}"),
            Tag::Strong => self.open("\\textbf{", "}"),
            Tag::Literal => self.open("\\texttt{", "}"),
            Tag::Subscript => self.open("\\textsubscript{", "}"),
            Tag::Superscript => self.open("\\textsuperscript{", "}"),
            Tag::TitleReference => self.open("\\textit{", "}"),
            Tag::Abbreviation => self.transparent(),
            Tag::LiteralBlock => self.visit_literal_block(),
            Tag::Raw => self.visit_raw(node),
            Tag::Reference => self.visit_reference(node),
            Tag::Target => self.visit_target(node),
            Tag::Image => self.visit_image(node),
            Tag::Figure => self.visit_figure(node),
            Tag::Caption => self.visit_caption(node),
            Tag::Legend => self.transparent(),
            Tag::BulletList => self.open("\n\\begin{itemize}", "\\end{itemize}\n"),
            Tag::EnumeratedList => self.visit_enumerated_list(node),
            Tag::ListItem => self.open("\n\\item ", ""),
            Tag::DefinitionList | Tag::FieldList => {
                self.open("\n\\begin{description}", "\\end{description}\n")
            }
            Tag::DefinitionListItem
            | Tag::Definition
            | Tag::Field
            | Tag::FieldBody => self.transparent(),
            Tag::Term => self.open("\n\\item[{", "}] "),
            Tag::FieldName => self.open("\n\\item[{", ":}] "),
            Tag::BlockQuote => self.open("\n\\begin{quote}", "\\end{quote}\n"),
            Tag::Attribution => self.open("\n\\nopagebreak\n\n\\raggedleft \u{2014}", "\n"),
            Tag::Table => self.visit_table(node),
            Tag::Tgroup => self.visit_tgroup(node),
            Tag::Thead => self.visit_thead(),
            Tag::Row => self.visit_row(),
            Tag::Entry => self.visit_entry(node),
            Tag::Colspec | Tag::Label | Tag::Meta | Tag::SubstitutionDefinition => {
                Ok(Visit::SkipNode)
            }
            Tag::Footnote => self.visit_footnote(node),
            Tag::FootnoteReference => self.visit_footnote_reference(node),
            Tag::Citation => self.visit_citation(node),
            Tag::CitationReference => self.visit_citation_reference(node),
            Tag::Header | Tag::Footer | Tag::Docinfo => self.checkpoint(),
            Tag::Author
            | Tag::Authors
            | Tag::Organization
            | Tag::Date
            | Tag::Copyright => self.visit_bibliographic(node),
            Tag::Topic => self.visit_topic(node),
            Tag::Sidebar => {
                let mut classes: Vec<&str> = vec!["sidebar"];
                classes.extend(node.attrs().classes().iter().map(String::as_str));
                self.open_classes(&classes, "")
            }
            Tag::Rubric => self.open("\n\\subsubsection*{", "}\n"),
            Tag::Container => {
                let classes: Vec<&str> =
                    node.attrs().classes().iter().map(String::as_str).collect();
                self.open_classes(&classes, "\n")
            }
            Tag::Inline => self.visit_inline(node),
            Tag::Admonition => self.visit_admonition(node),
            Tag::SystemMessage => self.visit_system_message(node),
            Tag::Problematic => self.visit_problematic(node),
            Tag::Comment => self.visit_comment(node),
            Tag::Transition => {
                self.out.fallbacks.insert(Fallback::Transition);
                self.push("\n\\DUtransition\n");
                Ok(Visit::SkipNode)
            }
            Tag::LineBlock => self.visit_line_block(node),
            Tag::Line => self.visit_line(node),
            Tag::Other(_) => self.enter_unknown(node),
        }
    }

    fn leave(&mut self, node: NodeRef<'_>) -> Result<()> {
        match node.tag() {
            Tag::Section => self.depart_section(),
            Tag::Title => self.depart_title(node),
            Tag::Subtitle => self.depart_subtitle(node),
            Tag::Header | Tag::Footer => self.depart_decoration(node),
            Tag::Docinfo => self.depart_docinfo(),
            Tag::Author | Tag::Date => self.depart_bibliographic(node),
            Tag::LiteralBlock => self.depart_literal_block(),
            Tag::EnumeratedList => self.depart_enumerated_list(),
            Tag::Table => self.depart_table(),
            Tag::Thead => self.depart_thead(),
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

impl Translator for LatexTranslator<'_> {
    fn context_depth(&self) -> usize {
        self.context.depth()
    }

    fn finish(mut self) -> Result<Parts> {
        self.context.ensure_empty()?;
        if self.section_level != 0 {
            return Err(Error::Invariant(format!(
                "section level {} after walk",
                self.section_level
            )));
        }
        if !self.tables.is_empty() {
            return Err(Error::Invariant("table left open after walk".to_string()));
        }

        if let Some(title) = &self.settings.title {
            self.pdftitle = Some(encode(title).into_owned());
        }
        if !self.title_parts.is_empty() || !self.authors.is_empty() || self.date.is_some() {
            self.out.titledata = format!(
                "\\title{{{}}}\n\\author{{{}}}\n\\date{{{}}}\n",
                self.title_parts.join("%\n  \\\\%\n  "),
                self.authors.join(" \\and "),
                self.date.as_deref().unwrap_or_default()
            );
            self.out.body_pre_docinfo.push("\\maketitle\n");
        }
        if let Some(title) = &self.pdftitle {
            self.out.pdfinfo.push(format!("pdftitle={{{title}}}"));
        }
        if !self.authors.is_empty() {
            self.out
                .pdfinfo
                .push(format!("pdfauthor={{{}}}", self.authors.join("; ")));
        }

        let mut parts = template::assemble(&self.out, self.settings);
        parts.set_diagnostics(self.diagnostics);
        Ok(parts)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn previous_sibling(node: NodeRef<'_>) -> Option<NodeRef<'_>> {
    let index = node.index().checked_sub(1)?;
    node.parent()?.children().nth(index)
}

/// Image dimension for `\includegraphics` options.
fn latex_length(value: &str) -> String {
    let value = value.trim();
    if let Some(percent) = value.strip_suffix('%')
        && let Ok(percent) = percent.trim().parse::<f64>()
    {
        return format!("{:.3}\\linewidth", percent / 100.0);
    }
    if let Some(pixels) = value.strip_suffix("px") {
        return format!("{pixels}bp");
    }
    if value.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return format!("{value}bp");
    }
    value.to_string()
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
    use crate::visit::walkabout;

    fn translate(doc: &Document, settings: &Settings) -> Parts {
        LatexWriter::new().translate(doc, settings).unwrap()
    }

    fn body(doc: &Document) -> String {
        translate(doc, &Settings::default())
            .get("body")
            .unwrap()
            .to_string()
    }

    fn table(doc: &mut Document, widths: &[&str], rows: &[&[&str]]) -> crate::nodes::NodeId {
        let table = doc.add(doc.root(), Tag::Table);
        let tgroup = doc.add(table, Tag::Tgroup);
        for width in widths {
            let colspec = doc.add(tgroup, Tag::Colspec);
            doc.attrs_mut(colspec).set("colwidth", *width);
        }
        let tbody = doc.add(tgroup, Tag::Tbody);
        for row in rows {
            let row_id = doc.add(tbody, Tag::Row);
            for cell in *row {
                let entry = doc.add(row_id, Tag::Entry);
                if !cell.is_empty() {
                    doc.add_with_text(entry, Tag::Paragraph, cell);
                }
            }
        }
        table
    }

    #[test]
    fn test_paragraph_and_section() {
        let mut doc = Document::default();
        let section = doc.add(doc.root(), Tag::Section);
        doc.add_with_text(section, Tag::Title, "Intro");
        doc.add_with_text(section, Tag::Paragraph, "100% sure");

        let settings = Settings::default();
        let mut translator = LatexTranslator::new(&doc, &settings);
        walkabout(&doc, &mut translator).unwrap();
        assert_eq!(translator.section_level(), 0);
        assert_eq!(translator.context_depth(), 0);
        let parts = translator.finish().unwrap();

        assert_eq!(
            parts.get("body"),
            Some("\n\n\\section{Intro%\n  \\label{intro}%\n}\n\n100\\% sure\n")
        );
        assert!(
            parts
                .get("requirements")
                .unwrap()
                .ends_with("\\setcounter{secnumdepth}{0}\n")
        );
    }

    #[test]
    fn test_book_uses_chapters() {
        let mut doc = Document::default();
        let section = doc.add(doc.root(), Tag::Section);
        doc.add_with_text(section, Tag::Title, "first chapter");
        let parts = translate(&doc, &Settings::default().with_documentclass("book"));
        assert!(parts.get("body").unwrap().starts_with("\n\n\\chapter{first chapter%"));
        assert_eq!(
            parts.get("head_prefix"),
            Some("\\documentclass[a4paper]{book}\n")
        );
    }

    #[test]
    fn test_deep_sections_fall_back_to_dutitle() {
        let mut doc = Document::default();
        let mut parent = doc.root();
        for level in 0..6 {
            let section = doc.add(parent, Tag::Section);
            doc.add_with_text(section, Tag::Title, &format!("Level {level}"));
            parent = section;
        }
        let parts = translate(&doc, &Settings::default());
        let body = parts.get("body").unwrap();
        assert!(body.contains("\\subparagraph{Level 4%"));
        assert!(body.contains("\n\\DUtitle{Level 5}\\label{level-5}\n"));
        assert!(parts.get("fallbacks").unwrap().contains("\\DUtitle"));
    }

    #[test]
    fn test_bracket_protection_in_items() {
        let mut doc = Document::default();
        let list = doc.add(doc.root(), Tag::BulletList);
        let item = doc.add(list, Tag::ListItem);
        doc.add_with_text(item, Tag::Paragraph, "[no option] to this item");
        assert_eq!(
            body(&doc),
            "\n\\begin{itemize}\n\\item {[}no option{]} to this item\n\\end{itemize}\n"
        );
    }

    #[test]
    fn test_enumerated_lists() {
        let mut doc = Document::default();
        let first = doc.add(doc.root(), Tag::EnumeratedList);
        let item = doc.add(first, Tag::ListItem);
        doc.add_with_text(item, Tag::Paragraph, "Item 1.");
        let item = doc.add(first, Tag::ListItem);
        doc.add_with_text(item, Tag::Paragraph, "Second");

        let quote = doc.add(doc.root(), Tag::BlockQuote);
        let alpha = doc.add(quote, Tag::EnumeratedList);
        doc.attrs_mut(alpha).set("enumtype", "loweralpha");
        doc.attrs_mut(alpha).set("suffix", ")");
        let item = doc.add(alpha, Tag::ListItem);
        doc.add_with_text(item, Tag::Paragraph, "nothing.");

        let third = doc.add(doc.root(), Tag::EnumeratedList);
        doc.attrs_mut(third).set("start", "3");
        let item = doc.add(third, Tag::ListItem);
        doc.add_with_text(item, Tag::Paragraph, "Third is");

        assert_eq!(
            body(&doc),
            "\n\\begin{enumerate}\n\\item Item 1.\n\n\\item Second\n\\end{enumerate}\n\
             \n\\begin{quote}\n\\begin{enumerate}\n\\renewcommand{\\labelenumi}{\\alph{enumi})}\n\\item nothing.\n\\end{enumerate}\n\\end{quote}\n\
             \n\\begin{enumerate}\n\\setcounter{enumi}{2}\n\\item Third is\n\\end{enumerate}\n"
        );
    }

    #[test]
    fn test_nested_enumeration_counter() {
        let mut doc = Document::default();
        let outer = doc.add(doc.root(), Tag::EnumeratedList);
        let item = doc.add(outer, Tag::ListItem);
        let inner = doc.add(item, Tag::EnumeratedList);
        doc.attrs_mut(inner).set("enumtype", "upperroman");
        doc.attrs_mut(inner).set("prefix", "(");
        doc.attrs_mut(inner).set("suffix", ")");
        let item = doc.add(inner, Tag::ListItem);
        doc.add_with_text(item, Tag::Paragraph, "deep");
        assert!(body(&doc).contains("\\renewcommand{\\labelenumii}{(\\Roman{enumii})}"));
    }

    #[test]
    fn test_fixed_width_table() {
        let mut doc = Document::default();
        table(&mut doc, &["5", "5"], &[&["1", "2"], &["3", "4"]]);
        let parts = translate(&doc, &Settings::default());
        assert_eq!(
            parts.get("body"),
            Some(
                "\n\\setlength{\\DUtablewidth}{\\linewidth}%\n\
                 \\begin{longtable*}{|p{0.075\\DUtablewidth}|p{0.075\\DUtablewidth}|}\n\\hline\n\
                 \n1\n & \n2\n \\\\\n\\hline\n\
                 \n3\n & \n4\n \\\\\n\\hline\n\
                 \\end{longtable*}\n"
            )
        );
        assert!(
            parts
                .get("requirements")
                .unwrap()
                .contains("\\usepackage{longtable,ltcaption,array}")
        );
    }

    #[test]
    fn test_captioned_table() {
        let mut doc = Document::default();
        let t = doc.add(doc.root(), Tag::Table);
        doc.add_with_text(t, Tag::Title, "Foo");
        let tgroup = doc.add(t, Tag::Tgroup);
        for _ in 0..2 {
            let colspec = doc.add(tgroup, Tag::Colspec);
            doc.attrs_mut(colspec).set("colwidth", "5");
        }
        let tbody = doc.add(tgroup, Tag::Tbody);
        let row = doc.add(tbody, Tag::Row);
        doc.add(row, Tag::Entry);
        doc.add(row, Tag::Entry);

        assert_eq!(
            body(&doc),
            "\n\\setlength{\\DUtablewidth}{\\linewidth}%\n\
             \\begin{longtable}{|p{0.075\\DUtablewidth}|p{0.075\\DUtablewidth}|}\n\
             \\caption{Foo}\\\\\n\\hline\n &  \\\\\n\\hline\n\\end{longtable}\n"
        );
    }

    #[test]
    fn test_auto_table_booktabs() {
        let mut doc = Document::default();
        let t = table(&mut doc, &["5", "1"], &[&["1", "2"]]);
        doc.attrs_mut(t).add_class("colwidths-auto");
        let settings = Settings::default().with_table_style(TableStyle::Booktabs);
        let parts = translate(&doc, &settings);
        assert_eq!(
            parts.get("body"),
            Some("\n\\begin{longtable*}{ll}\n\\toprule\n1 & 2 \\\\\n\\bottomrule\n\\end{longtable*}\n")
        );
        assert!(
            parts
                .get("requirements")
                .unwrap()
                .contains("\\usepackage{booktabs}\n\\usepackage{longtable")
        );
    }

    #[test]
    fn test_table_head_is_replayed() {
        let mut doc = Document::default();
        let t = doc.add(doc.root(), Tag::Table);
        let tgroup = doc.add(t, Tag::Tgroup);
        for width in ["5", "6"] {
            let colspec = doc.add(tgroup, Tag::Colspec);
            doc.attrs_mut(colspec).set("colwidth", width);
        }
        let thead = doc.add(tgroup, Tag::Thead);
        let row = doc.add(thead, Tag::Row);
        let entry = doc.add(row, Tag::Entry);
        doc.add_with_text(entry, Tag::Paragraph, "Title");
        doc.add(row, Tag::Entry);
        let tbody = doc.add(tgroup, Tag::Tbody);
        let row = doc.add(tbody, Tag::Row);
        let entry = doc.add(row, Tag::Entry);
        doc.add_with_text(entry, Tag::Paragraph, "entry");
        let entry = doc.add(row, Tag::Entry);
        doc.add_with_text(entry, Tag::Paragraph, "value1");

        assert_eq!(
            body(&doc),
            "\n\\setlength{\\DUtablewidth}{\\linewidth}%\n\
             \\begin{longtable*}{|p{0.075\\DUtablewidth}|p{0.086\\DUtablewidth}|}\n\\hline\n\
             \\textbf{%\nTitle\n} &  \\\\\n\\hline\n\\endfirsthead\n\
             \\hline\n\\textbf{%\nTitle\n} &  \\\\\n\\hline\n\\endhead\n\
             \\multicolumn{2}{p{0.16\\DUtablewidth}}{\\raggedleft\\ldots continued on next page}\\\\\n\
             \\endfoot\n\\endlastfoot\n\
             \nentry\n & \nvalue1\n \\\\\n\\hline\n\\end{longtable*}\n"
        );
    }

    #[test]
    fn test_spanning_empty_cell() {
        let mut doc = Document::default();
        let t = table(&mut doc, &["4", "4"], &[&["c3", "c4"]]);
        let tbody = doc
            .descendants(t)
            .find(|&id| doc.get(id).tag() == &Tag::Tbody)
            .unwrap();
        let row = doc.add(tbody, Tag::Row);
        let entry = doc.add(row, Tag::Entry);
        doc.attrs_mut(entry).set("morecols", "1");
        assert!(body(&doc).ends_with(
            " \\\\\n\\hline\n\\multicolumn{2}{|p{0.13\\DUtablewidth}|}{} \\\\\n\\hline\n\\end{longtable*}\n"
        ));
    }

    #[test]
    fn test_table_class_wraps_in_duclass() {
        let mut doc = Document::default();
        let t = table(&mut doc, &["5", "5"], &[&["1", "2"]]);
        doc.attrs_mut(t).add_class("my-class");
        let parts = translate(&doc, &Settings::default());
        let body = parts.get("body").unwrap();
        assert!(body.starts_with("\n\\begin{DUclass}{my-class}\n\\setlength{\\DUtablewidth}"));
        assert!(body.ends_with("\\end{longtable*}\n\\end{DUclass}\n"));
        assert!(parts.get("fallbacks").unwrap().contains("\\newenvironment{DUclass}"));
    }

    #[test]
    fn test_footnote_text() {
        let mut doc = Document::default();
        let footnote = doc.add(doc.root(), Tag::Footnote);
        doc.add_with_text(footnote, Tag::Label, "1");
        doc.add_with_text(footnote, Tag::Paragraph, "paragraph");
        let second = doc.add(doc.root(), Tag::Footnote);
        doc.add_with_text(second, Tag::Label, "2");
        let list = doc.add(second, Tag::EnumeratedList);
        let item = doc.add(list, Tag::ListItem);
        doc.add_with_text(item, Tag::Paragraph, "enumeration");

        let parts = translate(&doc, &Settings::default());
        assert_eq!(
            parts.get("body"),
            Some(
                "%\n\\DUfootnotetext{footnote-1}{footnote-1}{1}{%\nparagraph\n}\n\
                 %\n\\DUfootnotetext{footnote-2}{footnote-2}{2}{\n\\begin{enumerate}\n\\item enumeration\n\\end{enumerate}\n}\n"
            )
        );
        assert!(parts.get("fallbacks").unwrap().contains("\\providecommand*{\\DUfootnotemark}"));
    }

    #[test]
    fn test_footnote_reference_mark() {
        let mut doc = Document::default();
        let para = doc.add(doc.root(), Tag::Paragraph);
        doc.add_text(para, "See");
        let reference = doc.add(para, Tag::FootnoteReference);
        doc.attrs_mut(reference).add_id("footnote-reference-1");
        doc.attrs_mut(reference).set("refid", "note");
        let footnote = doc.add(doc.root(), Tag::Footnote);
        doc.attrs_mut(footnote).add_id("note");
        doc.attrs_mut(footnote).set("backrefs", "footnote-reference-1");
        doc.add_with_text(footnote, Tag::Paragraph, "Text.");

        let body = body(&doc);
        assert!(body.starts_with("\nSee\\DUfootnotemark{footnote-reference-1}{note}{1}\n"));
        assert!(body.contains("\\DUfootnotetext{note}{footnote-reference-1}{1}{%\nText.\n}\n"));
    }

    #[test]
    fn test_literal_block_is_verbatim() {
        let mut doc = Document::default();
        doc.add_with_text(doc.root(), Tag::Paragraph, "Special { [ \\ ] }:");
        doc.add_with_text(doc.root(), Tag::LiteralBlock, "{ [ ( \\macro\n\n} ] )");
        let parts = translate(&doc, &Settings::default());
        assert_eq!(
            parts.get("body"),
            Some(
                "\nSpecial \\{ {[} \\textbackslash{} {]} \\}:\n\
                 \n\\begin{quote}\n\\begin{alltt}\n\\{ [ ( \\textbackslash{}macro\n\n\\} ] )\n\\end{alltt}\n\\end{quote}\n"
            )
        );
        assert!(parts.get("requirements").unwrap().contains("\\usepackage{alltt}"));
    }

    #[test]
    fn test_textcomp_requirement() {
        let mut doc = Document::default();
        doc.add_with_text(doc.root(), Tag::Paragraph, "5 µm");
        let parts = translate(&doc, &Settings::default());
        assert_eq!(parts.get("body"), Some("\n5 \\textmu{}m\n"));
        assert!(
            parts
                .get("requirements")
                .unwrap()
                .contains("\\usepackage{textcomp} % text symbol macros")
        );
    }

    #[test]
    fn test_images() {
        let mut doc = Document::default();
        let first = doc.add(doc.root(), Tag::Image);
        doc.attrs_mut(first).set("uri", "blue%20square.png");
        let second = doc.add(doc.root(), Tag::Image);
        doc.attrs_mut(second).set("uri", "vectors.svg");

        let parts = translate(&doc, &Settings::default());
        assert_eq!(
            parts.get("body"),
            Some("\n\\includegraphics{blue square.png}\n\n\\includegraphics{vectors.svg}\n")
        );
        assert!(parts.get("requirements").unwrap().contains("\\usepackage{graphicx}"));

        let parts = translate(&doc, &Settings::default().with_stylesheet("svg"));
        assert!(parts.get("body").unwrap().ends_with("\n\\includesvg{vectors.svg}\n"));
        assert_eq!(parts.get("stylesheet"), Some("\\usepackage{svg}\n"));
    }

    #[test]
    fn test_image_options() {
        let mut doc = Document::default();
        let image = doc.add(doc.root(), Tag::Image);
        doc.attrs_mut(image).set("uri", "a.png");
        doc.attrs_mut(image).set("width", "50%");
        doc.attrs_mut(image).set("align", "center");
        assert_eq!(
            body(&doc),
            "\n\\noindent\\makebox[\\linewidth][c]{\\includegraphics[width=0.500\\linewidth]{a.png}}\n"
        );
    }

    #[test]
    fn test_missing_uri_reports_in_place() {
        let mut doc = Document::default();
        doc.add_with_text(doc.root(), Tag::Paragraph, "before");
        let image = doc.add(doc.root(), Tag::Image);
        doc.attrs_mut(image).set("line", "7");
        doc.add_with_text(doc.root(), Tag::Paragraph, "after");

        let parts = translate(&doc, &Settings::default());
        assert_eq!(
            parts.get("body"),
            Some(
                "\nbefore\n\
                 \n\\begin{DUclass}{system-message}\n\\DUtitle{System Message: ERROR/3 (\\textless{}string\\textgreater{}, line 7)}\n\
                 \nImage without \"uri\" attribute.\n\\end{DUclass}\n\
                 \nafter\n"
            )
        );
        assert_eq!(parts.diagnostics().len(), 1);
        assert_eq!(parts.diagnostics()[0].line, Some(7));
    }

    #[test]
    fn test_report_level_hides_but_keeps_diagnostic() {
        let mut doc = Document::default();
        doc.add(doc.root(), Tag::Image);
        let settings = Settings::default().with_report_level(Level::Severe);
        let parts = translate(&doc, &settings);
        assert_eq!(parts.get("body"), Some(""));
        assert_eq!(parts.diagnostics().len(), 1);
    }

    #[test]
    fn test_title_with_inline_markup() {
        let mut doc = Document::default();
        doc.attrs_mut(doc.root()).add_id("this-is-the-title");
        let title = doc.add(doc.root(), Tag::Title);
        doc.add_text(title, "This is the ");
        doc.add_with_text(title, Tag::Emphasis, "Title");
        let subtitle = doc.add(doc.root(), Tag::Subtitle);
        doc.attrs_mut(subtitle).add_id("this-is-the-subtitle");
        doc.add_text(subtitle, "This is the ");
        doc.add_with_text(subtitle, Tag::Emphasis, "Subtitle");
        let section = doc.add(doc.root(), Tag::Section);
        let heading = doc.add(section, Tag::Title);
        doc.add_text(heading, "This is a ");
        doc.add_with_text(heading, Tag::Emphasis, "section title");

        let parts = translate(&doc, &Settings::default());
        assert_eq!(
            parts.get("titledata"),
            Some(
                "\\title{This is the \\emph{Title}%\n  \\label{this-is-the-title}%\n  \\\\%\n  \
                 \\DUdocumentsubtitle{This is the \\emph{Subtitle}}%\n  \\label{this-is-the-subtitle}}\n\
                 \\author{}\n\\date{}\n"
            )
        );
        assert_eq!(parts.get("title"), Some("This is the \\emph{Title}"));
        assert_eq!(parts.get("body_pre_docinfo"), Some("\\maketitle\n"));
        assert!(
            parts
                .get("pdfsetup")
                .unwrap()
                .ends_with("\\hypersetup{\n  pdftitle={This is the Title},\n}\n")
        );
        assert!(parts.whole().contains(
            "\\begin{document}\n\\title{This is the"
        ));
        assert!(parts.whole().contains(
            "\\maketitle\n\n\n\\section{This is a \\emph{section title}%\n  \\label{this-is-a-section-title}%\n}\n"
        ));
    }

    #[test]
    fn test_docinfo_authors_and_fields() {
        let mut doc = Document::default();
        let docinfo = doc.add(doc.root(), Tag::Docinfo);
        let authors = doc.add(docinfo, Tag::Authors);
        doc.add_with_text(authors, Tag::Author, "Ada");
        doc.add_with_text(authors, Tag::Author, "Grace");
        doc.add_with_text(docinfo, Tag::Date, "2024-05-01");
        doc.add_with_text(docinfo, Tag::Organization, "R&D");

        let parts = translate(&doc, &Settings::default());
        assert_eq!(
            parts.get("titledata"),
            Some("\\title{}\n\\author{Ada \\and Grace}\n\\date{2024-05-01}\n")
        );
        assert_eq!(
            parts.get("docinfo"),
            Some("\n\\begin{description}\n\\item[{Organization:}] R\\&D\n\\end{description}\n")
        );
        assert!(parts.get("pdfsetup").unwrap().contains("pdfauthor={Ada; Grace}"));
        assert_eq!(parts.get("body"), Some(""));
    }

    #[test]
    fn test_contents_topic() {
        let mut doc = Document::default();
        let topic = doc.add(doc.root(), Tag::Topic);
        doc.attrs_mut(topic).add_class("contents");
        doc.attrs_mut(topic).set("depth", "1");
        doc.add_with_text(topic, Tag::Title, "Contents");
        let section = doc.add(doc.root(), Tag::Section);
        doc.add_with_text(section, Tag::Title, "first section");

        assert_eq!(
            body(&doc),
            "\n\\phantomsection\\label{contents}\n\\pdfbookmark[1]{Contents}{contents}\n\
             \\setcounter{tocdepth}{1}\n\\tableofcontents\n\
             \n\n\\section{first section%\n  \\label{first-section}%\n}\n"
        );
    }

    #[test]
    fn test_references() {
        let mut doc = Document::default();
        let para = doc.add(doc.root(), Tag::Paragraph);
        let same = doc.add_with_text(para, Tag::Reference, "http://a.org/x_y");
        doc.attrs_mut(same).set("refuri", "http://a.org/x_y");
        doc.add_text(para, " ");
        let named = doc.add_with_text(para, Tag::Reference, "site");
        doc.attrs_mut(named).set("refuri", "http://a.org/#top");
        doc.add_text(para, " ");
        let internal = doc.add_with_text(para, Tag::Reference, "Usage");
        doc.attrs_mut(internal).set("refid", "usage");
        let section = doc.add(doc.root(), Tag::Section);
        doc.add_with_text(section, Tag::Title, "Usage");

        assert!(body(&doc).starts_with(
            "\n\\url{http://a.org/x_y} \\href{http://a.org/\\#top}{site} \\hyperref[usage]{Usage}\n"
        ));
    }

    #[test]
    fn test_raw_latex_passes_through() {
        let mut doc = Document::default();
        let raw = doc.add_with_text(doc.root(), Tag::Raw, "$E=mc^2$");
        doc.attrs_mut(raw).set("format", "latex");
        let html = doc.add_with_text(doc.root(), Tag::Raw, "<b>x</b>");
        doc.attrs_mut(html).set("format", "html");
        doc.add_with_text(doc.root(), Tag::Paragraph, "A paragraph.");
        assert_eq!(body(&doc), "\n$E=mc^2$\n\nA paragraph.\n");
    }

    #[test]
    fn test_raw_tex_alias() {
        let mut doc = Document::default();
        let raw = doc.add_with_text(doc.root(), Tag::Raw, "\\newpage");
        doc.attrs_mut(raw).set("format", "tex");
        assert_eq!(body(&doc), "\n\\newpage\n");
    }

    #[test]
    fn test_container_classes() {
        let mut doc = Document::default();
        let container = doc.add(doc.root(), Tag::Container);
        doc.attrs_mut(container).add_class("compound");
        doc.add_with_text(container, Tag::Paragraph, "Compound paragraph");
        assert_eq!(
            body(&doc),
            "\n\\begin{DUclass}{compound}\nCompound paragraph\n\\end{DUclass}\n"
        );
    }

    #[test]
    fn test_header_and_footer_surround_body() {
        let mut doc = Document::default();
        let decoration = doc.add(doc.root(), Tag::Decoration);
        let header = doc.add(decoration, Tag::Header);
        doc.add_with_text(header, Tag::Paragraph, "top");
        let footer = doc.add(decoration, Tag::Footer);
        doc.add_with_text(footer, Tag::Paragraph, "bottom");
        doc.add_with_text(doc.root(), Tag::Paragraph, "main");

        let parts = translate(&doc, &Settings::default());
        assert_eq!(parts.get("body"), Some("\nmain\n"));
        assert_eq!(parts.get("header"), Some("\ntop\n"));
        assert_eq!(parts.get("footer"), Some("\nbottom\n"));
        assert!(parts.whole().contains("\ntop\n\nmain\n\nbottom\n\n\\end{document}\n"));
    }

    #[test]
    fn test_unknown_node_lenient_and_strict() {
        let mut doc = Document::default();
        let custom = doc.add(doc.root(), Tag::from_name("custom"));
        doc.add_with_text(custom, Tag::Paragraph, "inside");
        assert_eq!(body(&doc), "\ninside\n");

        let err = LatexWriter::new()
            .translate(&doc, &Settings::default().with_strict_visitor(true))
            .unwrap_err();
        assert!(matches!(err, Error::Walk { ref tag, .. } if tag == "custom"));
    }

    #[test]
    fn test_admonition_title() {
        let mut doc = Document::default();
        let note = doc.add(doc.root(), Tag::Admonition);
        doc.attrs_mut(note).add_class("note");
        doc.add_with_text(note, Tag::Paragraph, "Careful.");
        assert_eq!(
            body(&doc),
            "\n\\begin{DUclass}{admonition}\n\\begin{DUclass}{note}\n\\DUtitle{Note}\n\nCareful.\n\\end{DUclass}\n\\end{DUclass}\n"
        );
    }

    #[test]
    fn test_latex_length() {
        assert_eq!(latex_length("50%"), "0.500\\linewidth");
        assert_eq!(latex_length("20px"), "20bp");
        assert_eq!(latex_length("3cm"), "3cm");
        assert_eq!(latex_length("12"), "12bp");
    }
}

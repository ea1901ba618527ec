//! Node identifiers, tags and the arena node record.

use std::fmt;

/// Unique identifier for a node within a [`Document`](super::Document).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The root node ID (always 0).
    pub const ROOT: NodeId = NodeId(0);
}

/// Declares the `Tag` enum together with its canonical element names.
macro_rules! tags {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// Semantic element type of a node.
        ///
        /// One variant per element the writers know about. Names outside this
        /// list survive as [`Tag::Other`] so that a tree produced by a newer
        /// parser still loads; what happens to them is up to the visitor's
        /// [`UnknownPolicy`](crate::visit::UnknownPolicy).
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum Tag {
            $($variant,)*
            Other(String),
        }

        impl Tag {
            /// Look up a tag by its element name.
            pub fn from_name(name: &str) -> Tag {
                match name {
                    $($name => Tag::$variant,)*
                    other => Tag::Other(other.to_string()),
                }
            }

            /// Element name (`literal_block`, `section`, ...).
            pub fn name(&self) -> &str {
                match self {
                    $(Tag::$variant => $name,)*
                    Tag::Other(name) => name,
                }
            }
        }
    };
}

tags! {
    Document => "document",
    Section => "section",
    Title => "title",
    Subtitle => "subtitle",
    Paragraph => "paragraph",
    Text => "#text",
    Emphasis => "emphasis",
    Strong => "strong",
    Literal => "literal",
    LiteralBlock => "literal_block",
    Raw => "raw",
    Reference => "reference",
    Target => "target",
    Image => "image",
    Figure => "figure",
    Caption => "caption",
    Legend => "legend",
    BulletList => "bullet_list",
    EnumeratedList => "enumerated_list",
    ListItem => "list_item",
    DefinitionList => "definition_list",
    DefinitionListItem => "definition_list_item",
    Term => "term",
    Definition => "definition",
    FieldList => "field_list",
    Field => "field",
    FieldName => "field_name",
    FieldBody => "field_body",
    BlockQuote => "block_quote",
    Attribution => "attribution",
    Table => "table",
    Tgroup => "tgroup",
    Colspec => "colspec",
    Thead => "thead",
    Tbody => "tbody",
    Row => "row",
    Entry => "entry",
    Footnote => "footnote",
    FootnoteReference => "footnote_reference",
    Label => "label",
    Citation => "citation",
    CitationReference => "citation_reference",
    Header => "header",
    Footer => "footer",
    Decoration => "decoration",
    Docinfo => "docinfo",
    Author => "author",
    Authors => "authors",
    Organization => "organization",
    Date => "date",
    Copyright => "copyright",
    Meta => "meta",
    Topic => "topic",
    Sidebar => "sidebar",
    Rubric => "rubric",
    Container => "container",
    Inline => "inline",
    Admonition => "admonition",
    SystemMessage => "system_message",
    Problematic => "problematic",
    Comment => "comment",
    Transition => "transition",
    LineBlock => "line_block",
    Line => "line",
    TitleReference => "title_reference",
    Subscript => "subscript",
    Superscript => "superscript",
    Abbreviation => "abbreviation",
    SubstitutionDefinition => "substitution_definition",
}

impl Tag {
    /// Whether this is an element the crate has no variant for.
    pub fn is_other(&self) -> bool {
        matches!(self, Tag::Other(_))
    }

    /// Elements whose content is running text (inline context).
    pub fn is_text_element(&self) -> bool {
        matches!(
            self,
            Tag::Paragraph
                | Tag::Title
                | Tag::Subtitle
                | Tag::Term
                | Tag::Caption
                | Tag::LiteralBlock
                | Tag::Line
                | Tag::FieldName
                | Tag::Label
                | Tag::Attribution
                | Tag::Rubric
                | Tag::Author
                | Tag::Organization
                | Tag::Date
                | Tag::Copyright
                | Tag::Emphasis
                | Tag::Strong
                | Tag::Literal
                | Tag::Reference
                | Tag::Inline
                | Tag::TitleReference
                | Tag::Subscript
                | Tag::Superscript
                | Tag::Abbreviation
                | Tag::Problematic
        )
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Range into the document's text buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextRange {
    /// Byte offset into the buffer.
    pub start: u32,
    /// Length in bytes.
    pub len: u32,
}

impl TextRange {
    pub fn new(start: u32, len: u32) -> Self {
        Self { start, len }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn end(&self) -> u32 {
        self.start + self.len
    }
}

/// A node in the document arena.
///
/// Links are indices, so the parent pointer is a relation and never owns
/// anything.
#[derive(Debug, Clone)]
pub struct Node {
    pub tag: Tag,
    /// Parent node (None for root).
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    /// Kept so appends do not walk the sibling chain.
    pub last_child: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    /// Text content range (only for text nodes).
    pub text: TextRange,
}

impl Node {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
            text: TextRange::default(),
        }
    }

    /// Create a text node with the given range.
    pub fn text(range: TextRange) -> Self {
        Self {
            text: range,
            ..Self::new(Tag::Text)
        }
    }
}

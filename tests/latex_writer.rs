//! LaTeX writer tests.

use docweave::nodes::{Document, Tag};
use docweave::settings::{Settings, TableStyle};
use docweave::writers::{LatexWriter, Parts, Writer};
use docweave::{Level, publish_parts};

fn render(doc: &Document, settings: &Settings) -> Parts {
    LatexWriter::new().translate(doc, settings).unwrap()
}

#[test]
fn test_whole_document_layout() {
    let mut doc = Document::default();
    doc.add_with_text(doc.root(), Tag::Title, "Report");
    let section = doc.add(doc.root(), Tag::Section);
    doc.add_with_text(section, Tag::Title, "Results");
    doc.add_with_text(section, Tag::Paragraph, "All {good} & 100% done.");

    let parts = publish_parts(&doc, "latex2e", &Settings::default()).unwrap();
    let whole = parts.whole();

    assert!(whole.starts_with("\\documentclass[a4paper]{article}\n"));
    let begin = whole.find("\\begin{document}").unwrap();
    let title = whole.find("\\title{Report}").unwrap();
    let maketitle = whole.find("\\maketitle").unwrap();
    let section = whole.find("\\section{Results").unwrap();
    let end = whole.find("\\end{document}").unwrap();
    assert!(begin < title && title < maketitle && maketitle < section && section < end);

    assert!(whole.contains("\nAll \\{good\\} \\& 100\\% done.\n"));
    assert!(parts.get("head").unwrap().contains("\\usepackage[T1]{fontenc}"));
    assert!(parts.get("pdfsetup").unwrap().contains("pdftitle={Report}"));
}

#[test]
fn test_settings_title_overrides_pdftitle() {
    let mut doc = Document::default();
    doc.add_with_text(doc.root(), Tag::Title, "Report");
    let parts = render(&doc, &Settings::default().with_title("Q3 numbers"));
    assert!(parts.get("pdfsetup").unwrap().contains("pdftitle={Q3 numbers}"));
    assert!(parts.get("titledata").unwrap().starts_with("\\title{Report}"));
}

#[test]
fn test_image_without_uri_renders_system_message() {
    let mut doc = Document::default();
    doc.add_with_text(doc.root(), Tag::Paragraph, "one");
    doc.add(doc.root(), Tag::Image);
    doc.add_with_text(doc.root(), Tag::Paragraph, "two");

    let parts = render(&doc, &Settings::default());
    let body = parts.get("body").unwrap();
    assert!(body.starts_with("\none\n"));
    assert!(body.contains("\\begin{DUclass}{system-message}"));
    assert!(body.contains("System Message: ERROR/3"));
    assert!(body.ends_with("\ntwo\n"));
    assert_eq!(parts.diagnostics().len(), 1);
    assert_eq!(parts.diagnostics()[0].level, Level::Error);
}

#[test]
fn test_borderless_table_has_no_rules() {
    let mut doc = Document::default();
    let table = doc.add(doc.root(), Tag::Table);
    let tgroup = doc.add(table, Tag::Tgroup);
    let colspec = doc.add(tgroup, Tag::Colspec);
    doc.attrs_mut(colspec).set("colwidth", "10");
    let tbody = doc.add(tgroup, Tag::Tbody);
    let row = doc.add(tbody, Tag::Row);
    let entry = doc.add(row, Tag::Entry);
    doc.add_with_text(entry, Tag::Paragraph, "cell");

    let settings = Settings::default().with_table_style(TableStyle::Borderless);
    let body = render(&doc, &settings).get("body").unwrap().to_string();
    assert!(body.contains("\\begin{longtable*}{p{0.133\\DUtablewidth}}\n"));
    assert!(!body.contains("\\hline"));
    assert!(body.contains("\ncell\n \\\\\n\\end{longtable*}\n"));
}

#[test]
fn test_report_class_starts_with_chapters() {
    let mut doc = Document::default();
    let chapter = doc.add(doc.root(), Tag::Section);
    doc.add_with_text(chapter, Tag::Title, "One");
    let section = doc.add(chapter, Tag::Section);
    doc.add_with_text(section, Tag::Title, "One point one");

    let body = render(&doc, &Settings::default().with_documentclass("report"))
        .get("body")
        .unwrap()
        .to_string();
    assert!(body.contains("\\chapter{One%"));
    assert!(body.contains("\\section{One point one%"));
}

#[test]
fn test_deferred_headers_keep_order() {
    let mut doc = Document::default();
    let decoration = doc.add(doc.root(), Tag::Decoration);
    for text in ["A", "B"] {
        let header = doc.add(decoration, Tag::Header);
        doc.add_with_text(header, Tag::Paragraph, text);
    }
    let parts = render(&doc, &Settings::default());
    assert_eq!(parts.get("header"), Some("\nA\n\nB\n"));
}

#[test]
fn test_latex_writer_supports_raw_formats() {
    let writer = LatexWriter::new();
    assert!(writer.supports("LaTeX"));
    assert!(writer.supports("tex"));
    assert!(!writer.supports("html"));
}

//! Buffers of the HTML translator and their assembly into parts.

use super::escape::{attval, encode};
use crate::settings::Settings;
use crate::writers::{Buffer, Parts, VERSION};

pub(super) const BODY_OPEN: &str = "</head>\n<body>\n";
pub(super) const BODY_OPEN_WITH_TOC: &str = "</head>\n<body class=\"with-toc\">\n";
const BODY_CLOSE: &str = "</body>\n</html>\n";
const VIEWPORT: &str = "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n";
const DCTERMS_SCHEMA: &str = "<link rel=\"schema.dcterms\" href=\"http://purl.org/dc/terms/\"/>\n";

/// Everything the HTML translator accumulates during a walk.
#[derive(Debug, Default)]
pub(super) struct Buffers {
    pub meta: Buffer,
    pub body_prefix: Buffer,
    pub body_pre_docinfo: Buffer,
    pub docinfo: Buffer,
    pub body: Buffer,
    pub body_suffix: Buffer,
    pub title: Buffer,
    pub subtitle: Buffer,
    pub header: Buffer,
    pub footer: Buffer,
    pub html_title: Buffer,
    pub html_subtitle: Buffer,
}

impl Buffers {
    pub fn new() -> Self {
        let mut buffers = Self::default();
        buffers.body_prefix.push(BODY_OPEN);
        buffers.body_suffix.push(BODY_CLOSE);
        buffers
    }
}

/// Assemble the parts from the finished buffers.
///
/// `head_title` is the plain text for `<title>`.
pub(super) fn assemble(buffers: &Buffers, settings: &Settings, head_title: &str) -> Parts {
    let encoding = &settings.output_encoding;

    let mut html_prolog = String::new();
    if settings.xml_declaration {
        html_prolog.push_str(&format!(
            "<?xml version=\"1.0\" encoding=\"{}\"?>\n",
            attval(encoding)
        ));
    }
    html_prolog.push_str("<!DOCTYPE html>\n");

    let lang = attval(&settings.language_code);
    let head_prefix = format!(
        "{html_prolog}<html xmlns=\"http://www.w3.org/1999/xhtml\" xml:lang=\"{lang}\" lang=\"{lang}\">\n<head>\n"
    );

    let content_type = format!("<meta charset=\"{}\" />\n", attval(encoding));
    let generator = format!(
        "<meta name=\"generator\" content=\"docweave {VERSION}: https://crates.io/crates/docweave\" />\n"
    );
    let extra_meta = buffers.meta.join();
    let meta = format!("{content_type}{generator}{VIEWPORT}{extra_meta}");

    let mut html_head = format!(
        "{generator}{VIEWPORT}{extra_meta}<title>{}</title>\n",
        encode(head_title)
    );
    if extra_meta.contains("name=\"dcterms.") {
        html_head.push_str(DCTERMS_SCHEMA);
    }
    let head = format!("{content_type}{html_head}");

    let stylesheet: String = settings
        .stylesheet_path
        .iter()
        .map(|href| {
            format!(
                "<link rel=\"stylesheet\" href=\"{}\" type=\"text/css\" />\n",
                attval(href)
            )
        })
        .collect();

    let body_prefix = buffers.body_prefix.join();
    let body_pre_docinfo = buffers.body_pre_docinfo.join();
    let docinfo = buffers.docinfo.join();
    let body = buffers.body.join();
    let body_suffix = buffers.body_suffix.join();

    // html_body drops the <body> opening and closing fragments
    let prefix_fragments = buffers.body_prefix.fragments();
    let suffix_fragments = buffers.body_suffix.fragments();
    let html_body = [
        prefix_fragments.get(1..).unwrap_or_default().concat(),
        body_pre_docinfo.clone(),
        docinfo.clone(),
        body.clone(),
        suffix_fragments
            .get(..suffix_fragments.len().saturating_sub(1))
            .unwrap_or_default()
            .concat(),
    ]
    .concat();

    let whole = [
        head_prefix.as_str(),
        &head,
        &stylesheet,
        &body_prefix,
        &body_pre_docinfo,
        &docinfo,
        &body,
        &body_suffix,
    ]
    .concat();

    let mut parts = Parts::new();
    parts.insert("body", body.clone());
    parts.insert("body_pre_docinfo", body_pre_docinfo);
    parts.insert("body_prefix", body_prefix);
    parts.insert("body_suffix", body_suffix);
    parts.insert("docinfo", docinfo);
    parts.insert("encoding", encoding.clone());
    parts.insert("errors", settings.output_encoding_error_handler.to_string());
    parts.insert("footer", buffers.footer.join());
    parts.insert("fragment", body);
    parts.insert("head", head);
    parts.insert("head_prefix", head_prefix);
    parts.insert("header", buffers.header.join());
    parts.insert("html_body", html_body);
    parts.insert("html_head", html_head);
    parts.insert("html_prolog", html_prolog);
    parts.insert("html_subtitle", buffers.html_subtitle.join());
    parts.insert("html_title", buffers.html_title.join());
    parts.insert("meta", meta);
    parts.insert("stylesheet", stylesheet);
    parts.insert("subtitle", buffers.subtitle.join());
    parts.insert("title", buffers.title.join());
    parts.insert("version", VERSION);
    parts.insert("whole", whole);
    parts
}

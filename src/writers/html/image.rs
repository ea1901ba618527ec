//! Images and videos.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use memchr::memmem;
use quick_xml::Reader;
use quick_xml::events::Event;

use super::HtmlTranslator;
use crate::diagnostics::Level;
use crate::error::Result;
use crate::nodes::{NodeRef, Tag};
use crate::settings::ImageLoading;
use crate::util::{MediaFormat, detect_media_format, media_format_from_uri};
use crate::visit::Visit;

impl HtmlTranslator<'_> {
    pub(super) fn visit_image(&mut self, node: NodeRef<'_>) -> Result<Visit> {
        let Some(uri) = node.get_attr("uri").filter(|uri| !uri.is_empty()) else {
            self.report(node, Level::Error, "Image without \"uri\" attribute.".to_string())?;
            return Ok(Visit::SkipNode);
        };

        // no newline in inline context
        let suffix = if node.parent_tag().is_some_and(Tag::is_text_element) {
            ""
        } else {
            "\n"
        };
        let alt = node.get_attr("alt").unwrap_or(uri);

        if media_format_from_uri(uri).is_video() {
            let mut tag = self.starttag(node, "video", "").attr("src", uri).attr("title", alt);
            tag = size_attributes(node, tag);
            if node.has_class("controls") {
                tag = tag.without_class("controls").attr("controls", "controls");
            }
            if self.loading(node) == ImageLoading::Lazy {
                tag = tag.attr("loading", "lazy");
            }
            self.push(format!(
                "{}<a href=\"{}\">{}</a>{suffix}</video>{suffix}",
                tag.render(suffix),
                super::attval(uri),
                super::encode(alt)
            ));
            return Ok(Visit::SkipNode);
        }

        let mut tag = size_attributes(node, self.starttag(node, "img", "")).attr("alt", alt);
        match self.loading(node) {
            ImageLoading::Link => {}
            ImageLoading::Lazy => tag = tag.attr("loading", "lazy"),
            ImageLoading::Embed => match self.loader.load(uri) {
                Ok(data) => {
                    let format = detect_media_format(uri, &data);
                    if format == MediaFormat::Svg {
                        match inline_svg(&data) {
                            Ok(svg) => self.push(format!("{svg}{suffix}")),
                            Err(reason) => self.report(
                                node,
                                Level::Error,
                                format!("Cannot parse SVG image \"{uri}\":\n  {reason}"),
                            )?,
                        }
                        return Ok(Visit::SkipNode);
                    }
                    let data_uri =
                        format!("data:{};base64,{}", format.mime_type(), STANDARD.encode(&data));
                    self.push(tag.attr("src", data_uri).render_empty(suffix));
                    return Ok(Visit::SkipNode);
                }
                Err(e) => {
                    self.push(tag.attr("src", uri).render_empty(suffix));
                    self.report(
                        node,
                        Level::Error,
                        format!("Cannot embed image \"{uri}\":\n  {e}"),
                    )?;
                    return Ok(Visit::SkipNode);
                }
            },
        }
        self.push(tag.attr("src", uri).render_empty(suffix));
        Ok(Visit::SkipNode)
    }

    /// Loading mode: the node's own `loading` attribute wins over settings.
    fn loading(&self, node: NodeRef<'_>) -> ImageLoading {
        node.get_attr("loading")
            .and_then(|value| value.parse().ok())
            .unwrap_or(self.settings.image_loading)
    }
}

/// `width`/`height`/`align` of an image or video node.
fn size_attributes(node: NodeRef<'_>, mut tag: super::StartTag) -> super::StartTag {
    let mut style = Vec::new();
    for key in ["width", "height"] {
        let Some(value) = node.get_attr(key) else {
            continue;
        };
        let pixels = value.strip_suffix("px").unwrap_or(value);
        if pixels.chars().all(|c| c.is_ascii_digit()) && !pixels.is_empty() {
            tag = tag.attr(key, pixels);
        } else {
            style.push(format!("{key}: {value};"));
        }
    }
    if !style.is_empty() {
        tag = tag.attr("style", style.join(" "));
    }
    if let Some(align) = node.get_attr("align") {
        tag = tag.class(&format!("align-{align}"));
    }
    tag
}

/// Validate SVG data and return the markup from the `<svg` root onwards.
fn inline_svg(data: &[u8]) -> std::result::Result<String, String> {
    let text = std::str::from_utf8(data).map_err(|e| e.to_string())?;
    let mut reader = Reader::from_str(text);
    let mut has_root = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"svg" => {
                has_root = true;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.to_string()),
            _ => {}
        }
    }
    let start = memmem::find(data, b"<svg").filter(|_| has_root);
    match start {
        Some(start) => Ok(text[start..].trim_end().to_string()),
        None => Err("no <svg> root element".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::io::MemoryLoader;
    use crate::nodes::Document;
    use crate::settings::Settings;
    use crate::writers::{Html5Writer, Parts, Writer};

    fn image_doc(uri: &str) -> Document {
        let mut doc = Document::default();
        let image = doc.add(doc.root(), Tag::Image);
        doc.attrs_mut(image).set("uri", uri);
        doc
    }

    fn translate(doc: &Document, settings: &Settings, loader: MemoryLoader) -> Parts {
        Html5Writer::with_loader(Arc::new(loader))
            .translate(doc, settings)
            .unwrap()
    }

    #[test]
    fn test_linked_image() {
        let parts = translate(&image_doc("a b.png"), &Settings::default(), MemoryLoader::new());
        assert_eq!(parts.get("body"), Some("<img alt=\"a b.png\" src=\"a b.png\" />\n"));
    }

    #[test]
    fn test_lazy_image() {
        let settings = Settings::default().with_image_loading(ImageLoading::Lazy);
        let parts = translate(&image_doc("x.png"), &settings, MemoryLoader::new());
        assert_eq!(
            parts.get("body"),
            Some("<img alt=\"x.png\" loading=\"lazy\" src=\"x.png\" />\n")
        );
    }

    #[test]
    fn test_embedded_png_is_data_uri() {
        let settings = Settings::default().with_image_loading(ImageLoading::Embed);
        let loader = MemoryLoader::new().with("dot.png", b"\x89PNG".to_vec());
        let parts = translate(&image_doc("dot.png"), &settings, loader);
        assert_eq!(
            parts.get("body"),
            Some("<img alt=\"dot.png\" src=\"data:image/png;base64,iVBORw==\" />\n")
        );
        assert!(parts.diagnostics().is_empty());
    }

    #[test]
    fn test_embedded_svg_is_inlined() {
        let settings = Settings::default().with_image_loading(ImageLoading::Embed);
        let svg = b"<?xml version=\"1.0\"?>\n<svg xmlns=\"http://www.w3.org/2000/svg\"><rect/></svg>\n";
        let loader = MemoryLoader::new().with("logo.svg", svg.to_vec());
        let parts = translate(&image_doc("logo.svg"), &settings, loader);
        assert_eq!(
            parts.get("body"),
            Some("<svg xmlns=\"http://www.w3.org/2000/svg\"><rect/></svg>\n")
        );
    }

    #[test]
    fn test_malformed_svg_reports_in_place() {
        let settings = Settings::default().with_image_loading(ImageLoading::Embed);
        let loader = MemoryLoader::new().with("bad.svg", b"<svg><g></svg>".to_vec());
        let parts = translate(&image_doc("bad.svg"), &settings, loader);
        let body = parts.get("body").unwrap();
        assert!(body.starts_with("<aside class=\"system-message\">"));
        assert!(body.contains("Cannot parse SVG image &quot;bad.svg&quot;:"));
        assert_eq!(parts.diagnostics().len(), 1);
        assert_eq!(parts.diagnostics()[0].level, Level::Error);
    }

    #[test]
    fn test_missing_embed_falls_back_to_link() {
        let settings = Settings::default().with_image_loading(ImageLoading::Embed);
        let parts = translate(&image_doc("gone.png"), &settings, MemoryLoader::new());
        let body = parts.get("body").unwrap();
        assert!(body.starts_with("<img alt=\"gone.png\" src=\"gone.png\" />\n"));
        assert!(body.contains("Cannot embed image &quot;gone.png&quot;:"));
        assert_eq!(parts.diagnostics().len(), 1);
    }

    #[test]
    fn test_missing_uri_is_reported() {
        let mut doc = Document::default();
        let para = doc.add(doc.root(), Tag::Paragraph);
        doc.add_text(para, "before");
        doc.add(doc.root(), Tag::Image);
        doc.add_with_text(doc.root(), Tag::Paragraph, "after");

        let parts = translate(&doc, &Settings::default(), MemoryLoader::new());
        let body = parts.get("body").unwrap();
        assert!(body.starts_with("<p>before</p>\n<aside class=\"system-message\">"));
        assert!(body.ends_with("</aside>\n<p>after</p>\n"));
    }

    #[test]
    fn test_video() {
        let mut doc = image_doc("clip.mp4");
        let image = doc.children(doc.root()).next().unwrap();
        doc.attrs_mut(image).set("alt", "A clip");
        doc.attrs_mut(image).add_class("controls");
        let parts = translate(&doc, &Settings::default(), MemoryLoader::new());
        assert_eq!(
            parts.get("body"),
            Some(
                "<video controls=\"controls\" src=\"clip.mp4\" title=\"A clip\">\n<a href=\"clip.mp4\">A clip</a>\n</video>\n"
            )
        );
    }

    #[test]
    fn test_inline_image_has_no_newline() {
        let mut doc = Document::default();
        let para = doc.add(doc.root(), Tag::Paragraph);
        let image = doc.add(para, Tag::Image);
        doc.attrs_mut(image).set("uri", "i.gif");
        doc.attrs_mut(image).set("width", "20px");
        let parts = translate(&doc, &Settings::default(), MemoryLoader::new());
        assert_eq!(
            parts.get("body"),
            Some("<p><img alt=\"i.gif\" src=\"i.gif\" width=\"20\" /></p>\n")
        );
    }
}

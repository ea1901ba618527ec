//! Conversion settings.
//!
//! A [`Settings`] value is built once (defaults, then a JSON file, then
//! command-line overrides), validated, and from then on only read. Writers
//! take it by shared reference, so one value can serve any number of
//! concurrent conversions.

use std::fmt;
use std::str::FromStr;

use crate::diagnostics::Level;
use crate::error::{Error, Result};
use crate::io::ErrorHandler;

/// How the HTML writer references images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ImageLoading {
    /// Plain `<img src>` link.
    #[default]
    Link,
    /// Link with `loading="lazy"`.
    Lazy,
    /// Inline the image data (SVG markup or a base64 `data:` URI).
    Embed,
}

impl FromStr for ImageLoading {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "link" => Ok(ImageLoading::Link),
            "lazy" => Ok(ImageLoading::Lazy),
            "embed" => Ok(ImageLoading::Embed),
            other => Err(Error::InvalidSetting {
                name: "image_loading",
                reason: format!("expected link, lazy or embed, got {other:?}"),
            }),
        }
    }
}

impl fmt::Display for ImageLoading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ImageLoading::Link => "link",
            ImageLoading::Lazy => "lazy",
            ImageLoading::Embed => "embed",
        })
    }
}

/// LaTeX table rule style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TableStyle {
    /// Vertical and horizontal rules around every cell.
    #[default]
    Standard,
    /// No rules.
    Borderless,
    /// `booktabs` top/mid/bottom rules.
    Booktabs,
}

impl FromStr for TableStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "standard" => Ok(TableStyle::Standard),
            "borderless" => Ok(TableStyle::Borderless),
            "booktabs" => Ok(TableStyle::Booktabs),
            other => Err(Error::InvalidSetting {
                name: "table_style",
                reason: format!("expected standard, borderless or booktabs, got {other:?}"),
            }),
        }
    }
}

/// Settings shared by all writers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Settings {
    /// Label used in system messages when the document has none.
    pub source_path: Option<String>,
    /// Explicit input encoding; `None` tries UTF-8 then `fallback_encoding`.
    pub input_encoding: Option<String>,
    pub input_encoding_error_handler: ErrorHandler,
    /// Second decode candidate after UTF-8 (injected, never sniffed).
    pub fallback_encoding: Option<String>,
    pub output_encoding: String,
    pub output_encoding_error_handler: ErrorHandler,
    /// Stylesheets linked from HTML, or LaTeX packages/files for `\usepackage`.
    pub stylesheet_path: Vec<String>,
    /// HTML heading level used for top-level sections (1-6).
    pub initial_header_level: u8,
    pub section_self_link: bool,
    pub image_loading: ImageLoading,
    /// System messages below this level are not rendered.
    pub report_level: Level,
    /// Fail on tags no translator handler claims.
    pub strict_visitor: bool,
    pub language_code: String,
    /// Overrides the document title in `<title>` / `\title`.
    pub title: Option<String>,
    pub xml_declaration: bool,
    /// Print the title as a heading in the body (HTML).
    pub doctitle_in_body: bool,
    pub footnote_backlinks: bool,
    pub documentclass: String,
    pub documentoptions: String,
    pub table_style: TableStyle,
    /// Pseudo-XML: wrap text in `<#text>` elements.
    pub detailed: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_path: None,
            input_encoding: None,
            input_encoding_error_handler: ErrorHandler::Strict,
            fallback_encoding: None,
            output_encoding: "utf-8".to_string(),
            output_encoding_error_handler: ErrorHandler::Strict,
            stylesheet_path: Vec::new(),
            initial_header_level: 2,
            section_self_link: false,
            image_loading: ImageLoading::Link,
            report_level: Level::Warning,
            strict_visitor: false,
            language_code: "en".to_string(),
            title: None,
            xml_declaration: false,
            doctitle_in_body: true,
            footnote_backlinks: true,
            documentclass: "article".to_string(),
            documentoptions: "a4paper".to_string(),
            table_style: TableStyle::Standard,
            detailed: false,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a JSON object; absent keys keep their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn with_output_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.output_encoding = encoding.into();
        self
    }

    pub fn with_input_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.input_encoding = Some(encoding.into());
        self
    }

    pub fn with_fallback_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.fallback_encoding = Some(encoding.into());
        self
    }

    pub fn with_output_encoding_error_handler(mut self, handler: ErrorHandler) -> Self {
        self.output_encoding_error_handler = handler;
        self
    }

    pub fn with_stylesheet(mut self, path: impl Into<String>) -> Self {
        self.stylesheet_path.push(path.into());
        self
    }

    pub fn with_initial_header_level(mut self, level: u8) -> Self {
        self.initial_header_level = level;
        self
    }

    pub fn with_section_self_link(mut self, enabled: bool) -> Self {
        self.section_self_link = enabled;
        self
    }

    pub fn with_image_loading(mut self, loading: ImageLoading) -> Self {
        self.image_loading = loading;
        self
    }

    pub fn with_report_level(mut self, level: Level) -> Self {
        self.report_level = level;
        self
    }

    pub fn with_strict_visitor(mut self, strict: bool) -> Self {
        self.strict_visitor = strict;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_documentclass(mut self, class: impl Into<String>) -> Self {
        self.documentclass = class.into();
        self
    }

    pub fn with_table_style(mut self, style: TableStyle) -> Self {
        self.table_style = style;
        self
    }

    pub fn with_detailed(mut self, detailed: bool) -> Self {
        self.detailed = detailed;
        self
    }

    pub fn with_xml_declaration(mut self, enabled: bool) -> Self {
        self.xml_declaration = enabled;
        self
    }

    /// Check value ranges and encoding names.
    pub fn validate(&self) -> Result<()> {
        if !(1..=6).contains(&self.initial_header_level) {
            return Err(Error::InvalidSetting {
                name: "initial_header_level",
                reason: format!("must be 1-6, got {}", self.initial_header_level),
            });
        }
        crate::io::check_encoding(&self.output_encoding)?;
        if let Some(encoding) = &self.input_encoding {
            crate::io::check_encoding(encoding)?;
        }
        if let Some(encoding) = &self.fallback_encoding {
            crate::io::check_encoding(encoding)?;
        }
        if self.documentclass.trim().is_empty() {
            return Err(Error::InvalidSetting {
                name: "documentclass",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Source label for diagnostics.
    pub(crate) fn source_label<'a>(&'a self, document_source: &'a str) -> &'a str {
        self.source_path.as_deref().unwrap_or(document_source)
    }
}

//! # docweave
//!
//! Writers that render a parsed markup document tree into HTML5, LaTeX or
//! pseudo-XML.
//!
//! ## Features
//!
//! - Arena document tree with docutils-style node tags and attributes
//! - Iterative visitor engine with skip signals and a strict/lenient policy
//!   for unknown nodes
//! - HTML5 (polyglot) and LaTeX writers producing named output parts
//! - Recoverable problems rendered in place as system messages
//! - Explicit input/output encodings through `encoding_rs`
//!
//! ## Quick Start
//!
//! ```
//! use docweave::nodes::{Document, Tag};
//! use docweave::publish_parts;
//! use docweave::settings::Settings;
//!
//! let mut doc = Document::default();
//! let section = doc.add(doc.root(), Tag::Section);
//! doc.add_with_text(section, Tag::Title, "Usage");
//! doc.add_with_text(section, Tag::Paragraph, "Run it.");
//!
//! let parts = publish_parts(&doc, "html5", &Settings::default())?;
//! assert!(parts.get("body").unwrap().contains("<section id=\"usage\">"));
//!
//! let parts = publish_parts(&doc, "latex", &Settings::default())?;
//! assert!(parts.get("body").unwrap().contains("\\section{Usage"));
//! # Ok::<(), docweave::Error>(())
//! ```
//!
//! ## Parts
//!
//! Every writer returns [`writers::Parts`]: named strings such as `whole`,
//! `body`, `head` or `titledata`, plus the diagnostics collected while
//! translating. `whole` is the complete output document.

pub mod diagnostics;
pub mod error;
pub mod io;
pub mod nodes;
mod publish;
pub mod settings;
pub(crate) mod util;
pub mod visit;
pub mod writers;

pub use diagnostics::{Diagnostic, Level};
pub use error::{Error, Result};
pub use publish::{publish, publish_parts};
pub use settings::Settings;

//! Input/output adapters around the writers.
//!
//! Nothing here runs during a tree walk: sources are decoded before the tree
//! is built and the assembled output is encoded afterwards. Encodings are
//! always given explicitly (or as an injected fallback); there is no BOM or
//! magic-comment sniffing.

use std::fmt;
use std::str::FromStr;

use encoding_rs::Encoding;

use crate::error::{Error, Result};

mod input;
mod output;
mod resource;

pub use input::{DecodeOptions, FileInput, Input, NullInput, StringInput, decode};
pub use output::{FileOutput, NullOutput, Output, OutputData, StringOutput, encode};
pub use resource::{FsLoader, MemoryLoader, ResourceLoader};

/// Pseudo-encoding: text is handed through as-is.
pub const UNICODE: &str = "unicode";

/// What to do with data that cannot be decoded or encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ErrorHandler {
    /// Fail.
    #[default]
    Strict,
    /// Substitute `?` (encode) or U+FFFD (decode).
    Replace,
    /// Substitute `&#NNN;` references (encode only; decodes like `Replace`).
    XmlCharRefReplace,
}

impl FromStr for ErrorHandler {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "strict" => Ok(ErrorHandler::Strict),
            "replace" => Ok(ErrorHandler::Replace),
            "xmlcharrefreplace" => Ok(ErrorHandler::XmlCharRefReplace),
            other => Err(Error::InvalidSetting {
                name: "error_handler",
                reason: format!("expected strict, replace or xmlcharrefreplace, got {other:?}"),
            }),
        }
    }
}

impl fmt::Display for ErrorHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorHandler::Strict => "strict",
            ErrorHandler::Replace => "replace",
            ErrorHandler::XmlCharRefReplace => "xmlcharrefreplace",
        })
    }
}

/// Resolve an encoding label. `Ok(None)` is the `unicode` pass-through.
///
/// WHATWG labels are tried first, then Python codec spellings such as
/// `latin_1`, `latin-1` or `utf_8`. Every latin-1 label resolves to
/// windows-1252, so bytes 0x80-0x9F decode to typographic characters
/// rather than C1 controls.
pub fn lookup_encoding(label: &str) -> Result<Option<&'static Encoding>> {
    let label = label.trim();
    if label.eq_ignore_ascii_case(UNICODE) {
        return Ok(None);
    }
    if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
        return Ok(Some(encoding));
    }
    let codec = label.to_ascii_lowercase().replace('_', "-");
    let alias = match codec.as_str() {
        "latin-1" | "latin" | "iso-8859-1" | "8859" | "cp819" => "iso-8859-1",
        "u8" | "utf" => "utf-8",
        other => other,
    };
    Encoding::for_label(alias.as_bytes())
        .map(Some)
        .ok_or_else(|| Error::UnknownEncoding(label.to_string()))
}

/// Fail early on an encoding label nobody can resolve.
pub fn check_encoding(label: &str) -> Result<()> {
    lookup_encoding(label).map(|_| ())
}

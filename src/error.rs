//! Error types for docweave operations.

use thiserror::Error;

use crate::visit::Phase;

/// Errors that abort a conversion.
///
/// Recoverable problems (an image that cannot be embedded, an unreadable
/// resource) never show up here: translators turn them into
/// [`Diagnostic`](crate::diagnostics::Diagnostic)s rendered in place.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(
        "unable to decode input data from {source_path}; tried the following encodings: {}{}",
        quote_list(.tried),
        reason_suffix(.reason)
    )]
    Decode {
        source_path: String,
        tried: Vec<String>,
        reason: Option<String>,
    },

    #[error("unable to encode output data for {destination}; output encoding is {encoding} ({reason})")]
    Encode {
        destination: String,
        encoding: String,
        reason: String,
    },

    #[error("unknown encoding: {0}")]
    UnknownEncoding(String),

    #[error("no handler for node <{tag}>")]
    UnsupportedNode { tag: String },

    #[error("context stack underflow, expected a {expected} frame")]
    ContextUnderflow { expected: &'static str },

    #[error("context stack mismatch: expected a {expected} frame, found {found}")]
    ContextMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error("{phase} <{tag}>{}: {source}", line_suffix(.line))]
    Walk {
        tag: String,
        line: Option<u32>,
        phase: Phase,
        #[source]
        source: Box<Error>,
    },

    #[error("unknown writer: {0}")]
    UnknownWriter(String),

    #[error("invalid setting {name}: {reason}")]
    InvalidSetting { name: &'static str, reason: String },

    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Attach the node being visited, unless the error already carries one.
    ///
    /// Nested walks (fallback rendering) must not wrap twice, so the innermost
    /// location wins.
    pub(crate) fn located(self, tag: &str, line: Option<u32>, phase: Phase) -> Self {
        match self {
            located @ Error::Walk { .. } => located,
            other => Error::Walk {
                tag: tag.to_string(),
                line,
                phase,
                source: Box::new(other),
            },
        }
    }
}

fn quote_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("'{item}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(" ({r})"))
        .unwrap_or_default()
}

fn line_suffix(line: &Option<u32>) -> String {
    line.map(|l| format!(" (line {l})")).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, Error>;

//! Decoding sources into text.

use std::borrow::Cow;
use std::fs;
use std::path::PathBuf;

use super::{ErrorHandler, lookup_encoding};
use crate::error::{Error, Result};
use crate::settings::Settings;

/// How to turn source bytes into text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Explicit encoding; the only candidate when set.
    pub encoding: Option<String>,
    /// Tried after UTF-8 when no explicit encoding is set.
    pub fallback: Option<String>,
    pub error_handler: ErrorHandler,
}

impl DecodeOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            encoding: settings.input_encoding.clone(),
            fallback: settings.fallback_encoding.clone(),
            error_handler: settings.input_encoding_error_handler,
        }
    }

    fn candidates(&self) -> Vec<&str> {
        match &self.encoding {
            Some(explicit) => vec![explicit.as_str()],
            None => {
                let mut candidates = vec!["utf-8"];
                if let Some(fallback) = &self.fallback
                    && !matches!(lookup_encoding(fallback), Ok(Some(e)) if e == encoding_rs::UTF_8)
                {
                    candidates.push(fallback.as_str());
                }
                candidates
            }
        }
    }
}

/// Decode `bytes` trying each candidate encoding in turn.
///
/// With an explicit encoding that is the only candidate; otherwise UTF-8 is
/// tried first and then the injected fallback. A leading U+FEFF is removed
/// from the result. If every candidate fails, the error lists all of them.
pub fn decode(bytes: &[u8], source_path: &str, options: &DecodeOptions) -> Result<String> {
    let candidates = options.candidates();
    let mut last_reason = None;

    for label in &candidates {
        let Some(encoding) = lookup_encoding(label)? else {
            // `unicode`: the data is already text
            match std::str::from_utf8(bytes) {
                Ok(text) => return Ok(strip_bom(text.to_string())),
                Err(e) => {
                    last_reason = Some(e.to_string());
                    continue;
                }
            }
        };

        let decoded: Option<Cow<'_, str>> = match options.error_handler {
            ErrorHandler::Strict => {
                encoding.decode_without_bom_handling_and_without_replacement(bytes)
            }
            ErrorHandler::Replace | ErrorHandler::XmlCharRefReplace => {
                Some(encoding.decode_without_bom_handling(bytes).0)
            }
        };
        match decoded {
            Some(text) => {
                log::debug!("decoded {source_path} as {}", encoding.name());
                return Ok(strip_bom(text.into_owned()));
            }
            None => {
                log::debug!("{source_path} is not valid {}", encoding.name());
                last_reason = Some(format!("malformed {} data", encoding.name()));
            }
        }
    }

    Err(Error::Decode {
        source_path: source_path.to_string(),
        tried: candidates.iter().map(|c| c.to_string()).collect(),
        reason: last_reason,
    })
}

fn strip_bom(mut text: String) -> String {
    if text.starts_with('\u{feff}') {
        text.drain(..'\u{feff}'.len_utf8());
    }
    text
}

/// A source of document text.
pub trait Input {
    /// Path or label used in error messages.
    fn source_path(&self) -> &str;

    fn read(&mut self) -> Result<String>;
}

enum Payload {
    Text(String),
    Bytes(Vec<u8>),
}

/// In-memory source.
pub struct StringInput {
    payload: Payload,
    source_path: String,
    options: DecodeOptions,
}

impl StringInput {
    /// Already-decoded text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            payload: Payload::Text(text.into()),
            source_path: "<string>".to_string(),
            options: DecodeOptions::default(),
        }
    }

    /// Raw bytes, decoded on read.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>, options: DecodeOptions) -> Self {
        Self {
            payload: Payload::Bytes(bytes.into()),
            source_path: "<string>".to_string(),
            options,
        }
    }

    pub fn with_source_path(mut self, path: impl Into<String>) -> Self {
        self.source_path = path.into();
        self
    }
}

impl Input for StringInput {
    fn source_path(&self) -> &str {
        &self.source_path
    }

    fn read(&mut self) -> Result<String> {
        match &self.payload {
            Payload::Text(text) => Ok(strip_bom(text.clone())),
            Payload::Bytes(bytes) => decode(bytes, &self.source_path, &self.options),
        }
    }
}

/// File source, decoded on read.
pub struct FileInput {
    path: PathBuf,
    source_path: String,
    options: DecodeOptions,
}

impl FileInput {
    pub fn new(path: impl Into<PathBuf>, options: DecodeOptions) -> Self {
        let path = path.into();
        Self {
            source_path: path.display().to_string(),
            path,
            options,
        }
    }
}

impl Input for FileInput {
    fn source_path(&self) -> &str {
        &self.source_path
    }

    fn read(&mut self) -> Result<String> {
        let bytes = fs::read(&self.path)?;
        decode(&bytes, &self.source_path, &self.options)
    }
}

/// Empty source.
#[derive(Debug, Default)]
pub struct NullInput;

impl Input for NullInput {
    fn source_path(&self) -> &str {
        "null input"
    }

    fn read(&mut self) -> Result<String> {
        Ok(String::new())
    }
}

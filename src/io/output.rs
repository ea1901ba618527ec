//! Encoding text for destinations.

use std::fs;
use std::path::PathBuf;

use encoding_rs::{EncoderResult, Encoding};

use super::{ErrorHandler, lookup_encoding};
use crate::error::{Error, Result};

/// Encode `text` for `destination` using the named encoding.
///
/// Characters the encoding cannot represent are handled by `handler`:
/// `Strict` fails naming the destination and encoding, `Replace` writes `?`,
/// `XmlCharRefReplace` writes a decimal character reference.
pub fn encode(
    text: &str,
    destination: &str,
    encoding: &str,
    handler: ErrorHandler,
) -> Result<Vec<u8>> {
    let Some(target) = lookup_encoding(encoding)? else {
        return Ok(text.as_bytes().to_vec());
    };
    if target == encoding_rs::UTF_8 {
        return Ok(text.as_bytes().to_vec());
    }
    // encoding_rs has no UTF-16 encoder; its output_encoding() is UTF-8.
    if target == encoding_rs::UTF_16LE {
        return Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect());
    }
    if target == encoding_rs::UTF_16BE {
        return Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect());
    }
    encode_with(target, text, destination, encoding, handler)
}

fn encode_with(
    target: &'static Encoding,
    text: &str,
    destination: &str,
    label: &str,
    handler: ErrorHandler,
) -> Result<Vec<u8>> {
    let mut encoder = target.new_encoder();
    let mut out = Vec::with_capacity(text.len());
    let mut chunk = [0u8; 4096];
    let mut src = text;

    loop {
        let (result, read, written) =
            encoder.encode_from_utf8_without_replacement(src, &mut chunk, true);
        out.extend_from_slice(&chunk[..written]);
        src = &src[read..];
        match result {
            EncoderResult::InputEmpty => break,
            EncoderResult::OutputFull => {}
            EncoderResult::Unmappable(c) => match handler {
                ErrorHandler::Strict => {
                    return Err(Error::Encode {
                        destination: destination.to_string(),
                        encoding: label.to_string(),
                        reason: format!("cannot encode {c:?} (U+{:04X})", c as u32),
                    });
                }
                ErrorHandler::Replace => out.push(b'?'),
                ErrorHandler::XmlCharRefReplace => {
                    out.extend_from_slice(format!("&#{};", c as u32).as_bytes());
                }
            },
        }
    }
    Ok(out)
}

/// What gets written: text still to be encoded, or ready-made bytes.
#[derive(Debug, Clone, Copy)]
pub enum OutputData<'a> {
    Text(&'a str),
    Bytes(&'a [u8]),
}

/// A destination for assembled output.
pub trait Output {
    /// Path or label used in error messages.
    fn destination_path(&self) -> &str;

    fn write(&mut self, data: OutputData<'_>) -> Result<()>;
}

/// In-memory destination.
pub struct StringOutput {
    encoding: String,
    handler: ErrorHandler,
    data: Vec<u8>,
}

impl StringOutput {
    pub fn new(encoding: impl Into<String>, handler: ErrorHandler) -> Self {
        Self {
            encoding: encoding.into(),
            handler,
            data: Vec::new(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Contents as text, if they are valid UTF-8.
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}

impl Default for StringOutput {
    fn default() -> Self {
        Self::new("utf-8", ErrorHandler::Strict)
    }
}

impl Output for StringOutput {
    fn destination_path(&self) -> &str {
        "<string>"
    }

    fn write(&mut self, data: OutputData<'_>) -> Result<()> {
        self.data = match data {
            OutputData::Text(text) => encode(text, "<string>", &self.encoding, self.handler)?,
            OutputData::Bytes(bytes) => bytes.to_vec(),
        };
        Ok(())
    }
}

/// File destination. The file is created (or truncated) on write.
pub struct FileOutput {
    path: PathBuf,
    destination_path: String,
    encoding: String,
    handler: ErrorHandler,
}

impl FileOutput {
    pub fn new(path: impl Into<PathBuf>, encoding: impl Into<String>, handler: ErrorHandler) -> Self {
        let path = path.into();
        Self {
            destination_path: path.display().to_string(),
            path,
            encoding: encoding.into(),
            handler,
        }
    }
}

impl Output for FileOutput {
    fn destination_path(&self) -> &str {
        &self.destination_path
    }

    fn write(&mut self, data: OutputData<'_>) -> Result<()> {
        let bytes = match data {
            OutputData::Text(text) => {
                encode(text, &self.destination_path, &self.encoding, self.handler)?
            }
            OutputData::Bytes(bytes) => bytes.to_vec(),
        };
        fs::write(&self.path, bytes)?;
        log::debug!("wrote {}", self.destination_path);
        Ok(())
    }
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullOutput;

impl Output for NullOutput {
    fn destination_path(&self) -> &str {
        "null output"
    }

    fn write(&mut self, _data: OutputData<'_>) -> Result<()> {
        Ok(())
    }
}

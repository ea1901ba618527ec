//! One-call entry points: look up a writer, translate, write.

use crate::error::Result;
use crate::io::{Output, OutputData};
use crate::nodes::Document;
use crate::settings::Settings;
use crate::writers::{Parts, writer_for};

/// Render `doc` with the named writer and return all parts.
///
/// ```
/// use docweave::nodes::{Document, Tag};
/// use docweave::publish_parts;
/// use docweave::settings::Settings;
///
/// let mut doc = Document::default();
/// doc.add_with_text(doc.root(), Tag::Paragraph, "Hi");
/// let parts = publish_parts(&doc, "pseudoxml", &Settings::default())?;
/// assert!(parts.whole().contains("<paragraph>"));
/// # Ok::<(), docweave::Error>(())
/// ```
pub fn publish_parts(doc: &Document, writer_name: &str, settings: &Settings) -> Result<Parts> {
    let writer = writer_for(writer_name)?;
    writer.translate(doc, settings)
}

/// Render `doc` and write the `whole` part to `output`.
///
/// Returns the parts so callers can still inspect diagnostics.
pub fn publish(
    doc: &Document,
    writer_name: &str,
    settings: &Settings,
    output: &mut dyn Output,
) -> Result<Parts> {
    let parts = publish_parts(doc, writer_name, settings)?;
    output.write(OutputData::Text(parts.whole()))?;
    log::debug!(
        "{writer_name}: wrote {} bytes to {}",
        parts.whole().len(),
        output.destination_path()
    );
    Ok(parts)
}

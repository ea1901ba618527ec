//! Media type detection for referenced resources.

// ============================================================================
// Resource Format Detection
// ============================================================================

/// Detected media format of an image or video reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFormat {
    Jpeg,
    Png,
    Gif,
    /// SVG image (vector, inlined as markup when embedded)
    Svg,
    WebP,
    Avif,
    Mp4,
    WebM,
    Ogg,
    /// Unknown/binary format
    Binary,
}

impl MediaFormat {
    /// Get the MIME type string for this format.
    pub fn mime_type(self) -> &'static str {
        match self {
            MediaFormat::Jpeg => "image/jpeg",
            MediaFormat::Png => "image/png",
            MediaFormat::Gif => "image/gif",
            MediaFormat::Svg => "image/svg+xml",
            MediaFormat::WebP => "image/webp",
            MediaFormat::Avif => "image/avif",
            MediaFormat::Mp4 => "video/mp4",
            MediaFormat::WebM => "video/webm",
            MediaFormat::Ogg => "video/ogg",
            MediaFormat::Binary => "application/octet-stream",
        }
    }

    /// Whether this is rendered with `<video>` rather than `<img>`.
    pub fn is_video(self) -> bool {
        matches!(self, MediaFormat::Mp4 | MediaFormat::WebM | MediaFormat::Ogg)
    }
}

/// Detect the media format from a URI's extension.
///
/// Query strings and fragments are ignored.
pub fn media_format_from_uri(uri: &str) -> MediaFormat {
    let path = uri.split(['?', '#']).next().unwrap_or(uri);
    let Some((_, extension)) = path.rsplit_once('.') else {
        return MediaFormat::Binary;
    };
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => MediaFormat::Jpeg,
        "png" => MediaFormat::Png,
        "gif" => MediaFormat::Gif,
        "svg" => MediaFormat::Svg,
        "webp" => MediaFormat::WebP,
        "avif" => MediaFormat::Avif,
        "mp4" => MediaFormat::Mp4,
        "webm" => MediaFormat::WebM,
        "ogg" | "ogv" => MediaFormat::Ogg,
        _ => MediaFormat::Binary,
    }
}

/// Detect the media format from the URI, falling back to magic bytes.
pub fn detect_media_format(uri: &str, data: &[u8]) -> MediaFormat {
    let from_uri = media_format_from_uri(uri);
    if from_uri != MediaFormat::Binary {
        return from_uri;
    }

    match data {
        [0xFF, 0xD8, 0xFF, ..] => MediaFormat::Jpeg,
        [0x89, b'P', b'N', b'G', ..] => MediaFormat::Png,
        [b'G', b'I', b'F', b'8', ..] => MediaFormat::Gif,
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => MediaFormat::WebP,
        [_, _, _, _, b'f', b't', b'y', b'p', b'a', b'v', b'i', b'f', ..] => MediaFormat::Avif,
        [_, _, _, _, b'f', b't', b'y', b'p', ..] => MediaFormat::Mp4,
        [0x1A, 0x45, 0xDF, 0xA3, ..] => MediaFormat::WebM,
        [b'O', b'g', b'g', b'S', ..] => MediaFormat::Ogg,
        _ if looks_like_svg(data) => MediaFormat::Svg,
        _ => MediaFormat::Binary,
    }
}

fn looks_like_svg(data: &[u8]) -> bool {
    let head = &data[..data.len().min(512)];
    memchr::memmem::find(head, b"<svg").is_some()
}

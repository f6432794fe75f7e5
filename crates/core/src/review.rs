//! Review domain types.
//!
//! These are the value objects that flow through the pipeline:
//! a trigger arrives with a target image → the reference store yields
//! examples → the builder assembles an ordered `ReviewRequest` → the
//! reviewer returns a `ReviewResult`. Everything here is built fresh per
//! triggering event and never persisted.

use serde::{Deserialize, Serialize};

/// Raster formats accepted by the hosted vision model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageFormat {
    /// The MIME type string used in data URLs.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
        }
    }

    /// Sniff the format from magic bytes. Returns `None` when the bytes
    /// match no supported format.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(ImageFormat::Gif)
        } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
            Some(ImageFormat::Webp)
        } else {
            None
        }
    }

    /// Parse a MIME type string (e.g. from a chat attachment).
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            "image/png" => Some(ImageFormat::Png),
            "image/gif" => Some(ImageFormat::Gif),
            "image/webp" => Some(ImageFormat::Webp),
            _ => None,
        }
    }
}

/// The image under review, fetched from the triggering upload.
///
/// Discarded after the request completes.
#[derive(Debug, Clone)]
pub struct TargetImage {
    /// Raw image bytes.
    pub bytes: Vec<u8>,
    /// Detected format. Defaults to PNG when the bytes are unrecognised,
    /// matching what most providers accept as the safe fallback.
    pub format: ImageFormat,
}

impl TargetImage {
    /// Build a target image, sniffing the format from the bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let format = ImageFormat::sniff(&bytes).unwrap_or(ImageFormat::Png);
        Self { bytes, format }
    }

    /// Build a target image with a format hint (e.g. a MIME type from the
    /// chat platform). Magic bytes win over the hint when they disagree.
    pub fn with_mime_hint(bytes: Vec<u8>, mime: Option<&str>) -> Self {
        let format = ImageFormat::sniff(&bytes)
            .or_else(|| mime.and_then(ImageFormat::from_mime))
            .unwrap_or(ImageFormat::Png);
        Self { bytes, format }
    }
}

/// A previously scored image plus its narrative performance description.
///
/// Read fresh from the reference store on every review request, immutable
/// for the duration of one request.
#[derive(Debug, Clone)]
pub struct ReferenceExample {
    /// Image filename, unique within the reference directory.
    pub identifier: String,
    /// Free-form performance narrative from the reference table.
    pub performance_text: String,
    /// The example image bytes.
    pub image_bytes: Vec<u8>,
}

/// One part of a multi-part review request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentPart {
    /// A text fragment (instruction, performance narrative, or closing prompt).
    Text { text: String },
    /// A base64-encoded image with its MIME type.
    Image { media_type: String, data: String },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    pub fn image(format: ImageFormat, data: impl Into<String>) -> Self {
        ContentPart::Image {
            media_type: format.mime_type().into(),
            data: data.into(),
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, ContentPart::Image { .. })
    }
}

/// An ordered multi-part request for the hosted vision model.
///
/// Ordering is load-bearing: the instruction text refers to "the
/// following examples" positionally. Built fresh per invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRequest {
    /// Model identifier (e.g. "gpt-4o").
    pub model: String,
    /// Maximum tokens for the critique.
    pub max_tokens: u32,
    /// Ordered content parts: instruction, reference pairs, target, closing.
    pub parts: Vec<ContentPart>,
}

/// The verbatim model output.
///
/// No structured parsing into score/strengths/weaknesses is guaranteed —
/// formatting is advisory text within the response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewResult {
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniff_jpeg() {
        let bytes = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        assert_eq!(ImageFormat::sniff(&bytes), Some(ImageFormat::Jpeg));
    }

    #[test]
    fn sniff_png() {
        let bytes = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00];
        assert_eq!(ImageFormat::sniff(&bytes), Some(ImageFormat::Png));
    }

    #[test]
    fn sniff_gif_and_webp() {
        assert_eq!(ImageFormat::sniff(b"GIF89a..."), Some(ImageFormat::Gif));
        let mut webp = b"RIFF".to_vec();
        webp.extend_from_slice(&[0, 0, 0, 0]);
        webp.extend_from_slice(b"WEBPVP8 ");
        assert_eq!(ImageFormat::sniff(&webp), Some(ImageFormat::Webp));
    }

    #[test]
    fn sniff_unknown_returns_none() {
        assert_eq!(ImageFormat::sniff(b"not an image"), None);
        assert_eq!(ImageFormat::sniff(&[]), None);
    }

    #[test]
    fn target_image_defaults_to_png() {
        let img = TargetImage::from_bytes(b"garbage bytes".to_vec());
        assert_eq!(img.format, ImageFormat::Png);
    }

    #[test]
    fn mime_hint_used_when_sniff_fails() {
        let img = TargetImage::with_mime_hint(b"opaque".to_vec(), Some("image/jpeg"));
        assert_eq!(img.format, ImageFormat::Jpeg);
    }

    #[test]
    fn magic_bytes_win_over_mime_hint() {
        let bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        let img = TargetImage::with_mime_hint(bytes, Some("image/jpeg"));
        assert_eq!(img.format, ImageFormat::Png);
    }

    #[test]
    fn from_mime_accepts_jpg_alias() {
        assert_eq!(ImageFormat::from_mime("image/jpg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_mime("IMAGE/PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_mime("application/pdf"), None);
    }

    #[test]
    fn content_part_constructors() {
        let text = ContentPart::text("Review this");
        assert!(!text.is_image());

        let image = ContentPart::image(ImageFormat::Png, "aGVsbG8=");
        assert!(image.is_image());
        match image {
            ContentPart::Image { media_type, .. } => assert_eq!(media_type, "image/png"),
            _ => unreachable!(),
        }
    }

    #[test]
    fn content_part_serialization() {
        let part = ContentPart::text("hello");
        let json = serde_json::to_string(&part).unwrap();
        assert!(json.contains("\"kind\":\"text\""));
    }
}

//! Review request builder.
//!
//! Assembles the ordered multi-part request: one fixed instruction part,
//! then each reference image immediately followed by its performance
//! narrative (table order preserved — the instruction refers to "the
//! following examples" positionally), then the target image and a closing
//! score-and-rationale prompt.
//!
//! Pure transformation: no I/O, no network. Encoding failures abort the
//! request before any network call is made.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use shotscore_core::error::EncodingError;
use shotscore_core::review::{
    ContentPart, ImageFormat, ReferenceExample, ReviewRequest, TargetImage,
};

/// Instruction shown when reference examples are available.
fn instruction_with_references(count: usize) -> String {
    format!(
        "You are a photography reviewer. You will score a new image against \
         past examples. The following {count} example image(s) are shown in \
         order, each immediately followed by notes on how that image \
         performed. Use them as comparative context for your scoring."
    )
}

/// Instruction shown for a context-free scoring request.
const INSTRUCTION_NO_REFERENCES: &str =
    "You are a photography reviewer. No prior examples are available, so \
     score the image on its own merits.";

/// Closing prompt attached after the target image.
const CLOSING_PROMPT: &str =
    "This is the image to review. Give it a score out of 10 and a short \
     rationale covering its main strengths and weaknesses.";

/// Build a `ReviewRequest` from the target image and the reference
/// sequence.
///
/// Zero references is permitted: the request then contains only the
/// instruction text, the target image, and the closing prompt.
pub fn build_review_request(
    model: impl Into<String>,
    max_tokens: u32,
    target: &TargetImage,
    references: &[ReferenceExample],
) -> Result<ReviewRequest, EncodingError> {
    let mut parts = Vec::with_capacity(2 * references.len() + 3);

    if references.is_empty() {
        parts.push(ContentPart::text(INSTRUCTION_NO_REFERENCES));
    } else {
        parts.push(ContentPart::text(instruction_with_references(
            references.len(),
        )));
    }

    for reference in references {
        parts.push(encode_image(
            &reference.identifier,
            &reference.image_bytes,
            ImageFormat::sniff(&reference.image_bytes).unwrap_or(ImageFormat::Png),
        )?);
        parts.push(ContentPart::text(&reference.performance_text));
    }

    parts.push(encode_image("target", &target.bytes, target.format)?);
    parts.push(ContentPart::text(CLOSING_PROMPT));

    Ok(ReviewRequest {
        model: model.into(),
        max_tokens,
        parts,
    })
}

fn encode_image(
    identifier: &str,
    bytes: &[u8],
    format: ImageFormat,
) -> Result<ContentPart, EncodingError> {
    if bytes.is_empty() {
        return Err(EncodingError::EmptyImage {
            identifier: identifier.to_string(),
        });
    }
    Ok(ContentPart::image(format, BASE64.encode(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00];
    const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00];

    fn reference(id: &str, text: &str) -> ReferenceExample {
        ReferenceExample {
            identifier: id.into(),
            performance_text: text.into(),
            image_bytes: PNG_BYTES.to_vec(),
        }
    }

    fn target() -> TargetImage {
        TargetImage::from_bytes(JPEG_BYTES.to_vec())
    }

    #[test]
    fn interleaves_references_in_order() {
        let refs = vec![reference("a.png", "Sharp focus"), reference("b.png", "Flat light")];
        let request = build_review_request("gpt-4o", 500, &target(), &refs).unwrap();

        // instruction, (image, text) x2, target image, closing prompt
        assert_eq!(request.parts.len(), 7);
        assert!(!request.parts[0].is_image());
        assert!(request.parts[1].is_image());
        assert_eq!(request.parts[2], ContentPart::text("Sharp focus"));
        assert!(request.parts[3].is_image());
        assert_eq!(request.parts[4], ContentPart::text("Flat light"));
        assert!(request.parts[5].is_image());
        assert!(!request.parts[6].is_image());
    }

    #[test]
    fn target_image_is_last_image_part() {
        let refs = vec![reference("a.png", "ok")];
        let request = build_review_request("gpt-4o", 500, &target(), &refs).unwrap();
        let last_image = request.parts.iter().rev().find(|p| p.is_image()).unwrap();
        match last_image {
            ContentPart::Image { media_type, .. } => assert_eq!(media_type, "image/jpeg"),
            _ => unreachable!(),
        }
    }

    #[test]
    fn zero_references_still_well_formed() {
        let request = build_review_request("gpt-4o", 500, &target(), &[]).unwrap();
        assert_eq!(request.parts.len(), 3);
        match &request.parts[0] {
            ContentPart::Text { text } => assert!(text.contains("own merits")),
            _ => unreachable!(),
        }
        assert!(request.parts[1].is_image());
    }

    #[test]
    fn instruction_names_reference_count() {
        let refs = vec![
            reference("a.png", "A"),
            reference("b.png", "B"),
            reference("c.png", "C"),
        ];
        let request = build_review_request("gpt-4o", 500, &target(), &refs).unwrap();
        match &request.parts[0] {
            ContentPart::Text { text } => assert!(text.contains('3')),
            _ => unreachable!(),
        }
    }

    #[test]
    fn empty_target_bytes_is_encoding_error() {
        let empty = TargetImage::from_bytes(Vec::new());
        let err = build_review_request("gpt-4o", 500, &empty, &[]).unwrap_err();
        assert!(err.to_string().contains("target"));
    }

    #[test]
    fn empty_reference_bytes_is_encoding_error() {
        let mut bad = reference("broken.png", "text");
        bad.image_bytes.clear();
        let err = build_review_request("gpt-4o", 500, &target(), &[bad]).unwrap_err();
        assert!(err.to_string().contains("broken.png"));
    }

    #[test]
    fn image_payload_is_base64() {
        let request = build_review_request("gpt-4o", 500, &target(), &[]).unwrap();
        match &request.parts[1] {
            ContentPart::Image { data, .. } => {
                assert_eq!(BASE64.decode(data).unwrap(), JPEG_BYTES);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn model_and_max_tokens_carried_through() {
        let request = build_review_request("gpt-4o-mini", 350, &target(), &[]).unwrap();
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.max_tokens, 350);
    }

    #[test]
    fn identical_inputs_build_identical_requests() {
        let refs = vec![reference("a.png", "Sharp")];
        let t = target();
        let one = build_review_request("gpt-4o", 500, &t, &refs).unwrap();
        let two = build_review_request("gpt-4o", 500, &t, &refs).unwrap();
        assert_eq!(one.parts, two.parts);
    }
}

//! OpenAI-compatible vision reviewer.
//!
//! Works with OpenAI and any endpoint exposing a compatible
//! `/v1/chat/completions` route with `image_url` content support.
//!
//! One POST per invocation, no internal retry, stateless across
//! invocations. Provider failures map onto `ReviewServiceError` with the
//! provider's error payload attached.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shotscore_core::error::ReviewServiceError;
use shotscore_core::review::{ContentPart, ReviewRequest, ReviewResult};
use shotscore_core::reviewer::Reviewer;
use tracing::{debug, warn};

/// A reviewer backed by an OpenAI-compatible chat completions endpoint.
pub struct OpenAiVisionReviewer {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiVisionReviewer {
    /// Create a new reviewer against an arbitrary compatible endpoint.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Create an OpenAI reviewer (convenience constructor).
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new("openai", "https://api.openai.com/v1", api_key)
    }

    /// Convert ordered content parts to the OpenAI content array format.
    ///
    /// Images become data-URL `image_url` entries so no public hosting is
    /// required.
    fn to_api_content(parts: &[ContentPart]) -> Vec<ApiContentPart> {
        parts
            .iter()
            .map(|part| match part {
                ContentPart::Text { text } => ApiContentPart::Text { text: text.clone() },
                ContentPart::Image { media_type, data } => ApiContentPart::ImageUrl {
                    image_url: ApiImageUrl {
                        url: format!("data:{media_type};base64,{data}"),
                    },
                },
            })
            .collect()
    }
}

#[async_trait]
impl Reviewer for OpenAiVisionReviewer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn review(
        &self,
        request: ReviewRequest,
    ) -> std::result::Result<ReviewResult, ReviewServiceError> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = serde_json::json!({
            "model": request.model,
            "messages": [ApiMessage {
                role: "user".into(),
                content: Self::to_api_content(&request.parts),
            }],
            "max_tokens": request.max_tokens,
        });

        debug!(
            reviewer = %self.name,
            model = %request.model,
            parts = request.parts.len(),
            "Sending review request"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ReviewServiceError::Timeout(e.to_string())
                } else {
                    ReviewServiceError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(ReviewServiceError::RateLimited {
                retry_after_secs: 5,
            });
        }

        if status == 401 || status == 403 {
            return Err(ReviewServiceError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Review provider returned error");
            return Err(ReviewServiceError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ReviewServiceError::MalformedResponse(e.to_string()))?;

        let choice = api_response.choices.into_iter().next().ok_or_else(|| {
            ReviewServiceError::MalformedResponse("No choices in response".into())
        })?;

        let text = choice.message.content.unwrap_or_default();
        if text.is_empty() {
            return Err(ReviewServiceError::MalformedResponse(
                "Empty completion content".into(),
            ));
        }

        Ok(ReviewResult { text })
    }

    async fn health_check(&self) -> std::result::Result<bool, ReviewServiceError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| ReviewServiceError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    content: Vec<ApiContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiContentPart {
    Text { text: String },
    ImageUrl { image_url: ApiImageUrl },
}

#[derive(Debug, Serialize)]
struct ApiImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use shotscore_core::review::ImageFormat;

    #[test]
    fn openai_constructor() {
        let reviewer = OpenAiVisionReviewer::openai("sk-test");
        assert_eq!(reviewer.name(), "openai");
        assert!(reviewer.base_url.contains("api.openai.com"));
    }

    #[test]
    fn trailing_slash_stripped() {
        let reviewer = OpenAiVisionReviewer::new("local", "http://localhost:8080/v1/", "key");
        assert_eq!(reviewer.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn content_conversion_preserves_order() {
        let parts = vec![
            ContentPart::text("Instruction"),
            ContentPart::image(ImageFormat::Png, "aGVsbG8="),
            ContentPart::text("Closing"),
        ];
        let api_parts = OpenAiVisionReviewer::to_api_content(&parts);
        assert_eq!(api_parts.len(), 3);
        assert!(matches!(api_parts[0], ApiContentPart::Text { .. }));
        assert!(matches!(api_parts[1], ApiContentPart::ImageUrl { .. }));
        assert!(matches!(api_parts[2], ApiContentPart::Text { .. }));
    }

    #[test]
    fn image_part_becomes_data_url() {
        let parts = vec![ContentPart::image(ImageFormat::Jpeg, "QUJD")];
        let api_parts = OpenAiVisionReviewer::to_api_content(&parts);
        match &api_parts[0] {
            ApiContentPart::ImageUrl { image_url } => {
                assert_eq!(image_url.url, "data:image/jpeg;base64,QUJD");
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn content_part_wire_format() {
        let parts = vec![
            ContentPart::text("hello"),
            ContentPart::image(ImageFormat::Png, "QUJD"),
        ];
        let json = serde_json::to_string(&OpenAiVisionReviewer::to_api_content(&parts)).unwrap();
        assert!(json.contains(r#""type":"text"#));
        assert!(json.contains(r#""type":"image_url"#));
        assert!(json.contains("data:image/png;base64,QUJD"));
    }

    #[test]
    fn parse_completion_response() {
        let data = r#"{
            "id": "chatcmpl-123",
            "model": "gpt-4o",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "Score: 7/10. Strong composition."}, "finish_reason": "stop"}
            ],
            "usage": {"prompt_tokens": 900, "completion_tokens": 40, "total_tokens": 940}
        }"#;
        let parsed: ApiResponse = serde_json::from_str(data).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("Score: 7/10. Strong composition.")
        );
    }

    #[test]
    fn parse_response_with_null_content() {
        let data = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        let parsed: ApiResponse = serde_json::from_str(data).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }

    #[test]
    fn parse_empty_choices() {
        let data = r#"{"choices":[]}"#;
        let parsed: ApiResponse = serde_json::from_str(data).unwrap();
        assert!(parsed.choices.is_empty());
    }
}

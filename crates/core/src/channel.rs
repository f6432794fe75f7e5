//! ChatChannel trait — the abstraction over the chat platform.
//!
//! A ChatChannel delivers triggering events (a bot mention carrying an
//! image upload), downloads attachments, and posts threaded replies back
//! into the originating conversation.

use crate::error::RelayError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a channel instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An uploaded file referenced by a triggering event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    /// Platform-specific file identifier.
    pub id: String,

    /// Private download URL (authorized fetch required).
    pub url: String,

    /// Optional filename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// MIME type as reported by the platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// File size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

impl Attachment {
    /// Whether the platform reported this as an image upload.
    pub fn is_image(&self) -> bool {
        self.mime_type
            .as_deref()
            .is_some_and(|m| m.to_ascii_lowercase().starts_with("image/"))
    }
}

/// A mention-with-attachment event: the bot was addressed in a message
/// that also carries an image upload. Every trigger starts a fresh
/// pipeline instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewTrigger {
    /// The conversation (channel/group/DM) the trigger arrived in.
    pub chat_id: String,

    /// Thread anchor — the reply must nest under this message.
    pub thread_ts: String,

    /// Platform-specific sender ID.
    pub sender_id: String,

    /// The image upload to review.
    pub attachment: Attachment,

    /// Internal event id for log correlation.
    pub event_id: String,

    /// When the event was received.
    pub received_at: DateTime<Utc>,
}

impl ReviewTrigger {
    pub fn new(
        chat_id: impl Into<String>,
        thread_ts: impl Into<String>,
        sender_id: impl Into<String>,
        attachment: Attachment,
    ) -> Self {
        Self {
            chat_id: chat_id.into(),
            thread_ts: thread_ts.into(),
            sender_id: sender_id.into(),
            attachment,
            event_id: Uuid::new_v4().to_string(),
            received_at: Utc::now(),
        }
    }
}

/// A secondary event that warrants a short usage hint rather than a
/// review: a file shared without a mention, or a mention without files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuidanceTrigger {
    pub chat_id: String,
    pub thread_ts: String,
    pub sender_id: String,
}

/// An inbound event from the chat platform, already classified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InboundEvent {
    /// Mention with an image attachment — run the review pipeline.
    Review(ReviewTrigger),
    /// Everything else the bot should acknowledge with a usage hint.
    Guidance(GuidanceTrigger),
}

/// The core ChatChannel trait.
///
/// Implementations handle platform-specific connection logic, payload
/// parsing, and authentication.
#[async_trait]
pub trait ChatChannel: Send + Sync {
    /// Human-readable channel name (e.g. "slack").
    fn name(&self) -> &str;

    /// Unique ID for this channel instance.
    fn id(&self) -> &ChannelId;

    /// Start listening for triggering events.
    ///
    /// Returns a receiver that yields classified inbound events. The
    /// channel implementation handles its transport (socket mode,
    /// webhooks) internally.
    async fn start(
        &self,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<InboundEvent, RelayError>>,
        RelayError,
    >;

    /// Download the bytes of an uploaded attachment.
    async fn download_attachment(
        &self,
        attachment: &Attachment,
    ) -> std::result::Result<Vec<u8>, RelayError>;

    /// Post `text` as a threaded reply under `thread_ts` in `chat_id`.
    ///
    /// Single attempt — at-least-once delivery is not guaranteed.
    async fn post_reply(
        &self,
        chat_id: &str,
        thread_ts: &str,
        text: &str,
    ) -> std::result::Result<(), RelayError>;

    /// Check if a sender is allowed (allowlist check).
    fn is_allowed(&self, sender_id: &str) -> bool;

    /// Stop the channel gracefully.
    async fn stop(&self) -> std::result::Result<(), RelayError> {
        Ok(())
    }

    /// Health check — is the channel connected and operational?
    async fn health_check(&self) -> std::result::Result<bool, RelayError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_attachment() -> Attachment {
        Attachment {
            id: "F012AB3CD".into(),
            url: "https://files.example.com/download/photo.jpg".into(),
            filename: Some("photo.jpg".into()),
            mime_type: Some("image/jpeg".into()),
            size_bytes: Some(102_400),
        }
    }

    #[test]
    fn attachment_image_detection() {
        assert!(image_attachment().is_image());

        let doc = Attachment {
            mime_type: Some("application/pdf".into()),
            ..image_attachment()
        };
        assert!(!doc.is_image());

        let unknown = Attachment {
            mime_type: None,
            ..image_attachment()
        };
        assert!(!unknown.is_image());
    }

    #[test]
    fn trigger_carries_thread_anchor() {
        let trigger = ReviewTrigger::new("C789", "1712345678.000100", "U123", image_attachment());
        assert_eq!(trigger.chat_id, "C789");
        assert_eq!(trigger.thread_ts, "1712345678.000100");
        assert!(!trigger.event_id.is_empty());
    }

    #[test]
    fn triggers_get_distinct_event_ids() {
        let a = ReviewTrigger::new("C1", "1.0", "U1", image_attachment());
        let b = ReviewTrigger::new("C1", "1.0", "U1", image_attachment());
        assert_ne!(a.event_id, b.event_id);
    }

    #[test]
    fn inbound_event_serialization_roundtrip() {
        let event = InboundEvent::Guidance(GuidanceTrigger {
            chat_id: "C1".into(),
            thread_ts: "1.0".into(),
            sender_id: "U1".into(),
        });
        let json = serde_json::to_string(&event).unwrap();
        let back: InboundEvent = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, InboundEvent::Guidance(_)));
    }
}

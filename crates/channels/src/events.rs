//! Slack event payload parsing and trigger classification.
//!
//! The Socket Mode transport delivers event envelopes; this module turns
//! the inner event into a classified `InboundEvent`:
//!
//! - a mention whose message carries at least one image upload is the
//!   review path;
//! - a mention without an image, or a bare `file_shared`, gets a usage
//!   hint instead — the bot never silently ignores someone who addressed
//!   it or uploaded a file for it.
//!
//! Classification happens once per envelope, mention-with-files checked
//! first, so the two trigger kinds can never double-fire for one message.

use serde::Deserialize;
use shotscore_core::channel::{Attachment, GuidanceTrigger, InboundEvent, ReviewTrigger};
use tracing::{debug, info};

/// The inner Slack event, as found under `payload.event` in a Socket
/// Mode envelope (fields we consume; the rest is ignored).
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlackEvent {
    /// The bot was @-mentioned in a message.
    AppMention {
        user: String,
        channel: String,
        ts: String,
        /// Present when the mention itself was inside a thread.
        #[serde(default)]
        thread_ts: Option<String>,
        #[serde(default)]
        files: Vec<SlackFile>,
    },
    /// A file was shared in a conversation the bot can see.
    FileShared {
        user_id: String,
        channel_id: String,
        event_ts: String,
    },
    /// Any event type we don't handle.
    #[serde(other)]
    Other,
}

/// A file object attached to a Slack message.
#[derive(Debug, Clone, Deserialize)]
pub struct SlackFile {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mimetype: Option<String>,
    #[serde(default)]
    pub url_private_download: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

impl SlackFile {
    fn is_image(&self) -> bool {
        self.mimetype
            .as_deref()
            .is_some_and(|m| m.to_ascii_lowercase().starts_with("image/"))
    }

    fn into_attachment(self) -> Option<Attachment> {
        let url = self.url_private_download?;
        Some(Attachment {
            id: self.id,
            url,
            filename: self.name,
            mime_type: self.mimetype,
            size_bytes: self.size,
        })
    }
}

/// Classify a parsed Slack event into a pipeline trigger.
///
/// Returns `None` for events the bot has nothing to say about (unknown
/// event kinds, mentions with a non-downloadable image).
pub fn classify(event: SlackEvent) -> Option<InboundEvent> {
    match event {
        SlackEvent::AppMention {
            user,
            channel,
            ts,
            thread_ts,
            files,
        } => {
            // Reply threads under the existing thread when the mention
            // was already threaded, otherwise under the mention itself.
            let anchor = thread_ts.unwrap_or_else(|| ts.clone());

            let image = files.into_iter().find(|f| f.is_image());
            match image {
                Some(file) => match file.into_attachment() {
                    Some(attachment) => Some(InboundEvent::Review(ReviewTrigger::new(
                        channel, anchor, user, attachment,
                    ))),
                    None => {
                        info!(chat_id = %channel, "Image upload has no download URL, skipping");
                        None
                    }
                },
                None => {
                    debug!(chat_id = %channel, "Mention without image upload");
                    Some(InboundEvent::Guidance(GuidanceTrigger {
                        chat_id: channel,
                        thread_ts: anchor,
                        sender_id: user,
                    }))
                }
            }
        }
        SlackEvent::FileShared {
            user_id,
            channel_id,
            event_ts,
        } => Some(InboundEvent::Guidance(GuidanceTrigger {
            chat_id: channel_id,
            thread_ts: event_ts,
            sender_id: user_id,
        })),
        SlackEvent::Other => None,
    }
}

/// Parse the raw JSON of an inner Slack event and classify it.
pub fn classify_json(raw: &serde_json::Value) -> Option<InboundEvent> {
    match serde_json::from_value::<SlackEvent>(raw.clone()) {
        Ok(event) => classify(event),
        Err(e) => {
            debug!(error = %e, "Unparseable Slack event, ignoring");
            None
        }
    }
}

//! The review pipeline — per-event orchestration.
//!
//! Each triggering event runs one fresh pipeline pass:
//!
//! ```text
//! Idle → AwaitingContext → AwaitingModelResponse → Posting → Idle
//! ```
//!
//! Any step's failure surfaces the error (logged with the conversation id
//! and the trigger timestamp) and the pass ends — no partial state is
//! retained across events. Events are handled as independent spawned
//! tasks, each carrying its own thread anchor, so concurrent reviews can
//! never post into each other's threads.

use shotscore_context::{build_review_request, ReferenceStore};
use shotscore_core::channel::{ChatChannel, GuidanceTrigger, InboundEvent, ReviewTrigger};
use shotscore_core::error::Error;
use shotscore_core::review::TargetImage;
use shotscore_core::reviewer::Reviewer;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Posted while the model call is in flight.
fn ack_text(sender_id: &str) -> String {
    format!("Thanks <@{sender_id}>! I've received your image and I'm scoring it now...")
}

/// Posted when the review provider fails.
const APOLOGY_TEXT: &str =
    "Sorry, I ran into a problem while getting this image reviewed. Please try again later.";

/// Posted for triggers that don't carry a reviewable image.
const GUIDANCE_TEXT: &str =
    "Hi! Share an image and mention me in the same message, and I'll score it for you.";

/// The review pipeline. One instance serves all events; every call to
/// [`handle_review`](ReviewPipeline::handle_review) is an independent
/// pass with no shared mutable state.
pub struct ReviewPipeline {
    channel: Arc<dyn ChatChannel>,
    reviewer: Arc<dyn Reviewer>,
    store: ReferenceStore,
    model: String,
    max_tokens: u32,
}

impl ReviewPipeline {
    pub fn new(
        channel: Arc<dyn ChatChannel>,
        reviewer: Arc<dyn Reviewer>,
        store: ReferenceStore,
        model: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            channel,
            reviewer,
            store,
            model: model.into(),
            max_tokens,
        }
    }

    /// Consume the channel's event stream until it closes, spawning one
    /// task per event.
    pub async fn run(self: Arc<Self>) -> Result<(), Error> {
        let mut rx = self.channel.start().await.map_err(Error::Relay)?;
        info!(channel = %self.channel.name(), "Review pipeline running");

        while let Some(event) = rx.recv().await {
            match event {
                Ok(event) => {
                    let pipeline = Arc::clone(&self);
                    tokio::spawn(async move {
                        pipeline.dispatch(event).await;
                    });
                }
                Err(e) => warn!(error = %e, "Channel delivered an error event"),
            }
        }

        info!("Channel event stream closed, pipeline stopping");
        Ok(())
    }

    /// Route a classified event to its handler.
    pub async fn dispatch(&self, event: InboundEvent) {
        match event {
            InboundEvent::Review(trigger) => self.handle_review(trigger).await,
            InboundEvent::Guidance(trigger) => self.handle_guidance(trigger).await,
        }
    }

    /// Run one full review pass for a mention-with-attachment trigger.
    pub async fn handle_review(&self, trigger: ReviewTrigger) {
        if !self.channel.is_allowed(&trigger.sender_id) {
            info!(sender_id = %trigger.sender_id, "Sender not on allowlist, ignoring trigger");
            return;
        }

        if let Err(e) = self.review_once(&trigger).await {
            error!(
                chat_id = %trigger.chat_id,
                thread_ts = %trigger.thread_ts,
                event_id = %trigger.event_id,
                received_at = %trigger.received_at,
                error = %e,
                "Review pipeline pass failed"
            );

            // A provider failure still leaves the relay channel usable,
            // so the user gets an apology instead of silence. Context,
            // encoding, and relay failures are logged only.
            if matches!(e, Error::Review(_)) {
                if let Err(post_err) = self
                    .channel
                    .post_reply(&trigger.chat_id, &trigger.thread_ts, APOLOGY_TEXT)
                    .await
                {
                    warn!(
                        chat_id = %trigger.chat_id,
                        error = %post_err,
                        "Failed to post apology reply"
                    );
                }
            }
        }
    }

    /// Reply with a usage hint for triggers without a reviewable image.
    pub async fn handle_guidance(&self, trigger: GuidanceTrigger) {
        if !self.channel.is_allowed(&trigger.sender_id) {
            info!(sender_id = %trigger.sender_id, "Sender not on allowlist, ignoring trigger");
            return;
        }

        if let Err(e) = self
            .channel
            .post_reply(&trigger.chat_id, &trigger.thread_ts, GUIDANCE_TEXT)
            .await
        {
            warn!(chat_id = %trigger.chat_id, error = %e, "Failed to post guidance reply");
        }
    }

    async fn review_once(&self, trigger: &ReviewTrigger) -> Result<(), Error> {
        // The model round-trip can take a while; acknowledge first. A
        // failed acknowledgement is not fatal to the pass.
        if let Err(e) = self
            .channel
            .post_reply(
                &trigger.chat_id,
                &trigger.thread_ts,
                &ack_text(&trigger.sender_id),
            )
            .await
        {
            warn!(chat_id = %trigger.chat_id, error = %e, "Failed to post acknowledgement");
        }

        // AwaitingContext: target bytes + fresh reference read.
        let bytes = self
            .channel
            .download_attachment(&trigger.attachment)
            .await
            .map_err(Error::Relay)?;
        let target = TargetImage::with_mime_hint(bytes, trigger.attachment.mime_type.as_deref());
        let references = self.store.load().map_err(Error::Context)?;

        let request = build_review_request(&self.model, self.max_tokens, &target, &references)
            .map_err(Error::Encoding)?;

        // AwaitingModelResponse: exactly one provider call.
        let result = self
            .reviewer
            .review(request)
            .await
            .map_err(Error::Review)?;

        // Posting: single attempt, threaded under the trigger.
        self.channel
            .post_reply(&trigger.chat_id, &trigger.thread_ts, &result.text)
            .await
            .map_err(Error::Relay)?;

        info!(
            chat_id = %trigger.chat_id,
            thread_ts = %trigger.thread_ts,
            event_id = %trigger.event_id,
            "Review posted"
        );
        Ok(())
    }
}

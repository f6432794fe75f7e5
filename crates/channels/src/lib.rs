//! Chat platform adapters for ShotScore.
//!
//! One platform today: Slack. The adapter classifies inbound events into
//! review/guidance triggers, downloads uploads via the Web API, and posts
//! threaded replies.

pub mod events;
pub mod slack;

pub use slack::{SlackChannel, SlackConfig};

//! # ShotScore Core
//!
//! Domain types, traits, and error definitions for the ShotScore review
//! bridge. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The two external collaborators (the chat platform and the hosted vision
//! model) are defined as traits here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod channel;
pub mod error;
pub mod review;
pub mod reviewer;

// Re-export key types at crate root for ergonomics
pub use channel::{Attachment, ChannelId, ChatChannel, GuidanceTrigger, InboundEvent, ReviewTrigger};
pub use error::{ContextError, EncodingError, Error, RelayError, Result, ReviewServiceError};
pub use review::{ContentPart, ImageFormat, ReferenceExample, ReviewRequest, ReviewResult, TargetImage};
pub use reviewer::Reviewer;

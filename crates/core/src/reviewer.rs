//! Reviewer trait — the abstraction over the hosted vision model.
//!
//! A Reviewer sends one assembled multi-part request to a model endpoint
//! and returns the critique text. Exactly one request per invocation, no
//! internal retry, stateless across invocations. Retry policy, if any,
//! belongs to the calling transport layer.

use crate::error::ReviewServiceError;
use crate::review::{ReviewRequest, ReviewResult};
use async_trait::async_trait;

/// The core Reviewer trait.
///
/// The pipeline calls `review()` without knowing which provider is behind
/// it — pure polymorphism, and trivially mockable in tests.
#[async_trait]
pub trait Reviewer: Send + Sync {
    /// A human-readable name for this reviewer (e.g. "openai").
    fn name(&self) -> &str;

    /// Send the request and await a single response.
    async fn review(
        &self,
        request: ReviewRequest,
    ) -> std::result::Result<ReviewResult, ReviewServiceError>;

    /// Health check — can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ReviewServiceError> {
        Ok(true)
    }
}

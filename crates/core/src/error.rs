//! Error types for the ShotScore domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each stage of the review pipeline has its own error variant, so a
//! failure can always be attributed to context assembly, encoding, the
//! hosted model, or the relay back into the chat thread.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all ShotScore operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Reference context errors ---
    #[error("Context error: {0}")]
    Context(#[from] ContextError),

    // --- Image encoding errors ---
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    // --- Hosted model errors ---
    #[error("Review service error: {0}")]
    Review(#[from] ReviewServiceError),

    // --- Chat relay errors ---
    #[error("Relay error: {0}")]
    Relay(#[from] RelayError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Pipeline stage errors ---

/// Failures while loading the reference table and its images.
///
/// All of these are fatal for the triggering request: with no context
/// available there is nothing sensible to score against. A single row
/// whose image file is absent is *not* an error — the row is skipped
/// with a warning by the store.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Reference table not found at {path}")]
    TableMissing { path: PathBuf },

    #[error("Failed to read reference table at {path}: {reason}")]
    TableUnreadable { path: PathBuf, reason: String },

    #[error("Malformed reference table at {path}: {reason}")]
    TableMalformed { path: PathBuf, reason: String },
}

/// Failures while encoding image bytes for transmission.
///
/// Raised before any network call is made.
#[derive(Debug, Clone, Error)]
pub enum EncodingError {
    #[error("Image '{identifier}' has no bytes to encode")]
    EmptyImage { identifier: String },
}

/// Provider-side failures from the hosted vision model.
///
/// None of these are retried internally — one request per invocation.
#[derive(Debug, Clone, Error)]
pub enum ReviewServiceError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}

/// Failures in the chat platform relay (event intake, attachment
/// download, reply posting).
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Channel not configured: {0}")]
    NotConfigured(String),

    #[error("Reply delivery failed to {chat_id}: {reason}")]
    DeliveryFailed { chat_id: String, reason: String },

    #[error("Attachment download failed: {reason}")]
    DownloadFailed { reason: String },

    #[error("Unauthorized sender: {sender_id}")]
    Unauthorized { sender_id: String },

    #[error("Channel connection lost: {0}")]
    ConnectionLost(String),

    #[error("Invalid event payload: {0}")]
    InvalidPayload(String),
}

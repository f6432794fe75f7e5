//! Reviewer implementations for ShotScore.
//!
//! Currently one backend: any OpenAI-compatible `/chat/completions`
//! endpoint that accepts `image_url` content parts.

pub mod openai_vision;

pub use openai_vision::OpenAiVisionReviewer;

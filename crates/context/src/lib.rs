//! Context assembly for ShotScore — the core of the review pipeline.
//!
//! Two stages:
//! 1. **Reference store** — reads the pipe-delimited performance table and
//!    the matching example images, fresh on every request.
//! 2. **Request builder** — interleaves the references and the target
//!    image into an ordered multi-part `ReviewRequest`.
//!
//! # Determinism
//!
//! Assembly is deterministic: identical table, images, and target always
//! produce an identical request. No random or time-dependent logic.

pub mod builder;
pub mod store;

pub use builder::build_review_request;
pub use store::ReferenceStore;

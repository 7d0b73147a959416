//! Kisan Inference crate - the AI backend client.
//!
//! The [`InferenceClient`] trait is the seam the conversation session calls
//! through; [`HttpInferenceClient`] implements it against the agri backend's
//! JSON endpoint with a bounded per-request timeout. Every failure mode
//! (timeout, transport, non-success status, malformed body) collapses into
//! one failure signal for the session.

pub mod client;
pub mod error;
pub mod http;

pub use client::{InferenceClient, InferenceRequest};
pub use error::InferenceError;
pub use http::HttpInferenceClient;

//! Kisan Media crate - attachment encoding for outgoing chat turns.
//!
//! Validates user-selected bytes as an image and produces the inline
//! [`ImageAttachment`] payload used for both display and transmission.

pub mod encoder;

pub use encoder::{encode, MediaError, MAX_ATTACHMENT_BYTES};

//! Kisan Voice crate - transcription adapter over an optional platform
//! speech-to-text capability.
//!
//! The adapter enforces the idle/listening lifecycle: at most one listening
//! session at a time, capability-unavailable reported as a value rather than
//! a fault, fragments accepted only while listening.

pub mod state;
pub mod transcriber;

pub use state::VoiceState;
pub use transcriber::{SpeechCapability, StartListening, Transcriber, VoiceError};

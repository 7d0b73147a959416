//! Transcription adapter wrapping an optional platform capability.
//!
//! The platform side (a speech recognizer behind [`SpeechCapability`]) is
//! injected; the adapter owns only the lifecycle. Transcribed fragments flow
//! from the platform to the session, which appends them to its compose
//! buffer while the adapter is listening.

use std::sync::Arc;

use kisan_core::error::KisanError;

use crate::state::VoiceState;

/// Errors from the platform speech engine.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    #[error("speech engine error: {0}")]
    Engine(String),
}

impl From<VoiceError> for KisanError {
    fn from(err: VoiceError) -> Self {
        KisanError::Voice(err.to_string())
    }
}

/// Outcome of a start request. Unavailability is a passive notice for the
/// user, not a fault, so it is a value here rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartListening {
    /// The recognizer is now capturing speech.
    Started,
    /// A capture session was already active; the request was a no-op.
    AlreadyListening,
    /// The platform has no usable speech capability.
    Unavailable,
}

/// A platform speech-to-text capability.
///
/// `begin` is expected to deliver transcribed fragments to the session (via
/// whatever glue the platform shell provides) until `end` is called or the
/// utterance finishes naturally.
pub trait SpeechCapability: Send + Sync {
    /// Whether the capability can capture speech on this platform.
    fn is_supported(&self) -> bool;

    /// Start recognizing speech in the given BCP-47 locale.
    fn begin(&self, locale: &str) -> Result<(), VoiceError>;

    /// Stop recognizing. Must be safe to call when not recognizing.
    fn end(&self);
}

/// Lifecycle guard over a single optional [`SpeechCapability`].
///
/// Exactly one adapter exists per session and at most one listening session
/// is active at a time.
pub struct Transcriber {
    capability: Option<Arc<dyn SpeechCapability>>,
    state: VoiceState,
}

impl Transcriber {
    /// Create an adapter over the platform capability, or over nothing on
    /// platforms without speech support.
    pub fn new(capability: Option<Arc<dyn SpeechCapability>>) -> Self {
        Self {
            capability,
            state: VoiceState::Idle,
        }
    }

    /// Whether starting a capture session could ever succeed.
    pub fn is_available(&self) -> bool {
        self.capability.as_ref().is_some_and(|c| c.is_supported())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> VoiceState {
        self.state
    }

    /// Begin a capture session in the given locale.
    ///
    /// Starting while already listening is a guarded no-op; a missing or
    /// unsupported capability yields [`StartListening::Unavailable`]. Only an
    /// engine fault while starting is an actual error.
    pub fn start(&mut self, locale: &str) -> Result<StartListening, VoiceError> {
        if self.state == VoiceState::Listening {
            return Ok(StartListening::AlreadyListening);
        }

        let capability = match &self.capability {
            Some(c) if c.is_supported() => Arc::clone(c),
            _ => return Ok(StartListening::Unavailable),
        };

        capability.begin(locale)?;
        tracing::debug!(locale, "voice capture started");
        self.state = VoiceState::Listening;
        Ok(StartListening::Started)
    }

    /// Stop the capture session. Safe to call when idle.
    pub fn stop(&mut self) {
        if self.state == VoiceState::Listening {
            if let Some(capability) = &self.capability {
                capability.end();
            }
            tracing::debug!("voice capture stopped");
            self.state = VoiceState::Idle;
        }
    }

    /// The recognizer finished an utterance on its own.
    pub fn end_of_utterance(&mut self) {
        if self.state == VoiceState::Listening {
            tracing::debug!("utterance ended");
            self.state = VoiceState::Idle;
        }
    }
}

impl std::fmt::Debug for Transcriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transcriber")
            .field("state", &self.state)
            .field("has_capability", &self.capability.is_some())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

//! The conversation session: transcript, compose buffer, and send pipeline.
//!
//! One `ChatSession` exists per open chat view. All state lives behind
//! `&self` so the session can be shared as an `Arc` between the UI and the
//! tasks it spawns; the busy gate serializes sends, and detached persistence
//! tasks never hold a reference back into the transcript.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use kisan_core::config::ChatConfig;
use kisan_core::events::{EventBus, SessionEvent};
use kisan_core::types::{Language, Role, UserId};
use kisan_inference::{InferenceClient, InferenceRequest};
use kisan_store::HistoryStore;
use kisan_voice::{StartListening, Transcriber, VoiceState};

use crate::types::{AttachOutcome, ComposeBuffer, Message, SendOutcome};

/// Orchestrator for one live chat view.
pub struct ChatSession {
    user_id: UserId,
    language: Language,
    transcript: Mutex<Vec<Message>>,
    compose: Mutex<ComposeBuffer>,
    /// True while an inference call is outstanding. Gates `send` to strict
    /// one-at-a-time turn-taking.
    busy: AtomicBool,
    voice: Mutex<Transcriber>,
    store: Arc<dyn HistoryStore>,
    inference: Arc<dyn InferenceClient>,
    events: EventBus,
    history_page_size: usize,
}

impl ChatSession {
    /// Create a session for an authenticated user.
    ///
    /// Identity and every external collaborator are injected here; the
    /// session never consults ambient state. Call [`initialize`] before
    /// rendering the transcript.
    ///
    /// [`initialize`]: ChatSession::initialize
    pub fn new(
        user_id: UserId,
        language: Language,
        store: Arc<dyn HistoryStore>,
        inference: Arc<dyn InferenceClient>,
        voice: Transcriber,
        config: &ChatConfig,
        events: EventBus,
    ) -> Self {
        Self {
            user_id,
            language,
            transcript: Mutex::new(Vec::new()),
            compose: Mutex::new(ComposeBuffer::default()),
            busy: AtomicBool::new(false),
            voice: Mutex::new(voice),
            store,
            inference,
            events,
            history_page_size: config.history_page_size,
        }
    }

    /// Seed the transcript: the welcome turn, then the most recent persisted
    /// turns in chronological order.
    ///
    /// History is best-effort. If the store is unreachable the session
    /// starts with only the welcome turn and no error reaches the user.
    pub async fn initialize(&self) {
        let mut seeded = vec![Message::welcome(self.language)];

        match self
            .store
            .fetch_recent(&self.user_id, self.history_page_size)
            .await
        {
            Ok(mut turns) => {
                // The store returns newest-first; the transcript reads
                // oldest-first.
                turns.reverse();
                seeded.extend(turns.iter().map(Message::from_stored));
            }
            Err(e) => {
                warn!(user_id = %self.user_id, error = %e, "failed to load chat history");
                self.events.emit(SessionEvent::HistoryLoadFailed {
                    user_id: self.user_id.clone(),
                    error: e.to_string(),
                });
            }
        }

        *self.transcript.lock().expect("transcript mutex poisoned") = seeded;
    }

    // -- Compose buffer --

    /// Replace the pending text. No side effects beyond local state.
    pub fn update_compose(&self, text: impl Into<String>) {
        self.compose
            .lock()
            .expect("compose mutex poisoned")
            .set_text(text);
    }

    /// Current pending text.
    pub fn compose_text(&self) -> String {
        self.compose
            .lock()
            .expect("compose mutex poisoned")
            .text()
            .to_string()
    }

    /// Validate bytes as an image and stage them as the single pending
    /// attachment, replacing any previous one. Undecodable or oversized
    /// input is rejected quietly and the pending attachment is unchanged.
    pub fn attach_image(&self, bytes: &[u8]) -> AttachOutcome {
        match kisan_media::encode(bytes) {
            Ok(attachment) => {
                self.compose
                    .lock()
                    .expect("compose mutex poisoned")
                    .attach(attachment);
                AttachOutcome::Attached
            }
            Err(e) => {
                debug!(error = %e, "attachment rejected");
                AttachOutcome::Rejected
            }
        }
    }

    /// Drop the pending attachment.
    pub fn clear_attachment(&self) {
        self.compose
            .lock()
            .expect("compose mutex poisoned")
            .clear_attachment();
    }

    /// The staged attachment, if any, for preview rendering.
    pub fn pending_attachment(&self) -> Option<kisan_core::types::ImageAttachment> {
        self.compose
            .lock()
            .expect("compose mutex poisoned")
            .attachment()
            .cloned()
    }

    // -- Voice --

    /// Start voice capture in the session language.
    ///
    /// A missing platform capability yields a passive
    /// [`StartListening::Unavailable`] notice; starting while already
    /// listening is a no-op. Engine faults are logged and reported as
    /// unavailable rather than thrown.
    pub fn start_transcription(&self) -> StartListening {
        let mut voice = self.voice.lock().expect("voice mutex poisoned");
        match voice.start(self.language.speech_locale()) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "speech engine failed to start");
                StartListening::Unavailable
            }
        }
    }

    /// Append a transcribed fragment to the compose buffer, separated by a
    /// single space. Fragments arriving while not listening are dropped.
    pub fn push_transcript_fragment(&self, fragment: &str) {
        let listening = {
            let voice = self.voice.lock().expect("voice mutex poisoned");
            voice.state() == VoiceState::Listening
        };
        if !listening {
            debug!("dropping transcript fragment received while idle");
            return;
        }
        self.compose
            .lock()
            .expect("compose mutex poisoned")
            .push_fragment(fragment);
    }

    /// Stop voice capture. Safe to call when idle.
    pub fn stop_transcription(&self) {
        self.voice.lock().expect("voice mutex poisoned").stop();
    }

    /// The recognizer finished an utterance on its own.
    pub fn transcription_ended(&self) {
        self.voice
            .lock()
            .expect("voice mutex poisoned")
            .end_of_utterance();
    }

    /// Whether voice capture is active.
    pub fn is_listening(&self) -> bool {
        self.voice.lock().expect("voice mutex poisoned").state() == VoiceState::Listening
    }

    // -- Send pipeline --

    /// Send the composed message.
    ///
    /// No-op unless the compose buffer has non-whitespace text or an
    /// attachment, and no other send is in flight. On acceptance the buffer
    /// is claimed atomically, the user turn appears in the transcript before
    /// any network activity, persistence of the user turn and the inference
    /// call run concurrently, and the model (or apology) turn is appended
    /// when inference resolves. A failed send leaves the session immediately
    /// ready for the next one.
    pub async fn send(&self) -> SendOutcome {
        let (text, attachment) = {
            let mut compose = self.compose.lock().expect("compose mutex poisoned");
            if compose.is_empty() {
                return SendOutcome::Ignored;
            }
            if self
                .busy
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                // Double-submit while an exchange is in flight; the buffer
                // stays intact for when the gate opens again.
                return SendOutcome::Ignored;
            }
            compose.take()
        };

        // Optimistic append: the user sees their turn before any network
        // call resolves.
        self.push_turn(Message::user(text.clone(), attachment.clone()));
        self.persist_detached(Role::User, text.clone());

        let request = InferenceRequest {
            prompt: text,
            image: attachment,
            language: self.language,
        };

        match self.inference.generate(request).await {
            Ok(answer) => {
                self.push_turn(Message::model(answer.clone()));
                self.persist_detached(Role::Model, answer);
                self.busy.store(false, Ordering::Release);
                SendOutcome::Answered
            }
            Err(e) => {
                warn!(user_id = %self.user_id, error = %e, "inference failed");
                self.events.emit(SessionEvent::InferenceFailed {
                    user_id: self.user_id.clone(),
                    error: e.to_string(),
                });
                self.push_turn(Message::apology(self.language));
                self.busy.store(false, Ordering::Release);
                SendOutcome::Failed
            }
        }
    }

    /// Whether an inference call is outstanding.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Snapshot of the transcript for rendering.
    pub fn transcript(&self) -> Vec<Message> {
        self.transcript
            .lock()
            .expect("transcript mutex poisoned")
            .clone()
    }

    /// Release the transcription capability if active. The store client
    /// needs no teardown; an in-flight inference call is left to resolve
    /// against its own timeout and its late result is simply discarded.
    pub fn close(&self) {
        self.stop_transcription();
    }

    // -- Private helpers --

    /// Append a turn, keeping timestamps non-decreasing within the session.
    fn push_turn(&self, mut message: Message) {
        let mut transcript = self.transcript.lock().expect("transcript mutex poisoned");
        if let Some(last) = transcript.last() {
            if message.timestamp < last.timestamp {
                message.timestamp = last.timestamp;
            }
        }
        transcript.push(message);
    }

    /// Persist one turn without blocking or failing the visible chat.
    /// Failures are logged and emitted on the event bus only.
    fn persist_detached(&self, role: Role, text: String) {
        let store = Arc::clone(&self.store);
        let events = self.events.clone();
        let user_id = self.user_id.clone();
        tokio::spawn(async move {
            match store.append(&user_id, role, &text).await {
                Ok(turn) => {
                    events.emit(SessionEvent::TurnPersisted {
                        user_id,
                        role,
                        stored_id: turn.id,
                    });
                }
                Err(e) => {
                    warn!(user_id = %user_id, role = %role, error = %e, "failed to persist turn");
                    events.emit(SessionEvent::PersistFailed {
                        user_id,
                        role,
                        error: e.to_string(),
                    });
                }
            }
        });
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("user_id", &self.user_id)
            .field("language", &self.language)
            .field("busy", &self.is_busy())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

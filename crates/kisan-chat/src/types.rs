use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kisan_core::types::{ImageAttachment, Language, LocalTurnId, Role, StoredTurn};

// =============================================================================
// Live transcript
// =============================================================================

/// One turn of the live transcript.
///
/// Immutable once appended: the session only ever pushes, never edits or
/// reorders. The id is a client-generated UI key and is unrelated to the id
/// the store assigns if the turn is persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: LocalTurnId,
    pub role: Role,
    pub text: String,
    pub attachment: Option<ImageAttachment>,
    pub timestamp: DateTime<Utc>,
    /// True only for the synthetic apology turn appended when inference
    /// fails. Such turns are never persisted.
    pub is_error: bool,
}

impl Message {
    /// A user turn about to be sent. Text may be empty when the attachment
    /// carries the question.
    pub fn user(text: String, attachment: Option<ImageAttachment>) -> Self {
        Self {
            id: LocalTurnId::new(),
            role: Role::User,
            text,
            attachment,
            timestamp: Utc::now(),
            is_error: false,
        }
    }

    /// A model turn carrying generated text.
    pub fn model(text: String) -> Self {
        Self {
            id: LocalTurnId::new(),
            role: Role::Model,
            text,
            attachment: None,
            timestamp: Utc::now(),
            is_error: false,
        }
    }

    /// The synthetic, non-persisted turn shown when inference fails.
    pub fn apology(language: Language) -> Self {
        Self {
            id: LocalTurnId::new(),
            role: Role::Model,
            text: language.apology().to_string(),
            attachment: None,
            timestamp: Utc::now(),
            is_error: true,
        }
    }

    /// The synthetic greeting seeded at the top of every session.
    pub fn welcome(language: Language) -> Self {
        Self {
            id: LocalTurnId::new(),
            role: Role::Model,
            text: language.welcome().to_string(),
            attachment: None,
            timestamp: Utc::now(),
            is_error: false,
        }
    }

    /// Rehydrate a persisted turn into the live transcript. A fresh local id
    /// is minted; the store id stays in its own identifier space.
    pub fn from_stored(turn: &StoredTurn) -> Self {
        Self {
            id: LocalTurnId::new(),
            role: turn.role,
            text: turn.text.clone(),
            attachment: None,
            timestamp: turn.created_at,
            is_error: false,
        }
    }
}

/// The pending outgoing message: text plus at most one attachment.
#[derive(Clone, Debug, Default)]
pub struct ComposeBuffer {
    text: String,
    attachment: Option<ImageAttachment>,
}

impl ComposeBuffer {
    /// Replace the pending text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Append a transcribed fragment, separated by a single space.
    pub fn push_fragment(&mut self, fragment: &str) {
        if fragment.is_empty() {
            return;
        }
        if self.text.is_empty() {
            self.text.push_str(fragment);
        } else {
            self.text.push(' ');
            self.text.push_str(fragment);
        }
    }

    /// Set or replace the single pending attachment.
    pub fn attach(&mut self, attachment: ImageAttachment) {
        self.attachment = Some(attachment);
    }

    /// Drop the pending attachment.
    pub fn clear_attachment(&mut self) {
        self.attachment = None;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attachment(&self) -> Option<&ImageAttachment> {
        self.attachment.as_ref()
    }

    /// Nothing worth sending: no attachment and no non-whitespace text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.attachment.is_none()
    }

    /// Snapshot and reset in one step, so a send can atomically claim the
    /// buffer while the user starts composing the next message.
    pub fn take(&mut self) -> (String, Option<ImageAttachment>) {
        (std::mem::take(&mut self.text), self.attachment.take())
    }
}

// =============================================================================
// Operation outcomes
// =============================================================================

/// Result of a `send` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Preconditions not met (empty compose buffer, or a send already in
    /// flight). Nothing changed.
    Ignored,
    /// The exchange completed with a real model turn.
    Answered,
    /// Inference failed; an apology turn was appended instead. The session
    /// is immediately ready for the next send.
    Failed,
}

/// Result of an attach request. Invalid input is rejected quietly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    Attached,
    Rejected,
}

/// Explicit user decision gating destructive history operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Denied,
}

/// Result of a confirmed (or denied) history clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    /// The user denied the confirmation; the store was not touched.
    Cancelled,
    /// The store accepted the bulk delete.
    Cleared { removed: u64 },
}

// =============================================================================
// History review
// =============================================================================

/// One audit row: a question, its paired answer if one was recorded, and the
/// question's store-assigned creation time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRow {
    pub question: StoredTurn,
    pub answer: Option<StoredTurn>,
    pub asked_at: DateTime<Utc>,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use kisan_core::types::{ImageFormat, StoredTurnId, UserId};

    fn attachment() -> ImageAttachment {
        ImageAttachment {
            format: ImageFormat::Png,
            data: vec![1, 2, 3],
        }
    }

    #[test]
    fn test_user_message() {
        let msg = Message::user("hello".to_string(), None);
        assert_eq!(msg.role, Role::User);
        assert!(!msg.is_error);
        assert!(msg.attachment.is_none());
    }

    #[test]
    fn test_apology_message_is_error_and_language_keyed() {
        let msg = Message::apology(Language::Hi);
        assert_eq!(msg.role, Role::Model);
        assert!(msg.is_error);
        assert_eq!(msg.text, Language::Hi.apology());
    }

    #[test]
    fn test_welcome_message_is_not_error() {
        let msg = Message::welcome(Language::Te);
        assert_eq!(msg.role, Role::Model);
        assert!(!msg.is_error);
        assert_eq!(msg.text, Language::Te.welcome());
    }

    #[test]
    fn test_from_stored_mints_fresh_local_id() {
        let turn = StoredTurn {
            id: StoredTurnId(44),
            user_id: UserId::new("farmer-1"),
            role: Role::Model,
            text: "answer".to_string(),
            created_at: Utc::now(),
        };
        let a = Message::from_stored(&turn);
        let b = Message::from_stored(&turn);
        assert_ne!(a.id, b.id);
        assert_eq!(a.text, "answer");
        assert_eq!(a.timestamp, turn.created_at);
    }

    #[test]
    fn test_compose_empty_states() {
        let mut compose = ComposeBuffer::default();
        assert!(compose.is_empty());

        compose.set_text("   ");
        assert!(compose.is_empty(), "whitespace-only text is not sendable");

        compose.set_text("");
        compose.attach(attachment());
        assert!(!compose.is_empty(), "an attachment alone is sendable");
    }

    #[test]
    fn test_compose_fragment_spacing() {
        let mut compose = ComposeBuffer::default();
        compose.push_fragment("My wheat");
        assert_eq!(compose.text(), "My wheat");
        compose.push_fragment("leaves are yellow");
        assert_eq!(compose.text(), "My wheat leaves are yellow");
    }

    #[test]
    fn test_compose_empty_fragment_is_noop() {
        let mut compose = ComposeBuffer::default();
        compose.set_text("hello");
        compose.push_fragment("");
        assert_eq!(compose.text(), "hello");
    }

    #[test]
    fn test_compose_attach_replaces_previous() {
        let mut compose = ComposeBuffer::default();
        compose.attach(attachment());
        let second = ImageAttachment {
            format: ImageFormat::Jpeg,
            data: vec![9],
        };
        compose.attach(second.clone());
        assert_eq!(compose.attachment(), Some(&second));
    }

    #[test]
    fn test_compose_take_resets() {
        let mut compose = ComposeBuffer::default();
        compose.set_text("question");
        compose.attach(attachment());

        let (text, att) = compose.take();
        assert_eq!(text, "question");
        assert!(att.is_some());
        assert!(compose.is_empty());
        assert!(compose.attachment().is_none());
    }

    #[test]
    fn test_clear_attachment() {
        let mut compose = ComposeBuffer::default();
        compose.attach(attachment());
        compose.clear_attachment();
        assert!(compose.attachment().is_none());
    }
}

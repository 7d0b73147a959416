//! Conversational core of the Kisan assistant.
//!
//! [`ChatSession`] owns the live transcript and the send pipeline: optimistic
//! appends, the one-at-a-time busy gate, fire-and-forget persistence, and the
//! apology turn when inference fails. [`HistoryReview`] independently
//! re-reads the persisted log and reconstructs question/answer pairs for the
//! audit screen.

pub mod error;
pub mod review;
pub mod session;
pub mod types;

pub use error::ChatError;
pub use kisan_voice::StartListening;
pub use review::{pair_exchanges, HistoryReview};
pub use session::ChatSession;
pub use types::{
    AttachOutcome, ClearOutcome, ComposeBuffer, Confirmation, ExchangeRow, Message, SendOutcome,
};

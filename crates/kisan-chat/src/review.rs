//! History review: question/answer pairing over the persisted log.
//!
//! Independent of the live session; it re-fetches the store's newest-first
//! sequence and reconstructs display rows without re-sorting. Clearing the
//! log is the one destructive operation in the system and is gated on an
//! explicit user confirmation.

use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use kisan_core::events::{EventBus, SessionEvent};
use kisan_core::types::{Role, StoredTurn, UserId};
use kisan_store::HistoryStore;

use crate::error::ChatError;
use crate::types::{ClearOutcome, Confirmation, ExchangeRow};

/// Reconstruct display pairs from a newest-first turn sequence.
///
/// For each `user` turn at index `i`, the paired answer is the entry
/// immediately before it in the array (`i - 1`, chronologically the next
/// turn) iff that entry is a `model` turn. Rows come out in encounter order,
/// newest question first.
///
/// The store order is not assumed to alternate perfectly: a question whose
/// answer was never persisted (failed inference, concurrent writers) simply
/// pairs with nothing, and two consecutive questions yield two unanswered
/// rows. Orphan `model` entries produce no row.
pub fn pair_exchanges(turns: &[StoredTurn]) -> Vec<ExchangeRow> {
    let mut rows = Vec::new();
    for (i, turn) in turns.iter().enumerate() {
        if turn.role != Role::User {
            continue;
        }
        let answer = match i.checked_sub(1).map(|j| &turns[j]) {
            Some(prev) if prev.role == Role::Model => Some(prev.clone()),
            _ => None,
        };
        rows.push(ExchangeRow {
            question: turn.clone(),
            answer,
            asked_at: turn.created_at,
        });
    }
    rows
}

/// Read-only audit view over one user's persisted log.
pub struct HistoryReview {
    user_id: UserId,
    store: Arc<dyn HistoryStore>,
    events: EventBus,
    rows: Mutex<Vec<ExchangeRow>>,
}

impl HistoryReview {
    pub fn new(user_id: UserId, store: Arc<dyn HistoryStore>, events: EventBus) -> Self {
        Self {
            user_id,
            store,
            events,
            rows: Mutex::new(Vec::new()),
        }
    }

    /// Re-fetch the persisted log and rebuild the display rows.
    ///
    /// Unlike the live session's best-effort history load, this is an
    /// explicit user-initiated read, so fetch errors propagate to the caller
    /// for display. The previous rows are kept on failure.
    pub async fn refresh(&self, limit: usize) -> Result<Vec<ExchangeRow>, ChatError> {
        let turns = self
            .store
            .fetch_recent(&self.user_id, limit)
            .await
            .map_err(ChatError::from)?;
        let rows = pair_exchanges(&turns);
        *self.rows.lock().expect("rows mutex poisoned") = rows.clone();
        Ok(rows)
    }

    /// Current display rows (last successful refresh).
    pub fn rows(&self) -> Vec<ExchangeRow> {
        self.rows.lock().expect("rows mutex poisoned").clone()
    }

    /// Delete the user's entire persisted history.
    ///
    /// Requires an explicit confirmation; a denied confirmation never
    /// reaches the store. On success the display list is emptied. On failure
    /// the raw store error is returned and the previous display is left
    /// untouched — this is the one persistence failure that is surfaced,
    /// because the user explicitly asked for a destructive action.
    pub async fn clear(&self, confirmation: Confirmation) -> Result<ClearOutcome, ChatError> {
        if confirmation == Confirmation::Denied {
            return Ok(ClearOutcome::Cancelled);
        }

        match self.store.clear_all(&self.user_id).await {
            Ok(removed) => {
                info!(user_id = %self.user_id, removed, "chat history cleared");
                self.rows.lock().expect("rows mutex poisoned").clear();
                self.events.emit(SessionEvent::HistoryCleared {
                    user_id: self.user_id.clone(),
                    removed,
                });
                Ok(ClearOutcome::Cleared { removed })
            }
            Err(e) => {
                warn!(user_id = %self.user_id, error = %e, "failed to clear chat history");
                Err(ChatError::from(e))
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

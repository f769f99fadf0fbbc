//! Conversation session — drives turns from submission to settlement.
//!
//! DESIGN
//! ======
//! A session is the mounted assistant view: it owns one
//! `ConversationState` and one `AssistantGateway`. `try_submit` opens a
//! turn under a short lock, then spawns the gateway call; the settle task
//! appends the reply and clears the pending flag.
//!
//! CANCELLATION
//! ============
//! `close` (and `Drop`) aborts the in-flight gateway task. An aborted turn
//! appends nothing, and the closed state rejects later submissions, so no
//! update lands on a torn-down view.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tokio::task::{AbortHandle, JoinError, JoinHandle};
use tracing::{debug, info, warn};

use super::assistant::{AssistantGateway, FailureKind, Outcome};
use crate::state::{ConversationEvent, ConversationState, Message, SubmitRejected, TurnState};

// =============================================================================
// TURN HANDLE
// =============================================================================

/// Handle to one accepted turn.
#[derive(Debug)]
pub struct TurnHandle {
    task: JoinHandle<Option<Message>>,
}

impl TurnHandle {
    /// Wait for settlement. Returns the appended assistant message, or
    /// `None` if the session was closed first.
    pub async fn settled(self) -> Option<Message> {
        self.task.await.ok().flatten()
    }
}

// =============================================================================
// SESSION
// =============================================================================

pub struct ConversationSession {
    state: Arc<Mutex<ConversationState>>,
    gateway: AssistantGateway,
    in_flight: Mutex<Option<AbortHandle>>,
}

impl ConversationSession {
    #[must_use]
    pub fn new(gateway: AssistantGateway) -> Self {
        Self {
            state: Arc::new(Mutex::new(ConversationState::new())),
            gateway,
            in_flight: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ConversationEvent> {
        lock(&self.state).subscribe()
    }

    /// Copy of the transcript.
    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        lock(&self.state).messages().to_vec()
    }

    #[must_use]
    pub fn turn(&self) -> TurnState {
        lock(&self.state).turn()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        lock(&self.state).is_pending()
    }

    #[must_use]
    pub fn draft(&self) -> String {
        lock(&self.state).draft().to_string()
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        lock(&self.state).set_draft(text);
    }

    pub fn select_suggestion(&self, index: usize) -> Option<&'static str> {
        lock(&self.state).select_suggestion(index)
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        lock(&self.state).can_submit()
    }

    /// Submit `text` as the next turn.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Rejects (with no transcript change and no outbound call) when the
    /// trimmed text is empty, a reply is pending, or the session is closed.
    pub fn try_submit(&self, text: &str) -> Result<TurnHandle, SubmitRejected> {
        let ticket = match lock(&self.state).begin_turn(text) {
            Ok(ticket) => ticket,
            Err(reason) => {
                debug!(%reason, "conversation: submission dropped");
                return Err(reason);
            }
        };
        let user_message = ticket.user_message();
        info!(%user_message, "conversation: turn opened");

        let gateway = self.gateway.clone();
        let prompt = text.to_string();
        let call = tokio::spawn(async move { gateway.respond(&prompt).await });
        *lock(&self.in_flight) = Some(call.abort_handle());

        let state = Arc::clone(&self.state);
        let task = tokio::spawn(async move {
            let outcome = match call.await {
                Ok(outcome) => outcome,
                Err(e) if e.is_cancelled() => {
                    info!(%user_message, "conversation: turn cancelled");
                    return None;
                }
                Err(e) => {
                    warn!(%user_message, error = %e, "conversation: gateway task panicked");
                    Outcome::Failure(FailureKind::Unexpected(panic_description(e)))
                }
            };
            let appended = lock(&state).settle(ticket, outcome.to_string()).cloned();
            match &appended {
                Some(reply) => info!(
                    %user_message,
                    reply_id = %reply.id(),
                    failed = outcome.is_failure(),
                    "conversation: turn settled"
                ),
                None => debug!(%user_message, "conversation: reply discarded after close"),
            }
            appended
        });

        Ok(TurnHandle { task })
    }

    /// Submit the current input draft.
    ///
    /// # Errors
    ///
    /// Same as [`ConversationSession::try_submit`].
    pub fn submit_draft(&self) -> Result<TurnHandle, SubmitRejected> {
        let draft = self.draft();
        self.try_submit(&draft)
    }

    /// Tear the session down, aborting any in-flight call.
    pub fn close(&self) {
        lock(&self.state).close();
        if let Some(handle) = lock(&self.in_flight).take() {
            handle.abort();
        }
    }
}

impl Drop for ConversationSession {
    fn drop(&mut self) {
        self.close();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn panic_description(error: JoinError) -> String {
    match error.try_into_panic() {
        Ok(payload) => payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "assistant task panicked".to_string()),
        Err(error) => error.to_string(),
    }
}

#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;

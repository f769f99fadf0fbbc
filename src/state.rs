//! Conversation store — transcript, input draft, and turn gate.
//!
//! DESIGN
//! ======
//! The transcript is append-only and always starts with the assistant
//! greeting. A turn is opened by `begin_turn`, which mints the only
//! `TurnTicket` that `settle` accepts, so at most one reply can be
//! outstanding and each accepted submission yields exactly one reply.
//!
//! Every change is published as a `ConversationEvent` on a broadcast
//! channel; renderers subscribe and redraw from the store.

use serde::Serialize;
use time::OffsetDateTime;
use time::macros::format_description;
use tokio::sync::broadcast;
use uuid::Uuid;

pub const GREETING: &str =
    "Hi! I'm your cricket buddy. Ask me anything about IPL, players, stats, or just chat about cricket!";

pub const QUICK_SUGGESTIONS: [&str; 4] = [
    "What's Virat Kohli's highest score?",
    "Show me MI vs CSK head to head stats",
    "Who won IPL 2024?",
    "Tell me a cricket joke",
];

const EVENT_CAPACITY: usize = 64;

// =============================================================================
// MESSAGE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// One transcript entry. Fields are fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    id: Uuid,
    text: String,
    sender: Sender,
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
}

impl Message {
    #[must_use]
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        let timestamp = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        Self { id: Uuid::new_v4(), text: text.into(), sender, timestamp }
    }

    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Sender::Assistant, text)
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn sender(&self) -> Sender {
        self.sender
    }

    #[must_use]
    pub fn timestamp(&self) -> OffsetDateTime {
        self.timestamp
    }

    /// 12-hour clock time, e.g. `03:07 PM`.
    #[must_use]
    pub fn display_time(&self) -> String {
        format_clock(self.timestamp)
    }
}

pub(crate) fn format_clock(at: OffsetDateTime) -> String {
    let format = format_description!("[hour repr:12]:[minute] [period]");
    at.format(&format).unwrap_or_default()
}

// =============================================================================
// TURN STATE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    /// One reply outstanding for the given user message.
    Sending { user_message: Uuid },
    /// View torn down; nothing more is accepted.
    Closed,
}

/// Proof that a turn is open. Consumed by [`ConversationState::settle`].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a turn must be settled"]
pub struct TurnTicket {
    user_message: Uuid,
}

impl TurnTicket {
    #[must_use]
    pub fn user_message(&self) -> Uuid {
        self.user_message
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitRejected {
    #[error("input is empty")]
    Empty,
    #[error("a reply is already pending")]
    Pending,
    #[error("conversation is closed")]
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConversationEvent {
    MessageAppended(Message),
    PendingChanged(bool),
    Closed,
}

// =============================================================================
// CONVERSATION STATE
// =============================================================================

pub struct ConversationState {
    messages: Vec<Message>,
    turn: TurnState,
    draft: String,
    selected_suggestion: Option<usize>,
    events: broadcast::Sender<ConversationEvent>,
}

impl ConversationState {
    /// Fresh transcript seeded with the greeting.
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            messages: vec![Message::assistant(GREETING)],
            turn: TurnState::Idle,
            draft: String::new(),
            selected_suggestion: None,
            events,
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ConversationEvent> {
        self.events.subscribe()
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn turn(&self) -> TurnState {
        self.turn
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self.turn, TurnState::Sending { .. })
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.turn == TurnState::Closed
    }

    /// Push a message onto the transcript and notify subscribers.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message.clone());
        self.emit(ConversationEvent::MessageAppended(message));
    }

    // -------------------------------------------------------------------------
    // Input draft
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Fill the draft with a quick suggestion. `None` for an unknown index.
    pub fn select_suggestion(&mut self, index: usize) -> Option<&'static str> {
        let suggestion = QUICK_SUGGESTIONS.get(index).copied()?;
        self.draft = suggestion.to_string();
        self.selected_suggestion = Some(index);
        Some(suggestion)
    }

    #[must_use]
    pub fn selected_suggestion(&self) -> Option<usize> {
        self.selected_suggestion
    }

    /// Whether the send control is enabled for the current draft.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.check_submit(&self.draft).is_ok()
    }

    // -------------------------------------------------------------------------
    // Turn gate
    // -------------------------------------------------------------------------

    fn check_submit(&self, text: &str) -> Result<(), SubmitRejected> {
        match self.turn {
            TurnState::Closed => Err(SubmitRejected::Closed),
            TurnState::Sending { .. } => Err(SubmitRejected::Pending),
            TurnState::Idle if text.trim().is_empty() => Err(SubmitRejected::Empty),
            TurnState::Idle => Ok(()),
        }
    }

    /// Open a turn: append the raw text as a user message, clear the draft,
    /// and mark a reply as pending.
    ///
    /// # Errors
    ///
    /// Rejects without touching the transcript when the trimmed text is
    /// empty, a reply is pending, or the conversation is closed.
    pub fn begin_turn(&mut self, text: &str) -> Result<TurnTicket, SubmitRejected> {
        self.check_submit(text)?;

        let message = Message::user(text);
        let user_message = message.id();
        self.append(message);
        self.draft.clear();
        self.selected_suggestion = None;
        self.turn = TurnState::Sending { user_message };
        self.emit(ConversationEvent::PendingChanged(true));
        Ok(TurnTicket { user_message })
    }

    /// Close a turn with the assistant's reply: append it, then clear the
    /// pending flag. Returns the appended message, or `None` if the
    /// conversation was closed while the turn was in flight.
    pub fn settle(&mut self, ticket: TurnTicket, reply: impl Into<String>) -> Option<&Message> {
        if self.turn != (TurnState::Sending { user_message: ticket.user_message }) {
            return None;
        }
        self.append(Message::assistant(reply));
        self.turn = TurnState::Idle;
        self.emit(ConversationEvent::PendingChanged(false));
        self.messages.last()
    }

    /// Tear down: reject further submissions and drop any outstanding turn.
    pub fn close(&mut self) {
        if self.is_closed() {
            return;
        }
        let was_pending = self.is_pending();
        self.turn = TurnState::Closed;
        if was_pending {
            self.emit(ConversationEvent::PendingChanged(false));
        }
        self.emit(ConversationEvent::Closed);
    }

    fn emit(&self, event: ConversationEvent) {
        // No subscribers is fine; renderers attach on demand.
        let _ = self.events.send(event);
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;

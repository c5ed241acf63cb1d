//! Session lifecycle state

use crate::session::{Message, Utterance};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

/// Lifecycle state of a session
///
/// `Inert` is the only inactive state. The three turn states carry the
/// utterance being answered; its id is the turn id.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionState {
    /// Welcome screen, nothing said yet
    #[default]
    Inert,

    /// Conversation visible, waiting for input
    Ready,

    /// Thinking steps being revealed
    Disclosing { turn: Utterance },

    /// Backend call (or canned fallback) in progress
    Synthesizing { turn: Utterance },

    /// Reply composed, waiting out the delivery delay
    Delivering { turn: Utterance, reply: Message },
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        !matches!(self, SessionState::Inert)
    }

    /// A turn is in flight and new utterances are refused
    pub fn is_busy(&self) -> bool {
        self.turn_id().is_some()
    }

    pub fn turn_id(&self) -> Option<Uuid> {
        match self {
            SessionState::Disclosing { turn }
            | SessionState::Synthesizing { turn }
            | SessionState::Delivering { turn, .. } => Some(turn.id),
            SessionState::Inert | SessionState::Ready => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Inert => "inert",
            SessionState::Ready => "ready",
            SessionState::Disclosing { .. } => "disclosing",
            SessionState::Synthesizing { .. } => "synthesizing",
            SessionState::Delivering { .. } => "delivering",
        }
    }
}

/// Default pause between a composed reply and its appearance
pub const DEFAULT_DELIVERY_DELAY: Duration = Duration::from_millis(1500);

/// Immutable per-session configuration
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: String,
    pub delivery_delay: Duration,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            delivery_delay: DEFAULT_DELIVERY_DELAY,
        }
    }

    #[must_use]
    pub fn with_delivery_delay(mut self, delay: Duration) -> Self {
        self.delivery_delay = delay;
        self
    }
}

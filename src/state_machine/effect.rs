//! Effects produced by state transitions

use crate::session::{Message, Utterance};
use crate::view::{ViewElement, ViewUpdate};
use std::time::Duration;
use uuid::Uuid;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send one update to the view layer
    Render(ViewUpdate),

    /// Publish `"<n> references active"` from the current counters
    PublishReferenceCount,

    /// Append to the transcript (and render it)
    AppendMessage { message: Message },

    /// Start the staged disclosure for a turn
    StartDisclosure { turn_id: Uuid },

    /// Try the backend, fall back to a canned reply
    RequestReply { utterance: Utterance },

    /// Fire `DeliveryDue` after `delay`
    ScheduleDelivery { turn_id: Uuid, delay: Duration },

    /// Cancel all background work of the current turn
    AbortTurn,

    /// Clear transcript, counters and context items
    ClearSession,

    /// Tell the view the agent finished answering
    NotifyAgentDone,
}

impl Effect {
    pub fn show(element: ViewElement) -> Self {
        Effect::Render(ViewUpdate::show(element))
    }

    pub fn hide(element: ViewElement) -> Self {
        Effect::Render(ViewUpdate::hide(element))
    }

    pub fn append_user_message(utterance: &Utterance) -> Self {
        Effect::AppendMessage {
            message: Message::from_utterance(utterance),
        }
    }
}

//! Events that can occur in a session

use crate::session::{Message, Utterance};
use uuid::Uuid;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    UserUtterance {
        utterance: Utterance,
    },
    Reset,

    // Disclosure events
    StepRevealed {
        turn_id: Uuid,
        index: usize,
        label: String,
    },
    DisclosureFinished {
        turn_id: Uuid,
    },

    // Reply events
    ReplyReady {
        turn_id: Uuid,
        reply: Message,
    },
    DeliveryDue {
        turn_id: Uuid,
    },
}

impl Event {
    /// Turn a background event belongs to; `None` for user events
    pub fn turn_id(&self) -> Option<Uuid> {
        match self {
            Event::StepRevealed { turn_id, .. }
            | Event::DisclosureFinished { turn_id }
            | Event::ReplyReady { turn_id, .. }
            | Event::DeliveryDue { turn_id } => Some(*turn_id),
            Event::UserUtterance { .. } | Event::Reset => None,
        }
    }
}

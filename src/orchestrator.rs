//! Conversation orchestrator
//!
//! One runtime task owns the [`Session`](crate::session::Session). Callers
//! talk to it through a cloneable [`OrchestratorHandle`]; background work
//! reports back to it as state machine events.

mod compose;
mod executor;
mod traits;

#[cfg(test)]
pub mod testing;

pub use compose::ReplyComposer;

use executor::SessionRuntime;

use crate::config::Pacing;
use crate::gateway::SynthesisService;
use crate::session::{Origin, SessionSnapshot, Utterance};
use crate::view::View;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// A preset prompt offered on the welcome screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PromptCard {
    pub id: &'static str,
    pub title: &'static str,
    pub prompt: &'static str,
}

pub static PROMPT_CARDS: [PromptCard; 4] = [
    PromptCard {
        id: "water-pump",
        title: "Portable Water Pump",
        prompt: "Design a portable water pump for remote villages using fluid dynamics",
    },
    PromptCard {
        id: "exoskeleton",
        title: "Assistive Exoskeleton",
        prompt: "Create a lightweight exoskeleton that amplifies natural joint movement",
    },
    PromptCard {
        id: "circulatory-monitor",
        title: "Circulatory Monitor",
        prompt: "Develop a wearable device that tracks the circulatory system",
    },
    PromptCard {
        id: "tensegrity-bridge",
        title: "Tensegrity Bridge",
        prompt: "Engineer a pedestrian bridge from tensegrity structures",
    },
];

/// Runtime settings that are not I/O
#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    pub session_id: String,
    pub pacing: Pacing,
    pub show_reasoning: bool,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            pacing: Pacing::default(),
            show_reasoning: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Message is empty")]
    Empty,
    #[error("Agent is busy, wait for the current answer before sending another message")]
    Busy,
    #[error("Unknown prompt card: {0}")]
    UnknownPromptCard(String),
    #[error("Session runtime has stopped")]
    Closed,
}

/// Result of flipping the "show process" preference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReasoningToggle {
    pub show_reasoning: bool,
    pub label: &'static str,
}

impl ReasoningToggle {
    pub fn new(show_reasoning: bool) -> Self {
        let label = if show_reasoning {
            "Hide Process"
        } else {
            "Show Process"
        };
        Self {
            show_reasoning,
            label,
        }
    }
}

/// Requests handled by the runtime task
#[derive(Debug)]
pub enum Command {
    Submit {
        utterance: Utterance,
        reply: oneshot::Sender<Result<Uuid, SubmitError>>,
    },
    Reset {
        reply: oneshot::Sender<()>,
    },
    ToggleReasoning {
        reply: oneshot::Sender<ReasoningToggle>,
    },
    AttachContext {
        reply: oneshot::Sender<Vec<String>>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Cloneable entry point to a running session
#[derive(Clone)]
pub struct OrchestratorHandle {
    command_tx: mpsc::Sender<Command>,
}

impl OrchestratorHandle {
    /// Spawn the runtime task and return a handle to it
    pub fn start<G, V>(
        gateway: G,
        view: V,
        composer: ReplyComposer,
        settings: RuntimeSettings,
    ) -> Self
    where
        G: SynthesisService + 'static,
        V: View + 'static,
    {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let runtime = SessionRuntime::new(gateway, view, composer, settings, command_rx);
        tokio::spawn(runtime.run());
        Self { command_tx }
    }

    /// Submit typed text; returns the id of the new turn
    pub async fn handle(&self, text: &str) -> Result<Uuid, SubmitError> {
        if text.trim().is_empty() {
            return Err(SubmitError::Empty);
        }
        self.submit(Utterance::user(text.trim())).await
    }

    pub async fn submit_prompt_card(&self, card_id: &str) -> Result<Uuid, SubmitError> {
        let card = find_prompt_card(card_id)
            .ok_or_else(|| SubmitError::UnknownPromptCard(card_id.to_string()))?;
        self.submit(Utterance::new(card.prompt, Origin::PromptCard))
            .await
    }

    async fn submit(&self, utterance: Utterance) -> Result<Uuid, SubmitError> {
        self.request(|reply| Command::Submit { utterance, reply })
            .await?
    }

    pub async fn reset(&self) -> Result<(), SubmitError> {
        self.request(|reply| Command::Reset { reply }).await
    }

    pub async fn toggle_reasoning(&self) -> Result<ReasoningToggle, SubmitError> {
        self.request(|reply| Command::ToggleReasoning { reply })
            .await
    }

    /// Attach the manuscript context items; returns the full list
    pub async fn attach_context(&self) -> Result<Vec<String>, SubmitError> {
        self.request(|reply| Command::AttachContext { reply })
            .await
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, SubmitError> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Stop the runtime, aborting any in-flight turn
    pub async fn shutdown(&self) -> Result<(), SubmitError> {
        self.request(|reply| Command::Shutdown { reply }).await
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, SubmitError> {
        let (tx, rx) = oneshot::channel();
        self.command_tx
            .send(make(tx))
            .await
            .map_err(|_| SubmitError::Closed)?;
        rx.await.map_err(|_| SubmitError::Closed)
    }
}

pub fn find_prompt_card(id: &str) -> Option<&'static PromptCard> {
    PROMPT_CARDS.iter().find(|card| card.id == id)
}

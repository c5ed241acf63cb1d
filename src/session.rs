//! Session data: utterances, messages, transcript and counters

use crate::citations::{Citation, BASELINE_REFERENCES};
use crate::classifier::Topic;
use crate::state_machine::SessionState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where an utterance came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Typed free text
    User,
    /// A preset prompt card
    PromptCard,
}

/// Raw user input, immutable once created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    pub id: Uuid,
    pub text: String,
    pub origin: Origin,
    pub created_at: DateTime<Utc>,
}

impl Utterance {
    pub fn new(text: impl Into<String>, origin: Origin) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            origin,
            created_at: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Origin::User)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Agent,
}

/// How an agent reply was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    User,
    Backend,
    Canned,
}

/// A transcript entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    /// Plain text for users, light markup for agents
    pub body: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,
    pub source: ReplySource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<Topic>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn from_utterance(utterance: &Utterance) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::User,
            body: utterance.text.clone(),
            citations: Vec::new(),
            source: ReplySource::User,
            topic: None,
            created_at: utterance.created_at,
        }
    }

    pub fn agent(
        body: impl Into<String>,
        citations: Vec<Citation>,
        source: ReplySource,
        topic: Option<Topic>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Agent,
            body: body.into(),
            citations,
            source,
            topic,
            created_at: Utc::now(),
        }
    }
}

/// Ordered, append-only message log
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Transcript(Vec<Message>);

impl Transcript {
    pub fn push(&mut self, message: Message) {
        self.0.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.0
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }
}

/// Everything one conversation owns
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub state: SessionState,
    pub transcript: Transcript,
    /// Agent messages since the last reset
    pub memory_count: usize,
    pub show_reasoning: bool,
    pub context_items: Vec<String>,
}

impl Session {
    pub fn new(show_reasoning: bool) -> Self {
        Self {
            state: SessionState::Inert,
            transcript: Transcript::default(),
            memory_count: 0,
            show_reasoning,
            context_items: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn reference_count(&self) -> usize {
        BASELINE_REFERENCES + self.memory_count
    }

    /// Append a message; agent messages bump the memory counter
    pub fn append(&mut self, message: Message) {
        if message.role == Role::Agent {
            self.memory_count += 1;
        }
        self.transcript.push(message);
    }

    /// Drop transcript, counters and context; keep the display preference
    pub fn clear(&mut self) {
        self.transcript.clear();
        self.memory_count = 0;
        self.context_items.clear();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            active: self.is_active(),
            state: self.state.clone(),
            messages: self.transcript.messages().to_vec(),
            reference_count: self.reference_count(),
            references_label: references_label(self.reference_count()),
            show_reasoning: self.show_reasoning,
            context_items: self.context_items.clone(),
        }
    }
}

pub fn references_label(count: usize) -> String {
    format!("{count} references active")
}

/// Read-only copy of a session for API callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub active: bool,
    pub state: SessionState,
    pub messages: Vec<Message>,
    pub reference_count: usize,
    pub references_label: String,
    pub show_reasoning: bool,
    pub context_items: Vec<String>,
}

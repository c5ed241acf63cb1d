//! View layer contract
//!
//! The core never touches markup. It emits [`ViewUpdate`]s through the
//! [`View`] trait; a missing binding degrades that single update only.

use crate::citations::Citation;
use crate::markup;
use crate::session::{Message, Role};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Addressable parts of the view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewElement {
    WelcomePanel,
    ConversationPanel,
    NewChatButton,
    SourcesPanel,
    SourcesCount,
    MessageThread,
    ThinkingPanel,
    ThinkingSteps,
    TransparencyToggle,
    ContextBar,
    ContextItems,
}

impl ViewElement {
    pub const ALL: [ViewElement; 11] = [
        ViewElement::WelcomePanel,
        ViewElement::ConversationPanel,
        ViewElement::NewChatButton,
        ViewElement::SourcesPanel,
        ViewElement::SourcesCount,
        ViewElement::MessageThread,
        ViewElement::ThinkingPanel,
        ViewElement::ThinkingSteps,
        ViewElement::TransparencyToggle,
        ViewElement::ContextBar,
        ViewElement::ContextItems,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ViewElement::WelcomePanel => "welcome_panel",
            ViewElement::ConversationPanel => "conversation_panel",
            ViewElement::NewChatButton => "new_chat_button",
            ViewElement::SourcesPanel => "sources_panel",
            ViewElement::SourcesCount => "sources_count",
            ViewElement::MessageThread => "message_thread",
            ViewElement::ThinkingPanel => "thinking_panel",
            ViewElement::ThinkingSteps => "thinking_steps",
            ViewElement::TransparencyToggle => "transparency_toggle",
            ViewElement::ContextBar => "context_bar",
            ViewElement::ContextItems => "context_items",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown view element: {0}")]
pub struct UnknownElement(pub String);

impl FromStr for ViewElement {
    type Err = UnknownElement;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        ViewElement::ALL
            .into_iter()
            .find(|e| e.as_str() == name)
            .ok_or_else(|| UnknownElement(name.to_string()))
    }
}

/// Message ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedMessage {
    pub id: Uuid,
    pub role: Role,
    /// HTML: markup-formatted for agents, escaped text for users
    pub html: String,
    pub citations: Vec<Citation>,
}

impl RenderedMessage {
    pub fn from_message(message: &Message) -> Self {
        let html = match message.role {
            Role::Agent => markup::render(&message.body),
            Role::User => markup::escape_html(&message.body),
        };
        Self {
            id: message.id,
            role: message.role,
            html,
            citations: message.citations.clone(),
        }
    }
}

/// One instruction to the view layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewUpdate {
    SetVisible { element: ViewElement, visible: bool },
    RenderMessage { message: RenderedMessage },
    ClearThread,
    RenderStep { index: usize, label: String },
    ClearSteps,
    ReferenceCount { label: String },
    TransparencyLabel { label: String },
    ContextChips { items: Vec<String> },
    ClearContext,
    AgentDone,
}

impl ViewUpdate {
    pub fn show(element: ViewElement) -> Self {
        ViewUpdate::SetVisible {
            element,
            visible: true,
        }
    }

    pub fn hide(element: ViewElement) -> Self {
        ViewUpdate::SetVisible {
            element,
            visible: false,
        }
    }

    /// Element this update is bound to
    pub fn element(&self) -> ViewElement {
        match self {
            ViewUpdate::SetVisible { element, .. } => *element,
            ViewUpdate::RenderMessage { .. } | ViewUpdate::ClearThread | ViewUpdate::AgentDone => {
                ViewElement::MessageThread
            }
            ViewUpdate::RenderStep { .. } | ViewUpdate::ClearSteps => ViewElement::ThinkingSteps,
            ViewUpdate::ReferenceCount { .. } => ViewElement::SourcesCount,
            ViewUpdate::TransparencyLabel { .. } => ViewElement::TransparencyToggle,
            ViewUpdate::ContextChips { .. } | ViewUpdate::ClearContext => ViewElement::ContextItems,
        }
    }

    /// Event name used on the SSE stream
    pub fn event_name(&self) -> &'static str {
        match self {
            ViewUpdate::SetVisible { .. } => "set_visible",
            ViewUpdate::RenderMessage { .. } => "render_message",
            ViewUpdate::ClearThread => "clear_thread",
            ViewUpdate::RenderStep { .. } => "render_step",
            ViewUpdate::ClearSteps => "clear_steps",
            ViewUpdate::ReferenceCount { .. } => "reference_count",
            ViewUpdate::TransparencyLabel { .. } => "transparency_label",
            ViewUpdate::ContextChips { .. } => "context_chips",
            ViewUpdate::ClearContext => "clear_context",
            ViewUpdate::AgentDone => "agent_done",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("View element not bound: {0:?}")]
    BindingMissing(ViewElement),
    #[error("View detached")]
    Detached,
}

/// Render target for session updates
#[async_trait]
pub trait View: Send + Sync {
    async fn apply(&self, update: ViewUpdate) -> Result<(), ViewError>;
}

/// View that fans updates out to stream subscribers
///
/// Elements the front end does not render can be unbound; updates aimed at
/// them fail with [`ViewError::BindingMissing`] and never reach the stream.
#[derive(Clone)]
pub struct BroadcastView {
    tx: broadcast::Sender<ViewUpdate>,
    unbound: Arc<HashSet<ViewElement>>,
}

impl BroadcastView {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            unbound: Arc::new(HashSet::new()),
        }
    }

    #[must_use]
    pub fn without(mut self, elements: impl IntoIterator<Item = ViewElement>) -> Self {
        self.unbound = Arc::new(elements.into_iter().collect());
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewUpdate> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl View for BroadcastView {
    async fn apply(&self, update: ViewUpdate) -> Result<(), ViewError> {
        let element = update.element();
        if self.unbound.contains(&element) {
            return Err(ViewError::BindingMissing(element));
        }
        // No subscribers means no view is attached right now
        self.tx.send(update).map(|_| ()).map_err(|_| ViewError::Detached)
    }
}

//! Session runtime executor

use super::compose::ReplyComposer;
use super::{Command, ReasoningToggle, RuntimeSettings, SubmitError};

use crate::citations::CONTEXT_MANUSCRIPTS;
use crate::disclosure::{StagedDisclosure, DEFAULT_STEPS};
use crate::gateway::SynthesisService;
use crate::session::{references_label, Role, Session, Utterance};
use crate::state_machine::{transition, Effect, Event, SessionContext, TransitionError};
use crate::view::{RenderedMessage, View, ViewElement, ViewUpdate};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Single writer for one session
pub struct SessionRuntime<G, V>
where
    G: SynthesisService + 'static,
    V: View + 'static,
{
    context: SessionContext,
    session: Session,
    disclosure: StagedDisclosure,
    composer: Arc<ReplyComposer>,
    gateway: Arc<G>,
    view: V,
    command_rx: mpsc::Receiver<Command>,
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    /// Cancels every background task of the in-flight turn
    turn_cancel: Option<CancellationToken>,
}

impl<G, V> SessionRuntime<G, V>
where
    G: SynthesisService + 'static,
    V: View + 'static,
{
    pub fn new(
        gateway: G,
        view: V,
        composer: ReplyComposer,
        settings: RuntimeSettings,
        command_rx: mpsc::Receiver<Command>,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let steps = DEFAULT_STEPS.iter().map(|s| (*s).to_string()).collect();
        Self {
            context: SessionContext::new(settings.session_id)
                .with_delivery_delay(settings.pacing.delivery_delay),
            session: Session::new(settings.show_reasoning),
            disclosure: StagedDisclosure::new(steps, settings.pacing.step_delay),
            composer: Arc::new(composer),
            gateway: Arc::new(gateway),
            view,
            command_rx,
            event_rx,
            event_tx,
            turn_cancel: None,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(
            session_id = %self.context.session_id,
            endpoint = %self.gateway.endpoint(),
            "Starting session runtime"
        );

        loop {
            tokio::select! {
                command = self.command_rx.recv() => {
                    match command {
                        Some(Command::Shutdown { reply }) => {
                            self.abort_turn();
                            let _ = reply.send(());
                            break;
                        }
                        Some(command) => self.handle_command(command).await,
                        // Every handle is gone
                        None => {
                            self.abort_turn();
                            break;
                        }
                    }
                }
                Some(event) = self.event_rx.recv() => {
                    if let Err(e) = self.process_event(event).await {
                        tracing::warn!(error = %e, "Dropped session event");
                    }
                }
            }
        }

        tracing::info!(session_id = %self.context.session_id, "Session runtime stopped");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Submit { utterance, reply } => {
                let result = self.submit(utterance).await;
                let _ = reply.send(result);
            }
            Command::Reset { reply } => {
                if let Err(e) = self.process_event(Event::Reset).await {
                    tracing::error!(error = %e, "Reset failed");
                }
                let _ = reply.send(());
            }
            Command::ToggleReasoning { reply } => {
                let _ = reply.send(self.toggle_reasoning().await);
            }
            Command::AttachContext { reply } => {
                let _ = reply.send(self.attach_context().await);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.session.snapshot());
            }
            Command::Shutdown { .. } => {}
        }
    }

    async fn submit(&mut self, utterance: Utterance) -> Result<Uuid, SubmitError> {
        let turn_id = utterance.id;
        tracing::info!(
            session_id = %self.context.session_id,
            %turn_id,
            origin = ?utterance.origin,
            "Turn submitted"
        );
        match self.process_event(Event::UserUtterance { utterance }).await {
            Ok(()) => Ok(turn_id),
            Err(TransitionError::Busy) => Err(SubmitError::Busy),
            Err(e) => {
                tracing::error!(error = %e, "Unexpected transition error on submit");
                Err(SubmitError::Busy)
            }
        }
    }

    async fn toggle_reasoning(&mut self) -> ReasoningToggle {
        self.session.show_reasoning = !self.session.show_reasoning;
        let toggle = ReasoningToggle::new(self.session.show_reasoning);
        self.render(ViewUpdate::TransparencyLabel {
            label: toggle.label.to_string(),
        })
        .await;
        toggle
    }

    async fn attach_context(&mut self) -> Vec<String> {
        for manuscript in CONTEXT_MANUSCRIPTS {
            if !self.session.context_items.iter().any(|item| item == manuscript) {
                self.session.context_items.push(manuscript.to_string());
            }
        }
        self.render(ViewUpdate::show(ViewElement::ContextBar)).await;
        self.render(ViewUpdate::ContextChips {
            items: self.session.context_items.clone(),
        })
        .await;
        self.session.context_items.clone()
    }

    async fn process_event(&mut self, event: Event) -> Result<(), TransitionError> {
        let result = transition(&self.session.state, &self.context, event)?;
        self.session.state = result.new_state;

        for effect in result.effects {
            self.execute_effect(effect).await;
        }
        Ok(())
    }

    async fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Render(update) => self.render(update).await,

            Effect::PublishReferenceCount => self.publish_reference_count().await,

            Effect::AppendMessage { message } => {
                let rendered = RenderedMessage::from_message(&message);
                let is_agent = message.role == Role::Agent;
                self.session.append(message);
                self.render(ViewUpdate::RenderMessage { message: rendered })
                    .await;
                if is_agent {
                    self.publish_reference_count().await;
                }
            }

            Effect::StartDisclosure { turn_id } => {
                let cancel = self.begin_turn();
                let enabled = self.session.show_reasoning;
                if enabled {
                    self.render(ViewUpdate::show(ViewElement::ThinkingPanel))
                        .await;
                    self.render(ViewUpdate::ClearSteps).await;
                }

                let steps = self.disclosure.reveal(enabled, cancel.clone());
                let event_tx = self.event_tx.clone();
                tokio::spawn(async move {
                    let mut steps = std::pin::pin!(steps);
                    while let Some(step) = steps.next().await {
                        let event = Event::StepRevealed {
                            turn_id,
                            index: step.index,
                            label: step.label,
                        };
                        if event_tx.send(event).await.is_err() {
                            return;
                        }
                    }
                    if !cancel.is_cancelled() {
                        let _ = event_tx.send(Event::DisclosureFinished { turn_id }).await;
                    }
                });
            }

            Effect::RequestReply { utterance } => {
                let cancel = self.turn_token();
                let gateway = Arc::clone(&self.gateway);
                let composer = Arc::clone(&self.composer);
                let event_tx = self.event_tx.clone();
                tokio::spawn(async move {
                    let outcome = tokio::select! {
                        biased;

                        () = cancel.cancelled() => {
                            tracing::debug!(turn_id = %utterance.id, "Synthesis abandoned");
                            return;
                        }
                        outcome = gateway.synthesize(&utterance.text) => outcome,
                    };
                    let reply = composer.compose(&utterance, outcome);
                    let _ = event_tx
                        .send(Event::ReplyReady {
                            turn_id: utterance.id,
                            reply,
                        })
                        .await;
                });
            }

            Effect::ScheduleDelivery { turn_id, delay } => {
                let cancel = self.turn_token();
                let event_tx = self.event_tx.clone();
                tokio::spawn(async move {
                    tokio::select! {
                        biased;

                        () = cancel.cancelled() => {}
                        () = tokio::time::sleep(delay) => {
                            let _ = event_tx.send(Event::DeliveryDue { turn_id }).await;
                        }
                    }
                });
            }

            Effect::AbortTurn => self.abort_turn(),

            Effect::ClearSession => self.session.clear(),

            Effect::NotifyAgentDone => {
                self.turn_cancel = None;
                self.render(ViewUpdate::AgentDone).await;
            }
        }
    }

    /// Fresh token for a new turn
    fn begin_turn(&mut self) -> CancellationToken {
        self.abort_turn();
        let token = CancellationToken::new();
        self.turn_cancel = Some(token.clone());
        token
    }

    fn turn_token(&mut self) -> CancellationToken {
        self.turn_cancel
            .get_or_insert_with(CancellationToken::new)
            .clone()
    }

    fn abort_turn(&mut self) {
        if let Some(token) = self.turn_cancel.take() {
            tracing::debug!(session_id = %self.context.session_id, "Aborting in-flight turn");
            token.cancel();
        }
    }

    async fn publish_reference_count(&self) {
        self.render(ViewUpdate::ReferenceCount {
            label: references_label(self.session.reference_count()),
        })
        .await;
    }

    /// One guarded view call; failures never stop the turn
    async fn render(&self, update: ViewUpdate) {
        let name = update.event_name();
        let element = update.element();
        if let Err(e) = self.view.apply(update).await {
            tracing::debug!(
                update = name,
                element = element.as_str(),
                error = %e,
                "View update skipped"
            );
        }
    }
}

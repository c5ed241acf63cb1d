//! Pure state transition function
//!
//! Given the same state, context and event it always produces the same new
//! state and effects. All I/O (timers, backend calls, view updates) is left
//! to the runtime that executes the effects.

use super::{Effect, Event, SessionContext, SessionState};
use crate::view::{ViewElement, ViewUpdate};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Agent is busy, wait for the current answer before sending another message")]
    Busy,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
pub fn transition(
    state: &SessionState,
    context: &SessionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // User utterances
        // ============================================================

        // First utterance activates the conversation view
        (SessionState::Inert, Event::UserUtterance { utterance }) => {
            let turn_id = utterance.id;
            Ok(TransitionResult::new(SessionState::Disclosing {
                turn: utterance.clone(),
            })
            .with_effects(activation_effects())
            .with_effect(Effect::append_user_message(&utterance))
            .with_effect(Effect::StartDisclosure { turn_id }))
        }

        (SessionState::Ready, Event::UserUtterance { utterance }) => {
            let turn_id = utterance.id;
            Ok(TransitionResult::new(SessionState::Disclosing {
                turn: utterance.clone(),
            })
            .with_effect(Effect::append_user_message(&utterance))
            .with_effect(Effect::StartDisclosure { turn_id }))
        }

        // One turn at a time
        (state, Event::UserUtterance { .. }) if state.is_busy() => Err(TransitionError::Busy),

        // ============================================================
        // Staged disclosure
        // ============================================================
        (SessionState::Disclosing { turn }, Event::StepRevealed { turn_id, index, label })
            if turn.id == turn_id =>
        {
            Ok(TransitionResult::new(state.clone())
                .with_effect(Effect::Render(ViewUpdate::RenderStep { index, label })))
        }

        (SessionState::Disclosing { turn }, Event::DisclosureFinished { turn_id })
            if turn.id == turn_id =>
        {
            Ok(
                TransitionResult::new(SessionState::Synthesizing { turn: turn.clone() })
                    .with_effect(Effect::RequestReply {
                        utterance: turn.clone(),
                    }),
            )
        }

        // ============================================================
        // Reply delivery
        // ============================================================
        (SessionState::Synthesizing { turn }, Event::ReplyReady { turn_id, reply })
            if turn.id == turn_id =>
        {
            Ok(TransitionResult::new(SessionState::Delivering {
                turn: turn.clone(),
                reply,
            })
            .with_effect(Effect::ScheduleDelivery {
                turn_id,
                delay: context.delivery_delay,
            }))
        }

        (SessionState::Delivering { turn, reply }, Event::DeliveryDue { turn_id })
            if turn.id == turn_id =>
        {
            Ok(TransitionResult::new(SessionState::Ready)
                .with_effect(Effect::AppendMessage {
                    message: reply.clone(),
                })
                .with_effect(Effect::hide(ViewElement::ThinkingPanel))
                .with_effect(Effect::Render(ViewUpdate::ClearSteps))
                .with_effect(Effect::NotifyAgentDone))
        }

        // ============================================================
        // Reset (from any state, idempotent)
        // ============================================================
        (_, Event::Reset) => {
            Ok(TransitionResult::new(SessionState::Inert).with_effects(reset_effects()))
        }

        // ============================================================
        // Stale and invalid events
        // ============================================================

        // Background events from an aborted turn are dropped
        (state, event) if event.turn_id().is_some() && event.turn_id() != state.turn_id() => {
            Ok(TransitionResult::new(state.clone()))
        }

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {} with event {event:?}",
            state.name()
        ))),
    }
}

fn activation_effects() -> Vec<Effect> {
    vec![
        Effect::hide(ViewElement::WelcomePanel),
        Effect::show(ViewElement::ConversationPanel),
        Effect::show(ViewElement::NewChatButton),
        Effect::show(ViewElement::SourcesPanel),
        Effect::PublishReferenceCount,
    ]
}

fn reset_effects() -> Vec<Effect> {
    vec![
        Effect::AbortTurn,
        Effect::ClearSession,
        Effect::show(ViewElement::WelcomePanel),
        Effect::hide(ViewElement::ConversationPanel),
        Effect::hide(ViewElement::NewChatButton),
        Effect::hide(ViewElement::SourcesPanel),
        Effect::Render(ViewUpdate::ClearThread),
        Effect::hide(ViewElement::ThinkingPanel),
        Effect::Render(ViewUpdate::ClearSteps),
        Effect::hide(ViewElement::ContextBar),
        Effect::Render(ViewUpdate::ClearContext),
        Effect::PublishReferenceCount,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Message, ReplySource, Role, Utterance};

    fn test_context() -> SessionContext {
        SessionContext::new("test-session")
    }

    fn utter(text: &str) -> Event {
        Event::UserUtterance {
            utterance: Utterance::user(text),
        }
    }

    fn reply() -> Message {
        Message::agent("answer", vec![], ReplySource::Canned, None)
    }

    #[test]
    fn test_inert_to_disclosing_activates_view() {
        let result = transition(&SessionState::Inert, &test_context(), utter("Hello")).unwrap();

        assert!(matches!(result.new_state, SessionState::Disclosing { .. }));
        assert!(result
            .effects
            .contains(&Effect::hide(ViewElement::WelcomePanel)));
        assert!(result.effects.contains(&Effect::PublishReferenceCount));

        // User message is appended before disclosure starts
        let append = result
            .effects
            .iter()
            .position(|e| matches!(e, Effect::AppendMessage { message } if message.role == Role::User))
            .unwrap();
        let disclose = result
            .effects
            .iter()
            .position(|e| matches!(e, Effect::StartDisclosure { .. }))
            .unwrap();
        assert!(append < disclose);
    }

    #[test]
    fn test_ready_does_not_reactivate() {
        let result = transition(&SessionState::Ready, &test_context(), utter("again")).unwrap();
        assert!(!result
            .effects
            .contains(&Effect::hide(ViewElement::WelcomePanel)));
        assert!(!result.effects.contains(&Effect::PublishReferenceCount));
    }

    #[test]
    fn test_reject_utterance_while_busy() {
        let turn = Utterance::user("first");
        let result = transition(
            &SessionState::Disclosing { turn },
            &test_context(),
            utter("second"),
        );
        assert_eq!(result.unwrap_err(), TransitionError::Busy);
    }

    #[test]
    fn test_full_turn() {
        let ctx = test_context();
        let turn = Utterance::user("pump");
        let turn_id = turn.id;

        let state = SessionState::Disclosing { turn };
        let r = transition(&state, &ctx, Event::DisclosureFinished { turn_id }).unwrap();
        assert!(matches!(r.new_state, SessionState::Synthesizing { .. }));
        assert!(matches!(r.effects[0], Effect::RequestReply { .. }));

        let r = transition(
            &r.new_state,
            &ctx,
            Event::ReplyReady {
                turn_id,
                reply: reply(),
            },
        )
        .unwrap();
        assert!(matches!(r.new_state, SessionState::Delivering { .. }));
        assert_eq!(
            r.effects,
            vec![Effect::ScheduleDelivery {
                turn_id,
                delay: ctx.delivery_delay
            }]
        );

        let r = transition(&r.new_state, &ctx, Event::DeliveryDue { turn_id }).unwrap();
        assert_eq!(r.new_state, SessionState::Ready);
        assert!(matches!(
            &r.effects[0],
            Effect::AppendMessage { message } if message.role == Role::Agent
        ));
        assert!(r.effects.contains(&Effect::NotifyAgentDone));
    }

    #[test]
    fn test_step_revealed_renders_label() {
        let turn = Utterance::user("pump");
        let turn_id = turn.id;
        let state = SessionState::Disclosing { turn };

        let r = transition(
            &state,
            &test_context(),
            Event::StepRevealed {
                turn_id,
                index: 0,
                label: "step".to_string(),
            },
        )
        .unwrap();
        assert_eq!(r.new_state, state);
        assert_eq!(
            r.effects,
            vec![Effect::Render(ViewUpdate::RenderStep {
                index: 0,
                label: "step".to_string()
            })]
        );
    }

    #[test]
    fn test_stale_events_are_dropped() {
        let stale = Utterance::user("old").id;
        let r = transition(
            &SessionState::Ready,
            &test_context(),
            Event::DeliveryDue { turn_id: stale },
        )
        .unwrap();
        assert_eq!(r.new_state, SessionState::Ready);
        assert!(r.effects.is_empty());

        let r = transition(
            &SessionState::Inert,
            &test_context(),
            Event::ReplyReady {
                turn_id: stale,
                reply: reply(),
            },
        )
        .unwrap();
        assert_eq!(r.new_state, SessionState::Inert);
        assert!(r.effects.is_empty());
    }

    #[test]
    fn test_out_of_order_event_for_current_turn_is_invalid() {
        let turn = Utterance::user("pump");
        let turn_id = turn.id;
        let result = transition(
            &SessionState::Disclosing { turn },
            &test_context(),
            Event::DeliveryDue { turn_id },
        );
        assert!(matches!(
            result,
            Err(TransitionError::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let turn = Utterance::user("pump");
        let once = transition(
            &SessionState::Synthesizing { turn },
            &test_context(),
            Event::Reset,
        )
        .unwrap();
        let twice = transition(&once.new_state, &test_context(), Event::Reset).unwrap();

        assert_eq!(once.new_state, SessionState::Inert);
        assert_eq!(twice.new_state, SessionState::Inert);
        assert_eq!(once.effects, twice.effects);
        assert_eq!(once.effects[0], Effect::AbortTurn);
    }
}

//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across arbitrary event sequences.

use super::transition::*;
use super::*;
use crate::session::{Message, ReplySource, Role, Utterance};
use proptest::prelude::*;
use uuid::Uuid;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> SessionContext {
    SessionContext::new("test-session")
}

/// Abstract action, bound to the current turn id when applied
#[derive(Debug, Clone)]
enum Action {
    Utter(String),
    Step(usize),
    Finish,
    Reply,
    Deliver,
    Reset,
    Stale,
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        "[a-z ]{1,20}".prop_map(Action::Utter),
        (0usize..5).prop_map(Action::Step),
        Just(Action::Finish),
        Just(Action::Reply),
        Just(Action::Deliver),
        Just(Action::Reset),
        Just(Action::Stale),
    ]
}

fn bind(action: Action, state: &SessionState) -> Event {
    let turn_id = state.turn_id().unwrap_or_else(Uuid::new_v4);
    match action {
        Action::Utter(text) => Event::UserUtterance {
            utterance: Utterance::user(text),
        },
        Action::Step(index) => Event::StepRevealed {
            turn_id,
            index,
            label: format!("step {index}"),
        },
        Action::Finish => Event::DisclosureFinished { turn_id },
        Action::Reply => Event::ReplyReady {
            turn_id,
            reply: Message::agent("reply", vec![], ReplySource::Canned, None),
        },
        Action::Deliver => Event::DeliveryDue { turn_id },
        Action::Reset => Event::Reset,
        Action::Stale => Event::DeliveryDue {
            turn_id: Uuid::new_v4(),
        },
    }
}

fn appended_roles(effects: &[Effect]) -> Vec<Role> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::AppendMessage { message } => Some(message.role),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Reset always lands in Inert and always aborts pending work first
    #[test]
    fn prop_reset_always_inert(actions in proptest::collection::vec(arb_action(), 0..20)) {
        let ctx = test_context();
        let mut state = SessionState::Inert;

        for action in actions {
            if let Ok(result) = transition(&state, &ctx, bind(action, &state)) {
                state = result.new_state;
            }
        }

        let result = transition(&state, &ctx, Event::Reset).unwrap();
        prop_assert_eq!(&result.new_state, &SessionState::Inert);
        prop_assert_eq!(&result.effects[0], &Effect::AbortTurn);
    }

    // Utterances are accepted exactly when no turn is in flight
    #[test]
    fn prop_single_in_flight(actions in proptest::collection::vec(arb_action(), 0..20)) {
        let ctx = test_context();
        let mut state = SessionState::Inert;

        for action in actions {
            let is_utterance = matches!(action, Action::Utter(_));
            let was_busy = state.is_busy();
            let result = transition(&state, &ctx, bind(action, &state));

            if is_utterance {
                prop_assert_eq!(result.is_err(), was_busy);
            }
            if let Ok(r) = result {
                state = r.new_state;
            }
        }
    }

    // Each turn appends one user message and at most one agent message,
    // and the agent message never precedes its user message
    #[test]
    fn prop_agent_messages_follow_user_messages(
        actions in proptest::collection::vec(arb_action(), 0..30)
    ) {
        let ctx = test_context();
        let mut state = SessionState::Inert;
        let mut users = 0usize;
        let mut agents = 0usize;

        for action in actions {
            if matches!(action, Action::Reset) {
                users = 0;
                agents = 0;
            }
            if let Ok(result) = transition(&state, &ctx, bind(action, &state)) {
                for role in appended_roles(&result.effects) {
                    match role {
                        Role::User => users += 1,
                        Role::Agent => agents += 1,
                    }
                }
                state = result.new_state;
            }
            prop_assert!(agents <= users);
            prop_assert!(users - agents <= 1);
        }
    }

    // Events for another turn never change state or produce effects
    #[test]
    fn prop_stale_events_are_inert(actions in proptest::collection::vec(arb_action(), 0..20)) {
        let ctx = test_context();
        let mut state = SessionState::Inert;

        for action in actions {
            if let Ok(result) = transition(&state, &ctx, bind(action, &state)) {
                state = result.new_state;
            }
            let stale = bind(Action::Stale, &state);
            let result = transition(&state, &ctx, stale).unwrap();
            prop_assert_eq!(&result.new_state, &state);
            prop_assert!(result.effects.is_empty());
        }
    }
}

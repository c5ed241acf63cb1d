//! API request and response types

use crate::orchestrator::PromptCard;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to send a typed message
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

/// Response for an accepted turn
#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub turn_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct PromptCardsResponse {
    pub cards: &'static [PromptCard],
}

/// Response for the attach action
#[derive(Debug, Serialize)]
pub struct ContextResponse {
    pub items: Vec<String>,
}

/// Response for reset
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

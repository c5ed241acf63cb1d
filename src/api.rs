//! HTTP API for the session
//!
//! Commands arrive as JSON requests; view updates leave over SSE.

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;

use crate::orchestrator::OrchestratorHandle;
use crate::view::BroadcastView;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: OrchestratorHandle,
    /// Source of the SSE stream
    pub view: BroadcastView,
}

impl AppState {
    pub fn new(orchestrator: OrchestratorHandle, view: BroadcastView) -> Self {
        Self { orchestrator, view }
    }
}

//! Mock implementations for testing
//!
//! These mocks drive the runtime without network or a browser.

use crate::citations::Citation;
use crate::gateway::{
    DesignFeature, DesignResult, DesignScores, GatewayError, HealthStatus, SynthesisService,
};
use crate::view::{View, ViewElement, ViewError, ViewUpdate};
use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

// ============================================================================
// Mock Gateway
// ============================================================================

/// Gateway that returns queued results
pub struct MockGateway {
    results: Mutex<VecDeque<Result<DesignResult, GatewayError>>>,
    /// Fallback once the queue is empty
    exhausted: GatewayError,
    delay: Option<Duration>,
    prompts: Mutex<Vec<String>>,
    /// Notified when a request starts (for test synchronization)
    request_started: Arc<Notify>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            results: Mutex::new(VecDeque::new()),
            exhausted: GatewayError::network("No mock result queued"),
            delay: None,
            prompts: Mutex::new(Vec::new()),
            request_started: Arc::new(Notify::new()),
        }
    }

    /// Behaves like a deployment without a backend
    pub fn unavailable() -> Self {
        Self {
            exhausted: GatewayError::unavailable("No synthesis backend configured"),
            ..Self::new()
        }
    }

    /// Hold every response for `delay` (for cancellation tests)
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn queue(&self, result: Result<DesignResult, GatewayError>) {
        self.results.lock().unwrap().push_back(result);
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub async fn wait_for_request(&self) {
        self.request_started.notified().await;
    }
}

#[async_trait]
impl SynthesisService for MockGateway {
    async fn synthesize(&self, prompt: &str) -> Result<DesignResult, GatewayError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let result = self
            .results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(self.exhausted.clone()));
        self.request_started.notify_one();

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn health(&self) -> Result<HealthStatus, GatewayError> {
        Ok(HealthStatus {
            status: "ok".to_string(),
        })
    }

    fn endpoint(&self) -> &str {
        "mock"
    }
}

/// Well-formed design with `count` numbered features
pub fn design_with_features(count: usize) -> DesignResult {
    DesignResult {
        name: "Ornithopter Pump".to_string(),
        product_type: "hand-powered pump".to_string(),
        target_market: "field hospitals".to_string(),
        scores: DesignScores {
            innovation: 9.0,
            feasibility: 6.5,
            viability: 7.5,
        },
        features: (1..=count)
            .map(|i| DesignFeature {
                description: format!("Feature {i}"),
                development_stage: "prototype".to_string(),
                engineering_note: format!("Engineering note {i}"),
                inspiration: "Codex Madrid I gear trains".to_string(),
            })
            .collect(),
        principles: vec!["observation".to_string(), "proportion".to_string()],
        citations: vec![Citation::new("Codex Madrid I", "📐")],
    }
}

// ============================================================================
// Recording View
// ============================================================================

/// View that records applied updates and can simulate missing bindings
pub struct RecordingView {
    updates: Mutex<Vec<ViewUpdate>>,
    missing: HashSet<ViewElement>,
    agent_done: Notify,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::with_missing([])
    }

    pub fn with_missing(missing: impl IntoIterator<Item = ViewElement>) -> Self {
        Self {
            updates: Mutex::new(Vec::new()),
            missing: missing.into_iter().collect(),
            agent_done: Notify::new(),
        }
    }

    pub fn updates(&self) -> Vec<ViewUpdate> {
        self.updates.lock().unwrap().clone()
    }

    pub fn step_count(&self) -> usize {
        self.updates
            .lock()
            .unwrap()
            .iter()
            .filter(|u| matches!(u, ViewUpdate::RenderStep { .. }))
            .count()
    }

    pub fn last_reference_label(&self) -> Option<String> {
        self.updates
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find_map(|u| match u {
                ViewUpdate::ReferenceCount { label } => Some(label.clone()),
                _ => None,
            })
    }

    /// Wait for the next finished turn; fails instead of hanging
    pub async fn wait_for_agent_done(&self) {
        tokio::time::timeout(Duration::from_secs(60), self.agent_done.notified())
            .await
            .expect("agent never finished the turn");
    }
}

#[async_trait]
impl View for RecordingView {
    async fn apply(&self, update: ViewUpdate) -> Result<(), ViewError> {
        let element = update.element();
        if self.missing.contains(&element) {
            return Err(ViewError::BindingMissing(element));
        }
        let done = update == ViewUpdate::AgentDone;
        self.updates.lock().unwrap().push(update);
        if done {
            self.agent_done.notify_one();
        }
        Ok(())
    }
}

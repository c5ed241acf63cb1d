//! Design-synthesis backend abstraction
//!
//! Every failure mode is folded into one [`GatewayError`] so the orchestrator
//! can treat "backend failed" and "no backend" identically.

mod config;
mod error;
mod http;
mod types;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::HttpGateway;
pub use types::{DesignResult, HealthStatus};

#[cfg(test)]
pub use error::GatewayErrorKind;
#[cfg(test)]
pub use types::{DesignFeature, DesignScores};

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for synthesis backends
#[async_trait]
pub trait SynthesisService: Send + Sync {
    /// Turn a prompt into a design concept
    async fn synthesize(&self, prompt: &str) -> Result<DesignResult, GatewayError>;

    /// Diagnostic health probe
    async fn health(&self) -> Result<HealthStatus, GatewayError>;

    /// Base URL, for logs
    fn endpoint(&self) -> &str;
}

/// Stand-in used when no backend is configured
pub struct NoBackend;

#[async_trait]
impl SynthesisService for NoBackend {
    async fn synthesize(&self, _prompt: &str) -> Result<DesignResult, GatewayError> {
        Err(GatewayError::unavailable("No synthesis backend configured"))
    }

    async fn health(&self) -> Result<HealthStatus, GatewayError> {
        Err(GatewayError::unavailable("No synthesis backend configured"))
    }

    fn endpoint(&self) -> &str {
        "none"
    }
}

/// Logging wrapper for synthesis services
pub struct LoggingGateway {
    inner: Arc<dyn SynthesisService>,
}

impl LoggingGateway {
    pub fn new(inner: Arc<dyn SynthesisService>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl SynthesisService for LoggingGateway {
    async fn synthesize(&self, prompt: &str) -> Result<DesignResult, GatewayError> {
        let start = std::time::Instant::now();
        let result = self.inner.synthesize(prompt).await;
        let duration = start.elapsed();

        match &result {
            Ok(design) => {
                tracing::info!(
                    endpoint = %self.inner.endpoint(),
                    duration_ms = %duration.as_millis(),
                    design = %design.name,
                    features = design.features.len(),
                    "Synthesis request completed"
                );
            }
            Err(e) => {
                tracing::warn!(
                    endpoint = %self.inner.endpoint(),
                    duration_ms = %duration.as_millis(),
                    kind = %e.kind,
                    error = %e.message,
                    "Synthesis request failed"
                );
            }
        }

        result
    }

    async fn health(&self) -> Result<HealthStatus, GatewayError> {
        self.inner.health().await
    }

    fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }
}

/// Build the configured backend, wrapped with logging
pub fn build(config: &GatewayConfig) -> Arc<dyn SynthesisService> {
    let Some(base_url) = config.resolved_base_url() else {
        tracing::warn!(
            api_base = %config.api_base(),
            "No absolute synthesis endpoint; answering from canned responses"
        );
        return Arc::new(NoBackend);
    };

    match HttpGateway::new(&base_url, config.timeout()) {
        Ok(gateway) => Arc::new(LoggingGateway::new(Arc::new(gateway))),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build synthesis client");
            Arc::new(NoBackend)
        }
    }
}

/// Run the startup health probe; the outcome is only logged
pub async fn probe_health(service: &dyn SynthesisService) {
    match service.health().await {
        Ok(health) => {
            tracing::info!(endpoint = %service.endpoint(), status = %health.status, "Synthesis backend reachable");
        }
        Err(e) => {
            tracing::warn!(endpoint = %service.endpoint(), error = %e, "Synthesis backend health check failed");
        }
    }
}

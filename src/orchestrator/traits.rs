//! Shared-pointer impls for the runtime's I/O seams
//!
//! The runtime is generic over its gateway and view so tests can hand it
//! mocks they keep a reference to.

use crate::gateway::{DesignResult, GatewayError, HealthStatus, SynthesisService};
use crate::view::{View, ViewError, ViewUpdate};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
impl<T: SynthesisService + ?Sized> SynthesisService for Arc<T> {
    async fn synthesize(&self, prompt: &str) -> Result<DesignResult, GatewayError> {
        (**self).synthesize(prompt).await
    }

    async fn health(&self) -> Result<HealthStatus, GatewayError> {
        (**self).health().await
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}

#[async_trait]
impl<T: View + ?Sized> View for Arc<T> {
    async fn apply(&self, update: ViewUpdate) -> Result<(), ViewError> {
        (**self).apply(update).await
    }
}

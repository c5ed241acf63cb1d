//! HTTP client for the synthesis backend

use super::types::{DesignResult, HealthStatus, ProcessRequest, ProcessResponse};
use super::{GatewayError, SynthesisService};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Longest response body echoed into error messages
const MAX_ERROR_BODY: usize = 200;

/// Synthesis backend reached over HTTP
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::unavailable(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

fn transport_error(e: &reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::timeout(format!("Request timeout: {e}"))
    } else if e.is_connect() {
        GatewayError::network(format!("Connection failed: {e}"))
    } else {
        GatewayError::network(format!("Request failed: {e}"))
    }
}

fn truncate_body(body: &str) -> String {
    if body.chars().count() > MAX_ERROR_BODY {
        let head: String = body.chars().take(MAX_ERROR_BODY).collect();
        format!("{head}...")
    } else {
        body.to_string()
    }
}

async fn read_body(response: reqwest::Response) -> Result<String, GatewayError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| GatewayError::network(format!("Failed to read response: {e}")))?;

    if status.is_success() {
        Ok(body)
    } else {
        Err(GatewayError::status(status.as_u16(), &truncate_body(&body)))
    }
}

#[async_trait]
impl SynthesisService for HttpGateway {
    async fn synthesize(&self, prompt: &str) -> Result<DesignResult, GatewayError> {
        let response = self
            .client
            .post(self.url("process"))
            .json(&ProcessRequest {
                prompt: prompt.to_string(),
            })
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let body = read_body(response).await?;
        let parsed: ProcessResponse = serde_json::from_str(&body).map_err(|e| {
            GatewayError::malformed(format!(
                "Failed to parse response: {e} - body: {}",
                truncate_body(&body)
            ))
        })?;

        if !parsed.success {
            return Err(GatewayError::rejected(
                parsed
                    .error
                    .unwrap_or_else(|| "Backend reported failure".to_string()),
            ));
        }

        parsed
            .design
            .ok_or_else(|| GatewayError::malformed("Successful response without design"))
    }

    async fn health(&self) -> Result<HealthStatus, GatewayError> {
        let response = self
            .client
            .get(self.url("health"))
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let body = read_body(response).await?;
        serde_json::from_str(&body)
            .map_err(|e| GatewayError::malformed(format!("Failed to parse health: {e}")))
    }

    fn endpoint(&self) -> &str {
        &self.base_url
    }
}

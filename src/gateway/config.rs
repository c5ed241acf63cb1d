//! Backend endpoint configuration

use std::time::Duration;

/// Endpoint used when the service runs on a loopback host
pub const LOCAL_DEV_API_BASE: &str = "http://localhost:5000/api";

/// Relative base used behind a reverse proxy
pub const RELATIVE_API_BASE: &str = "/api";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const LOOPBACK_HOSTS: [&str; 4] = ["localhost", "127.0.0.1", "::1", "0.0.0.0"];

/// Configuration for the synthesis backend
#[derive(Debug, Clone, Default)]
pub struct GatewayConfig {
    /// Explicit base URL; wins over the host rule
    pub api_base: Option<String>,
    /// Host name the service is reached on
    pub host: Option<String>,
    /// Public origin (e.g. `https://dvnc.example`) used to absolutize `/api`
    pub public_origin: Option<String>,
    pub timeout: Option<Duration>,
    /// Skip the backend entirely and always answer from canned responses
    pub disabled: bool,
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        Self {
            api_base: non_empty_env("DVNC_API_BASE"),
            host: non_empty_env("DVNC_HOST"),
            public_origin: non_empty_env("DVNC_PUBLIC_ORIGIN"),
            timeout: std::env::var("DVNC_GATEWAY_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs),
            disabled: std::env::var("DVNC_DISABLE_BACKEND")
                .is_ok_and(|v| matches!(v.as_str(), "1" | "true" | "yes")),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }

    /// The base URL selected by the loopback rule, before absolutizing
    pub fn api_base(&self) -> String {
        if let Some(base) = &self.api_base {
            return base.trim_end_matches('/').to_string();
        }
        let host = self.host.as_deref().unwrap_or("localhost");
        if is_loopback(host) {
            LOCAL_DEV_API_BASE.to_string()
        } else {
            RELATIVE_API_BASE.to_string()
        }
    }

    /// Absolute base URL the client can call, if any
    ///
    /// A relative base needs a public origin; without one there is no backend.
    pub fn resolved_base_url(&self) -> Option<String> {
        if self.disabled {
            return None;
        }
        let base = self.api_base();
        if base.starts_with("http://") || base.starts_with("https://") {
            return Some(base);
        }
        self.public_origin
            .as_deref()
            .map(|origin| format!("{}{}", origin.trim_end_matches('/'), base))
    }
}

fn is_loopback(host: &str) -> bool {
    let bare = host
        .trim_start_matches('[')
        .split(']')
        .next()
        .unwrap_or(host);
    // Strip a trailing :port for non-IPv6 hosts
    let bare = if bare.matches(':').count() == 1 {
        bare.split(':').next().unwrap_or(bare)
    } else {
        bare
    };
    LOOPBACK_HOSTS.contains(&bare)
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

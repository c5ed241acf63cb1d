//! Gateway error type

use thiserror::Error;

/// Uniform synthesis failure
///
/// Callers treat every kind the same way (fall back to a canned response);
/// the kind only feeds diagnostics.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub message: String,
}

impl GatewayError {
    pub fn new(kind: GatewayErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Timeout, message)
    }

    pub fn status(code: u16, body: &str) -> Self {
        Self::new(GatewayErrorKind::Status, format!("HTTP {code}: {body}"))
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Rejected, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Malformed, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Unavailable, message)
    }
}

/// Failure classification for logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// Connection refused, reset, DNS
    Network,
    Timeout,
    /// Non-2xx HTTP status
    Status,
    /// Backend answered with `success: false`
    Rejected,
    /// Body did not decode into the expected shape
    Malformed,
    /// No backend configured
    Unavailable,
}

impl std::fmt::Display for GatewayErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::Status => "status",
            Self::Rejected => "rejected",
            Self::Malformed => "malformed",
            Self::Unavailable => "unavailable",
        };
        f.write_str(name)
    }
}

//! Typed failure classification for dispatched requests.
//!
//! Every remote failure maps to exactly one kind with a short message
//! suitable for direct display. Nothing here is retried implicitly; the
//! dispatcher decides what is retryable.

use thiserror::Error;

/// Errors raised by request dispatch.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Response received with a non-success status. `body` is the parsed
    /// JSON error payload (empty object when the body was not JSON).
    #[error("{}", http_message(.status, .status_text, .body))]
    Http {
        status: u16,
        status_text: String,
        body: serde_json::Value,
    },

    /// The configured window elapsed before the response arrived.
    #[error("Request timed out after {duration_ms} ms")]
    Timeout { duration_ms: u64 },

    /// Transport-level failure (DNS, refused connection, TLS).
    #[error("{message}")]
    Network {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server reported success but the body was not valid JSON.
    #[error("Invalid response body: {source}")]
    InvalidResponse {
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Classify a transport failure, with distinct copy for the local
    /// default versus an external profile.
    pub(crate) fn network(source: reqwest::Error, external: bool) -> Self {
        let message = if external {
            "Could not reach the configured server. Check the profile's base URL and your server configuration.".to_string()
        } else {
            "Could not reach the local API server. Is it running?".to_string()
        };
        Self::Network { message, source }
    }

    /// Stable kind string for logs and structured output.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Http { .. } => "http_error",
            Self::Timeout { .. } => "timeout",
            Self::Network { .. } => "network_error",
            Self::InvalidResponse { .. } => "invalid_response",
        }
    }

    /// HTTP status code, when the failure carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Prefer the server's `error` field over the bare status line.
fn http_message(status: &u16, status_text: &str, body: &serde_json::Value) -> String {
    match body.get("error").and_then(|e| e.as_str()) {
        Some(message) => message.to_string(),
        None => format!("Request failed with status {status} {status_text}"),
    }
}

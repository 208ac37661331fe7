//! Reachability probe for a single profile.

use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::time::timeout;

use crate::client::{header_map, resolve, ApiClient, RequestOptions};
use crate::profile::types::BackendProfile;

/// Structured outcome of a health probe. Never an error: every failure
/// mode folds into `success = false` with its own message.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub success: bool,
    pub message: String,
    pub response_time_ms: u64,
}

impl ApiClient {
    /// Probe a profile's health endpoint.
    ///
    /// Success is purely an HTTP status in the success range; the body
    /// is ignored. The probe races the profile's health-check timeout
    /// (its own default, shorter than the dispatch default) and reports
    /// timeout, HTTP failure and transport failure distinctly.
    pub async fn test_profile(&self, profile: &BackendProfile) -> ProbeReport {
        let policy = profile.health_check.clone().unwrap_or_default();
        let url = resolve::join_url(&profile.base_url, &policy.path);
        let headers = header_map(
            &self.assemble_headers(Some(profile), &RequestOptions::authenticated()),
        );

        let started = Instant::now();
        let outcome = timeout(
            Duration::from_millis(policy.timeout),
            self.http.get(&url).headers(headers).send(),
        )
        .await;
        let response_time_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Err(_) => ProbeReport {
                success: false,
                message: format!("Health check timed out after {} ms", policy.timeout),
                response_time_ms,
            },
            Ok(Err(e)) => ProbeReport {
                success: false,
                message: format!("Connection failed: {e}"),
                response_time_ms,
            },
            Ok(Ok(response)) if response.status().is_success() => ProbeReport {
                success: true,
                message: format!("Server is reachable ({} ms)", response_time_ms),
                response_time_ms,
            },
            Ok(Ok(response)) => ProbeReport {
                success: false,
                message: format!(
                    "Server responded with HTTP {}",
                    response.status().as_u16()
                ),
                response_time_ms,
            },
        }
    }
}

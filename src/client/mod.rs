//! Request dispatch against the active backend profile.
//!
//! The client is an explicitly constructed handle: it owns its HTTP
//! client and borrows shared handles to the profile store and token
//! store. No module-level state exists; two clients with different
//! options coexist happily.

pub mod error;
pub mod probe;
pub mod resolve;
pub mod resources;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde_json::Value;
use tokio::time::timeout;

use crate::profile::auth::build_auth_header;
use crate::profile::store::ProfileStore;
use crate::profile::types::{local_base_url, AuthScheme, BackendProfile};
use crate::token::TokenStore;

pub use error::ApiError;
pub use probe::ProbeReport;

/// Dispatch timeout when the active profile sets none.
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Base delay for transport-failure retries; doubles per attempt.
const RETRY_BACKOFF_BASE_MS: u64 = 100;

/// Construction-time knobs for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Value of the platform marker header sent on every request.
    pub platform: String,
    /// When false, every request targets the local default base URL
    /// regardless of the active profile.
    pub external_enabled: bool,
    /// Base URL used when no profile applies.
    pub local_base_url: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            platform: "cli".to_string(),
            external_enabled: true,
            local_base_url: local_base_url(),
        }
    }
}

/// Per-call options for [`ApiClient::request`].
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Attach the profile's authentication header.
    pub auth: bool,
    /// Caller headers, merged on top of everything else.
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn authenticated() -> Self {
        Self {
            auth: true,
            headers: Vec::new(),
        }
    }
}

/// JSON API client dispatching against whichever profile is active.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    profiles: ProfileStore,
    tokens: TokenStore,
    options: ClientOptions,
}

impl ApiClient {
    pub fn new(profiles: ProfileStore, tokens: TokenStore, options: ClientOptions) -> Self {
        let http = reqwest::Client::builder()
            .build()
            .expect("Failed to build HTTP client");
        Self {
            http,
            profiles,
            tokens,
            options,
        }
    }

    pub fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Issue one JSON request against the active profile.
    ///
    /// The attempt races a timer set to the profile's timeout; when the
    /// timer fires the in-flight call is dropped, which aborts it, so no
    /// timer or connection outlives the call on any path. Transport
    /// failures are retried up to the profile's `retries` with
    /// exponential backoff; timeouts and HTTP-status failures never are.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        opts: RequestOptions,
    ) -> Result<Value, ApiError> {
        let profile = if self.options.external_enabled {
            self.profiles.get_active()
        } else {
            None
        };
        // The seeded profile points at the local default; only a profile
        // aimed elsewhere counts as external for failure copy.
        let external = profile
            .as_ref()
            .map(|p| p.base_url != self.options.local_base_url)
            .unwrap_or(false);

        let url = match &profile {
            Some(p) => resolve::resolve_url(p, path),
            None => resolve::join_url(&self.options.local_base_url, path),
        };
        let headers = header_map(&self.assemble_headers(profile.as_ref(), &opts));

        let timeout_ms = profile
            .as_ref()
            .and_then(|p| p.timeout)
            .unwrap_or(DEFAULT_TIMEOUT_MS);
        let retries = profile.as_ref().and_then(|p| p.retries).unwrap_or(0);

        let mut attempt: u32 = 0;
        loop {
            let outcome = timeout(
                Duration::from_millis(timeout_ms),
                self.send_once(method.clone(), &url, headers.clone(), body.as_ref(), external),
            )
            .await;

            match outcome {
                Err(_) => {
                    return Err(ApiError::Timeout {
                        duration_ms: timeout_ms,
                    })
                }
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(err)) => {
                    if matches!(err, ApiError::Network { .. }) && attempt < retries {
                        let backoff = RETRY_BACKOFF_BASE_MS << attempt;
                        tracing::warn!(
                            attempt = attempt + 1,
                            backoff_ms = backoff,
                            error = %err,
                            "Transport failure, retrying"
                        );
                        tokio::time::sleep(Duration::from_millis(backoff)).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(err);
                }
            }
        }
    }

    async fn send_once(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<&Value>,
        external: bool,
    ) -> Result<Value, ApiError> {
        let mut builder = self.http.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::network(e, external))?;

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or("").to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::network(e, external))?;

        if !status.is_success() {
            // Tolerate non-JSON error bodies.
            let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| serde_json::json!({}));
            return Err(ApiError::Http {
                status: status.as_u16(),
                status_text,
                body,
            });
        }

        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| ApiError::InvalidResponse { source: e })
    }

    /// Assemble the ordered header pairs for one request: baseline,
    /// then profile statics, then auth scheme, then caller overrides.
    /// Later entries win on name collisions.
    fn assemble_headers(
        &self,
        profile: Option<&BackendProfile>,
        opts: &RequestOptions,
    ) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            (
                resolve::PLATFORM_HEADER.to_string(),
                self.options.platform.clone(),
            ),
        ];

        if let Some(profile) = profile {
            for (name, value) in &profile.headers {
                pairs.push((name.clone(), value.clone()));
            }
        }

        if opts.auth {
            // Requests with no profile go to the local API, which speaks
            // bearer tokens.
            let scheme = profile
                .map(|p| &p.authentication)
                .unwrap_or(&AuthScheme::Bearer);
            if let Some((name, value)) = build_auth_header(scheme, &self.tokens) {
                pairs.push((name, value));
            }
        }

        pairs.extend(opts.headers.iter().cloned());
        pairs
    }
}

/// Fold pairs into a header map; later pairs replace earlier ones.
/// Unparsable names or values are skipped, not fatal.
fn header_map(pairs: &[(String, String)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        match (
            HeaderName::try_from(name.as_str()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                map.insert(name, value);
            }
            _ => tracing::warn!(header = %name, "Skipping invalid header"),
        }
    }
    map
}

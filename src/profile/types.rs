use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Environment variable overriding the local default base URL.
pub const LOCAL_BASE_URL_ENV: &str = "SOUQ_API_URL";

/// Base URL used when no profile is active (or external mode is off).
///
/// The web client resolves `/api` against the page origin; a native
/// client needs an absolute URL, so this reads `SOUQ_API_URL` and falls
/// back to the development server address.
pub fn local_base_url() -> String {
    std::env::var(LOCAL_BASE_URL_ENV)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "http://127.0.0.1:5000/api".to_string())
}

/// Logical API resource whose concrete path may be overridden per profile.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Auth,
    Users,
    Stores,
    Products,
    Companies,
    Jobs,
    Orders,
    Analytics,
}

impl Resource {
    /// Default path prefix served by every conforming backend.
    pub fn default_prefix(&self) -> &'static str {
        match self {
            Self::Auth => "/auth",
            Self::Users => "/users",
            Self::Stores => "/stores",
            Self::Products => "/products",
            Self::Companies => "/companies",
            Self::Jobs => "/jobs",
            Self::Orders => "/orders",
            Self::Analytics => "/analytics",
        }
    }

    /// All variants for iteration.
    pub fn all() -> &'static [Resource] {
        &[
            Self::Auth,
            Self::Users,
            Self::Stores,
            Self::Products,
            Self::Companies,
            Self::Jobs,
            Self::Orders,
            Self::Analytics,
        ]
    }

    /// Parse from the lowercase wire name. Unknown names return `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "auth" => Some(Self::Auth),
            "users" => Some(Self::Users),
            "stores" => Some(Self::Stores),
            "products" => Some(Self::Products),
            "companies" => Some(Self::Companies),
            "jobs" => Some(Self::Jobs),
            "orders" => Some(Self::Orders),
            "analytics" => Some(Self::Analytics),
            _ => None,
        }
    }
}

/// Authentication scheme for a backend. Exactly one scheme per profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AuthScheme {
    /// No authentication header is sent.
    #[default]
    None,
    /// `Authorization: Bearer <token>`, token read from the shared
    /// [`TokenStore`](crate::token::TokenStore) at request time.
    Bearer,
    /// Custom header name/value pair stored on the profile.
    ApiKey { header: String, value: String },
    /// `Authorization: Basic base64(username:password)`.
    Basic { username: String, password: String },
}

/// Health-check policy consumed by `test_profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckPolicy {
    /// Probe path relative to the profile base URL.
    #[serde(default = "default_health_path")]
    pub path: String,
    /// Probe timeout in milliseconds.
    #[serde(default = "default_health_timeout")]
    pub timeout: u64,
}

impl Default for HealthCheckPolicy {
    fn default() -> Self {
        Self {
            path: default_health_path(),
            timeout: default_health_timeout(),
        }
    }
}

fn default_health_path() -> String {
    "/health".to_string()
}

fn default_health_timeout() -> u64 {
    5_000
}

fn default_draft_active() -> bool {
    true
}

/// A named, persisted descriptor of a reachable backend.
///
/// Profiles are stored as camelCase JSON so exported documents
/// interoperate with the web client's export format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendProfile {
    /// Opaque unique identifier, assigned at creation, immutable.
    pub id: String,
    /// Human-readable label, not unique.
    pub name: String,
    pub base_url: String,
    /// Whether this profile may currently be selected as active.
    pub is_active: bool,
    /// At most one profile in the collection holds this.
    pub is_default: bool,
    /// Per-resource path overrides.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub endpoints: BTreeMap<Resource, String>,
    /// Static headers merged into every request.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub authentication: AuthScheme,
    /// Request timeout in milliseconds (dispatch default applies when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Transport-failure retry attempts beyond the first try.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_check: Option<HealthCheckPolicy>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BackendProfile {
    /// The seeded profile used whenever storage is empty or unreadable.
    pub fn seeded_local() -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: "Local".to_string(),
            base_url: local_base_url(),
            is_active: true,
            is_default: true,
            endpoints: BTreeMap::new(),
            headers: HashMap::new(),
            authentication: AuthScheme::Bearer,
            timeout: None,
            retries: None,
            health_check: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Candidate profile prior to admission: everything a caller may supply,
/// without the store-assigned id and timestamps.
///
/// Unknown fields are ignored so full exported records import cleanly.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDraft {
    pub name: String,
    pub base_url: String,
    #[serde(default = "default_draft_active")]
    pub is_active: bool,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub endpoints: BTreeMap<Resource, String>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub authentication: AuthScheme,
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub retries: Option<u32>,
    #[serde(default)]
    pub health_check: Option<HealthCheckPolicy>,
}

impl ProfileDraft {
    /// Minimal draft with the given label and base URL.
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            is_active: true,
            is_default: false,
            endpoints: BTreeMap::new(),
            headers: HashMap::new(),
            authentication: AuthScheme::None,
            timeout: None,
            retries: None,
            health_check: None,
        }
    }
}

/// Partial update applied by `ProfileStore::update`. Unset fields keep
/// their current values; `id`, `created_at` and `updated_at` are managed
/// by the store and cannot be patched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub base_url: Option<String>,
    pub is_active: Option<bool>,
    pub is_default: Option<bool>,
    pub endpoints: Option<BTreeMap<Resource, String>>,
    pub headers: Option<HashMap<String, String>>,
    pub authentication: Option<AuthScheme>,
    pub timeout: Option<u64>,
    pub retries: Option<u32>,
    pub health_check: Option<HealthCheckPolicy>,
}

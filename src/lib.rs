//! Multi-backend API client for the Souq marketplace platform.
//!
//! The crate is built from three pieces:
//!
//! - [`profile`]: named backend profiles (base URL, per-resource endpoint
//!   overrides, auth scheme, timing policy) persisted as JSON documents,
//!   with one profile selected as active.
//! - [`client::resolve`]: logical resource paths resolved against the
//!   active profile into concrete URLs and headers.
//! - [`client`]: the dispatcher: bounded-wait JSON requests with typed
//!   failure classification, plus a per-profile health probe.
//!
//! Everything is an explicit handle; construct a [`ProfileStore`], a
//! [`TokenStore`] and an [`ApiClient`] and pass them where needed.

pub mod client;
pub mod profile;
pub mod telemetry;
pub mod token;

pub use client::{ApiClient, ApiError, ClientOptions, ProbeReport, RequestOptions};
pub use profile::{
    AuthScheme, BackendProfile, HealthCheckPolicy, ImportReport, ProfileDraft, ProfilePatch,
    ProfileStorage, ProfileStore, Resource, StoreError,
};
pub use token::{SecureString, TokenStore};

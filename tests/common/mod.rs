//! Shared test utilities and mock infrastructure.

#![allow(dead_code)]

pub mod mock_backend;

use std::net::TcpListener;

use souq_client::{
    ApiClient, ClientOptions, ProfileDraft, ProfileStorage, ProfileStore, TokenStore,
};
use tempfile::TempDir;

/// Find an available port for testing (nothing stays bound to it, so
/// connecting later is refused).
pub fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind to free port");
    listener.local_addr().unwrap().port()
}

/// Open a store backed by a fresh temp directory.
pub fn temp_store() -> (TempDir, ProfileStore) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = ProfileStore::open(ProfileStorage::new(dir.path()));
    (dir, store)
}

/// Build a client whose active profile points at `base_url`.
///
/// The closure customizes the draft before it is added and activated.
pub fn client_for(
    base_url: &str,
    configure: impl FnOnce(&mut ProfileDraft),
) -> (TempDir, ApiClient) {
    let (dir, store) = temp_store();
    let mut draft = ProfileDraft::new("Test", base_url);
    configure(&mut draft);
    let id = store.add(draft).expect("Failed to add test profile");
    assert!(store.set_active(&id).expect("Failed to persist selection"));

    let client = ApiClient::new(store, TokenStore::new(), ClientOptions::default());
    (dir, client)
}

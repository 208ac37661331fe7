//! Bearer token storage shared between the client and its callers.
//!
//! The token is resolved on demand at request-assembly time and never
//! cached inside the dispatcher, so replacing it takes effect on the
//! next request.

use std::sync::{Arc, RwLock};

/// Wrapper for sensitive strings that prevents accidental logging.
///
/// The inner value is never exposed via Debug or Display traits.
/// Use `expose()` to access the actual value when needed for API calls.
#[derive(Clone)]
pub struct SecureString(String);

impl SecureString {
    /// Create a new secure string.
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Expose the inner value.
    ///
    /// Use sparingly and only when actually sending to APIs.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecureString(••••••••)")
    }
}

impl std::fmt::Display for SecureString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "••••••••")
    }
}

/// Shared handle to the session's bearer token.
///
/// Cloning is cheap; all clones observe the same token. Empty tokens
/// are treated as absent.
#[derive(Clone, Default)]
pub struct TokenStore {
    inner: Arc<RwLock<Option<SecureString>>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current token, if one is set.
    pub fn get(&self) -> Option<SecureString> {
        self.inner.read().expect("token lock poisoned").clone()
    }

    /// Replace the stored token. An empty string clears it.
    pub fn set(&self, token: impl Into<String>) {
        let token = token.into();
        let mut guard = self.inner.write().expect("token lock poisoned");
        *guard = if token.is_empty() {
            None
        } else {
            Some(SecureString::new(token))
        };
    }

    /// Forget the stored token.
    pub fn clear(&self) {
        *self.inner.write().expect("token lock poisoned") = None;
    }
}

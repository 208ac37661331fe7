//! Authentication header building for API requests.
//!
//! Builds the appropriate authentication header based on the profile's
//! scheme and the shared token store. Credentials are resolved at call
//! time, never cached.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::profile::types::AuthScheme;
use crate::token::TokenStore;

/// Header name and value for authentication.
pub type AuthHeader = (String, String);

/// Build the authentication header for a scheme.
///
/// Returns `Some((header_name, header_value))` when the scheme yields a
/// header, or `None` for `none` auth and for `bearer` with no stored
/// token. At most one header is ever produced.
pub fn build_auth_header(scheme: &AuthScheme, tokens: &TokenStore) -> Option<AuthHeader> {
    match scheme {
        AuthScheme::None => None,
        AuthScheme::Bearer => tokens.get().map(|token| {
            (
                "Authorization".to_string(),
                format!("Bearer {}", token.expose()),
            )
        }),
        AuthScheme::ApiKey { header, value } => Some((header.clone(), value.clone())),
        AuthScheme::Basic { username, password } => {
            let encoded = STANDARD.encode(format!("{username}:{password}"));
            Some(("Authorization".to_string(), format!("Basic {encoded}")))
        }
    }
}

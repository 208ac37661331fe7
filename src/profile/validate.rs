//! Draft validation.
//!
//! One typed validation pass shared by `add` and `import_all`, replacing
//! per-call-site shape checks. A draft either passes whole or yields the
//! full list of field errors.

use crate::profile::types::{AuthScheme, ProfileDraft};

/// A single rejected field with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Join field errors for single-line error messages.
pub(crate) fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(FieldError::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validate a candidate profile before admission.
///
/// Collects every violation rather than stopping at the first, so
/// callers can surface the complete picture.
pub fn validate(draft: &ProfileDraft) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    if draft.name.trim().is_empty() {
        errors.push(FieldError {
            field: "name",
            message: "must not be empty".to_string(),
        });
    }

    if draft.base_url.trim().is_empty() {
        errors.push(FieldError {
            field: "baseUrl",
            message: "must not be empty".to_string(),
        });
    } else if draft.base_url.chars().any(char::is_whitespace) {
        errors.push(FieldError {
            field: "baseUrl",
            message: "must not contain whitespace".to_string(),
        });
    }

    for (resource, path) in &draft.endpoints {
        if !path.starts_with('/') {
            errors.push(FieldError {
                field: "endpoints",
                message: format!(
                    "override for {} must start with '/', got '{}'",
                    resource.default_prefix(),
                    path
                ),
            });
        }
    }

    match &draft.authentication {
        AuthScheme::ApiKey { header, value } => {
            if header.trim().is_empty() {
                errors.push(FieldError {
                    field: "authentication.header",
                    message: "must not be empty for apikey auth".to_string(),
                });
            }
            if value.is_empty() {
                errors.push(FieldError {
                    field: "authentication.value",
                    message: "must not be empty for apikey auth".to_string(),
                });
            }
        }
        AuthScheme::Basic { username, .. } => {
            if username.is_empty() {
                errors.push(FieldError {
                    field: "authentication.username",
                    message: "must not be empty for basic auth".to_string(),
                });
            }
        }
        AuthScheme::None | AuthScheme::Bearer => {}
    }

    if let Some(hc) = &draft.health_check {
        if !hc.path.starts_with('/') {
            errors.push(FieldError {
                field: "healthCheck.path",
                message: "must start with '/'".to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::types::{HealthCheckPolicy, Resource};

    #[test]
    fn test_minimal_draft_is_valid() {
        let draft = ProfileDraft::new("Prod", "https://api.example.com");
        assert!(validate(&draft).is_ok());
    }

    #[test]
    fn test_empty_name_and_base_url_collect_both() {
        let draft = ProfileDraft::new("  ", "");
        let errors = validate(&draft).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "name");
        assert_eq!(errors[1].field, "baseUrl");
    }

    #[test]
    fn test_base_url_whitespace_rejected() {
        let draft = ProfileDraft::new("Prod", "https://api example.com");
        let errors = validate(&draft).unwrap_err();
        assert_eq!(errors[0].field, "baseUrl");
    }

    #[test]
    fn test_endpoint_override_must_be_rooted() {
        let mut draft = ProfileDraft::new("Prod", "https://api.example.com");
        draft
            .endpoints
            .insert(Resource::Stores, "shops".to_string());
        let errors = validate(&draft).unwrap_err();
        assert_eq!(errors[0].field, "endpoints");
    }

    #[test]
    fn test_apikey_requires_header_and_value() {
        let mut draft = ProfileDraft::new("Prod", "https://api.example.com");
        draft.authentication = AuthScheme::ApiKey {
            header: "".to_string(),
            value: "".to_string(),
        };
        let errors = validate(&draft).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_basic_requires_username() {
        let mut draft = ProfileDraft::new("Prod", "https://api.example.com");
        draft.authentication = AuthScheme::Basic {
            username: "".to_string(),
            password: "secret".to_string(),
        };
        assert!(validate(&draft).is_err());
    }

    #[test]
    fn test_health_path_must_be_rooted() {
        let mut draft = ProfileDraft::new("Prod", "https://api.example.com");
        draft.health_check = Some(HealthCheckPolicy {
            path: "health".to_string(),
            timeout: 1_000,
        });
        assert!(validate(&draft).is_err());
    }

    #[test]
    fn test_describe_joins_errors() {
        let errors = vec![
            FieldError {
                field: "name",
                message: "must not be empty".to_string(),
            },
            FieldError {
                field: "baseUrl",
                message: "must not be empty".to_string(),
            },
        ];
        assert_eq!(
            describe(&errors),
            "name: must not be empty; baseUrl: must not be empty"
        );
    }
}

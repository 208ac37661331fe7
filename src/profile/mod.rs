//! Backend profiles: schema, validation, persistence and the CRUD store.

pub mod auth;
pub mod storage;
pub mod store;
pub mod types;
pub mod validate;

pub use auth::{build_auth_header, AuthHeader};
pub use storage::{ProfileStorage, StorageError};
pub use store::{ImportReport, ProfileStore, StoreError};
pub use types::{
    local_base_url, AuthScheme, BackendProfile, HealthCheckPolicy, ProfileDraft, ProfilePatch,
    Resource, LOCAL_BASE_URL_ENV,
};
pub use validate::{validate, FieldError};

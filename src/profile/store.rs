//! Durable CRUD over the backend profile collection.
//!
//! A cloneable handle with interior mutability: many concurrent readers,
//! exclusive writers. State is loaded once at open and every mutation is
//! persisted before it becomes visible, so a failed write leaves both
//! memory and disk on the prior state.

use std::sync::{Arc, RwLock};

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use crate::profile::storage::{ProfileStorage, StorageError};
use crate::profile::types::{BackendProfile, ProfileDraft, ProfilePatch};
use crate::profile::validate::{describe, validate, FieldError};

/// Errors surfaced by mutating store operations.
///
/// Reads never fail: unreadable storage degrades to the seeded default
/// collection, and lookups by unknown id return `None`/`Ok(false)`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Profile validation failed: {}", describe(.0))]
    Validation(Vec<FieldError>),

    #[error("Malformed import payload: {0}")]
    MalformedImport(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Outcome of an `import_all` batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub accepted: usize,
    pub rejected: usize,
}

struct Inner {
    profiles: Vec<BackendProfile>,
    active_id: Option<String>,
}

/// Thread-safe handle to the profile collection and active selector.
#[derive(Clone)]
pub struct ProfileStore {
    inner: Arc<RwLock<Inner>>,
    storage: Arc<ProfileStorage>,
}

impl ProfileStore {
    /// Open the store, loading persisted state.
    ///
    /// Never fails: a missing collection is seeded with the local
    /// default, and an unreadable one degrades to the same seed (the
    /// broken document is left in place and logged).
    pub fn open(storage: ProfileStorage) -> Self {
        let profiles = match storage.load_profiles() {
            Ok(Some(profiles)) if !profiles.is_empty() => normalize_defaults(profiles),
            Ok(Some(_)) | Ok(None) => vec![BackendProfile::seeded_local()],
            Err(e) => {
                tracing::warn!(error = %e, "Profile storage unreadable, using seeded defaults");
                vec![BackendProfile::seeded_local()]
            }
        };

        let active_id = storage
            .load_active()
            .filter(|id| profiles.iter().any(|p| p.id == *id));

        Self {
            inner: Arc::new(RwLock::new(Inner {
                profiles,
                active_id,
            })),
            storage: Arc::new(storage),
        }
    }

    /// The full collection, in storage order.
    pub fn list_all(&self) -> Vec<BackendProfile> {
        self.read().profiles.clone()
    }

    /// Look up one profile by id.
    pub fn get(&self, id: &str) -> Option<BackendProfile> {
        self.read().profiles.iter().find(|p| p.id == id).cloned()
    }

    /// The profile requests should go to.
    ///
    /// Resolution order: stored active id (must still be selectable) →
    /// first `is_active` profile → the default profile → first element →
    /// none.
    pub fn get_active(&self) -> Option<BackendProfile> {
        let inner = self.read();
        if let Some(id) = &inner.active_id {
            if let Some(profile) = inner
                .profiles
                .iter()
                .find(|p| p.id == *id && p.is_active)
            {
                return Some(profile.clone());
            }
        }
        inner
            .profiles
            .iter()
            .find(|p| p.is_active)
            .or_else(|| inner.profiles.iter().find(|p| p.is_default))
            .or_else(|| inner.profiles.first())
            .cloned()
    }

    /// Select the profile requests should go to.
    ///
    /// `Ok(false)` (no mutation) unless `id` names a profile with
    /// `is_active = true`.
    pub fn set_active(&self, id: &str) -> Result<bool, StoreError> {
        let mut inner = self.write();
        if !inner.profiles.iter().any(|p| p.id == id && p.is_active) {
            return Ok(false);
        }
        self.storage.save_active(Some(id))?;
        inner.active_id = Some(id.to_string());
        tracing::info!(profile = %id, "Active profile switched");
        Ok(true)
    }

    /// Validate and append a new profile; returns its assigned id.
    ///
    /// A draft with `is_default` set clears the flag on every existing
    /// profile within the same write.
    pub fn add(&self, draft: ProfileDraft) -> Result<String, StoreError> {
        validate(&draft).map_err(StoreError::Validation)?;

        let mut inner = self.write();
        let profile = materialize(draft);
        let id = profile.id.clone();

        let mut next = inner.profiles.clone();
        if profile.is_default {
            clear_defaults(&mut next);
        }
        next.push(profile);

        self.storage.save_profiles(&next)?;
        inner.profiles = next;
        Ok(id)
    }

    /// Shallow-merge `patch` into the profile named by `id`.
    ///
    /// `Ok(false)` if the id is unknown. The id itself is immutable and
    /// `updated_at` is refreshed. Default exclusivity is enforced in the
    /// same write: setting the flag clears it elsewhere, and clearing the
    /// last holder promotes the first profile so exactly one remains.
    pub fn update(&self, id: &str, patch: ProfilePatch) -> Result<bool, StoreError> {
        let mut inner = self.write();
        let Some(idx) = inner.profiles.iter().position(|p| p.id == id) else {
            return Ok(false);
        };

        let mut next = inner.profiles.clone();
        apply_patch(&mut next[idx], patch);
        next[idx].updated_at = Utc::now();

        if next[idx].is_default {
            let keep = next[idx].id.clone();
            for profile in next.iter_mut().filter(|p| p.id != keep) {
                profile.is_default = false;
            }
        } else if !next.iter().any(|p| p.is_default) {
            next[0].is_default = true;
        }

        self.storage.save_profiles(&next)?;
        inner.profiles = next;
        Ok(true)
    }

    /// Remove the profile named by `id`.
    ///
    /// `Ok(false)` if the id is unknown, and `Ok(false)` (refusal) when
    /// the target is the default and the only profile left. When the
    /// default is removed the new first element is promoted; when the
    /// active selection is removed the selector is cleared.
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut inner = self.write();
        let Some(idx) = inner.profiles.iter().position(|p| p.id == id) else {
            return Ok(false);
        };

        if inner.profiles[idx].is_default && inner.profiles.len() == 1 {
            tracing::warn!(profile = %id, "Refusing to delete the last default profile");
            return Ok(false);
        }

        let mut next = inner.profiles.clone();
        let removed = next.remove(idx);
        if removed.is_default {
            next[0].is_default = true;
        }

        let clears_active = inner.active_id.as_deref() == Some(id);

        self.storage.save_profiles(&next)?;
        if clears_active {
            self.storage.save_active(None)?;
            inner.active_id = None;
        }
        inner.profiles = next;
        Ok(true)
    }

    /// Replace the collection with the single seeded profile and clear
    /// the active selector.
    pub fn reset_to_defaults(&self) -> Result<(), StoreError> {
        let mut inner = self.write();
        let next = vec![BackendProfile::seeded_local()];
        self.storage.save_profiles(&next)?;
        self.storage.save_active(None)?;
        inner.profiles = next;
        inner.active_id = None;
        Ok(())
    }

    /// The collection as a pretty-printed JSON array.
    pub fn export_all(&self) -> Result<String, StoreError> {
        let inner = self.read();
        serde_json::to_string_pretty(&inner.profiles)
            .map_err(|e| StoreError::Storage(StorageError::Serialize(e)))
    }

    /// Import a batch of profile records.
    ///
    /// The payload must be a JSON array or the whole batch is rejected.
    /// Each element is validated independently; qualifying records get a
    /// fresh id and timestamps and are appended with the same
    /// default-exclusivity side effect as [`add`](Self::add). Malformed
    /// records only bump the rejected count.
    pub fn import_all(&self, payload: &str) -> Result<ImportReport, StoreError> {
        let value: serde_json::Value = serde_json::from_str(payload)
            .map_err(|e| StoreError::MalformedImport(e.to_string()))?;
        let Some(items) = value.as_array() else {
            return Err(StoreError::MalformedImport(
                "expected a JSON array of profiles".to_string(),
            ));
        };

        let mut inner = self.write();
        let mut next = inner.profiles.clone();
        let mut report = ImportReport {
            accepted: 0,
            rejected: 0,
        };

        for item in items {
            let draft = match serde_json::from_value::<ProfileDraft>(item.clone()) {
                Ok(draft) => draft,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed import record");
                    report.rejected += 1;
                    continue;
                }
            };
            if let Err(errors) = validate(&draft) {
                tracing::warn!(errors = %describe(&errors), "Skipping invalid import record");
                report.rejected += 1;
                continue;
            }

            let profile = materialize(draft);
            if profile.is_default {
                clear_defaults(&mut next);
            }
            next.push(profile);
            report.accepted += 1;
        }

        if report.accepted > 0 {
            self.storage.save_profiles(&next)?;
            inner.profiles = next;
        }
        Ok(report)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().expect("profile store lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().expect("profile store lock poisoned")
    }
}

/// Assign identity and timestamps to an admitted draft.
fn materialize(draft: ProfileDraft) -> BackendProfile {
    let now = Utc::now();
    BackendProfile {
        id: uuid::Uuid::new_v4().to_string(),
        name: draft.name,
        base_url: draft.base_url,
        is_active: draft.is_active,
        is_default: draft.is_default,
        endpoints: draft.endpoints,
        headers: draft.headers,
        authentication: draft.authentication,
        timeout: draft.timeout,
        retries: draft.retries,
        health_check: draft.health_check,
        created_at: now,
        updated_at: now,
    }
}

fn clear_defaults(profiles: &mut [BackendProfile]) {
    for profile in profiles.iter_mut() {
        profile.is_default = false;
    }
}

/// Repair a loaded collection so exactly one profile holds the default
/// flag: the first holder wins, and a collection with none promotes its
/// first element.
fn normalize_defaults(mut profiles: Vec<BackendProfile>) -> Vec<BackendProfile> {
    let mut seen = false;
    for profile in profiles.iter_mut() {
        if profile.is_default {
            if seen {
                profile.is_default = false;
            }
            seen = true;
        }
    }
    if !seen {
        tracing::warn!("Loaded collection has no default profile, promoting the first");
        profiles[0].is_default = true;
    }
    profiles
}

fn apply_patch(profile: &mut BackendProfile, patch: ProfilePatch) {
    if let Some(name) = patch.name {
        profile.name = name;
    }
    if let Some(base_url) = patch.base_url {
        profile.base_url = base_url;
    }
    if let Some(is_active) = patch.is_active {
        profile.is_active = is_active;
    }
    if let Some(is_default) = patch.is_default {
        profile.is_default = is_default;
    }
    if let Some(endpoints) = patch.endpoints {
        profile.endpoints = endpoints;
    }
    if let Some(headers) = patch.headers {
        profile.headers = headers;
    }
    if let Some(authentication) = patch.authentication {
        profile.authentication = authentication;
    }
    if let Some(timeout) = patch.timeout {
        profile.timeout = Some(timeout);
    }
    if let Some(retries) = patch.retries {
        profile.retries = Some(retries);
    }
    if let Some(health_check) = patch.health_check {
        profile.health_check = Some(health_check);
    }
}

//! On-disk persistence for the profile collection and active selector.
//!
//! Two documents live in the storage directory: `profiles.json`, the
//! ordered collection as a UTF-8 JSON array, and `active`, a plain file
//! holding the selected profile id (absent when none is selected).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::profile::types::BackendProfile;

const PROFILES_FILE: &str = "profiles.json";
const ACTIVE_FILE: &str = "active";

/// Errors from reading or writing the persisted documents.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize profile collection: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// File-backed document store for one profile collection.
#[derive(Debug, Clone)]
pub struct ProfileStorage {
    dir: PathBuf,
}

impl ProfileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Platform default: `<config dir>/souq`.
    ///
    /// Falls back to the current directory when the platform config
    /// directory is unavailable.
    pub fn default_dir() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("souq")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn profiles_path(&self) -> PathBuf {
        self.dir.join(PROFILES_FILE)
    }

    fn active_path(&self) -> PathBuf {
        self.dir.join(ACTIVE_FILE)
    }

    /// Load the profile collection.
    ///
    /// `Ok(None)` means the document does not exist yet (first run);
    /// errors mean it exists but could not be read or parsed. The store
    /// degrades both cases to the seeded default.
    pub fn load_profiles(&self) -> Result<Option<Vec<BackendProfile>>, StorageError> {
        let path = self.profiles_path();
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| StorageError::Read {
            path: path.clone(),
            source: e,
        })?;

        let profiles =
            serde_json::from_str(&content).map_err(|e| StorageError::Parse { path, source: e })?;
        Ok(Some(profiles))
    }

    /// Load the active-id selector. Missing or unreadable means unset.
    pub fn load_active(&self) -> Option<String> {
        let id = fs::read_to_string(self.active_path()).ok()?;
        let id = id.trim();
        if id.is_empty() {
            None
        } else {
            Some(id.to_string())
        }
    }

    /// Persist the full profile collection in one write.
    pub fn save_profiles(&self, profiles: &[BackendProfile]) -> Result<(), StorageError> {
        self.ensure_dir()?;
        let path = self.profiles_path();
        let json = serde_json::to_string_pretty(profiles)?;
        fs::write(&path, json).map_err(|e| StorageError::Write { path, source: e })
    }

    /// Persist the active-id selector; `None` removes the document.
    pub fn save_active(&self, id: Option<&str>) -> Result<(), StorageError> {
        self.ensure_dir()?;
        let path = self.active_path();
        match id {
            Some(id) => fs::write(&path, id).map_err(|e| StorageError::Write { path, source: e }),
            None => match fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(StorageError::Write { path, source: e }),
            },
        }
    }

    fn ensure_dir(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|e| StorageError::Write {
            path: self.dir.clone(),
            source: e,
        })
    }
}

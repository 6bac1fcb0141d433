//! Durable credential entries
//!
//! Cookie-like named values with expiry timestamps, kept in a JSON file in
//! the data directory so a login survives process restarts. Expired entries
//! read as absent and are dropped on the next write.
//!
//! Writes go to a temporary file first and are renamed into place.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Entry holding the access token
pub const ACCESS_TOKEN: &str = "accessToken";
/// Entry holding the refresh token
pub const REFRESH_TOKEN: &str = "refreshToken";
/// Entry holding the user id
pub const USER_ID: &str = "userId";
/// Entry holding the role name
pub const ROLE_NAME: &str = "roleName";

/// Every entry written by a login
pub const ALL_ENTRIES: [&str; 4] = [ACCESS_TOKEN, REFRESH_TOKEN, USER_ID, ROLE_NAME];

/// Errors reading or writing the credential file
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Failed to read credentials from '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write credentials to '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Credential file '{path}' is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// File-backed store of named credential entries
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    entries: BTreeMap<String, Entry>,
}

impl CredentialStore {
    /// Open the store at `path`, loading existing entries
    ///
    /// A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CredentialError> {
        let path = path.into();
        let entries = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| CredentialError::Read {
                path: path.clone(),
                source,
            })?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|source| CredentialError::Parse {
                    path: path.clone(),
                    source,
                })?
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, entries })
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read an entry that has not expired
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_at(name, Utc::now())
    }

    /// Read an entry as of `now`
    pub fn get_at(&self, name: &str, now: DateTime<Utc>) -> Option<&str> {
        self.entries
            .get(name)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value.as_str())
    }

    /// Whether a live, non-empty entry exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.is_empty())
    }

    /// Expiry time of an entry, if present
    pub fn expires_at(&self, name: &str) -> Option<DateTime<Utc>> {
        self.entries.get(name).map(|entry| entry.expires_at)
    }

    /// Set an entry that lives for `ttl` from now
    pub fn set(&mut self, name: &str, value: &str, ttl: Duration) -> Result<(), CredentialError> {
        self.insert(name, value, Utc::now() + ttl);
        self.flush()
    }

    /// Set several entries with a single write
    pub fn set_many(&mut self, entries: &[(&str, &str, Duration)]) -> Result<(), CredentialError> {
        let now = Utc::now();
        for (name, value, ttl) in entries {
            self.insert(name, value, now + *ttl);
        }
        self.flush()
    }

    fn insert(&mut self, name: &str, value: &str, expires_at: DateTime<Utc>) {
        self.entries.insert(
            name.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
    }

    /// Remove an entry
    pub fn remove(&mut self, name: &str) -> Result<(), CredentialError> {
        if self.entries.remove(name).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    /// Remove every entry
    pub fn clear(&mut self) -> Result<(), CredentialError> {
        self.entries.clear();
        self.flush()
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        let now = Utc::now();
        self.entries.values().filter(|e| e.expires_at > now).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Persist live entries
    fn flush(&mut self) -> Result<(), CredentialError> {
        let now = Utc::now();
        self.entries.retain(|_, entry| entry.expires_at > now);

        let json = serde_json::to_vec_pretty(&self.entries).map_err(|e| {
            CredentialError::Write {
                path: self.path.clone(),
                source: io::Error::other(e),
            }
        })?;
        atomic_write(&self.path, &json).map_err(|source| CredentialError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// Write to a temp file in the same directory, sync, then rename over `path`
fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    fs::rename(&temp_path, path)
}

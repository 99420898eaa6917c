//! Save/load persistence with backup recovery
//!
//! Features:
//! - Versioned JSON envelope
//! - Atomic writes (tmp → save, old save → backup)
//! - Corruption detection and recovery from the backup

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Envelope format version written by this build
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed save {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported save version {found} in {path} (expected {})", SAVE_VERSION)]
    Version { path: PathBuf, found: u32 },
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    payload: &'a T,
}

#[derive(Deserialize)]
struct Envelope<T> {
    version: u32,
    payload: T,
}

/// A directory of keyed JSON saves
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, key: &str, ext: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(Error::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.{ext}")))
    }

    /// Write `value` under `key`, keeping the previous save as a backup
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let primary = self.path(key, "json")?;
        let tmp = self.path(key, "tmp")?;
        let backup = self.path(key, "bak")?;

        fs::create_dir_all(&self.root).map_err(|source| Error::Io {
            path: self.root.clone(),
            source,
        })?;

        let envelope = EnvelopeRef {
            version: SAVE_VERSION,
            payload: value,
        };
        let json = serde_json::to_vec_pretty(&envelope).map_err(|source| Error::Json {
            path: tmp.clone(),
            source,
        })?;
        fs::write(&tmp, json).map_err(|source| Error::Io {
            path: tmp.clone(),
            source,
        })?;

        if primary.exists() {
            fs::rename(&primary, &backup).map_err(|source| Error::Io {
                path: backup.clone(),
                source,
            })?;
        }
        fs::rename(&tmp, &primary).map_err(|source| Error::Io {
            path: primary.clone(),
            source,
        })?;

        log::debug!("Saved {}", primary.display());
        Ok(())
    }

    /// Read the save under `key`
    ///
    /// Falls back to the backup when the primary file is missing or corrupt.
    /// Returns `Ok(None)` when neither exists.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let primary = self.path(key, "json")?;
        let backup = self.path(key, "bak")?;

        match read_envelope(&primary) {
            Ok(Some(value)) => return Ok(Some(value)),
            Ok(None) => {}
            Err(err) => {
                if !backup.exists() {
                    return Err(err);
                }
                log::warn!("{err}; trying backup");
            }
        }

        let value = read_envelope(&backup)?;
        if value.is_some() {
            log::info!("Recovered {} from backup", key);
        }
        Ok(value)
    }

    /// Delete the save and its backup
    pub fn remove(&self, key: &str) -> Result<()> {
        for path in [self.path(key, "json")?, self.path(key, "bak")?] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(source) => return Err(Error::Io { path, source }),
            }
        }
        Ok(())
    }
}

fn read_envelope<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(Error::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let envelope: Envelope<serde_json::Value> =
        serde_json::from_slice(&bytes).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;
    if envelope.version != SAVE_VERSION {
        return Err(Error::Version {
            path: path.to_path_buf(),
            found: envelope.version,
        });
    }

    serde_json::from_value(envelope.payload)
        .map(Some)
        .map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })
}

//! Single-slot message cache bridging a preview run and a later commit run.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::CacheError;

/// SHA-256 of the raw staged diff, hex encoded.
pub fn fingerprint(diff: &str) -> String {
    format!("{:x}", Sha256::digest(diff.as_bytes()))
}

/// The persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedMessage {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl CachedMessage {
    /// A bare message with no staleness information.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            diff_fingerprint: None,
            saved_at: None,
        }
    }

    /// A message tied to the diff it was generated from.
    pub fn for_diff(message: impl Into<String>, raw_diff: &str) -> Self {
        Self {
            message: message.into(),
            diff_fingerprint: Some(fingerprint(raw_diff)),
            saved_at: Some(Utc::now()),
        }
    }

    /// `Some(false)` when the entry was generated from a different diff,
    /// `None` when the entry carries no fingerprint.
    pub fn matches_diff(&self, raw_diff: &str) -> Option<bool> {
        self.diff_fingerprint
            .as_deref()
            .map(|fp| fp == fingerprint(raw_diff))
    }
}

/// JSON file holding at most one [`CachedMessage`].
///
/// Writes go to a temp file in the same directory and are renamed over the
/// target, so a reader never sees a half-written file. There is no locking.
#[derive(Debug, Clone)]
pub struct MessageCache {
    path: PathBuf,
}

impl MessageCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist `entry`, replacing any previous one.
    pub fn save(&self, entry: &CachedMessage) -> Result<(), CacheError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let json = serde_json::to_string_pretty(entry)
            .map_err(|e| CacheError::WriteFailed(io::Error::other(e)))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(CacheError::WriteFailed)?;
        tmp.write_all(json.as_bytes())
            .map_err(CacheError::WriteFailed)?;
        tmp.persist(&self.path)
            .map_err(|e| CacheError::WriteFailed(e.error))?;

        debug!(path = %self.path.display(), "Cached commit message");
        Ok(())
    }

    /// Read the cached entry. A missing file is `Ok(None)`.
    pub fn load(&self) -> Result<Option<CachedMessage>, CacheError> {
        // Invalid UTF-8 surfaces as a parse error below, i.e. as Corrupt.
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::ReadFailed(e)),
        };

        let entry: CachedMessage =
            serde_json::from_slice(&bytes).map_err(|e| CacheError::Corrupt(e.to_string()))?;

        if entry.message.trim().is_empty() {
            return Err(CacheError::Corrupt("cached message is empty".to_string()));
        }

        debug!(path = %self.path.display(), "Loaded cached commit message");
        Ok(Some(entry))
    }

    /// Remove the cache file. Succeeds if it is already gone.
    pub fn clear(&self) -> Result<(), CacheError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::WriteFailed(e)),
        }
    }
}

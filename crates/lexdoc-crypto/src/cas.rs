//! # Content-Addressed Document Storage
//!
//! Version rows never hold document bytes. They hold a [`ContentLocator`]
//! returned by a [`ContentStore`]. Both stores here name blobs by the
//! SHA-256 of their content, so identical content written twice lands on
//! the same locator, and a read whose bytes no longer hash to the locator
//! fails with [`StoreError::Integrity`].
//!
//! Filesystem layout: `{root}/{hex[0..2]}/{hex}`.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lexdoc_core::{sha256_content, ContentDigest};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Opaque reference to stored content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentLocator(String);

impl ContentLocator {
    /// Locator for content with the given digest.
    pub fn from_digest(digest: &ContentDigest) -> Self {
        Self(digest.to_string())
    }

    /// The digest this locator names.
    pub fn digest(&self) -> Result<ContentDigest, StoreError> {
        ContentDigest::parse(&self.0).map_err(|_| StoreError::InvalidLocator(self.0.clone()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors from content storage.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("content not found: {0}")]
    NotFound(ContentLocator),

    #[error("invalid content locator: {0}")]
    InvalidLocator(String),

    #[error("content integrity failure for {locator}: stored bytes hash to {actual}")]
    Integrity {
        locator: ContentLocator,
        actual: ContentDigest,
    },

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Blob storage for document version content.
pub trait ContentStore: Send + Sync {
    /// Store content and return its locator. Idempotent for equal content.
    fn put(&self, content: &[u8]) -> Result<ContentLocator, StoreError>;

    /// Read content back, verifying it against the locator's digest.
    fn get(&self, locator: &ContentLocator) -> Result<Vec<u8>, StoreError>;

    /// Delete content. Returns `false` if nothing was stored there.
    fn remove(&self, locator: &ContentLocator) -> Result<bool, StoreError>;

    fn contains(&self, locator: &ContentLocator) -> bool;
}

fn check_integrity(locator: &ContentLocator, bytes: &[u8]) -> Result<(), StoreError> {
    let expected = locator.digest()?;
    let actual = sha256_content(bytes);
    if actual != expected {
        return Err(StoreError::Integrity {
            locator: locator.clone(),
            actual,
        });
    }
    Ok(())
}

/// In-memory store. Used by tests and by the service when no content
/// directory is configured.
#[derive(Debug, Clone, Default)]
pub struct MemoryContentStore {
    blobs: Arc<RwLock<HashMap<ContentLocator, Vec<u8>>>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }

    /// Overwrite stored bytes without updating the locator. Test hook for
    /// simulating storage corruption.
    pub fn corrupt(&self, locator: &ContentLocator, bytes: Vec<u8>) {
        self.blobs.write().insert(locator.clone(), bytes);
    }
}

impl ContentStore for MemoryContentStore {
    fn put(&self, content: &[u8]) -> Result<ContentLocator, StoreError> {
        let locator = ContentLocator::from_digest(&sha256_content(content));
        self.blobs
            .write()
            .entry(locator.clone())
            .or_insert_with(|| content.to_vec());
        Ok(locator)
    }

    fn get(&self, locator: &ContentLocator) -> Result<Vec<u8>, StoreError> {
        let bytes = self
            .blobs
            .read()
            .get(locator)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(locator.clone()))?;
        check_integrity(locator, &bytes)?;
        Ok(bytes)
    }

    fn remove(&self, locator: &ContentLocator) -> Result<bool, StoreError> {
        Ok(self.blobs.write().remove(locator).is_some())
    }

    fn contains(&self, locator: &ContentLocator) -> bool {
        self.blobs.read().contains_key(locator)
    }
}

/// Filesystem store rooted at a directory.
#[derive(Debug, Clone)]
pub struct FsContentStore {
    root: PathBuf,
}

impl FsContentStore {
    /// Open (and create if missing) a store at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path for a locator: `{root}/{hex[0..2]}/{hex}`.
    pub fn blob_path(&self, locator: &ContentLocator) -> Result<PathBuf, StoreError> {
        let hex = locator.digest()?.to_hex();
        Ok(self.root.join(&hex[..2]).join(hex))
    }
}

impl ContentStore for FsContentStore {
    fn put(&self, content: &[u8]) -> Result<ContentLocator, StoreError> {
        let locator = ContentLocator::from_digest(&sha256_content(content));
        let path = self.blob_path(&locator)?;
        if path.exists() {
            return Ok(locator);
        }
        let dir = path
            .parent()
            .ok_or_else(|| StoreError::InvalidLocator(locator.to_string()))?;
        std::fs::create_dir_all(dir)?;
        let tmp = dir.join(format!(".{}.tmp", temp_suffix()));
        write_atomically(&tmp, &path, content)?;
        tracing::debug!(locator = %locator, bytes = content.len(), "stored content blob");
        Ok(locator)
    }

    fn get(&self, locator: &ContentLocator) -> Result<Vec<u8>, StoreError> {
        let path = self.blob_path(locator)?;
        let bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(locator.clone()))
            }
            Err(e) => return Err(e.into()),
        };
        check_integrity(locator, &bytes)?;
        Ok(bytes)
    }

    fn remove(&self, locator: &ContentLocator) -> Result<bool, StoreError> {
        let path = self.blob_path(locator)?;
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(locator = %locator, "removed content blob");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn contains(&self, locator: &ContentLocator) -> bool {
        self.blob_path(locator).map(|p| p.exists()).unwrap_or(false)
    }
}

/// Write to `tmp`, then rename it onto `dest`. The temp file is removed
/// if either step fails.
fn write_atomically(tmp: &Path, dest: &Path, content: &[u8]) -> Result<(), StoreError> {
    let written = std::fs::File::create(tmp)
        .and_then(|mut f| {
            f.write_all(content)?;
            f.sync_all()
        })
        .and_then(|()| std::fs::rename(tmp, dest));
    if let Err(e) = written {
        if let Err(cleanup) = std::fs::remove_file(tmp) {
            if cleanup.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %tmp.display(), error = %cleanup, "failed to remove temp blob");
            }
        }
        return Err(e.into());
    }
    Ok(())
}

fn temp_suffix() -> String {
    use rand::RngCore;
    let mut buf = [0u8; 8];
    rand::rngs::OsRng.fill_bytes(&mut buf);
    crate::hex::encode(&buf)
}

//! Artifact store abstraction
//!
//! All four stages read and write through a uniform path-addressed store so
//! that a run works identically against a local directory or any hierarchical
//! blob backend. Paths are plain `/`-separated strings; an optional scheme
//! prefix (`file://`) selects the backend. Remote object stores are an
//! extension point behind the same trait, not built here.
//!
//! # Example
//!
//! ```
//! use promover::storage::{ArtifactStore, InMemoryStore};
//!
//! let store = InMemoryStore::new();
//! store.put("runs/run-1/metrics.json", b"{\"accuracy\":0.97}").unwrap();
//! assert!(store.exists("runs/run-1/metrics.json").unwrap());
//! ```

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("artifact not found: {0}")]
    NotFound(String),

    #[error("unsupported storage scheme: {0}")]
    UnsupportedScheme(String),
}

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// Path-addressed artifact storage
///
/// Writes must create missing parent directories; reads of absent paths
/// return [`StorageError::NotFound`]. Implementations do not version or
/// retain overwritten artifacts.
pub trait ArtifactStore: Send + Sync {
    /// Read the full artifact at `path`
    fn get(&self, path: &str) -> Result<Vec<u8>>;

    /// Write (or overwrite) the artifact at `path`
    fn put(&self, path: &str, data: &[u8]) -> Result<()>;

    /// Check whether an artifact exists at `path`
    fn exists(&self, path: &str) -> Result<bool>;

    /// Copy one artifact to another path within the store
    fn copy(&self, src: &str, dst: &str) -> Result<()> {
        let data = self.get(src)?;
        self.put(dst, &data)
    }
}

/// Join a directory prefix and a file name with a single `/`
pub fn join(dir: &str, name: &str) -> String {
    format!("{}/{}", dir.trim_end_matches('/'), name)
}

/// Strip a recognized scheme prefix from a storage URI
///
/// Bare paths and `file://` URIs resolve to the local filesystem; anything
/// else is rejected rather than guessed at.
pub fn local_path(uri: &str) -> Result<String> {
    if let Some(rest) = uri.strip_prefix("file://") {
        return Ok(rest.to_string());
    }
    if let Some((scheme, _)) = uri.split_once("://") {
        return Err(StorageError::UnsupportedScheme(scheme.to_string()));
    }
    Ok(uri.to_string())
}

/// SHA-256 digest of artifact bytes, hex-encoded
pub fn content_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Local filesystem store
///
/// Paths are interpreted relative to the process working directory unless
/// absolute.
#[derive(Debug, Default)]
pub struct LocalStore;

impl LocalStore {
    /// Create a new local store
    pub fn new() -> Self {
        Self
    }

    fn to_path(path: &str) -> PathBuf {
        Path::new(path).to_path_buf()
    }
}

impl ArtifactStore for LocalStore {
    fn get(&self, path: &str) -> Result<Vec<u8>> {
        let p = Self::to_path(path);
        if !p.exists() {
            return Err(StorageError::NotFound(path.to_string()));
        }
        Ok(std::fs::read(p)?)
    }

    fn put(&self, path: &str, data: &[u8]) -> Result<()> {
        let p = Self::to_path(path);
        if let Some(parent) = p.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = std::fs::File::create(&p)?;
        file.write_all(data)?;
        Ok(())
    }

    fn exists(&self, path: &str) -> Result<bool> {
        Ok(Self::to_path(path).exists())
    }
}

/// In-memory store, keyed by path string
///
/// Used by unit and property tests; also handy for dry runs.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored artifacts
    pub fn len(&self) -> usize {
        self.blobs.read().expect("store lock poisoned").len()
    }

    /// Whether the store holds no artifacts
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ArtifactStore for InMemoryStore {
    fn get(&self, path: &str) -> Result<Vec<u8>> {
        self.blobs
            .read()
            .expect("store lock poisoned")
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    fn put(&self, path: &str, data: &[u8]) -> Result<()> {
        self.blobs
            .write()
            .expect("store lock poisoned")
            .insert(path.to_string(), data.to_vec());
        Ok(())
    }

    fn exists(&self, path: &str) -> Result<bool> {
        Ok(self
            .blobs
            .read()
            .expect("store lock poisoned")
            .contains_key(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_roundtrip() {
        let store = InMemoryStore::new();
        store.put("runs/r1/train.csv", b"a,b\n1,2\n").unwrap();
        assert_eq!(store.get("runs/r1/train.csv").unwrap(), b"a,b\n1,2\n");
        assert!(store.exists("runs/r1/train.csv").unwrap());
        assert!(!store.exists("runs/r1/test.csv").unwrap());
    }

    #[test]
    fn test_in_memory_get_missing_is_not_found() {
        let store = InMemoryStore::new();
        match store.get("nope") {
            Err(StorageError::NotFound(p)) => assert_eq!(p, "nope"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_copy_overwrites_destination() {
        let store = InMemoryStore::new();
        store.put("a", b"new").unwrap();
        store.put("b", b"old").unwrap();
        store.copy("a", "b").unwrap();
        assert_eq!(store.get("b").unwrap(), b"new");
    }

    #[test]
    fn test_local_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new();
        let path = dir.path().join("nested/dir/model.json");
        let path = path.to_str().unwrap();
        store.put(path, b"{}").unwrap();
        assert_eq!(store.get(path).unwrap(), b"{}");
    }

    #[test]
    fn test_local_path_schemes() {
        assert_eq!(local_path("/data/penguins.csv").unwrap(), "/data/penguins.csv");
        assert_eq!(local_path("file:///data/x.csv").unwrap(), "/data/x.csv");
        match local_path("gs://bucket/key") {
            Err(StorageError::UnsupportedScheme(s)) => assert_eq!(s, "gs"),
            other => panic!("expected UnsupportedScheme, got {other:?}"),
        }
    }

    #[test]
    fn test_join_normalizes_trailing_slash() {
        assert_eq!(join("runs/r1/", "model.json"), "runs/r1/model.json");
        assert_eq!(join("runs/r1", "model.json"), "runs/r1/model.json");
    }

    #[test]
    fn test_content_digest_stable() {
        let d = content_digest(b"abc");
        assert_eq!(
            d,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}

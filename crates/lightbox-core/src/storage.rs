//! Byte storage behind image sources and saved sessions.
//!
//! The core never touches the filesystem directly; it goes through a
//! [`Storage`] so hosts without one (a browser) can supply bytes themselves.

use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

/// Load and persist raw bytes by path.
pub trait Storage: Send + Sync {
    /// Read the whole resource at `path`.
    fn read(&self, path: &str) -> io::Result<Vec<u8>>;

    /// Replace the resource at `path` with `bytes`.
    fn write(&self, path: &str, bytes: &[u8]) -> io::Result<()>;
}

/// Storage backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStorage;

impl Storage for FsStorage {
    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        std::fs::read(Path::new(path))
    }

    fn write(&self, path: &str, bytes: &[u8]) -> io::Result<()> {
        std::fs::write(Path::new(path), bytes)
    }
}

/// Storage held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a resource, builder style.
    pub fn with_file(self, path: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), bytes);
        self
    }

    /// Check whether a resource exists.
    pub fn contains(&self, path: &str) -> bool {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(path)
    }
}

impl Storage for MemoryStorage {
    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.to_string()))
    }

    fn write(&self, path: &str, bytes: &[u8]) -> io::Result<()> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_string(), bytes.to_vec());
        Ok(())
    }
}

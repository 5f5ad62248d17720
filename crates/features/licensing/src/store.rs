//! # Byte Channels
//!
//! Managers read artifacts from a [`Source`] and write them to a [`Sink`]. Both are
//! blocking and only borrowed for the duration of one operation. A [`Store`] is both
//! at once and backs the consumer manager's installed slot.

use crate::error::{LicenseError, LicenseErrorExt};
use parking_lot::RwLock;
use std::fmt::Debug;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Read side of a byte channel.
pub trait Source: Debug {
    /// Reads the whole content.
    ///
    /// # Errors
    /// Returns [`LicenseError::StoreIo`] if the content cannot be read.
    fn read(&self) -> Result<Vec<u8>, LicenseError>;
}

/// Write side of a byte channel.
pub trait Sink: Debug {
    /// Replaces the whole content with `bytes`.
    ///
    /// # Errors
    /// Returns [`LicenseError::StoreIo`] if the content cannot be written.
    fn write(&self, bytes: &[u8]) -> Result<(), LicenseError>;
}

/// A readable, writable and removable byte slot.
pub trait Store: Source + Sink + Send + Sync {
    /// Whether the slot currently holds content.
    fn exists(&self) -> bool;

    /// Removes the content. Deleting an empty slot succeeds.
    ///
    /// # Errors
    /// Returns [`LicenseError::StoreIo`] if the content cannot be removed.
    fn delete(&self) -> Result<(), LicenseError>;
}

/// In-memory slot.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<Option<Vec<u8>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `bytes`.
    #[must_use]
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self { data: RwLock::new(Some(bytes.into())) }
    }
}

impl Source for MemoryStore {
    fn read(&self) -> Result<Vec<u8>, LicenseError> {
        self.data.read().clone().ok_or_else(|| LicenseError::StoreIo {
            source: ErrorKind::NotFound.into(),
            context: Some("Memory store is empty".into()),
        })
    }
}

impl Sink for MemoryStore {
    fn write(&self, bytes: &[u8]) -> Result<(), LicenseError> {
        *self.data.write() = Some(bytes.to_vec());
        Ok(())
    }
}

impl Store for MemoryStore {
    fn exists(&self) -> bool {
        self.data.read().is_some()
    }

    fn delete(&self) -> Result<(), LicenseError> {
        self.data.write().take();
        Ok(())
    }
}

impl Source for [u8] {
    fn read(&self) -> Result<Vec<u8>, LicenseError> {
        Ok(self.to_vec())
    }
}

impl Source for Vec<u8> {
    fn read(&self) -> Result<Vec<u8>, LicenseError> {
        Ok(self.clone())
    }
}

/// File-backed slot with atomic replacement.
///
/// Writes go to a sibling temp file that is synced and then renamed over the target,
/// so readers never observe a partially written artifact.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    tmp_counter: AtomicU64,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), tmp_counter: AtomicU64::new(0) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let counter = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let file_name = self.path.file_name().and_then(|s| s.to_str()).unwrap_or("license");
        self.path.with_file_name(format!("{file_name}.sigiltmp.{}.{counter}", std::process::id()))
    }
}

impl Source for FileStore {
    fn read(&self) -> Result<Vec<u8>, LicenseError> {
        fs::read(&self.path).context(format!("Failed to read {}", self.path.display()))
    }
}

impl Sink for FileStore {
    fn write(&self, bytes: &[u8]) -> Result<(), LicenseError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .context(format!("Failed to create {}", parent.display()))?;
        }

        let temp = self.tmp_path();
        if let Err(err) = write_synced(&temp, &self.path, bytes) {
            let _ = fs::remove_file(&temp);
            return Err(LicenseError::StoreIo {
                source: err,
                context: Some(format!("Atomic write failed: {}", self.path.display()).into()),
            });
        }
        Ok(())
    }
}

impl Store for FileStore {
    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn delete(&self) -> Result<(), LicenseError> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(LicenseError::StoreIo {
                source: err,
                context: Some(format!("Failed to delete {}", self.path.display()).into()),
            }),
            _ => Ok(()),
        }
    }
}

fn write_synced(temp: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    {
        let mut file = fs::OpenOptions::new().create_new(true).write(true).open(temp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(temp, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LicenseErrorKind;

    #[test]
    fn memory_store_lifecycle() {
        let store = MemoryStore::new();
        assert!(!store.exists());
        assert_eq!(store.read().unwrap_err().kind(), LicenseErrorKind::StoreIo);

        store.write(b"artifact").unwrap();
        assert!(store.exists());
        assert_eq!(store.read().unwrap(), b"artifact");

        store.delete().unwrap();
        assert!(!store.exists());
    }

    #[test]
    fn file_store_replaces_content_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("license.lic"));

        store.write(b"first").unwrap();
        store.write(b"second").unwrap();
        assert_eq!(store.read().unwrap(), b"second");

        let leftovers = fs::read_dir(dir.path().join("nested")).unwrap().count();
        assert_eq!(leftovers, 1, "temp files must not survive a successful write");
    }

    #[test]
    fn file_store_delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("license.lic"));
        store.delete().unwrap();

        store.write(b"x").unwrap();
        store.delete().unwrap();
        assert!(!store.exists());
        assert_eq!(store.read().unwrap_err().kind(), LicenseErrorKind::StoreIo);
    }

    #[test]
    fn byte_slices_act_as_sources() {
        let bytes: &[u8] = b"raw";
        assert_eq!(bytes.read().unwrap(), b"raw");
    }
}

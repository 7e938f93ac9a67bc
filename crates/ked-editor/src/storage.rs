//! File persistence: the byte-stream service behind load and save.
//!
//! The document never touches the filesystem directly. It reads and writes
//! whole files through a [`FileStore`], which keeps the document testable
//! without a disk and lets a store report a short write.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from saving a document.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The document has no filename to save to.
    #[error("no filename")]
    NoFilename,

    /// The underlying store failed.
    #[error("{0}")]
    Io(#[from] io::Error),

    /// The store accepted fewer bytes than the document holds.
    #[error("short write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },
}

/// Whole-file load and store.
pub trait FileStore {
    /// Read the full contents of `path`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error (including `NotFound`).
    fn load(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replace the contents of `path` with `bytes`, creating it if needed.
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn store(&self, path: &Path, bytes: &[u8]) -> io::Result<usize>;
}

// ---------------------------------------------------------------------------
// Disk
// ---------------------------------------------------------------------------

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskStore;

impl FileStore for DiskStore {
    fn load(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    /// Opens without truncating, sizes the file to the new length, then
    /// writes. An error part-way leaves the old length in place rather than
    /// an empty file.
    fn store(&self, path: &Path, bytes: &[u8]) -> io::Result<usize> {
        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o644);
        }

        let mut file = options.open(path)?;
        file.set_len(bytes.len() as u64)?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(bytes.len())
    }
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

/// An in-memory store keyed by path.
///
/// `limit` caps how many bytes a single store call accepts, so a short write
/// can be provoked.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: RefCell<HashMap<PathBuf, Vec<u8>>>,
    limit: Option<usize>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that accepts at most `limit` bytes per write.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            files: RefCell::default(),
            limit: Some(limit),
        }
    }

    /// Seed a file.
    pub fn insert(&self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) {
        self.files.borrow_mut().insert(path.into(), bytes.into());
    }

    /// Current contents of a file.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.borrow().get(path).cloned()
    }
}

impl FileStore for MemoryStore {
    fn load(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.get(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "No such file or directory"))
    }

    fn store(&self, path: &Path, bytes: &[u8]) -> io::Result<usize> {
        let n = self.limit.map_or(bytes.len(), |limit| bytes.len().min(limit));
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), bytes[..n].to_vec());
        Ok(n)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn disk_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        assert_eq!(DiskStore.store(&path, b"hello\n").unwrap(), 6);
        assert_eq!(DiskStore.load(&path).unwrap(), b"hello\n");
    }

    #[test]
    fn disk_store_shrinks_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, b"a much longer original body\n").unwrap();
        DiskStore.store(&path, b"short\n").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"short\n");
    }

    #[cfg(unix)]
    #[test]
    fn disk_store_creates_with_mode_0644() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.txt");
        DiskStore.store(&path, b"x").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        // The process umask can only remove bits.
        assert_eq!(mode & !0o644, 0);
    }

    #[test]
    fn disk_store_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = DiskStore.load(&dir.path().join("nope")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn disk_store_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/file");
        assert!(DiskStore.store(&path, b"x").is_err());
    }

    #[test]
    fn memory_store_limit_truncates() {
        let store = MemoryStore::with_limit(3);
        assert_eq!(store.store(Path::new("f"), b"abcdef").unwrap(), 3);
        assert_eq!(store.get(Path::new("f")).unwrap(), b"abc");
    }

    #[test]
    fn error_messages() {
        assert_eq!(StoreError::NoFilename.to_string(), "no filename");
        assert_eq!(
            StoreError::ShortWrite {
                written: 3,
                expected: 6
            }
            .to_string(),
            "short write: 3 of 6 bytes"
        );
        let io = StoreError::from(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert_eq!(io.to_string(), "denied");
    }
}

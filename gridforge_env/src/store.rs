//! Artifact storage abstraction.

use crate::error::EnvError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Destination for encoded artifacts.
///
/// # Implementations
///
/// - **Production**: `FsStore` - writes through to the filesystem
/// - **Testing**: `MemoryStore` - keeps artifacts in a map
///
/// There is a single logical writer per output directory, so no
/// implementation needs locking.
pub trait ArtifactStore {
    /// Makes sure `dir` exists.
    fn ensure_dir(&mut self, dir: &Path) -> Result<(), EnvError>;

    /// Removes every file directly inside `dir`. A missing directory is not an error.
    fn clear_dir(&mut self, dir: &Path) -> Result<usize, EnvError>;

    /// Writes one artifact, replacing any previous content.
    fn write(&mut self, path: &Path, bytes: &[u8]) -> Result<(), EnvError>;
}

/// Filesystem-backed store.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl FsStore {
    pub fn new() -> Self {
        Self
    }
}

impl ArtifactStore for FsStore {
    fn ensure_dir(&mut self, dir: &Path) -> Result<(), EnvError> {
        fs::create_dir_all(dir).map_err(|e| EnvError::directory(dir, e))
    }

    fn clear_dir(&mut self, dir: &Path) -> Result<usize, EnvError> {
        if !dir.is_dir() {
            return Ok(0);
        }
        let mut removed = 0;
        for entry in fs::read_dir(dir).map_err(|e| EnvError::directory(dir, e))? {
            let path = entry.map_err(|e| EnvError::directory(dir, e))?.path();
            if path.is_file() {
                fs::remove_file(&path).map_err(|e| EnvError::directory(&path, e))?;
                removed += 1;
            }
        }
        debug!("Cleared {} files from {}", removed, dir.display());
        Ok(removed)
    }

    fn write(&mut self, path: &Path, bytes: &[u8]) -> Result<(), EnvError> {
        fs::write(path, bytes).map_err(|e| EnvError::write(path, e))
    }
}

/// In-memory store for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: Vec<PathBuf>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    /// Paths written so far, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn has_dir(&self, dir: &Path) -> bool {
        self.dirs.iter().any(|d| d == dir)
    }
}

impl ArtifactStore for MemoryStore {
    fn ensure_dir(&mut self, dir: &Path) -> Result<(), EnvError> {
        if !self.has_dir(dir) {
            self.dirs.push(dir.to_path_buf());
        }
        Ok(())
    }

    fn clear_dir(&mut self, dir: &Path) -> Result<usize, EnvError> {
        let before = self.files.len();
        self.files.retain(|path, _| path.parent() != Some(dir));
        Ok(before - self.files.len())
    }

    fn write(&mut self, path: &Path, bytes: &[u8]) -> Result<(), EnvError> {
        self.files.insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }
}

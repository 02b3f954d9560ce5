//! Native file system implementation

use crate::error::{VfsError, VfsResult};
use crate::{DirEntry, VirtualFileSystem};
use std::path::Path;
use std::time::SystemTime;

/// A native OS file system implementation.
///
/// This wraps `std::fs` operations and provides the `VirtualFileSystem`
/// interface for local file access. Directory checks follow symlinks.
#[derive(Debug, Clone, Default)]
pub struct NativeFileSystem;

impl NativeFileSystem {
    /// Create a new native file system.
    pub fn new() -> Self {
        Self
    }
}

impl VirtualFileSystem for NativeFileSystem {
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| VfsError::from_io(path, e))
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()> {
        std::fs::write(path, content).map_err(|e| VfsError::from_io(path, e))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_dir(&self, path: &Path) -> VfsResult<Vec<DirEntry>> {
        if path.is_file() {
            return Err(VfsError::NotADirectory {
                path: path.to_string_lossy().to_string(),
            });
        }
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path).map_err(|e| VfsError::from_io(path, e))? {
            let entry = entry.map_err(|e| VfsError::from_io(path, e))?;
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                is_dir: entry.path().is_dir(),
            });
        }
        entries.sort();
        Ok(entries)
    }

    fn create_dir_all(&self, path: &Path) -> VfsResult<()> {
        std::fs::create_dir_all(path).map_err(|e| VfsError::from_io(path, e))
    }

    fn modified(&self, path: &Path) -> VfsResult<SystemTime> {
        std::fs::metadata(path)
            .and_then(|meta| meta.modified())
            .map_err(|e| VfsError::from_io(path, e))
    }
}

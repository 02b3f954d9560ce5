//! VirtualFileSystem trait definition

use crate::error::VfsResult;
use std::path::Path;
use std::time::SystemTime;

/// One immediate child of a directory
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DirEntry {
    /// Base name of the child
    pub name: String,
    /// Whether the child is a directory
    pub is_dir: bool,
}

impl DirEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }

    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }
}

/// Virtual File System trait
///
/// Provides a unified interface for file operations, decoupling code from
/// specific file system implementations.
///
/// # Implementations
/// - `MemoryFileSystem`: In-memory file system
/// - `NativeFileSystem`: Native OS file system
/// - `LayeredVFS`: a backend wrapped in a middleware chain
pub trait VirtualFileSystem: Send + Sync {
    /// Read file contents
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>>;

    /// Write file contents
    ///
    /// Creates the file if it doesn't exist, truncates it if it does.
    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()>;

    /// Check if path exists (file or directory)
    fn exists(&self, path: &Path) -> bool;

    /// Check if path exists and is a file
    fn is_file(&self, path: &Path) -> bool;

    /// Check if path exists and is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// List the immediate children of a directory, sorted by name
    fn read_dir(&self, path: &Path) -> VfsResult<Vec<DirEntry>>;

    /// Create a directory and any missing parents
    fn create_dir_all(&self, path: &Path) -> VfsResult<()>;

    /// Last modification time of a file
    fn modified(&self, path: &Path) -> VfsResult<SystemTime>;
}

//! Middleware trait definition

use crate::{DirEntry, VfsResult};
use std::path::Path;
use std::time::SystemTime;

/// Where a layer sits in the chain. Earlier variants wrap later ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Stage {
    /// Logging and tracing, sees every call
    #[default]
    Outer,
    /// Read accounting just above the backend
    Accounting,
}

/// Middleware trait for VFS operations
///
/// Every operation defaults to forwarding to the next layer, so a middleware
/// only overrides what it intercepts.
pub trait Middleware: Send + Sync {
    /// Get the execution stage for this middleware
    fn stage(&self) -> Stage;

    fn read_file(&self, path: &Path, next: &dyn Next) -> VfsResult<Vec<u8>> {
        next.read_file(path)
    }

    fn write_file(&self, path: &Path, content: &[u8], next: &dyn Next) -> VfsResult<()> {
        next.write_file(path, content)
    }

    fn exists(&self, path: &Path, next: &dyn Next) -> bool {
        next.exists(path)
    }

    fn is_file(&self, path: &Path, next: &dyn Next) -> bool {
        next.is_file(path)
    }

    fn is_dir(&self, path: &Path, next: &dyn Next) -> bool {
        next.is_dir(path)
    }

    fn read_dir(&self, path: &Path, next: &dyn Next) -> VfsResult<Vec<DirEntry>> {
        next.read_dir(path)
    }

    fn create_dir_all(&self, path: &Path, next: &dyn Next) -> VfsResult<()> {
        next.create_dir_all(path)
    }

    fn modified(&self, path: &Path, next: &dyn Next) -> VfsResult<SystemTime> {
        next.modified(path)
    }
}

/// Handle to the next middleware in chain
pub trait Next {
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>>;

    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()>;

    fn exists(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn read_dir(&self, path: &Path) -> VfsResult<Vec<DirEntry>>;

    fn create_dir_all(&self, path: &Path) -> VfsResult<()>;

    fn modified(&self, path: &Path) -> VfsResult<SystemTime>;
}

#[cfg(test)]
mod tests {
    use super::Stage;

    #[test]
    fn test_outer_wraps_accounting() {
        assert!(Stage::Outer < Stage::Accounting);
        assert_eq!(Stage::default(), Stage::Outer);
    }
}

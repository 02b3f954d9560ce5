//! Logging middleware for VFS operations

use super::{Middleware, Next, Stage};
use crate::{DirEntry, VfsResult};
use std::path::Path;
use tracing::{debug, trace};

/// Middleware that traces VFS operations on the `scriptcat::vfs` target
#[derive(Debug, Default)]
pub struct LoggedLayer;

impl LoggedLayer {
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for LoggedLayer {
    fn stage(&self) -> Stage {
        Stage::Outer
    }

    fn read_file(&self, path: &Path, next: &dyn Next) -> VfsResult<Vec<u8>> {
        let result = next.read_file(path);
        match &result {
            Ok(content) => debug!(
                target: "scriptcat::vfs",
                path = %path.display(),
                bytes = content.len(),
                "read_file"
            ),
            Err(e) => debug!(target: "scriptcat::vfs", path = %path.display(), error = %e, "read_file failed"),
        }
        result
    }

    fn write_file(&self, path: &Path, content: &[u8], next: &dyn Next) -> VfsResult<()> {
        debug!(target: "scriptcat::vfs", path = %path.display(), bytes = content.len(), "write_file");
        next.write_file(path, content)
    }

    fn exists(&self, path: &Path, next: &dyn Next) -> bool {
        let result = next.exists(path);
        trace!(target: "scriptcat::vfs", path = %path.display(), result, "exists");
        result
    }

    fn read_dir(&self, path: &Path, next: &dyn Next) -> VfsResult<Vec<DirEntry>> {
        let result = next.read_dir(path);
        if let Ok(entries) = &result {
            debug!(target: "scriptcat::vfs", path = %path.display(), entries = entries.len(), "read_dir");
        }
        result
    }
}

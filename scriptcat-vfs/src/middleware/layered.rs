//! Layered VFS that executes middleware chain

use super::{Middleware, Next};
use crate::{DirEntry, VfsResult, VirtualFileSystem};
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

/// VFS implementation that executes a middleware chain
pub struct LayeredVFS {
    backend: Arc<dyn VirtualFileSystem>,
    middlewares: Vec<Box<dyn Middleware>>,
}

impl LayeredVFS {
    pub(crate) fn new(
        backend: Arc<dyn VirtualFileSystem>,
        middlewares: Vec<Box<dyn Middleware>>,
    ) -> Self {
        Self {
            backend,
            middlewares,
        }
    }

    fn chain(&self) -> ChainExecutor<'_> {
        ChainExecutor {
            backend: &*self.backend,
            middlewares: &self.middlewares,
        }
    }
}

/// Position in the chain; the backend sits after the last middleware
struct ChainExecutor<'a> {
    backend: &'a dyn VirtualFileSystem,
    middlewares: &'a [Box<dyn Middleware>],
}

impl<'a> ChainExecutor<'a> {
    fn dispatch<R>(
        &self,
        layer: impl FnOnce(&dyn Middleware, &dyn Next) -> R,
        backend: impl FnOnce(&dyn VirtualFileSystem) -> R,
    ) -> R {
        match self.middlewares.split_first() {
            Some((first, rest)) => {
                let next = ChainExecutor {
                    backend: self.backend,
                    middlewares: rest,
                };
                layer(first.as_ref(), &next)
            }
            None => backend(self.backend),
        }
    }
}

impl<'a> Next for ChainExecutor<'a> {
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>> {
        self.dispatch(|m, n| m.read_file(path, n), |b| b.read_file(path))
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()> {
        self.dispatch(
            |m, n| m.write_file(path, content, n),
            |b| b.write_file(path, content),
        )
    }

    fn exists(&self, path: &Path) -> bool {
        self.dispatch(|m, n| m.exists(path, n), |b| b.exists(path))
    }

    fn is_file(&self, path: &Path) -> bool {
        self.dispatch(|m, n| m.is_file(path, n), |b| b.is_file(path))
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.dispatch(|m, n| m.is_dir(path, n), |b| b.is_dir(path))
    }

    fn read_dir(&self, path: &Path) -> VfsResult<Vec<DirEntry>> {
        self.dispatch(|m, n| m.read_dir(path, n), |b| b.read_dir(path))
    }

    fn create_dir_all(&self, path: &Path) -> VfsResult<()> {
        self.dispatch(|m, n| m.create_dir_all(path, n), |b| b.create_dir_all(path))
    }

    fn modified(&self, path: &Path) -> VfsResult<SystemTime> {
        self.dispatch(|m, n| m.modified(path, n), |b| b.modified(path))
    }
}

impl VirtualFileSystem for LayeredVFS {
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>> {
        self.chain().read_file(path)
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()> {
        self.chain().write_file(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        self.chain().exists(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.chain().is_file(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.chain().is_dir(path)
    }

    fn read_dir(&self, path: &Path) -> VfsResult<Vec<DirEntry>> {
        self.chain().read_dir(path)
    }

    fn create_dir_all(&self, path: &Path) -> VfsResult<()> {
        self.chain().create_dir_all(path)
    }

    fn modified(&self, path: &Path) -> VfsResult<SystemTime> {
        self.chain().modified(path)
    }
}

//! Read-accounting middleware

use super::{Middleware, Next, Stage};
use crate::VfsResult;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Middleware that records every `read_file` call in order.
///
/// Clones share the same log, so a handle kept outside the builder observes
/// reads made through the built [`LayeredVFS`](super::LayeredVFS).
#[derive(Debug, Clone, Default)]
pub struct CountingLayer {
    reads: Arc<Mutex<Vec<PathBuf>>>,
}

impl CountingLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every path read so far, in call order
    pub fn reads(&self) -> Vec<PathBuf> {
        self.reads.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Number of reads of one path
    pub fn count(&self, path: &Path) -> usize {
        self.reads
            .lock()
            .map(|r| r.iter().filter(|p| p.as_path() == path).count())
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.reads.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn reset(&self) {
        if let Ok(mut reads) = self.reads.lock() {
            reads.clear();
        }
    }
}

impl Middleware for CountingLayer {
    fn stage(&self) -> Stage {
        Stage::Accounting
    }

    fn read_file(&self, path: &Path, next: &dyn Next) -> VfsResult<Vec<u8>> {
        if let Ok(mut reads) = self.reads.lock() {
            reads.push(path.to_path_buf());
        }
        next.read_file(path)
    }
}

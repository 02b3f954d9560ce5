//! Chain assembly

use super::{LayeredVFS, Middleware};
use crate::VirtualFileSystem;
use std::sync::Arc;

/// Collects layers over one backend and orders them by [`Stage`](super::Stage).
///
/// ```rust,ignore
/// use scriptcat_vfs::{CountingLayer, LoggedLayer, NativeFileSystem, VfsBuilder};
///
/// let reads = CountingLayer::new();
/// let vfs = VfsBuilder::new(NativeFileSystem::new())
///     .with(reads.clone())
///     .with(LoggedLayer::new())
///     .build();
/// ```
pub struct VfsBuilder {
    backend: Arc<dyn VirtualFileSystem>,
    layers: Vec<Box<dyn Middleware>>,
}

impl VfsBuilder {
    pub fn new(backend: impl VirtualFileSystem + 'static) -> Self {
        Self::from_shared(Arc::new(backend))
    }

    /// Wrap a backend other owners keep using directly
    pub fn from_shared(backend: Arc<dyn VirtualFileSystem>) -> Self {
        Self {
            backend,
            layers: Vec::new(),
        }
    }

    pub fn with(mut self, layer: impl Middleware + 'static) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    /// Layers of equal stage keep the order they were added in.
    pub fn build(mut self) -> LayeredVFS {
        self.layers.sort_by_key(|layer| layer.stage());
        LayeredVFS::new(self.backend, self.layers)
    }
}

//! Scriptcat Virtual File System
//!
//! A virtual file system abstraction with multiple backend implementations.
//! Module lookup, directory indexing and content reads all go through
//! [`VirtualFileSystem`], so the resolver runs unchanged against disk or memory.
//!
//! # Usage
//! ```rust,ignore
//! use scriptcat_vfs::{VirtualFileSystem, MemoryFileSystem};
//! use std::path::Path;
//!
//! let fs = MemoryFileSystem::new();
//! fs.write_file(Path::new("/p/__init__.js"), b"var p;\n").unwrap();
//! assert!(fs.is_dir(Path::new("/p")));
//! ```

mod error;
mod memory;
pub mod middleware;
mod native;
mod r#trait;

pub use error::{VfsError, VfsResult};
pub use memory::MemoryFileSystem;
pub use middleware::{CountingLayer, LayeredVFS, LoggedLayer, Middleware, Next, Stage, VfsBuilder};
pub use native::NativeFileSystem;
pub use r#trait::{DirEntry, VirtualFileSystem};

/// Create a new memory-based file system.
pub fn memory_fs() -> MemoryFileSystem {
    MemoryFileSystem::new()
}

/// Create a new native file system.
pub fn native_fs() -> NativeFileSystem {
    NativeFileSystem::new()
}

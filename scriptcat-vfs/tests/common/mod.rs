//! Shared fixtures for VFS integration tests

use scriptcat_vfs::MemoryFileSystem;

/// A small module tree: one package with a file child and a sub-package
pub fn module_tree() -> MemoryFileSystem {
    MemoryFileSystem::with_files([
        ("/js/p/__init__.js", "var p;\n"),
        ("/js/p/mod1.js", "p.mod1 = 1;\n"),
        ("/js/p/sub/__init__.js", "p.sub = {};\n"),
        ("/js/standalone.js", "standalone();\n"),
    ])
}

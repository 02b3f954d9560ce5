//! Shared fixtures for core integration tests

#![allow(dead_code)]

use scriptcat_config::ResolverConfig;
use scriptcat_core::{Script, ScriptEnv};
use scriptcat_vfs::{CountingLayer, MemoryFileSystem, VfsBuilder};
use std::sync::Arc;

/// Environment reading straight from `fs`
pub fn env(fs: &MemoryFileSystem) -> ScriptEnv {
    ScriptEnv::new(Arc::new(fs.clone()), ResolverConfig::default())
}

/// Environment whose reads are recorded by the returned layer
pub fn counted_env(fs: &MemoryFileSystem) -> (ScriptEnv, CountingLayer) {
    let counter = CountingLayer::new();
    let layered = VfsBuilder::new(fs.clone()).with(counter.clone()).build();
    (
        ScriptEnv::new(Arc::new(layered), ResolverConfig::default()),
        counter,
    )
}

/// Display names of resolved scripts, `<virtual script>` for virtual ones
pub fn names(scripts: &[Script]) -> Vec<String> {
    scripts.iter().map(ToString::to_string).collect()
}

/// Package `p` with one child module
pub fn package_tree() -> MemoryFileSystem {
    MemoryFileSystem::with_files([
        ("/js/p/__init__.js", "var p = {};\n"),
        ("/js/p/mod1.js", "p.mod1 = 1;\n"),
    ])
}

/// Package `p1` whose children import each other through several paths
pub fn overlapping_tree() -> MemoryFileSystem {
    MemoryFileSystem::with_files([
        ("/js/p1/__init__.js", "//\n"),
        ("/js/p1/child1.js", "//\n"),
        ("/js/p1/child2.js", "// import p1.child1\n//import p1\n"),
        (
            "/js/p1/child3.js",
            "// import p1.child2\n//import p1.child1\n",
        ),
        (
            "/js/p1/child4.js",
            "// import p1.child3\n// import p1.child2\n//import p1.child1\n",
        ),
    ])
}

/// Symbol-dialect modules plus the foundation module
pub fn closure_tree() -> MemoryFileSystem {
    MemoryFileSystem::with_files([
        ("/js/goog/base.js", "var goog = {};\n"),
        ("/js/cw/util.js", "goog.provide('cw.util');\n\ncw.util.x = 1;\n"),
        (
            "/js/app.js",
            "goog.provide('app');\n\ngoog.require('cw.util');\n\napp.run = 1;\n",
        ),
    ])
}

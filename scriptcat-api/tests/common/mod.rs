//! Shared fixtures for API integration tests

#![allow(dead_code)]

use scriptcat_api::{ResolverConfig, Session};
use scriptcat_vfs::{CountingLayer, MemoryFileSystem, VfsBuilder};
use std::sync::Arc;

/// A mixed tree: path-dialect package `p`, symbol-dialect `cw` modules and a
/// test package
pub fn project() -> MemoryFileSystem {
    MemoryFileSystem::with_files([
        ("/js/p/__init__.js", "var p = {};\n"),
        ("/js/p/mod1.js", "p.mod1 = /***/level//;\n"),
        ("/js/goog/base.js", "var goog = {};\n"),
        ("/js/cw/__init__.js", "\n"),
        ("/js/cw/util.js", "goog.provide('cw.util');\n"),
        (
            "/js/cw/Test/__init__.js",
            "goog.provide('cw.Test');\n",
        ),
        (
            "/js/cw/Test/TestUtil.js",
            "goog.provide('cw.Test.TestUtil');\ngoog.provide('cw.Test.TestUtil.More');\n",
        ),
        ("/js/cw/Test/TestAlpha.js", "goog.provide('cw.Test.TestAlpha');\n"),
        ("/js/cw/Test/TestNoProvide.js", "// import cw\n"),
        ("/js/cw/Test/TestOld.bak.js", "goog.provide('old');\n"),
        ("/js/cw/Test/helper.js", "goog.provide('cw.Test.helper');\n"),
    ])
}

pub fn session(fs: &MemoryFileSystem) -> Session {
    Session::new(Arc::new(fs.clone()), "/js", ResolverConfig::default())
}

/// Session whose file reads are recorded by the returned layer
pub fn counted_session(fs: &MemoryFileSystem) -> (Session, CountingLayer) {
    let counter = CountingLayer::new();
    let layered = VfsBuilder::new(fs.clone()).with(counter.clone()).build();
    let session = Session::new(Arc::new(layered), "/js", ResolverConfig::default());
    (session, counter)
}

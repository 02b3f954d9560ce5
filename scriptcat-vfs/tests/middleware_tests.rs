//! Middleware chain tests

mod common;

use scriptcat_vfs::{
    CountingLayer, DirEntry, LoggedLayer, Middleware, Next, Stage, VfsBuilder, VfsResult,
    VirtualFileSystem,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[test]
fn test_layered_vfs_forwards_to_backend() {
    let vfs = VfsBuilder::new(common::module_tree())
        .with(LoggedLayer::new())
        .build();

    assert!(vfs.is_dir(Path::new("/js/p")));
    assert!(vfs.is_file(Path::new("/js/p/mod1.js")));
    assert_eq!(vfs.read_file(Path::new("/js/p/mod1.js")).unwrap(), b"p.mod1 = 1;\n");
    assert_eq!(
        vfs.read_dir(Path::new("/js")).unwrap(),
        vec![DirEntry::dir("p"), DirEntry::file("standalone.js")]
    );
    assert!(vfs.modified(Path::new("/js/standalone.js")).is_ok());
}

#[test]
fn test_counting_layer_records_reads() {
    let counter = CountingLayer::new();
    let vfs = VfsBuilder::new(common::module_tree())
        .with(counter.clone())
        .build();

    vfs.read_file(Path::new("/js/p/mod1.js")).unwrap();
    vfs.read_file(Path::new("/js/p/mod1.js")).unwrap();
    vfs.read_file(Path::new("/js/standalone.js")).unwrap();
    let _ = vfs.read_file(Path::new("/js/missing.js"));

    assert_eq!(counter.count(Path::new("/js/p/mod1.js")), 2);
    assert_eq!(counter.count(Path::new("/js/standalone.js")), 1);
    assert_eq!(counter.total(), 4);
    assert_eq!(
        counter.reads()[..2],
        [PathBuf::from("/js/p/mod1.js"), PathBuf::from("/js/p/mod1.js")]
    );

    counter.reset();
    assert_eq!(counter.total(), 0);
}

#[test]
fn test_counting_layer_ignores_metadata_calls() {
    let counter = CountingLayer::new();
    let vfs = VfsBuilder::new(common::module_tree())
        .with(counter.clone())
        .build();

    assert!(vfs.exists(Path::new("/js/p")));
    assert!(vfs.read_dir(Path::new("/js/p")).is_ok());
    assert_eq!(counter.total(), 0);
}

/// Records the stage of every layer a read passes through
struct Probe {
    stage: Stage,
    seen: Arc<Mutex<Vec<Stage>>>,
}

impl Middleware for Probe {
    fn stage(&self) -> Stage {
        self.stage
    }

    fn read_file(&self, path: &Path, next: &dyn Next) -> VfsResult<Vec<u8>> {
        self.seen.lock().unwrap().push(self.stage);
        next.read_file(path)
    }
}

#[test]
fn test_middlewares_sorted_by_stage() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let vfs = VfsBuilder::new(common::module_tree())
        .with(Probe {
            stage: Stage::Accounting,
            seen: seen.clone(),
        })
        .with(Probe {
            stage: Stage::Outer,
            seen: seen.clone(),
        })
        .build();

    vfs.read_file(Path::new("/js/standalone.js")).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![Stage::Outer, Stage::Accounting]);
}

#[test]
fn test_writes_pass_through_chain() {
    let backend = common::module_tree();
    let vfs = VfsBuilder::new(backend.clone())
        .with(LoggedLayer::new())
        .build();

    vfs.write_file(Path::new("/js/new.js"), b"n\n").unwrap();
    vfs.create_dir_all(Path::new("/js/empty")).unwrap();

    assert_eq!(backend.read_file(Path::new("/js/new.js")).unwrap(), b"n\n");
    assert!(backend.is_dir(Path::new("/js/empty")));
}

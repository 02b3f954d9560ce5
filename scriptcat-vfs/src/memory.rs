//! In-memory file system implementation

use crate::error::{VfsError, VfsResult};
use crate::{DirEntry, VirtualFileSystem};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
struct MemoryFile {
    content: Vec<u8>,
    /// Logical clock value of the last write
    stamp: u64,
}

#[derive(Debug, Default)]
struct Tree {
    files: BTreeMap<String, MemoryFile>,
    /// Directories created explicitly; others exist as prefixes of file paths
    dirs: BTreeSet<String>,
    clock: u64,
}

impl Tree {
    fn has_dir(&self, normalized: &str) -> bool {
        if normalized.is_empty() || normalized == "/" {
            return true;
        }
        if self.files.contains_key(normalized) {
            return false;
        }
        if self.dirs.contains(normalized) {
            return true;
        }
        let prefix = child_prefix(normalized);
        let has_prefix = |key: &String| key.starts_with(&prefix);
        self.files.range(prefix.clone()..).next().map(|(k, _)| k).is_some_and(has_prefix)
            || self.dirs.range(prefix.clone()..).next().is_some_and(has_prefix)
    }
}

/// An in-memory file system implementation.
///
/// Files are stored in a `BTreeMap` keyed by normalised `/`-separated paths.
/// A directory exists when some stored path lies beneath it or when it was
/// created with [`VirtualFileSystem::create_dir_all`]. Modification times come
/// from a logical clock that ticks on every write.
///
/// # Example
/// ```
/// use scriptcat_vfs::{MemoryFileSystem, VirtualFileSystem};
/// use std::path::Path;
///
/// let fs = MemoryFileSystem::new();
/// fs.write_file(Path::new("/lib/a.js"), b"a();\n").unwrap();
/// assert!(fs.is_dir(Path::new("/lib")));
/// assert_eq!(fs.read_file(Path::new("/lib/a.js")).unwrap(), b"a();\n");
/// ```
#[derive(Debug, Clone)]
pub struct MemoryFileSystem {
    tree: Arc<RwLock<Tree>>,
}

impl MemoryFileSystem {
    /// Create a new empty memory file system.
    pub fn new() -> Self {
        Self {
            tree: Arc::new(RwLock::new(Tree::default())),
        }
    }

    /// Create a new memory file system pre-populated with files.
    ///
    /// # Arguments
    /// * `files` - Iterator of (path, content) tuples
    pub fn with_files<I, S, C>(files: I) -> Self
    where
        I: IntoIterator<Item = (S, C)>,
        S: AsRef<str>,
        C: AsRef<[u8]>,
    {
        let fs = Self::new();
        if let Ok(mut tree) = fs.tree.write() {
            for (path, content) in files {
                tree.clock += 1;
                let stamp = tree.clock;
                tree.files.insert(
                    normalize_path(Path::new(path.as_ref())),
                    MemoryFile {
                        content: content.as_ref().to_vec(),
                        stamp,
                    },
                );
            }
        }
        fs
    }

    fn read(&self) -> VfsResult<RwLockReadGuard<'_, Tree>> {
        self.tree.read().map_err(|_| VfsError::Poisoned)
    }

    fn write(&self) -> VfsResult<RwLockWriteGuard<'_, Tree>> {
        self.tree.write().map_err(|_| VfsError::Poisoned)
    }
}

impl Default for MemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize a path for internal storage.
///
/// Forward slashes only, `.` dropped, `..` folded, no trailing slash. An
/// absolute path keeps its leading `/`; the empty string is the relative root.
fn normalize_path(path: &Path) -> String {
    let mut absolute = false;
    let mut parts: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::RootDir | Component::Prefix(_) => absolute = true,
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop();
            }
            Component::Normal(part) => {
                parts.push(part.to_string_lossy().replace('\\', "/"));
            }
        }
    }
    let joined = parts.join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

fn child_prefix(normalized: &str) -> String {
    if normalized.is_empty() || normalized.ends_with('/') {
        normalized.to_string()
    } else {
        format!("{}/", normalized)
    }
}

impl VirtualFileSystem for MemoryFileSystem {
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>> {
        let normalized = normalize_path(path);
        let tree = self.read()?;
        tree.files
            .get(&normalized)
            .map(|file| file.content.clone())
            .ok_or(VfsError::NotFound { path: normalized })
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()> {
        let normalized = normalize_path(path);
        let mut tree = self.write()?;
        if tree.dirs.contains(&normalized) {
            return Err(VfsError::AlreadyExists { path: normalized });
        }
        tree.clock += 1;
        let stamp = tree.clock;
        tree.files.insert(
            normalized,
            MemoryFile {
                content: content.to_vec(),
                stamp,
            },
        );
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.is_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        let normalized = normalize_path(path);
        match self.read() {
            Ok(tree) => tree.files.contains_key(&normalized),
            Err(_) => false,
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        let normalized = normalize_path(path);
        match self.read() {
            Ok(tree) => tree.has_dir(&normalized),
            Err(_) => false,
        }
    }

    fn read_dir(&self, path: &Path) -> VfsResult<Vec<DirEntry>> {
        let normalized = normalize_path(path);
        let tree = self.read()?;
        if !tree.has_dir(&normalized) {
            return Err(if tree.files.contains_key(&normalized) {
                VfsError::NotADirectory { path: normalized }
            } else {
                VfsError::NotFound { path: normalized }
            });
        }

        let prefix = child_prefix(&normalized);
        let mut children: BTreeMap<String, bool> = BTreeMap::new();
        let file_keys = tree.files.keys().map(|k| (k, false));
        let dir_keys = tree.dirs.iter().map(|k| (k, true));
        for (key, explicit_dir) in file_keys.chain(dir_keys) {
            let Some(rest) = key.strip_prefix(&prefix) else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }
            match rest.split_once('/') {
                Some((child, _)) => {
                    children.insert(child.to_string(), true);
                }
                None => {
                    children.entry(rest.to_string()).or_insert(explicit_dir);
                }
            }
        }

        Ok(children
            .into_iter()
            .map(|(name, is_dir)| DirEntry { name, is_dir })
            .collect())
    }

    fn create_dir_all(&self, path: &Path) -> VfsResult<()> {
        let normalized = normalize_path(path);
        let mut tree = self.write()?;
        if tree.files.contains_key(&normalized) {
            return Err(VfsError::AlreadyExists { path: normalized });
        }
        tree.dirs.insert(normalized);
        Ok(())
    }

    fn modified(&self, path: &Path) -> VfsResult<SystemTime> {
        let normalized = normalize_path(path);
        let tree = self.read()?;
        tree.files
            .get(&normalized)
            .map(|file| UNIX_EPOCH + Duration::from_secs(file.stamp))
            .ok_or(VfsError::NotFound { path: normalized })
    }
}

//! Module locator
//!
//! Maps a dotted module name onto a path relative to a base directory.
//!
//! # Lookup rules
//! - `a.b.c` where `a/b/c` is a directory → `a/b/c/__init__.js` (must exist)
//! - otherwise → `a/b/c.js` (must exist)
//!
//! Directory existence wins, so a package shadows a same-named file.

use scriptcat_config::ResolverConfig;
use scriptcat_vfs::VirtualFileSystem;
use std::path::{Path, PathBuf};
use tracing::trace;

use crate::error::{Result, ScriptError};

/// Pure function of (name, base, filesystem state); no caching here
pub struct ModuleLocator<'a> {
    fs: &'a dyn VirtualFileSystem,
    config: &'a ResolverConfig,
}

impl<'a> ModuleLocator<'a> {
    pub fn new(fs: &'a dyn VirtualFileSystem, config: &'a ResolverConfig) -> Self {
        Self { fs, config }
    }

    /// Whether `name` is backed by a directory under `base`
    ///
    /// The init file is not checked here; [`locate`](Self::locate) does that.
    pub fn is_package(&self, name: &str, base: &Path) -> bool {
        self.fs.is_dir(&base.join(package_dir(name)))
    }

    /// Relative path of the file supplying `name`'s content
    pub fn locate(&self, name: &str, base: &Path) -> Result<PathBuf> {
        let location = if self.is_package(name, base) {
            let location = package_dir(name).join(&self.config.package_init_file);
            if !self.fs.is_file(&base.join(&location)) {
                return Err(ScriptError::PackageMissingInitFile {
                    name: name.to_string(),
                    path: location,
                });
            }
            location
        } else {
            let location = PathBuf::from(format!(
                "{}.{}",
                name.split('.').collect::<Vec<_>>().join("/"),
                self.config.extension
            ));
            if !self.fs.is_file(&base.join(&location)) {
                return Err(ScriptError::ModuleNotFound {
                    name: name.to_string(),
                    path: location,
                });
            }
            location
        };

        trace!(target: "scriptcat::locate", name, path = %location.display(), "located");
        Ok(location)
    }
}

fn package_dir(name: &str) -> PathBuf {
    name.split('.').collect()
}

/// Name of the enclosing package, or `None` for a top-level module
pub fn parent_name(name: &str) -> Option<&str> {
    name.rsplit_once('.').map(|(parent, _)| parent)
}

//! Directory-wide symbol index
//!
//! Maps every symbol declared with `goog.provide(...)` under a root directory
//! to the dotted name of the module declaring it. Built once, rebuilt on
//! demand with [`DirectoryIndex::rescan`].

use scriptcat_config::ResolverConfig;
use scriptcat_vfs::VirtualFileSystem;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::error::{Result, ScriptError};
use crate::header::{call_argument, PROVIDE_CALL};

/// Symbol → declaring module
pub struct DirectoryIndex {
    fs: Arc<dyn VirtualFileSystem>,
    root: PathBuf,
    config: ResolverConfig,
    symbols: BTreeMap<String, String>,
}

impl DirectoryIndex {
    /// Scan `root` and build the index.
    ///
    /// # Errors
    /// `SymbolConflict` if two provide lines declare the same symbol.
    pub fn scan(
        fs: Arc<dyn VirtualFileSystem>,
        root: impl Into<PathBuf>,
        config: ResolverConfig,
    ) -> Result<Self> {
        let mut index = Self {
            fs,
            root: root.into(),
            config,
            symbols: BTreeMap::new(),
        };
        index.rescan()?;
        Ok(index)
    }

    /// Discard the mapping and rebuild it from the filesystem.
    ///
    /// On failure the previous mapping is kept.
    #[instrument(target = "scriptcat::index", skip(self), fields(root = %self.root.display()))]
    pub fn rescan(&mut self) -> Result<()> {
        let mut symbols = BTreeMap::new();
        self.scan_dir(&self.root, &mut Vec::new(), &mut symbols)?;
        info!(target: "scriptcat::index", symbols = symbols.len(), "scan complete");
        self.symbols = symbols;
        Ok(())
    }

    /// Dotted name of the module providing `symbol`
    pub fn lookup(&self, symbol: &str) -> Option<&str> {
        self.symbols.get(symbol).map(String::as_str)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// All (symbol, module) pairs, ordered by symbol
    pub fn symbols(&self) -> impl Iterator<Item = (&str, &str)> {
        self.symbols.iter().map(|(s, m)| (s.as_str(), m.as_str()))
    }

    fn scan_dir(
        &self,
        dir: &Path,
        location: &mut Vec<String>,
        symbols: &mut BTreeMap<String, String>,
    ) -> Result<()> {
        let suffix = format!(".{}", self.config.extension);
        for entry in self.fs.read_dir(dir)? {
            let path = dir.join(&entry.name);
            if entry.is_dir {
                location.push(entry.name);
                self.scan_dir(&path, location, symbols)?;
                location.pop();
            } else if entry.name.ends_with(&suffix) {
                let stem = entry.name.split('.').next().unwrap_or_default();
                // a package's init file provides on behalf of the package
                let leaf = (entry.name != self.config.package_init_file || location.is_empty())
                    .then_some(stem);
                let module = location
                    .iter()
                    .map(String::as_str)
                    .chain(leaf)
                    .collect::<Vec<_>>()
                    .join(".");
                self.scan_file(&path, &module, symbols)?;
            }
        }
        Ok(())
    }

    fn scan_file(
        &self,
        path: &Path,
        module: &str,
        symbols: &mut BTreeMap<String, String>,
    ) -> Result<()> {
        let bytes = self.fs.read_file(path)?;
        let content = String::from_utf8_lossy(&bytes);
        let window = self.config.provide_scan_window;
        let origin = path.display().to_string();

        let mut last: Option<usize> = None;
        for (n, line) in content.lines().enumerate() {
            if last.is_some_and(|last| n > last + window) {
                break;
            }
            let Some(rest) = line.strip_prefix(PROVIDE_CALL) else {
                continue;
            };
            last = Some(n);
            let symbol = call_argument(&origin, line, rest)?;
            if let Some(existing) = symbols.get(&symbol) {
                return Err(ScriptError::SymbolConflict {
                    symbol,
                    existing: existing.clone(),
                    file: path.to_path_buf(),
                });
            }
            debug!(target: "scriptcat::index", symbol = %symbol, module, "provide");
            symbols.insert(symbol, module.to_string());
        }
        Ok(())
    }
}

impl std::fmt::Debug for DirectoryIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryIndex")
            .field("root", &self.root)
            .field("symbols", &self.symbols.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptcat_vfs::MemoryFileSystem;

    fn index_of(fs: &MemoryFileSystem) -> Result<DirectoryIndex> {
        DirectoryIndex::scan(Arc::new(fs.clone()), "/js", ResolverConfig::default())
    }

    #[test]
    fn test_same_file_provides_many() {
        let fs = MemoryFileSystem::with_files([(
            "/js/hello.js",
            "goog.provide('hello.a');\ngoog.provide('hello.b');\n",
        )]);
        let index = index_of(&fs).unwrap();

        assert_eq!(index.lookup("hello.a"), Some("hello"));
        assert_eq!(index.lookup("hello.b"), Some("hello"));
        assert_eq!(index.lookup("hello.c"), None);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_conflict_between_files() {
        let fs = MemoryFileSystem::with_files([
            ("/js/hello.js", "goog.provide('hello.a');\n"),
            ("/js/other.js", "goog.provide(\"hello.a\");\n"),
        ]);
        let err = index_of(&fs).unwrap_err();
        match err {
            ScriptError::SymbolConflict {
                symbol, existing, ..
            } => {
                assert_eq!(symbol, "hello.a");
                assert_eq!(existing, "hello");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_module_names_follow_directories() {
        let fs = MemoryFileSystem::with_files([
            ("/js/sub/deeper/x.js", "goog.provide('x');\n"),
            ("/js/sub/y.min.js", "goog.provide('y');\n"),
            ("/js/sub/notes.txt", "goog.provide('txt');\n"),
        ]);
        let index = index_of(&fs).unwrap();

        assert_eq!(index.lookup("x"), Some("sub.deeper.x"));
        assert_eq!(index.lookup("y"), Some("sub.y"));
        assert_eq!(index.lookup("txt"), None);
    }

    #[test]
    fn test_init_file_provides_for_package() {
        let fs = MemoryFileSystem::with_files([
            ("/js/cw/__init__.js", "goog.provide('cw');\n"),
            ("/js/cw/Test/__init__.js", "goog.provide('cw.Test');\n"),
        ]);
        let index = index_of(&fs).unwrap();

        assert_eq!(index.lookup("cw"), Some("cw"));
        assert_eq!(index.lookup("cw.Test"), Some("cw.Test"));
    }

    #[test]
    fn test_scan_window_after_last_provide() {
        let mut late = String::from("goog.provide('early');\n");
        for _ in 0..99 {
            late.push_str("filler();\n");
        }
        // line 100: last line inside the window opened on line 0
        late.push_str("goog.provide('edge');\n");
        for _ in 0..101 {
            late.push_str("filler();\n");
        }
        late.push_str("goog.provide('too.late');\n");

        let fs = MemoryFileSystem::with_files([("/js/late.js", late)]);
        let index = index_of(&fs).unwrap();

        assert_eq!(index.lookup("early"), Some("late"));
        assert_eq!(index.lookup("edge"), Some("late"));
        assert_eq!(index.lookup("too.late"), None);
    }

    #[test]
    fn test_no_window_before_first_provide() {
        let mut content = String::new();
        for _ in 0..500 {
            content.push_str("filler();\n");
        }
        content.push_str("goog.provide('deep');\n");

        let fs = MemoryFileSystem::with_files([("/js/deep.js", content)]);
        assert_eq!(index_of(&fs).unwrap().lookup("deep"), Some("deep"));
    }

    #[test]
    fn test_rescan_picks_up_new_files() {
        let fs = MemoryFileSystem::with_files([("/js/a.js", "goog.provide('a');\n")]);
        let mut index = index_of(&fs).unwrap();
        assert_eq!(index.lookup("b"), None);

        fs.write_file(Path::new("/js/b.js"), b"goog.provide('b');\n")
            .unwrap();
        index.rescan().unwrap();
        assert_eq!(index.lookup("b"), Some("b"));
        assert_eq!(
            index.symbols().collect::<Vec<_>>(),
            vec![("a", "a"), ("b", "b")]
        );
    }

    #[test]
    fn test_failed_rescan_keeps_mapping() {
        let fs = MemoryFileSystem::with_files([("/js/a.js", "goog.provide('a');\n")]);
        let mut index = index_of(&fs).unwrap();

        fs.write_file(Path::new("/js/dup.js"), b"goog.provide('a');\n")
            .unwrap();
        assert!(index.rescan().is_err());
        assert_eq!(index.lookup("a"), Some("a"));
    }
}

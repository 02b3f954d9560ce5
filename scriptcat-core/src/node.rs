//! Module nodes
//!
//! A [`Script`] is one unit of concatenable source: either an on-disk module
//! named by a dotted path under a base directory, or an in-memory virtual
//! script. Both share one contract: content, header info, dependencies.
//!
//! Identity is (name, base) for on-disk modules and (content, base) for
//! virtual ones. The lazy content and header caches never take part in
//! equality or hashing.

use scriptcat_config::ResolverConfig;
use scriptcat_vfs::VirtualFileSystem;
use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::cache::SharedCache;
use crate::error::{Result, ScriptError};
use crate::header::{parse_header, HeaderInfo};
use crate::index::DirectoryIndex;
use crate::locator::{parent_name, ModuleLocator};

/// Filesystem and resolver settings shared by every script of a session
#[derive(Clone)]
pub struct ScriptEnv {
    fs: Arc<dyn VirtualFileSystem>,
    config: Arc<ResolverConfig>,
}

impl ScriptEnv {
    pub fn new(fs: Arc<dyn VirtualFileSystem>, config: ResolverConfig) -> Self {
        Self {
            fs,
            config: Arc::new(config),
        }
    }

    pub fn fs(&self) -> &dyn VirtualFileSystem {
        &*self.fs
    }

    pub fn shared_fs(&self) -> Arc<dyn VirtualFileSystem> {
        Arc::clone(&self.fs)
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn locator(&self) -> ModuleLocator<'_> {
        ModuleLocator::new(&*self.fs, &self.config)
    }

    /// On-disk module `name` under `base`
    pub fn script(&self, name: impl Into<String>, base: impl Into<PathBuf>) -> Script {
        Script::new(
            self.clone(),
            Source::Disk {
                name: name.into(),
                base: base.into(),
            },
        )
    }

    /// In-memory script; `base` is needed only if it imports or requires anything
    pub fn virtual_script(&self, content: impl Into<String>, base: Option<PathBuf>) -> Script {
        self.virtual_with_deps(content, base, Vec::new())
    }

    /// In-memory script with extra dependencies resolved ahead of its imports
    pub fn virtual_with_deps(
        &self,
        content: impl Into<String>,
        base: Option<PathBuf>,
        forced: Vec<Script>,
    ) -> Script {
        Script::new(
            self.clone(),
            Source::Virtual {
                content: Rc::from(content.into()),
                base,
                forced,
            },
        )
    }
}

impl fmt::Debug for ScriptEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptEnv")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

enum Source {
    Disk {
        name: String,
        base: PathBuf,
    },
    Virtual {
        content: Rc<str>,
        base: Option<PathBuf>,
        forced: Vec<Script>,
    },
}

#[derive(PartialEq, Eq, Hash)]
enum Identity<'a> {
    Disk(&'a str, &'a Path),
    Virtual(&'a str, Option<&'a Path>),
}

struct Inner {
    env: ScriptEnv,
    source: Source,
    content: RefCell<Option<Rc<str>>>,
    header: RefCell<Option<Rc<HeaderInfo>>>,
}

/// Handle to a module node; clones share the same caches
#[derive(Clone)]
pub struct Script(Rc<Inner>);

impl Script {
    fn new(env: ScriptEnv, source: Source) -> Self {
        Script(Rc::new(Inner {
            env,
            source,
            content: RefCell::new(None),
            header: RefCell::new(None),
        }))
    }

    fn identity(&self) -> Identity<'_> {
        match &self.0.source {
            Source::Disk { name, base } => Identity::Disk(name, base),
            Source::Virtual { content, base, .. } => Identity::Virtual(content, base.as_deref()),
        }
    }

    pub fn env(&self) -> &ScriptEnv {
        &self.0.env
    }

    /// Dotted name; `None` for virtual scripts
    pub fn name(&self) -> Option<&str> {
        match &self.0.source {
            Source::Disk { name, .. } => Some(name.as_str()),
            Source::Virtual { .. } => None,
        }
    }

    pub fn base(&self) -> Option<&Path> {
        match &self.0.source {
            Source::Disk { base, .. } => Some(base.as_path()),
            Source::Virtual { base, .. } => base.as_deref(),
        }
    }

    pub fn is_virtual(&self) -> bool {
        matches!(self.0.source, Source::Virtual { .. })
    }

    /// Whether this is the module every symbol-dialect module depends on
    pub fn is_foundation(&self) -> bool {
        self.name() == Some(self.0.env.config.foundation_module.as_str())
    }

    pub fn forced_dependencies(&self) -> &[Script] {
        match &self.0.source {
            Source::Virtual { forced, .. } => forced.as_slice(),
            Source::Disk { .. } => &[],
        }
    }

    /// Whether this module is backed by a directory
    pub fn is_package(&self) -> bool {
        match &self.0.source {
            Source::Disk { name, base } => self.0.env.locator().is_package(name, base),
            Source::Virtual { .. } => false,
        }
    }

    /// Path of the module's file relative to its base; `None` for virtual scripts
    pub fn filename(&self) -> Result<Option<PathBuf>> {
        match &self.0.source {
            Source::Disk { name, base } => self.0.env.locator().locate(name, base).map(Some),
            Source::Virtual { .. } => Ok(None),
        }
    }

    pub fn absolute_filename(&self) -> Result<Option<PathBuf>> {
        match &self.0.source {
            Source::Disk { name, base } => {
                let relative = self.0.env.locator().locate(name, base)?;
                Ok(Some(base.join(relative)))
            }
            Source::Virtual { .. } => Ok(None),
        }
    }

    /// Source text, read on first use and cached until [`refetch_content`](Self::refetch_content).
    ///
    /// # Errors
    /// - `CorruptModule` if non-empty on-disk content lacks a trailing newline
    /// - `InvalidUtf8`, locator errors, VFS errors
    pub fn content(&self) -> Result<Rc<str>> {
        if let Source::Virtual { content, .. } = &self.0.source {
            return Ok(Rc::clone(content));
        }
        if let Some(content) = self.0.content.borrow().as_ref() {
            return Ok(Rc::clone(content));
        }
        self.refetch_content()
    }

    /// Re-read content from the filesystem, replacing the cached copy and
    /// dropping the cached header info
    pub fn refetch_content(&self) -> Result<Rc<str>> {
        let content = match &self.0.source {
            Source::Disk { name, base } => self.read_disk(name, base)?,
            Source::Virtual { content, .. } => Rc::clone(content),
        };
        *self.0.content.borrow_mut() = Some(Rc::clone(&content));
        *self.0.header.borrow_mut() = None;
        Ok(content)
    }

    fn read_disk(&self, name: &str, base: &Path) -> Result<Rc<str>> {
        let path = base.join(self.0.env.locator().locate(name, base)?);
        let bytes = self.0.env.fs.read_file(&path)?;
        trace!(target: "scriptcat::locate", name, bytes = bytes.len(), "read content");

        if bytes.is_empty() {
            return Ok(Rc::from(""));
        }
        if bytes.last() != Some(&b'\n') {
            let start = bytes.len().saturating_sub(100);
            return Err(ScriptError::CorruptModule {
                name: name.to_string(),
                tail: String::from_utf8_lossy(&bytes[start..]).into_owned(),
            });
        }
        let text = String::from_utf8(bytes).map_err(|_| ScriptError::InvalidUtf8 {
            name: name.to_string(),
        })?;
        Ok(Rc::from(text))
    }

    /// Imports, requires and dialect, parsed once per node
    pub fn header(&self) -> Result<Rc<HeaderInfo>> {
        if let Some(header) = self.0.header.borrow().as_ref() {
            return Ok(Rc::clone(header));
        }
        let content = self.content()?;
        let header = Rc::new(parse_header(&self.to_string(), &content)?);
        *self.0.header.borrow_mut() = Some(Rc::clone(&header));
        Ok(header)
    }

    pub fn is_symbol_dialect(&self) -> Result<bool> {
        Ok(self.header()?.is_symbol_dialect)
    }

    pub fn parent_name(&self) -> Option<&str> {
        self.name().and_then(parent_name)
    }

    /// Enclosing package, fetched through `cache`
    pub fn parent(&self, cache: &mut SharedCache) -> Option<Script> {
        let parent = self.parent_name()?;
        let base = self.base()?;
        Some(cache.get_or_insert_with(parent, || self.0.env.script(parent, base)))
    }

    /// Script named `name` under this script's base, fetched through `cache`
    fn sibling(&self, name: &str, cache: &mut SharedCache) -> Result<Script> {
        let base = self.base().ok_or_else(|| ScriptError::NoBasePath {
            name: name.to_string(),
        })?;
        Ok(cache.get_or_insert_with(name, || self.0.env.script(name, base)))
    }

    /// Direct dependencies, in emission-relevant order:
    /// parent, forced, imports, foundation module, requires.
    ///
    /// # Errors
    /// - `SymbolNotFound` if a required symbol has no provider in `index`
    /// - `MissingIndex` if a require is met and `index` is `None`
    /// - `NoBasePath` if a virtual script without base names a module
    pub fn dependencies(
        &self,
        cache: &mut SharedCache,
        index: Option<&DirectoryIndex>,
    ) -> Result<Vec<Script>> {
        let header = self.header()?;
        let mut deps = Vec::new();

        if !(header.is_symbol_dialect || self.is_foundation()) {
            if let Some(parent) = self.parent(cache) {
                deps.push(parent);
            }
        }

        deps.extend(self.forced_dependencies().iter().cloned());

        for name in &header.imports {
            deps.push(self.sibling(name, cache)?);
        }

        if header.is_symbol_dialect {
            let foundation = self.0.env.config.foundation_module.clone();
            deps.push(self.sibling(&foundation, cache)?);
        }

        for symbol in &header.requires {
            let index = index.ok_or_else(|| ScriptError::MissingIndex {
                requirer: self.to_string(),
                symbol: symbol.clone(),
            })?;
            let provider = index
                .lookup(symbol)
                .ok_or_else(|| ScriptError::SymbolNotFound {
                    requirer: self.to_string(),
                    symbol: symbol.clone(),
                })?;
            deps.push(self.sibling(provider, cache)?);
        }

        debug!(target: "scriptcat::resolve", node = %self, deps = deps.len(), "dependencies");
        Ok(deps)
    }

    /// Child modules and sub-packages of a package whose file name matches
    /// `pattern` (`*` and `?` wildcards). Empty for non-packages.
    ///
    /// Skips the package init file, names with more than one dot, non-module
    /// files and sub-directories lacking an init file.
    pub fn child_modules(&self, pattern: &str) -> Result<Vec<Script>> {
        let Source::Disk { name, base } = &self.0.source else {
            return Ok(Vec::new());
        };
        if !self.is_package() {
            return Ok(Vec::new());
        }

        let config = &self.0.env.config;
        let suffix = format!(".{}", config.extension);
        let dir: PathBuf = base.join(name.split('.').collect::<PathBuf>());
        let mut children = Vec::new();

        for entry in self.0.env.fs.read_dir(&dir)? {
            if !glob_match(pattern, &entry.name) {
                continue;
            }
            if !entry.is_dir && !entry.name.ends_with(&suffix) {
                continue;
            }
            if entry.name == config.package_init_file {
                continue;
            }
            if entry.name.matches('.').count() > 1 {
                continue;
            }
            if entry.is_dir
                && !self
                    .0
                    .env
                    .fs
                    .is_file(&dir.join(&entry.name).join(&config.package_init_file))
            {
                continue;
            }
            let stem = entry.name.split('.').next().unwrap_or_default();
            children.push(self.0.env.script(format!("{}.{}", name, stem), base.clone()));
        }
        Ok(children)
    }
}

/// Shell-style match supporting `*` and `?`
fn glob_match(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();
    let (mut p, mut n) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while n < name.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, n));
                p += 1;
            }
            Some(&c) if c == '?' || c == name[n] => {
                p += 1;
                n += 1;
            }
            _ => match backtrack {
                Some((star, matched)) => {
                    p = star + 1;
                    n = matched + 1;
                    backtrack = Some((star, matched + 1));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|&c| c == '*')
}

impl PartialEq for Script {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || self.identity() == other.identity()
    }
}

impl Eq for Script {}

impl Hash for Script {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.source {
            Source::Disk { name, .. } => f.write_str(name),
            Source::Virtual { .. } => f.write_str("<virtual script>"),
        }
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.source {
            Source::Disk { name, base } => {
                write!(f, "<Script {:?} in {:?}>", name, base.display().to_string())
            }
            Source::Virtual { content, .. } => {
                let head: String = content.chars().take(30).collect();
                write!(f, "<VirtualScript {:?}>", head)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scriptcat_vfs::MemoryFileSystem;
    use std::collections::HashSet;

    fn env_with(files: &[(&str, &str)]) -> ScriptEnv {
        let fs = MemoryFileSystem::with_files(files.iter().copied());
        ScriptEnv::new(Arc::new(fs), ResolverConfig::default())
    }

    fn names(scripts: &[Script]) -> Vec<String> {
        scripts.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_equality_uses_name_and_base() {
        let env = env_with(&[]);
        let a = env.script("p.mod1", "/one");
        let b = env.script("p.mod1", "/one");

        assert_eq!(a, b);
        assert_ne!(a, env.script("p.mod2", "/one"));
        assert_ne!(a, env.script("p.mod1", "/two"));

        let set: HashSet<Script> = [a.clone(), b, env.script("p.mod2", "/one")]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&a));
    }

    #[test]
    fn test_virtual_equality_uses_content_and_base() {
        let env = env_with(&[]);
        let a = env.virtual_script("x();\n", Some("/one".into()));

        assert_eq!(a, env.virtual_script("x();\n", Some("/one".into())));
        assert_ne!(a, env.virtual_script("y();\n", Some("/one".into())));
        assert_ne!(a, env.virtual_script("x();\n", None));
        assert_ne!(
            env.script("x", "/one"),
            env.virtual_script("x", Some("/one".into()))
        );
    }

    #[test]
    fn test_forced_deps_do_not_affect_identity() {
        let env = env_with(&[]);
        let dep = env.script("q", "/one");
        assert_eq!(
            env.virtual_with_deps("", None, vec![dep]),
            env.virtual_script("", None)
        );
    }

    #[test]
    fn test_empty_content_is_fine() {
        let env = env_with(&[("/d/amodule.js", "")]);
        assert_eq!(&*env.script("amodule", "/d").content().unwrap(), "");
    }

    #[test]
    fn test_missing_trailing_newline_is_corrupt() {
        let env = env_with(&[("/d/amodule.js", "//")]);
        let err = env.script("amodule", "/d").content().unwrap_err();
        assert_eq!(
            err,
            ScriptError::CorruptModule {
                name: "amodule".to_string(),
                tail: "//".to_string(),
            }
        );
    }

    #[test]
    fn test_corrupt_tail_is_last_hundred_bytes() {
        let body = "x".repeat(150);
        let env = env_with(&[("/d/big.js", body.as_str())]);
        match env.script("big", "/d").content().unwrap_err() {
            ScriptError::CorruptModule { tail, .. } => assert_eq!(tail.len(), 100),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_virtual_content_is_not_validated() {
        let env = env_with(&[]);
        assert_eq!(&*env.virtual_script("no newline", None).content().unwrap(), "no newline");
    }

    #[test]
    fn test_content_cached_until_refetch() {
        let fs = MemoryFileSystem::with_files([("/d/m.js", "one\n")]);
        let env = ScriptEnv::new(Arc::new(fs.clone()), ResolverConfig::default());
        let script = env.script("m", "/d");

        assert_eq!(&*script.content().unwrap(), "one\n");
        fs.write_file(Path::new("/d/m.js"), b"// import q\n").unwrap();
        assert_eq!(&*script.content().unwrap(), "one\n");
        assert!(script.header().unwrap().imports.is_empty());

        assert_eq!(&*script.refetch_content().unwrap(), "// import q\n");
        assert_eq!(script.header().unwrap().imports, vec!["q"]);
    }

    #[test]
    fn test_filenames() {
        let env = env_with(&[("/d/p/__init__.js", "\n"), ("/d/p/mod1.js", "\n")]);

        assert_eq!(
            env.script("p", "/d").filename().unwrap(),
            Some(PathBuf::from("p/__init__.js"))
        );
        assert_eq!(
            env.script("p.mod1", "/d").absolute_filename().unwrap(),
            Some(PathBuf::from("/d/p/mod1.js"))
        );
        assert_eq!(env.virtual_script("", None).filename().unwrap(), None);
    }

    #[test]
    fn test_parent() {
        let env = env_with(&[]);
        let mut cache = SharedCache::new();

        let child = env.script("a.b.c", "/d");
        let parent = child.parent(&mut cache).unwrap();
        assert_eq!(parent, env.script("a.b", "/d"));
        assert!(env.script("a", "/d").parent(&mut cache).is_none());
        assert!(env.virtual_script("", Some("/d".into())).parent(&mut cache).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_dependencies_imports_and_parent() {
        let env = env_with(&[
            ("/d/p/__init__.js", "\n"),
            ("/d/p/sub/__init__.js", "// import q\n"),
            ("/d/p/sub/noimportlines.js", "x();\n"),
            ("/d/q.js", "\n"),
        ]);
        let mut cache = SharedCache::new();

        let deps = env.script("p.sub.noimportlines", "/d").dependencies(&mut cache, None).unwrap();
        assert_eq!(names(&deps), vec!["p.sub"]);

        let deps = env.script("p.sub", "/d").dependencies(&mut cache, None).unwrap();
        assert_eq!(names(&deps), vec!["p", "q"]);
    }

    #[test]
    fn test_dependencies_symbol_dialect() {
        let fs = MemoryFileSystem::with_files([
            ("/d/goog/base.js", "var goog = {};\n"),
            ("/d/q.js", "\n"),
            ("/d/lib/r.js", "goog.provide('lib.r');\n"),
            (
                "/d/app/closure_style.js",
                "goog.provide('app.cs');\n// import q\ngoog.require('lib.r');\n",
            ),
        ]);
        let fs: Arc<dyn VirtualFileSystem> = Arc::new(fs);
        let env = ScriptEnv::new(Arc::clone(&fs), ResolverConfig::default());
        let index = DirectoryIndex::scan(fs, "/d", ResolverConfig::default()).unwrap();
        let mut cache = SharedCache::new();

        let deps = env
            .script("app.closure_style", "/d")
            .dependencies(&mut cache, Some(&index))
            .unwrap();
        // no parent for symbol-dialect modules
        assert_eq!(names(&deps), vec!["q", "goog.base", "lib.r"]);

        let deps = env.script("goog.base", "/d").dependencies(&mut cache, Some(&index)).unwrap();
        assert!(deps.is_empty());
    }

    #[test]
    fn test_require_without_index() {
        let env = env_with(&[("/d/m.js", "goog.require('x');\n")]);
        let err = env.script("m", "/d").dependencies(&mut SharedCache::new(), None).unwrap_err();
        assert!(matches!(err, ScriptError::MissingIndex { .. }));
    }

    #[test]
    fn test_require_unknown_symbol() {
        let fs: Arc<dyn VirtualFileSystem> =
            Arc::new(MemoryFileSystem::with_files([("/d/m.js", "goog.require('x');\n")]));
        let env = ScriptEnv::new(Arc::clone(&fs), ResolverConfig::default());
        let index = DirectoryIndex::scan(fs, "/d", ResolverConfig::default()).unwrap();

        let err = env
            .script("m", "/d")
            .dependencies(&mut SharedCache::new(), Some(&index))
            .unwrap_err();
        assert_eq!(
            err,
            ScriptError::SymbolNotFound {
                requirer: "m".to_string(),
                symbol: "x".to_string(),
            }
        );
    }

    #[test]
    fn test_virtual_dependencies() {
        let env = env_with(&[("/d/p/__init__.js", "\n"), ("/d/p/mod1.js", "\n")]);
        let forced = env.script("p", "/d");
        let script = env.virtual_with_deps("// import p.mod1\nx+4;\n", Some("/d".into()), vec![forced]);

        let deps = script.dependencies(&mut SharedCache::new(), None).unwrap();
        assert_eq!(names(&deps), vec!["p", "p.mod1"]);
    }

    #[test]
    fn test_virtual_without_base_cannot_import() {
        let env = env_with(&[]);
        let err = env
            .virtual_script("// import p.mod1\n", None)
            .dependencies(&mut SharedCache::new(), None)
            .unwrap_err();
        assert!(matches!(err, ScriptError::NoBasePath { .. }));
    }

    #[test]
    fn test_child_modules() {
        let env = env_with(&[
            ("/d/p/__init__.js", "\n"),
            ("/d/p/child1.js", "\n"),
            ("/d/p/child2.js", "\n"),
            ("/d/p/child2.old.js", "\n"),
            ("/d/p/notes.txt", "\n"),
            ("/d/p/sub/__init__.js", "\n"),
            ("/d/p/noinit/x.js", "\n"),
            ("/d/p/TestThing.js", "\n"),
        ]);
        let package = env.script("p", "/d");

        assert_eq!(
            names(&package.child_modules("*").unwrap()),
            vec!["p.TestThing", "p.child1", "p.child2", "p.sub"]
        );
        assert_eq!(names(&package.child_modules("Test*").unwrap()), vec!["p.TestThing"]);
        assert_eq!(names(&package.child_modules("child?.js").unwrap()), vec!["p.child1", "p.child2"]);
        assert!(env.script("p.child1", "/d").child_modules("*").unwrap().is_empty());
    }

    #[test]
    fn test_glob_match() {
        assert!(glob_match("*", "anything.js"));
        assert!(glob_match("Test*", "TestFoo.js"));
        assert!(!glob_match("Test*", "MyTest.js"));
        assert!(glob_match("*.js", "a.b.js"));
        assert!(glob_match("a?c", "abc"));
        assert!(!glob_match("a?c", "ac"));
        assert!(glob_match("*b*d", "abcabd"));
    }

    #[test]
    fn test_debug_format() {
        let env = env_with(&[]);
        assert_eq!(
            format!("{:?}", env.script("p.mod1", "/base")),
            "<Script \"p.mod1\" in \"/base\">"
        );
        assert_eq!(
            format!("{:?}", env.virtual_script("x+4;\n", None)),
            "<VirtualScript \"x+4;\\n\">"
        );
    }
}

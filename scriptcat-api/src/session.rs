//! Build session
//!
//! Owns what a long-lived service keeps between requests: the filesystem,
//! the optional symbol index and the shared script cache.

use scriptcat_config::ResolverConfig;
use scriptcat_core::{
    DependencyResolver, DirectoryIndex, RenderOptions, Renderer, Script, ScriptEnv, ScriptError,
    SharedCache,
};
use scriptcat_vfs::VirtualFileSystem;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::config::BuildConfig;
use crate::error::{ApiError, Result};
use crate::types::BuildOutput;

pub struct Session {
    env: ScriptEnv,
    base: PathBuf,
    index: Option<DirectoryIndex>,
    cache: SharedCache,
    renderer: Renderer,
}

impl Session {
    pub fn new(fs: Arc<dyn VirtualFileSystem>, base: impl Into<PathBuf>, config: ResolverConfig) -> Self {
        Self {
            env: ScriptEnv::new(fs, config),
            base: base.into(),
            index: None,
            cache: SharedCache::new(),
            renderer: Renderer::default(),
        }
    }

    /// Session set up from a project file
    pub fn from_config(fs: Arc<dyn VirtualFileSystem>, config: &BuildConfig) -> Result<Self> {
        let session = Self::new(fs, config.base.clone(), config.resolver.clone())
            .with_renderer(Renderer::new(config.render.clone(), config.template.clone()));
        if config.symbols {
            session.with_symbol_index()
        } else {
            Ok(session)
        }
    }

    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Scan the base directory so symbol-dialect requires can be resolved
    pub fn with_symbol_index(mut self) -> Result<Self> {
        let index = DirectoryIndex::scan(
            self.env.shared_fs(),
            self.base.clone(),
            self.env.config().clone(),
        )?;
        self.index = Some(index);
        Ok(self)
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn index(&self) -> Option<&DirectoryIndex> {
        self.index.as_ref()
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Rebuild the symbol index and forget cached scripts.
    ///
    /// Without an index only the cache is cleared.
    pub fn rescan(&mut self) -> Result<()> {
        if let Some(index) = self.index.as_mut() {
            index.rescan()?;
        }
        self.cache.clear();
        Ok(())
    }

    /// On-disk module under the session base, shared through the session cache
    /// so a root another root imports is one node, read once.
    pub fn script(&mut self, name: &str) -> Script {
        let (env, base) = (&self.env, &self.base);
        self.cache.get_or_insert_with(name, || env.script(name, base.clone()))
    }

    /// In-memory script whose imports resolve under the session base
    pub fn virtual_script(&self, content: impl Into<String>) -> Script {
        self.env.virtual_script(content, Some(self.base.clone()))
    }

    /// Resolve `roots` together, dependencies first.
    ///
    /// A missing symbol triggers one rescan and one retry, since the file
    /// providing it may have been added after the index was built.
    #[instrument(target = "scriptcat::resolve", skip_all, fields(roots = roots.len()))]
    pub fn resolve(&mut self, roots: &[Script]) -> Result<Vec<Script>> {
        match self.resolve_once(roots) {
            Err(ScriptError::SymbolNotFound { requirer, symbol }) if self.index.is_some() => {
                warn!(target: "scriptcat::resolve", %requirer, %symbol, "symbol not found, rescanning");
                self.rescan()?;
                Ok(self.resolve_once(roots)?)
            }
            other => Ok(other?),
        }
    }

    fn resolve_once(&mut self, roots: &[Script]) -> std::result::Result<Vec<Script>, ScriptError> {
        DependencyResolver::new(self.index.as_ref()).resolve_many(roots, Some(&mut self.cache))
    }

    /// Resolve modules given by dotted name
    pub fn resolve_names<S: AsRef<str>>(&mut self, names: &[S]) -> Result<Vec<Script>> {
        let roots: Vec<Script> = names
            .iter()
            .map(|name| self.script(name.as_ref()))
            .collect();
        self.resolve(&roots)
    }

    /// Resolve `roots` and concatenate everything they need
    pub fn build(&mut self, roots: &[Script], options: RenderOptions<'_>) -> Result<BuildOutput> {
        if roots.is_empty() {
            return Err(ApiError::NothingToBuild);
        }
        let scripts = self.resolve(roots)?;
        let text = self.renderer.mega_script(&scripts, options)?;
        info!(target: "scriptcat::render", scripts = scripts.len(), bytes = text.len(), "build complete");
        Ok(BuildOutput {
            text,
            roots: roots.iter().map(ToString::to_string).collect(),
            scripts: scripts.iter().map(ToString::to_string).collect(),
        })
    }

    /// Roots a project file names: modules by name, then inline content
    pub fn config_roots(&mut self, config: &BuildConfig) -> Vec<Script> {
        let mut roots: Vec<Script> = config.roots.iter().map(|name| self.script(name)).collect();
        if let Some(content) = &config.content {
            roots.push(self.virtual_script(content.clone()));
        }
        roots
    }

    /// Build what a project file describes
    pub fn build_config(&mut self, config: &BuildConfig) -> Result<BuildOutput> {
        let roots = self.config_roots(config);
        self.build(
            &roots,
            RenderOptions {
                wrap: config.wrap,
                dictionary: &config.defines,
            },
        )
    }

    /// Absolute paths of every module `content` needs, in load order
    pub fn dependency_files_for_content(&mut self, content: &str) -> Result<Vec<PathBuf>> {
        let root = self.virtual_script(content);
        let scripts = self.resolve(std::slice::from_ref(&root))?;
        let mut files = Vec::with_capacity(scripts.len());
        for script in &scripts {
            if let Some(path) = script.absolute_filename()? {
                files.push(path);
            }
        }
        Ok(files)
    }

    /// Like [`dependency_files_for_content`](Self::dependency_files_for_content)
    /// for the file at `path`, which comes last. The file need not live under
    /// the session base.
    pub fn dependency_files_for_file(&mut self, path: &Path) -> Result<Vec<PathBuf>> {
        let bytes = self.env.fs().read_file(path).map_err(ScriptError::from)?;
        let content = String::from_utf8(bytes).map_err(|_| ScriptError::InvalidUtf8 {
            name: path.display().to_string(),
        })?;
        let mut files = self.dependency_files_for_content(&content)?;
        files.push(path.to_path_buf());
        Ok(files)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base", &self.base)
            .field("index", &self.index)
            .field("cached", &self.cache.len())
            .finish()
    }
}

//! Project file (`scriptcat.json`)

use scriptcat_config::{RenderConfig, ResolverConfig, TemplateConfig};
use scriptcat_core::TemplateVars;
use scriptcat_vfs::VirtualFileSystem;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ApiError, Result};

/// Everything needed to produce one concatenated script.
///
/// Every field is optional in JSON:
///
/// ```json
/// {
///   "base": "js",
///   "roots": ["app.main"],
///   "wrap": true,
///   "defines": { "_debugMode": false, "level": 2 },
///   "template": { "statement_prefix": "//]" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Directory dotted module names resolve against
    pub base: PathBuf,
    /// Root modules, by dotted name
    pub roots: Vec<String>,
    /// Inline source resolved as a virtual root after `roots`
    pub content: Option<String>,
    /// Wrap the output in a function scope
    pub wrap: bool,
    /// Template dictionary
    pub defines: TemplateVars,
    /// Scan `base` for provide lines so requires can be resolved
    pub symbols: bool,
    pub resolver: ResolverConfig,
    pub template: TemplateConfig,
    pub render: RenderConfig,
    /// Write output here instead of stdout
    pub output: Option<PathBuf>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            base: PathBuf::from("."),
            roots: Vec::new(),
            content: None,
            wrap: false,
            defines: TemplateVars::new(),
            symbols: false,
            resolver: ResolverConfig::default(),
            template: TemplateConfig::default(),
            render: RenderConfig::default(),
            output: None,
        }
    }
}

impl BuildConfig {
    pub fn from_json(path: &Path, json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ApiError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read a project file; a missing file yields the defaults
    pub fn load(fs: &dyn VirtualFileSystem, path: &Path) -> Result<Self> {
        if !fs.is_file(path) {
            return Ok(Self::default());
        }
        let bytes = fs.read_file(path).map_err(|e| ApiError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let json = String::from_utf8_lossy(&bytes);
        Self::from_json(path, &json)
    }
}

//! Scriptcat Config - Pure configuration data structures
//!
//! This crate contains only data structures, no logic or global state.
//! It serves as the shared configuration vocabulary across all Scriptcat crates.

use serde::{Deserialize, Serialize};

/// How dotted module names map onto the filesystem and how headers are scanned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// File inside a package directory that supplies the package's own content
    pub package_init_file: String,
    /// Extension of module files, without the dot
    pub extension: String,
    /// Lines scanned past the last provide line before the index gives up on a file
    pub provide_scan_window: usize,
    /// Module every symbol-dialect module implicitly depends on
    pub foundation_module: String,
}

/// Delimiters of the macro preprocessor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Prefix marking a statement line (`//] if x`)
    pub statement_prefix: String,
    /// Opens a variable interpolation
    pub variable_start: String,
    /// Closes a variable interpolation
    pub variable_end: String,
}

/// Configuration for concatenated output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Name the isolation wrapper binds the global object to
    pub global_name: String,
    /// Dictionary key set to true/false depending on whether output is wrapped
    pub wrapped_flag: String,
}

/// Pipeline phase, used for per-phase log targets
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Locate,
    Index,
    Header,
    Resolve,
    Render,
}

impl Phase {
    /// All phases, in pipeline order
    pub const ALL: [Phase; 5] = [
        Phase::Locate,
        Phase::Index,
        Phase::Header,
        Phase::Resolve,
        Phase::Render,
    ];

    /// Get the string name of the phase
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Locate => "locate",
            Phase::Index => "index",
            Phase::Header => "header",
            Phase::Resolve => "resolve",
            Phase::Render => "render",
        }
    }

    /// Get the log target name for this phase
    pub fn target(&self) -> String {
        format!("scriptcat::{}", self.as_str())
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            package_init_file: "__init__.js".to_string(),
            extension: "js".to_string(),
            provide_scan_window: 100,
            foundation_module: "goog.base".to_string(),
        }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            statement_prefix: "//]".to_string(),
            variable_start: "/***/".to_string(),
            variable_end: "//".to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            global_name: "window".to_string(),
            wrapped_flag: "_wasWrapped".to_string(),
        }
    }
}

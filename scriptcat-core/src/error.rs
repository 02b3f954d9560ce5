//! Core error types

use scriptcat_vfs::VfsError;
use std::path::PathBuf;
use thiserror::Error;

use crate::template::TemplateError;

pub type Result<T> = std::result::Result<T, ScriptError>;

/// Everything that can go wrong while locating, indexing, resolving or
/// rendering scripts. All variants are fatal to the operation that raised them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    #[error("tried to find module '{name}' but no such file '{path}'")]
    ModuleNotFound { name: String, path: PathBuf },

    #[error("directory for package '{name}' exists but is missing '{path}'")]
    PackageMissingInitFile { name: String, path: PathBuf },

    #[error("module '{name}' must end with a newline; last bytes were {tail:?}")]
    CorruptModule { name: String, tail: String },

    #[error("module '{name}' is not valid UTF-8")]
    InvalidUtf8 { name: String },

    #[error("circular dependency in the imports of {node}: {}", .chain.join(" → "))]
    CircularDependency { node: String, chain: Vec<String> },

    #[error("symbol '{symbol}' is provided by both '{existing}' and '{file}'")]
    SymbolConflict {
        symbol: String,
        existing: String,
        file: PathBuf,
    },

    #[error("{requirer} requires '{symbol}' but nobody provides it")]
    SymbolNotFound { requirer: String, symbol: String },

    #[error("{requirer} requires '{symbol}' but no directory index was supplied")]
    MissingIndex { requirer: String, symbol: String },

    #[error("virtual script has no base directory, cannot resolve '{name}'")]
    NoBasePath { name: String },

    #[error("malformed call in {origin}: {line}")]
    MalformedCall { origin: String, line: String },

    #[error("invalid mount point {mount:?}: {reason}")]
    InvalidMountPoint { mount: String, reason: &'static str },

    #[error("template error in {origin}: {source}")]
    Template {
        origin: String,
        #[source]
        source: TemplateError,
    },

    #[error(transparent)]
    Vfs(#[from] VfsError),
}

impl ScriptError {
    /// Short machine-readable name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            ScriptError::ModuleNotFound { .. } => "ModuleNotFound",
            ScriptError::PackageMissingInitFile { .. } => "PackageMissingInitFile",
            ScriptError::CorruptModule { .. } => "CorruptModule",
            ScriptError::InvalidUtf8 { .. } => "InvalidUtf8",
            ScriptError::CircularDependency { .. } => "CircularDependency",
            ScriptError::SymbolConflict { .. } => "SymbolConflict",
            ScriptError::SymbolNotFound { .. } => "SymbolNotFound",
            ScriptError::MissingIndex { .. } => "MissingIndex",
            ScriptError::NoBasePath { .. } => "NoBasePath",
            ScriptError::MalformedCall { .. } => "MalformedCall",
            ScriptError::InvalidMountPoint { .. } => "InvalidMountPoint",
            ScriptError::Template { .. } => "Template",
            ScriptError::Vfs(_) => "Vfs",
        }
    }
}

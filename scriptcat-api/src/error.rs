//! API error type and structured error reports

use scriptcat_config::Phase;
use scriptcat_core::ScriptError;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// Project file could not be read or parsed
    #[error("cannot load config {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("nothing to build: no root modules and no inline content")]
    NothingToBuild,
}

impl ApiError {
    /// Pipeline phase the error belongs to, `None` for non-pipeline errors
    pub fn phase(&self) -> Option<Phase> {
        let ApiError::Script(error) = self else {
            return None;
        };
        match error {
            ScriptError::ModuleNotFound { .. }
            | ScriptError::PackageMissingInitFile { .. }
            | ScriptError::CorruptModule { .. }
            | ScriptError::InvalidUtf8 { .. }
            | ScriptError::NoBasePath { .. } => Some(Phase::Locate),
            ScriptError::SymbolConflict { .. } => Some(Phase::Index),
            ScriptError::MalformedCall { .. } => Some(Phase::Header),
            ScriptError::CircularDependency { .. }
            | ScriptError::SymbolNotFound { .. }
            | ScriptError::MissingIndex { .. } => Some(Phase::Resolve),
            ScriptError::InvalidMountPoint { .. } | ScriptError::Template { .. } => {
                Some(Phase::Render)
            }
            ScriptError::Vfs(_) => None,
        }
    }

    /// Convert to a structured report.
    ///
    /// Suited to outer layers that show diagnostics instead of failing:
    /// the CLI prints it, a server can serialise it to JSON.
    pub fn to_report(&self) -> ErrorReport {
        let phase = match (self.phase(), self) {
            (Some(phase), _) => phase.as_str(),
            (None, ApiError::Script(ScriptError::Vfs(_))) => "vfs",
            (None, _) => "config",
        };
        let kind = match self {
            ApiError::Script(error) => error.kind(),
            ApiError::Config { .. } => "Config",
            ApiError::NothingToBuild => "NothingToBuild",
        };
        ErrorReport {
            phase,
            kind,
            message: self.to_string(),
        }
    }
}

/// Structured error report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    /// locate, index, header, resolve, render, vfs or config
    pub phase: &'static str,
    /// Error variant name, for programmatic handling
    pub kind: &'static str,
    /// Human-readable message
    pub message: String,
}

impl ErrorReport {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{{\"message\":{:?}}}", self.message))
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.phase, self.kind, self.message)
    }
}

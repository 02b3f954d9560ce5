//! API output types

use serde::Serialize;

/// Result of a build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildOutput {
    /// Concatenated JavaScript
    pub text: String,
    /// Root modules as requested
    pub roots: Vec<String>,
    /// Every script included, in output order
    pub scripts: Vec<String>,
}

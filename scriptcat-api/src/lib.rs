//! Scriptcat API - build orchestration layer
//!
//! Provides:
//! - [`Session`]: index, shared cache and the rescan-and-retry policy
//! - [`BuildConfig`]: project files
//! - [`ApiError`] and [`ErrorReport`] for diagnostics
//! - test-module discovery for generated test-runner pages

pub mod config;
pub mod error;
pub mod session;
pub mod testing;
pub mod types;

pub use config::BuildConfig;
pub use error::{ApiError, ErrorReport, Result};
pub use session::Session;
pub use testing::{discover_test_modules, module_list_json, DEFAULT_TEST_PATTERN};
pub use types::BuildOutput;

// Re-export the layers below so callers need only this crate
pub use scriptcat_config;
pub use scriptcat_config::{Phase, RenderConfig, ResolverConfig, TemplateConfig};
pub use scriptcat_core::{RenderOptions, Renderer, Script, ScriptError, TemplateValue, TemplateVars};
pub use scriptcat_vfs;

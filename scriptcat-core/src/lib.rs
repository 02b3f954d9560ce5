//! Scriptcat core
//!
//! Locates JavaScript modules by dotted name, reads their import/require
//! headers, orders them so dependencies come first, and concatenates them.
//!
//! ```text
//! ScriptEnv ──► Script ──► DependencyResolver ──► Renderer
//!                 │               │
//!           ModuleLocator   DirectoryIndex (goog.provide symbols)
//! ```

pub mod cache;
pub mod error;
pub mod header;
pub mod html;
pub mod index;
pub mod locator;
pub mod node;
pub mod render;
pub mod resolver;
pub mod template;

pub use cache::SharedCache;
pub use error::{Result, ScriptError};
pub use header::{parse_header, HeaderInfo};
pub use html::cache_breaker;
pub use index::DirectoryIndex;
pub use locator::ModuleLocator;
pub use node::{Script, ScriptEnv};
pub use render::{RenderOptions, Renderer};
pub use resolver::{linearize, DependencyResolver};
pub use template::{TemplateError, TemplateValue, TemplateVars};

//! VFS Middleware System
//!
//! Composable layers around a backend file system. Each layer declares a
//! [`Stage`]; [`VfsBuilder`] orders them and yields a [`LayeredVFS`].

mod builder;
mod layered;
mod middleware;

pub use builder::VfsBuilder;
pub use layered::LayeredVFS;
pub use middleware::{Middleware, Next, Stage};

pub mod counting;
pub mod logged;

pub use counting::CountingLayer;
pub use logged::LoggedLayer;

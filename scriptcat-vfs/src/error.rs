//! VFS error types

use thiserror::Error;

pub type VfsResult<T> = Result<T, VfsError>;

/// Paths are kept as normalised strings so errors stay `Clone + PartialEq`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VfsError {
    #[error("no such file or directory: {path}")]
    NotFound { path: String },

    #[error("not a directory: {path}")]
    NotADirectory { path: String },

    /// A file where a directory is wanted, or the reverse
    #[error("already exists as another kind: {path}")]
    AlreadyExists { path: String },

    #[error("i/o error on {path}: {message}")]
    Io { path: String, message: String },

    /// In-memory tree lock was poisoned by a panicking writer
    #[error("file tree lock poisoned")]
    Poisoned,
}

impl VfsError {
    /// Map an `io::Error` for `path`, keeping not-found distinguishable
    pub fn from_io(path: &std::path::Path, err: std::io::Error) -> Self {
        let path = path.to_string_lossy().into_owned();
        match err.kind() {
            std::io::ErrorKind::NotFound => VfsError::NotFound { path },
            _ => VfsError::Io {
                path,
                message: err.to_string(),
            },
        }
    }
}

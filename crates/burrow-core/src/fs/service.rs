//! The File System Service boundary.
//!
//! Everything Burrow knows about storage goes through [`FileSystemService`].
//! The trait is object-safe so a session can hold it as
//! `Arc<dyn FileSystemService>` and swap a local, remote or in-memory
//! implementation without touching the orchestration code.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::fs::snapshot::ListingSnapshot;

/// A failure reported by the File System Service.
///
/// Each variant carries the offending path when there is one, so the
/// orchestration layer can surface it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The target path does not exist.
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    /// The service lacks permission to access the path.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// A directory was expected but the path points to something else.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The operation would overwrite an existing entry.
    #[error("already exists: {0}")]
    AlreadyExists(PathBuf),

    /// Any other failure tied to a path.
    #[error("{path}: {message}")]
    Failed { path: PathBuf, message: String },

    /// The service could not answer at all (no path involved).
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl ServiceError {
    /// Maps an I/O error on `path` to the closest variant.
    pub fn from_io(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            std::io::ErrorKind::AlreadyExists => Self::AlreadyExists(path.to_path_buf()),
            _ => Self::Failed {
                path: path.to_path_buf(),
                message: err.to_string(),
            },
        }
    }

    /// Returns the path the failure refers to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::NotADirectory(p)
            | Self::AlreadyExists(p) => Some(p),
            Self::Failed { path, .. } => Some(path),
            Self::Unavailable(_) => None,
        }
    }
}

/// Result alias for service calls.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Asynchronous, fallible request/response interface to a file system.
///
/// Implementations decide how entries are stored; the orchestration layer
/// only relies on the contract documented on each method.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileSystemService: Send + Sync {
    /// Resolves the user's home directory.
    async fn resolve_home(&self) -> ServiceResult<PathBuf>;

    /// Resolves the process's current directory.
    async fn resolve_current(&self) -> ServiceResult<PathBuf>;

    /// Lists the immediate children of `path`, in service order.
    async fn list(&self, path: &Path) -> ServiceResult<ListingSnapshot>;

    /// Creates an empty folder named `name` inside `parent`.
    async fn create_folder(&self, parent: &Path, name: &str) -> ServiceResult<()>;

    /// Creates an empty file named `name` inside `parent`.
    async fn create_file(&self, parent: &Path, name: &str) -> ServiceResult<()>;

    /// Deletes the entry at `path` (folders recursively).
    async fn delete(&self, path: &Path) -> ServiceResult<()>;

    /// Renames the entry at `path` to `new_name`, keeping its parent.
    async fn rename(&self, path: &Path, new_name: &str) -> ServiceResult<()>;

    /// Copies `sources`, in order, into the `destination` folder.
    async fn copy(&self, sources: &[PathBuf], destination: &Path) -> ServiceResult<()>;

    /// Moves `sources`, in order, into the `destination` folder.
    async fn move_entries(&self, sources: &[PathBuf], destination: &Path) -> ServiceResult<()>;
}

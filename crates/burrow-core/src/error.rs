//! Error types for `burrow-core`.
//!
//! All fallible operations in the core library return [`CoreResult<T>`],
//! which is an alias for `Result<T, CoreError>`. Every variant renders as a
//! single human-readable line so the presentation can show it directly.

use std::path::PathBuf;

use crate::clipboard::ClipboardMode;
use crate::fs::service::ServiceError;

/// Unified error type for all core operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Neither the preferred nor the fallback starting directory could be
    /// determined.
    #[error("cannot resolve a starting directory: {0}")]
    Resolution(ServiceError),

    /// Listing a directory failed; the current location is unchanged.
    #[error("cannot open {path}: {cause}")]
    Navigation { path: PathBuf, cause: ServiceError },

    /// An operation needs a current directory before any was opened.
    #[error("no directory has been opened yet")]
    NotStarted,

    /// Back was requested with nothing before the history cursor.
    #[error("no earlier location in history")]
    NoHistory,

    /// A file or folder name is empty after trimming.
    #[error("invalid name: {0:?}")]
    InvalidName(String),

    /// A bulk operation was requested with no targets.
    #[error("no items given")]
    EmptyTarget,

    /// Cut or copy was requested with nothing selected.
    #[error("nothing selected to cut or copy")]
    EmptyStage,

    /// The File System Service rejected a single operation.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// A multi-item delete stopped at the first failure.
    #[error(
        "deleted {} item(s) before failing on {failed}: {cause}",
        .succeeded.len()
    )]
    PartialDelete {
        succeeded: Vec<PathBuf>,
        failed: PathBuf,
        cause: ServiceError,
    },

    /// A paste failed; the clipboard stage is unchanged.
    #[error("{mode} paste failed: {cause}")]
    ClipboardOperation {
        mode: ClipboardMode,
        cause: ServiceError,
    },

    /// Paste was requested while the clipboard is empty.
    #[error("clipboard is empty")]
    NothingStaged,

    /// The configuration file does not exist.
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    /// The configuration file is not readable.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Failed to parse a TOML configuration file.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// An I/O error that doesn't fit a more specific variant.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout `burrow-core`.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_displays_path_and_cause() {
        let err = CoreError::Navigation {
            path: PathBuf::from("/missing"),
            cause: ServiceError::NotFound(PathBuf::from("/missing")),
        };
        assert_eq!(
            err.to_string(),
            "cannot open /missing: path not found: /missing"
        );
    }

    #[test]
    fn resolution_displays_cause() {
        let err = CoreError::Resolution(ServiceError::Unavailable("HOME is not set".into()));
        assert_eq!(
            err.to_string(),
            "cannot resolve a starting directory: service unavailable: HOME is not set"
        );
    }

    #[test]
    fn partial_delete_counts_successes() {
        let err = CoreError::PartialDelete {
            succeeded: vec![PathBuf::from("/a"), PathBuf::from("/b")],
            failed: PathBuf::from("/c"),
            cause: ServiceError::PermissionDenied(PathBuf::from("/c")),
        };
        assert_eq!(
            err.to_string(),
            "deleted 2 item(s) before failing on /c: permission denied: /c"
        );
    }

    #[test]
    fn clipboard_operation_names_mode() {
        let err = CoreError::ClipboardOperation {
            mode: ClipboardMode::Cut,
            cause: ServiceError::AlreadyExists(PathBuf::from("/dst/a")),
        };
        assert_eq!(err.to_string(), "cut paste failed: already exists: /dst/a");
    }

    #[test]
    fn invalid_name_quotes_input() {
        let err = CoreError::InvalidName("   ".to_string());
        assert_eq!(err.to_string(), "invalid name: \"   \"");
    }

    #[test]
    fn service_error_is_transparent() {
        let err: CoreError = ServiceError::NotFound(PathBuf::from("/x")).into();
        assert!(matches!(err, CoreError::Service(_)));
        assert_eq!(err.to_string(), "path not found: /x");
    }

    #[test]
    fn io_error_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let core_err: CoreError = io_err.into();
        assert!(matches!(core_err, CoreError::Io(_)));
        assert!(core_err.to_string().contains("gone"));
    }

    #[test]
    fn advisory_errors_display() {
        assert_eq!(
            CoreError::NoHistory.to_string(),
            "no earlier location in history"
        );
        assert_eq!(CoreError::NothingStaged.to_string(), "clipboard is empty");
        assert_eq!(CoreError::EmptyTarget.to_string(), "no items given");
    }
}

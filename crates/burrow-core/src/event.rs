//! Command and event types between a front end and a [`BrowserSession`].
//!
//! The front end translates user input into [`Command`]s, which the session
//! executes and answers with [`Event`]s. This keeps any frontend (the CLI,
//! a future GUI) driving the same core logic.
//!
//! [`BrowserSession`]: crate::session::BrowserSession

use std::path::PathBuf;

use crate::clipboard::ClipboardMode;
use crate::fs::snapshot::ListingSnapshot;

/// A mutation the front end asks the session to perform.
///
/// Commands flow **front end → core**. The core never creates commands itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open the directory at the given path, recording it in history.
    Navigate(PathBuf),
    /// Step back in history.
    GoBack,
    /// Open the home directory.
    GoHome,
    /// Re-list the current directory.
    Refresh,
    Select(PathBuf),
    Deselect(PathBuf),
    /// Select everything, or nothing if everything already is.
    ToggleAll,
    ClearSelection,
    /// Stage the selection for copying.
    Copy,
    /// Stage the selection for moving.
    Cut,
    /// Paste the stage into the current directory.
    Paste,
    /// Delete every selected entry.
    DeleteSelected,
    /// Delete the listed paths, in order.
    Delete(Vec<PathBuf>),
    /// Rename a file or folder.
    Rename(PathBuf, String),
    /// Create a folder with the given name in the current directory.
    CreateFolder(String),
    /// Create an empty file with the given name in the current directory.
    CreateFile(String),
}

/// A notification the session sends back to the front end.
///
/// Events flow **core → front end**; the front end re-renders from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A new snapshot replaced the current one.
    DirectoryLoaded(ListingSnapshot),
    /// The number of selected entries changed.
    SelectionChanged { count: usize },
    /// The clipboard was staged, consumed, or cleared.
    ClipboardChanged {
        /// `None` when the clipboard is idle.
        mode: Option<ClipboardMode>,
        items: usize,
    },
    /// A file operation completed successfully.
    OperationComplete {
        /// Human-readable description of the operation.
        operation: String,
    },
    /// A file operation failed.
    OperationFailed {
        /// Human-readable description of the operation.
        operation: String,
        /// The error message.
        error: String,
    },
}

//! Burrow core library: UI-agnostic file-browsing orchestration.
//!
//! `burrow-core` tracks where the user is, what is selected, and what is
//! staged for cut/copy, and sequences mutating operations against an
//! asynchronous [`FileSystemService`]. Any frontend (the `burrow` CLI, a
//! future GUI) drives it through a [`BrowserSession`].
//!
//! # Modules
//!
//! - [`fs`] — Listing value types, the service trait, and the local-disk service.
//! - [`nav`] — Navigation: the [`PathNavigator`], history, and selection.
//! - [`clipboard`] — The cut/copy stage ([`ClipboardCoordinator`]).
//! - [`dispatch`] — Create/delete/rename/paste and the refresh that follows.
//! - [`session`] — [`BrowserSession`], the surface a frontend drives.
//! - [`event`] — Command and event types for frontend ↔ core communication.
//! - [`activity`] — The "operation in flight" indicator.
//! - [`config`] — User-facing configuration (TOML).
//! - [`error`] — Unified error type ([`CoreError`]) and result alias ([`CoreResult`]).

pub mod activity;
pub mod clipboard;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod fs;
pub mod nav;
pub mod session;

#[cfg(test)]
mod testing;

pub use activity::{Activity, ActivityGuard};
pub use clipboard::{ClipboardCoordinator, ClipboardMode, ClipboardStage, PasteOutcome, StagedItems};
pub use config::settings::Config;
pub use dispatch::OperationDispatcher;
pub use error::{CoreError, CoreResult};
pub use event::{Command, Event};
pub use fs::entry::{EntryKind, EntryRef};
pub use fs::local::LocalFileSystem;
pub use fs::service::{FileSystemService, ServiceError, ServiceResult};
pub use fs::snapshot::ListingSnapshot;
pub use nav::history::History;
pub use nav::navigator::{NavigationTicket, PathNavigator, Resolution};
pub use nav::selection::SelectionModel;
pub use session::BrowserSession;

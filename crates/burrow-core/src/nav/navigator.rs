//! Path navigation over the File System Service.
//!
//! [`PathNavigator`] owns "where the user is": the current path, the
//! snapshot listed there, the selection within it, and the history.
//!
//! Listings are asynchronous and the navigator does not serialise them.
//! Every request is tagged with a monotonically increasing sequence number
//! ([`NavigationTicket`]); only the response to the latest issued request
//! may change state. Callers that keep several listings in flight use
//! [`PathNavigator::request`] and [`PathNavigator::resolve`] directly; the
//! `navigate`/`back`/`home` methods do both halves in one call.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::activity::Activity;
use crate::error::{CoreError, CoreResult};
use crate::fs::entry::EntryRef;
use crate::fs::service::{FileSystemService, ServiceResult};
use crate::fs::snapshot::ListingSnapshot;
use crate::nav::history::History;
use crate::nav::selection::SelectionModel;

/// How a successful listing changes the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryUpdate {
    /// Truncate after the cursor and append.
    Record,
    /// Move the cursor to an existing entry (going back).
    MoveTo(usize),
    /// Leave history alone (refresh).
    Keep,
}

/// A listing request that has been issued but not yet applied.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a ticket does nothing until it is resolved"]
pub struct NavigationTicket {
    sequence: u64,
    path: PathBuf,
    history: HistoryUpdate,
}

impl NavigationTicket {
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// The directory the caller must list to resolve this ticket.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// What happened to a resolved ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The response was the latest; state now reflects it.
    Applied(ListingSnapshot),
    /// A newer request was issued meanwhile; the response was discarded.
    Superseded { sequence: u64 },
}

/// Owns the current location, its snapshot and selection, and the history.
pub struct PathNavigator {
    service: Arc<dyn FileSystemService>,
    activity: Activity,
    history: History,
    current: Option<PathBuf>,
    snapshot: Option<ListingSnapshot>,
    selection: SelectionModel,
    issued: u64,
}

impl PathNavigator {
    pub fn new(service: Arc<dyn FileSystemService>, activity: Activity) -> Self {
        Self {
            service,
            activity,
            history: History::new(),
            current: None,
            snapshot: None,
            selection: SelectionModel::new(),
            issued: 0,
        }
    }

    /// Resolves the starting directory and records it as the first history entry.
    ///
    /// The home directory is preferred; the process current directory is
    /// the fallback. Nothing is listed yet.
    ///
    /// # Errors
    ///
    /// [`CoreError::Resolution`] if neither source is available. There is
    /// no further default, so callers should surface this instead of retrying.
    pub async fn initialize(&mut self) -> CoreResult<PathBuf> {
        let start = {
            let _guard = self.activity.begin();
            match self.service.resolve_home().await {
                Ok(home) => home,
                Err(home_err) => {
                    tracing::warn!("home directory unavailable ({home_err}), trying current directory");
                    self.service
                        .resolve_current()
                        .await
                        .map_err(CoreError::Resolution)?
                }
            }
        };
        self.initialize_at(start.clone());
        Ok(start)
    }

    /// Records `path` as the starting location without resolving anything.
    pub fn initialize_at(&mut self, path: PathBuf) {
        tracing::debug!("starting at {}", path.display());
        self.history.record(path.clone());
        self.current = Some(path);
    }

    /// Issues a listing request for `path`.
    ///
    /// Every earlier ticket that has not been resolved yet is superseded.
    pub fn request(&mut self, path: PathBuf, record_history: bool) -> NavigationTicket {
        let history = if record_history {
            HistoryUpdate::Record
        } else {
            HistoryUpdate::Keep
        };
        self.issue(path, history)
    }

    /// Issues a request for the history entry before the cursor.
    ///
    /// # Errors
    ///
    /// [`CoreError::NoHistory`] if the cursor is at the first entry.
    pub fn back_request(&mut self) -> CoreResult<NavigationTicket> {
        let (index, path) = self
            .history
            .peek_back()
            .map(|(i, p)| (i, p.to_path_buf()))
            .ok_or(CoreError::NoHistory)?;
        Ok(self.issue(path, HistoryUpdate::MoveTo(index)))
    }

    /// Resolves the home directory again and issues a recorded request for it.
    ///
    /// # Errors
    ///
    /// [`CoreError::Resolution`] if the home directory is unavailable.
    pub async fn home_request(&mut self) -> CoreResult<NavigationTicket> {
        let home = {
            let _guard = self.activity.begin();
            self.service
                .resolve_home()
                .await
                .map_err(CoreError::Resolution)?
        };
        Ok(self.request(home, true))
    }

    /// Applies the service's answer to `ticket` if it is still the latest.
    ///
    /// Responses to superseded tickets are discarded whether they
    /// succeeded or not.
    ///
    /// # Errors
    ///
    /// [`CoreError::Navigation`] if the latest listing failed. State is
    /// unchanged in that case.
    pub fn resolve(
        &mut self,
        ticket: NavigationTicket,
        result: ServiceResult<ListingSnapshot>,
    ) -> CoreResult<Resolution> {
        if ticket.sequence != self.issued {
            tracing::debug!(
                "discarding response #{} for {} (latest is #{})",
                ticket.sequence,
                ticket.path.display(),
                self.issued
            );
            return Ok(Resolution::Superseded {
                sequence: ticket.sequence,
            });
        }
        self.apply(ticket, result).map(Resolution::Applied)
    }

    /// Lists `path` and makes it current.
    ///
    /// # Errors
    ///
    /// [`CoreError::Navigation`] if the listing failed; path, snapshot,
    /// selection and history are left as they were.
    pub async fn navigate(
        &mut self,
        path: PathBuf,
        record_history: bool,
    ) -> CoreResult<ListingSnapshot> {
        let ticket = self.request(path, record_history);
        self.run(ticket).await
    }

    /// Goes one step back in history without growing it.
    ///
    /// # Errors
    ///
    /// [`CoreError::NoHistory`] at the first entry, or
    /// [`CoreError::Navigation`] if the previous directory can't be listed
    /// (the cursor does not move then).
    pub async fn back(&mut self) -> CoreResult<ListingSnapshot> {
        let ticket = self.back_request()?;
        self.run(ticket).await
    }

    /// Navigates to the home directory, recording it in history.
    pub async fn home(&mut self) -> CoreResult<ListingSnapshot> {
        let ticket = self.home_request().await?;
        self.run(ticket).await
    }

    /// Lists for `ticket` while holding `&mut self`, so nothing newer can be
    /// issued in between and the sequence check is unnecessary.
    async fn run(&mut self, ticket: NavigationTicket) -> CoreResult<ListingSnapshot> {
        let result = {
            let _guard = self.activity.begin();
            self.service.list(&ticket.path).await
        };
        self.apply(ticket, result)
    }

    fn issue(&mut self, path: PathBuf, history: HistoryUpdate) -> NavigationTicket {
        self.issued += 1;
        NavigationTicket {
            sequence: self.issued,
            path,
            history,
        }
    }

    fn apply(
        &mut self,
        ticket: NavigationTicket,
        result: ServiceResult<ListingSnapshot>,
    ) -> CoreResult<ListingSnapshot> {
        let snapshot = result.map_err(|cause| {
            tracing::warn!("listing {} failed: {cause}", ticket.path.display());
            CoreError::Navigation {
                path: ticket.path.clone(),
                cause,
            }
        })?;

        match ticket.history {
            HistoryUpdate::Record => self.history.record(ticket.path.clone()),
            HistoryUpdate::MoveTo(index) => {
                if !self.history.move_to(index) {
                    tracing::warn!("history index {index} no longer exists");
                }
            }
            HistoryUpdate::Keep => {}
        }
        self.selection.clear();
        self.current = Some(ticket.path);
        self.snapshot = Some(snapshot.clone());
        tracing::debug!(
            "showing {} ({} entries)",
            snapshot.path().display(),
            snapshot.len()
        );
        Ok(snapshot)
    }

    /// Selects `path` if it is part of the current snapshot.
    ///
    /// Returns `false` for paths the snapshot doesn't contain.
    pub fn select(&mut self, path: &Path) -> bool {
        match &self.snapshot {
            Some(snapshot) if snapshot.contains(path) => {
                self.selection.select(path.to_path_buf());
                true
            }
            _ => false,
        }
    }

    pub fn deselect(&mut self, path: &Path) -> bool {
        self.selection.deselect(path)
    }

    /// Selects everything in the current snapshot, or nothing if everything
    /// already is.
    pub fn toggle_all(&mut self) {
        if let Some(snapshot) = &self.snapshot {
            self.selection.toggle_all(snapshot.paths());
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Returns the selected entries in snapshot order.
    pub fn selected_entries(&self) -> Vec<EntryRef> {
        match &self.snapshot {
            Some(snapshot) => self.selection.current_selection(snapshot),
            None => Vec::new(),
        }
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    pub fn snapshot(&self) -> Option<&ListingSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Returns the sequence number of the most recently issued request.
    pub fn latest_sequence(&self) -> u64 {
        self.issued
    }

    /// Returns a handle to the service, for callers resolving tickets themselves.
    pub fn service(&self) -> Arc<dyn FileSystemService> {
        Arc::clone(&self.service)
    }
}

//! The browsing session a front end drives.
//!
//! [`BrowserSession`] ties one [`PathNavigator`], one
//! [`ClipboardCoordinator`] and one [`OperationDispatcher`] to a shared
//! service and activity counter. Its methods are the only mutators a front
//! end needs; every state change they cause is published as an [`Event`]
//! when an event channel is attached.
//!
//! Sessions share nothing with each other. Two panes browsing the same
//! service each get their own session, history, and clipboard.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::activity::Activity;
use crate::clipboard::{ClipboardCoordinator, ClipboardMode, ClipboardStage, PasteOutcome};
use crate::dispatch::OperationDispatcher;
use crate::error::{CoreError, CoreResult};
use crate::event::{Command, Event};
use crate::fs::entry::EntryRef;
use crate::fs::service::FileSystemService;
use crate::fs::snapshot::ListingSnapshot;
use crate::nav::history::History;
use crate::nav::navigator::PathNavigator;
use crate::nav::selection::SelectionModel;

/// What the front end renders from, captured before a mutation so the
/// changes can be published afterwards.
struct Observed {
    snapshot: Option<ListingSnapshot>,
    selected: usize,
    clipboard: ClipboardStage,
}

/// One browsing surface: location, selection, clipboard and operations.
pub struct BrowserSession {
    navigator: PathNavigator,
    clipboard: ClipboardCoordinator,
    dispatcher: OperationDispatcher,
    activity: Activity,
    events: Option<mpsc::UnboundedSender<Event>>,
}

impl BrowserSession {
    /// Creates a session over `service`. Nothing is resolved or listed
    /// until [`BrowserSession::start`] is called.
    pub fn new(service: Arc<dyn FileSystemService>) -> Self {
        let activity = Activity::new();
        Self {
            navigator: PathNavigator::new(Arc::clone(&service), activity.clone()),
            clipboard: ClipboardCoordinator::new(Arc::clone(&service), activity.clone()),
            dispatcher: OperationDispatcher::new(service, activity.clone()),
            activity,
            events: None,
        }
    }

    /// Publishes state changes on `tx` from now on.
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<Event>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Picks the starting directory and lists it.
    ///
    /// `start_dir` wins when given; otherwise the home directory is used,
    /// falling back to the process current directory.
    ///
    /// # Errors
    ///
    /// [`CoreError::Resolution`] if no starting directory can be found, or
    /// [`CoreError::Navigation`] if it cannot be listed.
    pub async fn start(&mut self, start_dir: Option<PathBuf>) -> CoreResult<ListingSnapshot> {
        let before = self.observe();
        let start = match start_dir {
            Some(dir) => {
                self.navigator.initialize_at(dir.clone());
                dir
            }
            None => self.navigator.initialize().await?,
        };
        tracing::info!("session starting in {}", start.display());
        let result = self.navigator.navigate(start, false).await;
        self.publish(before);
        result
    }

    // --- state -----------------------------------------------------------

    pub fn current_path(&self) -> Option<&Path> {
        self.navigator.current_path()
    }

    pub fn snapshot(&self) -> Option<&ListingSnapshot> {
        self.navigator.snapshot()
    }

    pub fn history(&self) -> &History {
        self.navigator.history()
    }

    pub fn selection(&self) -> &SelectionModel {
        self.navigator.selection()
    }

    /// Returns the selected entries in listing order.
    pub fn selected_entries(&self) -> Vec<EntryRef> {
        self.navigator.selected_entries()
    }

    pub fn clipboard(&self) -> &ClipboardCoordinator {
        &self.clipboard
    }

    /// Returns the staged mode, or `None` when paste should be disabled.
    pub fn clipboard_mode(&self) -> Option<ClipboardMode> {
        self.clipboard.mode()
    }

    /// Returns `true` while any service request is pending.
    pub fn in_flight(&self) -> bool {
        self.activity.in_flight()
    }

    /// Subscribes to the number of pending service requests.
    pub fn watch_activity(&self) -> watch::Receiver<usize> {
        self.activity.subscribe()
    }

    // --- navigation ------------------------------------------------------

    /// Opens `path`, recording it in history.
    pub async fn navigate(&mut self, path: PathBuf) -> CoreResult<ListingSnapshot> {
        let before = self.observe();
        let result = self.navigator.navigate(path, true).await;
        self.publish(before);
        result
    }

    pub async fn back(&mut self) -> CoreResult<ListingSnapshot> {
        let before = self.observe();
        let result = self.navigator.back().await;
        self.publish(before);
        result
    }

    pub async fn home(&mut self) -> CoreResult<ListingSnapshot> {
        let before = self.observe();
        let result = self.navigator.home().await;
        self.publish(before);
        result
    }

    /// Re-lists the current directory.
    pub async fn refresh(&mut self) -> CoreResult<ListingSnapshot> {
        let current = self.current_dir()?;
        let before = self.observe();
        let result = self.dispatcher.refresh(&mut self.navigator, &current).await;
        self.publish(before);
        result
    }

    // --- selection -------------------------------------------------------

    /// Selects `path` if it is in the current listing.
    pub fn select(&mut self, path: &Path) -> bool {
        let before = self.observe();
        let selected = self.navigator.select(path);
        self.publish(before);
        selected
    }

    pub fn deselect(&mut self, path: &Path) -> bool {
        let before = self.observe();
        let deselected = self.navigator.deselect(path);
        self.publish(before);
        deselected
    }

    pub fn toggle_all(&mut self) {
        let before = self.observe();
        self.navigator.toggle_all();
        self.publish(before);
    }

    pub fn clear_selection(&mut self) {
        let before = self.observe();
        self.navigator.clear_selection();
        self.publish(before);
    }

    // --- clipboard -------------------------------------------------------

    /// Stages the selection for copying. Returns the number of staged items.
    ///
    /// # Errors
    ///
    /// [`CoreError::EmptyStage`] if nothing is selected.
    pub fn copy_selection(&mut self) -> CoreResult<usize> {
        self.stage_selection(ClipboardMode::Copy)
    }

    /// Stages the selection for moving. Returns the number of staged items.
    ///
    /// # Errors
    ///
    /// [`CoreError::EmptyStage`] if nothing is selected.
    pub fn cut_selection(&mut self) -> CoreResult<usize> {
        self.stage_selection(ClipboardMode::Cut)
    }

    fn stage_selection(&mut self, mode: ClipboardMode) -> CoreResult<usize> {
        let before = self.observe();
        let result = self
            .clipboard
            .stage(self.navigator.selected_entries(), mode)
            .map(|()| self.clipboard.len());
        self.publish(before);
        result
    }

    /// Pastes the clipboard into the current directory.
    pub async fn paste(&mut self) -> CoreResult<PasteOutcome> {
        let current = self.current_dir()?;
        let before = self.observe();
        let result = self
            .dispatcher
            .paste(&mut self.navigator, &mut self.clipboard, &current)
            .await;
        self.publish(before);
        result
    }

    pub fn clear_clipboard(&mut self) {
        let before = self.observe();
        self.clipboard.clear();
        self.publish(before);
    }

    // --- operations ------------------------------------------------------

    /// Deletes every selected entry, in listing order.
    pub async fn delete_selection(&mut self) -> CoreResult<Vec<PathBuf>> {
        let paths: Vec<PathBuf> = self
            .navigator
            .selected_entries()
            .iter()
            .map(|e| e.path().to_path_buf())
            .collect();
        self.delete(&paths).await
    }

    /// Deletes `paths` in order, stopping at the first failure.
    pub async fn delete(&mut self, paths: &[PathBuf]) -> CoreResult<Vec<PathBuf>> {
        let before = self.observe();
        let result = self.dispatcher.delete_many(&mut self.navigator, paths).await;
        self.publish(before);
        result
    }

    pub async fn rename(&mut self, path: &Path, new_name: &str) -> CoreResult<PathBuf> {
        let before = self.observe();
        let result = self
            .dispatcher
            .rename(&mut self.navigator, path, new_name)
            .await;
        self.publish(before);
        result
    }

    /// Creates a folder named `name` in the current directory.
    pub async fn create_folder(&mut self, name: &str) -> CoreResult<PathBuf> {
        let current = self.current_dir()?;
        let before = self.observe();
        let result = self
            .dispatcher
            .create_folder(&mut self.navigator, &current, name)
            .await;
        self.publish(before);
        result
    }

    /// Creates an empty file named `name` in the current directory.
    pub async fn create_file(&mut self, name: &str) -> CoreResult<PathBuf> {
        let current = self.current_dir()?;
        let before = self.observe();
        let result = self
            .dispatcher
            .create_file(&mut self.navigator, &current, name)
            .await;
        self.publish(before);
        result
    }

    /// Runs `command` and reports its outcome as an
    /// [`Event::OperationComplete`] or [`Event::OperationFailed`].
    pub async fn execute(&mut self, command: Command) -> CoreResult<()> {
        let operation = describe(&command);
        let result = match command {
            Command::Navigate(path) => self.navigate(path).await.map(|_| ()),
            Command::GoBack => self.back().await.map(|_| ()),
            Command::GoHome => self.home().await.map(|_| ()),
            Command::Refresh => self.refresh().await.map(|_| ()),
            Command::Select(path) => {
                if !self.select(&path) {
                    tracing::debug!("{} is not in the current listing", path.display());
                }
                Ok(())
            }
            Command::Deselect(path) => {
                self.deselect(&path);
                Ok(())
            }
            Command::ToggleAll => {
                self.toggle_all();
                Ok(())
            }
            Command::ClearSelection => {
                self.clear_selection();
                Ok(())
            }
            Command::Copy => self.copy_selection().map(|_| ()),
            Command::Cut => self.cut_selection().map(|_| ()),
            Command::Paste => self.paste().await.map(|_| ()),
            Command::DeleteSelected => self.delete_selection().await.map(|_| ()),
            Command::Delete(paths) => self.delete(&paths).await.map(|_| ()),
            Command::Rename(path, new_name) => self.rename(&path, &new_name).await.map(|_| ()),
            Command::CreateFolder(name) => self.create_folder(&name).await.map(|_| ()),
            Command::CreateFile(name) => self.create_file(&name).await.map(|_| ()),
        };

        match &result {
            Ok(()) => self.emit(Event::OperationComplete { operation }),
            Err(err) => self.emit(Event::OperationFailed {
                operation,
                error: err.to_string(),
            }),
        }
        result
    }

    fn current_dir(&self) -> CoreResult<PathBuf> {
        self.navigator
            .current_path()
            .map(Path::to_path_buf)
            .ok_or(CoreError::NotStarted)
    }

    fn observe(&self) -> Observed {
        Observed {
            snapshot: self.navigator.snapshot().cloned(),
            selected: self.navigator.selection().len(),
            clipboard: self.clipboard.stage_state().clone(),
        }
    }

    fn publish(&self, before: Observed) {
        if self.events.is_none() {
            return;
        }
        if let Some(snapshot) = self.navigator.snapshot() {
            let reloaded = before
                .snapshot
                .as_ref()
                .map_or(true, |old| !old.same_listing(snapshot));
            if reloaded {
                self.emit(Event::DirectoryLoaded(snapshot.clone()));
            }
        }
        let selected = self.navigator.selection().len();
        if selected != before.selected {
            self.emit(Event::SelectionChanged { count: selected });
        }
        if self.clipboard.stage_state() != &before.clipboard {
            self.emit(Event::ClipboardChanged {
                mode: self.clipboard.mode(),
                items: self.clipboard.len(),
            });
        }
    }

    fn emit(&self, event: Event) {
        if let Some(tx) = &self.events {
            if tx.send(event).is_err() {
                tracing::debug!("event receiver dropped");
            }
        }
    }
}

/// One-line description of a command, for operation events.
fn describe(command: &Command) -> String {
    match command {
        Command::Navigate(path) => format!("open {}", path.display()),
        Command::GoBack => "back".to_string(),
        Command::GoHome => "home".to_string(),
        Command::Refresh => "refresh".to_string(),
        Command::Select(path) => format!("select {}", path.display()),
        Command::Deselect(path) => format!("deselect {}", path.display()),
        Command::ToggleAll => "toggle all".to_string(),
        Command::ClearSelection => "clear selection".to_string(),
        Command::Copy => "copy".to_string(),
        Command::Cut => "cut".to_string(),
        Command::Paste => "paste".to_string(),
        Command::DeleteSelected => "delete selection".to_string(),
        Command::Delete(paths) => format!("delete {} item(s)", paths.len()),
        Command::Rename(path, new_name) => format!("rename {} to {new_name}", path.display()),
        Command::CreateFolder(name) => format!("create folder {name}"),
        Command::CreateFile(name) => format!("create file {name}"),
    }
}

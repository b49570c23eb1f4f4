//! Mutating file operations and the refresh policy that follows them.
//!
//! Every mutation goes through [`OperationDispatcher`], which validates the
//! request before touching the service, performs it, and then re-lists the
//! affected directory through the [`PathNavigator`] so the visible listing
//! matches the file system again. Refreshes never touch navigation history.
//!
//! The dispatcher does not serialise concurrent calls; callers issue one
//! mutation at a time.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::activity::Activity;
use crate::clipboard::{ClipboardCoordinator, PasteOutcome};
use crate::error::{CoreError, CoreResult};
use crate::fs::service::FileSystemService;
use crate::fs::snapshot::ListingSnapshot;
use crate::nav::navigator::PathNavigator;

/// Which kind of entry a create request makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NewEntry {
    Folder,
    File,
}

/// Sequences create/delete/rename/paste requests against the service.
pub struct OperationDispatcher {
    service: Arc<dyn FileSystemService>,
    activity: Activity,
}

impl OperationDispatcher {
    pub fn new(service: Arc<dyn FileSystemService>, activity: Activity) -> Self {
        Self { service, activity }
    }

    /// Creates a folder named `name` in `parent`, then refreshes `parent`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidName`] if `name` is blank.
    /// - [`CoreError::Service`] if the service rejects the name or fails.
    /// - [`CoreError::Navigation`] if the refresh fails.
    pub async fn create_folder(
        &self,
        nav: &mut PathNavigator,
        parent: &Path,
        name: &str,
    ) -> CoreResult<PathBuf> {
        self.create(nav, parent, name, NewEntry::Folder).await
    }

    /// Creates an empty file named `name` in `parent`, then refreshes `parent`.
    ///
    /// Errors as for [`OperationDispatcher::create_folder`].
    pub async fn create_file(
        &self,
        nav: &mut PathNavigator,
        parent: &Path,
        name: &str,
    ) -> CoreResult<PathBuf> {
        self.create(nav, parent, name, NewEntry::File).await
    }

    async fn create(
        &self,
        nav: &mut PathNavigator,
        parent: &Path,
        name: &str,
        kind: NewEntry,
    ) -> CoreResult<PathBuf> {
        let name = valid_name(name)?;
        let _guard = self.activity.begin();

        match kind {
            NewEntry::Folder => self.service.create_folder(parent, name).await?,
            NewEntry::File => self.service.create_file(parent, name).await?,
        }
        let created = parent.join(name);
        tracing::info!("created {kind:?} {}", created.display());

        self.refresh(nav, parent).await?;
        Ok(created)
    }

    /// Deletes `paths` one at a time, in order, stopping at the first failure.
    ///
    /// The current directory is refreshed afterwards whether or not every
    /// delete succeeded, so entries that are already gone disappear from
    /// the listing. Returns the deleted paths.
    ///
    /// # Errors
    ///
    /// - [`CoreError::EmptyTarget`] if `paths` is empty.
    /// - [`CoreError::PartialDelete`] naming what was deleted, the path that
    ///   failed, and why. Later paths are not attempted.
    /// - [`CoreError::Navigation`] if every delete succeeded but the
    ///   refresh failed.
    pub async fn delete_many(
        &self,
        nav: &mut PathNavigator,
        paths: &[PathBuf],
    ) -> CoreResult<Vec<PathBuf>> {
        if paths.is_empty() {
            return Err(CoreError::EmptyTarget);
        }
        let _guard = self.activity.begin();

        let mut succeeded = Vec::with_capacity(paths.len());
        let mut failure = None;
        for path in paths {
            match self.service.delete(path).await {
                Ok(()) => {
                    tracing::info!("deleted {}", path.display());
                    succeeded.push(path.clone());
                }
                Err(cause) => {
                    tracing::warn!(
                        "delete of {} failed after {} item(s): {cause}",
                        path.display(),
                        succeeded.len()
                    );
                    failure = Some((path.clone(), cause));
                    break;
                }
            }
        }

        let refreshed = self.refresh_current(nav).await;
        match failure {
            Some((failed, cause)) => {
                if let Err(err) = refreshed {
                    tracing::warn!("refresh after partial delete failed: {err}");
                }
                Err(CoreError::PartialDelete {
                    succeeded,
                    failed,
                    cause,
                })
            }
            None => refreshed.map(|_| succeeded),
        }
    }

    /// Renames the entry at `path` to `new_name`, then refreshes its parent.
    ///
    /// Renaming to the current name (after trimming) succeeds without
    /// calling the service. Returns the entry's path after the rename.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidName`] if `new_name` is blank.
    /// - [`CoreError::Service`] if the service fails.
    /// - [`CoreError::Navigation`] if the refresh fails.
    pub async fn rename(
        &self,
        nav: &mut PathNavigator,
        path: &Path,
        new_name: &str,
    ) -> CoreResult<PathBuf> {
        let new_name = valid_name(new_name)?;
        let current_name = path.file_name().map(|n| n.to_string_lossy());
        if current_name.as_deref() == Some(new_name) {
            return Ok(path.to_path_buf());
        }

        let parent = path.parent().unwrap_or(path).to_path_buf();
        let _guard = self.activity.begin();
        self.service.rename(path, new_name).await?;
        let renamed = parent.join(new_name);
        tracing::info!("renamed {} to {}", path.display(), renamed.display());

        self.refresh(nav, &parent).await?;
        Ok(renamed)
    }

    /// Pastes the clipboard into `destination`, then refreshes the current
    /// directory.
    ///
    /// The refresh also happens when the paste fails, because a bulk copy
    /// or move may have been partially applied by the service.
    ///
    /// # Errors
    ///
    /// [`CoreError::NothingStaged`] or [`CoreError::ClipboardOperation`]
    /// from the clipboard; [`CoreError::Navigation`] if the paste succeeded
    /// but the refresh failed.
    pub async fn paste(
        &self,
        nav: &mut PathNavigator,
        clipboard: &mut ClipboardCoordinator,
        destination: &Path,
    ) -> CoreResult<PasteOutcome> {
        let _guard = self.activity.begin();
        let outcome = match clipboard.consume(destination).await {
            Err(CoreError::NothingStaged) => return Err(CoreError::NothingStaged),
            other => other,
        };

        let refreshed = self.refresh_current(nav).await;
        match outcome {
            Ok(outcome) => refreshed.map(|_| outcome),
            Err(err) => {
                if let Err(refresh_err) = refreshed {
                    tracing::warn!("refresh after failed paste failed: {refresh_err}");
                }
                Err(err)
            }
        }
    }

    /// Re-lists `path` without touching history or the history cursor.
    pub async fn refresh(
        &self,
        nav: &mut PathNavigator,
        path: &Path,
    ) -> CoreResult<ListingSnapshot> {
        nav.navigate(path.to_path_buf(), false).await
    }

    /// Re-lists the navigator's current directory, if it has one.
    async fn refresh_current(&self, nav: &mut PathNavigator) -> CoreResult<Option<ListingSnapshot>> {
        match nav.current_path().map(Path::to_path_buf) {
            Some(current) => self.refresh(nav, &current).await.map(Some),
            None => Ok(None),
        }
    }
}

/// Trims `name`, rejecting it if nothing is left.
///
/// Anything beyond blankness is for the service to judge.
fn valid_name(name: &str) -> CoreResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidName(name.to_string()));
    }
    Ok(trimmed)
}

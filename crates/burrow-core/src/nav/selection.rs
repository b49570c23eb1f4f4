//! Selection tracking over the current snapshot.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::fs::entry::EntryRef;
use crate::fs::snapshot::ListingSnapshot;

/// The set of selected entry paths.
///
/// The model stores paths only; entries are resolved against whichever
/// snapshot is current when [`SelectionModel::current_selection`] is
/// called, and paths that vanished from it are dropped silently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionModel {
    selected: HashSet<PathBuf>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `path`. Returns `false` if it was already selected.
    pub fn select(&mut self, path: PathBuf) -> bool {
        self.selected.insert(path)
    }

    /// Removes `path`. Returns `false` if it was not selected.
    pub fn deselect(&mut self, path: &Path) -> bool {
        self.selected.remove(path)
    }

    /// Selects every path in `snapshot_paths`, or clears the selection if
    /// all of them are selected already.
    pub fn toggle_all<'a, I>(&mut self, snapshot_paths: I)
    where
        I: IntoIterator<Item = &'a Path>,
    {
        let paths: Vec<&Path> = snapshot_paths.into_iter().collect();
        let all_selected = !paths.is_empty() && paths.iter().all(|p| self.selected.contains(*p));
        if all_selected {
            self.clear();
        } else {
            self.selected
                .extend(paths.into_iter().map(Path::to_path_buf));
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, path: &Path) -> bool {
        self.selected.contains(path)
    }

    /// Resolves the selection against `snapshot`, in snapshot order.
    pub fn current_selection(&self, snapshot: &ListingSnapshot) -> Vec<EntryRef> {
        snapshot
            .entries()
            .iter()
            .filter(|e| self.selected.contains(e.path()))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}

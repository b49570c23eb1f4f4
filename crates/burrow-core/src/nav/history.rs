//! Navigation history with a cursor.

use std::path::{Path, PathBuf};

/// Visited paths plus a cursor pointing at the one currently displayed.
///
/// Recording a new path while the cursor is not at the end drops every
/// entry after the cursor first (web-browser semantics). Going back only
/// moves the cursor; it never grows the history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: Vec<PathBuf>,
    cursor: Option<usize>,
}

impl History {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Truncates after the cursor and appends `path`, moving the cursor to it.
    ///
    /// Recording the path already under the cursor changes nothing.
    pub fn record(&mut self, path: PathBuf) {
        if self.current() == Some(path.as_path()) {
            return;
        }
        if let Some(cursor) = self.cursor {
            self.entries.truncate(cursor + 1);
        }
        self.entries.push(path);
        self.cursor = Some(self.entries.len() - 1);
    }

    /// Returns the index and path one step behind the cursor, if any.
    ///
    /// Does not move the cursor; call [`History::move_to`] once the
    /// destination has actually been reached.
    pub fn peek_back(&self) -> Option<(usize, &Path)> {
        let index = self.cursor?.checked_sub(1)?;
        self.entries.get(index).map(|p| (index, p.as_path()))
    }

    /// Moves the cursor to `index`. Returns `false` if the index is out of range.
    pub fn move_to(&mut self, index: usize) -> bool {
        if index >= self.entries.len() {
            return false;
        }
        self.cursor = Some(index);
        true
    }

    /// Returns `true` if there is an entry before the cursor.
    pub fn can_go_back(&self) -> bool {
        self.peek_back().is_some()
    }

    /// Returns the path under the cursor.
    pub fn current(&self) -> Option<&Path> {
        self.cursor
            .and_then(|i| self.entries.get(i))
            .map(PathBuf::as_path)
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Returns all recorded paths, oldest first.
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

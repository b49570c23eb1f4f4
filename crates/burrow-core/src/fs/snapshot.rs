//! Directory listing snapshots.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::fs::entry::EntryRef;

/// The immutable result of listing one path at one point in time.
///
/// Entries keep the order the service returned them in. Sorting and
/// filtering for display are layered on top by the presentation and never
/// touch the snapshot. Cloning is cheap: the entries are shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSnapshot {
    path: PathBuf,
    entries: Arc<[EntryRef]>,
}

impl ListingSnapshot {
    pub fn new(path: PathBuf, entries: Vec<EntryRef>) -> Self {
        Self {
            path,
            entries: entries.into(),
        }
    }

    /// Returns the directory this snapshot describes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the entries in service order.
    pub fn entries(&self) -> &[EntryRef] {
        &self.entries
    }

    /// Looks up an entry by its path.
    pub fn get(&self, path: &Path) -> Option<&EntryRef> {
        self.entries.iter().find(|e| e.path() == path)
    }

    /// Looks up an entry by its display name.
    pub fn find_by_name(&self, name: &str) -> Option<&EntryRef> {
        self.entries.iter().find(|e| e.name() == name)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.get(path).is_some()
    }

    /// Iterates over the entry paths in service order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(EntryRef::path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if `other` is a clone of this snapshot rather than a
    /// separate listing, even one with equal contents.
    pub fn same_listing(&self, other: &ListingSnapshot) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ListingSnapshot {
        ListingSnapshot::new(
            PathBuf::from("/docs"),
            vec![
                EntryRef::folder(PathBuf::from("/docs/src"), None),
                EntryRef::file(PathBuf::from("/docs/a.txt"), 3, None),
            ],
        )
    }

    #[test]
    fn keeps_service_order() {
        let snapshot = sample();
        let names: Vec<&str> = snapshot.entries().iter().map(EntryRef::name).collect();
        assert_eq!(names, vec!["src", "a.txt"]);
    }

    #[test]
    fn get_and_contains_by_path() {
        let snapshot = sample();
        assert!(snapshot.contains(Path::new("/docs/a.txt")));
        assert!(!snapshot.contains(Path::new("/docs/b.txt")));
        assert_eq!(
            snapshot.get(Path::new("/docs/src")).map(EntryRef::name),
            Some("src")
        );
    }

    #[test]
    fn find_by_name() {
        let snapshot = sample();
        let entry = snapshot.find_by_name("a.txt").unwrap();
        assert_eq!(entry.path(), Path::new("/docs/a.txt"));
        assert!(snapshot.find_by_name("missing").is_none());
    }

    #[test]
    fn clone_shares_entries() {
        let snapshot = sample();
        let cloned = snapshot.clone();
        assert_eq!(snapshot, cloned);
        assert!(std::ptr::eq(snapshot.entries(), cloned.entries()));
    }

    #[test]
    fn same_listing_distinguishes_relists() {
        let snapshot = sample();
        assert!(snapshot.same_listing(&snapshot.clone()));
        assert!(!snapshot.same_listing(&sample()));
    }

    #[test]
    fn empty_snapshot() {
        let snapshot = ListingSnapshot::new(PathBuf::from("/empty"), vec![]);
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.len(), 0);
        assert_eq!(snapshot.paths().count(), 0);
    }
}

//! Entry representation.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use unicode_normalization::UnicodeNormalization;

/// Whether an entry is a file or a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Folder,
}

/// A single file or folder as reported by the File System Service.
///
/// `EntryRef` is immutable. The only constructors are [`EntryRef::file`],
/// [`EntryRef::folder`] and [`EntryRef::from_metadata`], which guarantee
/// that a size and an extension are present only for files. Folders report
/// no size at all rather than `0`.
///
/// # Examples
///
/// ```
/// use burrow_core::{EntryKind, EntryRef};
///
/// let entry = EntryRef::file("/docs/report.pdf".into(), 2048, None);
/// assert_eq!(entry.name(), "report.pdf");
/// assert_eq!(entry.kind(), EntryKind::File);
/// assert_eq!(entry.extension(), Some("pdf"));
/// assert_eq!(entry.size_bytes(), Some(2048));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRef {
    path: PathBuf,
    name: String,
    kind: EntryKind,
    size_bytes: Option<u64>,
    modified_at: Option<SystemTime>,
    extension: Option<String>,
}

impl EntryRef {
    /// Creates a file entry.
    pub fn file(path: PathBuf, size_bytes: u64, modified_at: Option<SystemTime>) -> Self {
        let name = display_name(&path);
        let extension = Path::new(&name)
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .filter(|ext| !ext.is_empty());
        Self {
            path,
            name,
            kind: EntryKind::File,
            size_bytes: Some(size_bytes),
            modified_at,
            extension,
        }
    }

    /// Creates a folder entry.
    pub fn folder(path: PathBuf, modified_at: Option<SystemTime>) -> Self {
        let name = display_name(&path);
        Self {
            path,
            name,
            kind: EntryKind::Folder,
            size_bytes: None,
            modified_at,
            extension: None,
        }
    }

    /// Creates an entry from local file system metadata.
    ///
    /// Anything that is not a directory (regular files, symlinks, devices)
    /// is reported as a file.
    pub fn from_metadata(path: PathBuf, metadata: &std::fs::Metadata) -> Self {
        let modified_at = metadata.modified().ok();
        if metadata.is_dir() {
            Self::folder(path, modified_at)
        } else {
            Self::file(path, metadata.len(), modified_at)
        }
    }

    /// Returns the absolute path of this entry.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the display name (last path segment, NFC-normalised).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Returns `true` if this entry is a folder.
    pub fn is_folder(&self) -> bool {
        matches!(self.kind, EntryKind::Folder)
    }

    /// Returns the size in bytes. Always `None` for folders.
    pub fn size_bytes(&self) -> Option<u64> {
        self.size_bytes
    }

    /// Returns the last-modified time, if the service reported one.
    pub fn modified_at(&self) -> Option<SystemTime> {
        self.modified_at
    }

    /// Returns the file extension without the dot. Always `None` for folders.
    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }
}

/// macOS stores names in NFD, which splits Hangul into Jamo; recompose them.
fn display_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().nfc().collect(),
        None => path.to_string_lossy().into_owned(),
    }
}

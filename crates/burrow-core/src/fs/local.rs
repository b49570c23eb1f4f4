//! [`FileSystemService`] over the local disk.
//!
//! Single-entry operations use `tokio::fs`. Recursive copies run on the
//! blocking pool. No operation overwrites an existing entry.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::fs::entry::EntryRef;
use crate::fs::service::{FileSystemService, ServiceError, ServiceResult};
use crate::fs::snapshot::ListingSnapshot;

/// Maximum recursion depth for a folder copy, to stop symlink loops.
const MAX_COPY_DEPTH: usize = 64;

/// The local file system, addressed with absolute paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileSystemService for LocalFileSystem {
    async fn resolve_home(&self) -> ServiceResult<PathBuf> {
        match std::env::var_os("HOME") {
            Some(home) if !home.is_empty() => Ok(PathBuf::from(home)),
            _ => Err(ServiceError::Unavailable("HOME is not set".to_string())),
        }
    }

    async fn resolve_current(&self) -> ServiceResult<PathBuf> {
        std::env::current_dir().map_err(|e| ServiceError::Unavailable(e.to_string()))
    }

    /// Lists `path`, sorted by name. Children whose metadata can't be read
    /// are skipped.
    async fn list(&self, path: &Path) -> ServiceResult<ListingSnapshot> {
        require_folder(path).await?;

        let mut read_dir = tokio::fs::read_dir(path)
            .await
            .map_err(|e| ServiceError::from_io(path, e))?;
        let mut entries = Vec::new();
        loop {
            let dir_entry = match read_dir.next_entry().await {
                Ok(Some(e)) => e,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("stopped reading {}: {e}", path.display());
                    break;
                }
            };
            let entry_path = dir_entry.path();
            // Follow symlinks so a link to a folder lists as a folder; fall
            // back to the link itself when it dangles.
            let metadata = match tokio::fs::metadata(&entry_path).await {
                Ok(m) => m,
                Err(_) => match dir_entry.metadata().await {
                    Ok(m) => m,
                    Err(_) => continue,
                },
            };
            entries.push(EntryRef::from_metadata(entry_path, &metadata));
        }
        entries.sort_by(|a, b| a.name().cmp(b.name()));

        Ok(ListingSnapshot::new(path.to_path_buf(), entries))
    }

    async fn create_folder(&self, parent: &Path, name: &str) -> ServiceResult<()> {
        let target = child_path(parent, name)?;
        require_folder(parent).await?;
        tokio::fs::create_dir(&target)
            .await
            .map_err(|e| ServiceError::from_io(&target, e))
    }

    async fn create_file(&self, parent: &Path, name: &str) -> ServiceResult<()> {
        let target = child_path(parent, name)?;
        require_folder(parent).await?;
        tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await
            .map(|_| ())
            .map_err(|e| ServiceError::from_io(&target, e))
    }

    /// Deletes a file, a symlink (not its target), or a folder recursively.
    async fn delete(&self, path: &Path) -> ServiceResult<()> {
        let metadata = tokio::fs::symlink_metadata(path)
            .await
            .map_err(|e| ServiceError::from_io(path, e))?;
        let result = if metadata.is_dir() {
            tokio::fs::remove_dir_all(path).await
        } else {
            tokio::fs::remove_file(path).await
        };
        result.map_err(|e| ServiceError::from_io(path, e))
    }

    async fn rename(&self, path: &Path, new_name: &str) -> ServiceResult<()> {
        tokio::fs::symlink_metadata(path)
            .await
            .map_err(|e| ServiceError::from_io(path, e))?;
        let parent = path
            .parent()
            .ok_or_else(|| ServiceError::NotFound(path.to_path_buf()))?;
        let target = child_path(parent, new_name)?;
        require_vacant(&target).await?;
        tokio::fs::rename(path, &target)
            .await
            .map_err(|e| ServiceError::from_io(path, e))
    }

    /// Copies every source into `destination`, checking all of them before
    /// copying any.
    async fn copy(&self, sources: &[PathBuf], destination: &Path) -> ServiceResult<()> {
        let plan = plan_transfer(sources, destination).await?;
        for (source, target) in plan {
            tracing::debug!("copying {} to {}", source.display(), target.display());
            copy_blocking(source, target).await?;
        }
        Ok(())
    }

    /// Moves every source into `destination`, checking all of them before
    /// moving any. Falls back to copy and delete only when the rename
    /// crosses devices.
    async fn move_entries(&self, sources: &[PathBuf], destination: &Path) -> ServiceResult<()> {
        let plan = plan_transfer(sources, destination).await?;
        for (source, target) in plan {
            match tokio::fs::rename(&source, &target).await {
                Ok(()) => {}
                Err(e) if crosses_devices(&e) => {
                    tracing::debug!("{} is on another device, copying instead", source.display());
                    copy_blocking(source.clone(), target).await?;
                    self.delete(&source).await?;
                }
                Err(e) => return Err(ServiceError::from_io(&source, e)),
            }
        }
        Ok(())
    }
}

async fn require_folder(path: &Path) -> ServiceResult<()> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| ServiceError::from_io(path, e))?;
    if metadata.is_dir() {
        Ok(())
    } else {
        Err(ServiceError::NotADirectory(path.to_path_buf()))
    }
}

async fn require_vacant(path: &Path) -> ServiceResult<()> {
    match tokio::fs::symlink_metadata(path).await {
        Ok(_) => Err(ServiceError::AlreadyExists(path.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ServiceError::from_io(path, e)),
    }
}

/// Joins `name` onto `parent` if it is a single, plain path component.
fn child_path(parent: &Path, name: &str) -> ServiceResult<PathBuf> {
    if is_valid_filename(name) {
        Ok(parent.join(name))
    } else {
        Err(ServiceError::Failed {
            path: parent.join(name),
            message: "invalid file name".to_string(),
        })
    }
}

fn is_valid_filename(name: &str) -> bool {
    if name.is_empty() || name == "." || name == ".." {
        return false;
    }
    if name.contains('/') || name.contains('\0') {
        return false;
    }
    #[cfg(windows)]
    if name.contains('\\') || name.contains(':') {
        return false;
    }
    true
}

/// Pairs each source with its target in `destination` and rejects the
/// whole request if any pair is unusable.
async fn plan_transfer(
    sources: &[PathBuf],
    destination: &Path,
) -> ServiceResult<Vec<(PathBuf, PathBuf)>> {
    require_folder(destination).await?;
    // `..` segments and links would hide a folder-into-itself request.
    let resolved_destination = tokio::fs::canonicalize(destination)
        .await
        .map_err(|e| ServiceError::from_io(destination, e))?;

    let mut plan = Vec::with_capacity(sources.len());
    let mut targets = HashSet::with_capacity(sources.len());
    for source in sources {
        let metadata = tokio::fs::symlink_metadata(source)
            .await
            .map_err(|e| ServiceError::from_io(source, e))?;
        let name = source
            .file_name()
            .ok_or_else(|| ServiceError::NotFound(source.clone()))?;
        if metadata.is_dir() {
            let resolved_source = tokio::fs::canonicalize(source)
                .await
                .map_err(|e| ServiceError::from_io(source, e))?;
            if resolved_destination.starts_with(&resolved_source) {
                return Err(ServiceError::Failed {
                    path: source.clone(),
                    message: "cannot copy or move a folder into itself".to_string(),
                });
            }
        }
        let target = destination.join(name);
        if !targets.insert(target.clone()) {
            return Err(ServiceError::AlreadyExists(target));
        }
        require_vacant(&target).await?;
        plan.push((source.clone(), target));
    }
    Ok(plan)
}

#[cfg(not(windows))]
const EXDEV: i32 = 18;
// ERROR_NOT_SAME_DEVICE
#[cfg(windows)]
const EXDEV: i32 = 17;

fn crosses_devices(err: &io::Error) -> bool {
    err.raw_os_error() == Some(EXDEV)
}

/// Runs [`copy_entry`] on the blocking pool.
async fn copy_blocking(source: PathBuf, target: PathBuf) -> ServiceResult<()> {
    let path = source.clone();
    tokio::task::spawn_blocking(move || copy_entry(&source, &target))
        .await
        .map_err(|e| ServiceError::Failed {
            path,
            message: e.to_string(),
        })?
}

/// Copies a file, symlink, or folder (recursively) to `dest`.
fn copy_entry(src: &Path, dest: &Path) -> ServiceResult<()> {
    let metadata = std::fs::symlink_metadata(src).map_err(|e| ServiceError::from_io(src, e))?;
    if metadata.is_dir() {
        copy_dir_recursive(src, dest, 0)
    } else if metadata.is_symlink() {
        copy_symlink(src, dest)
    } else {
        copy_file(src, dest)
    }
}

/// Copies file contents and permissions into a new file. Fails with
/// `AlreadyExists` rather than replacing `dest`.
fn copy_file(src: &Path, dest: &Path) -> ServiceResult<()> {
    let mut reader = std::fs::File::open(src).map_err(|e| ServiceError::from_io(src, e))?;
    let permissions = reader
        .metadata()
        .map_err(|e| ServiceError::from_io(src, e))?
        .permissions();
    let mut writer = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dest)
        .map_err(|e| ServiceError::from_io(dest, e))?;
    io::copy(&mut reader, &mut writer).map_err(|e| ServiceError::from_io(src, e))?;
    writer
        .set_permissions(permissions)
        .map_err(|e| ServiceError::from_io(dest, e))
}

fn copy_dir_recursive(src: &Path, dest: &Path, depth: usize) -> ServiceResult<()> {
    if depth > MAX_COPY_DEPTH {
        return Err(ServiceError::Failed {
            path: src.to_path_buf(),
            message: format!("maximum recursion depth ({MAX_COPY_DEPTH}) exceeded during copy"),
        });
    }

    std::fs::create_dir(dest).map_err(|e| ServiceError::from_io(dest, e))?;

    let read_dir = std::fs::read_dir(src).map_err(|e| ServiceError::from_io(src, e))?;
    for entry in read_dir {
        let entry = entry.map_err(|e| ServiceError::from_io(src, e))?;
        let entry_path = entry.path();
        let target = dest.join(entry.file_name());

        // file_type() does not follow symlinks
        let ft = entry
            .file_type()
            .map_err(|e| ServiceError::from_io(&entry_path, e))?;

        if ft.is_symlink() {
            copy_symlink(&entry_path, &target)?;
        } else if ft.is_dir() {
            copy_dir_recursive(&entry_path, &target, depth + 1)?;
        } else {
            copy_file(&entry_path, &target)?;
        }
    }

    Ok(())
}

/// Recreates the link itself rather than copying what it points to.
fn copy_symlink(src: &Path, dest: &Path) -> ServiceResult<()> {
    #[cfg(unix)]
    {
        let link_target = std::fs::read_link(src).map_err(|e| ServiceError::from_io(src, e))?;
        std::os::unix::fs::symlink(&link_target, dest).map_err(|e| ServiceError::from_io(dest, e))
    }
    #[cfg(not(unix))]
    {
        copy_file(src, dest)
    }
}

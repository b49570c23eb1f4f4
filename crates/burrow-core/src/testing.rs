//! In-memory File System Service used by the unit tests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::fs::entry::EntryRef;
use crate::fs::service::{FileSystemService, ServiceError, ServiceResult};
use crate::fs::snapshot::ListingSnapshot;

/// Which service call a scripted failure applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    List,
    CreateFolder,
    CreateFile,
    Delete,
    Rename,
    Copy,
    Move,
}

/// One recorded service call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    List(PathBuf),
    CreateFolder(PathBuf),
    CreateFile(PathBuf),
    Delete(PathBuf),
    Rename(PathBuf, String),
    Copy(Vec<PathBuf>, PathBuf),
    Move(Vec<PathBuf>, PathBuf),
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Folder,
    File(u64),
}

#[derive(Default)]
struct State {
    nodes: BTreeMap<PathBuf, Node>,
    home: Option<PathBuf>,
    current: Option<PathBuf>,
    failures: Vec<(Op, PathBuf, ServiceError)>,
    calls: Vec<Call>,
}

/// A tree of folders and files kept in memory, with scripted failures and
/// a log of every call it received.
pub(crate) struct MemoryFs {
    state: Mutex<State>,
}

impl MemoryFs {
    pub(crate) fn new() -> Self {
        let mut state = State::default();
        state.nodes.insert(PathBuf::from("/"), Node::Folder);
        Self {
            state: Mutex::new(state),
        }
    }

    pub(crate) fn with_folder(self, path: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            insert_with_ancestors(&mut state.nodes, Path::new(path), Node::Folder);
        }
        self
    }

    pub(crate) fn with_file(self, path: &str, size: u64) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            insert_with_ancestors(&mut state.nodes, Path::new(path), Node::File(size));
        }
        self
    }

    pub(crate) fn with_home(self, path: &str) -> Self {
        self.state.lock().unwrap().home = Some(PathBuf::from(path));
        self.with_folder(path)
    }

    pub(crate) fn with_current(self, path: &str) -> Self {
        self.state.lock().unwrap().current = Some(PathBuf::from(path));
        self.with_folder(path)
    }

    /// Makes every `op` call on `path` fail with `err`.
    pub(crate) fn fail(&self, op: Op, path: &str, err: ServiceError) {
        self.state
            .lock()
            .unwrap()
            .failures
            .push((op, PathBuf::from(path), err));
    }

    pub(crate) fn clear_failures(&self) {
        self.state.lock().unwrap().failures.clear();
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::List(_)))
            .count()
    }

    pub(crate) fn exists(&self, path: &str) -> bool {
        self.state.lock().unwrap().nodes.contains_key(Path::new(path))
    }

    fn begin(&self, call: Call, op: Op, key: &Path) -> ServiceResult<std::sync::MutexGuard<'_, State>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if let Some((_, _, err)) = state
            .failures
            .iter()
            .find(|(o, p, _)| *o == op && p == key)
        {
            return Err(err.clone());
        }
        Ok(state)
    }
}

fn insert_with_ancestors(nodes: &mut BTreeMap<PathBuf, Node>, path: &Path, node: Node) {
    for ancestor in path.ancestors().skip(1) {
        nodes.entry(ancestor.to_path_buf()).or_insert(Node::Folder);
    }
    nodes.insert(path.to_path_buf(), node);
}

fn require_folder(nodes: &BTreeMap<PathBuf, Node>, path: &Path) -> ServiceResult<()> {
    match nodes.get(path) {
        Some(Node::Folder) => Ok(()),
        Some(Node::File(_)) => Err(ServiceError::NotADirectory(path.to_path_buf())),
        None => Err(ServiceError::NotFound(path.to_path_buf())),
    }
}

fn subtree(nodes: &BTreeMap<PathBuf, Node>, root: &Path) -> Vec<(PathBuf, Node)> {
    nodes
        .iter()
        .filter(|(p, _)| p.starts_with(root))
        .map(|(p, n)| (p.clone(), *n))
        .collect()
}

fn transfer(
    state: &mut State,
    sources: &[PathBuf],
    destination: &Path,
    remove_source: bool,
) -> ServiceResult<()> {
    require_folder(&state.nodes, destination)?;
    for source in sources {
        let name = source
            .file_name()
            .ok_or_else(|| ServiceError::NotFound(source.clone()))?;
        if !state.nodes.contains_key(source) {
            return Err(ServiceError::NotFound(source.clone()));
        }
        let target = destination.join(name);
        if state.nodes.contains_key(&target) {
            return Err(ServiceError::AlreadyExists(target));
        }
        for (path, node) in subtree(&state.nodes, source) {
            if remove_source {
                state.nodes.remove(&path);
            }
            let relative = path.strip_prefix(source).unwrap_or(Path::new(""));
            state.nodes.insert(target.join(relative), node);
        }
    }
    Ok(())
}

#[async_trait]
impl FileSystemService for MemoryFs {
    async fn resolve_home(&self) -> ServiceResult<PathBuf> {
        self.state
            .lock()
            .unwrap()
            .home
            .clone()
            .ok_or_else(|| ServiceError::Unavailable("no home".to_string()))
    }

    async fn resolve_current(&self) -> ServiceResult<PathBuf> {
        self.state
            .lock()
            .unwrap()
            .current
            .clone()
            .ok_or_else(|| ServiceError::Unavailable("no current directory".to_string()))
    }

    async fn list(&self, path: &Path) -> ServiceResult<ListingSnapshot> {
        let state = self.begin(Call::List(path.to_path_buf()), Op::List, path)?;
        require_folder(&state.nodes, path)?;
        let entries = state
            .nodes
            .iter()
            .filter(|(p, _)| p.parent() == Some(path))
            .map(|(p, node)| match node {
                Node::Folder => EntryRef::folder(p.clone(), None),
                Node::File(size) => EntryRef::file(p.clone(), *size, None),
            })
            .collect();
        Ok(ListingSnapshot::new(path.to_path_buf(), entries))
    }

    async fn create_folder(&self, parent: &Path, name: &str) -> ServiceResult<()> {
        let target = parent.join(name);
        let mut state = self.begin(Call::CreateFolder(target.clone()), Op::CreateFolder, parent)?;
        require_folder(&state.nodes, parent)?;
        if state.nodes.contains_key(&target) {
            return Err(ServiceError::AlreadyExists(target));
        }
        state.nodes.insert(target, Node::Folder);
        Ok(())
    }

    async fn create_file(&self, parent: &Path, name: &str) -> ServiceResult<()> {
        let target = parent.join(name);
        let mut state = self.begin(Call::CreateFile(target.clone()), Op::CreateFile, parent)?;
        require_folder(&state.nodes, parent)?;
        if state.nodes.contains_key(&target) {
            return Err(ServiceError::AlreadyExists(target));
        }
        state.nodes.insert(target, Node::File(0));
        Ok(())
    }

    async fn delete(&self, path: &Path) -> ServiceResult<()> {
        let mut state = self.begin(Call::Delete(path.to_path_buf()), Op::Delete, path)?;
        if !state.nodes.contains_key(path) {
            return Err(ServiceError::NotFound(path.to_path_buf()));
        }
        state.nodes.retain(|p, _| !p.starts_with(path));
        Ok(())
    }

    async fn rename(&self, path: &Path, new_name: &str) -> ServiceResult<()> {
        let mut state = self.begin(
            Call::Rename(path.to_path_buf(), new_name.to_string()),
            Op::Rename,
            path,
        )?;
        let parent = path
            .parent()
            .ok_or_else(|| ServiceError::NotFound(path.to_path_buf()))?;
        if !state.nodes.contains_key(path) {
            return Err(ServiceError::NotFound(path.to_path_buf()));
        }
        let target = parent.join(new_name);
        if state.nodes.contains_key(&target) {
            return Err(ServiceError::AlreadyExists(target));
        }
        for (p, node) in subtree(&state.nodes, path) {
            state.nodes.remove(&p);
            let relative = p.strip_prefix(path).unwrap_or(Path::new(""));
            state.nodes.insert(target.join(relative), node);
        }
        Ok(())
    }

    async fn copy(&self, sources: &[PathBuf], destination: &Path) -> ServiceResult<()> {
        let mut state = self.begin(
            Call::Copy(sources.to_vec(), destination.to_path_buf()),
            Op::Copy,
            destination,
        )?;
        transfer(&mut state, sources, destination, false)
    }

    async fn move_entries(&self, sources: &[PathBuf], destination: &Path) -> ServiceResult<()> {
        let mut state = self.begin(
            Call::Move(sources.to_vec(), destination.to_path_buf()),
            Op::Move,
            destination,
        )?;
        transfer(&mut state, sources, destination, true)
    }
}

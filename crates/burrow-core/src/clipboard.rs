//! Cut/copy staging.
//!
//! [`ClipboardCoordinator`] is a two-state machine. It is owned by one
//! browsing session and handed around by reference, so independent
//! sessions (split panes, several windows) never share a stage.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::activity::Activity;
use crate::error::{CoreError, CoreResult};
use crate::fs::entry::EntryRef;
use crate::fs::service::FileSystemService;

/// Whether a paste copies or moves the staged entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClipboardMode {
    Copy,
    Cut,
}

impl fmt::Display for ClipboardMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copy => f.write_str("copy"),
            Self::Cut => f.write_str("cut"),
        }
    }
}

/// A non-empty, duplicate-free, ordered set of staged entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedItems(Vec<EntryRef>);

impl StagedItems {
    /// Builds a stage from `items`, dropping repeated paths.
    ///
    /// Returns `None` if `items` is empty.
    pub fn new(items: Vec<EntryRef>) -> Option<Self> {
        let mut seen = HashSet::new();
        let unique: Vec<EntryRef> = items
            .into_iter()
            .filter(|e| seen.insert(e.path().to_path_buf()))
            .collect();
        if unique.is_empty() {
            None
        } else {
            Some(Self(unique))
        }
    }

    pub fn entries(&self) -> &[EntryRef] {
        &self.0
    }

    /// Returns the staged paths in staging order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.0.iter().map(|e| e.path().to_path_buf()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The clipboard's state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ClipboardStage {
    #[default]
    Idle,
    Holding {
        items: StagedItems,
        mode: ClipboardMode,
    },
}

/// What a successful paste did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteOutcome {
    pub mode: ClipboardMode,
    pub destination: PathBuf,
    pub pasted: Vec<PathBuf>,
}

/// Holds the staged entries and performs pastes through the service.
pub struct ClipboardCoordinator {
    service: Arc<dyn FileSystemService>,
    activity: Activity,
    stage: ClipboardStage,
}

impl ClipboardCoordinator {
    pub fn new(service: Arc<dyn FileSystemService>, activity: Activity) -> Self {
        Self {
            service,
            activity,
            stage: ClipboardStage::Idle,
        }
    }

    /// Replaces whatever is staged with `items` in `mode`.
    ///
    /// # Errors
    ///
    /// [`CoreError::EmptyStage`] if `items` is empty; the stage is untouched.
    pub fn stage(&mut self, items: Vec<EntryRef>, mode: ClipboardMode) -> CoreResult<()> {
        let items = StagedItems::new(items).ok_or(CoreError::EmptyStage)?;
        tracing::debug!("staged {} item(s) for {mode}", items.len());
        self.stage = ClipboardStage::Holding { items, mode };
        Ok(())
    }

    /// Pastes the stage into `destination`.
    ///
    /// A copy stage stays staged and can be pasted again elsewhere. A cut
    /// stage is single-use and goes back to idle once the move succeeds.
    /// The request is all-or-nothing from the clipboard's point of view:
    /// per-item results are the service's concern.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NothingStaged`] if idle.
    /// - [`CoreError::ClipboardOperation`] if the service failed; the stage
    ///   is unchanged.
    pub async fn consume(&mut self, destination: &Path) -> CoreResult<PasteOutcome> {
        let (paths, mode) = match &self.stage {
            ClipboardStage::Idle => return Err(CoreError::NothingStaged),
            ClipboardStage::Holding { items, mode } => (items.paths(), *mode),
        };

        let result = {
            let _guard = self.activity.begin();
            match mode {
                ClipboardMode::Copy => self.service.copy(&paths, destination).await,
                ClipboardMode::Cut => self.service.move_entries(&paths, destination).await,
            }
        };

        if let Err(cause) = result {
            tracing::warn!("{mode} paste into {} failed: {cause}", destination.display());
            return Err(CoreError::ClipboardOperation { mode, cause });
        }

        tracing::info!(
            "{mode} pasted {} item(s) into {}",
            paths.len(),
            destination.display()
        );
        if mode == ClipboardMode::Cut {
            self.stage = ClipboardStage::Idle;
        }
        Ok(PasteOutcome {
            mode,
            destination: destination.to_path_buf(),
            pasted: paths,
        })
    }

    /// Drops whatever is staged.
    pub fn clear(&mut self) {
        self.stage = ClipboardStage::Idle;
    }

    pub fn stage_state(&self) -> &ClipboardStage {
        &self.stage
    }

    /// Returns the staged mode, or `None` when idle.
    pub fn mode(&self) -> Option<ClipboardMode> {
        match &self.stage {
            ClipboardStage::Idle => None,
            ClipboardStage::Holding { mode, .. } => Some(*mode),
        }
    }

    /// Number of staged entries (`0` when idle).
    pub fn len(&self) -> usize {
        match &self.stage {
            ClipboardStage::Idle => 0,
            ClipboardStage::Holding { items, .. } => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.stage, ClipboardStage::Idle)
    }
}

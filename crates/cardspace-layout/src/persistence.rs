#![forbid(unsafe_code)]

//! Side-effect seams: persistence and card-open notification.
//!
//! The engine never blocks on, or fails because of, either seam. Bridges
//! swallow their own I/O failures (logging them) and return `None` from
//! loads they cannot satisfy.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use cardspace_core::{CanvasConfig, CardId};

use crate::codec::{decode_layout, decode_workspaces, encode_layout, encode_workspaces};
use crate::store::LayoutState;
use crate::workspace::WorkspaceList;

// =========================================================================
// Traits
// =========================================================================

/// Synchronous key-value persistence for the layout and workspace list.
pub trait PersistenceBridge {
    /// Last saved layout, if any.
    fn load_layout(&mut self) -> Option<LayoutState>;

    /// Store the layout. Fire-and-forget.
    fn save_layout(&mut self, state: &LayoutState);

    /// Last saved workspace list, if any.
    fn load_workspaces(&mut self) -> Option<WorkspaceList> {
        None
    }

    /// Store the workspace list. Fire-and-forget.
    fn save_workspaces(&mut self, _list: &WorkspaceList) {}
}

/// Notified exactly once per closed-to-open card transition.
pub trait CardOpenHook {
    fn on_card_open(&mut self, card: CardId);
}

impl<F: FnMut(CardId)> CardOpenHook for F {
    fn on_card_open(&mut self, card: CardId) {
        self(card);
    }
}

/// Hook that records every notification in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingHook {
    pub opened: Vec<CardId>,
}

impl CardOpenHook for RecordingHook {
    fn on_card_open(&mut self, card: CardId) {
        self.opened.push(card);
    }
}

// =========================================================================
// In-memory bridge
// =========================================================================

/// Bridge backed by plain fields. Counts saves for inspection.
#[derive(Debug, Clone, Default)]
pub struct MemoryBridge {
    layout: Option<LayoutState>,
    workspaces: Option<WorkspaceList>,
    layout_saves: usize,
    workspace_saves: usize,
}

impl MemoryBridge {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bridge that starts out holding `layout`.
    #[must_use]
    pub fn with_layout(layout: LayoutState) -> Self {
        Self {
            layout: Some(layout),
            ..Self::default()
        }
    }

    /// Bridge that starts out holding `workspaces`.
    #[must_use]
    pub fn with_workspaces(mut self, workspaces: WorkspaceList) -> Self {
        self.workspaces = Some(workspaces);
        self
    }

    #[must_use]
    pub fn layout(&self) -> Option<&LayoutState> {
        self.layout.as_ref()
    }

    #[must_use]
    pub fn workspaces(&self) -> Option<&WorkspaceList> {
        self.workspaces.as_ref()
    }

    #[must_use]
    pub const fn layout_saves(&self) -> usize {
        self.layout_saves
    }

    #[must_use]
    pub const fn workspace_saves(&self) -> usize {
        self.workspace_saves
    }
}

impl PersistenceBridge for MemoryBridge {
    fn load_layout(&mut self) -> Option<LayoutState> {
        self.layout.clone()
    }

    fn save_layout(&mut self, state: &LayoutState) {
        self.layout = Some(state.clone());
        self.layout_saves += 1;
    }

    fn load_workspaces(&mut self) -> Option<WorkspaceList> {
        self.workspaces.clone()
    }

    fn save_workspaces(&mut self, list: &WorkspaceList) {
        self.workspaces = Some(list.clone());
        self.workspace_saves += 1;
    }
}

// =========================================================================
// JSON file bridge
// =========================================================================

const LAYOUT_FILE: &str = "layout.json";
const WORKSPACES_FILE: &str = "workspaces.json";

/// Bridge storing `layout.json` and `workspaces.json` in a directory.
///
/// Missing files load as `None`. Unreadable or undecodable files are
/// logged and also load as `None`, so the engine falls back to defaults.
/// Writes go to a sibling temp file that is then renamed over the target.
#[derive(Debug, Clone)]
pub struct JsonFileBridge {
    dir: PathBuf,
    config: CanvasConfig,
}

impl JsonFileBridge {
    /// Bridge rooted at `dir`. The directory is created on first save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, config: &CanvasConfig) -> Self {
        Self {
            dir: dir.into(),
            config: config.clone(),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn layout_path(&self) -> PathBuf {
        self.dir.join(LAYOUT_FILE)
    }

    #[must_use]
    pub fn workspaces_path(&self) -> PathBuf {
        self.dir.join(WORKSPACES_FILE)
    }

    fn read(path: &Path) -> Option<String> {
        match fs::read_to_string(path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(
                    target: "cardspace.persist",
                    path = %path.display(),
                    error = %e,
                    "failed to read persisted state"
                );
                None
            }
        }
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, path)
    }

    fn write_logged(&self, path: &Path, content: Result<String, crate::codec::LayoutCodecError>) {
        let result = match content {
            Ok(json) => self.write(path, &json).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        match result {
            Ok(()) => {
                tracing::trace!(target: "cardspace.persist", path = %path.display(), "state written");
            }
            Err(error) => {
                tracing::warn!(
                    target: "cardspace.persist",
                    path = %path.display(),
                    error = %error,
                    "failed to write persisted state"
                );
            }
        }
    }
}

impl PersistenceBridge for JsonFileBridge {
    fn load_layout(&mut self) -> Option<LayoutState> {
        let path = self.layout_path();
        let content = Self::read(&path)?;
        match decode_layout(&content, &self.config) {
            Ok(decoded) => Some(decoded.state),
            Err(e) => {
                tracing::warn!(
                    target: "cardspace.persist",
                    path = %path.display(),
                    error = %e,
                    "discarding undecodable layout"
                );
                None
            }
        }
    }

    fn save_layout(&mut self, state: &LayoutState) {
        let path = self.layout_path();
        self.write_logged(&path, encode_layout(state));
    }

    fn load_workspaces(&mut self) -> Option<WorkspaceList> {
        let path = self.workspaces_path();
        let content = Self::read(&path)?;
        match decode_workspaces(&content) {
            Ok(list) => Some(list),
            Err(e) => {
                tracing::warn!(
                    target: "cardspace.persist",
                    path = %path.display(),
                    error = %e,
                    "discarding undecodable workspace list"
                );
                None
            }
        }
    }

    fn save_workspaces(&mut self, list: &WorkspaceList) {
        let path = self.workspaces_path();
        self.write_logged(&path, encode_workspaces(list));
    }
}

#![forbid(unsafe_code)]

//! Named workspace snapshots.
//!
//! A [`Workspace`] is an immutable deep copy of every card plus pan and
//! zoom, taken from a [`LayoutStore`]. [`WorkspaceManager`] keeps the saved
//! list and the active marker; applying a workspace writes it back into the
//! store and reports which cards were opened by it.
//!
//! ```
//! use cardspace_core::CanvasConfig;
//! use cardspace_layout::{LayoutStore, WorkspaceManager};
//!
//! let config = CanvasConfig::default();
//! let mut store = LayoutStore::new(&config);
//! let mut manager = WorkspaceManager::new(config.workspaces.clone());
//!
//! let id = manager.save(&store, "  focus mode ");
//! assert_eq!(manager.get(&id).unwrap().label(), "FOCUS ");
//! let opened = manager.apply(&id, &mut store);
//! assert_eq!(opened, Some(vec![]));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use cardspace_core::config::WorkspacePolicyConfig;
use cardspace_core::{CardId, Point};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::{CardState, LAYOUT_SCHEMA_VERSION, LayoutStore};

// =========================================================================
// Identity and label
// =========================================================================

/// Opaque unique workspace token (UUID v4 text for generated ids).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceId(String);

impl WorkspaceId {
    /// Fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for WorkspaceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for WorkspaceId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trim, upper-case, and cap a label; blank labels become the default.
#[must_use]
pub fn normalize_label(raw: &str, policy: &WorkspacePolicyConfig) -> String {
    let label: String = raw
        .trim()
        .to_uppercase()
        .chars()
        .take(policy.label_max_chars)
        .collect();
    if label.is_empty() {
        policy.default_label.clone()
    } else {
        label
    }
}

// =========================================================================
// Workspace
// =========================================================================

/// Saved layout snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    id: WorkspaceId,
    label: String,
    cards: BTreeMap<CardId, CardState>,
    pan_x: f64,
    pan_y: f64,
    scale: f64,
}

impl Workspace {
    /// Snapshot the live layout under a fresh id.
    #[must_use]
    pub fn capture(store: &LayoutStore, label: &str, policy: &WorkspacePolicyConfig) -> Self {
        let view = store.view();
        Self {
            id: WorkspaceId::generate(),
            label: normalize_label(label, policy),
            cards: CardId::ALL
                .iter()
                .map(|&id| (id, *store.card(id)))
                .collect(),
            pan_x: view.pan_x,
            pan_y: view.pan_y,
            scale: view.scale,
        }
    }

    #[must_use]
    pub const fn id(&self) -> &WorkspaceId {
        &self.id
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub const fn cards(&self) -> &BTreeMap<CardId, CardState> {
        &self.cards
    }

    #[must_use]
    pub fn card(&self, id: CardId) -> Option<&CardState> {
        self.cards.get(&id)
    }

    #[must_use]
    pub const fn pan(&self) -> Point {
        Point::new(self.pan_x, self.pan_y)
    }

    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }
}

/// Persisted form of the saved workspace list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceList {
    #[serde(default = "default_list_version")]
    pub schema_version: u16,
    #[serde(default)]
    pub active: Option<WorkspaceId>,
    #[serde(default)]
    pub workspaces: Vec<Workspace>,
}

fn default_list_version() -> u16 {
    LAYOUT_SCHEMA_VERSION
}

impl Default for WorkspaceList {
    fn default() -> Self {
        Self {
            schema_version: LAYOUT_SCHEMA_VERSION,
            active: None,
            workspaces: Vec::new(),
        }
    }
}

// =========================================================================
// Manager
// =========================================================================

/// Saved workspaces plus the active marker.
///
/// Any number of workspaces is accepted; [`can_save_more`](Self::can_save_more)
/// exposes the configured cap for callers that want to enforce it.
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    policy: WorkspacePolicyConfig,
    workspaces: Vec<Workspace>,
    active: Option<WorkspaceId>,
}

impl WorkspaceManager {
    #[must_use]
    pub fn new(policy: WorkspacePolicyConfig) -> Self {
        Self {
            policy,
            workspaces: Vec::new(),
            active: None,
        }
    }

    /// Rebuild from a persisted list, dropping duplicate ids and a dangling
    /// active marker.
    #[must_use]
    pub fn from_list(policy: WorkspacePolicyConfig, list: WorkspaceList) -> Self {
        let mut manager = Self::new(policy);
        for workspace in list.workspaces {
            if manager.get(workspace.id()).is_some() {
                tracing::warn!(
                    target: "cardspace.workspace",
                    id = %workspace.id(),
                    "duplicate workspace id dropped"
                );
                continue;
            }
            manager.workspaces.push(workspace);
        }
        manager.active = list.active.filter(|id| manager.get(id).is_some());
        manager
    }

    /// Persisted form of the current list.
    #[must_use]
    pub fn to_list(&self) -> WorkspaceList {
        WorkspaceList {
            schema_version: LAYOUT_SCHEMA_VERSION,
            active: self.active.clone(),
            workspaces: self.workspaces.clone(),
        }
    }

    #[must_use]
    pub const fn policy(&self) -> &WorkspacePolicyConfig {
        &self.policy
    }

    /// Snapshot the live layout without saving it.
    #[must_use]
    pub fn snapshot(&self, store: &LayoutStore, label: &str) -> Workspace {
        Workspace::capture(store, label, &self.policy)
    }

    /// Snapshot the live layout, append it, and mark it active.
    pub fn save(&mut self, store: &LayoutStore, label: &str) -> WorkspaceId {
        let workspace = self.snapshot(store, label);
        let id = workspace.id().clone();
        tracing::info!(
            target: "cardspace.workspace",
            id = %id,
            label = workspace.label(),
            count = self.workspaces.len() + 1,
            "workspace saved"
        );
        self.workspaces.push(workspace);
        self.active = Some(id.clone());
        id
    }

    #[must_use]
    pub fn get(&self, id: &WorkspaceId) -> Option<&Workspace> {
        self.workspaces.iter().find(|w| w.id() == id)
    }

    /// Saved workspaces in save order.
    #[must_use]
    pub fn workspaces(&self) -> &[Workspace] {
        &self.workspaces
    }

    #[must_use]
    pub const fn active_id(&self) -> Option<&WorkspaceId> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.workspaces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workspaces.is_empty()
    }

    /// Below the configured advisory cap.
    #[must_use]
    pub fn can_save_more(&self) -> bool {
        self.workspaces.len() < self.policy.max_saved
    }

    /// Write a saved workspace into `store` and mark it active.
    ///
    /// Returns the cards it opened, in catalog order, or `None` if `id` is
    /// unknown.
    pub fn apply(&mut self, id: &WorkspaceId, store: &mut LayoutStore) -> Option<Vec<CardId>> {
        let workspace = self.workspaces.iter().find(|w| w.id() == id)?;
        let opened = store.apply_snapshot(workspace.cards(), workspace.pan(), workspace.scale());
        tracing::info!(
            target: "cardspace.workspace",
            id = %id,
            label = workspace.label(),
            opened = opened.len(),
            "workspace applied"
        );
        self.active = Some(id.clone());
        Some(opened)
    }

    /// Remove a saved workspace. Clears the active marker if it pointed here.
    pub fn delete(&mut self, id: &WorkspaceId) -> Option<Workspace> {
        let index = self.workspaces.iter().position(|w| w.id() == id)?;
        let removed = self.workspaces.remove(index);
        if self.active.as_ref() == Some(id) {
            self.active = None;
        }
        tracing::info!(target: "cardspace.workspace", id = %id, "workspace deleted");
        Some(removed)
    }
}

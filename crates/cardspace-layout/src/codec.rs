#![forbid(unsafe_code)]

//! JSON encoding of layouts and workspace lists.
//!
//! Decoding is lenient at the entry level: an unknown card key or a card
//! entry that does not parse is skipped (and later replaced by its catalog
//! default in [`LayoutStore::restore`](crate::store::LayoutStore::restore)),
//! and a workspace entry that does not parse is dropped from the list. Only
//! structural problems (not JSON, not an object, a schema version from the
//! future) fail the whole document.

use std::collections::BTreeMap;
use std::fmt;

use cardspace_core::{CanvasConfig, CardId};
use serde_json::{Map, Value};

use crate::store::{CardState, LAYOUT_SCHEMA_VERSION, LayoutState, ViewState};
use crate::workspace::{Workspace, WorkspaceId, WorkspaceList};

// =========================================================================
// Errors
// =========================================================================

/// Errors from decoding persisted layout documents.
#[derive(Debug)]
pub enum LayoutCodecError {
    /// Input is not valid JSON, or encoding failed.
    Json(serde_json::Error),
    /// Top-level value is not a JSON object.
    NotAnObject,
    /// Document was written by a newer (or unknown) schema.
    UnsupportedVersion { version: u64 },
}

impl fmt::Display for LayoutCodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(e) => write!(f, "JSON error: {e}"),
            Self::NotAnObject => f.write_str("expected a JSON object at the top level"),
            Self::UnsupportedVersion { version } => {
                write!(
                    f,
                    "unsupported layout schema version {version} (current is {LAYOUT_SCHEMA_VERSION})"
                )
            }
        }
    }
}

impl std::error::Error for LayoutCodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::NotAnObject | Self::UnsupportedVersion { .. } => None,
        }
    }
}

impl From<serde_json::Error> for LayoutCodecError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

// =========================================================================
// Layout
// =========================================================================

/// Result of a lenient layout decode.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedLayout {
    /// Decoded layout. May lack cards that were skipped.
    pub state: LayoutState,
    /// Card keys that were unknown or malformed.
    pub skipped_cards: Vec<String>,
    /// The view entry was missing or malformed and was replaced.
    pub view_defaulted: bool,
}

/// Serialize a layout.
pub fn encode_layout(state: &LayoutState) -> Result<String, LayoutCodecError> {
    Ok(serde_json::to_string(state)?)
}

/// Parse a layout document, skipping entries that do not decode.
pub fn decode_layout(json: &str, config: &CanvasConfig) -> Result<DecodedLayout, LayoutCodecError> {
    let root: Value = serde_json::from_str(json)?;
    let Value::Object(root) = root else {
        return Err(LayoutCodecError::NotAnObject);
    };
    check_version(&root)?;

    let mut cards = BTreeMap::new();
    let mut skipped_cards = Vec::new();
    if let Some(Value::Object(entries)) = root.get("cards") {
        for (key, value) in entries {
            let Ok(id) = key.parse::<CardId>() else {
                skipped_cards.push(key.clone());
                continue;
            };
            match serde_json::from_value::<CardState>(value.clone()) {
                Ok(card) => {
                    cards.insert(id, card);
                }
                Err(_) => skipped_cards.push(key.clone()),
            }
        }
    }

    let view = root
        .get("view")
        .and_then(|v| serde_json::from_value::<ViewState>(v.clone()).ok());
    let view_defaulted = view.is_none();

    if !skipped_cards.is_empty() || view_defaulted {
        tracing::debug!(
            target: "cardspace.persist",
            skipped = ?skipped_cards,
            view_defaulted,
            "layout decoded with skipped entries"
        );
    }

    Ok(DecodedLayout {
        state: LayoutState {
            schema_version: LAYOUT_SCHEMA_VERSION,
            cards,
            view: view.unwrap_or_else(|| ViewState::initial(config)),
        },
        skipped_cards,
        view_defaulted,
    })
}

// =========================================================================
// Workspace list
// =========================================================================

/// Serialize a workspace list.
pub fn encode_workspaces(list: &WorkspaceList) -> Result<String, LayoutCodecError> {
    Ok(serde_json::to_string(list)?)
}

/// Parse a workspace list, dropping entries that do not decode.
///
/// A bare JSON array of workspaces is accepted as a list with no active
/// marker.
pub fn decode_workspaces(json: &str) -> Result<WorkspaceList, LayoutCodecError> {
    let root: Value = serde_json::from_str(json)?;
    let (entries, active) = match root {
        Value::Array(entries) => (entries, None),
        Value::Object(root) => {
            check_version(&root)?;
            let active = root
                .get("active")
                .and_then(Value::as_str)
                .map(WorkspaceId::from);
            let entries = match root.get("workspaces") {
                Some(Value::Array(entries)) => entries.clone(),
                _ => Vec::new(),
            };
            (entries, active)
        }
        _ => return Err(LayoutCodecError::NotAnObject),
    };

    let total = entries.len();
    let workspaces: Vec<Workspace> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect();
    if workspaces.len() != total {
        tracing::debug!(
            target: "cardspace.persist",
            dropped = total - workspaces.len(),
            "workspace entries dropped while decoding"
        );
    }

    Ok(WorkspaceList {
        schema_version: LAYOUT_SCHEMA_VERSION,
        active,
        workspaces,
    })
}

fn check_version(root: &Map<String, Value>) -> Result<(), LayoutCodecError> {
    match root.get("schemaVersion").and_then(Value::as_u64) {
        None => Ok(()),
        Some(version) if version == u64::from(LAYOUT_SCHEMA_VERSION) => Ok(()),
        Some(version) => Err(LayoutCodecError::UnsupportedVersion { version }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LayoutStore;
    use crate::workspace::WorkspaceManager;
    use cardspace_core::config::WorkspacePolicyConfig;

    #[test]
    fn encode_then_decode_is_identity() {
        let config = CanvasConfig::default();
        let state = LayoutState::initial(&config);
        let json = encode_layout(&state).unwrap();
        let decoded = decode_layout(&json, &config).unwrap();
        assert_eq!(decoded.state, state);
        assert!(decoded.skipped_cards.is_empty());
        assert!(!decoded.view_defaulted);
    }

    #[test]
    fn unknown_and_malformed_cards_are_skipped() {
        let json = r#"{
            "cards": {
                "chat": {"x": 1, "y": 2, "w": 300, "h": 300, "open": true, "z": 5},
                "terminal": {"x": 0, "y": 0, "w": 300, "h": 300, "open": true, "z": 1},
                "log": {"x": "left"}
            },
            "view": {"panX": 0, "panY": 0, "scale": 1.5, "nextZ": 7}
        }"#;
        let decoded = decode_layout(json, &CanvasConfig::default()).unwrap();
        assert_eq!(decoded.state.cards.len(), 1);
        assert_eq!(decoded.state.card(CardId::Chat).unwrap().z, 5);
        assert_eq!(decoded.skipped_cards, vec!["log".to_string(), "terminal".to_string()]);
        assert_eq!(decoded.state.view.scale, 1.5);
        assert_eq!(decoded.state.view.focused_card, None);
    }

    #[test]
    fn missing_view_falls_back_to_initial() {
        let decoded = decode_layout(r#"{"cards": {}}"#, &CanvasConfig::default()).unwrap();
        assert!(decoded.view_defaulted);
        assert_eq!(decoded.state.view.next_z, 100);
    }

    #[test]
    fn structural_errors_fail() {
        let config = CanvasConfig::default();
        assert!(matches!(
            decode_layout("not json", &config),
            Err(LayoutCodecError::Json(_))
        ));
        assert!(matches!(
            decode_layout("[1, 2]", &config),
            Err(LayoutCodecError::NotAnObject)
        ));
        let err = decode_layout(r#"{"schemaVersion": 9}"#, &config).unwrap_err();
        assert!(matches!(err, LayoutCodecError::UnsupportedVersion { version: 9 }));
        assert!(err.to_string().contains("version 9"));
    }

    #[test]
    fn decoded_layout_restores_into_store() {
        let config = CanvasConfig::default();
        let decoded = decode_layout(r#"{"cards": {"cron": {"x": 5, "y": 6, "w": 10, "h": 10, "open": true, "z": 300}}}"#, &config).unwrap();
        let (store, report) = LayoutStore::restore(&config, Some(decoded.state));
        assert_eq!(report.clamped, vec![CardId::Cron]);
        assert_eq!(report.defaulted.len(), CardId::COUNT - 1);
        assert_eq!(store.card(CardId::Cron).w, 200.0);
        assert_eq!(store.view().next_z, 301);
    }

    #[test]
    fn workspace_list_round_trip() {
        let store = LayoutStore::new(&CanvasConfig::default());
        let mut manager = WorkspaceManager::new(WorkspacePolicyConfig::default());
        manager.save(&store, "alpha");
        manager.save(&store, "beta");
        let list = manager.to_list();
        let json = encode_workspaces(&list).unwrap();
        assert_eq!(decode_workspaces(&json).unwrap(), list);
    }

    #[test]
    fn workspace_decode_accepts_bare_array_and_drops_bad_entries() {
        let store = LayoutStore::new(&CanvasConfig::default());
        let manager = WorkspaceManager::new(WorkspacePolicyConfig::default());
        let good = serde_json::to_value(manager.snapshot(&store, "ok")).unwrap();
        let json = Value::Array(vec![good, serde_json::json!({"id": 3})]).to_string();
        let list = decode_workspaces(&json).unwrap();
        assert_eq!(list.workspaces.len(), 1);
        assert_eq!(list.workspaces[0].label(), "OK");
        assert_eq!(list.active, None);
    }
}

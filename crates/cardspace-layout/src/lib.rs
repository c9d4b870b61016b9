#![forbid(unsafe_code)]

//! Layout: the live card model and everything derived from it.
//!
//! # Role in Cardspace
//! `cardspace-layout` owns the mutable layout. The interaction layer in
//! `cardspace-web` mutates it only through [`LayoutStore`] methods.
//!
//! # Primary responsibilities
//! - **Store**: per-card state, view state, focus and z-order.
//! - **Workspaces**: named snapshots, the saved list, and the active marker.
//! - **Minimap**: proportional projection of open cards and the viewport.
//! - **Persistence**: the bridge and hook seams, a lenient JSON codec, and
//!   in-memory and file-backed bridges.

pub mod codec;
pub mod minimap;
pub mod persistence;
pub mod store;
pub mod workspace;

pub use codec::{DecodedLayout, LayoutCodecError, decode_layout, decode_workspaces, encode_layout, encode_workspaces};
pub use minimap::{MinimapCard, MinimapProjection, MinimapProjector};
pub use persistence::{CardOpenHook, JsonFileBridge, MemoryBridge, PersistenceBridge, RecordingHook};
pub use store::{
    CardPatch, CardState, InteractionMode, LAYOUT_SCHEMA_VERSION, LayoutState, LayoutStore,
    RestoreReport, RestoreSource, ToggleOutcome, ViewPatch, ViewState,
};
pub use workspace::{Workspace, WorkspaceId, WorkspaceList, WorkspaceManager, normalize_label};
